//! Source discovery: paths, directories and glob patterns.
//!
//! Pipelines reference their inputs by a single string that can be an
//! explicit stack file, a directory (all `.rst` entries, sorted by name) or
//! a glob pattern over file names (`*` and `?`). Discovery never reads
//! pixel data; frame counting and shape probing work from headers alone.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::stack::{STACK_EXTENSION, StackError, stack_info};

/// Resolves a source string to an ordered list of stack files.
///
/// # Errors
///
/// `NoMatches` when the pattern resolves to nothing, `BadPattern` when it
/// cannot be interpreted, plus I/O errors from directory listing.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>, StackError> {
    let path = Path::new(pattern);

    if path.is_dir() {
        let mut matches = list_dir(path, |name| {
            Path::new(name)
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(STACK_EXTENSION))
        })?;
        matches.sort();
        return non_empty(matches, pattern);
    }

    if has_glob_meta(pattern) {
        let name = path
            .file_name()
            .ok_or_else(|| StackError::BadPattern {
                pattern: pattern.to_string(),
            })?
            .to_string_lossy()
            .into_owned();
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let regex = glob_regex(&name).ok_or_else(|| StackError::BadPattern {
            pattern: pattern.to_string(),
        })?;
        let mut matches = list_dir(parent, |entry| regex.is_match(entry))?;
        matches.sort();
        return non_empty(matches, pattern);
    }

    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    Err(StackError::NoMatches {
        pattern: pattern.to_string(),
    })
}

/// Total frames across every stack a source resolves to (header-only).
pub fn frame_count(pattern: &str) -> Result<usize, StackError> {
    let mut total = 0usize;
    for path in discover(pattern)? {
        total += stack_info(&path)?.frames as usize;
    }
    Ok(total)
}

/// `(width, height)` of the frames a source resolves to.
///
/// Probes the first matching stack; the pipelines assume uniform shape
/// across a source and validate it frame-by-frame at run time.
pub fn probe_shape(pattern: &str) -> Result<(u32, u32), StackError> {
    let paths = discover(pattern)?;
    let info = stack_info(&paths[0])?;
    Ok((info.width, info.height))
}

fn has_glob_meta(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Translates a file-name glob into an anchored regex.
///
/// `*` matches any run of characters, `?` a single character; everything
/// else is literal.
fn glob_regex(glob: &str) -> Option<Regex> {
    let mut re = String::with_capacity(glob.len() + 8);
    re.push('^');
    for ch in glob.chars() {
        match ch {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            c => re.push_str(&regex::escape(&c.to_string())),
        }
    }
    re.push('$');
    Regex::new(&re).ok()
}

fn list_dir(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<Vec<PathBuf>, StackError> {
    let entries = std::fs::read_dir(dir).map_err(|e| StackError::Read {
        path: dir.to_path_buf(),
        source: e,
    })?;
    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| StackError::Read {
            path: dir.to_path_buf(),
            source: e,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str())
            && keep(name)
        {
            matches.push(path);
        }
    }
    Ok(matches)
}

fn non_empty(matches: Vec<PathBuf>, pattern: &str) -> Result<Vec<PathBuf>, StackError> {
    if matches.is_empty() {
        Err(StackError::NoMatches {
            pattern: pattern.to_string(),
        })
    } else {
        tracing::debug!("discover: '{pattern}' → {} stacks", matches.len());
        Ok(matches)
    }
}
