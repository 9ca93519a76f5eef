//! Frame sink: streams incoming frames into a stack file.

use std::path::PathBuf;

use radon_core::{Ports, Task, TaskError};
use radon_io::StackWriter;

/// Writes every incoming frame to one output stack.
///
/// With `append = false` the target is (re)created; with `append = true`
/// new frames accumulate after the committed content, which is how the
/// chunked sinogram runs build one artifact across several graphs.
pub struct WriteTask {
    path: PathBuf,
    append: bool,
}

impl WriteTask {
    /// Creates a writer for the given output path.
    pub fn new(path: impl Into<PathBuf>, append: bool) -> Self {
        Self {
            path: path.into(),
            append,
        }
    }
}

impl Task for WriteTask {
    fn name(&self) -> &'static str {
        "write"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let mut writer = if self.append {
            StackWriter::append(&self.path)
        } else {
            StackWriter::create(&self.path)
        }
        .map_err(TaskError::storage)?;

        while let Some(frame) = ports.input(0).recv() {
            writer.write_frame(&frame).map_err(TaskError::storage)?;
        }

        let info = writer.finish().map_err(TaskError::storage)?;
        tracing::debug!(
            "write: '{}' now holds {} frames",
            self.path.display(),
            info.frames
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use radon_core::{Frame, InputPort};
    use radon_io::stack_info;
    use tempfile::tempdir;

    fn run_writer(task: WriteTask, frames: Vec<Frame>) {
        let (tx, rx) = unbounded();
        for frame in frames {
            tx.send(frame).unwrap();
        }
        drop(tx);
        let ports = Ports::new(vec![InputPort::new(rx)], Vec::new());
        Box::new(task).run(ports).unwrap();
    }

    #[test]
    fn writes_all_received_frames() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.rst");
        run_writer(
            WriteTask::new(&path, false),
            vec![Frame::new(2, 2), Frame::new(2, 2)],
        );
        assert_eq!(stack_info(&path).unwrap().frames, 2);
    }

    #[test]
    fn append_accumulates_across_runs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.rst");
        run_writer(WriteTask::new(&path, false), vec![Frame::new(2, 2)]);
        run_writer(
            WriteTask::new(&path, true),
            vec![Frame::new(2, 2), Frame::new(2, 2)],
        );
        assert_eq!(stack_info(&path).unwrap().frames, 3);
    }

    #[test]
    fn fresh_run_truncates_previous_output() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.rst");
        run_writer(
            WriteTask::new(&path, false),
            vec![Frame::new(2, 2), Frame::new(2, 2)],
        );
        run_writer(WriteTask::new(&path, false), vec![Frame::new(2, 2)]);
        assert_eq!(stack_info(&path).unwrap().frames, 1);
    }
}
