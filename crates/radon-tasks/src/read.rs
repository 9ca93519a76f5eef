//! Frame source: discovers stacks and streams sliced, ROI-cropped frames.

use radon_core::{Ports, Roi, Task, TaskError};
use radon_io::{StackReader, discover};

/// Reads frames from a source pattern and emits them in order.
///
/// The frame sequence is the concatenation of every matching stack (sorted
/// by name); the `(start, step, number)` slice selects from that sequence,
/// and the ROI is applied to each selected frame as it is read.
pub struct ReadTask {
    pattern: String,
    roi: Roi,
    start: usize,
    step: usize,
    number: Option<usize>,
}

impl ReadTask {
    /// Creates a reader that emits every frame the pattern resolves to.
    pub fn new(pattern: impl Into<String>, roi: Roi) -> Self {
        Self {
            pattern: pattern.into(),
            roi,
            start: 0,
            step: 1,
            number: None,
        }
    }

    /// Restricts the reader to the `(start, step, number)` frame slice.
    pub fn with_slice(mut self, start: usize, step: usize, number: Option<usize>) -> Self {
        self.start = start;
        self.step = step.max(1);
        self.number = number;
        self
    }
}

impl Task for ReadTask {
    fn name(&self) -> &'static str {
        "read"
    }

    fn input_ports(&self) -> &'static [&'static str] {
        &[]
    }

    fn output_ports(&self) -> &'static [&'static str] {
        &["frames"]
    }

    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError> {
        let paths = discover(&self.pattern).map_err(TaskError::storage)?;

        let mut next = self.start;
        let mut global = 0usize;
        let mut emitted = 0usize;

        'stacks: for path in paths {
            let mut reader = StackReader::open(&path).map_err(TaskError::storage)?;
            let frames = reader.info().frames;
            for index in 0..frames {
                if global == next {
                    let frame = reader
                        .read_frame_roi(index, &self.roi)
                        .map_err(TaskError::storage)?;
                    ports.output(0).send(frame)?;
                    emitted += 1;
                    next += self.step;
                    if let Some(number) = self.number
                        && emitted >= number
                    {
                        break 'stacks;
                    }
                }
                global += 1;
            }
        }

        tracing::debug!("read: emitted {emitted} frames from '{}'", self.pattern);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;
    use radon_core::{Frame, OutputPort};
    use radon_io::StackWriter;
    use tempfile::tempdir;

    fn write_stack(path: &std::path::Path, values: &[f32]) {
        let mut writer = StackWriter::create(path).unwrap();
        for &v in values {
            writer.write_frame(&Frame::from_data(2, 2, vec![v; 4])).unwrap();
        }
        writer.finish().unwrap();
    }

    fn run_reader(task: ReadTask) -> Vec<Frame> {
        let (tx, rx) = unbounded();
        let ports = Ports::new(Vec::new(), vec![OutputPort::new(vec![tx])]);
        Box::new(task).run(ports).unwrap();
        rx.try_iter().collect()
    }

    #[test]
    fn reads_across_stacks_in_order() {
        let dir = tempdir().unwrap();
        write_stack(&dir.path().join("a.rst"), &[1.0, 2.0]);
        write_stack(&dir.path().join("b.rst"), &[3.0]);

        let frames = run_reader(ReadTask::new(
            dir.path().to_str().unwrap(),
            Roi::full(),
        ));
        let values: Vec<f32> = frames.iter().map(|f| f.data[0]).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn slice_selects_frames_from_the_sequence() {
        let dir = tempdir().unwrap();
        write_stack(
            &dir.path().join("a.rst"),
            &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        );

        let task = ReadTask::new(dir.path().to_str().unwrap(), Roi::full())
            .with_slice(1, 2, Some(2));
        let values: Vec<f32> = run_reader(task).iter().map(|f| f.data[0]).collect();
        assert_eq!(values, vec![1.0, 3.0]);
    }

    #[test]
    fn roi_is_applied_per_frame() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.rst");
        let mut writer = StackWriter::create(&path).unwrap();
        writer
            .write_frame(&Frame::from_data(2, 3, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]))
            .unwrap();
        writer.finish().unwrap();

        let roi = Roi {
            y: 1,
            height: Some(1),
            y_step: 1,
        };
        let frames = run_reader(ReadTask::new(path.to_str().unwrap(), roi));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].shape(), (2, 1));
        assert_eq!(frames[0].data, vec![2.0, 3.0]);
    }

    #[test]
    fn missing_source_fails() {
        let (tx, _rx) = unbounded();
        let ports = Ports::new(Vec::new(), vec![OutputPort::new(vec![tx])]);
        let task = Box::new(ReadTask::new("/no/such/source", Roi::full()));
        assert!(matches!(task.run(ports), Err(TaskError::Storage(_))));
    }
}
