//! The task contract and the port handles a running task uses.
//!
//! Every node kind implements [`Task`]. A task declares its input and output
//! ports by name; the scheduler hands it a [`Ports`] bundle whose channels
//! are wired according to the graph's edges, then calls [`Task::run`] on a
//! dedicated worker thread.

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use crate::frame::Frame;

/// Errors a task can fail with at run time.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Underlying I/O failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Two frames that must agree in shape did not.
    #[error(
        "frame shape mismatch: expected {expected_width}x{expected_height}, \
         got {width}x{height}"
    )]
    ShapeMismatch {
        /// Expected width.
        expected_width: u32,
        /// Expected height.
        expected_height: u32,
        /// Actual width.
        width: u32,
        /// Actual height.
        height: u32,
    },

    /// An input stream closed before the configured number of frames arrived.
    #[error("input stream ended after {got} of {expected} frames")]
    FrameUnderrun {
        /// Frames the task was configured to consume.
        expected: usize,
        /// Frames actually received.
        got: usize,
    },

    /// Failure in the stack container layer.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A downstream task went away; this is a cascade, not a root cause.
    #[error("downstream channel closed")]
    ChannelClosed,
}

impl TaskError {
    /// Wraps a container-layer error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        TaskError::Storage(Box::new(err))
    }

    /// Builds a [`TaskError::ShapeMismatch`] from two frames.
    pub fn shape_mismatch(expected: &Frame, got: &Frame) -> Self {
        TaskError::ShapeMismatch {
            expected_width: expected.width,
            expected_height: expected.height,
            width: got.width,
            height: got.height,
        }
    }

    /// True for failures that are only the echo of a peer's failure.
    ///
    /// The scheduler uses this to report the root cause of a run failure
    /// instead of whichever thread happened to notice first.
    pub fn is_cascade(&self) -> bool {
        matches!(self, TaskError::ChannelClosed)
    }
}

/// Receiving end of one input port.
pub struct InputPort {
    rx: Receiver<Frame>,
}

impl InputPort {
    /// Wraps a channel receiver. Used by the scheduler and by task tests.
    pub fn new(rx: Receiver<Frame>) -> Self {
        Self { rx }
    }

    /// Blocks for the next frame; `None` once the upstream task finished.
    pub fn recv(&self) -> Option<Frame> {
        self.rx.recv().ok()
    }
}

/// Sending end of one output port.
///
/// An output port fans out to every edge connected to it; a port with no
/// edges silently discards what is sent to it.
pub struct OutputPort {
    txs: Vec<Sender<Frame>>,
}

impl OutputPort {
    /// Wraps the channel senders of all connected edges.
    pub fn new(txs: Vec<Sender<Frame>>) -> Self {
        Self { txs }
    }

    /// Sends a frame to every connected edge, cloning for all but the last.
    pub fn send(&self, frame: Frame) -> Result<(), TaskError> {
        match self.txs.as_slice() {
            [] => Ok(()),
            [tx] => tx.send(frame).map_err(|_| TaskError::ChannelClosed),
            [head @ .., last] => {
                for tx in head {
                    tx.send(frame.clone())
                        .map_err(|_| TaskError::ChannelClosed)?;
                }
                last.send(frame).map_err(|_| TaskError::ChannelClosed)
            }
        }
    }
}

/// The port bundle handed to a running task.
///
/// Ports are index-aligned with the task's declared
/// [`input_ports`](Task::input_ports) / [`output_ports`](Task::output_ports).
pub struct Ports {
    inputs: Vec<InputPort>,
    outputs: Vec<OutputPort>,
}

impl Ports {
    /// Builds a port bundle. Used by the scheduler and by task tests.
    pub fn new(inputs: Vec<InputPort>, outputs: Vec<OutputPort>) -> Self {
        Self { inputs, outputs }
    }

    /// Input port `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` exceeds the declared input arity; the scheduler
    /// guarantees one entry per declared port.
    pub fn input(&self, idx: usize) -> &InputPort {
        &self.inputs[idx]
    }

    /// Output port `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` exceeds the declared output arity.
    pub fn output(&self, idx: usize) -> &OutputPort {
        &self.outputs[idx]
    }
}

/// A processing node.
///
/// Implementations declare their port layout up front; arity is the length
/// of the returned slices. `run` consumes the task — graphs are executed
/// once and discarded.
pub trait Task: Send {
    /// Short stable identifier, also used to name the worker thread.
    fn name(&self) -> &'static str;

    /// Named input ports, in index order. Every input port must be
    /// connected before the graph can run.
    fn input_ports(&self) -> &'static [&'static str];

    /// Named output ports, in index order.
    fn output_ports(&self) -> &'static [&'static str];

    /// Processes the streams until the inputs are exhausted.
    ///
    /// Dropping the output ports (by returning) closes the downstream
    /// channels, which is how end-of-stream propagates.
    fn run(self: Box<Self>, ports: Ports) -> Result<(), TaskError>;
}
