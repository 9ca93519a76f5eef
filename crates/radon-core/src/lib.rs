//! Radon Core - task graph and streaming scheduler
//!
//! This crate provides the data-flow engine that the radon preprocessing
//! pipelines are built on:
//!
//! - [`Frame`] - a row-major 2-D (optionally stacked 3-D) float image buffer
//! - [`Roi`] - the vertical row range read from each stored frame
//! - [`Task`] - object-safe trait implemented by every processing node
//! - [`TaskGraph`] - mutable node/edge store with port-level wiring checks
//! - [`Scheduler`] - executes a graph with one worker thread per node and a
//!   bounded channel per edge
//!
//! # Execution model
//!
//! Graphs are built once, validated (port connectivity, acyclicity) and then
//! consumed by a single [`Scheduler::run`] call. Streaming tasks process one
//! frame at a time and overlap across pipeline stages; reduction tasks block
//! until their input stream closes. Nothing is cached between runs — the only
//! state that outlives a run is whatever a task wrote to disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use radon_core::{Scheduler, TaskGraph};
//!
//! let mut graph = TaskGraph::new();
//! let read = graph.add_task(Box::new(reader));
//! let correct = graph.add_task(Box::new(ffc));
//! let write = graph.add_task(Box::new(writer));
//!
//! graph.connect_default(read, correct)?;
//! graph.connect_default(correct, write)?;
//!
//! Scheduler::new().run(graph)?;
//! ```

pub mod frame;
pub mod graph;
pub mod scheduler;
pub mod task;

pub use frame::{Frame, Roi};
pub use graph::{EdgeId, GraphError, NodeId, PortDirection, TaskGraph};
pub use scheduler::{RunError, Scheduler};
pub use task::{InputPort, OutputPort, Ports, Task, TaskError};
