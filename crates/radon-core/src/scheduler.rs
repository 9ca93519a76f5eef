//! Graph execution.
//!
//! The scheduler validates a graph (port connectivity, acyclicity), then
//! runs every node on its own worker thread with a bounded channel per
//! edge. Streaming tasks overlap across stages — the reader can fetch frame
//! i+1 while the correction node processes frame i — while reduction tasks
//! naturally block until their inputs close. A run either completes or
//! fails as a whole; the graph is consumed either way.

use crossbeam_channel::{Receiver, Sender, bounded};
use thiserror::Error;

use crate::frame::Frame;
use crate::graph::TaskGraph;
use crate::task::{InputPort, OutputPort, Ports, Task, TaskError};

/// Default per-edge channel capacity, in frames.
///
/// Deep enough to keep adjacent stages busy, shallow enough to bound memory
/// when a reduction stage is still accumulating.
const DEFAULT_QUEUE_DEPTH: usize = 4;

/// Errors raised by [`Scheduler::run`].
#[derive(Debug, Error)]
pub enum RunError {
    /// The graph is not a DAG.
    #[error("graph contains a cycle")]
    Cycle,

    /// A required input port has no incoming edge.
    #[error("input port '{port}' of task '{task}' has no incoming edge")]
    PortUnconnected {
        /// Task name.
        task: &'static str,
        /// Unconnected port name.
        port: &'static str,
    },

    /// A task returned an error; cascades from peer failures are filtered
    /// out so this is the root cause.
    #[error("task '{task}' failed: {source}")]
    TaskFailed {
        /// Task name.
        task: &'static str,
        /// The task's error.
        #[source]
        source: TaskError,
    },

    /// A task panicked on its worker thread.
    #[error("task '{task}' panicked")]
    Panic {
        /// Task name.
        task: &'static str,
    },

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Executes task graphs.
///
/// The scheduler holds no state between runs; [`run`](Self::run) consumes
/// the graph, so a fresh graph must be built for every invocation (the
/// chunked sinogram loop relies on exactly this).
pub struct Scheduler {
    queue_depth: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Creates a scheduler with the default per-edge queue depth.
    pub fn new() -> Self {
        Self {
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }

    /// Creates a scheduler with an explicit per-edge queue depth (≥ 1).
    pub fn with_queue_depth(queue_depth: usize) -> Self {
        Self {
            queue_depth: queue_depth.max(1),
        }
    }

    /// Runs a graph to completion.
    ///
    /// Validation happens before any thread is spawned or any task code
    /// runs: a cyclic graph or an unconnected input port fails without side
    /// effects.
    pub fn run(&self, graph: TaskGraph) -> Result<(), RunError> {
        if graph.topo_order().is_none() {
            return Err(RunError::Cycle);
        }
        for node in graph.nodes.iter().flatten() {
            for (idx, port) in node.task.input_ports().iter().copied().enumerate() {
                if graph.incoming_edge(node, idx).is_none() {
                    return Err(RunError::PortUnconnected {
                        task: node.task.name(),
                        port,
                    });
                }
            }
        }

        let TaskGraph { nodes, edges } = graph;

        // One bounded channel per edge.
        let mut txs: Vec<Option<Sender<Frame>>> = Vec::with_capacity(edges.len());
        let mut rxs: Vec<Option<Receiver<Frame>>> = Vec::with_capacity(edges.len());
        for edge in &edges {
            if edge.is_some() {
                let (tx, rx) = bounded(self.queue_depth);
                txs.push(Some(tx));
                rxs.push(Some(rx));
            } else {
                txs.push(None);
                rxs.push(None);
            }
        }

        // Distribute channel ends into per-node port bundles.
        let mut workers: Vec<(Box<dyn Task>, Ports)> = Vec::new();
        for node in nodes.into_iter().flatten() {
            let mut inputs = Vec::with_capacity(node.task.input_ports().len());
            for idx in 0..node.task.input_ports().len() {
                let rx = node
                    .incoming
                    .iter()
                    .find_map(|&e| {
                        let slot = e.index() as usize;
                        edges[slot]
                            .filter(|edge| edge.to_port == idx)
                            .and_then(|_| rxs[slot].take())
                    })
                    .expect("validated: every input port has exactly one edge");
                inputs.push(InputPort::new(rx));
            }

            let mut outputs = Vec::with_capacity(node.task.output_ports().len());
            for idx in 0..node.task.output_ports().len() {
                let senders: Vec<Sender<Frame>> = node
                    .outgoing
                    .iter()
                    .filter_map(|&e| {
                        let slot = e.index() as usize;
                        edges[slot]
                            .filter(|edge| edge.from_port == idx)
                            .and_then(|_| txs[slot].take())
                    })
                    .collect();
                outputs.push(OutputPort::new(senders));
            }

            workers.push((node.task, Ports::new(inputs, outputs)));
        }

        tracing::debug!("scheduler: launching {} workers", workers.len());

        let mut failures: Vec<(&'static str, TaskError)> = Vec::new();
        let mut panicked: Option<&'static str> = None;

        std::thread::scope(|scope| -> Result<(), RunError> {
            let mut handles = Vec::with_capacity(workers.len());
            for (task, ports) in workers {
                let name = task.name();
                let handle = std::thread::Builder::new()
                    .name(name.to_string())
                    .spawn_scoped(scope, move || task.run(ports))
                    .map_err(RunError::Spawn)?;
                handles.push((name, handle));
            }

            for (name, handle) in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        tracing::debug!("scheduler: task '{name}' failed: {err}");
                        failures.push((name, err));
                    }
                    Err(_) => panicked = panicked.or(Some(name)),
                }
            }
            Ok(())
        })?;

        if let Some(idx) = failures.iter().position(|(_, e)| !e.is_cascade()) {
            let (task, source) = failures.swap_remove(idx);
            return Err(RunError::TaskFailed { task, source });
        }
        if let Some(task) = panicked {
            return Err(RunError::Panic { task });
        }
        if let Some((task, source)) = failures.pop() {
            return Err(RunError::TaskFailed { task, source });
        }
        Ok(())
    }
}
