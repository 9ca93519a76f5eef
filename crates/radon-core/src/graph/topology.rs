//! Graph mutation API and wiring validation.

use thiserror::Error;

use crate::task::Task;

use super::edge::{Edge, EdgeId};
use super::node::{NodeData, NodeId};

/// Which side of a node a port belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    /// A consuming port.
    Input,
    /// A producing port.
    Output,
}

impl core::fmt::Display for PortDirection {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PortDirection::Input => write!(f, "input"),
            PortDirection::Output => write!(f, "output"),
        }
    }
}

/// Errors raised while wiring a graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The referenced node does not exist in this graph.
    #[error("{0} not found")]
    NodeNotFound(NodeId),

    /// A port index exceeds the node's declared arity.
    #[error("task '{task}' ({node}) has no {direction} port {port} (arity {arity})")]
    PortOutOfRange {
        /// Task name.
        task: &'static str,
        /// Node the port was looked up on.
        node: NodeId,
        /// Port side.
        direction: PortDirection,
        /// Offending port index.
        port: usize,
        /// Declared arity for that side.
        arity: usize,
    },

    /// The destination input port already has an incoming edge.
    #[error("input port '{port}' of task '{task}' ({node}) already has an incoming edge")]
    PortOccupied {
        /// Task name.
        task: &'static str,
        /// Destination node.
        node: NodeId,
        /// Occupied port name.
        port: &'static str,
    },

    /// Source and destination are the same node.
    #[error("cannot connect task '{task}' ({node}) to itself")]
    SelfLoop {
        /// Task name.
        task: &'static str,
        /// The node.
        node: NodeId,
    },

    /// `connect_default` found no free input port on the destination.
    #[error("all {arity} input ports of task '{task}' ({node}) are already connected")]
    NoFreeInputPort {
        /// Task name.
        task: &'static str,
        /// Destination node.
        node: NodeId,
        /// Declared input arity.
        arity: usize,
    },
}

/// Directed acyclic graph of processing tasks.
///
/// Nodes are added with [`add_task`](Self::add_task) and wired with
/// [`connect`](Self::connect) / [`connect_default`](Self::connect_default).
/// Wiring checks (arity, occupancy, self-loops) run eagerly; full
/// acyclicity is validated by the scheduler's topological sort, since a
/// build-then-run-once graph gains nothing from a reachability scan on
/// every connect.
#[derive(Default)]
pub struct TaskGraph {
    pub(crate) nodes: Vec<Option<NodeData>>,
    pub(crate) edges: Vec<Option<Edge>>,
}

impl TaskGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a task node. Returns the new node's ID.
    pub fn add_task(&mut self, task: Box<dyn Task>) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        tracing::debug!("graph_add: {} '{}'", id, task.name());
        self.nodes.push(Some(NodeData::new(id, task)));
        id
    }

    /// Connects an output port of `from` to an input port of `to`.
    ///
    /// Returns the new edge's ID, or an error if either node is missing, a
    /// port index is out of range, the destination port is occupied, or the
    /// two ends are the same node.
    pub fn connect(
        &mut self,
        from: NodeId,
        from_port: usize,
        to: NodeId,
        to_port: usize,
    ) -> Result<EdgeId, GraphError> {
        if from == to {
            let node = self.node(from)?;
            return Err(GraphError::SelfLoop {
                task: node.task.name(),
                node: from,
            });
        }

        {
            let src = self.node(from)?;
            let out_arity = src.task.output_ports().len();
            if from_port >= out_arity {
                return Err(GraphError::PortOutOfRange {
                    task: src.task.name(),
                    node: from,
                    direction: PortDirection::Output,
                    port: from_port,
                    arity: out_arity,
                });
            }
        }

        {
            let dst = self.node(to)?;
            let in_ports = dst.task.input_ports();
            if to_port >= in_ports.len() {
                return Err(GraphError::PortOutOfRange {
                    task: dst.task.name(),
                    node: to,
                    direction: PortDirection::Input,
                    port: to_port,
                    arity: in_ports.len(),
                });
            }
            if self.incoming_edge(dst, to_port).is_some() {
                return Err(GraphError::PortOccupied {
                    task: dst.task.name(),
                    node: to,
                    port: in_ports[to_port],
                });
            }
        }

        let edge_id = EdgeId(self.edges.len() as u32);
        self.edges.push(Some(Edge {
            from,
            from_port,
            to,
            to_port,
        }));

        self.node_mut(from)?.outgoing.push(edge_id);
        self.node_mut(to)?.incoming.push(edge_id);

        tracing::debug!("graph_connect: {from}:{from_port} → {to}:{to_port}");
        Ok(edge_id)
    }

    /// Connects output port 0 of `from` to the next free input port of `to`.
    ///
    /// Ports fill in declaration order across successive calls, which is the
    /// wiring convention for single-input tasks and for tasks whose inputs
    /// are filled sequentially.
    pub fn connect_default(&mut self, from: NodeId, to: NodeId) -> Result<EdgeId, GraphError> {
        let free = {
            let dst = self.node(to)?;
            let arity = dst.task.input_ports().len();
            let free = (0..arity).find(|&p| self.incoming_edge(dst, p).is_none());
            match free {
                Some(p) => p,
                None => {
                    return Err(GraphError::NoFreeInputPort {
                        task: dst.task.name(),
                        node: to,
                        arity,
                    });
                }
            }
        };
        self.connect(from, 0, to, free)
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    /// The task name of a node, if it exists.
    pub fn task_name(&self, id: NodeId) -> Option<&'static str> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .map(|n| n.task.name())
    }

    /// Topological order of all nodes (Kahn), or `None` if the graph has a
    /// cycle.
    pub(crate) fn topo_order(&self) -> Option<Vec<NodeId>> {
        let mut in_degree: Vec<usize> = self
            .nodes
            .iter()
            .map(|n| n.as_ref().map_or(0, |n| n.incoming.len()))
            .collect();

        let mut queue: Vec<NodeId> = self
            .nodes
            .iter()
            .flatten()
            .filter(|n| n.incoming.is_empty())
            .map(|n| n.id)
            .collect();

        let mut order = Vec::with_capacity(self.node_count());
        while let Some(id) = queue.pop() {
            order.push(id);
            let node = self.nodes[id.0 as usize].as_ref()?;
            for &edge_id in &node.outgoing {
                let edge = self.edges[edge_id.0 as usize].as_ref()?;
                let dst = edge.to.0 as usize;
                in_degree[dst] -= 1;
                if in_degree[dst] == 0 {
                    queue.push(edge.to);
                }
            }
        }

        (order.len() == self.node_count()).then_some(order)
    }

    /// The edge arriving at `port` of `node`, if any.
    pub(crate) fn incoming_edge(&self, node: &NodeData, port: usize) -> Option<EdgeId> {
        node.incoming.iter().copied().find(|&e| {
            self.edges[e.0 as usize]
                .as_ref()
                .is_some_and(|edge| edge.to_port == port)
        })
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, GraphError> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or(GraphError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, GraphError> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or(GraphError::NodeNotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Ports, TaskError};

    struct Dummy {
        inputs: &'static [&'static str],
        outputs: &'static [&'static str],
    }

    impl Task for Dummy {
        fn name(&self) -> &'static str {
            "dummy"
        }
        fn input_ports(&self) -> &'static [&'static str] {
            self.inputs
        }
        fn output_ports(&self) -> &'static [&'static str] {
            self.outputs
        }
        fn run(self: Box<Self>, _ports: Ports) -> Result<(), TaskError> {
            Ok(())
        }
    }

    fn source() -> Box<Dummy> {
        Box::new(Dummy {
            inputs: &[],
            outputs: &["out"],
        })
    }

    fn filter() -> Box<Dummy> {
        Box::new(Dummy {
            inputs: &["in"],
            outputs: &["out"],
        })
    }

    fn merge3() -> Box<Dummy> {
        Box::new(Dummy {
            inputs: &["a", "b", "c"],
            outputs: &["out"],
        })
    }

    #[test]
    fn connect_tracks_nodes_and_edges() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let b = g.add_task(filter());
        g.connect(a, 0, b, 0).unwrap();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn input_port_accepts_one_edge() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let b = g.add_task(source());
        let c = g.add_task(filter());
        g.connect(a, 0, c, 0).unwrap();
        let err = g.connect(b, 0, c, 0).unwrap_err();
        assert!(matches!(err, GraphError::PortOccupied { port: "in", .. }));
    }

    #[test]
    fn output_port_fans_out() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let b = g.add_task(filter());
        let c = g.add_task(filter());
        g.connect(a, 0, b, 0).unwrap();
        g.connect(a, 0, c, 0).unwrap();
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn port_out_of_range_is_rejected() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let b = g.add_task(filter());
        let err = g.connect(a, 1, b, 0).unwrap_err();
        assert!(matches!(
            err,
            GraphError::PortOutOfRange {
                direction: PortDirection::Output,
                port: 1,
                arity: 1,
                ..
            }
        ));
        let err = g.connect(a, 0, b, 5).unwrap_err();
        assert!(matches!(
            err,
            GraphError::PortOutOfRange {
                direction: PortDirection::Input,
                ..
            }
        ));
    }

    #[test]
    fn self_loop_is_rejected() {
        let mut g = TaskGraph::new();
        let a = g.add_task(filter());
        assert!(matches!(
            g.connect(a, 0, a, 0),
            Err(GraphError::SelfLoop { .. })
        ));
    }

    #[test]
    fn connect_default_fills_ports_in_call_order() {
        let mut g = TaskGraph::new();
        let s1 = g.add_task(source());
        let s2 = g.add_task(source());
        let s3 = g.add_task(source());
        let m = g.add_task(merge3());

        g.connect_default(s1, m).unwrap();
        g.connect_default(s2, m).unwrap();
        g.connect_default(s3, m).unwrap();

        let s4 = g.add_task(source());
        assert!(matches!(
            g.connect_default(s4, m),
            Err(GraphError::NoFreeInputPort { arity: 3, .. })
        ));
    }

    #[test]
    fn unknown_node_is_rejected() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let ghost = NodeId(42);
        assert!(matches!(
            g.connect(a, 0, ghost, 0),
            Err(GraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn topo_order_covers_linear_chain() {
        let mut g = TaskGraph::new();
        let a = g.add_task(source());
        let b = g.add_task(filter());
        let c = g.add_task(filter());
        g.connect(a, 0, b, 0).unwrap();
        g.connect(b, 0, c, 0).unwrap();

        let order = g.topo_order().unwrap();
        let pos = |id: NodeId| order.iter().position(|&n| n == id).unwrap();
        assert!(pos(a) < pos(b));
        assert!(pos(b) < pos(c));
    }
}
