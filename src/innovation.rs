//! Innovation tracking for NEAT.
//!
//! Structural mutations are assigned stable identifiers from a registry owned
//! by the engine: the first time a (source, target) connection appears
//! anywhere in the run it receives the next free innovation number, and every
//! later occurrence of the same pair, in any genome and any generation,
//! reuses it. This alignment is what makes crossover and the distance metric
//! meaningful across independently mutated genomes.
//!
//! The registry is an explicit value passed to genome-mutating operations,
//! never a process-wide global, so multiple concurrent evolutionary runs stay
//! isolated from each other.

use std::collections::HashMap;

use crate::gene::{Innovation, NodeId};

/// Registry of structural innovations for one evolutionary run.
///
/// Holds the (source, target) → innovation mapping, the split table used to
/// converge node ids when the same connection is split in different genomes,
/// and the counters backing both.
#[derive(Debug, Clone, Default)]
pub struct InnovationLog {
    /// Ordered (source, target) pairs seen so far.
    connections: HashMap<(NodeId, NodeId), Innovation>,
    /// Hidden node allocated for each split connection.
    splits: HashMap<Innovation, NodeId>,
    next_innovation: u64,
    next_node_id: u32,
}

impl InnovationLog {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up or allocate the innovation number for a (source, target) pair.
    ///
    /// Idempotent: the same ordered pair always yields the same number for
    /// the lifetime of the registry.
    pub fn connection(&mut self, source: NodeId, target: NodeId) -> Innovation {
        if let Some(&innovation) = self.connections.get(&(source, target)) {
            return innovation;
        }
        let innovation = Innovation(self.next_innovation);
        self.next_innovation += 1;
        self.connections.insert((source, target), innovation);
        innovation
    }

    /// Look up or allocate the hidden node id for splitting a connection.
    ///
    /// Keyed by the split connection's innovation number, so the same split
    /// performed in two different genomes converges to the same node id (and
    /// therefore to the same pair of replacement-connection innovations).
    pub fn split_node(&mut self, connection: Innovation) -> NodeId {
        if let Some(&id) = self.splits.get(&connection) {
            return id;
        }
        let id = self.allocate_node_id();
        self.splits.insert(connection, id);
        id
    }

    /// Allocate the next unused node id.
    pub fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    /// Number of distinct structural innovations recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Whether the registry has recorded no innovations yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_lookup_is_idempotent() {
        let mut log = InnovationLog::new();
        let a = log.connection(NodeId(0), NodeId(2));
        let b = log.connection(NodeId(0), NodeId(2));
        assert_eq!(a, b, "same pair must reuse the same innovation");
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_connection_order_matters() {
        let mut log = InnovationLog::new();
        let forward = log.connection(NodeId(1), NodeId(2));
        let backward = log.connection(NodeId(2), NodeId(1));
        assert_ne!(forward, backward);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_innovations_are_sequential() {
        let mut log = InnovationLog::new();
        let first = log.connection(NodeId(0), NodeId(3));
        let second = log.connection(NodeId(1), NodeId(3));
        assert_eq!(first, Innovation(0));
        assert_eq!(second, Innovation(1));
    }

    #[test]
    fn test_split_node_converges() {
        let mut log = InnovationLog::new();
        let conn = log.connection(NodeId(0), NodeId(1));
        let a = log.split_node(conn);
        let b = log.split_node(conn);
        assert_eq!(a, b, "splitting the same connection must reuse the node id");
    }

    #[test]
    fn test_node_ids_are_sequential() {
        let mut log = InnovationLog::new();
        assert_eq!(log.allocate_node_id(), NodeId(0));
        assert_eq!(log.allocate_node_id(), NodeId(1));
        let split = log.split_node(Innovation(9));
        assert_eq!(split, NodeId(2));
    }
}
