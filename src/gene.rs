//! Gene types for NEAT genomes.
//!
//! This module defines the fundamental building blocks of NEAT networks:
//! - [`NodeGene`]: Represents neurons in the network
//! - [`ConnectionGene`]: Represents weighted connections between nodes

use serde::{Deserialize, Serialize};

/// Unique identifier for a node.
///
/// Node ids are allocated by the engine's [`InnovationLog`] and are stable
/// across the whole run: two genomes holding the same `NodeId` refer to the
/// same structural position, which is what lets crossover inherit nodes by
/// id alone.
///
/// [`InnovationLog`]: crate::innovation::InnovationLog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Stable identifier for a structural innovation.
///
/// The first time a (source, target) connection appears anywhere in the run
/// it is assigned the next free innovation number; every later genome that
/// independently evolves the same edge reuses it. Innovation numbers key the
/// connection table of every genome and drive gene alignment in crossover
/// and the distance metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Innovation(pub u64);

/// The role of a node in the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// Input node - receives external values, no activation applied.
    Input,
    /// Output node - produces final network output.
    Output,
    /// Hidden node - internal processing node added through mutation.
    Hidden,
}

/// A node gene representing a neuron in the NEAT network.
///
/// Immutable once created; reproduction clones node genes rather than
/// mutating them in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGene {
    /// Engine-allocated stable identifier.
    pub id: NodeId,
    /// The role of this node in the network.
    pub role: NodeRole,
}

impl NodeGene {
    /// Create a new node gene.
    #[must_use]
    pub fn new(id: NodeId, role: NodeRole) -> Self {
        Self { id, role }
    }
}

/// A connection gene representing a weighted link between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionGene {
    /// The source node of this connection.
    pub source: NodeId,
    /// The target node of this connection.
    pub target: NodeId,
    /// The connection weight.
    pub weight: f32,
    /// Whether this connection is active.
    /// Disabled connections are skipped during evaluation but preserved for crossover.
    pub enabled: bool,
    /// The registry-assigned innovation number for the (source, target) pair.
    pub innovation: Innovation,
}

impl ConnectionGene {
    /// Create a new enabled connection.
    #[must_use]
    pub fn new(source: NodeId, target: NodeId, weight: f32, innovation: Innovation) -> Self {
        Self {
            source,
            target,
            weight,
            enabled: true,
            innovation,
        }
    }

    /// Disable this connection, keeping the gene in place.
    pub fn disable(&mut self) {
        self.enabled = false;
    }
}
