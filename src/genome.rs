//! NEAT genome implementation.
//!
//! A [`Genome`] is one candidate network's genetic encoding: a table of node
//! genes keyed by stable node id and a table of connection genes keyed by
//! innovation number. Both tables are `BTreeMap`s so iteration order is
//! deterministic, which keeps seeded runs reproducible and fixes the output
//! ordering of compiled networks.
//!
//! Mutation operators take the engine's [`InnovationLog`] explicitly; a
//! genome never reaches for global state.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeRole};
use crate::innovation::InnovationLog;
use crate::network::Network;

/// A NEAT genome: node genes, connection genes, and the externally assigned
/// fitness for the current generation.
///
/// Invariant: every connection's `source` and `target` are keys of `nodes`.
/// All constructors and operators preserve it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Genome {
    /// Node genes keyed by node id.
    pub nodes: BTreeMap<NodeId, NodeGene>,
    /// Connection genes keyed by innovation number.
    pub connections: BTreeMap<Innovation, ConnectionGene>,
    /// Fitness assigned by the driver before each `evolve` call.
    pub fitness: f32,
}

impl Genome {
    /// Create an empty genome.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of input-role nodes.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.role == NodeRole::Input)
            .count()
    }

    /// Number of output-role nodes.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.nodes
            .values()
            .filter(|n| n.role == NodeRole::Output)
            .count()
    }

    /// Total number of node genes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Total number of connection genes, enabled or not.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Number of enabled connection genes.
    #[must_use]
    pub fn enabled_connection_count(&self) -> usize {
        self.connections.values().filter(|c| c.enabled).count()
    }

    /// Mutate the genome by adding a connection between two existing nodes.
    ///
    /// Two node ids are drawn uniformly (with replacement) from the genome.
    /// The mutation is a no-op if the destination candidate is an input node,
    /// the two picks are the same node, or a connection between the pair
    /// already exists in either direction. An output → hidden pick is swapped
    /// to hidden → output before creation, which biases growth toward
    /// feed-forward structure without forbidding recurrence.
    ///
    /// On success the new gene is enabled, weighted uniformly in [-1, 1], and
    /// registered under the innovation number the registry assigns to the
    /// (source, target) pair.
    pub fn mutate_add_connection<R: Rng>(&mut self, innovations: &mut InnovationLog, rng: &mut R) {
        let node_ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        if node_ids.is_empty() {
            return;
        }

        let mut source = node_ids[rng.random_range(0..node_ids.len())];
        let mut target = node_ids[rng.random_range(0..node_ids.len())];

        // Inputs cannot be a destination.
        if self.nodes[&target].role == NodeRole::Input {
            return;
        }

        // No self-loops.
        if source == target {
            return;
        }

        // Swap output -> hidden into hidden -> output.
        if self.nodes[&source].role == NodeRole::Output
            && self.nodes[&target].role == NodeRole::Hidden
        {
            std::mem::swap(&mut source, &mut target);
        }

        let exists = self.connections.values().any(|c| {
            (c.source == source && c.target == target)
                || (c.source == target && c.target == source)
        });
        if exists {
            return;
        }

        let innovation = innovations.connection(source, target);
        let weight = rng.random::<f32>() * 2.0 - 1.0;
        self.connections
            .insert(innovation, ConnectionGene::new(source, target, weight, innovation));
    }

    /// Mutate the genome by splitting an existing connection with a new
    /// hidden node.
    ///
    /// No-op when the genome already holds `max_nodes` nodes or has no
    /// connections. Otherwise a uniformly random connection (enabled or not)
    /// is disabled (the original gene is kept, never deleted) and replaced
    /// by two enabled connections through a fresh hidden node:
    /// source → new with weight 1.0, and new → target with the split
    /// connection's original weight.
    ///
    /// The hidden node's id comes from the registry's split table, so the
    /// same split performed in another genome converges to the same node id
    /// and the same replacement innovations. Re-splitting an edge this genome
    /// already split falls back to a brand-new node id.
    pub fn mutate_add_node<R: Rng>(
        &mut self,
        innovations: &mut InnovationLog,
        max_nodes: usize,
        rng: &mut R,
    ) {
        if self.nodes.len() >= max_nodes {
            return;
        }
        if self.connections.is_empty() {
            return;
        }

        let keys: Vec<Innovation> = self.connections.keys().copied().collect();
        let picked = keys[rng.random_range(0..keys.len())];

        let (source, target, old_weight) = match self.connections.get_mut(&picked) {
            Some(conn) => {
                conn.disable();
                (conn.source, conn.target, conn.weight)
            }
            None => return,
        };

        let mut node_id = innovations.split_node(picked);
        if self.nodes.contains_key(&node_id) {
            node_id = innovations.allocate_node_id();
        }
        self.nodes
            .insert(node_id, NodeGene::new(node_id, NodeRole::Hidden));

        let in_innovation = innovations.connection(source, node_id);
        self.connections.insert(
            in_innovation,
            ConnectionGene::new(source, node_id, 1.0, in_innovation),
        );

        let out_innovation = innovations.connection(node_id, target);
        self.connections.insert(
            out_innovation,
            ConnectionGene::new(node_id, target, old_weight, out_innovation),
        );
    }

    /// Mutate connection weights in place.
    ///
    /// For every connection independently: with probability `perturb_chance`
    /// the weight is nudged by a uniform delta in [-0.1, 0.1], otherwise it
    /// is replaced by a fresh uniform weight in [-2, 2]. Exactly one branch
    /// applies per connection.
    pub fn mutate_weights<R: Rng>(&mut self, perturb_chance: f32, rng: &mut R) {
        for conn in self.connections.values_mut() {
            if rng.random::<f32>() < perturb_chance {
                conn.weight += (rng.random::<f32>() * 2.0 - 1.0) * 0.1;
            } else {
                conn.weight = rng.random::<f32>() * 4.0 - 2.0;
            }
        }
    }

    /// Cross this genome with another, producing a child.
    ///
    /// The higher-fitness parent is primary (ties break toward `self`). The
    /// child inherits every node gene from the primary parent only. Matching
    /// connections (same innovation in both parents) are copied from a
    /// 50/50 random parent; if either parent's copy is disabled, the child's
    /// gene has a 75% chance of being disabled too. Connections only the
    /// primary holds are copied unmodified; connections only the secondary
    /// holds are never inherited.
    #[must_use]
    pub fn crossover<R: Rng>(&self, other: &Genome, rng: &mut R) -> Genome {
        let (primary, secondary) = if self.fitness >= other.fitness {
            (self, other)
        } else {
            (other, self)
        };

        let nodes = primary.nodes.clone();
        let mut connections = BTreeMap::new();

        for (&innovation, gene) in &primary.connections {
            let inherited = match secondary.connections.get(&innovation) {
                Some(other_gene) => {
                    let mut chosen = if rng.random::<f32>() < 0.5 {
                        gene.clone()
                    } else {
                        other_gene.clone()
                    };
                    if (!gene.enabled || !other_gene.enabled) && rng.random::<f32>() < 0.75 {
                        chosen.disable();
                    }
                    chosen
                }
                // Disjoint or excess gene of the primary parent.
                None => gene.clone(),
            };
            connections.insert(innovation, inherited);
        }

        Genome {
            nodes,
            connections,
            fitness: 0.0,
        }
    }

    /// Compile this genome into a [`Network`] evaluator.
    ///
    /// `activation_cycles` is the number of synchronous relaxation passes per
    /// activation; see [`Network::activate`].
    #[must_use]
    pub fn network(&self, activation_cycles: usize) -> Network {
        Network::new(self, activation_cycles)
    }
}
