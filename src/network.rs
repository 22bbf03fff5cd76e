//! Network evaluation for NEAT genomes.
//!
//! A [`Network`] is a compiled, evaluation-ready snapshot of a genome. The
//! compile step flattens the gene tables into dense arrays with incoming
//! connections in Compressed Sparse Row (CSR) form, so activation is an
//! allocation-light sweep over flat buffers.
//!
//! Evaluation is deliberately *not* a topological feedforward pass: every
//! non-input node is recomputed for a fixed number of synchronous cycles,
//! each cycle reading only the fully-settled values of the previous one.
//! This fixed-iteration relaxation is a simple, stable approximation that
//! supports recurrent and cyclic connections; replacing it with a cyclic
//! solver would change evolved behavior.

use thiserror::Error;

use crate::gene::NodeRole;
use crate::genome::Genome;

/// Error produced when activating a [`Network`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// The input vector length does not match the genome's input node count.
    #[error("input length mismatch: expected {expected}, got {got}")]
    InputLengthMismatch {
        /// Number of input-role nodes in the genome.
        expected: usize,
        /// Length of the supplied input vector.
        got: usize,
    },
}

/// A compiled, reusable evaluator for one genome.
///
/// Built by [`Genome::network`]. Activation is a pure function of the input
/// vector: node values are re-initialized on every call, so a `Network` can
/// be shared and invoked repeatedly without carrying state between calls.
#[derive(Debug, Clone)]
pub struct Network {
    node_count: usize,
    /// Dense indices of input nodes, in node-creation order.
    input_indices: Vec<usize>,
    /// Dense indices of output nodes, in node-creation order.
    output_indices: Vec<usize>,
    /// Dense indices recomputed each cycle (every non-input node).
    eval_indices: Vec<usize>,
    // CSR layout of enabled incoming connections: for dense node i, the
    // incoming edges live at csr_sources/csr_weights[csr_offsets[i]..csr_offsets[i+1]].
    csr_offsets: Vec<usize>,
    csr_sources: Vec<usize>,
    csr_weights: Vec<f32>,
    activation_cycles: usize,
}

impl Network {
    /// Compile a genome into a network evaluator.
    ///
    /// `activation_cycles` is the number of synchronous relaxation passes
    /// performed per [`activate`](Self::activate) call.
    #[must_use]
    pub fn new(genome: &Genome, activation_cycles: usize) -> Self {
        // Dense index per node, in ascending id order (= creation order for
        // engine-built genomes). BTreeMap iteration makes this deterministic.
        let ids: Vec<_> = genome.nodes.keys().copied().collect();
        let node_count = ids.len();
        let mut input_indices = Vec::new();
        let mut output_indices = Vec::new();
        let mut eval_indices = Vec::new();

        for (idx, node) in genome.nodes.values().enumerate() {
            match node.role {
                NodeRole::Input => input_indices.push(idx),
                NodeRole::Output => {
                    output_indices.push(idx);
                    eval_indices.push(idx);
                }
                NodeRole::Hidden => eval_indices.push(idx),
            }
        }

        // Incoming-edge CSR over enabled connections, visited in innovation
        // order for a deterministic floating-point summation order.
        let edges: Vec<(usize, usize, f32)> = genome
            .connections
            .values()
            .filter(|c| c.enabled)
            .filter_map(|c| {
                let source = ids.binary_search(&c.source).ok()?;
                let target = ids.binary_search(&c.target).ok()?;
                Some((source, target, c.weight))
            })
            .collect();

        let mut counts = vec![0usize; node_count];
        for &(_, target, _) in &edges {
            counts[target] += 1;
        }

        let mut csr_offsets = Vec::with_capacity(node_count + 1);
        csr_offsets.push(0);
        for &count in &counts {
            csr_offsets.push(csr_offsets[csr_offsets.len() - 1] + count);
        }

        let total = csr_offsets[node_count];
        let mut csr_sources = vec![0usize; total];
        let mut csr_weights = vec![0.0f32; total];
        let mut write_pos = csr_offsets[..node_count].to_vec();

        for (source, target, weight) in edges {
            let pos = write_pos[target];
            csr_sources[pos] = source;
            csr_weights[pos] = weight;
            write_pos[target] += 1;
        }

        Self {
            node_count,
            input_indices,
            output_indices,
            eval_indices,
            csr_offsets,
            csr_sources,
            csr_weights,
            activation_cycles,
        }
    }

    /// Activate the network on an input vector.
    ///
    /// All node values start at 0; the inputs overwrite the input-node
    /// values; then every non-input node is updated for `activation_cycles`
    /// synchronous passes, each computing `sigmoid(Σ weight × source value)`
    /// over its enabled incoming connections from the previous cycle's
    /// snapshot. Returns the output-node values in node-creation order.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InputLengthMismatch`] when `inputs.len()`
    /// differs from the genome's input node count. This is the engine's only
    /// user-facing error condition.
    pub fn activate(&self, inputs: &[f32]) -> Result<Vec<f32>, NetworkError> {
        if inputs.len() != self.input_indices.len() {
            return Err(NetworkError::InputLengthMismatch {
                expected: self.input_indices.len(),
                got: inputs.len(),
            });
        }

        let mut values = vec![0.0f32; self.node_count];
        for (&idx, &input) in self.input_indices.iter().zip(inputs) {
            values[idx] = input;
        }
        // Input slots are never rewritten, so both buffers keep them intact
        // across swaps.
        let mut next = values.clone();

        for _ in 0..self.activation_cycles {
            for &idx in &self.eval_indices {
                let mut sum = 0.0;
                for pos in self.csr_offsets[idx]..self.csr_offsets[idx + 1] {
                    sum += values[self.csr_sources[pos]] * self.csr_weights[pos];
                }
                next[idx] = sigmoid(sum);
            }
            std::mem::swap(&mut values, &mut next);
        }

        Ok(self.output_indices.iter().map(|&idx| values[idx]).collect())
    }

    /// Number of input nodes this network expects.
    #[must_use]
    pub fn num_inputs(&self) -> usize {
        self.input_indices.len()
    }

    /// Number of output values this network produces.
    #[must_use]
    pub fn num_outputs(&self) -> usize {
        self.output_indices.len()
    }
}

/// Logistic sigmoid, clamped so `exp` cannot overflow.
#[inline]
fn sigmoid(x: f32) -> f32 {
    let clamped = x.clamp(-88.0, 88.0);
    1.0 / (1.0 + (-clamped).exp())
}
