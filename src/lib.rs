//! # Neatwork
//!
//! A NEAT (`NeuroEvolution` of Augmenting Topologies) engine: genome
//! representation, structural mutation, crossover with innovation-number
//! alignment, speciation by genetic distance, and a generational
//! reproduction loop.
//!
//! ## Features
//!
//! - **Registry-Based Innovation**: a per-engine registry maps every
//!   (source, target) pair to a stable innovation number, so identical
//!   structural mutations converge across genomes and generations
//! - **Speciation with Fitness Sharing**: genomes are grouped by genetic
//!   distance; reproductive quota is allocated from per-species mean fitness
//! - **Recurrence-Tolerant Evaluation**: networks are activated by a fixed
//!   number of synchronous relaxation cycles, so cyclic connections are
//!   well-defined without a topological solver
//! - **Injected Randomness**: every stochastic operation takes `&mut impl
//!   Rng`, keeping seeded runs reproducible end to end
//!
//! ## Quick Start
//!
//! The driver owns the fitness function: evaluate every genome, write its
//! `fitness`, then ask the engine for the next generation.
//!
//! ```rust
//! use neatwork::{Neat, NeatConfig};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut neat = Neat::new(NeatConfig::new(50, 2, 1), &mut rng);
//!
//! for _ in 0..10 {
//!     for genome in &mut neat.population {
//!         let network = genome.network(2);
//!         let output = network.activate(&[1.0, 0.0]).unwrap();
//!         genome.fitness = 1.0 - (output[0] - 1.0).powi(2);
//!     }
//!     neat.evolve(&mut rng);
//! }
//!
//! assert_eq!(neat.population.len(), 50);
//! let best = neat.best_genome().unwrap();
//! println!("best fitness: {:.4}", best.fitness);
//! ```
//!
//! ## Architecture
//!
//! ### Engine-Owned Run State
//!
//! The innovation registry and the node-id counter are the only state shared
//! across genomes. They live in [`InnovationLog`], owned by [`Neat`] and
//! passed explicitly into mutating operations rather than sitting in
//! process-wide globals, so concurrent evolutionary runs are fully isolated.
//!
//! ### Generation Transition
//!
//! [`Neat::evolve`] is a single atomic transition: stagnant species are
//! culled (the best always survives), the population is re-speciated, the
//! single fittest genome is carried over unmodified, and offspring quotas
//! are allocated proportionally to per-species adjusted fitness. The next
//! population and species lists are built completely before being swapped
//! in. Degenerate generations resolve through deterministic fallbacks; the
//! population size is invariant.
//!
//! The engine is single-threaded and never schedules itself. If parallelism
//! is ever wanted, the safe point is the driver's per-genome fitness loop:
//! genomes are independent and read-only during evaluation.

pub mod gene;
pub mod genome;
pub mod innovation;
pub mod neat;
pub mod network;
pub mod species;

// Re-exports for convenience
pub use gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeRole};
pub use genome::Genome;
pub use innovation::InnovationLog;
pub use neat::{Neat, NeatConfig};
pub use network::{Network, NetworkError};
pub use species::Species;
