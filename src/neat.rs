//! The NEAT engine: population, speciation, and the generation transition.
//!
//! [`Neat`] owns everything that must persist for a whole evolutionary run:
//! the innovation registry, the population, and the species list. The driver
//! owns the fitness function: it writes `genome.fitness` for every member
//! of [`Neat::population`], then calls [`Neat::evolve`] to advance one
//! generation. The engine never schedules itself; "stop" is the driver
//! ceasing to call `evolve`.
//!
//! `evolve` builds the next population and species lists completely before
//! swapping them in, so the engine is observable in a consistent state even
//! if construction is aborted partway.

use log::debug;
use rand::Rng;

use crate::gene::{ConnectionGene, Innovation, NodeGene, NodeId, NodeRole};
use crate::genome::Genome;
use crate::innovation::InnovationLog;
use crate::species::Species;

/// Configuration for a NEAT run.
///
/// Construct with [`NeatConfig::new`] and override individual fields with
/// struct-update syntax:
///
/// ```
/// use neatwork::NeatConfig;
///
/// let config = NeatConfig {
///     max_nodes: 30,
///     compatibility_threshold: 4.0,
///     ..NeatConfig::new(100, 2, 1)
/// };
/// ```
#[derive(Debug, Clone)]
pub struct NeatConfig {
    /// Number of genomes in the population, held invariant by `evolve`.
    pub population_size: usize,
    /// Number of input nodes per genome.
    pub num_inputs: usize,
    /// Number of output nodes per genome.
    pub num_outputs: usize,
    /// Node-count ceiling; the add-node mutation is a no-op at this size.
    pub max_nodes: usize,
    /// Distance coefficient for excess genes (c1).
    pub excess_coeff: f32,
    /// Distance coefficient for disjoint genes (c2).
    pub disjoint_coeff: f32,
    /// Distance coefficient for mean matching-weight difference (c3).
    pub weight_coeff: f32,
    /// Genomes within this distance of a species representative join it.
    pub compatibility_threshold: f32,
    /// Generations without improvement before a species is culled.
    pub stagnation_threshold: u32,
    /// Per-child chance of a weight mutation pass.
    pub weight_mutation_prob: f32,
    /// Within a weight pass, per-connection chance to perturb rather than
    /// replace the weight.
    pub weight_perturb_prob: f32,
    /// Per-child chance of an add-connection mutation.
    pub add_connection_prob: f32,
    /// Per-child chance of an add-node mutation.
    pub add_node_prob: f32,
}

impl NeatConfig {
    /// Create a config with the canonical defaults for the given population
    /// and network shape.
    #[must_use]
    pub fn new(population_size: usize, num_inputs: usize, num_outputs: usize) -> Self {
        Self {
            population_size,
            num_inputs,
            num_outputs,
            ..Self::default()
        }
    }
}

impl Default for NeatConfig {
    fn default() -> Self {
        Self {
            population_size: 150,
            num_inputs: 2,
            num_outputs: 1,
            max_nodes: 50,
            excess_coeff: 1.0,
            disjoint_coeff: 1.0,
            weight_coeff: 0.5,
            compatibility_threshold: 3.0,
            stagnation_threshold: 20,
            weight_mutation_prob: 0.5,
            weight_perturb_prob: 0.9,
            add_connection_prob: 0.003,
            add_node_prob: 0.003,
        }
    }
}

/// The NEAT engine for one evolutionary run.
///
/// Holds all state that must persist across generations: the node-id and
/// innovation counters live inside [`InnovationLog`], which is owned here
/// and passed explicitly into genome mutations. Two engines never share
/// state, so concurrent runs stay isolated.
#[derive(Debug)]
pub struct Neat {
    /// Run configuration, fixed at construction.
    pub config: NeatConfig,
    /// The shared innovation registry.
    pub innovations: InnovationLog,
    /// Current population, in stable order. The driver writes each genome's
    /// `fitness` before calling [`evolve`](Self::evolve).
    pub population: Vec<Genome>,
    /// Current species list.
    pub species: Vec<Species>,
    generation: u64,
    /// Input/output node genes shared by every spawned genome.
    base_nodes: Vec<NodeGene>,
}

impl Neat {
    /// Create an engine and its initial population.
    ///
    /// The input and output node ids are allocated once from the registry;
    /// every initial genome reuses them, minimally connected (each input to
    /// each output) with a fresh uniform [-1, 1] weight per edge. Initial
    /// genomes therefore share all connection innovations.
    #[must_use]
    pub fn new<R: Rng>(config: NeatConfig, rng: &mut R) -> Self {
        let mut neat = Self {
            config,
            innovations: InnovationLog::new(),
            population: Vec::new(),
            species: Vec::new(),
            generation: 0,
            base_nodes: Vec::new(),
        };
        neat.initialize(rng);
        neat
    }

    /// Reinitialize the run: fresh registry, counters, species, and
    /// population. Equivalent to constructing a new engine with the same
    /// config.
    pub fn reset<R: Rng>(&mut self, rng: &mut R) {
        self.innovations = InnovationLog::new();
        self.species.clear();
        self.generation = 0;
        self.initialize(rng);
    }

    fn initialize<R: Rng>(&mut self, rng: &mut R) {
        self.base_nodes = Vec::with_capacity(self.config.num_inputs + self.config.num_outputs);
        for _ in 0..self.config.num_inputs {
            let id = self.innovations.allocate_node_id();
            self.base_nodes.push(NodeGene::new(id, NodeRole::Input));
        }
        for _ in 0..self.config.num_outputs {
            let id = self.innovations.allocate_node_id();
            self.base_nodes.push(NodeGene::new(id, NodeRole::Output));
        }

        let mut population = Vec::with_capacity(self.config.population_size);
        for _ in 0..self.config.population_size {
            let genome = self.spawn_genome_inner(rng);
            population.push(genome);
        }
        self.population = population;
    }

    /// Create a minimal fully-connected genome sharing the engine's base
    /// node ids and innovation registry.
    pub fn spawn_genome<R: Rng>(&mut self, rng: &mut R) -> Genome {
        self.spawn_genome_inner(rng)
    }

    fn spawn_genome_inner<R: Rng>(&mut self, rng: &mut R) -> Genome {
        let mut genome = Genome::new();
        for node in &self.base_nodes {
            genome.nodes.insert(node.id, node.clone());
        }
        for input in self.base_nodes.iter().filter(|n| n.role == NodeRole::Input) {
            for output in self.base_nodes.iter().filter(|n| n.role == NodeRole::Output) {
                let innovation = self.innovations.connection(input.id, output.id);
                let weight = rng.random::<f32>() * 2.0 - 1.0;
                genome.connections.insert(
                    innovation,
                    ConnectionGene::new(input.id, output.id, weight, innovation),
                );
            }
        }
        genome
    }

    /// Look up or allocate the innovation number for a (source, target)
    /// pair. Idempotent for the lifetime of the engine.
    pub fn innovation_for(&mut self, source: NodeId, target: NodeId) -> Innovation {
        self.innovations.connection(source, target)
    }

    /// Number of completed generations.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The fittest genome of the current population, ties broken toward the
    /// earliest position. `None` only for an empty population.
    #[must_use]
    pub fn best_genome(&self) -> Option<&Genome> {
        let mut best: Option<&Genome> = None;
        for genome in &self.population {
            if best.is_none_or(|b| genome.fitness > b.fitness) {
                best = Some(genome);
            }
        }
        best
    }

    /// Genetic distance between two genomes.
    ///
    /// Weighted sum of excess genes, disjoint genes, and the mean weight
    /// difference of matching genes; the structural terms are normalized by
    /// the larger connection count when it is at least 20, else left
    /// unnormalized. A gene missing from the other genome counts as excess
    /// when its innovation exceeds the other genome's maximum, else as
    /// disjoint, evaluated per side. That can differ from the canonical
    /// NEAT excess/disjoint split and is kept deliberately.
    #[must_use]
    pub fn distance(&self, a: &Genome, b: &Genome) -> f32 {
        Self::compatibility(&self.config, a, b)
    }

    fn compatibility(config: &NeatConfig, a: &Genome, b: &Genome) -> f32 {
        let mut matching = 0usize;
        let mut disjoint = 0usize;
        let mut excess = 0usize;
        let mut weight_diff = 0.0f32;

        let a_max = a.connections.keys().next_back().copied();
        let b_max = b.connections.keys().next_back().copied();

        for (innovation, gene) in &a.connections {
            match b.connections.get(innovation) {
                Some(other) => {
                    matching += 1;
                    weight_diff += (gene.weight - other.weight).abs();
                }
                None => {
                    if b_max.is_none_or(|max| *innovation > max) {
                        excess += 1;
                    } else {
                        disjoint += 1;
                    }
                }
            }
        }
        for innovation in b.connections.keys() {
            if !a.connections.contains_key(innovation) {
                if a_max.is_none_or(|max| *innovation > max) {
                    excess += 1;
                } else {
                    disjoint += 1;
                }
            }
        }

        let n = a.connections.len().max(b.connections.len());
        let norm = if n < 20 { 1.0 } else { n as f32 };
        let avg_weight_diff = if matching > 0 {
            weight_diff / matching as f32
        } else {
            0.0
        };

        config.excess_coeff * excess as f32 / norm
            + config.disjoint_coeff * disjoint as f32 / norm
            + config.weight_coeff * avg_weight_diff
    }

    /// Advance one generation.
    ///
    /// Expects the driver to have written every genome's `fitness`. The
    /// transition runs in strict order: stagnation bookkeeping, stagnant-
    /// species culling (the best species is always kept), re-speciation of
    /// the whole population, empty-species removal and representative
    /// re-election, adjusted-fitness computation, global single-genome
    /// elitism, proportional per-species reproduction, and a top-up pass
    /// that breeds the best species (or spawns fresh minimal genomes) until
    /// the population is back at full size. Degenerate generations, such as
    /// zero total adjusted fitness or vanished species, resolve through
    /// those fallbacks and never error.
    pub fn evolve<R: Rng>(&mut self, rng: &mut R) {
        let mut species = std::mem::take(&mut self.species);

        // 1. Stagnation bookkeeping against each species' best-ever fitness.
        for sp in &mut species {
            let best = sp.best_member_fitness();
            if best > sp.best_fitness {
                sp.best_fitness = best;
                sp.stagnation = 0;
            } else {
                sp.stagnation += 1;
            }
        }

        // 2. Cull stagnant species; rank 0 survives unconditionally.
        species.sort_by(|x, y| y.best_fitness.total_cmp(&x.best_fitness));
        let stagnation_threshold = self.config.stagnation_threshold;
        let mut rank = 0;
        species.retain(|sp| {
            let keep = rank == 0 || sp.stagnation < stagnation_threshold;
            rank += 1;
            keep
        });

        // 3. Re-speciate: each genome joins the first compatible species,
        // or founds a new one with itself as representative.
        for sp in &mut species {
            sp.clear();
        }
        for genome in &self.population {
            let mut placed = false;
            for i in 0..species.len() {
                if Self::compatibility(&self.config, genome, &species[i].representative)
                    < self.config.compatibility_threshold
                {
                    species[i].add_member(genome.clone());
                    placed = true;
                    break;
                }
            }
            if !placed {
                species.push(Species::new(genome.clone()));
            }
        }

        // 4. Drop species that attracted no members, then elect a random
        // member as each survivor's next representative.
        species.retain(|sp| !sp.is_empty());
        for sp in &mut species {
            sp.representative = sp.members[rng.random_range(0..sp.members.len())].clone();
        }

        // 5. Adjusted fitness (per-species mean) and its sum.
        for sp in &mut species {
            sp.calculate_adjusted_fitness();
        }
        let total_adjusted: f32 = species.iter().map(|sp| sp.adjusted_fitness).sum();

        debug!(
            "generation {}: {} species, total adjusted fitness {:.4}",
            self.generation,
            species.len(),
            total_adjusted
        );

        // 6. Global elitism: the single fittest genome survives unmodified.
        let mut next_population = Vec::with_capacity(self.config.population_size);
        if let Some(best) = self.best_genome() {
            next_population.push(best.clone());
        }

        // 7. Proportional reproduction against the remaining budget.
        let budget = self
            .config
            .population_size
            .saturating_sub(next_population.len());
        for sp in &mut species {
            sp.members.sort_by(|x, y| y.fitness.total_cmp(&x.fitness));
            let quota = if total_adjusted > 0.0 {
                ((sp.adjusted_fitness / total_adjusted) * budget as f32).floor() as usize
            } else {
                0
            };

            // Parents come from the top half by fitness, the whole list if
            // that pool is somehow empty.
            let pool_len = sp.members.len().div_ceil(2);
            let pool = if pool_len > 0 {
                &sp.members[..pool_len]
            } else {
                &sp.members[..]
            };
            if pool.is_empty() {
                continue;
            }

            for _ in 0..quota {
                let parent1 = &pool[rng.random_range(0..pool.len())];
                let parent2 = &pool[rng.random_range(0..pool.len())];
                let mut child = parent1.crossover(parent2, rng);

                // Independent mutation rolls, not mutually exclusive.
                if rng.random::<f32>() < self.config.weight_mutation_prob {
                    child.mutate_weights(self.config.weight_perturb_prob, rng);
                }
                if rng.random::<f32>() < self.config.add_connection_prob {
                    child.mutate_add_connection(&mut self.innovations, rng);
                }
                if rng.random::<f32>() < self.config.add_node_prob {
                    child.mutate_add_node(&mut self.innovations, self.config.max_nodes, rng);
                }
                next_population.push(child);
            }
        }

        // 8. Top up any shortfall (floor rounding, zero adjusted fitness) by
        // breeding the best species with a forced connection mutation, or
        // spawning fresh minimal genomes if no species has members.
        let bred = next_population.len();
        let best_species = species
            .iter()
            .enumerate()
            .filter(|(_, sp)| !sp.is_empty())
            .max_by(|(_, x), (_, y)| x.adjusted_fitness.total_cmp(&y.adjusted_fitness))
            .map(|(i, _)| i);
        while next_population.len() < self.config.population_size {
            match best_species {
                Some(i) => {
                    let members = &species[i].members;
                    let parent1 = &members[rng.random_range(0..members.len())];
                    let parent2 = &members[rng.random_range(0..members.len())];
                    let mut child = parent1.crossover(parent2, rng);
                    child.mutate_add_connection(&mut self.innovations, rng);
                    next_population.push(child);
                }
                None => {
                    let genome = self.spawn_genome_inner(rng);
                    next_population.push(genome);
                }
            }
        }

        debug!(
            "generation {} reproduced: 1 elite, {} bred, {} topped up",
            self.generation,
            bred.saturating_sub(1),
            self.config.population_size.saturating_sub(bred),
        );

        // Swap in the fully built state.
        self.population = next_population;
        self.species = species;
        self.generation += 1;
    }
}
