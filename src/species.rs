//! Species: fitness-sharing groups of structurally similar genomes.
//!
//! A species is defined by a representative genome; population members join
//! the first species whose representative is within the compatibility
//! threshold. Fitness sharing is approximated per species by averaging
//! member fitness, and species that stop improving for too long are culled
//! (the best species is always exempt). Member lists are cleared and rebuilt
//! on every generation; representatives change only between generations.

use crate::genome::Genome;

/// One species in the population.
#[derive(Debug, Clone)]
pub struct Species {
    /// Genome used for compatibility-distance comparisons. Replaced with a
    /// random member at the end of each speciation pass, never mid-pass.
    pub representative: Genome,
    /// Current-generation members. These are clones of population genomes,
    /// so a species still knows its previous members (and their fitness)
    /// after the population has been replaced; the stagnation check at the
    /// start of the next generation reads exactly that.
    pub members: Vec<Genome>,
    /// Mean member fitness, the species' share weight for reproduction.
    pub adjusted_fitness: f32,
    /// Best member fitness ever observed in this species.
    pub best_fitness: f32,
    /// Generations since `best_fitness` last improved.
    pub stagnation: u32,
}

impl Species {
    /// Found a new species around a representative, which also becomes its
    /// first member.
    #[must_use]
    pub fn new(representative: Genome) -> Self {
        let members = vec![representative.clone()];
        Self {
            representative,
            members,
            adjusted_fitness: 0.0,
            best_fitness: 0.0,
            stagnation: 0,
        }
    }

    /// Append a member for the current generation.
    pub fn add_member(&mut self, genome: Genome) {
        self.members.push(genome);
    }

    /// Highest fitness among current members.
    ///
    /// Negative infinity for an empty species; callers drop empty species
    /// before reading this.
    #[must_use]
    pub fn best_member_fitness(&self) -> f32 {
        self.members
            .iter()
            .map(|g| g.fitness)
            .fold(f32::NEG_INFINITY, f32::max)
    }

    /// Recompute the adjusted fitness as the arithmetic mean of member
    /// fitness.
    pub fn calculate_adjusted_fitness(&mut self) {
        self.adjusted_fitness = if self.members.is_empty() {
            0.0
        } else {
            self.members.iter().map(|g| g.fitness).sum::<f32>() / self.members.len() as f32
        };
    }

    /// Empty the member list ahead of a speciation pass.
    pub fn clear(&mut self) {
        self.members.clear();
    }

    /// Number of current members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the species currently has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
