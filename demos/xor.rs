//! XOR example for neatwork.
//!
//! Evolves a neural network to solve the XOR problem, a classic benchmark
//! for neuroevolution algorithms: the minimal solution needs at least one
//! hidden node, so it exercises structural mutation, not just weight search.
//!
//! Run with: `cargo run --example xor`

use neatwork::{Genome, Neat, NeatConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const XOR_INPUTS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];
const XOR_OUTPUTS: [f32; 4] = [0.0, 1.0, 1.0, 0.0];

const POPULATION_SIZE: usize = 150;
const MAX_GENERATIONS: usize = 500;
/// Number of relaxation passes per activation; two are enough for one
/// hidden layer while keeping recurrent links meaningful.
const ACTIVATION_CYCLES: usize = 2;
/// A near-perfect score; (4 - error)^2 tops out at 16.
const SOLVED_FITNESS: f32 = 15.9;

/// Fitness is the squared headroom below the maximum summed error:
/// (4 - Σ squared error)^2, so small error reductions near the solution
/// are rewarded sharply.
fn xor_fitness(genome: &Genome) -> f32 {
    let network = genome.network(ACTIVATION_CYCLES);
    let mut error = 0.0;

    for (inputs, expected) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = network.activate(inputs).expect("two inputs");
        error += (output[0] - expected).powi(2);
    }
    (4.0 - error).powi(2)
}

fn main() {
    env_logger::init();

    println!("NEAT XOR Example");
    println!("================\n");

    let seed = 42;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut neat = Neat::new(NeatConfig::new(POPULATION_SIZE, 2, 1), &mut rng);

    println!("Population: {POPULATION_SIZE}");
    println!("Max generations: {MAX_GENERATIONS}");
    println!("Activation cycles: {ACTIVATION_CYCLES}\n");

    let mut champion: Option<Genome> = None;
    let mut solution_generation = None;

    for gen in 0..MAX_GENERATIONS {
        let mut best_fitness = f32::NEG_INFINITY;
        for genome in &mut neat.population {
            genome.fitness = xor_fitness(genome);
            if genome.fitness > best_fitness {
                best_fitness = genome.fitness;
                champion = Some(genome.clone());
            }
        }

        if gen % 10 == 0 {
            let avg: f32 = neat.population.iter().map(|g| g.fitness).sum::<f32>()
                / neat.population.len() as f32;
            println!(
                "Gen {:3}: best={:.3}, avg={:.3}, species={}",
                gen,
                best_fitness,
                avg,
                neat.species.len()
            );
        }

        if best_fitness > SOLVED_FITNESS {
            solution_generation = Some(gen);
            println!("\nSolution found at generation {gen}!");
            break;
        }

        neat.evolve(&mut rng);
    }

    let Some(champion) = champion else {
        println!("No genome was ever evaluated.");
        return;
    };

    println!("\nBest Genome found:");
    println!("Fitness: {:.3}", champion.fitness);
    println!(
        "Nodes: {} | Connections: {} ({} enabled)",
        champion.node_count(),
        champion.connection_count(),
        champion.enabled_connection_count()
    );
    if solution_generation.is_none() {
        println!("(no full solution within {MAX_GENERATIONS} generations)");
    }

    println!("\n--- Testing the best network ---");
    let network = champion.network(ACTIVATION_CYCLES);
    for (inputs, expected) in XOR_INPUTS.iter().zip(XOR_OUTPUTS) {
        let output = network.activate(inputs).expect("two inputs");
        let rounded = if output[0] > 0.5 { 1.0 } else { 0.0 };
        let status = if (rounded - expected).abs() < 0.1 {
            "ok"
        } else {
            "MISS"
        };
        println!(
            "Input: [{}, {}] -> Output: {:.5} (Expected: {}) {}",
            inputs[0] as i32, inputs[1] as i32, output[0], expected as i32, status
        );
    }
}
