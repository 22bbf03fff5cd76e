//! Integration tests for neatwork.

use neatwork::{Genome, Neat, NeatConfig, NetworkError, NodeId};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// XOR fitness: (4 - summed squared error)^2, evaluated with two
/// activation cycles.
fn xor_fitness(genome: &Genome) -> f32 {
    let network = genome.network(2);
    let cases = [
        ([0.0_f32, 0.0], 0.0_f32),
        ([0.0, 1.0], 1.0),
        ([1.0, 0.0], 1.0),
        ([1.0, 1.0], 0.0),
    ];

    let mut error = 0.0;
    for (inputs, expected) in &cases {
        let output = network.activate(inputs).expect("two inputs");
        error += (output[0] - expected).powi(2);
    }
    (4.0 - error).powi(2)
}

fn evaluate(neat: &mut Neat) -> f32 {
    let mut best = f32::NEG_INFINITY;
    for genome in &mut neat.population {
        genome.fitness = xor_fitness(genome);
        best = best.max(genome.fitness);
    }
    best
}

#[test]
fn test_population_size_invariant_across_generations() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(NeatConfig::new(60, 2, 1), &mut rng);

    for _ in 0..20 {
        assert_eq!(neat.population.len(), 60);
        evaluate(&mut neat);
        neat.evolve(&mut rng);
        assert_eq!(neat.population.len(), 60);
    }
}

#[test]
fn test_best_fitness_never_decreases_under_elitism() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut neat = Neat::new(NeatConfig::new(80, 2, 1), &mut rng);

    let mut previous_best = f32::NEG_INFINITY;
    for generation in 0..40 {
        let best = evaluate(&mut neat);
        assert!(
            best >= previous_best - 1e-5,
            "best fitness dropped from {previous_best} to {best} at generation {generation}"
        );
        previous_best = previous_best.max(best);
        neat.evolve(&mut rng);
    }
    assert!(previous_best > 0.0);
}

#[test]
fn test_genome_invariants_hold_during_evolution() {
    let config = NeatConfig {
        add_connection_prob: 0.3,
        add_node_prob: 0.2,
        ..NeatConfig::new(40, 2, 1)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(config, &mut rng);

    let mut grew = false;
    for _ in 0..10 {
        evaluate(&mut neat);
        neat.evolve(&mut rng);

        for genome in &neat.population {
            // Every connection endpoint must be a node of the same genome.
            for conn in genome.connections.values() {
                assert!(genome.nodes.contains_key(&conn.source));
                assert!(genome.nodes.contains_key(&conn.target));
            }
            // Connection keys agree with the genes they hold.
            for (innovation, conn) in &genome.connections {
                assert_eq!(*innovation, conn.innovation);
            }
            assert!(genome.node_count() <= 50);
            if genome.node_count() > 3 {
                grew = true;
            }
        }
    }
    assert!(grew, "structural mutation never added a node in 10 generations");
}

#[test]
fn test_innovation_numbers_stable_across_engine_lifetime() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(NeatConfig::new(30, 2, 1), &mut rng);

    let before = neat.innovation_for(NodeId(0), NodeId(2));
    for _ in 0..5 {
        evaluate(&mut neat);
        neat.evolve(&mut rng);
    }
    let after = neat.innovation_for(NodeId(0), NodeId(2));
    assert_eq!(before, after, "the registry outlives generations");
}

#[test]
fn test_identical_splits_converge_across_genomes() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(NeatConfig::new(5, 1, 1), &mut rng);

    // One input, one output: both genomes hold exactly the same single
    // connection, so the split pick is forced and identical.
    let mut a = neat.population[0].clone();
    let mut b = neat.population[1].clone();
    a.mutate_add_node(&mut neat.innovations, 50, &mut rng);
    b.mutate_add_node(&mut neat.innovations, 50, &mut rng);

    let a_keys: Vec<_> = a.connections.keys().copied().collect();
    let b_keys: Vec<_> = b.connections.keys().copied().collect();
    assert_eq!(a_keys, b_keys);

    let a_nodes: Vec<_> = a.nodes.keys().copied().collect();
    let b_nodes: Vec<_> = b.nodes.keys().copied().collect();
    assert_eq!(a_nodes, b_nodes);
}

#[test]
fn test_network_surface_errors_only_on_bad_input() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let neat = Neat::new(NeatConfig::new(5, 3, 2), &mut rng);
    let network = neat.population[0].network(2);

    let err = network.activate(&[1.0, 2.0]).expect_err("three inputs required");
    assert_eq!(
        err,
        NetworkError::InputLengthMismatch {
            expected: 3,
            got: 2
        }
    );

    let outputs = network.activate(&[1.0, 2.0, 3.0]).expect("three inputs");
    assert_eq!(outputs.len(), 2, "one value per output node");
}

#[test]
fn test_distance_of_identical_genomes_is_zero() {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(NeatConfig::new(5, 2, 1), &mut rng);

    let mut genome = neat.population[0].clone();
    for _ in 0..3 {
        genome.mutate_add_node(&mut neat.innovations, 50, &mut rng);
    }
    assert_eq!(neat.distance(&genome, &genome), 0.0);
    assert_eq!(neat.distance(&genome, &genome.clone()), 0.0);
}

#[test]
fn test_crossover_child_structure_is_bounded_by_parents() {
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut neat = Neat::new(NeatConfig::new(10, 2, 1), &mut rng);

    let mut strong = neat.population[0].clone();
    let mut weak = neat.population[1].clone();
    strong.fitness = 5.0;
    weak.fitness = 1.0;
    for _ in 0..2 {
        strong.mutate_add_node(&mut neat.innovations, 50, &mut rng);
        weak.mutate_add_node(&mut neat.innovations, 50, &mut rng);
        strong.mutate_add_connection(&mut neat.innovations, &mut rng);
    }

    let child = strong.crossover(&weak, &mut rng);

    let child_nodes: Vec<_> = child.nodes.keys().copied().collect();
    let primary_nodes: Vec<_> = strong.nodes.keys().copied().collect();
    assert_eq!(child_nodes, primary_nodes);

    for innovation in child.connections.keys() {
        assert!(
            strong.connections.contains_key(innovation)
                || weak.connections.contains_key(innovation),
            "child may not invent genes"
        );
    }
}

#[test]
fn test_xor_run_stays_well_formed() {
    // A longer driver loop in the exact shape an application would use:
    // evaluate, evolve, repeat, then read the champion back out.
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut neat = Neat::new(NeatConfig::new(100, 2, 1), &mut rng);

    for _ in 0..30 {
        evaluate(&mut neat);
        neat.evolve(&mut rng);
    }
    evaluate(&mut neat);

    let best = neat.best_genome().expect("population is non-empty");
    assert!(best.fitness > 0.0);

    let network = best.network(2);
    for inputs in [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]] {
        let output = network.activate(&inputs).expect("two inputs");
        assert_eq!(output.len(), 1);
        assert!(output[0].is_finite());
        assert!(output[0] >= 0.0 && output[0] <= 1.0, "sigmoid range");
    }
}
