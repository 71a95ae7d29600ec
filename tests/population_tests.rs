#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dino_evo::EvoError;
use dino_evo::simulation::brain::{Network, Topology};
use dino_evo::simulation::population::{Population, PopulationConfig, rank};

fn create_test_config(size: usize) -> PopulationConfig {
    PopulationConfig::new(size, Topology::new(5, 8, 1))
}

#[test]
fn test_population_creation() {
    let config = create_test_config(20);
    let population = Population::with_seed(config, 1).unwrap();

    assert_eq!(population.networks().len(), 20);
    assert_eq!(population.generation(), 1);
    assert!(population.best_fitness().is_none());
    assert!(population.avg_fitness().is_none());
    assert!(population.best_network().is_none());

    for network in population.networks() {
        assert_eq!(network.topology(), config.topology);
    }
}

#[test]
fn test_evolve_ranking_scenario() {
    let mut population = Population::with_seed(create_test_config(4), 2024).unwrap();
    let before = population.networks().to_vec();

    let ranked: Vec<usize> = rank(&[10.0, 40.0, 5.0, 25.0]).iter().map(|r| r.index).collect();
    assert_eq!(ranked, vec![1, 3, 0, 2]);

    let summary = population.evolve(&[10.0, 40.0, 5.0, 25.0]).unwrap();

    assert_eq!(summary.best_fitness, 40.0);
    assert_eq!(summary.avg_fitness, 20.0);
    assert_eq!(population.best_fitness(), Some(40.0));
    assert_eq!(population.avg_fitness(), Some(20.0));
    assert_eq!(population.best_network(), Some(&before[1]));

    // elites, in ranked order, unchanged
    assert_eq!(population.networks()[0], before[1]);
    assert_eq!(population.networks()[1], before[3]);

    assert_eq!(population.networks().len(), 4);
    assert_eq!(population.generation(), 2);
}

#[test]
fn test_best_network_unaffected_by_later_mutation() {
    let mut population = Population::with_seed(create_test_config(4), 3).unwrap();
    population.evolve(&[1.0, 2.0, 3.0, 4.0]).unwrap();
    let recorded = population.best_network().cloned().unwrap();

    // the elite copy in the new generation is a different instance
    let mut elite = population.networks()[0].clone();
    assert_eq!(elite, recorded);
    let mut rng = rand::rng();
    elite.mutate(1.0, &mut rng).unwrap();

    assert_eq!(population.best_network(), Some(&recorded));
    assert_ne!(elite, recorded);
}

#[test]
fn test_evolve_length_mismatch_leaves_state_untouched() {
    let mut population = Population::with_seed(create_test_config(4), 4).unwrap();
    let networks = population.networks().to_vec();

    for scores in [vec![], vec![1.0; 3], vec![1.0; 5]] {
        let err = population.evolve(&scores).unwrap_err();
        assert!(matches!(err, EvoError::FitnessLength { expected: 4, .. }));
    }

    assert_eq!(population.generation(), 1);
    assert_eq!(population.networks(), networks.as_slice());
    assert!(population.best_fitness().is_none());
    assert!(population.avg_fitness().is_none());
}

#[test]
fn test_reset_restores_structural_invariants() {
    let config = create_test_config(6);
    let mut population = Population::with_seed(config, 5).unwrap();
    for _ in 0..3 {
        population.evolve(&[3.0, 1.0, 4.0, 1.0, 5.0, 9.0]).unwrap();
    }
    let evolved = population.networks().to_vec();

    population.reset();
    assert_eq!(population.generation(), 1);
    assert!(population.best_fitness().is_none());
    assert!(population.champion().is_none());

    population.initialize();
    assert_eq!(population.generation(), 1);
    assert_eq!(population.networks().len(), 6);
    for (network, old) in population.networks().iter().zip(&evolved) {
        assert_eq!(network.topology(), config.topology);
        assert_ne!(network, old);
    }
}

#[test]
fn test_initialize_keeps_generation() {
    let mut population = Population::with_seed(create_test_config(3), 6).unwrap();
    population.evolve(&[1.0, 2.0, 3.0]).unwrap();
    population.evolve(&[1.0, 2.0, 3.0]).unwrap();

    population.initialize();
    assert_eq!(population.generation(), 3);
    assert!(population.best_fitness().is_none());
    assert_eq!(population.history().len(), 2);
}

#[test]
fn test_selection_pressure_improves_fitness() {
    // fitness: how close the network's output for a fixed input is to 1
    let inputs = [0.2, 0.4, 0.6, 0.8, 1.0];
    let score = |network: &Network| f64::from(network.predict(&inputs).unwrap()[0]);

    let mut population = Population::with_seed(create_test_config(30), 7).unwrap();
    let initial_avg = population.networks().iter().map(score).sum::<f64>() / 30.0;

    for _ in 0..40 {
        let scores: Vec<f64> = population.networks().iter().map(score).collect();
        population.evolve(&scores).unwrap();
    }
    let final_avg = population.networks().iter().map(score).sum::<f64>() / 30.0;

    assert!(final_avg > initial_avg);
    assert!(population.champion().unwrap().fitness > 0.9);
}
