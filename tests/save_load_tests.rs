#![allow(missing_docs)]
#![allow(clippy::float_cmp)]

use dino_evo::EvoError;
use dino_evo::simulation::brain::Topology;
use dino_evo::simulation::population::{Population, PopulationConfig};
use std::fs;

fn create_test_population() -> Population {
    let config = PopulationConfig::new(8, Topology::new(5, 6, 1)).with_mutation_rate(0.2);
    Population::with_seed(config, 99).expect("valid config")
}

#[test]
fn test_save_and_load() {
    let mut population = create_test_population();
    for generation in 0..3 {
        let scores: Vec<f64> = (0..8).map(|i| f64::from(i * (generation + 1))).collect();
        population.evolve(&scores).unwrap();
    }

    let dir = tempfile::tempdir().unwrap();
    let save_path = dir.path().join("population.json");

    population
        .save_to_file(&save_path)
        .expect("Failed to save population");
    let loaded = Population::load_from_file(&save_path).expect("Failed to load population");

    assert_eq!(loaded.config(), population.config());
    assert_eq!(loaded.generation(), population.generation());
    assert_eq!(loaded.networks(), population.networks());
    assert_eq!(loaded.best_fitness(), population.best_fitness());
    assert_eq!(loaded.avg_fitness(), population.avg_fitness());
    assert_eq!(loaded.best_network(), population.best_network());
    assert_eq!(
        loaded.champion().map(|c| c.fitness),
        population.champion().map(|c| c.fitness)
    );
    assert_eq!(loaded.history().len(), 3);
}

#[test]
fn test_save_creates_valid_json() {
    let population = create_test_population();
    let dir = tempfile::tempdir().unwrap();
    let save_path = dir.path().join("population.json");

    population.save_to_file(&save_path).expect("Failed to save");

    let json_content = fs::read_to_string(&save_path).expect("Failed to read save file");
    let parsed: serde_json::Value = serde_json::from_str(&json_content).expect("Invalid JSON");

    assert!(parsed.get("config").is_some());
    assert!(parsed.get("generation").is_some());
    assert_eq!(parsed["networks"].as_array().map(Vec::len), Some(8));
}

#[test]
fn test_load_nonexistent_file() {
    let dir = tempfile::tempdir().unwrap();
    let result = Population::load_from_file(dir.path().join("missing.json"));
    assert!(matches!(result, Err(EvoError::Io(_))));
}

#[test]
fn test_load_invalid_json() {
    let dir = tempfile::tempdir().unwrap();
    let invalid_path = dir.path().join("invalid.json");
    fs::write(&invalid_path, "{ this is not valid json }").expect("Failed to write test file");

    let result = Population::load_from_file(&invalid_path);
    assert!(matches!(result, Err(EvoError::Json(_))));
}

#[test]
fn test_load_rejects_wrong_network_count() {
    let population = create_test_population();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.json");
    population.save_to_file(&path).unwrap();

    let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["networks"].as_array_mut().unwrap().pop();
    fs::write(&path, json.to_string()).unwrap();

    assert!(matches!(
        Population::load_from_file(&path),
        Err(EvoError::InvalidConfig(_))
    ));
}

#[test]
fn test_load_rejects_topology_mismatch() {
    let population = create_test_population();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.json");
    population.save_to_file(&path).unwrap();

    let mut json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    json["config"]["topology"]["hidden"] = serde_json::json!(7);
    fs::write(&path, json.to_string()).unwrap();

    assert!(matches!(
        Population::load_from_file(&path),
        Err(EvoError::TopologyMismatch { .. })
    ));
}

#[test]
fn test_load_and_continue_evolution() {
    let population = create_test_population();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("population.json");
    population.save_to_file(&path).unwrap();

    let mut loaded = Population::load_from_file(&path).unwrap();
    loaded.reseed(1);
    let summary = loaded.evolve(&[1.0; 8]).unwrap();

    assert_eq!(summary.generation, 1);
    assert_eq!(loaded.generation(), 2);
    assert_eq!(loaded.networks().len(), 8);
}
