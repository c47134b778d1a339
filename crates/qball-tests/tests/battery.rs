//! Run the battery against real sampler output.

use qball_core::{SampleMode, Sampler, SamplerConfig, StatevectorSimulator};
use qball_tests::{calculate_quality_score, run_all_tests};

fn draw(range: u64, n: usize, seed: u64) -> Vec<u64> {
    let sampler = Sampler::with_backends(
        SamplerConfig::new(range).unwrap(),
        Box::new(StatevectorSimulator::seeded(seed)),
        None,
    );
    (0..n)
        .map(|_| sampler.sample(SampleMode::Local).unwrap())
        .collect()
}

#[test]
fn battery_accepts_sampler_output_shape() {
    let samples = draw(20, 2000, 5);
    let results = run_all_tests(&samples, 20);
    assert_eq!(results.len(), 4);
    for r in &results {
        assert!(
            !r.details.contains("outside"),
            "{}: sampler produced out-of-range values",
            r.name
        );
    }
}

#[test]
#[ignore] // Statistical; run with: cargo test -- --ignored
fn simulator_sampler_looks_uniform() {
    let samples = draw(20, 20_000, 2024);
    let results = run_all_tests(&samples, 20);
    for r in &results {
        println!("{:<16} {} p={:?} {}", r.name, r.grade, r.p_value, r.details);
    }
    assert!(calculate_quality_score(&results) >= 50.0);
}
