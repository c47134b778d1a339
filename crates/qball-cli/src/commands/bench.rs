use qball_tests::{TestResult, calculate_quality_score, run_all_tests};

use crate::RemoteArgs;

pub fn run(
    remote: &RemoteArgs,
    range: &str,
    samples: usize,
    mode: &str,
    output_path: Option<&str>,
) {
    let mode = super::parse_mode(mode);
    let sampler = super::make_sampler(super::make_config(remote, range));
    let range = sampler.range();

    println!(
        "Drawing {samples} samples in [0, {range}) ({mode}, {} qubits)...",
        sampler.bit_width()
    );
    let t0 = std::time::Instant::now();
    let values = super::sample::draw(&sampler, mode, samples, qball_core::DEFAULT_MAX_ATTEMPTS)
        .unwrap_or_else(|e| super::fail(e));
    let elapsed = t0.elapsed().as_secs_f64();

    let results = run_all_tests(&values, range);
    let score = calculate_quality_score(&results);

    println!();
    println!(
        "  {:<18} {:>5} {:>10} {:>12}  Details",
        "Test", "Grade", "p-value", "Statistic"
    );
    println!("  {}", "-".repeat(70));
    for r in &results {
        let status = if r.passed { "✓" } else { "✗" };
        let p = r
            .p_value
            .map(|p| format!("{p:.4}"))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{status} {:<18} {:>5} {:>10} {:>12.4}  {}",
            r.name, r.grade, p, r.statistic, r.details
        );
    }
    println!();
    println!(
        "Quality score: {score:.1}/100  ({} samples in {elapsed:.2}s)",
        values.len()
    );

    if let Some(path) = output_path {
        let report = report_json(range, mode.to_string(), elapsed, score, &results);
        let written = serde_json::to_string_pretty(&report)
            .map_err(|e| e.to_string())
            .and_then(|s| std::fs::write(path, s).map_err(|e| e.to_string()));
        match written {
            Ok(()) => println!("Results written to {path}"),
            Err(e) => super::fail(format!("failed to write {path}: {e}")),
        }
    }
}

fn report_json(
    range: u64,
    mode: String,
    elapsed_secs: f64,
    score: f64,
    results: &[TestResult],
) -> serde_json::Value {
    serde_json::json!({
        "version": qball_core::VERSION,
        "range": range,
        "mode": mode,
        "elapsed_secs": elapsed_secs,
        "quality_score": score,
        "tests": results.iter().map(|r| serde_json::json!({
            "name": r.name,
            "passed": r.passed,
            "p_value": r.p_value,
            "statistic": r.statistic,
            "grade": r.grade.to_string(),
            "details": r.details,
        })).collect::<Vec<_>>(),
    })
}
