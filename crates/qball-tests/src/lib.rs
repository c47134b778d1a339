//! Uniformity test battery for bounded integer samples.
//!
//! Every test takes samples already reduced to `[0, range)` and checks one
//! property a uniform, independent source must have. Each returns a
//! [`TestResult`] with a p-value, a pass/fail determination, and a letter
//! grade (A through F).

use statrs::distribution::{ChiSquared, ContinuousCDF};
use statrs::function::erf::erfc;

/// Minimum expected count per chi-squared bin.
pub const MIN_EXPECTED_PER_BIN: f64 = 5.0;

// ═══════════════════════════════════════════════════════════════════════════════
// Core types
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a single uniformity test.
#[derive(Debug, Clone)]
pub struct TestResult {
    pub name: String,
    pub passed: bool,
    pub p_value: Option<f64>,
    pub statistic: f64,
    pub details: String,
    pub grade: char,
}

impl TestResult {
    /// Assign a letter grade based on p-value.
    ///
    /// - A: p >= 0.1
    /// - B: p >= 0.01
    /// - C: p >= 0.001
    /// - D: p >= 0.0001
    /// - F: otherwise or None
    pub fn grade_from_p(p: Option<f64>) -> char {
        match p {
            Some(p) if p >= 0.1 => 'A',
            Some(p) if p >= 0.01 => 'B',
            Some(p) if p >= 0.001 => 'C',
            Some(p) if p >= 0.0001 => 'D',
            _ => 'F',
        }
    }

    /// Determine pass/fail from p-value against a threshold (default 0.01).
    pub fn pass_from_p(p: Option<f64>, threshold: f64) -> bool {
        match p {
            Some(p) => p >= threshold,
            None => false,
        }
    }

    fn from_p(name: &str, p: Option<f64>, statistic: f64, details: String) -> Self {
        Self {
            name: name.to_string(),
            passed: Self::pass_from_p(p, 0.01),
            p_value: p,
            statistic,
            details,
            grade: Self::grade_from_p(p),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Helpers
// ═══════════════════════════════════════════════════════════════════════════════

/// Return a failing `TestResult` when data is too short.
fn insufficient(name: &str, needed: usize, got: usize) -> TestResult {
    TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: 0.0,
        details: format!("Insufficient data: need {needed}, got {got}"),
        grade: 'F',
    }
}

/// Chi-squared statistic of observed counts against a flat expectation.
fn chi_squared_flat(counts: &[u64], expected: f64) -> f64 {
    counts
        .iter()
        .map(|&c| {
            let diff = c as f64 - expected;
            diff * diff / expected
        })
        .sum()
}

fn chi_squared_sf(statistic: f64, df: f64) -> Option<f64> {
    ChiSquared::new(df).ok().map(|d| d.sf(statistic))
}

/// Samples outside `[0, range)` mean the sampler itself is broken.
fn out_of_range(name: &str, samples: &[u64], range: u64) -> Option<TestResult> {
    let bad = samples.iter().filter(|&&v| v >= range).count();
    (bad > 0).then(|| TestResult {
        name: name.to_string(),
        passed: false,
        p_value: None,
        statistic: bad as f64,
        details: format!("{bad} sample(s) outside [0, {range})"),
        grade: 'F',
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

/// Value frequency: chi-squared over `range` bins, `range - 1` degrees of freedom.
pub fn value_frequency(samples: &[u64], range: u64) -> TestResult {
    let name = "Value Frequency";
    if let Some(r) = out_of_range(name, samples, range) {
        return r;
    }
    let n = samples.len();
    let needed = (range as f64 * MIN_EXPECTED_PER_BIN).ceil() as usize;
    if range < 2 || n < needed {
        return insufficient(name, needed, n);
    }
    let mut hist = vec![0u64; range as usize];
    for &v in samples {
        hist[v as usize] += 1;
    }
    let expected = n as f64 / range as f64;
    let chi2 = chi_squared_flat(&hist, expected);
    let p = chi_squared_sf(chi2, (range - 1) as f64);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("n={n}, bins={range}, expected_per_bin={expected:.1}"),
    )
}

/// Serial pairs: chi-squared over non-overlapping consecutive pairs, `range² - 1` df.
pub fn serial_pairs(samples: &[u64], range: u64) -> TestResult {
    let name = "Serial Pairs";
    if let Some(r) = out_of_range(name, samples, range) {
        return r;
    }
    let pairs = samples.len() / 2;
    let bins = range.saturating_mul(range);
    let needed_pairs = (bins as f64 * MIN_EXPECTED_PER_BIN).ceil() as usize;
    if range < 2 || pairs < needed_pairs {
        return insufficient(name, needed_pairs.saturating_mul(2), samples.len());
    }
    let mut hist = vec![0u64; bins as usize];
    for pair in samples.chunks_exact(2) {
        hist[(pair[0] * range + pair[1]) as usize] += 1;
    }
    let expected = pairs as f64 / bins as f64;
    let chi2 = chi_squared_flat(&hist, expected);
    let p = chi_squared_sf(chi2, (bins - 1) as f64);
    TestResult::from_p(
        name,
        p,
        chi2,
        format!("pairs={pairs}, bins={bins}, expected_per_bin={expected:.1}"),
    )
}

/// Mean: z-test against `(range - 1) / 2` with variance `(range² - 1) / 12`.
pub fn mean_test(samples: &[u64], range: u64) -> TestResult {
    let name = "Mean";
    if let Some(r) = out_of_range(name, samples, range) {
        return r;
    }
    let n = samples.len();
    if range < 2 || n < 30 {
        return insufficient(name, 30, n);
    }
    let mean = samples.iter().map(|&v| v as f64).sum::<f64>() / n as f64;
    let expected = (range - 1) as f64 / 2.0;
    let variance = ((range as f64).powi(2) - 1.0) / 12.0;
    let z = (mean - expected) / (variance / n as f64).sqrt();
    let p = erfc(z.abs() / 2.0_f64.sqrt());
    TestResult::from_p(
        name,
        Some(p),
        z,
        format!("mean={mean:.4}, expected={expected:.4}, n={n}"),
    )
}

/// Runs above/below the midpoint (Wald-Wolfowitz). Values equal to the
/// midpoint of an odd range are skipped.
pub fn runs_test(samples: &[u64], range: u64) -> TestResult {
    let name = "Runs";
    if let Some(r) = out_of_range(name, samples, range) {
        return r;
    }
    // Compare 2v against range - 1 to keep the midpoint exact.
    let mid2 = range.saturating_sub(1);
    let signs: Vec<bool> = samples
        .iter()
        .filter(|&&v| 2 * v != mid2)
        .map(|&v| 2 * v > mid2)
        .collect();
    let n1 = signs.iter().filter(|&&s| s).count();
    let n2 = signs.len() - n1;
    if n1 < 10 || n2 < 10 {
        return insufficient(name, 20, signs.len());
    }
    let runs = 1 + signs.windows(2).filter(|w| w[0] != w[1]).count();

    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let n = n1f + n2f;
    let expected = 2.0 * n1f * n2f / n + 1.0;
    let variance = 2.0 * n1f * n2f * (2.0 * n1f * n2f - n) / (n * n * (n - 1.0));
    if variance <= 0.0 {
        return insufficient(name, 20, signs.len());
    }
    let z = (runs as f64 - expected) / variance.sqrt();
    let p = erfc(z.abs() / 2.0_f64.sqrt());
    TestResult::from_p(
        name,
        Some(p),
        z,
        format!("runs={runs}, expected={expected:.1}, above={n1}, below={n2}"),
    )
}

// ═══════════════════════════════════════════════════════════════════════════════
// Battery
// ═══════════════════════════════════════════════════════════════════════════════

/// Run every test in the battery.
pub fn run_all_tests(samples: &[u64], range: u64) -> Vec<TestResult> {
    let tests: Vec<fn(&[u64], u64) -> TestResult> =
        vec![value_frequency, serial_pairs, mean_test, runs_test];
    tests.into_iter().map(|t| t(samples, range)).collect()
}

/// Weighted grade average, 0-100.
pub fn calculate_quality_score(results: &[TestResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    let total: f64 = results
        .iter()
        .map(|r| match r.grade {
            'A' => 100.0,
            'B' => 75.0,
            'C' => 50.0,
            'D' => 25.0,
            _ => 0.0,
        })
        .sum();
    total / results.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const RANGE: u64 = 20;

    /// Every value exactly equally often.
    fn cyclic(range: u64, repeats: usize) -> Vec<u64> {
        (0..repeats).flat_map(|_| 0..range).collect()
    }

    /// Every ordered pair exactly equally often.
    fn all_pairs(range: u64, repeats: usize) -> Vec<u64> {
        (0..repeats)
            .flat_map(|_| (0..range).flat_map(move |a| (0..range).flat_map(move |b| [a, b])))
            .collect()
    }

    #[test]
    fn test_grade_from_p() {
        assert_eq!(TestResult::grade_from_p(Some(0.5)), 'A');
        assert_eq!(TestResult::grade_from_p(Some(0.05)), 'B');
        assert_eq!(TestResult::grade_from_p(Some(0.005)), 'C');
        assert_eq!(TestResult::grade_from_p(Some(0.0005)), 'D');
        assert_eq!(TestResult::grade_from_p(Some(0.00000001)), 'F');
        assert_eq!(TestResult::grade_from_p(None), 'F');
    }

    #[test]
    fn test_pass_from_p() {
        assert!(TestResult::pass_from_p(Some(0.05), 0.01));
        assert!(!TestResult::pass_from_p(Some(0.005), 0.01));
        assert!(!TestResult::pass_from_p(None, 0.01));
    }

    #[test]
    fn test_frequency_flat_histogram_passes() {
        let r = value_frequency(&cyclic(RANGE, 50), RANGE);
        assert!(r.passed, "{r:?}");
        assert_eq!(r.statistic, 0.0);
    }

    #[test]
    fn test_frequency_constant_fails() {
        let r = value_frequency(&vec![3; 1000], RANGE);
        assert!(!r.passed);
        assert_eq!(r.grade, 'F');
    }

    #[test]
    fn test_frequency_insufficient() {
        let r = value_frequency(&[1, 2, 3], RANGE);
        assert!(!r.passed);
        assert!(r.p_value.is_none());
        assert!(r.details.contains("Insufficient"));
    }

    #[test]
    fn test_out_of_range_sample_fails() {
        let mut data = cyclic(RANGE, 50);
        data.push(RANGE);
        for r in run_all_tests(&data, RANGE) {
            assert!(!r.passed, "{} should fail", r.name);
            assert!(r.details.contains("outside"));
        }
    }

    #[test]
    fn test_serial_all_pairs_passes() {
        let r = serial_pairs(&all_pairs(4, 10), 4);
        assert!(r.passed, "{r:?}");
    }

    #[test]
    fn test_serial_detects_cyclic_pattern() {
        // 0,1,2,3,... only ever produces pairs (even, even + 1).
        let r = serial_pairs(&cyclic(4, 200), 4);
        assert!(!r.passed, "{r:?}");
    }

    #[test]
    fn test_mean_balanced_passes() {
        let r = mean_test(&cyclic(RANGE, 10), RANGE);
        assert!(r.passed);
        assert!(r.statistic.abs() < 1e-9);
    }

    #[test]
    fn test_mean_skewed_fails() {
        let data: Vec<u64> = (0..500).map(|i| i % 5).collect();
        assert!(!mean_test(&data, RANGE).passed);
    }

    #[test]
    fn test_runs_expected_count_passes() {
        // L H H L repeated gives exactly the expected number of runs.
        let data: Vec<u64> = (0..100).flat_map(|_| [2, 17, 17, 2]).collect();
        let r = runs_test(&data, RANGE);
        assert!(r.passed, "{r:?}");
        assert!(r.statistic.abs() < 1e-9);
    }

    #[test]
    fn test_runs_alternating_fails() {
        let data: Vec<u64> = (0..200).flat_map(|_| [0, 19]).collect();
        assert!(!runs_test(&data, RANGE).passed);
    }

    #[test]
    fn test_runs_skips_midpoint_of_odd_range() {
        // Range 5: midpoint 2 is neither above nor below.
        let data: Vec<u64> = (0..50).flat_map(|_| [2, 0, 4, 4, 0]).collect();
        let r = runs_test(&data, 5);
        assert!(r.details.contains("above=100"), "{}", r.details);
        assert!(r.details.contains("below=100"), "{}", r.details);
    }

    #[test]
    fn test_quality_score() {
        let results = run_all_tests(&all_pairs(4, 10), 4);
        assert_eq!(results.len(), 4);
        let score = calculate_quality_score(&results);
        assert!((0.0..=100.0).contains(&score));
        assert_eq!(calculate_quality_score(&[]), 0.0);
    }
}
