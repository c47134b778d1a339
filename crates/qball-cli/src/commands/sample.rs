use std::io::{self, Write};

use qball_core::{SampleMode, Sampler};

use crate::RemoteArgs;

pub struct SampleCommandConfig<'a> {
    pub remote: &'a RemoteArgs,
    pub range: &'a str,
    pub count: usize,
    pub mode: &'a str,
    pub max_attempts: u32,
    pub shots: u32,
    pub max_batches: u32,
    pub json: bool,
}

pub fn run(cfg: SampleCommandConfig<'_>) {
    let mode = super::parse_mode(cfg.mode);
    let config = super::make_config(cfg.remote, cfg.range)
        .with_shots(cfg.shots)
        .and_then(|c| c.with_max_batches(cfg.max_batches))
        .unwrap_or_else(|e| super::fail(e));
    let sampler = super::make_sampler(config);

    let values = draw(&sampler, mode, cfg.count, cfg.max_attempts).unwrap_or_else(|e| super::fail(e));

    let mut stdout = io::stdout().lock();
    let written = if cfg.json {
        writeln!(stdout, "{}", serde_json::Value::from(values))
    } else {
        values.iter().try_for_each(|v| writeln!(stdout, "{v}"))
    };
    if let Err(e) = written {
        super::fail(e);
    }
}

/// Draw `count` values, stopping at the first failure.
pub fn draw(
    sampler: &Sampler,
    mode: SampleMode,
    count: usize,
    max_attempts: u32,
) -> Result<Vec<u64>, qball_core::SamplerError> {
    let mut values = Vec::with_capacity(count);
    let mut rejected = 0u64;
    for _ in 0..count {
        let sample = sampler.sample_with(mode, max_attempts)?;
        rejected += u64::from(sample.rejected);
        values.push(sample.value);
    }
    log::info!(
        "drew {count} value(s) in [0, {}) with {rejected} rejection(s)",
        sampler.range()
    );
    Ok(values)
}
