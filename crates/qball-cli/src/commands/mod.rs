pub mod ask;
pub mod bench;
pub mod sample;
pub mod server;

use std::time::Duration;

use qball_core::{EightBall, RemoteConfig, SampleMode, Sampler, SamplerConfig, parse_range};

use crate::RemoteArgs;

/// Print an error and exit with status 1.
pub fn fail(err: impl std::fmt::Display) -> ! {
    eprintln!("Error: {err}");
    std::process::exit(1);
}

/// Remote connection settings from the global flags.
pub fn remote_config(args: &RemoteArgs) -> RemoteConfig {
    RemoteConfig {
        endpoint: args.endpoint.clone(),
        channel: args.channel.clone(),
        timeout: Duration::from_secs(args.remote_timeout),
        ..RemoteConfig::default()
    }
}

/// Sampler config for `range` (textual) with the global remote settings applied.
pub fn make_config(args: &RemoteArgs, range: &str) -> SamplerConfig {
    let range = parse_range(range).unwrap_or_else(|e| fail(e));
    match SamplerConfig::new(range) {
        Ok(config) => config
            .with_credential(args.token.clone())
            .with_remote(remote_config(args)),
        Err(e) => fail(e),
    }
}

pub fn make_sampler(config: SamplerConfig) -> Sampler {
    Sampler::new(config).unwrap_or_else(|e| fail(e))
}

pub fn make_ball(args: &RemoteArgs) -> EightBall {
    let config = EightBall::config()
        .with_credential(args.token.clone())
        .with_remote(remote_config(args));
    EightBall::new(make_sampler(config)).unwrap_or_else(|e| fail(e))
}

/// Parse a mode flag, exiting on unknown values.
pub fn parse_mode(s: &str) -> SampleMode {
    s.parse().unwrap_or_else(|e| fail(e))
}
