//! CLI for qball: ask the qubits.

mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "qball")]
#[command(about = "qball: a Magic 8-Ball that asks a quantum circuit")]
#[command(version = qball_core::VERSION)]
struct Cli {
    #[command(flatten)]
    remote: RemoteArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Settings for remote (physical device) sampling.
#[derive(Args)]
pub struct RemoteArgs {
    /// Runtime service credential. Remote mode is unavailable without it.
    #[arg(long, env = "IBM_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Runtime service base URL
    #[arg(long, env = "QBALL_ENDPOINT", global = true, default_value = qball_core::remote::DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Service channel sent with every runtime request
    #[arg(long, global = true, default_value = qball_core::remote::DEFAULT_CHANNEL)]
    pub channel: String,

    /// Give up on a submitted remote job after this many seconds
    #[arg(long, global = true, default_value = "600")]
    pub remote_timeout: u64,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive Magic 8-Ball: type a question, get an answer, 'q' quits
    Ask {
        /// Sampling mode: local (simulator) or remote (physical device)
        #[arg(long, default_value = "local")]
        mode: String,
    },

    /// Print uniformly distributed integers in [0, RANGE)
    Sample {
        /// Exclusive upper bound (integer > 1)
        #[arg(long)]
        range: String,

        /// How many integers to print
        #[arg(long, default_value = "1")]
        count: usize,

        /// Sampling mode: local (simulator) or remote (physical device)
        #[arg(long, default_value = "local")]
        mode: String,

        /// Local redraw budget per integer
        #[arg(long, default_value_t = qball_core::DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,

        /// Shots per remote batch
        #[arg(long, default_value_t = qball_core::DEFAULT_SHOTS)]
        shots: u32,

        /// Remote batches to try before giving up
        #[arg(long, default_value = "1")]
        max_batches: u32,

        /// Print a JSON array instead of one integer per line
        #[arg(long)]
        json: bool,
    },

    /// Draw many samples and run the uniformity battery on them
    Bench {
        /// Exclusive upper bound (integer > 1)
        #[arg(long, default_value = "20")]
        range: String,

        /// Number of samples to draw
        #[arg(long, default_value = "10000")]
        samples: usize,

        /// Sampling mode: local (simulator) or remote (physical device)
        #[arg(long, default_value = "local")]
        mode: String,

        /// Write machine-readable results as JSON
        #[arg(long)]
        output: Option<String>,
    },

    /// Start the HTTP Magic 8-Ball server
    Server {
        /// Port to listen on
        #[arg(long, default_value = "5001")]
        port: u16,

        /// Bind address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Honour ?mode=remote on /api/v1/answer
        #[arg(long)]
        allow_remote: bool,
    },
}

fn main() {
    // Before parsing, so IBM_TOKEN (and RUST_LOG) can live in a .env file.
    let env_file = dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Some(path) = env_file {
        log::debug!("loaded environment from {}", path.display());
    }

    let cli = Cli::parse();
    let remote = cli.remote;

    match cli.command {
        Commands::Ask { mode } => commands::ask::run(&remote, &mode),
        Commands::Sample {
            range,
            count,
            mode,
            max_attempts,
            shots,
            max_batches,
            json,
        } => commands::sample::run(commands::sample::SampleCommandConfig {
            remote: &remote,
            range: &range,
            count,
            mode: &mode,
            max_attempts,
            shots,
            max_batches,
            json,
        }),
        Commands::Bench {
            range,
            samples,
            mode,
            output,
        } => commands::bench::run(&remote, &range, samples, &mode, output.as_deref()),
        Commands::Server {
            port,
            host,
            allow_remote,
        } => commands::server::run(&remote, &host, port, allow_remote),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn token_and_endpoint_come_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(
            &path,
            "IBM_TOKEN=file-token\nQBALL_ENDPOINT=http://localhost:9/runtime\n",
        )
        .unwrap();
        dotenvy::from_path_override(&path).unwrap();

        let cli = Cli::try_parse_from(["qball", "sample", "--range", "20", "--mode", "remote"])
            .unwrap();
        assert_eq!(cli.remote.token.as_deref(), Some("file-token"));
        assert_eq!(cli.remote.endpoint, "http://localhost:9/runtime");

        let config = commands::make_config(&cli.remote, "20");
        assert_eq!(config.credential(), Some("file-token"));
    }
}
