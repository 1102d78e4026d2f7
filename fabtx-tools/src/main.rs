mod cli;
mod operations;

use clap::Parser;
use tracing::error;

use cli::{Cli, Commands};
use fabtx_core::ProtocolConfig;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fabtx_core=debug".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ProtocolConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => ProtocolConfig::default(),
    };
    if let Some(algorithm) = cli.hash {
        config.hash_algorithm = algorithm;
    }

    let result = match cli.command {
        Commands::Keygen { out, msp_id } => operations::generate_identity(&out, &msp_id),
        Commands::Demo { endorsers, input, out } => {
            operations::run_demo(&config, endorsers, input.as_bytes(), &out).map(|_| ())
        }
        Commands::Inspect { path } => operations::inspect_envelope(&config, &path),
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
