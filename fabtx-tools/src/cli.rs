use clap::{Parser, Subcommand};
use std::path::PathBuf;

use fabtx_common::crypto::HashAlgorithm;

#[derive(Parser)]
#[command(name = "fabtx")]
#[command(about = "Endorsement and transaction assembly tool")]
pub struct Cli {
    /// Protocol config (JSON). Defaults apply when omitted.
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the configured hash algorithm (sha256, sha3-256)
    #[arg(long, global = true, value_name = "ALG")]
    pub hash: Option<HashAlgorithm>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new Ed25519 identity seed
    Keygen {
        #[arg(short, long, value_name = "OUT")]
        out: PathBuf,
        #[arg(long, default_value = "Org1MSP")]
        msp_id: String,
    },
    /// Propose, endorse and assemble a signed transaction with local identities
    Demo {
        #[arg(short, long, default_value_t = 2)]
        endorsers: usize,
        #[arg(long, default_value = "move(a,b)")]
        input: String,
        #[arg(short, long, value_name = "OUT")]
        out: PathBuf,
    },
    /// Decode an envelope file and print it as JSON
    Inspect {
        #[arg(value_name = "FILE")]
        path: PathBuf,
    },
}
