//! Command line interface for the `txrelay` binary.

use std::{net::SocketAddr, path::PathBuf};

use clap::Parser;

/// Command line arguments for the `txrelay` binary.
#[derive(Debug, Parser)]
#[command(
    name = "txrelay",
    version,
    about = "Reassemble segmented transactions and relay them to push backends"
)]
pub struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "txrelay.toml")]
    pub config: PathBuf,
    /// Listen address, overriding `server.bind`.
    #[arg(short, long)]
    pub bind: Option<SocketAddr>,
}
