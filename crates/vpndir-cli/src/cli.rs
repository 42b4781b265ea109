use clap::Parser;
use std::path::PathBuf;
use vpndir_core::ProviderId;

/// Update the VPN server directory from the providers' published listings.
#[derive(Debug, Parser)]
#[command(name = "vpndir", version, about)]
pub struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, env = "VPNDIR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory JSON to update (defaults to the configured snapshot path)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fetch and report, without writing the directory
    #[arg(long)]
    pub dry_run: bool,

    /// Providers to update; all known providers when omitted
    #[arg(value_name = "PROVIDER")]
    pub providers: Vec<ProviderId>,
}
