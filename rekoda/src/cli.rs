use clap::{Parser, Subcommand};

/// Rekoda - Chzzk live-stream recorder
#[derive(Parser, Debug)]
#[command(name = "rekoda")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create ./venv, install streamlink and friends, then run settings.sh
    Setup,

    /// Record every channel in channels.json until Ctrl-C
    Record {
        /// Directory holding the settings files, venv and plugin dir (default: current dir)
        #[arg(long, value_name = "DIR", env = "REKODA_WORKDIR")]
        workdir: Option<String>,
    },
}
