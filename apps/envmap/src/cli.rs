//! Command line interface definition

use clap::{Parser, Subcommand};
use envmap_types::ColorChoice;
use std::path::PathBuf;

/// envmap - resolve and stream HDR environment maps
#[derive(Parser)]
#[command(name = "envmap")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve and stream HDR environment maps")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the envmap log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never consult the remote module
    #[arg(long, global = true)]
    pub offline: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the asset list (remote module, then bundle, then fallback)
    #[command(alias = "ls")]
    Resolve,

    /// Resolve and deliver the list to a file-backed front-end
    Push {
        /// File that receives the JSON asset list
        target: PathBuf,

        /// Wait until this file exists before delivering
        #[arg(long, value_name = "PATH")]
        ready_file: Option<PathBuf>,
    },

    /// Stream one asset by identifier to stdout or a file
    #[command(alias = "cat")]
    Open {
        /// Identifier, e.g. bundle:///hdri_4k/ex.hdr
        uri: String,

        /// Destination file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Install the remote asset module
    #[command(alias = "i")]
    Install,

    /// Show module state and configured locations
    Status,
}
