//! Defines the command-line interface structure using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promptmgr", version, about = "Run remote prompts and prompt chains")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: Cmd,
}

#[derive(Args)]
pub struct GlobalArgs {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "PROMPTMGR_CONFIG")]
    pub config: Option<PathBuf>,
    /// Base URL of the prompt service
    #[arg(long, global = true)]
    pub url: Option<String>,
    /// Environment name sent with every request
    #[arg(long, global = true)]
    pub environment: Option<String>,
    /// Print debug logs (requests are logged with credentials redacted)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Cmd {
    /// Run a prompt and print the service response
    Run {
        /// ID of the prompt to run
        prompt_id: String,
        /// Operation variant, e.g. 'test/generate'
        #[arg(long)]
        action: String,
        /// Project ID (defaults to PROMPTMGR_PROJECT_ID)
        #[arg(long)]
        project: Option<String>,
        /// Variable assignments in key=value format
        #[arg(long = "var")]
        vars: Vec<String>,
        /// File IDs to attach to the run
        #[arg(long = "file-id")]
        file_ids: Vec<String>,
        /// Model settings in key=value format, e.g. temperature=0.7
        #[arg(long = "setting")]
        settings: Vec<String>,
    },
    /// Fetch a prompt rendered with the given variables
    Get {
        prompt_id: String,
        #[arg(long)]
        project: Option<String>,
        #[arg(long = "var", help = "Variable assignments in key=value format")]
        vars: Vec<String>,
    },
    /// Vectorize a stored file for a prompt
    Vectorize {
        prompt_id: String,
        /// Storage key of the file
        #[arg(long)]
        storage_key: String,
        /// Display name (defaults to the last segment of the storage key)
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long)]
        session: Option<String>,
        #[arg(long)]
        project: Option<String>,
    },
    /// Manage prompt chains
    #[command(subcommand)]
    Chain(ChainCmd),
}

#[derive(Subcommand)]
pub enum ChainCmd {
    /// Run a chain defined in a YAML file
    Run {
        /// Path to the YAML file defining the chain
        file: PathBuf,
        #[arg(long = "var", help = "Variable assignments in key=value format")]
        vars: Vec<String>,
    },
}
