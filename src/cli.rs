// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "deploylog")]
#[command(about = "Track who is deploying what in each chat channel")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print only the result line
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Print results as JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    /// Config file (default: deploylog.yml in the current directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding channel deploy logs
    #[arg(long, global = true)]
    pub state_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new deploylog.yml configuration file
    Init {
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Start a deploy in a channel
    Start {
        /// Channel id
        channel: String,

        /// What is being deployed
        #[arg(required = true, num_args = 1..)]
        subject: Vec<String>,

        /// Chat user id of the deployer
        #[arg(long)]
        user_id: String,

        /// Display name of the deployer (default: the user id)
        #[arg(long)]
        user_name: Option<String>,
    },

    /// Finish the deploy in progress
    Finish {
        /// Channel id
        channel: String,
    },

    /// Abort the deploy in progress
    Abort {
        /// Channel id
        channel: String,

        /// Why the deploy was aborted
        reason: Vec<String>,
    },

    /// Show the deploy in progress, if any
    Status {
        /// Channel id
        channel: String,
    },

    /// Show a channel's deploy history
    History {
        /// Channel id
        channel: String,

        /// Only deploys started at or after this RFC 3339 time
        #[arg(long)]
        since: Option<String>,
    },

    /// Serve the deploy history dashboard over HTTP
    Serve {
        /// Listen address (overrides the config file)
        #[arg(short, long)]
        listen: Option<SocketAddr>,
    },
}
