use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// nomie-store - read and write Nomie data on a Nomie Server
#[derive(Parser)]
#[command(name = "nomie-store")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding persisted settings. Defaults to ~/.nomie
    #[arg(long, env = "NOMIE_CONFIG_DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Server URL used when none is persisted
    #[arg(long, env = "NOMIE_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    /// API token used when none is persisted
    #[arg(long, env = "NOMIE_SERVER_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the document stored at a path
    Get {
        /// Storage path (e.g. "trackers")
        path: String,
    },
    /// Store a JSON document at a path
    Put {
        /// Storage path
        path: String,

        /// Document to store. Text that is not valid JSON is stored as a string
        content: String,
    },
    /// List stored paths
    List {
        /// Directory to list (defaults to "/")
        path: Option<String>,
    },
    /// Delete the document at a path
    Delete {
        /// Storage path
        path: String,
    },
    /// Connect to the server and report the connection state
    Check,
    /// Show persisted server settings without connecting
    Status,
    /// Remove persisted server settings
    Erase,
}
