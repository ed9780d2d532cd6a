use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;
mod command;

use cli::{Cli, Commands};
use command::Settings;
use nomie_server_storage::InitOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings {
        config_dir: cli.config_dir,
        options: InitOptions {
            url: cli.server_url,
            token: cli.token,
        },
    };

    match cli.command {
        Some(Commands::Get { path }) => command::run_get(&settings, &path).await?,
        Some(Commands::Put { path, content }) => {
            command::run_put(&settings, &path, &content).await?
        }
        Some(Commands::List { path }) => command::run_list(&settings, path.as_deref()).await?,
        Some(Commands::Delete { path }) => command::run_delete(&settings, &path).await?,
        Some(Commands::Check) => command::run_check(&settings).await?,
        Some(Commands::Status) => command::run_status(&settings).await?,
        Some(Commands::Erase) => command::run_erase(&settings).await?,
        None => {
            eprintln!("No command specified. Use --help for usage information.");
            eprintln!("Use 'nomie-store check' to connect to a Nomie Server.");
        }
    }

    Ok(())
}
