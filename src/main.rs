use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "memedrop")]
#[command(about = "Airdrop backend - social tasks, email verification and claim gating")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.memedrop/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the REST API server
    Serve {
        /// Override settings.http_port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a default configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the airdrop status of a wallet
    Status {
        /// Wallet address (0x...)
        #[arg(long)]
        wallet: String,
    },

    /// Show participant totals
    Participants {
        /// Also list every participant
        #[arg(long)]
        all: bool,
    },

    /// Manage news items
    #[command(subcommand)]
    News(cli::news::NewsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Serve { port }) => {
            cli::serve::serve_command(config_path, port).await?;
        }
        Some(Commands::Init { force }) => {
            cli::init::init_command(config_path, force)?;
        }
        Some(Commands::Status { wallet }) => {
            cli::status::status_command(config_path, &wallet)?;
        }
        Some(Commands::Participants { all }) => {
            cli::status::participants_command(config_path, all)?;
        }
        Some(Commands::News(command)) => {
            cli::news::news_command(config_path, command)?;
        }
        None => {
            // Default: run the server
            cli::serve::serve_command(config_path, None).await?;
        }
    }

    Ok(())
}
