use clap::{Parser, Subcommand};
use colored::*;
use std::net::IpAddr;
use std::path::PathBuf;
use std::process;

use autohub_cli::{init_logging, migrate, run_server, Config};

#[derive(Parser)]
#[command(name = "autohub")]
#[command(about = "AutoHub - vehicle intake, inspection and collection service")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,
        #[arg(long, help = "Address to bind (overrides HOST)")]
        host: Option<IpAddr>,
        #[arg(long, help = "SQLite database file (overrides DATABASE_PATH)")]
        database: Option<PathBuf>,
    },
    /// Apply database migrations and exit
    Migrate {
        #[arg(long, help = "SQLite database file (overrides DATABASE_PATH)")]
        database: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = handle_command(cli.command).await {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

async fn handle_command(command: Commands) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    init_logging(config.log_format);

    match command {
        Commands::Serve {
            port,
            host,
            database,
        } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(database) = database {
                config.database_path = database;
            }
            run_server(config).await
        }
        Commands::Migrate { database } => {
            if let Some(database) = database {
                config.database_path = database;
            }
            migrate(&config).await?;
            println!("{}", "Database is up to date".green());
            Ok(())
        }
    }
}
