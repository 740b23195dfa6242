use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use ymux::config::load_config;
use ymux::observability::logging;
use ymux::{IdentityProvider, MuxServer};

#[derive(Parser)]
#[command(name = "ymux-cli")]
#[command(about = "Query the configured Yggdrasil upstreams directly", long_about = None)]
struct Cli {
    /// Path to the config file
    #[arg(short, long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the config file and list upstreams
    Check,
    /// Ask every upstream whether a player joined a server
    HasJoined {
        username: String,
        server_id: String,
    },
    /// Resolve usernames to profiles across all upstreams
    Profiles {
        #[arg(required = true)]
        usernames: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    logging::init(config.debug);

    let mux = MuxServer::from_config(&config)?;

    let output = match cli.command {
        Commands::Check => {
            let upstreams: Vec<&str> = mux.servers().iter().map(|s| s.name()).collect();
            json!({
                "listen": config.listen,
                "metrics": config.metrics.enabled,
                "upstreams": upstreams,
            })
        }
        Commands::HasJoined {
            username,
            server_id,
        } => {
            let result = mux.has_joined(&username, &server_id).await?;
            json!({
                "joined": result.is_joined(),
                "upstream": result.upstream(),
                "status": result.status(),
                "profile": result.profile(),
            })
        }
        Commands::Profiles { usernames } => {
            let profiles = mux.get_profiles(&usernames).await?;
            serde_json::to_value(profiles)?
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
