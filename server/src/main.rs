use clap::Parser;
use log::info;
use server::dispatcher::QueryDispatcher;
use server::network::QueryServer;
use server::response::{Platform, ResponseBuilder};
use server::state::{HostConfig, HostState};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// IP address to bind to
    #[arg(short = 'H', long, default_value = "0.0.0.0")]
    host: String,

    /// UDP port to answer queries on (the game server's port)
    #[arg(short, long, default_value = "42420")]
    port: u16,

    /// Server name shown in browsers
    #[arg(short, long, default_value = "Vintage Story Server")]
    name: String,

    /// Raw world identifier; directory and extension are stripped
    #[arg(short, long, default_value = "default.vcdbs")]
    world: String,

    #[arg(short, long, default_value = "16")]
    max_players: u32,

    #[arg(long)]
    password: Option<String>,

    /// Report a listen server instead of a dedicated one
    #[arg(long)]
    listen: bool,

    #[arg(long, default_value = "1.19.8")]
    game_version: String,

    /// Player reported as online from startup (repeatable)
    #[arg(long = "player")]
    players: Vec<String>,

    /// JSON file with the host identity; overrides the flags above
    #[arg(short, long)]
    state: Option<PathBuf>,
}

impl Args {
    fn host_config(&self) -> Result<HostConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &self.state {
            info!("Loading host state from {}", path.display());
            return HostConfig::from_file(path);
        }

        Ok(HostConfig {
            name: self.name.clone(),
            world: self.world.clone(),
            max_players: self.max_players,
            password: self.password.clone(),
            dedicated: !self.listen,
            version: self.game_version.clone(),
            players: self.players.clone(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    if std::env::var("RUST_LOG").is_err() {
        eprintln!("Set RUST_LOG=info for detailed logging");
    }

    let args = Args::parse();
    let config = args.host_config()?;
    info!(
        "Emulating \"{}\" ({} players online, max {})",
        config.name,
        config.players.len(),
        config.max_players
    );

    let state = Arc::new(HostState::new(config));
    let platform = Platform::host();
    let dispatcher = QueryDispatcher::new(state, ResponseBuilder::new(platform));

    let address = format!("{}:{}", args.host, args.port);
    let server = QueryServer::bind(&address, dispatcher).await?;
    let handle = server.spawn();

    tokio::select! {
        result = handle => {
            if let Err(e) = result {
                eprintln!("Query responder task panicked: {}", e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
