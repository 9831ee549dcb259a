use clap::{Parser, ValueEnum};
use client::network::QueryClient;
use log::info;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Query {
    Info,
    Players,
    Rules,
    All,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server address to query
    #[arg(short = 's', long, default_value = "127.0.0.1:42420")]
    server: String,

    #[arg(short, long, value_enum, default_value = "all")]
    query: Query,

    /// Response timeout in milliseconds
    #[arg(short, long, default_value = "2000")]
    timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let client = QueryClient::connect(&args.server, Duration::from_millis(args.timeout)).await?;
    info!("Querying {}", client.server_addr());

    if matches!(args.query, Query::Info | Query::All) {
        let info = client.info().await?;
        println!("Name:     {}", info.name);
        println!("Map:      {}", info.map);
        println!("Game:     {} ({}, app {})", info.game, info.folder, info.app_id);
        println!("Players:  {}/{} ({} bots)", info.players, info.max_players, info.bots);
        println!(
            "Server:   type '{}', platform '{}', password {}, anti-cheat {}",
            info.server_type, info.platform, info.password, info.anti_cheat
        );
        println!("Version:  {}", info.version);
    }

    if matches!(args.query, Query::Players | Query::All) {
        let players = client.players().await?;
        println!("{} player(s) online", players.len());
        for player in players {
            println!(
                "  #{:<3} {:<32} score {:<5} {:>8.1}s",
                player.index, player.name, player.score, player.duration
            );
        }
    }

    if matches!(args.query, Query::Rules | Query::All) {
        println!("{} rule(s)", client.rules().await?);
    }

    Ok(())
}
