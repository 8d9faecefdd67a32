use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use match_core::{process_matches, ApiKey, ClientConfig, MatchStore, RiotClient};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "matchctl", version, about = "Ranked match history downloader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, global = true, default_value = "results")]
    results_dir: PathBuf,

    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Download ranked matches and save the raw payloads as JSON.
    LoadMatches {
        #[arg(short, long)]
        username: String,

        #[arg(short, long, default_value_t = 0)]
        start: u32,

        #[arg(short, long, default_value_t = 50)]
        count: u32,
    },
    /// Flatten every saved match of a player into matches.csv.
    Process {
        #[arg(short, long)]
        username: String,

        /// Skip the summoner lookup when the player's puuid is known.
        #[arg(long)]
        puuid: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let store = MatchStore::new(cli.results_dir.clone());

    match &cli.command {
        Commands::LoadMatches {
            username,
            start,
            count,
        } => load_matches(&cli, &store, username, *start, *count).await,
        Commands::Process { username, puuid } => {
            process(&cli, &store, username, puuid.as_deref()).await
        }
    }
}

fn build_client(cli: &Cli) -> Result<RiotClient> {
    let config = ClientConfig::load_or_default(cli.config.as_deref())?;
    let key = ApiKey::from_env()?;
    RiotClient::new(key, config)
}

async fn load_matches(
    cli: &Cli,
    store: &MatchStore,
    username: &str,
    start: u32,
    count: u32,
) -> Result<()> {
    let mut client = build_client(cli)?;
    let matches = client
        .load_matches(username, start, count)
        .await
        .with_context(|| format!("load matches for {username}"))?;
    let path = store.matches_path(username, start, count);
    println!("The results will be saved on the filepath: {}", path.display());
    store.save_matches(username, start, count, &matches)?;
    Ok(())
}

async fn process(
    cli: &Cli,
    store: &MatchStore,
    username: &str,
    puuid: Option<&str>,
) -> Result<()> {
    let puuid = match puuid {
        Some(puuid) => puuid.to_string(),
        None => {
            let mut client = build_client(cli)?;
            client
                .user_puuid(username)
                .await
                .with_context(|| format!("look up {username}"))?
        }
    };

    let matches = store.load_matches(username)?;
    println!("# Matches: {}", matches.len());
    let table = process_matches(&matches, &puuid)?;
    let (rows, columns) = table.shape();
    println!("Processed table shape: ({rows}, {columns})");

    let dir = store.ensure_user_dir(username)?;
    let path = dir.join("matches.csv");
    println!("The results will be saved on the filepath: {}", path.display());
    table.write_csv(&path)?;
    info!(path = %path.display(), "wrote csv");
    Ok(())
}
