use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::env;

mod feed;
mod init;
mod server;
mod store;
mod telemetry;

#[derive(Parser)]
#[command(name = "chanfeed", about = "Unified channel content feed")]
struct Cli {
    #[arg(global = true, short, long)]
    dsn: Option<String>,
    /// Emit a single JSON envelope to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,
    /// Pool size (overrides CHANFEED_MAX_CONNECTIONS)
    #[arg(global = true, long)]
    max_connections: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Init(init::InitCmd),
    Content(feed::ContentCmd),
    Serve(server::ServeCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // logs on stderr; respects RUST_LOG and CHANFEED_LOG_FORMAT
    telemetry::config::init_tracing();

    let dsn = cli
        .dsn
        .or_else(|| env::var("DATABASE_URL").ok())
        .context("Please provide --dsn or set DATABASE_URL in .env")?;
    let max_connections = match cli.max_connections {
        Some(n) => n,
        None => match env::var("CHANFEED_MAX_CONNECTIONS") {
            Ok(raw) => raw.trim().parse().with_context(|| format!("CHANFEED_MAX_CONNECTIONS is not a number: {raw}"))?,
            Err(_) => init::DEFAULT_MAX_CONNECTIONS,
        },
    };

    let pool = init::connect(&dsn, max_connections).await?;

    match cli.command {
        Commands::Init(args) => init::run(&pool, args).await?,
        Commands::Content(args) => feed::run(&pool, args).await?,
        Commands::Serve(args) => server::run(&pool, args).await?,
    }

    Ok(())
}
