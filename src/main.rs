use std::net::SocketAddr;

use clap::{Parser, Subcommand};
use database::{ServiceKind, bootstrap, connection, seed};
use tracing_subscriber::EnvFilter;

/// The main entry point for a microforum service instance.
///
/// A deployment runs exactly one entity service (users, threads or posts);
/// which one is a runtime parameter rather than a separate binary.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from a .env file, if one is present.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => handle_serve(args).await,
        Commands::Bootstrap(args) => handle_bootstrap(args).await,
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// One table-backed HTTP service of the microforum family.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bootstrap the database and serve HTTP requests for one entity.
    Serve(ServeArgs),
    /// Run schema creation and seeding once, then exit.
    Bootstrap(BootstrapArgs),
}

#[derive(Parser)]
struct ServeArgs {
    /// Which entity this instance serves.
    #[arg(long, value_enum)]
    service: ServiceKind,

    /// The port to listen on.
    #[arg(long, default_value_t = 3000)]
    port: u16,
}

#[derive(Parser)]
struct BootstrapArgs {
    /// Which entity's table to bootstrap.
    #[arg(long, value_enum)]
    service: ServiceKind,
}

// ==============================================================================
// Command Logic
// ==============================================================================

/// Connects, bootstraps and serves. Schema failures abort startup; the
/// supervisor is expected to restart the process.
async fn handle_serve(args: ServeArgs) -> anyhow::Result<()> {
    let settings = configuration::load_settings()?;
    let pool = connection::connect(&settings).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    web_server::run_server(addr, pool, args.service).await
}

/// One-shot schema + seed pass, useful for provisioning a fresh database
/// without accepting any traffic.
async fn handle_bootstrap(args: BootstrapArgs) -> anyhow::Result<()> {
    let settings = configuration::load_settings()?;
    let pool = connection::connect(&settings).await?;

    bootstrap::ensure_schema(&pool, args.service).await?;
    let inserted = seed::seed_if_empty(&pool, args.service).await?;
    tracing::info!(service = args.service.name(), inserted, "bootstrap complete");

    Ok(())
}
