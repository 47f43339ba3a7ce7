use anyhow::Context;
use clap::{Parser, Subcommand};
use parlor_config::load as load_config;
use parlor_database::{applied_migrations, initialize_database, MIGRATOR};
use parlor_runtime::{seed::seed_demo_data, telemetry, BackendServices};
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser)]
#[command(name = "parlor-server")]
#[command(about = "Parlor messaging backend (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
    /// Create demo users, a shared conversation and messages; prints session tokens
    SeedData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing().context("failed to initialise tracing")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server().await,
        Commands::Migrate => migrate().await,
        Commands::SeedData => seed_data().await,
    }
}

async fn run_server() -> anyhow::Result<()> {
    info!("starting Parlor backend");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let read_events = services.spawn_read_event_log();
    let app = services.router();

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(parlor_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    read_events.abort();
    info!("backend shut down");
    Ok(())
}

async fn migrate() -> anyhow::Result<()> {
    let config = load_config().context("failed to load configuration")?;

    let pool = initialize_database(&config.database)
        .await
        .context("database migrations failed")?;

    let applied = applied_migrations(&pool)
        .await
        .context("failed to read migration history")?;
    println!(
        "Database at {} is up to date ({} of {} migrations applied)",
        config.database.url,
        applied,
        MIGRATOR.iter().count()
    );

    pool.close().await;
    Ok(())
}

async fn seed_data() -> anyhow::Result<()> {
    info!("seeding database with demo data");

    let config = load_config().context("failed to load configuration")?;

    let services = BackendServices::initialise(&config)
        .await
        .context("failed to initialise backend services")?;

    let report = seed_demo_data(&services).await?;

    println!("Database seeded with demo data:");
    println!("- conversation {}", report.conversation_id);
    println!("- {} messages", report.messages);
    println!("- 1 notification");
    println!();
    println!("{:<10} {:<28} Session token", "User", "Public ID");
    for user in &report.users {
        println!("{:<10} {:<28} {}", user.display_name, user.public_id, user.token);
    }

    Ok(())
}
