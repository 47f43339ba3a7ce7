use anyhow::{Context, Result};
use axum::Router;
use parlor_api::{build_router, AppState};
use parlor_auth::Authenticator;
use parlor_chats::{ChatServices, ReadEvent};
use parlor_config::AppConfig;
use parlor_database::{initialize_database, DatabaseConnection};
use sqlx::SqlitePool;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};
use tracing::{debug, info, warn};

pub mod seed;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub const DEFAULT_FILTER: &str = "info";

    /// `RUST_LOG` when set and valid, otherwise `fallback`.
    pub fn env_filter(fallback: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
    }

    pub fn init_tracing() -> Result<()> {
        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter(DEFAULT_FILTER))
            .with_target(true)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Everything the server needs, wired against one SQLite pool.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub chats: ChatServices,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        config
            .messaging
            .validate()
            .context("invalid messaging configuration")?;

        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), config.auth.clone());
        let chats = ChatServices::sqlite(db_pool.clone(), &config.messaging);

        info!(
            database = %config.database.url,
            session_ttl = authenticator.session_ttl().num_seconds(),
            "backend services ready"
        );

        Ok(Self {
            db_pool,
            authenticator,
            chats,
        })
    }

    pub fn app_state(&self) -> AppState {
        AppState::from_database(
            DatabaseConnection::from_pool(self.db_pool.clone()),
            self.authenticator.clone(),
            self.chats.clone(),
        )
    }

    pub fn router(&self) -> Router {
        build_router(self.app_state())
    }

    /// Drain read events into the log until the tracker goes away.
    pub fn spawn_read_event_log(&self) -> JoinHandle<u64> {
        let mut events = self.chats.read_state.subscribe();
        tokio::spawn(async move {
            let mut seen = 0u64;
            loop {
                match events.recv().await {
                    Ok(event) => {
                        seen += 1;
                        log_read_event(&event);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "read event log lagged behind");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            seen
        })
    }
}

fn log_read_event(event: &ReadEvent) {
    debug!(
        conversation_id = %event.conversation_id,
        user_id = event.user_id,
        last_read_message_id = event.last_read_message_id,
        "read marker advanced"
    );
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
