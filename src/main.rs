use std::sync::Arc;

use chatroom::clock::{Clock, SystemClock};
use chatroom::config::ChatConfig;
use chatroom::services::sweeper::spawn_sweeper;
use chatroom::state::AppState;
use chatroom::store::memory::MemoryStore;
use chatroom::store::postgres::PgStore;
use chatroom::store::{MessageStore, ParticipantStore};
use chatroom::{db, routes};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ChatConfig::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());

    let (participants, messages): (Arc<dyn ParticipantStore>, Arc<dyn MessageStore>) =
        if let Some(url) = &config.database_url {
            let pool = db::init_pool(url, config.db_max_connections).await?;
            info!(max_connections = config.db_max_connections, "using postgres store");
            let store = Arc::new(PgStore::new(pool));
            (store.clone(), store)
        } else {
            info!("DATABASE_URL not set; using in-memory store");
            let store = Arc::new(MemoryStore::new());
            (store.clone(), store)
        };

    info!(
        inactivity_secs = config.inactivity.as_secs(),
        sweep_period_secs = config.sweep_period.as_secs(),
        send_refreshes_presence = config.send_refreshes_presence,
        "presence policy"
    );

    let state = AppState::new(participants, messages, clock, &config);
    let sweeper = spawn_sweeper(state.presence.clone(), config.sweep_period);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;

    info!(port = config.port, "chatroom listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "ctrl-c handler unavailable; running until killed");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
