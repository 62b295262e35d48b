use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use telecast_api::{
    api::{create_router, AppState},
    config::Config,
    db::{MemoryStore, ProfileStore},
    services::{
        notify::{spawn_recompute_worker, ChannelSink},
        providers::{HttpScheduleProvider, ScheduleProvider},
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    // The store trait is the persistence seam; the in-memory implementation
    // backs single-node runs.
    let store: Arc<dyn ProfileStore> = Arc::new(MemoryStore::new());
    let schedule: Arc<dyn ScheduleProvider> =
        Arc::new(HttpScheduleProvider::new(config.schedule_api_url.clone()));

    let (sink, event_rx) = ChannelSink::new();
    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, store, schedule.clone(), Arc::new(sink));

    // Pre-warms proposal lists after taste changes, sharing the state's
    // selector so per-user serialization covers both paths.
    let _worker = spawn_recompute_worker(state.proposals.clone(), schedule, event_rx);

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
