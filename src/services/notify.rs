use std::sync::Arc;

use tokio::sync::mpsc;

use crate::services::{
    providers::{NotificationSink, ScheduleProvider},
    ProposalSelector,
};

/// Event emitted by the engine towards the notification pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TasteEvent {
    TasteChanged { user_id: String },
    ProposalReady { user_id: String },
}

/// Sink that forwards events to the background recompute worker.
///
/// Created before the worker so the services it feeds can share their
/// per-user locks with the selector the worker drives.
#[derive(Clone)]
pub struct ChannelSink {
    event_tx: mpsc::UnboundedSender<TasteEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TasteEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        (Self { event_tx }, event_rx)
    }

    fn send(&self, event: TasteEvent) {
        if let Err(err) = self.event_tx.send(event) {
            tracing::error!(error = %err, "Failed to enqueue taste event");
        }
    }
}

impl NotificationSink for ChannelSink {
    fn taste_changed(&self, user_id: &str) {
        self.send(TasteEvent::TasteChanged {
            user_id: user_id.to_string(),
        });
    }

    fn proposal_ready(&self, user_id: &str) {
        self.send(TasteEvent::ProposalReady {
            user_id: user_id.to_string(),
        });
    }
}

/// Handle for gracefully shutting down the recompute worker
pub struct RecomputeWorkerHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl RecomputeWorkerHandle {
    /// Signals the worker to drain pending events and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Recompute worker shutdown signal sent");
    }
}

/// Spawns the background worker that pre-warms proposal lists.
///
/// A taste change clears the user's cached proposals (done by the
/// aggregator), so recomputing here means the next client read is served
/// from cache. Proposal-ready events are where an actual push pipeline
/// would hook in; delivery itself happens outside this crate.
pub fn spawn_recompute_worker(
    selector: Arc<ProposalSelector>,
    schedule: Arc<dyn ScheduleProvider>,
    event_rx: mpsc::UnboundedReceiver<TasteEvent>,
) -> RecomputeWorkerHandle {
    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

    tokio::spawn(async move {
        recompute_task(selector, schedule, event_rx, shutdown_rx).await;
    });

    RecomputeWorkerHandle { shutdown_tx }
}

async fn recompute_task(
    selector: Arc<ProposalSelector>,
    schedule: Arc<dyn ScheduleProvider>,
    mut event_rx: mpsc::UnboundedReceiver<TasteEvent>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    tracing::info!("Recompute worker started");

    loop {
        tokio::select! {
            Some(event) = event_rx.recv() => {
                handle_event(&selector, schedule.as_ref(), event).await;
            }
            _ = shutdown_rx.recv() => {
                tracing::info!("Recompute worker shutting down, draining pending events");
                while let Ok(event) = event_rx.try_recv() {
                    handle_event(&selector, schedule.as_ref(), event).await;
                }
                tracing::info!("Recompute worker stopped");
                break;
            }
        }
    }
}

async fn handle_event(
    selector: &ProposalSelector,
    schedule: &dyn ScheduleProvider,
    event: TasteEvent,
) {
    match event {
        TasteEvent::TasteChanged { user_id } => {
            if let Err(err) = selector.proposals(&user_id, schedule).await {
                tracing::warn!(user_id = %user_id, error = %err, "Proposal pre-warm failed");
            }
        }
        TasteEvent::ProposalReady { user_id } => {
            tracing::info!(user_id = %user_id, "Proposals ready for delivery");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::{MemoryStore, ProfileStore},
        models::{BroadcastSlot, EntityId, Movie, UserProfile},
        services::{
            providers::{CatalogResolver, LogSink, StaticScheduleProvider},
            UserLocks,
        },
    };

    #[tokio::test]
    async fn taste_change_pre_warms_proposals() {
        let store = Arc::new(MemoryStore::new());
        store
            .put_profile(UserProfile::new("user@example.com"))
            .await
            .unwrap();
        store
            .put_movie(Movie {
                id: EntityId::from_key("tt0000001"),
                title: Some("Alpha".to_string()),
                original_title: None,
                poster: None,
                simple_plot: None,
                run_times: None,
                year: None,
                actors: vec![],
                directors: vec![],
                writers: vec![],
                genres: vec![],
            })
            .await
            .unwrap();

        let resolver = Arc::new(CatalogResolver::new(store.clone() as Arc<dyn ProfileStore>));
        let selector = Arc::new(ProposalSelector::new(
            store.clone(),
            resolver,
            Arc::new(UserLocks::new()),
            Arc::new(LogSink),
            1,
        ));
        let schedule: Arc<dyn ScheduleProvider> =
            Arc::new(StaticScheduleProvider::new(vec![BroadcastSlot {
                channel: "Rai 1".to_string(),
                time: "21:00".to_string(),
                title: Some("Alpha".to_string()),
                original_title: None,
                year: None,
                genres: vec![],
                director: None,
                cast: vec![],
                movie_url: None,
            }]));

        let (sink, event_rx) = ChannelSink::new();
        let handle = spawn_recompute_worker(selector, schedule, event_rx);
        sink.taste_changed("user@example.com");
        handle.shutdown().await;

        // Give the worker a moment to drain.
        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        let profile = store.profile("user@example.com").await.unwrap().unwrap();
        let cached = profile.proposals.expect("proposals should be pre-warmed");
        assert_eq!(cached.len(), 1);
    }
}
