use std::sync::Arc;

use crate::{
    config::Config,
    db::ProfileStore,
    services::{
        providers::{CatalogResolver, EntityResolver, NotificationSink, ScheduleProvider},
        ProposalSelector, TasteService, UserLocks, UserService,
    },
};

/// Shared application state: the engine services plus their collaborators.
///
/// All services share one per-user lock registry, so every mutation path
/// for a given user is serialized no matter which service it enters
/// through.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub store: Arc<dyn ProfileStore>,
    pub resolver: Arc<dyn EntityResolver>,
    pub schedule: Arc<dyn ScheduleProvider>,
    pub tastes: Arc<TasteService>,
    pub proposals: Arc<ProposalSelector>,
    pub users: Arc<UserService>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn ProfileStore>,
        schedule: Arc<dyn ScheduleProvider>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let locks = Arc::new(UserLocks::new());
        let resolver: Arc<dyn EntityResolver> = Arc::new(CatalogResolver::new(store.clone()));

        let tastes = Arc::new(TasteService::new(
            store.clone(),
            resolver.clone(),
            locks.clone(),
            sink.clone(),
        ));
        let proposals = Arc::new(ProposalSelector::new(
            store.clone(),
            resolver.clone(),
            locks.clone(),
            sink,
            config.proposal_cap,
        ));
        let users = Arc::new(UserService::new(store.clone(), locks));

        Self {
            config: Arc::new(config),
            store,
            resolver,
            schedule,
            tastes,
            proposals,
            users,
        }
    }
}
