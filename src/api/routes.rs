use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API routes under /api
fn api_routes() -> Router<AppState> {
    Router::new()
        // Broadcast schedule
        .route("/schedule/:tv_type/:day", get(handlers::schedule))
        // Tastes
        .route(
            "/tastes/:user_id/:kind",
            get(handlers::tastes_list).post(handlers::add_taste),
        )
        .route(
            "/tastes/:user_id/:kind/:arg",
            get(handlers::tastes_page).delete(handlers::remove_taste),
        )
        .route("/untaste/:user_id", post(handlers::untaste))
        // Watched history
        .route(
            "/watched/:user_id",
            get(handlers::watched_list).post(handlers::add_watched),
        )
        .route("/watched/:user_id/:page", get(handlers::watched_page))
        // Proposals
        .route("/proposal", delete(handlers::clear_all_proposals))
        .route(
            "/proposal/:user_id",
            get(handlers::proposal).delete(handlers::clear_proposals),
        )
        // Subscriptions and settings
        .route("/subscribe", post(handlers::subscribe))
        .route("/unsubscribe/:user_id", delete(handlers::unsubscribe))
        .route(
            "/settings/:user_id",
            get(handlers::settings).post(handlers::update_settings),
        )
        // Catalog details
        .route("/detail/:kind/:id", get(handlers::detail))
}
