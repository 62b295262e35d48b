use std::sync::Arc;

use axum_test::TestServer;
use serde_json::json;

use telecast_api::api::{create_router, AppState};
use telecast_api::config::Config;
use telecast_api::db::{MemoryStore, ProfileStore};
use telecast_api::models::{Artist, BroadcastSlot, EntityId, Movie};
use telecast_api::services::providers::{LogSink, ScheduleProvider, StaticScheduleProvider};

fn artist(id: &str, name: &str) -> Artist {
    Artist {
        id: EntityId::from_key(id),
        name: Some(name.to_string()),
        photo: None,
    }
}

fn movie(id: &str, title: &str, actors: &[&str]) -> Movie {
    Movie {
        id: EntityId::from_key(id),
        title: Some(title.to_string()),
        original_title: None,
        poster: None,
        simple_plot: None,
        run_times: None,
        year: None,
        actors: actors.iter().map(|a| EntityId::from_key(a)).collect(),
        directors: vec![],
        writers: vec![],
        genres: vec![],
    }
}

fn slot(channel: &str, time: &str, title: &str) -> BroadcastSlot {
    BroadcastSlot {
        channel: channel.to_string(),
        time: time.to_string(),
        title: Some(title.to_string()),
        original_title: None,
        year: None,
        genres: vec![],
        director: None,
        cast: vec![],
        movie_url: None,
    }
}

async fn create_test_server(slots: Vec<BroadcastSlot>) -> (Arc<MemoryStore>, TestServer) {
    let store = Arc::new(MemoryStore::new());
    store.put_artist(artist("nm0000001", "Fred Astaire")).await.unwrap();
    store
        .put_movie(movie("tt0000001", "Alpha", &["nm0000001"]))
        .await
        .unwrap();
    store.put_movie(movie("tt0000002", "Beta", &[])).await.unwrap();
    store.put_movie(movie("tt0000003", "Gamma", &[])).await.unwrap();
    store.put_movie(movie("tt0000004", "Delta", &[])).await.unwrap();
    store.put_movie(movie("tt0000005", "Echo", &[])).await.unwrap();

    let schedule: Arc<dyn ScheduleProvider> = Arc::new(StaticScheduleProvider::new(slots));
    let state = AppState::new(Config::default(), store.clone(), schedule, Arc::new(LogSink));
    let server = TestServer::new(create_router(state)).unwrap();
    (store, server)
}

async fn subscribe(server: &TestServer, user_id: &str) {
    let response = server
        .post("/api/subscribe")
        .json(&json!({
            "userId": user_id,
            "userName": "Test User",
            "userBirthYear": 1990,
            "privateKey": "push-key"
        }))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], 0);
}

#[tokio::test]
async fn test_health_check() {
    let (_, server) = create_test_server(vec![]).await;
    let response = server.get("/health").await;
    response.assert_status_ok();
}

#[tokio::test]
async fn test_fresh_user_has_empty_tastes() {
    let (_, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;

    let response = server.get("/api/tastes/user@example.com/all").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body["data"]["tastes"],
        json!({ "artists": [], "movies": [], "genres": [] })
    );
}

#[tokio::test]
async fn test_add_and_remove_artist_taste() {
    let (_, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;

    let response = server
        .post("/api/tastes/user@example.com/artist")
        .json(&json!({ "data": "nm0000001" }))
        .await;
    response.assert_status_ok();

    let response = server.get("/api/tastes/user@example.com/artist").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let tastes = body["data"]["tastes"].as_array().unwrap();
    assert_eq!(tastes.len(), 1);
    assert_eq!(tastes[0]["idIMDB"], "nm0000001");
    assert_eq!(tastes[0]["tasted"], 1);

    let response = server
        .delete("/api/tastes/user@example.com/artist/nm0000001")
        .await;
    response.assert_status_ok();

    let response = server.get("/api/tastes/user@example.com/artist").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["tastes"], json!([]));
}

#[tokio::test]
async fn test_watched_history_pagination() {
    let (_, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;

    for _ in 0..25 {
        let response = server
            .post("/api/watched/user@example.com")
            .json(&json!({ "idIMDB": "tt0000002", "date": "14-03-2015" }))
            .await;
        response.assert_status_ok();
    }

    let response = server.get("/api/watched/user@example.com/2").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let watched = body["data"]["watched"].as_array().unwrap();
    assert_eq!(watched.len(), 5);
    assert_eq!(body["data"]["hasPrev"], true);
    assert_eq!(body["data"]["hasNext"], false);
    assert_eq!(watched[0]["date"], "14-03-2015");
}

#[tokio::test]
async fn test_proposal_fallback_for_cold_start_user() {
    let slots = vec![
        slot("Rai 1", "21:00", "Alpha"),
        slot("Rai 2", "21:30", "Beta"),
        slot("Rai 3", "22:00", "Gamma"),
        slot("Rai 4", "22:30", "Delta"),
        slot("Iris", "23:00", "Echo"),
    ];
    let (_, server) = create_test_server(slots).await;
    subscribe(&server, "cold@example.com").await;

    let response = server.get("/api/proposal/cold@example.com").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let proposals = body["data"]["proposal"].as_array().unwrap();
    assert_eq!(proposals.len(), 1);
}

#[tokio::test]
async fn test_proposal_follows_taste_signal() {
    let slots = vec![
        slot("Rai 2", "22:00", "Beta"),
        slot("Rai 1", "21:00", "Alpha"),
    ];
    let (_, server) = create_test_server(slots).await;
    subscribe(&server, "user@example.com").await;

    server
        .post("/api/tastes/user@example.com/artist")
        .json(&json!({ "data": "nm0000001" }))
        .await
        .assert_status_ok();

    let response = server.get("/api/proposal/user@example.com").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    let proposals = body["data"]["proposal"].as_array().unwrap();
    assert_eq!(proposals.len(), 1);
    // Alpha stars the tasted artist.
    assert_eq!(proposals[0]["title"], "Alpha");
    assert_eq!(proposals[0]["channel"], "Rai 1");
    assert_eq!(proposals[0]["channelNumber"], 1);
}

#[tokio::test]
async fn test_unknown_user_is_rejected() {
    let (_, server) = create_test_server(vec![]).await;
    let response = server.get("/api/tastes/stranger@example.com/all").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_taste_kind_is_rejected() {
    let (_, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;
    let response = server.get("/api/tastes/user@example.com/director").await;
    response.assert_status(axum::http::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_settings_round_trip() {
    let (_, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;

    let response = server
        .post("/api/settings/user@example.com")
        .json(&json!({
            "tvType": ["free", "sky"],
            "repeatChoice": true,
            "enableNotification": false,
            "timeNotification": 72000000
        }))
        .await;
    response.assert_status_ok();

    let response = server.get("/api/settings/user@example.com").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["settings"]["tvType"], json!(["free", "sky"]));
    assert_eq!(body["data"]["settings"]["enableNotification"], false);
}

#[tokio::test]
async fn test_detail_lookup() {
    let (_, server) = create_test_server(vec![]).await;
    let response = server.get("/api/detail/artist/nm0000001").await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["data"]["detail"]["name"], "Fred Astaire");

    let response = server.get("/api/detail/movie/tt9999999").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unsubscribe_removes_user() {
    let (store, server) = create_test_server(vec![]).await;
    subscribe(&server, "user@example.com").await;

    let response = server.delete("/api/unsubscribe/user@example.com").await;
    response.assert_status_ok();
    assert!(store.profile("user@example.com").await.unwrap().is_none());

    let response = server.delete("/api/unsubscribe/user@example.com").await;
    response.assert_status(axum::http::StatusCode::NOT_FOUND);
}
