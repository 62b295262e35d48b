use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Day, EntityId, TasteKind, TvType},
    services::{
        pager,
        providers::{EntityResolver, ScheduleProvider},
        users::{Settings, SubscribeRequest},
    },
};

use super::AppState;

// Request types

#[derive(Debug, Deserialize)]
pub struct TastePayload {
    pub data: String,
}

#[derive(Debug, Deserialize)]
pub struct WatchedPayload {
    #[serde(rename = "idIMDB")]
    pub id_imdb: String,
    /// Watch date, `dd-mm-YYYY`
    pub date: String,
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// TV programming of one source type for one day
pub async fn schedule(
    State(state): State<AppState>,
    Path((tv_type, day)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let tv_type: TvType = tv_type.parse()?;
    let day: Day = day.parse()?;
    let slots = state.schedule.schedule(tv_type, day).await?;
    Ok(ok(json!({
        "type": tv_type,
        "day": day,
        "schedule": slots
    })))
}

/// Confirmed tastes, all kinds or a single one
pub async fn tastes_list(
    State(state): State<AppState>,
    Path((user_id, kind)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let view = state.tastes.tastes_view(&user_id).await?;
    let tastes = match kind.as_str() {
        "all" => json!(view),
        _ => kind_entries(&view, kind.parse()?),
    };
    Ok(ok(json!({
        "userId": user_id,
        "type": kind,
        "tastes": tastes
    })))
}

/// One page of the confirmed tastes of a single kind
pub async fn tastes_page(
    State(state): State<AppState>,
    Path((user_id, kind, page)): Path<(String, String, String)>,
) -> AppResult<Json<Value>> {
    let kind: TasteKind = kind.parse()?;
    let page_index: usize = page
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("{} is not a page index", page)))?;

    let view = state.tastes.tastes_view(&user_id).await?;
    let page_size = state.config.page_size;
    let window = match kind {
        TasteKind::Artist => {
            let entries: Vec<_> = view.artists.values().cloned().collect();
            json_page(pager::page(&entries, page_index, page_size))
        }
        TasteKind::Movie => {
            let entries: Vec<_> = view.movies.values().cloned().collect();
            json_page(pager::page(&entries, page_index, page_size))
        }
        TasteKind::Genre => {
            let entries: Vec<_> = view.genres.values().cloned().collect();
            json_page(pager::page(&entries, page_index, page_size))
        }
    };

    Ok(ok(json!({
        "userId": user_id,
        "type": kind,
        "tastes": window["items"],
        "hasPrev": window["has_prev"],
        "hasNext": window["has_next"]
    })))
}

/// Adds one taste
pub async fn add_taste(
    State(state): State<AppState>,
    Path((user_id, kind)): Path<(String, String)>,
    Json(payload): Json<TastePayload>,
) -> AppResult<Json<Value>> {
    let kind: TasteKind = kind.parse()?;
    state.tastes.add_taste(&user_id, kind, &payload.data).await?;
    Ok(ok_empty())
}

/// Removes one taste
pub async fn remove_taste(
    State(state): State<AppState>,
    Path((user_id, kind, id)): Path<(String, String, String)>,
) -> AppResult<Json<Value>> {
    let kind: TasteKind = kind.parse()?;
    state.tastes.remove_taste(&user_id, kind, &id).await?;
    Ok(ok_empty())
}

/// Marks a movie as not wanted after all
pub async fn untaste(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<TastePayload>,
) -> AppResult<Json<Value>> {
    state.tastes.untaste_movie(&user_id, &payload.data).await?;
    Ok(ok_empty())
}

/// First page of the watched history
pub async fn watched_list(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    watched_response(&state, &user_id, 0).await
}

/// Records a watched movie and returns the refreshed first page
pub async fn add_watched(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<WatchedPayload>,
) -> AppResult<Json<Value>> {
    let date = NaiveDate::parse_from_str(&payload.date, "%d-%m-%Y")
        .map_err(|_| AppError::InvalidInput(format!("{} is not a valid date", payload.date)))?;
    state
        .tastes
        .add_watched(&user_id, &payload.id_imdb, date)
        .await?;
    watched_response(&state, &user_id, 0).await
}

/// One page of the watched history
pub async fn watched_page(
    State(state): State<AppState>,
    Path((user_id, page)): Path<(String, usize)>,
) -> AppResult<Json<Value>> {
    watched_response(&state, &user_id, page).await
}

/// The user's proposals, recomputed only when no cached list exists
pub async fn proposal(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let proposals = state
        .proposals
        .proposals(&user_id, state.schedule.as_ref())
        .await?;
    Ok(ok(json!({
        "userId": user_id,
        "proposal": proposals
    })))
}

/// Drops one user's cached proposals
pub async fn clear_proposals(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    state.proposals.clear(&user_id).await?;
    Ok(ok_empty())
}

/// Drops every user's cached proposals
pub async fn clear_all_proposals(State(state): State<AppState>) -> AppResult<Json<Value>> {
    let cleared = state.proposals.clear_all().await?;
    Ok(ok(json!({ "cleared": cleared })))
}

/// Subscribes a user from the client app
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> AppResult<Json<Value>> {
    let user_id = request.user_id.clone();
    let (settings, already) = state.users.subscribe(request).await?;
    let (code, message) = if already {
        (1, "User already subscribed")
    } else {
        (0, "User subscribed successful!")
    };
    Ok(Json(json!({
        "code": code,
        "data": {
            "userId": user_id,
            "message": message,
            "settings": settings
        }
    })))
}

/// Unsubscribes a user
pub async fn unsubscribe(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    state.users.unsubscribe(&user_id).await?;
    Ok(ok(json!({
        "userId": user_id,
        "message": "User unsubscribed successful!"
    })))
}

/// Reads the user's settings
pub async fn settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<Value>> {
    let settings = state.users.settings(&user_id).await?;
    Ok(ok(json!({
        "userId": user_id,
        "settings": settings
    })))
}

/// Replaces the user's settings
pub async fn update_settings(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(settings): Json<Settings>,
) -> AppResult<Json<Value>> {
    let settings = state.users.update_settings(&user_id, settings).await?;
    Ok(ok(json!({
        "userId": user_id,
        "settings": settings
    })))
}

/// Full catalog record of an artist or a movie
pub async fn detail(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let kind: TasteKind = kind.parse()?;
    let id = EntityId::parse(&id)?;
    let detail = match kind {
        TasteKind::Artist => json!(state.resolver.artist(id.clone()).await?),
        TasteKind::Movie => json!(state.resolver.movie(id.clone()).await?),
        TasteKind::Genre => {
            return Err(AppError::InvalidInput(
                "detail lookups cover artists and movies only".to_string(),
            ))
        }
    };
    Ok(ok(json!({
        "idIMDB": id,
        "type": kind,
        "detail": detail
    })))
}

// Helpers

fn ok(data: Value) -> Json<Value> {
    Json(json!({ "code": 0, "data": data }))
}

fn ok_empty() -> Json<Value> {
    Json(json!({ "code": 0 }))
}

fn kind_entries(view: &crate::models::TasteView, kind: TasteKind) -> Value {
    match kind {
        TasteKind::Artist => json!(view.artists.values().collect::<Vec<_>>()),
        TasteKind::Movie => json!(view.movies.values().collect::<Vec<_>>()),
        TasteKind::Genre => json!(view.genres.values().collect::<Vec<_>>()),
    }
}

fn json_page<T: serde::Serialize>(page: pager::Page<T>) -> Value {
    json!(page)
}

async fn watched_response(
    state: &AppState,
    user_id: &str,
    page_index: usize,
) -> AppResult<Json<Value>> {
    let page = state
        .tastes
        .watched_page(user_id, page_index, pager::WATCHED_PAGE_SIZE)
        .await?;
    Ok(ok(json!({
        "userId": user_id,
        "watched": page.items,
        "hasPrev": page.has_prev,
        "hasNext": page.has_next
    })))
}
