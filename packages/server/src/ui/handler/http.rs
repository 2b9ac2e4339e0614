//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::GlobalScoreboard,
    infrastructure::dto::{http::RoomDetailDto, websocket::RoomSummaryDto},
    ui::state::AppState,
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Lobby listing
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state
        .lobby
        .list_rooms()
        .await
        .into_iter()
        .map(RoomSummaryDto::from)
        .collect();
    Json(rooms)
}

pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    state
        .lobby
        .room_detail(room_id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn get_scoreboard(State(state): State<Arc<AppState>>) -> Json<GlobalScoreboard> {
    Json(state.global_scoreboard.snapshot().await)
}
