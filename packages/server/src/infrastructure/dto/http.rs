//! HTTP API response DTOs.

use serde::{Deserialize, Serialize};

use crate::domain::{Phase, RoomScoreboard, Settings};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub room_id: String,
    /// RFC 3339
    pub created_at: String,
    pub phase: Phase,
    pub occupancy: usize,
    pub settings: Settings,
    pub players: PlayersDto,
    pub spectators: Vec<String>,
    pub scoreboard: RoomScoreboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayersDto {
    pub player1: Option<String>,
    pub player2: Option<String>,
}
