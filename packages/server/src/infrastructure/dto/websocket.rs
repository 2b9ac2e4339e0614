//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `"type"` (kebab-case) with
//! camelCase fields.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Feedback, GameState, GlobalScoreboard, Phase, PowerUp, PowerUpKind, RoomScoreboard,
    Settings, SettingsPatch, Severity, Side,
};

/// Player slot as named on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotDto {
    Player1,
    Player2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SideDto {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoleDto {
    Player1,
    Player2,
    Spectator,
}

/// Inbound intents
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    ListRooms,
    JoinRoom {
        /// Generated when omitted
        #[serde(default)]
        room_id: Option<String>,
        nickname: String,
        #[serde(default)]
        settings: Option<SettingsPatch>,
    },
    SetReady {
        slot: SlotDto,
    },
    TogglePause,
    MovePaddle {
        side: SideDto,
        direction: i32,
    },
    UpdateSettings {
        settings: SettingsPatch,
    },
    RequestReplay,
    LeaveRoom,
    SendChat {
        text: String,
    },
    Typing,
    RequestGlobalScoreboard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub occupancy: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntryDto {
    pub nickname: String,
    pub text: String,
    /// Unix millis
    pub timestamp: i64,
    /// `HH:MM:SS` label
    pub time: String,
}

/// How a match ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeDto {
    Winner,
    Draw,
    Cooperative,
}

/// Outbound messages
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    RoomList {
        rooms: Vec<RoomSummaryDto>,
    },
    RoleAssigned {
        room_id: String,
        role: RoleDto,
    },
    Membership {
        player1: Option<String>,
        player2: Option<String>,
        spectators: Vec<String>,
    },
    StateSnapshot {
        phase: Phase,
        state: GameState,
    },
    PhaseChanged {
        phase: Phase,
    },
    MatchOver {
        outcome: OutcomeDto,
        winner: Option<String>,
        /// Shared counter for cooperative matches
        score: Option<u32>,
        message: String,
        room_scoreboard: RoomScoreboard,
    },
    GlobalScoreboardUpdate {
        scoreboard: GlobalScoreboard,
    },
    SettingsChanged {
        settings: Settings,
    },
    Feedback {
        cue: Feedback,
    },
    PowerUpSpawned {
        power_up: PowerUp,
    },
    PowerUpApplied {
        kind: PowerUpKind,
        side: Option<Side>,
        height: Option<f32>,
    },
    PowerUpExpired {
        kind: PowerUpKind,
        side: Option<Side>,
        height: Option<f32>,
    },
    ChatMessage(ChatEntryDto),
    ChatHistory {
        entries: Vec<ChatEntryDto>,
    },
    Typing {
        nickname: String,
    },
    LeftRoom {
        room_id: String,
    },
    Notice {
        text: String,
        severity: Severity,
    },
}
