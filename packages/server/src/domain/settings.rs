//! Room settings and court geometry constants.

use serde::{Deserialize, Serialize};

use super::error::RoomError;

/// Court and body dimensions shared by every room
pub struct Court;

impl Court {
    pub const WIDTH: f32 = 800.0;
    pub const HEIGHT: f32 = 600.0;

    pub const PADDLE_WIDTH: f32 = 20.0;
    pub const LEFT_PADDLE_X: f32 = 50.0;
    pub const RIGHT_PADDLE_X: f32 = 730.0;
    pub const PADDLE_START_Y: f32 = 250.0;
    pub const PADDLE_STEP: f32 = 15.0;
    pub const MIN_PADDLE_HEIGHT: f32 = 50.0;

    pub const BALL_SIZE: f32 = 20.0;
    pub const BALL_RADIUS: f32 = Self::BALL_SIZE / 2.0;

    pub const BRICK_WIDTH: f32 = 40.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_GAP: f32 = 5.0;
    pub const BRICK_COLUMNS: u32 = 5;
    pub const BRICK_START_Y: f32 = 50.0;

    pub const fn center() -> (f32, f32) {
        (Self::WIDTH / 2.0, Self::HEIGHT / 2.0)
    }
}

pub const DEFAULT_BALL_SPEED: f32 = 5.0;
pub const DEFAULT_PADDLE_HEIGHT: f32 = 100.0;
pub const DEFAULT_BRICK_ROWS: u32 = 20;

const MAX_BALL_SPEED: f32 = 20.0;
const MAX_PADDLE_HEIGHT: f32 = 300.0;
const MAX_BRICK_ROWS: u32 = 20;

/// How a match is scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Classic,
    Team,
    Cooperative,
}

impl GameMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameMode::Classic => "classic",
            GameMode::Team => "team",
            GameMode::Cooperative => "cooperative",
        }
    }
}

/// Per-room tunables; mutable only while the room is waiting
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Base ball speed; also the lower clamp after bounces
    pub ball_speed: f32,
    /// Baseline paddle height that power-up effects revert to
    pub paddle_height: f32,
    pub brick_rows: u32,
    pub game_mode: GameMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ball_speed: DEFAULT_BALL_SPEED,
            paddle_height: DEFAULT_PADDLE_HEIGHT,
            brick_rows: DEFAULT_BRICK_ROWS,
            game_mode: GameMode::Classic,
        }
    }
}

/// Partial settings update; absent fields keep their current value
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub ball_speed: Option<f32>,
    pub paddle_height: Option<f32>,
    pub brick_rows: Option<u32>,
    pub game_mode: Option<GameMode>,
}

impl Settings {
    /// Return a copy with `patch` applied, or the first out-of-range field.
    pub fn merged(&self, patch: &SettingsPatch) -> Result<Settings, RoomError> {
        let merged = Settings {
            ball_speed: patch.ball_speed.unwrap_or(self.ball_speed),
            paddle_height: patch.paddle_height.unwrap_or(self.paddle_height),
            brick_rows: patch.brick_rows.unwrap_or(self.brick_rows),
            game_mode: patch.game_mode.unwrap_or(self.game_mode),
        };
        merged.validate()?;
        Ok(merged)
    }

    fn validate(&self) -> Result<(), RoomError> {
        if !(self.ball_speed > 0.0 && self.ball_speed <= MAX_BALL_SPEED) {
            return Err(RoomError::InvalidSettings(format!(
                "ballSpeed must be in (0, {MAX_BALL_SPEED}], got {}",
                self.ball_speed
            )));
        }
        if !(Court::MIN_PADDLE_HEIGHT..=MAX_PADDLE_HEIGHT).contains(&self.paddle_height) {
            return Err(RoomError::InvalidSettings(format!(
                "paddleHeight must be in [{}, {MAX_PADDLE_HEIGHT}], got {}",
                Court::MIN_PADDLE_HEIGHT,
                self.paddle_height
            )));
        }
        if !(1..=MAX_BRICK_ROWS).contains(&self.brick_rows) {
            return Err(RoomError::InvalidSettings(format!(
                "brickRows must be in [1, {MAX_BRICK_ROWS}], got {}",
                self.brick_rows
            )));
        }
        Ok(())
    }
}
