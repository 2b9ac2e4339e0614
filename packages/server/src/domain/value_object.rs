//! Value objects shared across the domain.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::ValueObjectError;

const ROOM_ID_MAX_LENGTH: usize = 64;
const NICKNAME_MAX_LENGTH: usize = 32;
const CHAT_TEXT_MAX_LENGTH: usize = 500;

/// Identity of one duplex client connection
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(String);

impl ConnectionId {
    /// Generate a fresh random connection id
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConnectionId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Room identifier, caller-supplied or generated
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RoomId(String);

impl RoomId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::EmptyRoomId);
        }
        let length = value.chars().count();
        if length > ROOM_ID_MAX_LENGTH {
            return Err(ValueObjectError::RoomIdTooLong {
                max: ROOM_ID_MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for RoomId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generates room ids for joins that do not name a room
pub struct RoomIdFactory;

impl RoomIdFactory {
    pub fn generate() -> RoomId {
        RoomId(Uuid::new_v4().simple().to_string()[..8].to_string())
    }
}

/// Player-facing display name, also the global scoreboard key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Nickname(String);

impl Nickname {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(ValueObjectError::EmptyNickname);
        }
        let length = value.chars().count();
        if length > NICKNAME_MAX_LENGTH {
            return Err(ValueObjectError::NicknameTooLong {
                max: NICKNAME_MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Nickname {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Nickname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatText(String);

impl ChatText {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.trim().is_empty() {
            return Err(ValueObjectError::EmptyChatText);
        }
        let length = value.chars().count();
        if length > CHAT_TEXT_MAX_LENGTH {
            return Err(ValueObjectError::ChatTextTooLong {
                max: CHAT_TEXT_MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ChatText {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

/// Vertical paddle step direction, exactly -1 or +1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Direction(i8);

impl Direction {
    pub const UP: Direction = Direction(-1);
    pub const DOWN: Direction = Direction(1);

    pub fn value(&self) -> f32 {
        f32::from(self.0)
    }
}

impl TryFrom<i32> for Direction {
    type Error = ValueObjectError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Self::UP),
            1 => Ok(Self::DOWN),
            other => Err(ValueObjectError::InvalidDirection(other)),
        }
    }
}
