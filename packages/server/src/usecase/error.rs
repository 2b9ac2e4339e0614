//! UseCase errors.

use thiserror::Error;

use crate::domain::{RoomError, ValueObjectError};

/// Joining a room failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    #[error("invalid nickname: {0}")]
    InvalidNickname(ValueObjectError),

    #[error("invalid room id: {0}")]
    InvalidRoomId(ValueObjectError),

    #[error("{0}")]
    InvalidSettings(RoomError),

    /// The connection must leave its current room first
    #[error("connection '{0}' is already in room '{1}'")]
    AlreadyInRoom(String, String),

    #[error("room rejected the join: {0}")]
    Room(RoomError),
}

impl JoinError {
    /// Whether the client sent something it could fix
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            JoinError::InvalidNickname(_) | JoinError::InvalidRoomId(_) | JoinError::InvalidSettings(_)
        )
    }
}

/// An in-room intent was not applied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntentError {
    /// The connection is still in the lobby
    #[error("connection '{0}' is not in a room")]
    NotInRoom(String),

    #[error("room '{0}' not found")]
    RoomNotFound(String),

    #[error("malformed intent: {0}")]
    Malformed(String),

    #[error(transparent)]
    Rejected(#[from] RoomError),
}

impl IntentError {
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            IntentError::Malformed(_) | IntentError::Rejected(RoomError::InvalidSettings(_))
        )
    }
}
