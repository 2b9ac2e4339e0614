//! Domain error types.

use thiserror::Error;

/// Validation failures when constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("room id exceeds {max} characters (got {actual})")]
    RoomIdTooLong { max: usize, actual: usize },

    #[error("nickname must not be empty")]
    EmptyNickname,

    #[error("nickname exceeds {max} characters (got {actual})")]
    NicknameTooLong { max: usize, actual: usize },

    #[error("chat text must not be empty")]
    EmptyChatText,

    #[error("chat text exceeds {max} characters (got {actual})")]
    ChatTextTooLong { max: usize, actual: usize },

    #[error("paddle direction must be -1 or +1 (got {0})")]
    InvalidDirection(i32),
}

/// Rejected room operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    /// The connection already occupies a slot or spectates in this room
    #[error("connection '{0}' is already a member of the room")]
    AlreadyMember(String),

    /// The connection is not in this room
    #[error("connection '{0}' is not a member of the room")]
    NotAMember(String),

    /// The connection does not own the slot or side it acted on
    #[error("connection '{0}' is not allowed to perform this action")]
    Unauthorized(String),

    /// The operation is not valid in the room's current phase
    #[error("operation not allowed while the room is {0}")]
    InvalidPhase(&'static str),

    /// A settings value is outside its accepted range
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// The room was removed from the registry after being emptied
    #[error("room has been closed")]
    Closed,
}

/// Registry-level failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("connection '{0}' is already bound to room '{1}'")]
    AlreadyBound(String, String),
}

/// Message push failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("failed to push message: {0}")]
    PushFailed(String),
}

/// Global scoreboard persistence failures
#[derive(Debug, Error)]
pub enum ScoreboardError {
    #[error("scoreboard I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("scoreboard file is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}
