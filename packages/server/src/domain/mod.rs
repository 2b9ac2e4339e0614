//! Domain layer: rules of the game and the seams it needs from the outside.

pub mod error;
pub mod game_state;
pub mod message_pusher;
pub mod physics;
pub mod registry;
pub mod room;
pub mod scoreboard;
pub mod settings;
pub mod value_object;

pub use error::{MessagePushError, RegistryError, RoomError, ScoreboardError, ValueObjectError};
pub use game_state::{
    Ball, Brick, GameState, Paddle, PendingRevert, PowerUp, PowerUpEffect, PowerUpKind, Score,
    Side,
};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{RoomRegistry, RoomSummary, SharedRoom};
pub use room::{
    ChatEntry, Departure, Feedback, MatchResult, Member, Membership, Phase, Readiness, Role,
    Room, RoomEvent, RoomScoreboard, Severity, Slot,
};
#[cfg(test)]
pub use scoreboard::MockScoreboardStore;
pub use scoreboard::{GlobalScoreboard, ScoreboardStore};
pub use settings::{Court, GameMode, Settings, SettingsPatch};
pub use value_object::{
    ChatText, ConnectionId, Direction, Nickname, RoomId, RoomIdFactory, Timestamp,
};
