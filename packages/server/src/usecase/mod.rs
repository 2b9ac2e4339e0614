//! UseCase layer: one struct per intent family, plus the simulation tick.

pub mod error;
pub mod global_scoreboard;
pub mod join_room;
pub mod leave_room;
pub mod lobby;
pub mod notifier;
pub mod room_intent;
pub mod send_chat;
pub mod tick_rooms;

pub use error::{IntentError, JoinError};
pub use global_scoreboard::GlobalScoreboardUseCase;
pub use join_room::{JoinOutcome, JoinRoomUseCase};
pub use leave_room::{LeaveReason, LeaveRoomUseCase};
pub use lobby::LobbyUseCase;
pub use notifier::Notifier;
pub use room_intent::RoomIntentUseCase;
pub use send_chat::SendChatUseCase;
pub use tick_rooms::TickRoomsUseCase;
