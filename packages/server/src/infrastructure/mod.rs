//! Infrastructure layer: wire formats and concrete implementations of the
//! domain's seams.

pub mod dto;
pub mod message_pusher;
pub mod repository;
pub mod scoreboard;
