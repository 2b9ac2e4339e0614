//! Brickrally room server library.
//!
//! An authoritative multiplayer server for a paddle-and-bricks game: it groups
//! WebSocket connections into rooms, runs a fixed-step simulation per room,
//! and broadcasts the resulting state to every member.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
