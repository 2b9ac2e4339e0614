//! UI layer: HTTP and WebSocket entry points plus the tick scheduler.

pub mod handler;
pub mod server;
pub mod signal;
pub mod state;
pub mod ticker;

pub use server::Server;
