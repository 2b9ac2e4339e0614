//! `MessagePusher` implementations.
//!
//! - `websocket`: per-connection WebSocket queues

pub mod websocket;

pub use websocket::WebSocketMessagePusher;
