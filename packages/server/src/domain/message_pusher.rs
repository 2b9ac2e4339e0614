//! Outbound message delivery trait.
//!
//! Use cases push serialized frames through this seam without knowing the
//! transport.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Per-connection outbound queue, drained by the connection's writer task
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    async fn register_client(&self, connection: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, connection: &ConnectionId);

    /// Send to one connection.
    async fn push_to(&self, connection: &ConnectionId, content: &str)
    -> Result<(), MessagePushError>;

    /// Send to every target. Individual failures are logged and skipped.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Every registered connection
    async fn connected_clients(&self) -> Vec<ConnectionId>;
}
