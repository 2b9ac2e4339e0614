//! WebSocket session gateway.
//!
//! Each socket gets a fresh [`ConnectionId`] and starts in the lobby. Inbound
//! text frames are parsed into intents and dispatched to use cases; outbound
//! frames arrive through the connection's pusher queue. Closing the socket is
//! an implicit leave.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, Severity},
    infrastructure::dto::websocket::{ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::{IntentError, LeaveReason},
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drain the connection's queue into the socket until either side closes.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let connection = ConnectionId::generate();
    let (tx, rx) = mpsc::unbounded_channel();
    state
        .message_pusher
        .register_client(connection.clone(), tx)
        .await;
    tracing::info!("Connection '{}' opened", connection);

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    state.lobby.send_room_list(&connection).await;

    let recv_state = state.clone();
    let recv_connection = connection.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::error!("WebSocket error on '{}': {}", recv_connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => dispatch(&recv_state, &recv_connection, &text).await,
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", recv_connection);
                    break;
                }
                _ => {}
            }
        }
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    state.message_pusher.unregister_client(&connection).await;
    match state
        .leave_room
        .execute(&connection, LeaveReason::Disconnected)
        .await
    {
        Ok(room_id) => tracing::info!("Connection '{}' dropped out of room '{}'", connection, room_id),
        Err(IntentError::NotInRoom(_)) => {}
        Err(e) => tracing::warn!("Implicit leave for '{}' failed: {}", connection, e),
    }
    tracing::info!("Connection '{}' closed", connection);
}

/// Parse one inbound frame and route it to its use case.
async fn dispatch(state: &AppState, connection: &ConnectionId, text: &str) {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(e) => {
            tracing::warn!("Malformed message from '{}': {}", connection, e);
            notify_malformed(state, connection, format!("Malformed message: {e}")).await;
            return;
        }
    };
    tracing::debug!("Intent from '{}': {:?}", connection, message);

    let result = match message {
        ClientMessage::ListRooms => {
            state.lobby.send_room_list(connection).await;
            Ok(())
        }
        ClientMessage::JoinRoom {
            room_id,
            nickname,
            settings,
        } => {
            if let Err(e) = state
                .join_room
                .execute(connection.clone(), room_id, nickname, settings)
                .await
            {
                tracing::warn!("Join from '{}' rejected: {}", connection, e);
                notify_malformed(state, connection, e.to_string()).await;
            }
            Ok(())
        }
        ClientMessage::SetReady { slot } => state.room_intent.set_ready(connection, slot.into()).await,
        ClientMessage::TogglePause => state.room_intent.toggle_pause(connection).await,
        ClientMessage::MovePaddle { side, direction } => {
            state
                .room_intent
                .move_paddle(connection, side.into(), direction)
                .await
        }
        ClientMessage::UpdateSettings { settings } => {
            state.room_intent.update_settings(connection, settings).await
        }
        ClientMessage::RequestReplay => state.room_intent.request_replay(connection).await,
        ClientMessage::LeaveRoom => state
            .leave_room
            .execute(connection, LeaveReason::Left)
            .await
            .map(|_| ()),
        ClientMessage::SendChat { text } => state.send_chat.execute(connection, text).await,
        ClientMessage::Typing => state.send_chat.typing(connection).await,
        ClientMessage::RequestGlobalScoreboard => {
            state.global_scoreboard.send_to(connection).await;
            Ok(())
        }
    };

    match result {
        Ok(()) => {}
        Err(e) if e.is_malformed() => {
            tracing::warn!("Malformed intent from '{}': {}", connection, e);
            notify_malformed(state, connection, e.to_string()).await;
        }
        Err(e) => tracing::debug!("Ignored intent from '{}': {}", connection, e),
    }
}

async fn notify_malformed(state: &AppState, connection: &ConnectionId, text: String) {
    state
        .notifier
        .send(
            connection,
            &ServerMessage::Notice {
                text,
                severity: Severity::Warning,
            },
        )
        .await;
}
