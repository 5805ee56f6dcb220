//! WebSocket handler bridging sockets to the room manager.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server assigns a [`ConnectionId`] and spawns a send task that writes
//!    every queued [`ServerEvent`] as a JSON text frame
//! 3. The receive loop rate-limits, parses and dispatches client frames:
//!    - `join_game` enters the matchmaking queue
//!    - `draw_card` is forwarded to the room named in the request
//! 4. On close the manager is told the connection is gone, wherever it is
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:3000/ws');
//! ws.onopen = () => ws.send(JSON.stringify({event: "join_game", data: {nickname: "ann"}}));
//! ws.onmessage = (frame) => {
//!   const {event, data} = JSON.parse(frame.data);
//!   if (event === "game_start") roomID = data.roomID;
//! };
//! ws.send(JSON.stringify({event: "draw_card", data: {roomID, targetIndex: null, cardIndex: null}}));
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use old_maid::{
    constants::CONNECTION_CHANNEL_CAPACITY,
    entities::ConnectionId,
    messages::{ClientMessage, ErrorMessage, ServerEvent},
    net::connection::Connection,
};
use tokio::sync::mpsc;

use super::{AppState, rate_limiter::MessageLimiter};
use crate::metrics;

/// WebSocket upgrade handler.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one socket until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let id = ConnectionId::new();

    metrics::websocket_connected();
    info!("WebSocket connected: {id}");

    let (events, mut events_rx) = mpsc::channel::<ServerEvent>(CONNECTION_CHANNEL_CAPACITY);

    let send_task = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {}: {}", event.name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
    });

    let mut limiter = MessageLimiter::default();

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                metrics::websocket_messages_received();

                if let Err(limited) = limiter.check() {
                    warn!("{} rate limit exceeded for {id}", limited.label());
                    metrics::rate_limit_hits_total(limited.label());
                    reply_error(&events, limited.message());
                    continue;
                }

                match parse_client_message(&text) {
                    Ok(message) => handle_client_message(message, id, &events, &state).await,
                    Err(e) => {
                        debug!("Unparseable frame from {id}: {e}");
                        reply_error(&events, "Invalid message format");
                    }
                }
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket close frame from {id}");
                break;
            }
            Err(e) => {
                warn!("WebSocket error for {id}: {e}");
                break;
            }
            _ => {}
        }
    }

    state.room_manager.disconnect(&id).await;
    send_task.abort();

    metrics::websocket_disconnected();
    refresh_gauges(&state).await;
    info!("WebSocket disconnected: {id}");
}

fn parse_client_message(text: &str) -> Result<ClientMessage, serde_json::Error> {
    serde_json::from_str(text)
}

fn reply_error(events: &mpsc::Sender<ServerEvent>, message: &str) {
    // A full channel means the client is not reading; dropping is fine.
    let _ = events.try_send(ServerEvent::Error(ErrorMessage::new(message)));
}

/// Dispatch a parsed client frame.
///
/// Stale or misdirected draws are not errors: the room ignores them, and
/// a draw naming a room that no longer exists is dropped.
async fn handle_client_message(
    message: ClientMessage,
    id: ConnectionId,
    events: &mpsc::Sender<ServerEvent>,
    state: &AppState,
) {
    match message {
        ClientMessage::JoinGame(request) => {
            if let Some(room_id) = state.room_manager.room_of(&id).await {
                debug!("{id} is already seated in {room_id}, ignoring join");
                return;
            }

            let connection = Connection::new(id, request.nickname(), events.clone());
            info!("{id} joining queue as {}", connection.nickname);

            if let Some(room_id) = state.room_manager.enqueue(connection).await {
                debug!("{id} completed room {room_id}");
                metrics::matches_started_total();
            }
            refresh_gauges(state).await;
        }

        ClientMessage::DrawCard(request) => {
            let result = state
                .room_manager
                .submit_action(&request.room_id, id, request.target(), request.card())
                .await;
            if let Err(e) = result {
                debug!("Draw from {id} dropped: {e}");
            }
        }
    }
}

async fn refresh_gauges(state: &AppState) {
    metrics::queue_length(state.room_manager.queue_len().await);
    metrics::active_rooms(state.room_manager.active_room_count().await);
}
