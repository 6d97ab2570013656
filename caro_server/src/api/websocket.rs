//! WebSocket transport for the game event channel.
//!
//! # Connection Flow
//!
//! 1. Client connects via `GET /ws`
//! 2. Server assigns a session id, opens its outbound queue in the
//!    [`ChannelHub`](caro::ChannelHub) and sends `connected`
//! 3. A send task drains the queue into the socket as JSON text frames
//! 4. The receive loop rate-limits and hands each text frame to the
//!    [`GameService`](caro::GameService)
//! 5. On close, the session's rooms are torn down and the queue is dropped
//!
//! # Example
//!
//! ```javascript
//! const ws = new WebSocket('ws://localhost:5000/ws');
//!
//! ws.onmessage = (event) => {
//!   const { event: name, data } = JSON.parse(event.data);
//!   if (name === 'state_update') {
//!     renderBoard(data.board, data.winner_positions);
//!   }
//! };
//!
//! ws.send(JSON.stringify({ event: 'find_room', data: { solo: true } }));
//! ```

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use caro::{EventSink, ServerEvent, SessionId};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, info, warn};
use std::time::Instant;

use super::{
    AppState,
    rate_limiter::{LimitWindow, MessageLimiter},
};
use crate::{logging, metrics};

/// Upgrade an HTTP request to the game event channel.
pub async fn websocket_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Drive one connection until the client goes away.
async fn handle_socket(socket: WebSocket, state: AppState) {
    let session = SessionId::new();
    let opened_at = Instant::now();
    let (mut sender, mut receiver) = socket.split();

    let mut outbound = state
        .hub
        .register(session, state.config.websocket.event_buffer);
    metrics::websocket_connections_total();
    metrics::websocket_connections_active(state.hub.session_count());
    info!("WebSocket connected: session={}", session);

    state.service.connect(session);

    let send_task = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let json = match event.to_json() {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize {} event: {}", event.name(), e);
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                break;
            }
            metrics::websocket_messages_sent();
        }
    });

    let mut limiter = MessageLimiter::from_config(&state.config.websocket);
    let mut received: u64 = 0;

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                received += 1;
                metrics::websocket_messages_received();

                if let Err(window) = limiter.check() {
                    reject_rate_limited(&state, session, window);
                    continue;
                }

                let started = Instant::now();
                state.service.handle_text(session, text.as_str()).await;
                logging::log_message_handled(
                    &session.to_string(),
                    started.elapsed().as_millis() as u64,
                );
                metrics::rooms_active(state.service.registry().room_count().await);
            }
            Ok(Message::Close(_)) => {
                debug!("WebSocket close frame: session={}", session);
                break;
            }
            Err(e) => {
                warn!("WebSocket error for session {}: {}", session, e);
                break;
            }
            _ => {}
        }
    }

    state.service.disconnect(session).await;
    state.hub.unregister(session);
    send_task.abort();

    metrics::websocket_connections_active(state.hub.session_count());
    metrics::rooms_active(state.service.registry().room_count().await);
    logging::log_connection_closed(
        &session.to_string(),
        opened_at.elapsed().as_millis() as u64,
        received,
    );
}

fn reject_rate_limited(state: &AppState, session: SessionId, window: LimitWindow) {
    logging::log_rate_limited(&session.to_string(), &window.to_string());
    metrics::rate_limit_hits_total(&window.to_string());
    if let Err(e) = state
        .hub
        .send_to(session, ServerEvent::error(window.client_message()))
    {
        warn!("Failed to report rate limit to {}: {}", session, e);
    }
}
