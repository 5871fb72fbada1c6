//! WebSocket connection lifecycle management.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};

use crate::http::routes::AppState;
use crate::room::Room;
use crate::util::id::ConnectionId;
use crate::ws::protocol::{ClientToServer, ServerToClient};

pub async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(state.room, socket))
}

async fn handle_socket(room: Arc<Room>, socket: WebSocket) {
    let connection = ConnectionId::new();
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut outbox = room.connect(connection.clone());

    // Forward room messages to the websocket
    let forward = tokio::spawn(async move {
        while let Some(msg) = outbox.recv().await {
            let text = match serde_json::to_string(&msg) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(%err, "failed to encode outbound message");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(msg)) = ws_rx.next().await {
        match msg {
            Message::Text(txt) => match serde_json::from_str::<ClientToServer>(&txt) {
                Ok(intent) => dispatch(&room, &connection, intent).await,
                Err(err) => {
                    room.send_to(&connection, ServerToClient::Error { message: format!("Bad message: {}", err) });
                }
            },
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    room.disconnect(&connection);
    forward.abort();
    tracing::debug!(%connection, "ws closed");
}

async fn dispatch(room: &Arc<Room>, connection: &ConnectionId, intent: ClientToServer) {
    match intent {
        ClientToServer::Ping => room.send_to(connection, ServerToClient::Pong),
        ClientToServer::Start { rows, cols, players } => {
            if let Err(err) = room.start(rows, cols, players as usize).await {
                room.send_to(connection, ServerToClient::Error { message: err.to_string() });
            }
        }
        ClientToServer::Join { display_name } => room.join(connection, &display_name),
        ClientToServer::Flip { coord } => room.flip(connection, &coord),
        ClientToServer::Reset => room.reset(),
    }
}
