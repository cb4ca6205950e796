// =============================================================================
// WebSocket Handler — auto-refreshing dashboard feed
// =============================================================================
//
// Clients connect to `/api/v1/ws?min_score=<n>` and receive:
//   1. An immediate DashboardSnapshot on connect.
//   2. A fresh snapshot whenever the state version has moved, checked every
//      second.
//
// Text frames from the client are read as a new `min_score` threshold for
// this connection (e.g. `"72.5"`); anything unparsable is ignored.
// =============================================================================

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Query, State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::time::{interval, Duration};
use tracing::{debug, info, warn};

use crate::app_state::AppState;
use crate::runtime_config::clamp_min_score;

const PUSH_CHECK: Duration = Duration::from_secs(1);

#[derive(Deserialize)]
pub struct WsQuery {
    #[serde(default)]
    min_score: Option<f64>,
}

/// Axum handler for the WebSocket upgrade request.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Query(query): Query<WsQuery>,
) -> impl IntoResponse {
    let min_score = query.min_score.map(clamp_min_score);
    ws.on_upgrade(move |socket| handle_connection(socket, state, min_score))
}

/// Parse a client text frame as a threshold.
fn parse_threshold(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().map(clamp_min_score)
}

async fn handle_connection(socket: WebSocket, state: Arc<AppState>, mut min_score: Option<f64>) {
    let clients = state.ws_clients.fetch_add(1, Ordering::Relaxed) + 1;
    info!(clients, "WebSocket client connected");

    let (mut sender, mut receiver) = socket.split();

    let mut last_sent_version = state.current_state_version();
    if let Err(e) = send_snapshot(&mut sender, &state, min_score).await {
        warn!(error = %e, "Failed to send initial WebSocket snapshot");
        disconnect(&state);
        return;
    }

    let mut push_interval = interval(PUSH_CHECK);

    loop {
        tokio::select! {
            _ = push_interval.tick() => {
                let current = state.current_state_version();
                if current == last_sent_version {
                    continue;
                }
                if let Err(e) = send_snapshot(&mut sender, &state, min_score).await {
                    debug!(error = %e, "WebSocket send failed — disconnecting");
                    break;
                }
                last_sent_version = current;
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Some(v) = parse_threshold(&text) {
                            debug!(min_score = v, "WebSocket threshold changed");
                            min_score = Some(v);
                            if let Err(e) = send_snapshot(&mut sender, &state, min_score).await {
                                debug!(error = %e, "WebSocket send failed — disconnecting");
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!(error = %e, "WebSocket receive error — disconnecting");
                        break;
                    }
                }
            }
        }
    }

    disconnect(&state);
}

/// Serialize and send the current snapshot.
async fn send_snapshot<S>(
    sender: &mut S,
    state: &AppState,
    min_score: Option<f64>,
) -> Result<(), axum::Error>
where
    S: Sink<Message, Error = axum::Error> + Unpin,
{
    let snapshot = state.build_snapshot(min_score);

    match serde_json::to_string(&snapshot) {
        Ok(json) => {
            sender.send(Message::Text(json)).await?;
            debug!(version = snapshot.state_version, "WebSocket snapshot sent");
            Ok(())
        }
        Err(e) => {
            // Serialisation errors are not network errors; keep the socket.
            warn!(error = %e, "Failed to serialize snapshot");
            Ok(())
        }
    }
}

fn disconnect(state: &AppState) {
    let remaining = state.ws_clients.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
    info!(clients = remaining, "WebSocket client disconnected");
}
