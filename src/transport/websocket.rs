use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};
use tracing::{debug, info, warn};

use crate::client::{Client, ClientId};
use crate::lifecycle::Lifecycle;
use crate::liveness::{Liveness, LivenessPolicy, Verdict};
use crate::relay::Relay;
use crate::transport::message::{Command, ServerMessage};
use crate::utils::error::{ProtocolError, RelayError};

/// Shared handles every connection works against.
#[derive(Clone)]
pub struct ServerState {
    pub relay: Arc<Mutex<Relay>>,
    pub lifecycle: Arc<Lifecycle>,
    pub liveness: LivenessPolicy,
}

/// Binds `addr` and serves until the lifecycle's shutdown signal fires.
pub async fn start_server(addr: &str, state: ServerState) -> Result<(), RelayError> {
    let listener = TcpListener::bind(addr).await?;
    info!("signaling relay listening on {addr}");
    serve(listener, state).await
}

/// Serves an already-bound listener. Separate from [`start_server`] so
/// tests can bind port 0 and read the address back.
pub async fn serve(listener: TcpListener, state: ServerState) -> Result<(), RelayError> {
    let lifecycle = state.lifecycle.clone();
    let app = Router::new().fallback(upgrade_or_health).with_state(state);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { lifecycle.wait_for_shutdown().await })
        .await?;
    Ok(())
}

/// Entry point for every request, any path and any method. A request
/// carrying a WebSocket upgrade becomes a relay connection; anything else
/// gets the plaintext health answer.
async fn upgrade_or_health(
    State(state): State<ServerState>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    match ws {
        Ok(upgrade) => upgrade.on_upgrade(move |socket| handle_connection(socket, state)),
        Err(_) => (StatusCode::OK, "okay").into_response(),
    }
}

async fn handle_connection(socket: WebSocket, state: ServerState) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    let client = Arc::new(Client::new(tx));
    let client_id = client.id.clone();

    // Register before doing anything else
    {
        let mut relay = state.relay.lock().unwrap();
        relay.register_client(client.clone());
    }
    info!("{client_id} connected");

    // Writer task: drains the outbound channel into the socket. It must not
    // hold the client handle, or the channel would never drain to None.
    {
        let relay = state.relay.clone();
        let lifecycle = state.lifecycle.clone();
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                if ws_sender.send(frame).await.is_err() {
                    break;
                }
            }
            finish_connection(&relay, &lifecycle, &client_id);
            debug!("send loop closed for {client_id}");
        });
    }

    let mut liveness = Liveness::new(&state.liveness, Instant::now());
    let period = state.liveness.check_period();
    // start one period out; the connection just proved itself by arriving
    let mut ticker = time::interval_at(Instant::now() + period, period);
    let mut shutdown = state.lifecycle.subscribe();

    while !*shutdown.borrow() && !client.is_closed() {
        tokio::select! {
            incoming = ws_receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Err(e) = handle_frame(&state.relay, &client, text.as_str(), &mut liveness) {
                        warn!("{client_id} protocol error: {e}");
                        break;
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    let outcome = std::str::from_utf8(&data)
                        .map_err(ProtocolError::from)
                        .and_then(|text| handle_frame(&state.relay, &client, text, &mut liveness));
                    if let Err(e) = outcome {
                        warn!("{client_id} protocol error: {e}");
                        break;
                    }
                }
                Some(Ok(Message::Pong(_))) => liveness.on_pong(),
                // pings are answered by the websocket layer itself
                Some(Ok(Message::Ping(_))) => {}
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    debug!("{client_id} receive error: {e}");
                    break;
                }
            },
            _ = ticker.tick() => match liveness.on_tick(Instant::now()) {
                Verdict::Alive => {}
                Verdict::SendPing => {
                    if !client.send(Message::Ping(Bytes::new())) {
                        break;
                    }
                }
                Verdict::Expired => {
                    info!("{client_id} failed liveness check, closing");
                    break;
                }
            },
            _ = shutdown.changed() => {}
        }
    }

    finish_connection(&state.relay, &state.lifecycle, &client_id);
    info!("{client_id} disconnected");
}

/// Parses and dispatches one inbound frame. `Err` is a protocol violation:
/// the caller closes this connection and nothing else is touched.
pub(crate) fn handle_frame(
    relay: &Mutex<Relay>,
    client: &Client,
    text: &str,
    liveness: &mut Liveness,
) -> Result<(), ProtocolError> {
    let command = Command::parse(text)?;
    let refreshes = command.refreshes_liveness();
    debug!("{} -> {text}", client.id);
    apply_command(relay, client, command);
    if refreshes {
        liveness.on_activity(Instant::now());
    }
    Ok(())
}

/// Applies a parsed command against the relay. The closed guard turns late
/// frames, ones queued behind a close, into no-ops.
pub(crate) fn apply_command(relay: &Mutex<Relay>, client: &Client, command: Command) {
    if client.is_closed() {
        return;
    }
    match command {
        Command::Subscribe { topics } => {
            let mut relay = relay.lock().unwrap();
            for topic in topics {
                relay.subscribe(&client.id, &topic);
                debug!("{} subscribed to {topic}", client.id);
            }
        }
        Command::Unsubscribe { topics } => {
            let mut relay = relay.lock().unwrap();
            for topic in topics {
                relay.unsubscribe(&client.id, &topic);
                debug!("{} unsubscribed from {topic}", client.id);
            }
        }
        Command::Publish { topic, raw } => {
            let delivered = relay.lock().unwrap().publish(&topic, &raw, &client.id);
            debug!("{} published to {topic} ({delivered} deliveries)", client.id);
        }
        Command::Ping => match serde_json::to_string(&ServerMessage::Pong) {
            Ok(pong) => {
                client.send(Message::Text(pong.into()));
            }
            Err(e) => {
                warn!("failed to serialize pong for {}: {e}", client.id);
                client.close();
            }
        },
        Command::Pong | Command::Ignore => {}
    }
}

/// Close-time cleanup shared by the read loop and the writer task. The
/// registry removal is idempotent, so whichever side gets here second only
/// re-checks the lifecycle.
fn finish_connection(relay: &Mutex<Relay>, lifecycle: &Lifecycle, id: &ClientId) {
    let remaining = {
        let mut relay = relay.lock().unwrap();
        relay.close_client(id);
        relay.client_count()
    };
    lifecycle.client_closed(remaining);
}
