use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use hermes_types::events::{GatewayCommand, GatewayEvent};

use crate::delivery::DeliveryCoordinator;

/// Heartbeat interval: server sends a Ping every 15 seconds.
/// If 2 consecutive Pongs are missed (~30s), the connection is dropped.
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

/// Handle a single WebSocket session. Sessions are anonymous connection
/// handles: they are registered on connect, receive every broadcast event,
/// and are pruned on disconnect.
pub async fn handle_connection(socket: WebSocket, coordinator: DeliveryCoordinator) {
    let (mut sender, mut receiver) = socket.split();

    let dispatcher = coordinator.dispatcher().clone();
    let (conn_id, mut broadcast_rx) = dispatcher.register().await;
    info!(
        "session {} connected ({} live)",
        conn_id,
        dispatcher.session_count().await
    );

    // Targeted replies (rejections) for this session only.
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<GatewayEvent>();

    let pong_received = Arc::new(AtomicBool::new(true));
    let pong_flag_send = pong_received.clone();
    let pong_flag_recv = pong_received.clone();

    // Forward broadcasts + targeted replies to the client, with heartbeat.
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
        heartbeat.tick().await;
        let mut missed_heartbeats: u8 = 0;

        loop {
            tokio::select! {
                result = broadcast_rx.recv() => {
                    let event = match result {
                        Ok(event) => event,
                        Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                            warn!("session lagged by {} events, dropping them", n);
                            continue;
                        }
                        Err(_) => break,
                    };

                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("failed to encode gateway event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                result = reply_rx.recv() => {
                    let event = match result {
                        Some(event) => event,
                        None => break,
                    };
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            warn!("failed to encode gateway event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                _ = heartbeat.tick() => {
                    if pong_flag_send.swap(false, Ordering::Acquire) {
                        missed_heartbeats = 0;
                    } else {
                        missed_heartbeats += 1;
                        if missed_heartbeats >= 2 {
                            warn!("heartbeat timeout (missed {} pongs), dropping connection", missed_heartbeats);
                            break;
                        }
                    }
                    if sender.send(Message::Ping(vec![].into())).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    // Read commands from the client.
    let coordinator_recv = coordinator.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<GatewayCommand>(&text) {
                    Ok(cmd) => {
                        handle_command(&coordinator_recv, cmd, &reply_tx).await;
                    }
                    Err(e) => {
                        warn!(
                            "session {} bad command: {} -- raw: {}",
                            conn_id,
                            e,
                            log_preview(&text)
                        );
                    }
                },
                Message::Pong(_) => {
                    pong_flag_recv.store(true, Ordering::Release);
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    dispatcher.unregister(conn_id).await;
    info!("session {} disconnected", conn_id);
}

/// The websocket ingress is a thin adapter: a `SendMessage` command runs the
/// same gate -> append -> broadcast path as `POST /message`. On success the
/// broadcast reaches this session too; on failure only this session hears
/// about it.
pub async fn handle_command(
    coordinator: &DeliveryCoordinator,
    cmd: GatewayCommand,
    reply_tx: &mpsc::UnboundedSender<GatewayEvent>,
) {
    match cmd {
        GatewayCommand::SendMessage {
            sender,
            receiver,
            content,
        } => {
            if let Err(e) = coordinator.send(&sender, &receiver, &content).await {
                warn!("{} -> {}: gateway send rejected: {}", sender, receiver, e);
                let _ = reply_tx.send(GatewayEvent::SendRejected {
                    reason: e.to_string(),
                });
            }
        }
    }
}

const MAX_LOG_PREVIEW: usize = 200;

/// Truncate a client-supplied frame for logging. Frames are untrusted, so the
/// cut must land on a char boundary or the slice panics.
fn log_preview(text: &str) -> &str {
    if text.len() <= MAX_LOG_PREVIEW {
        return text;
    }
    let mut end = MAX_LOG_PREVIEW;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
