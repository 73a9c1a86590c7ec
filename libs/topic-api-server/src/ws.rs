use std::sync::Arc;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use tokio::sync::mpsc;

use pubsub_api::{Message, StreamFrame, SubscribeRequest};

use super::AppState;

// ═══════════════════════════════════════════════════════════════
//  WebSocket: /ws/subscribe
// ═══════════════════════════════════════════════════════════════

pub(crate) async fn handle_subscribe(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(socket, state))
}

// ═══════════════════════════════════════════════════════════════
//  Connection handler
// ═══════════════════════════════════════════════════════════════

/// First frame → `SubscribeRequest`, then session output → frames until
/// either side goes away.
async fn ws_connection(mut socket: WebSocket, state: AppState) {
    // Idle sockets that never send a request still end on shutdown.
    let request = tokio::select! {
        request = read_request(&mut socket) => request,
        _ = state.shutdown.cancelled() => None,
    };
    let Some(request) = request else {
        if state.shutdown.is_cancelled() {
            let _ = socket.send(WsMessage::Close(None)).await;
        }
        return;
    };
    let topics = request.topic_set();
    tracing::info!(?topics, "new subscriber");

    let (tx, mut rx) = mpsc::channel::<Arc<Message>>(state.ws_buffer);
    let token = state.shutdown.child_token();
    let session = state.broker.open_session(topics.clone());
    let session_handle = tokio::spawn(session.run(tx, token.clone()));

    loop {
        tokio::select! {
            biased;

            msg = socket.recv() => {
                match msg {
                    Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => break,
                    // Anything else from the subscriber after the request is ignored.
                    Some(Ok(_)) => continue,
                }
            }

            delivered = rx.recv() => {
                let Some(message) = delivered else { break };
                let frame = StreamFrame::Message(Message::clone(&message));
                match serde_json::to_string(&frame) {
                    Ok(json) => {
                        if socket.send(WsMessage::Text(json.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "encode stream frame");
                    }
                }
            }
        }
    }

    token.cancel();
    let _ = session_handle.await;
    let _ = socket.send(WsMessage::Close(None)).await;
    tracing::info!(?topics, "subscriber disconnected");
}

async fn read_request(socket: &mut WebSocket) -> Option<SubscribeRequest> {
    loop {
        let text = match socket.recv().await {
            Some(Ok(WsMessage::Text(t))) => t,
            Some(Ok(WsMessage::Close(_))) | Some(Err(_)) | None => return None,
            Some(Ok(_)) => continue,
        };

        return match serde_json::from_str::<SubscribeRequest>(&text) {
            Ok(request) => Some(request),
            Err(e) => {
                let frame = StreamFrame::Error {
                    error: format!("parse: {e}"),
                };
                if let Ok(json) = serde_json::to_string(&frame) {
                    let _ = socket.send(WsMessage::Text(json.into())).await;
                }
                let _ = socket.send(WsMessage::Close(None)).await;
                None
            }
        };
    }
}
