//! # WebSocket Sessions
//!
//! One task per upgraded socket, pumping frames between the socket and the object:
//!
//! - **Writer**: drains the connection channel the object pushes into and writes each
//!   [`OutboundFrame`] to the socket. Stops after a close frame.
//! - **Reader** (the session task itself): forwards every text or binary frame to the
//!   object, then reports how the stream ended, exactly once.
//!
//! The object never touches the socket, so a slow peer only backs up its own channel.

use crate::clients::GreeterClient;
use crate::lifecycle::GreeterSystem;
use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use futures::{SinkExt, StreamExt};
use object_framework::connection;
use object_framework::{CloseEvent, ConnectionId, InboundFrame, ObjectStub, OutboundFrame};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Close code reported when the peer's close frame carried no status.
const NO_STATUS: u16 = 1005;

/// `GET /ws`
pub async fn upgrade(
    State(system): State<Arc<GreeterSystem>>,
    headers: HeaderMap,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    if !wants_websocket(&headers) {
        return (StatusCode::UPGRADE_REQUIRED, "Expected websocket request").into_response();
    }
    match ws {
        Ok(ws) => {
            let client = system.object();
            ws.on_upgrade(move |socket| session(socket, client))
        }
        Err(rejection) => rejection.into_response(),
    }
}

fn wants_websocket(headers: &HeaderMap) -> bool {
    headers
        .get(header::UPGRADE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("websocket"))
}

async fn session(socket: WebSocket, client: GreeterClient) {
    let (sender, mut outbound) = connection::channel();
    let id = match client.accept_stream(sender).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "Could not register stream");
            return;
        }
    };
    info!(connection = %id, "Stream opened");

    let (mut sink, mut stream) = socket.split();
    let writer = tokio::spawn(async move {
        while let Some(frame) = outbound.recv().await {
            let (message, last) = match frame {
                OutboundFrame::Text(text) => (Message::Text(text), false),
                OutboundFrame::Close { code, reason } => (
                    Message::Close(Some(CloseFrame {
                        code,
                        reason: reason.into(),
                    })),
                    true,
                ),
            };
            if sink.send(message).await.is_err() || last {
                break;
            }
        }
    });

    let event = read_until_closed(id, &mut stream, &client).await;
    info!(connection = %id, code = event.code, clean = event.was_clean, "Stream ended");
    if let Err(e) = client.stream_closed(id, event).await {
        debug!(connection = %id, error = %e, "Object gone before close was reported");
        writer.abort();
    }
    // Finishes once the object has sent its close frame and dropped the sender.
    let _ = writer.await;
}

async fn read_until_closed(
    id: ConnectionId,
    stream: &mut futures::stream::SplitStream<WebSocket>,
    client: &GreeterClient,
) -> CloseEvent {
    loop {
        let frame = match stream.next().await {
            Some(Ok(Message::Text(text))) => InboundFrame::Text(text),
            Some(Ok(Message::Binary(bytes))) => InboundFrame::Binary(bytes),
            Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
            Some(Ok(Message::Close(Some(frame)))) => {
                return CloseEvent::clean(frame.code, frame.reason.into_owned())
            }
            Some(Ok(Message::Close(None))) => return CloseEvent::clean(NO_STATUS, ""),
            Some(Err(e)) => {
                debug!(connection = %id, error = %e, "Socket error");
                return CloseEvent::abnormal();
            }
            None => return CloseEvent::abnormal(),
        };
        debug!(connection = %id, bytes = frame.len(), "Frame received");
        if let Err(e) = client.stream_message(id, frame).await {
            warn!(connection = %id, error = %e, "Message not handled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn upgrade_header_is_case_insensitive() {
        let mut headers = HeaderMap::new();
        assert!(!wants_websocket(&headers));
        headers.insert(header::UPGRADE, HeaderValue::from_static("WebSocket"));
        assert!(wants_websocket(&headers));
        headers.insert(header::UPGRADE, HeaderValue::from_static("h2c"));
        assert!(!wants_websocket(&headers));
    }
}
