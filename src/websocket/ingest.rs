use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{stream::SplitStream, SinkExt, Stream, StreamExt};
use tokio::time::{timeout, Duration};

use crate::{
    api::AppState,
    collector::{next_session_id, Collector, RawFrame, Session},
    constants::WS_CLIENT_TIMEOUT_SECS,
};

fn connected_payload(session_id: u64) -> String {
    serde_json::json!({
        "type": "connected",
        "session_id": session_id,
    })
    .to_string()
}

/// WebSocket ingest for captured game frames; one connection is one observed session.
/// GET /ws/collect
pub async fn handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state.collector))
}

async fn handle_socket(socket: WebSocket, collector: Collector) {
    let session = Session::new(next_session_id());
    let session_id = session.id();
    let (mut sender, receiver) = socket.split();

    if sender
        .send(Message::Text(connected_payload(session_id).into()))
        .await
        .is_err()
    {
        tracing::debug!("Session {} closed before handshake completed", session_id);
        return;
    }
    tracing::info!("Collector session {} connected", session_id);

    let report = collector
        .run_session(session, incoming_frames(receiver, session_id))
        .await;

    tracing::info!(
        "Collector session {} closed: {} frames, {} dropped, {} rounds ({} new, {} duplicate, {} failed)",
        report.session_id,
        report.frames,
        report.decode_failures,
        report.rounds_emitted,
        report.inserted,
        report.duplicates,
        report.store_failures
    );
}

// Data frames only; control frames are skipped and the stream ends on close,
// transport error, or idle timeout.
fn incoming_frames(
    receiver: SplitStream<WebSocket>,
    session_id: u64,
) -> impl Stream<Item = RawFrame> {
    futures_util::stream::unfold(receiver, move |mut receiver| async move {
        loop {
            let next_msg =
                timeout(Duration::from_secs(WS_CLIENT_TIMEOUT_SECS), receiver.next()).await;
            let msg = match next_msg {
                Ok(Some(Ok(msg))) => msg,
                Ok(Some(Err(e))) => {
                    tracing::debug!("Session {} transport error: {}", session_id, e);
                    return None;
                }
                Ok(None) => return None,
                Err(_) => {
                    tracing::info!("Session {} idle timeout", session_id);
                    return None;
                }
            };

            match msg {
                Message::Text(text) => {
                    return Some((RawFrame::Text(text.as_str().to_owned()), receiver));
                }
                Message::Binary(bytes) => {
                    return Some((RawFrame::Binary(bytes.to_vec()), receiver));
                }
                Message::Close(_) => {
                    tracing::debug!("Session {} sent close", session_id);
                    return None;
                }
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
    })
}
