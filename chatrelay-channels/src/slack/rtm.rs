//! RTM connection management
//!
//! Owns the persistent real-time session. A supervising task keeps the
//! transport alive and reconnects on transient failure; the rest of the
//! adapter sees that only as continuity of the inbound event sequence.

use crate::base::{AdapterError, Result};
use crate::slack::api::SlackApi;
use crate::slack::events::RtmEvent;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, error, info, warn};

const PING_INTERVAL: Duration = Duration::from_secs(30);
const INITIAL_RECONNECT_DELAY_SECS: u64 = 5;
const MAX_RECONNECT_DELAY_SECS: u64 = 60;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Handle to an open RTM session
pub struct RtmHandle {
    api: Arc<SlackApi>,
    supervisor: Option<JoinHandle<()>>,
}

impl RtmHandle {
    /// Post text to a channel reference over this session
    ///
    /// Transport errors are returned to the caller, which logs and
    /// discards them; this layer does not retry.
    pub async fn post_message(&self, channel_id: &str, text: &str) -> Result<()> {
        self.api.post_message(channel_id, text).await
    }

    /// End the supervising task
    pub fn shutdown(&mut self) {
        if let Some(task) = self.supervisor.take() {
            task.abort();
        }
    }

    /// Handle with no live supervisor, for exercising the outbound path
    #[cfg(test)]
    pub(crate) fn detached(api: Arc<SlackApi>) -> Self {
        Self {
            api,
            supervisor: None,
        }
    }
}

/// Open the real-time session
///
/// Returns the connection handle and the inbound event sequence: an
/// unbounded, ordered, non-restartable stream. The sequence ends only
/// when the session's credentials are rejected (after an `InvalidAuth`
/// event) or the handle is shut down.
pub fn open(api: Arc<SlackApi>) -> (RtmHandle, mpsc::UnboundedReceiver<RtmEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let supervisor_api = Arc::clone(&api);
    let supervisor = tokio::spawn(async move {
        run_supervisor(supervisor_api, tx).await;
    });

    (
        RtmHandle {
            api,
            supervisor: Some(supervisor),
        },
        rx,
    )
}

async fn run_supervisor(api: Arc<SlackApi>, events: mpsc::UnboundedSender<RtmEvent>) {
    let mut reconnect_delay = INITIAL_RECONNECT_DELAY_SECS;
    let mut connection_count: u64 = 0;

    loop {
        info!("Connecting to RTM...");

        match api.rtm_connect().await {
            Ok(session) => match tokio_tungstenite::connect_async(session.url.as_str()).await {
                Ok((ws_stream, _)) => {
                    connection_count += 1;
                    reconnect_delay = INITIAL_RECONNECT_DELAY_SECS;
                    if events
                        .send(RtmEvent::Connected { connection_count })
                        .is_err()
                    {
                        return;
                    }
                    run_stream(ws_stream, &events).await;
                }
                Err(e) => {
                    warn!("RTM WebSocket connect failed: {}", e);
                }
            },
            Err(AdapterError::Auth(e)) => {
                error!("RTM session rejected: {}", e);
                let _ = events.send(RtmEvent::InvalidAuth);
                return;
            }
            Err(e) => {
                warn!("rtm.connect failed: {}", e);
            }
        }

        if events.is_closed() {
            return;
        }

        info!("Reconnecting to RTM in {} seconds...", reconnect_delay);
        tokio::time::sleep(Duration::from_secs(reconnect_delay)).await;
        reconnect_delay = (reconnect_delay * 2).min(MAX_RECONNECT_DELAY_SECS);
    }
}

/// Drive one WebSocket session until the transport drops
async fn run_stream(ws_stream: WsStream, events: &mpsc::UnboundedSender<RtmEvent>) {
    let (mut write, mut read) = ws_stream.split();

    let mut keepalive = interval(PING_INTERVAL);
    keepalive.tick().await; // the first tick completes immediately
    let mut ping_id: u64 = 0;
    let mut last_ping: Option<(u64, Instant)> = None;

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                ping_id += 1;
                let frame = serde_json::json!({ "type": "ping", "id": ping_id }).to_string();
                if let Err(e) = write.send(WsMessage::Text(frame)).await {
                    warn!("RTM ping write failed: {}", e);
                    return;
                }
                last_ping = Some((ping_id, Instant::now()));
            }
            frame = read.next() => {
                match frame {
                    Some(Ok(WsMessage::Text(text))) => {
                        if !handle_frame(&text, events, &last_ping) {
                            return;
                        }
                    }
                    Some(Ok(WsMessage::Close(_))) => {
                        warn!("RTM WebSocket closed by peer");
                        return;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        error!("RTM WebSocket error: {}", e);
                        return;
                    }
                    None => {
                        warn!("RTM WebSocket stream ended");
                        return;
                    }
                }
            }
        }
    }
}

/// Parse one wire frame and forward it; false once the consumer is gone
fn handle_frame(
    text: &str,
    events: &mpsc::UnboundedSender<RtmEvent>,
    last_ping: &Option<(u64, Instant)>,
) -> bool {
    match RtmEvent::parse(text) {
        Ok(RtmEvent::Pong { reply_to }) => {
            // Pong answers our keep-alive; surface the round trip as a
            // latency report instead of forwarding the raw frame.
            if let Some((id, sent_at)) = last_ping {
                if reply_to == Some(*id) {
                    return events
                        .send(RtmEvent::LatencyReport {
                            latency: sent_at.elapsed(),
                        })
                        .is_ok();
                }
            }
            true
        }
        Ok(event) => events.send(event).is_ok(),
        Err(e) => {
            debug!("Ignoring unparseable RTM frame: {}", e);
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_frame_forwards_parsed_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(handle_frame(
            r#"{"type":"message","channel":"C1","user":"U1","text":"hi"}"#,
            &tx,
            &None,
        ));

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, RtmEvent::Message(_)));
    }

    #[test]
    fn test_handle_frame_turns_matching_pong_into_latency_report() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let last_ping = Some((3, Instant::now()));

        assert!(handle_frame(r#"{"type":"pong","reply_to":3}"#, &tx, &last_ping));

        let event = rx.try_recv().unwrap();
        assert!(matches!(event, RtmEvent::LatencyReport { .. }));
    }

    #[test]
    fn test_handle_frame_drops_stale_pong() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let last_ping = Some((3, Instant::now()));

        assert!(handle_frame(r#"{"type":"pong","reply_to":2}"#, &tx, &last_ping));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_handle_frame_skips_garbage() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        assert!(handle_frame("not json", &tx, &None));
        assert!(rx.try_recv().is_err());
    }
}
