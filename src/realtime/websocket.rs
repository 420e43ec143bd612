//! WebSocket realtime transport.
//!
//! # Frames
//! ```text
//! server → {"type":"connected","data":{...}}              ignored
//! server → {"type":"event","data":{"events":[..],"channels":[..],"payload":{..}}}
//! server → {"type":"error","data":{"code":..,"message":".."}}   Err item
//! client → {"type":"ping"}                                 every heartbeat interval
//! ```
//!
//! # Design Decisions
//! - Undecodable frames become `Err` items; the stream keeps going
//! - Socket errors and close frames end the stream; resubscription is the caller's job

use std::time::Duration;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

use crate::error::{RemoteConfigError, Result};
use crate::realtime::event::{EventStream, RealtimeEvent, RealtimeTransport};

const HEARTBEAT_FRAME: &str = r#"{"type":"ping"}"#;

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
}

/// Realtime subscription over a WebSocket endpoint.
#[derive(Debug, Clone)]
pub struct WebSocketRealtime {
    endpoint: Url,
    project_id: String,
    heartbeat: Duration,
}

impl WebSocketRealtime {
    pub fn new(endpoint: &str, project_id: impl Into<String>, heartbeat: Duration) -> Result<Self> {
        let endpoint: Url = endpoint.parse().map_err(|e| {
            RemoteConfigError::Configuration(format!("Invalid realtime endpoint '{}': {}", endpoint, e))
        })?;
        Ok(Self {
            endpoint,
            project_id: project_id.into(),
            heartbeat,
        })
    }

    fn subscribe_url(&self, channel: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("project", &self.project_id)
            .append_pair("channels[]", channel);
        url
    }
}

/// Aborts the heartbeat task once the event stream is dropped.
struct Heartbeat(JoinHandle<()>);

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Decode one text frame. `None` for frames that carry no event.
pub(crate) fn decode_frame(text: &str) -> Option<Result<RealtimeEvent>> {
    let envelope: Envelope = match serde_json::from_str(text) {
        Ok(envelope) => envelope,
        Err(e) => {
            return Some(Err(RemoteConfigError::Transport(format!(
                "Undecodable realtime frame: {}",
                e
            ))))
        }
    };

    match envelope.kind.as_str() {
        "event" => Some(serde_json::from_value::<RealtimeEvent>(envelope.data).map_err(|e| {
            RemoteConfigError::Transport(format!("Malformed realtime event: {}", e))
        })),
        "error" => {
            let message = envelope
                .data
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown realtime error")
                .to_string();
            Some(Err(RemoteConfigError::Transport(message)))
        }
        _ => None,
    }
}

#[async_trait]
impl RealtimeTransport for WebSocketRealtime {
    async fn subscribe(&self, channel: &str) -> Result<EventStream> {
        let url = self.subscribe_url(channel);
        let (socket, _) = connect_async(url.as_str()).await?;
        tracing::info!(channel = %channel, "Realtime channel connected");

        let (mut sink, source) = socket.split();
        let period = self.heartbeat.max(Duration::from_millis(100));
        let heartbeat = Heartbeat(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if sink.send(Message::text(HEARTBEAT_FRAME)).await.is_err() {
                    break;
                }
            }
        }));

        let stream = futures_util::stream::unfold((source, heartbeat), |(mut source, heartbeat)| async move {
            loop {
                match source.next().await? {
                    Ok(Message::Text(text)) => {
                        if let Some(item) = decode_frame(text.as_str()) {
                            return Some((item, (source, heartbeat)));
                        }
                    }
                    Ok(Message::Close(frame)) => {
                        tracing::info!(?frame, "Realtime channel closed by server");
                        return None;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Realtime socket error");
                        return None;
                    }
                }
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscribe_url() {
        let transport = WebSocketRealtime::new(
            "wss://cloud.example.com/v1/realtime",
            "proj",
            Duration::from_secs(20),
        )
        .unwrap();
        let url = transport.subscribe_url("databases.rc.collections.release.documents");
        let pairs: Vec<(String, String)> = url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect();
        assert_eq!(pairs[0], ("project".to_string(), "proj".to_string()));
        assert_eq!(
            pairs[1],
            ("channels[]".to_string(), "databases.rc.collections.release.documents".to_string())
        );
    }

    #[test]
    fn test_decode_event_frame() {
        let frame = r#"{"type":"event","data":{
            "events":["databases.rc.collections.release.documents.d1.update"],
            "channels":["databases.rc.collections.release.documents"],
            "timestamp":"2024-01-01T00:00:00Z",
            "payload":{"$id":"d1","key":"theme","value":"dark"}}}"#;
        let event = decode_frame(frame).unwrap().unwrap();
        assert!(!event.is_delete());
        assert_eq!(event.payload["key"], "theme");
    }

    #[test]
    fn test_decode_non_event_frames() {
        assert!(decode_frame(r#"{"type":"connected","data":{"channels":[]}}"#).is_none());
        assert!(decode_frame(r#"{"type":"pong"}"#).is_none());

        let err = decode_frame(r#"{"type":"error","data":{"code":1008,"message":"Missing channels"}}"#)
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().contains("Missing channels"));

        assert!(decode_frame("not json").unwrap().is_err());
        assert!(decode_frame(r#"{"type":"event","data":{"events":"nope"}}"#).unwrap().is_err());
    }
}
