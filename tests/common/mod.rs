//! Shared fakes for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use remote_config::cache::{Clock, FileStore, LocalFileStore, MemoryPreferences};
use remote_config::error::{PersistenceError, RemoteConfigError, Result};
use remote_config::realtime::{EventStream, RealtimeEvent, RealtimeTransport};
use remote_config::remote::{CollectionScope, Document, DocumentTransport};
use remote_config::{LocalPersistence, RemoteConfig, Snapshot};
use serde_json::{json, Map, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, Notify};

pub const HOUR_MS: i64 = 60 * 60 * 1000;

pub fn doc(id: &str, key: &str, value: &str) -> Document {
    let fields = json!({ "$id": id, "key": key, "value": value });
    Document::new(id, fields.as_object().cloned().unwrap_or_default())
}

pub fn numbered_docs(n: usize) -> Vec<Document> {
    (0..n)
        .map(|i| doc(&format!("doc_{i:03}"), &format!("key_{i}"), &i.to_string()))
        .collect()
}

pub fn snapshot(pairs: &[(&str, &str)]) -> Snapshot {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

fn payload(pairs: &[(&str, &str)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
        .collect()
}

pub fn upsert_event(key: &str, value: &str) -> RealtimeEvent {
    RealtimeEvent::new(
        vec![format!("databases.remote_config.collections.release.documents.{key}.update")],
        payload(&[("$id", key), ("key", key), ("value", value)]),
    )
}

pub fn delete_event(key: &str) -> RealtimeEvent {
    RealtimeEvent::new(
        vec![
            "databases.*.collections.*.documents.*".to_string(),
            format!("databases.remote_config.collections.release.documents.{key}.delete"),
        ],
        payload(&[("$id", key), ("key", key), ("value", "ignored")]),
    )
}

/// Document transport over an in-memory list, with cursor-after paging.
#[derive(Default)]
pub struct ScriptedDocuments {
    documents: Mutex<Vec<Document>>,
    requests: Mutex<Vec<Option<String>>>,
    failing: AtomicBool,
    hold: Mutex<Option<Arc<Notify>>>,
}

impl ScriptedDocuments {
    pub fn new(documents: Vec<Document>) -> Arc<Self> {
        let transport = Self::default();
        *transport.documents.lock().unwrap() = documents;
        Arc::new(transport)
    }

    pub fn set_documents(&self, documents: Vec<Document>) {
        *self.documents.lock().unwrap() = documents;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Park every `list` call until the returned notify is signalled.
    pub fn hold_requests(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl DocumentTransport for ScriptedDocuments {
    async fn list(
        &self,
        _scope: &CollectionScope,
        limit: usize,
        after: Option<&str>,
    ) -> Result<Vec<Document>> {
        self.requests.lock().unwrap().push(after.map(String::from));

        let hold = self.hold.lock().unwrap().take();
        if let Some(notify) = hold {
            notify.notified().await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteConfigError::Transport("connection refused".to_string()));
        }

        let documents = self.documents.lock().unwrap();
        let start = match after {
            Some(id) => documents.iter().position(|d| d.id == id).map(|i| i + 1).unwrap_or(0),
            None => 0,
        };
        Ok(documents.iter().skip(start).take(limit).cloned().collect())
    }
}

/// Realtime transport that hands out one queued channel per subscription.
#[derive(Default)]
pub struct ChannelRealtime {
    pending: Mutex<VecDeque<mpsc::UnboundedReceiver<Result<RealtimeEvent>>>>,
    subscriptions: AtomicUsize,
}

impl ChannelRealtime {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a subscription and return its sending side.
    pub fn queue_subscription(&self) -> mpsc::UnboundedSender<Result<RealtimeEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RealtimeTransport for ChannelRealtime {
    async fn subscribe(&self, _channel: &str) -> Result<EventStream> {
        self.subscriptions.fetch_add(1, Ordering::SeqCst);
        let rx = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| RemoteConfigError::Transport("no subscription queued".to_string()))?;

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}

/// Clock the test moves by hand.
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now_ms: i64) -> Arc<Self> {
        Arc::new(Self(AtomicI64::new(now_ms)))
    }

    pub fn set(&self, now_ms: i64) {
        self.0.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: i64) {
        self.0.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Local file store whose writes can be switched to fail.
#[derive(Default)]
pub struct FlakyFileStore {
    inner: LocalFileStore,
    fail_writes: AtomicBool,
}

impl FlakyFileStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileStore for FlakyFileStore {
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> std::result::Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            let err = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
            return Err(PersistenceError::io(path.display(), err));
        }
        self.inner.write_atomic(path, bytes).await
    }

    async fn read_all(&self, path: &Path) -> Option<Vec<u8>> {
        self.inner.read_all(path).await
    }
}

pub fn persistence_in(dir: &Path, files: Arc<dyn FileStore>) -> LocalPersistence {
    LocalPersistence::new(
        dir.join("remote_config.json"),
        files,
        Arc::new(MemoryPreferences::new()),
    )
}

/// Engine over the given fakes with the default 24 hour TTL.
pub fn build_engine(
    documents: Arc<ScriptedDocuments>,
    persistence: LocalPersistence,
    clock: Arc<ManualClock>,
    defaults: Snapshot,
) -> Arc<RemoteConfig> {
    Arc::new(
        RemoteConfig::builder()
            .document_transport(documents)
            .persistence(persistence)
            .clock(clock)
            .defaults(defaults)
            .build()
            .expect("engine should build"),
    )
}

/// Requests seen by the mock document API.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub queries: Vec<String>,
    pub project: Option<String>,
}

/// Start a minimal document-list API on an ephemeral port.
/// Responds with `status` when it is not 200.
pub async fn start_document_api(
    documents: Vec<Document>,
    status: u16,
) -> (SocketAddr, Arc<Mutex<Vec<RecordedRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let recorded = Arc::new(Mutex::new(Vec::new()));
    let documents = Arc::new(documents);

    let log = recorded.clone();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let documents = documents.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let mut chunk = [0u8; 4096];
                while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => buf.extend_from_slice(&chunk[..n]),
                    }
                }
                let head = String::from_utf8_lossy(&buf).to_string();
                let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                let project = head
                    .lines()
                    .find_map(|l| {
                        let (name, value) = l.split_once(':')?;
                        name.eq_ignore_ascii_case("x-appwrite-project").then(|| value.trim().to_string())
                    });

                let url = url::Url::parse(&format!("http://mock{}", target)).unwrap();
                let queries: Vec<String> = url
                    .query_pairs()
                    .filter(|(k, _)| k == "queries[]")
                    .map(|(_, v)| v.into_owned())
                    .collect();
                log.lock().unwrap().push(RecordedRequest {
                    path: url.path().to_string(),
                    queries: queries.clone(),
                    project,
                });

                let (status_line, body) = if status == 200 {
                    let mut limit = 25usize;
                    let mut after: Option<String> = None;
                    for q in &queries {
                        let q: Value = serde_json::from_str(q).unwrap_or(Value::Null);
                        match q["method"].as_str() {
                            Some("limit") => limit = q["values"][0].as_u64().unwrap_or(25) as usize,
                            Some("cursorAfter") => after = q["values"][0].as_str().map(String::from),
                            _ => {}
                        }
                    }
                    let start = after
                        .and_then(|id| documents.iter().position(|d| d.id == id).map(|i| i + 1))
                        .unwrap_or(0);
                    let page: Vec<Value> = documents
                        .iter()
                        .skip(start)
                        .take(limit)
                        .map(|d| Value::Object(d.fields.clone()))
                        .collect();
                    let body = json!({ "total": documents.len(), "documents": page }).to_string();
                    ("200 OK".to_string(), body)
                } else {
                    (format!("{} Error", status), r#"{"message":"unavailable"}"#.to_string())
                };

                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status_line,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, recorded)
}
