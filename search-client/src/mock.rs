//! In-process mock of the indexing service for integration tests.
//!
//! Speaks the same HTTP contract as the real service on an ephemeral local
//! port, so tests exercise [`SearchClient`](crate::SearchClient) end to end.
//! Behaviour knobs live in [`MockBehavior`] and can be changed while the
//! server runs.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use crate::wire::TaskStatus;

/// How ingestion tasks progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestMode {
    /// Task is `succeeded` on the first poll
    Immediate,
    /// Task reports `processing` for this many polls, then `succeeded`
    SucceedAfterPolls(u32),
    /// Task stays `processing` forever; documents are still applied
    NeverFinish,
    /// Task ends as `failed`
    Fail,
}

/// Tunable behaviour of the mock.
#[derive(Debug, Clone)]
pub struct MockBehavior {
    pub ingest: IngestMode,
    /// Reported `rawDocumentDbSize` per stored document
    pub bytes_per_document: u64,
    /// Status returned by every search
    pub search_status: u16,
    /// Artificial search latency
    pub search_delay: Duration,
    /// Forces every delete to answer with this status
    pub delete_status: Option<u16>,
    /// Deleting a missing index enqueues a task that fails with
    /// `index_not_found` instead of answering 404
    pub missing_delete_as_task: bool,
    /// Every delete enqueues a task that fails with this code
    pub delete_task_error: Option<&'static str>,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            ingest: IngestMode::Immediate,
            bytes_per_document: 256,
            search_status: 200,
            search_delay: Duration::ZERO,
            delete_status: None,
            missing_delete_as_task: false,
            delete_task_error: None,
        }
    }
}

#[derive(Debug)]
struct MockTask {
    status: TaskStatus,
    polls_left: u32,
    error_code: Option<&'static str>,
}

#[derive(Debug, Default)]
struct MockIndex {
    documents: usize,
}

#[derive(Debug, Default)]
struct MockState {
    indexes: HashMap<String, MockIndex>,
    tasks: HashMap<u64, MockTask>,
    next_task: u64,
    deletes: usize,
    creates: usize,
    submitted_batches: Vec<usize>,
}

impl MockState {
    fn enqueue(&mut self, task: MockTask) -> u64 {
        let uid = self.next_task;
        self.next_task += 1;
        self.tasks.insert(uid, task);
        uid
    }
}

struct Shared {
    state: Mutex<MockState>,
    behavior: Mutex<MockBehavior>,
    searches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl Shared {
    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn behavior(&self) -> MockBehavior {
        self.behavior
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// A running mock service. Shuts down when dropped.
pub struct MockSearchService {
    addr: SocketAddr,
    shared: Arc<Shared>,
    server: JoinHandle<()>,
}

impl MockSearchService {
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(MockBehavior::default()).await
    }

    pub async fn start_with(behavior: MockBehavior) -> std::io::Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(MockState::default()),
            behavior: Mutex::new(behavior),
            searches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        });

        let router = Router::new()
            .route("/indexes", post(create_index))
            .route("/indexes/{name}", delete(delete_index))
            .route("/indexes/{name}/documents", post(add_documents))
            .route("/indexes/{name}/stats", get(index_stats))
            .route("/indexes/{name}/search", post(search))
            .route("/tasks/{uid}", get(task_status))
            .with_state(shared.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("mock search service stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            shared,
            server,
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self
            .shared
            .behavior
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = behavior;
    }

    /// Create an index directly, bypassing HTTP.
    pub fn seed_index(&self, name: &str, documents: usize) {
        self.shared
            .state()
            .indexes
            .insert(name.to_string(), MockIndex { documents });
    }

    pub fn has_index(&self, name: &str) -> bool {
        self.shared.state().indexes.contains_key(name)
    }

    pub fn document_count(&self, name: &str) -> Option<usize> {
        self.shared.state().indexes.get(name).map(|i| i.documents)
    }

    pub fn delete_calls(&self) -> usize {
        self.shared.state().deletes
    }

    pub fn create_calls(&self) -> usize {
        self.shared.state().creates
    }

    /// Sizes of every documents batch received, in arrival order.
    pub fn submitted_batches(&self) -> Vec<usize> {
        self.shared.state().submitted_batches.clone()
    }

    pub fn search_calls(&self) -> usize {
        self.shared.searches.load(Ordering::SeqCst)
    }

    /// Highest number of searches served at the same time.
    pub fn max_concurrent_searches(&self) -> usize {
        self.shared.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for MockSearchService {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn accepted(uid: u64) -> Response {
    (StatusCode::ACCEPTED, Json(json!({ "taskUid": uid, "status": "enqueued" }))).into_response()
}

fn index_not_found(name: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "message": format!("Index `{}` not found.", name),
            "code": "index_not_found",
            "type": "invalid_request",
        })),
    )
        .into_response()
}

fn failed_with(code: &'static str) -> MockTask {
    MockTask {
        status: TaskStatus::Failed,
        polls_left: 0,
        error_code: Some(code),
    }
}

fn finished(status: TaskStatus) -> MockTask {
    MockTask {
        status,
        polls_left: 0,
        error_code: None,
    }
}

async fn create_index(State(shared): State<Arc<Shared>>, Json(body): Json<Value>) -> Response {
    let Some(uid) = body.get("uid").and_then(Value::as_str) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "code": "missing_index_uid" })))
            .into_response();
    };

    let mut state = shared.state();
    state.creates += 1;
    let task = if state.indexes.contains_key(uid) {
        failed_with("index_already_exists")
    } else {
        state.indexes.insert(uid.to_string(), MockIndex::default());
        finished(TaskStatus::Succeeded)
    };
    let task_uid = state.enqueue(task);
    accepted(task_uid)
}

async fn delete_index(State(shared): State<Arc<Shared>>, Path(name): Path<String>) -> Response {
    let behavior = shared.behavior();
    let mut state = shared.state();
    state.deletes += 1;

    if let Some(status) = behavior.delete_status {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "message": "forced failure" }))).into_response();
    }
    if let Some(code) = behavior.delete_task_error {
        let task_uid = state.enqueue(failed_with(code));
        return accepted(task_uid);
    }

    if state.indexes.remove(&name).is_none() {
        if behavior.missing_delete_as_task {
            let task_uid = state.enqueue(failed_with("index_not_found"));
            return accepted(task_uid);
        }
        return index_not_found(&name);
    }
    let task_uid = state.enqueue(finished(TaskStatus::Succeeded));
    accepted(task_uid)
}

async fn add_documents(
    State(shared): State<Arc<Shared>>,
    Path(name): Path<String>,
    Json(documents): Json<Vec<Value>>,
) -> Response {
    let mode = shared.behavior().ingest;
    let mut state = shared.state();
    state.submitted_batches.push(documents.len());

    let task = match mode {
        IngestMode::Immediate => finished(TaskStatus::Succeeded),
        IngestMode::SucceedAfterPolls(n) => MockTask {
            status: TaskStatus::Processing,
            polls_left: n,
            error_code: None,
        },
        IngestMode::NeverFinish => MockTask {
            status: TaskStatus::Processing,
            polls_left: u32::MAX,
            error_code: None,
        },
        IngestMode::Fail => failed_with("invalid_document_id"),
    };

    if mode != IngestMode::Fail {
        state.indexes.entry(name).or_default().documents = documents.len();
    }
    let task_uid = state.enqueue(task);
    accepted(task_uid)
}

async fn task_status(State(shared): State<Arc<Shared>>, Path(uid): Path<u64>) -> Response {
    let mut state = shared.state();
    let Some(task) = state.tasks.get_mut(&uid) else {
        return (StatusCode::NOT_FOUND, Json(json!({ "code": "task_not_found" }))).into_response();
    };

    if task.status == TaskStatus::Processing && task.polls_left != u32::MAX {
        if task.polls_left == 0 {
            task.status = TaskStatus::Succeeded;
        } else {
            task.polls_left -= 1;
        }
    }

    let mut body = json!({ "uid": uid, "status": task.status });
    if let Some(code) = task.error_code {
        body["error"] = json!({ "message": format!("task failed: {}", code), "code": code });
    }
    Json(body).into_response()
}

async fn index_stats(State(shared): State<Arc<Shared>>, Path(name): Path<String>) -> Response {
    let bytes_per_document = shared.behavior().bytes_per_document;
    let state = shared.state();
    match state.indexes.get(&name) {
        Some(index) => Json(json!({
            "numberOfDocuments": index.documents,
            "rawDocumentDbSize": index.documents as u64 * bytes_per_document,
            "isIndexing": false,
        }))
        .into_response(),
        None => index_not_found(&name),
    }
}

async fn search(State(shared): State<Arc<Shared>>, Path(_name): Path<String>) -> Response {
    let behavior = shared.behavior();
    shared.searches.fetch_add(1, Ordering::SeqCst);
    let now = shared.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    shared.max_in_flight.fetch_max(now, Ordering::SeqCst);

    if !behavior.search_delay.is_zero() {
        tokio::time::sleep(behavior.search_delay).await;
    }
    shared.in_flight.fetch_sub(1, Ordering::SeqCst);

    let status =
        StatusCode::from_u16(behavior.search_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "hits": [], "query": "" }))).into_response()
}
