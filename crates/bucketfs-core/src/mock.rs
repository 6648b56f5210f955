//! In-memory doubles for tests.
//!
//! [`MockBackend`] is an object store that speaks the storage API wire
//! protocol, so requests travel through the real [`Gateway`] and
//! [`StorageDrive`] code. The recording types capture what the core pushes
//! to its UI-facing traits.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};
use url::Url;

use crate::actions::{Toolbar, ToolbarAction};
use crate::busy::BusyView;
use crate::config::{API_NAMESPACE, GatewayConfig, endpoints};
use crate::drive::StorageDrive;
use crate::error::GatewayError;
use crate::gateway::Gateway;
use crate::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};
use crate::upload::{OverwritePrompt, UploadCandidate};

/// First timestamp handed out by the backend clock.
const CLOCK_START: u64 = 1_700_000_000;

// =============================================================================
// Mock Backend
// =============================================================================

/// One stored object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub updated: u64,
}

/// How an injected failure is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InjectedFailure {
    /// Non-2xx status with an `{"error": ...}` body
    Status(u16),
    /// 200 with an `{"error": ...}` body
    Payload,
}

struct BackendState {
    buckets: BTreeMap<String, BTreeMap<String, StoredObject>>,
    clock: u64,
    requests: Vec<HttpRequest>,
    unreachable: bool,
    failures: HashMap<String, InjectedFailure>,
    endpoint_failures: HashMap<(String, String), InjectedFailure>,
    latency: HashMap<String, usize>,
    config_error: bool,
    login_required: bool,
    login_succeeds: bool,
}

impl Default for BackendState {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
            clock: CLOCK_START,
            requests: Vec::new(),
            unreachable: false,
            failures: HashMap::new(),
            endpoint_failures: HashMap::new(),
            latency: HashMap::new(),
            config_error: false,
            login_required: false,
            login_succeeds: true,
        }
    }
}

/// In-memory object store behind the [`Transport`] trait.
///
/// Clones share state, so a test can keep a handle for inspection while the
/// drive owns another.
#[derive(Clone, Default)]
pub struct MockBackend {
    state: Rc<RefCell<BackendState>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add an empty bucket.
    pub fn with_bucket(self, name: &str) -> Self {
        self.create_bucket(name);
        self
    }

    /// Builder: add an object (creating the bucket if needed).
    pub fn with_object(self, bucket: &str, key: &str, bytes: &[u8]) -> Self {
        self.put_object(bucket, key, bytes);
        self
    }

    pub fn create_bucket(&self, name: &str) {
        self.state
            .borrow_mut()
            .buckets
            .entry(name.to_string())
            .or_default();
    }

    pub fn put_object(&self, bucket: &str, key: &str, bytes: &[u8]) {
        let mut state = self.state.borrow_mut();
        let updated = state.tick();
        state.buckets.entry(bucket.to_string()).or_default().insert(
            key.to_string(),
            StoredObject {
                bytes: bytes.to_vec(),
                updated,
            },
        );
    }

    /// Bytes of an object, if present.
    pub fn object(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.state
            .borrow()
            .buckets
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|o| o.bytes.clone())
    }

    /// Every key of a bucket, sorted.
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.state
            .borrow()
            .buckets
            .get(bucket)
            .map(|objects| objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Every request received so far.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.state.borrow().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.state.borrow().requests.len()
    }

    /// Number of requests whose URL targets `endpoint`.
    pub fn requests_to(&self, endpoint: &str) -> usize {
        let suffix = format!("/{}/{}", API_NAMESPACE, endpoint);
        self.state
            .borrow()
            .requests
            .iter()
            .filter(|r| {
                let path = r.url.split('?').next().unwrap_or_default();
                path.ends_with(&suffix)
            })
            .count()
    }

    pub fn clear_requests(&self) {
        self.state.borrow_mut().requests.clear();
    }

    /// Refuse every request at the transport level.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.borrow_mut().unreachable = unreachable;
    }

    /// Fail every request whose key (`path`/`prefix`) equals `key`.
    pub fn fail_key(&self, key: &str, failure: InjectedFailure) {
        self.state
            .borrow_mut()
            .failures
            .insert(key.to_string(), failure);
    }

    /// Fail only requests to `endpoint` about `key`.
    pub fn fail_request(&self, endpoint: &str, key: &str, failure: InjectedFailure) {
        self.state
            .borrow_mut()
            .endpoint_failures
            .insert((endpoint.to_string(), key.to_string()), failure);
    }

    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failures.clear();
        state.endpoint_failures.clear();
    }

    /// Delay requests about `key` by `polls` scheduler turns.
    pub fn set_latency(&self, key: &str, polls: usize) {
        self.state.borrow_mut().latency.insert(key.to_string(), polls);
    }

    /// Credential state reported by `credentials`.
    pub fn set_session(&self, config_error: bool, login_required: bool) {
        let mut state = self.state.borrow_mut();
        state.config_error = config_error;
        state.login_required = login_required;
    }

    /// Outcome of the next `login` calls.
    pub fn set_login_result(&self, succeeds: bool) {
        self.state.borrow_mut().login_succeeds = succeeds;
    }

    /// Gateway over this backend with the default configuration.
    pub fn gateway(&self) -> Result<Gateway<Self>, GatewayError> {
        Gateway::new(&GatewayConfig::default(), self.clone())
    }

    /// Drive over this backend with a detached busy controller.
    pub fn drive(&self) -> Result<StorageDrive<Self>, GatewayError> {
        Ok(StorageDrive::new(self.gateway()?))
    }
}

impl Transport for MockBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (unreachable, delay) = {
            let mut state = self.state.borrow_mut();
            state.requests.push(request.clone());
            let key = request_key(&request);
            let delay = key
                .and_then(|k| state.latency.get(&k).copied())
                .unwrap_or(0);
            (state.unreachable, delay)
        };

        for _ in 0..delay {
            YieldNow::default().await;
        }

        if unreachable {
            return Err(TransportError::new("connection refused"));
        }

        let mut state = self.state.borrow_mut();
        Ok(state.handle(&request))
    }
}

impl BackendState {
    fn tick(&mut self) -> u64 {
        let now = self.clock;
        self.clock += 1;
        now
    }

    fn handle(&mut self, request: &HttpRequest) -> HttpResponse {
        let Some(route) = Route::parse(request) else {
            return text(404, "Not Found");
        };

        if let Some(key) = route.key()
            && let Some(failure) = self
                .endpoint_failures
                .get(&(route.endpoint.clone(), key.clone()))
                .or_else(|| self.failures.get(&key))
        {
            let body = json!({ "error": format!("injected failure for {}", key) });
            return match failure {
                InjectedFailure::Status(status) => json_response(*status, body),
                InjectedFailure::Payload => json_response(200, body),
            };
        }

        match (request.method, route.endpoint.as_str()) {
            (Method::Get, endpoints::CREDENTIALS) => json_response(
                200,
                json!({
                    "config_error": u8::from(self.config_error),
                    "login_error": u8::from(self.login_required),
                }),
            ),
            (Method::Post, endpoints::LOGIN) => {
                if self.login_succeeds {
                    self.login_required = false;
                    json_response(200, json!({ "login": "SUCCEEDED" }))
                } else {
                    json_response(200, json!({ "login": "FAILED" }))
                }
            }
            _ if self.login_required => json_response(401, json!({ "error": "login required" })),
            (Method::Get, endpoints::LIST_BUCKETS) => self.list_buckets(&route),
            (Method::Get, endpoints::LIST_FILES) => self.list_files(&route),
            (Method::Post, endpoints::CREATE_FOLDER) => self.create_folder(&route),
            (Method::Post, endpoints::SAVE_FILE) => self.save_file(&route),
            (Method::Get, endpoints::LOAD_FILE) => self.load_file(&route),
            (Method::Post, endpoints::DELETE_FILE) => self.delete_file(&route),
            _ => text(404, "Not Found"),
        }
    }

    fn list_buckets(&self, route: &Route) -> HttpResponse {
        let prefix = route.param("prefix").unwrap_or_default();
        let buckets: Vec<Value> = self
            .buckets
            .iter()
            .filter(|(name, _)| name.starts_with(&prefix))
            .map(|(name, objects)| {
                let updated = objects.values().map(|o| o.updated).max().unwrap_or(CLOCK_START);
                json!({ "name": name, "updated": updated })
            })
            .collect();
        json_response(200, Value::Array(buckets))
    }

    fn list_files(&self, route: &Route) -> HttpResponse {
        let bucket = route.param("bucket").unwrap_or_default();
        let Some(objects) = self.buckets.get(&bucket) else {
            return missing_bucket(&bucket);
        };
        let prefix = route.param("prefix").unwrap_or_default();
        let delimited = route.param("delimiter").is_some_and(|d| d == "/");

        let mut prefixes = BTreeSet::new();
        let mut files = Vec::new();
        for (key, object) in objects.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            match rest.find('/') {
                Some(idx) if delimited => {
                    prefixes.insert(format!("{}{}", prefix, &rest[..=idx]));
                }
                _ => files.push(json!({
                    "name": key,
                    "size": object.bytes.len(),
                    "updated": object.updated,
                })),
            }
        }

        json_response(200, json!({ "prefixes": prefixes, "files": files }))
    }

    fn create_folder(&mut self, route: &Route) -> HttpResponse {
        let bucket = route.param("bucket").unwrap_or_default();
        let path = route.param("path").unwrap_or_default();
        let Some(name) = route.param("folderName").filter(|n| !n.is_empty()) else {
            return json_response(400, json!({ "error": "folderName is required" }));
        };
        let key = if path.is_empty() {
            format!("{}/", name)
        } else {
            format!("{}/{}/", path.trim_end_matches('/'), name)
        };

        let updated = self.tick();
        let Some(objects) = self.buckets.get_mut(&bucket) else {
            return missing_bucket(&bucket);
        };
        objects.entry(key.clone()).or_insert(StoredObject {
            bytes: Vec::new(),
            updated,
        });
        json_response(200, json!({ "name": key }))
    }

    fn save_file(&mut self, route: &Route) -> HttpResponse {
        let bucket = route.param("bucket").unwrap_or_default();
        let key = route.param("path").unwrap_or_default();
        let overwrite = route.flag("overwrite");
        let Ok(bytes) = STANDARD.decode(route.param("contents").unwrap_or_default()) else {
            return json_response(400, json!({ "error": "contents are not valid base64" }));
        };

        let updated = self.tick();
        let Some(objects) = self.buckets.get_mut(&bucket) else {
            return missing_bucket(&bucket);
        };
        if !overwrite && objects.contains_key(&key) {
            return json_response(412, json!({ "error": format!("{} already exists", key) }));
        }
        let size = bytes.len();
        objects.insert(key.clone(), StoredObject { bytes, updated });
        json_response(200, json!({ "name": key, "size": size, "updated": updated }))
    }

    fn load_file(&self, route: &Route) -> HttpResponse {
        let bucket = route.param("bucket").unwrap_or_default();
        let key = route.param("path").unwrap_or_default();
        let Some(objects) = self.buckets.get(&bucket) else {
            return missing_bucket(&bucket);
        };
        match objects.get(&key) {
            Some(object) => text(200, &STANDARD.encode(&object.bytes)),
            None => json_response(404, json!({ "error": format!("No such object: {}", key) })),
        }
    }

    fn delete_file(&mut self, route: &Route) -> HttpResponse {
        let bucket = route.param("bucket").unwrap_or_default();
        let key = route.param("path").unwrap_or_default();
        let Some(objects) = self.buckets.get_mut(&bucket) else {
            return missing_bucket(&bucket);
        };
        match objects.remove(&key) {
            Some(_) => json_response(200, json!({ "message": format!("{} deleted", key), "status": 200 })),
            None => json_response(404, json!({ "error": format!("No such object: {}", key) })),
        }
    }
}

/// Endpoint plus merged query and JSON body parameters.
struct Route {
    endpoint: String,
    params: HashMap<String, Value>,
}

impl Route {
    fn parse(request: &HttpRequest) -> Option<Self> {
        let url = Url::parse(&request.url).ok()?;
        let marker = format!("/{}/", API_NAMESPACE);
        let (_, endpoint) = url.path().split_once(&marker)?;

        let mut params: HashMap<String, Value> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), Value::String(v.into_owned())))
            .collect();
        if let Some(body) = &request.body
            && let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body)
        {
            params.extend(map);
        }

        Some(Self {
            endpoint: endpoint.to_string(),
            params,
        })
    }

    fn param(&self, name: &str) -> Option<String> {
        self.params.get(name).map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn flag(&self, name: &str) -> bool {
        matches!(self.params.get(name), Some(Value::Bool(true)))
            || self.param(name).is_some_and(|v| v == "true")
    }

    /// The object key this request is about.
    fn key(&self) -> Option<String> {
        self.param("path")
            .map(|path| match self.param("folderName") {
                Some(name) if path.is_empty() => format!("{}/", name),
                Some(name) => format!("{}/{}/", path, name),
                None => path,
            })
            .or_else(|| self.param("prefix").filter(|p| !p.is_empty()))
    }
}

fn request_key(request: &HttpRequest) -> Option<String> {
    Route::parse(request).and_then(|route| route.key())
}

fn status_text(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        412 => "Precondition Failed",
        _ => "Internal Server Error",
    }
}

fn json_response(status: u16, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: Some("application/json; charset=UTF-8".to_string()),
        body: body.to_string(),
    }
}

fn text(status: u16, body: &str) -> HttpResponse {
    HttpResponse {
        status,
        status_text: status_text(status).to_string(),
        content_type: Some("text/plain; charset=UTF-8".to_string()),
        body: body.to_string(),
    }
}

fn missing_bucket(bucket: &str) -> HttpResponse {
    json_response(404, json!({ "error": format!("bucket {} not found", bucket) }))
}

/// Yields once to the executor.
#[derive(Default)]
struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

// =============================================================================
// Recording Busy View
// =============================================================================

/// Indicator transitions seen by a [`RecordingBusyView`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusyEvent {
    Show,
    Hide,
}

/// [`BusyView`] that records indicator transitions.
pub struct RecordingBusyView {
    events: RefCell<Vec<BusyEvent>>,
    visible: Cell<bool>,
    interactive: Cell<bool>,
    content_hidden: Cell<bool>,
}

impl Default for RecordingBusyView {
    fn default() -> Self {
        Self {
            events: RefCell::new(Vec::new()),
            visible: Cell::new(false),
            interactive: Cell::new(true),
            content_hidden: Cell::new(false),
        }
    }
}

impl RecordingBusyView {
    pub fn events(&self) -> Vec<BusyEvent> {
        self.events.borrow().clone()
    }

    pub fn indicator_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn content_interactive(&self) -> bool {
        self.interactive.get()
    }
}

impl BusyView for RecordingBusyView {
    fn show_indicator(&self) {
        self.visible.set(true);
        self.events.borrow_mut().push(BusyEvent::Show);
    }

    fn hide_indicator(&self) {
        self.visible.set(false);
        self.events.borrow_mut().push(BusyEvent::Hide);
    }

    fn set_content_interactive(&self, interactive: bool) {
        self.interactive.set(interactive);
    }

    fn is_content_hidden(&self) -> bool {
        self.content_hidden.get()
    }

    fn set_content_hidden(&self, hidden: bool) {
        self.content_hidden.set(hidden);
    }
}

// =============================================================================
// Recording Toolbar
// =============================================================================

/// [`Toolbar`] that records enablement.
#[derive(Default)]
pub struct RecordingToolbar {
    current: RefCell<HashMap<ToolbarAction, bool>>,
    history: RefCell<Vec<(ToolbarAction, bool)>>,
}

impl RecordingToolbar {
    /// Latest enablement pushed for `action`.
    pub fn enabled(&self, action: ToolbarAction) -> Option<bool> {
        self.current.borrow().get(&action).copied()
    }

    pub fn history(&self) -> Vec<(ToolbarAction, bool)> {
        self.history.borrow().clone()
    }
}

impl Toolbar for RecordingToolbar {
    fn set_enabled(&self, action: ToolbarAction, enabled: bool) {
        self.current.borrow_mut().insert(action, enabled);
        self.history.borrow_mut().push((action, enabled));
    }
}

// =============================================================================
// Scripted Prompt
// =============================================================================

/// [`OverwritePrompt`] answering from a script.
///
/// Declines once the script is exhausted.
#[derive(Default)]
pub struct ScriptedPrompt {
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: RefCell::new(answers.into_iter().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    /// Destination keys the prompt was shown for, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }

    /// Queue another answer.
    pub fn push_answer(&self, answer: bool) {
        self.answers.borrow_mut().push_back(answer);
    }
}

impl OverwritePrompt for ScriptedPrompt {
    async fn confirm_overwrite(&self, candidate: &UploadCandidate) -> bool {
        self.asked.borrow_mut().push(candidate.destination_key.clone());
        self.answers.borrow_mut().pop_front().unwrap_or(false)
    }
}
