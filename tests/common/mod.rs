#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
// Each test binary uses a different subset of these helpers.
#![allow(dead_code)]
//! Shared test utilities for Steam chat client integration tests.
//!
//! Provides a scripted [`MockTransport`] and helper functions for building
//! the JSON payloads the chat endpoints return.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use steam_chat_client::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
use steam_chat_client::{
    BearerTokenAuthenticator, ChatClient, ChatConfig, ChatEvent, ExecutorConfig,
    ProfileDirectory, RequestExecutor, SteamId,
};

pub const BASE_URL: &str = "http://steam.test";
pub const OWNER_ID: u64 = 76_561_197_960_287_930;
pub const SESSION_ID: &str = "8437289";

// ── MockTransport ───────────────────────────────────────────────────

/// One scripted outcome.
pub type Scripted = Result<HttpResponse, TransportError>;

/// A mock transport with one scripted queue per resource.
///
/// A request is matched to the queue whose resource appears in its URI.
/// Every dispatched request is recorded in `sent`. When a resource's queue is
/// empty (or was never scripted) the request hangs forever, like a long poll
/// with nothing to deliver.
#[derive(Clone, Default)]
pub struct MockTransport {
    scripts: Arc<StdMutex<HashMap<String, VecDeque<Scripted>>>>,
    pub sent: Arc<StdMutex<Vec<HttpRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `outcome` for the next request to `resource`.
    pub fn script(&self, resource: &str, outcome: Scripted) -> &Self {
        self.scripts
            .lock()
            .unwrap()
            .entry(resource.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Queue a `200 OK` with `body` for `resource`.
    pub fn ok(&self, resource: &str, body: impl Into<String>) -> &Self {
        self.script(resource, Ok(HttpResponse::new(200, "OK", body)))
    }

    /// Queue a completed exchange with an arbitrary status.
    pub fn status(&self, resource: &str, status: u16, reason: &str) -> &Self {
        self.script(resource, Ok(HttpResponse::new(status, reason, "")))
    }

    /// Requests sent to `resource`, in order.
    pub fn requests_to(&self, resource: &str) -> Vec<HttpRequest> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.uri.contains(resource))
            .cloned()
            .collect()
    }

    fn next_for(&self, uri: &str) -> Option<Scripted> {
        let mut scripts = self.scripts.lock().unwrap();
        scripts
            .iter_mut()
            .find(|(resource, _)| uri.contains(resource.as_str()))
            .and_then(|(_, queue)| queue.pop_front())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn dispatch(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let next = self.next_for(&request.uri);
        self.sent.lock().unwrap().push(request);
        match next {
            Some(outcome) => outcome,
            // Nothing scripted: hang until the caller gives up or cancels.
            None => std::future::pending().await,
        }
    }
}

/// Value of form field `name` in a recorded request body.
pub fn form_field(request: &HttpRequest, name: &str) -> Option<String> {
    let body = request.body.as_ref()?;
    body.content.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

// ── Directory ───────────────────────────────────────────────────────

/// A directory backed by fixed data, counting profile lookups.
#[derive(Default)]
pub struct StaticDirectory {
    pub friends: Vec<SteamId>,
    pub profiles: Vec<steam_chat_client::protocol::PlayerSummary>,
    pub lookups: StdMutex<Vec<Vec<SteamId>>>,
}

#[async_trait]
impl ProfileDirectory for StaticDirectory {
    async fn friend_list(&self, _owner: SteamId) -> steam_chat_client::error::Result<Vec<SteamId>> {
        Ok(self.friends.clone())
    }

    async fn profiles(
        &self,
        ids: &[SteamId],
    ) -> steam_chat_client::error::Result<Vec<steam_chat_client::protocol::PlayerSummary>> {
        self.lookups.lock().unwrap().push(ids.to_vec());
        Ok(self
            .profiles
            .iter()
            .filter(|p| ids.contains(&p.steamid))
            .cloned()
            .collect())
    }
}

/// Profile snapshot fixture.
pub fn summary(id: SteamId, name: &str) -> steam_chat_client::protocol::PlayerSummary {
    serde_json::from_value(serde_json::json!({
        "steamid": id.to_string(),
        "personaname": name,
        "personastate": 1,
    }))
    .expect("summary fixture")
}

// ── Client helpers ──────────────────────────────────────────────────

/// Build a bearer-token client over `transport`.
pub fn start_client(
    transport: &MockTransport,
    directory: Arc<dyn ProfileDirectory>,
    config: ChatConfig,
) -> (ChatClient, tokio::sync::mpsc::Receiver<ChatEvent>) {
    let executor = RequestExecutor::new(ExecutorConfig::new(BASE_URL), Arc::new(transport.clone()))
        .with_authenticator(BearerTokenAuthenticator::new("test-token"));
    ChatClient::new(Arc::new(executor), directory, config)
}

/// Config with short delays so real-time tests finish quickly.
pub fn fast_config() -> ChatConfig {
    ChatConfig::new()
        .with_poll_delay(std::time::Duration::from_millis(1))
        .with_reconnect_interval(std::time::Duration::from_millis(10))
}

/// Receive the next event, failing the test if none arrives within 5 seconds.
pub async fn next_event(events: &mut tokio::sync::mpsc::Receiver<ChatEvent>) -> ChatEvent {
    tokio::time::timeout(std::time::Duration::from_secs(5), events.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

// ── JSON helper functions ───────────────────────────────────────────

/// Successful logon reply with the given starting cursor.
pub fn logon_json(message: i64) -> String {
    serde_json::json!({
        "steamid": OWNER_ID.to_string(),
        "error": "OK",
        "umqid": SESSION_ID,
        "timestamp": 1000,
        "utc_timestamp": 1_700_000_000,
        "message": message,
        "push": 0,
    })
    .to_string()
}

/// Successful poll reply carrying `messages`.
pub fn poll_json(messagelast: i64, messages: serde_json::Value) -> String {
    serde_json::json!({
        "pollid": 0,
        "messages": messages,
        "messagelast": messagelast,
        "timestamp": 2000,
        "utc_timestamp": 1_700_000_100,
        "messagebase": 0,
        "sectimeout": 20,
        "error": "OK",
    })
    .to_string()
}

/// Poll reply for a wait budget that elapsed without traffic.
pub fn poll_timeout_json() -> String {
    serde_json::json!({ "pollid": 0, "sectimeout": 20, "error": "Timeout" }).to_string()
}

/// Acknowledgement returned by the message and logoff endpoints.
pub fn ack_json() -> String {
    serde_json::json!({ "utc_timestamp": 1_700_000_200, "error": "OK" }).to_string()
}

/// A `saytext` item.
pub fn text_item(from: SteamId, utc_timestamp: i64, text: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "saytext",
        "timestamp": 0,
        "utc_timestamp": utc_timestamp,
        "steamid_from": from.to_string(),
        "text": text,
    })
}

/// A `personastate` item.
pub fn presence_item(
    from: SteamId,
    utc_timestamp: i64,
    persona_state: u8,
    persona_name: &str,
) -> serde_json::Value {
    serde_json::json!({
        "type": "personastate",
        "timestamp": 0,
        "utc_timestamp": utc_timestamp,
        "steamid_from": from.to_string(),
        "status_flags": 1,
        "persona_state": persona_state,
        "persona_name": persona_name,
    })
}

pub fn owner() -> SteamId {
    SteamId::new(OWNER_ID)
}

pub fn friend(n: u32) -> SteamId {
    SteamId::from_account_id(1000 + n)
}
