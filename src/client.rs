//! Async long-poll chat client.
//!
//! [`ChatClient`] is a handle over one logical chat connection. After
//! [`log_on`](ChatClient::log_on) completes the handshake it spawns a single
//! background connection task that runs the poll cycle, hands every batch to
//! the demultiplexer and supervises reconnects. Events are emitted on a
//! bounded channel ([`tokio::sync::mpsc::Receiver<ChatEvent>`]) returned from
//! [`ChatClient::new`].
//!
//! # Example
//!
//! ```rust,ignore
//! let executor = Arc::new(
//!     RequestExecutor::new(ExecutorConfig::new("https://api.steampowered.com"), transport)
//!         .with_authenticator(BearerTokenAuthenticator::new(token)),
//! );
//! let directory = Arc::new(WebApiDirectory::new(Arc::clone(&executor)));
//! let (mut client, mut events) = ChatClient::new(executor, directory, ChatConfig::new());
//!
//! client.log_on().await?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         ChatEvent::MessagesReceived { messages, .. } => { /* … */ }
//!         ChatEvent::Disconnected { manual: true, .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use tokio::sync::{mpsc, watch, Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::auth::AuthKind;
use crate::demux;
use crate::directory::ProfileDirectory;
use crate::error::{RequestError, Result, SteamError};
use crate::event::{ChatEvent, ConnectionState};
use crate::executor::RequestExecutor;
use crate::protocol::{
    AckResponse, LogonResponse, OutgoingKind, PollResponse, PollStatus, LOGOFF_RESOURCE,
    LOGON_RESOURCE, MESSAGE_RESOURCE, POLL_RESOURCE, STATUS_NOT_LOGGED_ON, STATUS_OK,
};
use crate::request::Request;
use crate::response::Response;
use crate::roster::FriendRoster;
use crate::steam_id::SteamId;

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

const DEFAULT_POLL_WAIT: Duration = Duration::from_secs(20);
const MIN_POLL_WAIT: Duration = Duration::from_secs(1);
const MAX_POLL_WAIT: Duration = Duration::from_secs(30);

/// Margin between the server wait budget and the client-side poll timeout.
const POLL_TIMEOUT_MARGIN: Duration = Duration::from_secs(5);

const DEFAULT_POLL_DELAY: Duration = Duration::from_millis(500);
const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(10);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`ChatClient`].
///
/// # Example
///
/// ```
/// use steam_chat_client::client::ChatConfig;
/// use std::time::Duration;
///
/// let config = ChatConfig::new()
///     .with_poll_wait(Duration::from_secs(60))
///     .with_auto_reconnect(false);
/// assert_eq!(config.poll_wait, Duration::from_secs(30));
/// assert_eq!(config.poll_timeout(), Duration::from_secs(35));
/// ```
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// UI mode announced during the handshake. Defaults to `"web"`.
    pub ui_mode: String,
    /// How long the server may hold a poll open.
    ///
    /// Defaults to **20 seconds**, clamped to 1..=30 seconds.
    pub poll_wait: Duration,
    /// Pause between two polls. Defaults to **500 ms**.
    pub poll_delay: Duration,
    /// Reconnect after an unexpected disconnect. Defaults to `true`.
    pub auto_reconnect: bool,
    /// Wait before each reconnect attempt. Defaults to **10 seconds**.
    pub reconnect_interval: Duration,
    /// Capacity of the bounded event channel.
    ///
    /// `MessagesReceived`, `PresenceChanged` and `Disconnected` wait for room,
    /// so a slow consumer pauses the poll cycle instead of losing messages.
    /// `StateChanged` is dropped (with a warning logged) when the channel is
    /// full. If [`ChatClient::disconnect`] has to abort a connection task
    /// stuck on a full channel, its final `Disconnected` is sent only if
    /// there is room by then.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// How long [`ChatClient::disconnect`] waits for the connection task
    /// before aborting it. Defaults to **1 second**.
    pub shutdown_timeout: Duration,
}

impl ChatConfig {
    pub fn new() -> Self {
        Self {
            ui_mode: "web".to_string(),
            poll_wait: DEFAULT_POLL_WAIT,
            poll_delay: DEFAULT_POLL_DELAY,
            auto_reconnect: true,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_ui_mode(mut self, ui_mode: impl Into<String>) -> Self {
        self.ui_mode = ui_mode.into();
        self
    }

    /// Defaults to **20 seconds**, clamped to 1..=30 seconds.
    #[must_use]
    pub fn with_poll_wait(mut self, wait: Duration) -> Self {
        self.poll_wait = wait.clamp(MIN_POLL_WAIT, MAX_POLL_WAIT);
        self
    }

    #[must_use]
    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    #[must_use]
    pub fn with_auto_reconnect(mut self, enabled: bool) -> Self {
        self.auto_reconnect = enabled;
        self
    }

    #[must_use]
    pub fn with_reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Defaults to **256**. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Client-side timeout of a poll request: always longer than the server wait.
    pub fn poll_timeout(&self) -> Duration {
        self.poll_wait.saturating_add(POLL_TIMEOUT_MARGIN)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

// ── Session ─────────────────────────────────────────────────────────

/// Server handle for one logical long-poll connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSession {
    pub session_id: String,
    pub owner_id: SteamId,
    /// Sequence cursor sent with the next poll. Only the connection task moves it.
    pub last_message_seq: i64,
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    fn from_logon(logon: LogonResponse) -> Self {
        Self {
            session_id: logon.umqid,
            owner_id: logon.steamid,
            last_message_seq: logon.message,
            created_at: Utc::now(),
        }
    }
}

// ── Shared state ────────────────────────────────────────────────────

/// State shared between the client handle and the connection task.
struct Shared {
    state_tx: watch::Sender<ConnectionState>,
    session: Mutex<Option<ChatSession>>,
    roster: RwLock<FriendRoster>,
    manual: AtomicBool,
    event_tx: mpsc::Sender<ChatEvent>,
}

impl Shared {
    fn state(&self) -> ConnectionState {
        *self.state_tx.borrow()
    }

    /// Move to `next`, emitting `StateChanged` only on an actual change.
    fn set_state(&self, next: ConnectionState) {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                false
            } else {
                *current = next;
                true
            }
        });
        if changed {
            debug!(state = %next, "connection state changed");
            emit_event(&self.event_tx, ChatEvent::StateChanged(next));
        }
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Handle over one logical chat connection.
///
/// The chat protocol needs a bearer token: the executor passed to
/// [`ChatClient::new`] must carry a
/// [`BearerTokenAuthenticator`](crate::auth::BearerTokenAuthenticator).
pub struct ChatClient {
    executor: Arc<RequestExecutor>,
    directory: Arc<dyn ProfileDirectory>,
    config: ChatConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl ChatClient {
    /// Create a disconnected client and the receiver for its events.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn new(
        executor: Arc<RequestExecutor>,
        directory: Arc<dyn ProfileDirectory>,
        config: ChatConfig,
    ) -> (Self, mpsc::Receiver<ChatEvent>) {
        // Clamp capacity to at least 1 (tokio panics on 0).
        let (event_tx, event_rx) = mpsc::channel(config.event_channel_capacity.max(1));
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        let shared = Arc::new(Shared {
            state_tx,
            session: Mutex::new(None),
            roster: RwLock::new(FriendRoster::new()),
            manual: AtomicBool::new(false),
            event_tx,
        });

        let client = Self {
            executor,
            directory,
            config,
            shared,
            cancel: CancellationToken::new(),
            task: None,
        };
        (client, event_rx)
    }

    /// Perform the handshake, seed the roster and start polling.
    ///
    /// Returns once the session exists; the first successful poll moves the
    /// connection from `Connecting` to `Connected`.
    ///
    /// # Errors
    ///
    /// - [`SteamError::MissingCredentials`] if the executor carries no bearer token.
    /// - [`SteamError::AlreadyConnected`] if a connection task is still running.
    /// - [`SteamError::Authentication`] if the server rejects the token.
    /// - [`SteamError::Request`] for any other handshake failure.
    pub async fn log_on(&mut self) -> Result<ChatSession> {
        if self.executor.auth_kind() != Some(AuthKind::BearerToken) {
            return Err(SteamError::MissingCredentials(AuthKind::BearerToken));
        }
        if self.task.as_ref().is_some_and(|task| !task.is_finished()) {
            return Err(SteamError::AlreadyConnected);
        }
        self.task = None;
        self.cancel = CancellationToken::new();
        self.shared.manual.store(false, Ordering::Release);
        self.shared.set_state(ConnectionState::Connecting);

        let session = match handshake(&self.executor, &self.config).await {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "chat logon failed");
                self.shared.set_state(ConnectionState::Disconnected);
                return Err(e);
            }
        };
        info!(session_id = %session.session_id, owner = %session.owner_id, "chat session established");

        let roster = seed_roster(self.directory.as_ref(), session.owner_id).await;
        *self.shared.roster.write().await = roster;
        *self.shared.session.lock().await = Some(session.clone());

        let connection = Connection {
            executor: Arc::clone(&self.executor),
            directory: Arc::clone(&self.directory),
            config: self.config.clone(),
            shared: Arc::clone(&self.shared),
            cancel: self.cancel.clone(),
        };
        self.task = Some(tokio::spawn(connection.run()));

        Ok(session)
    }

    /// Send a chat message to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`SteamError::NotConnected`] without a session, or the
    /// structured request error if the server rejects the message.
    pub async fn send_message(&self, to: SteamId, text: impl Into<String>) -> Result<()> {
        self.send(to, OutgoingKind::SayText, Some(text.into())).await
    }

    /// Tell `to` that the user is typing.
    ///
    /// # Errors
    ///
    /// Same as [`send_message`](Self::send_message).
    pub async fn send_typing(&self, to: SteamId) -> Result<()> {
        self.send(to, OutgoingKind::Typing, None).await
    }

    /// End the connection.
    ///
    /// Cancels the in-flight poll, the inter-poll delay and any pending
    /// reconnect, then sends a best-effort logoff. No automatic reconnect
    /// follows a manual disconnect.
    pub async fn disconnect(&mut self) {
        debug!("ChatClient: disconnect requested");
        self.shared.manual.store(true, Ordering::Release);
        self.cancel.cancel();

        // Await the connection task with a timeout. If it doesn't exit in
        // time, abort it so it cannot outlive the disconnect.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.config.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("connection task terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("connection task did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("connection task aborted: {join_err}");
                    }
                    // The task never got its Disconnected out; the consumer is
                    // not reading, so waiting for room could block forever.
                    self.shared.set_state(ConnectionState::Disconnected);
                    emit_event(
                        &self.shared.event_tx,
                        ChatEvent::Disconnected {
                            reason: Some("disconnected by client".into()),
                            manual: true,
                        },
                    );
                }
            }
        }

        let session = self.shared.session.lock().await.take();
        if let Some(session) = session {
            let mut request =
                Request::post(LOGOFF_RESOURCE).with_param("umqid", session.session_id.as_str());
            match call::<AckResponse>(&self.executor, &mut request, |ack| &ack.error).await {
                Ok(_) => debug!(session_id = %session.session_id, "logged off"),
                Err(e) => debug!(error = %e, "logoff failed; ignoring"),
            }
        }

        self.shared.set_state(ConnectionState::Disconnected);
    }

    // ── State accessors ─────────────────────────────────────────────

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn state(&self) -> ConnectionState {
        self.shared.state()
    }

    /// Watch the connection state. The receiver sees the latest value only.
    pub fn subscribe_state(&self) -> watch::Receiver<ConnectionState> {
        self.shared.state_tx.subscribe()
    }

    /// Snapshot of the current session, if logged on.
    pub async fn session(&self) -> Option<ChatSession> {
        self.shared.session.lock().await.clone()
    }

    /// Snapshot of the friend roster.
    pub async fn roster(&self) -> FriendRoster {
        self.shared.roster.read().await.clone()
    }

    // ── Internal helpers ────────────────────────────────────────────

    async fn send(&self, to: SteamId, kind: OutgoingKind, text: Option<String>) -> Result<()> {
        let session_id = match self.shared.session.lock().await.as_ref() {
            Some(session) => session.session_id.clone(),
            None => return Err(SteamError::NotConnected),
        };

        let mut request = Request::post(MESSAGE_RESOURCE)
            .with_param("umqid", session_id)
            .with_param("type", kind.as_str())
            .with_param("steamid_dst", to.to_string());
        if let Some(text) = text {
            request = request.with_param("text", text);
        }

        call::<AckResponse>(&self.executor, &mut request, |ack| &ack.error).await?;
        debug!(to = %to, kind = kind.as_str(), "chat message sent");
        Ok(())
    }
}

impl std::fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatClient")
            .field("state", &self.state())
            .field("has_task", &self.task.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl Drop for ChatClient {
    fn drop(&mut self) {
        // Nothing can be awaited here; stop the connection task outright.
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Connection task ─────────────────────────────────────────────────

/// Why a poll cycle stopped.
#[derive(Debug)]
enum CycleExit {
    /// The connection's token was cancelled.
    Cancelled,
    /// Credentials were rejected. Never retried.
    Fatal(SteamError),
    /// Transient failure; eligible for reconnect.
    Ended(String),
}

/// Everything the background task needs. Owned by the task.
struct Connection {
    executor: Arc<RequestExecutor>,
    directory: Arc<dyn ProfileDirectory>,
    config: ChatConfig,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

impl Connection {
    /// Poll until cancelled or fatally rejected, reconnecting in between when
    /// allowed. Only this task ever runs a poll cycle for the connection.
    async fn run(self) {
        debug!("connection task started");
        let mut needs_handshake = false;

        loop {
            if needs_handshake {
                self.shared.set_state(ConnectionState::Connecting);
                let outcome = tokio::select! {
                    biased;
                    () = self.cancel.cancelled() => {
                        self.finish_cancelled().await;
                        return;
                    }
                    outcome = handshake(&self.executor, &self.config) => outcome,
                };
                match outcome {
                    Ok(session) => {
                        info!(session_id = %session.session_id, "chat session re-established");
                        *self.shared.session.lock().await = Some(session);
                    }
                    Err(e) if e.is_unauthorized() => {
                        self.finish_fatal(e).await;
                        return;
                    }
                    Err(e) => {
                        warn!(error = %e, "reconnect handshake failed");
                        self.shared.set_state(ConnectionState::Disconnected);
                        emit_disconnected(&self.shared.event_tx, Some(e.to_string()), false).await;
                        if !self.backoff().await {
                            return;
                        }
                        continue;
                    }
                }
            }

            let exit = tokio::select! {
                biased;
                () = self.cancel.cancelled() => CycleExit::Cancelled,
                exit = self.poll_cycle() => exit,
            };

            match exit {
                CycleExit::Cancelled => {
                    self.finish_cancelled().await;
                    return;
                }
                CycleExit::Fatal(e) => {
                    self.finish_fatal(e).await;
                    return;
                }
                CycleExit::Ended(reason) => {
                    // The server no longer knows this session; a reconnect gets a new one.
                    self.shared.session.lock().await.take();
                    self.shared.set_state(ConnectionState::Disconnected);
                    emit_disconnected(&self.shared.event_tx, Some(reason), false).await;
                    if !self.backoff().await {
                        return;
                    }
                    needs_handshake = true;
                }
            }
        }
    }

    /// Wait out the reconnect interval. `false` means do not reconnect.
    async fn backoff(&self) -> bool {
        if !self.config.auto_reconnect || self.shared.manual.load(Ordering::Acquire) {
            debug!("auto-reconnect disabled; connection task exiting");
            return false;
        }
        info!(
            backoff_ms = self.config.reconnect_interval.as_millis() as u64,
            "scheduling reconnect"
        );
        tokio::select! {
            biased;
            () = self.cancel.cancelled() => {
                debug!("reconnect cancelled");
                false
            }
            () = tokio::time::sleep(self.config.reconnect_interval) => {
                !self.shared.manual.load(Ordering::Acquire)
            }
        }
    }

    async fn finish_cancelled(&self) {
        debug!("poll cycle cancelled");
        self.shared.set_state(ConnectionState::Disconnected);
        emit_disconnected(
            &self.shared.event_tx,
            Some("disconnected by client".into()),
            true,
        )
        .await;
    }

    async fn finish_fatal(&self, err: SteamError) {
        error!(error = %err, "chat credentials rejected; not reconnecting");
        self.shared.session.lock().await.take();
        self.shared.set_state(ConnectionState::Disconnected);
        emit_disconnected(&self.shared.event_tx, Some(err.to_string()), false).await;
    }

    /// Issue polls back to back until one fails. Dropping the future cancels
    /// the in-flight poll and the inter-poll delay.
    async fn poll_cycle(&self) -> CycleExit {
        loop {
            let (session_id, owner, seq) = match self.shared.session.lock().await.as_ref() {
                Some(s) => (s.session_id.clone(), s.owner_id, s.last_message_seq),
                None => return CycleExit::Ended("no active session".into()),
            };

            let mut request = Request::post(POLL_RESOURCE)
                .with_param("umqid", session_id.as_str())
                .with_param("message", seq)
                .with_param("sectimeout", self.config.poll_wait.as_secs())
                .with_timeout(self.config.poll_timeout());

            let (raw, response) = match fetch::<PollResponse>(&self.executor, &mut request).await {
                Ok(decoded) => decoded,
                Err(e) => return classify_failure(e),
            };

            let result = raw.into_poll_result(seq);
            if let PollStatus::ErrorText(text) = &result.status {
                if text == STATUS_NOT_LOGGED_ON {
                    return classify_failure(
                        RequestError::authentication(response, "chat session is not logged on").into(),
                    );
                }
                warn!(session_id = %session_id, status = %text, "poll reported an error");
                return CycleExit::Ended(format!("poll failed: {text}"));
            }

            if self.shared.state() != ConnectionState::Connected {
                self.shared.set_state(ConnectionState::Connected);
            }
            let next_seq = result.last_message_seq;
            debug!(
                seq = next_seq,
                items = result.raw_messages.len(),
                timed_out = result.status == PollStatus::Timeout,
                "poll completed"
            );

            if !result.raw_messages.is_empty() {
                self.dispatch(result, owner).await;
            }

            // Only move the cursor once the batch is in the channel.
            if let Some(session) = self.shared.session.lock().await.as_mut() {
                session.last_message_seq = next_seq;
            }

            tokio::time::sleep(self.config.poll_delay).await;
        }
    }

    async fn dispatch(&self, result: crate::protocol::PollResult, owner: SteamId) {
        let batch = {
            let mut roster = self.shared.roster.write().await;
            demux::demultiplex(result, owner, &mut roster)
        };

        let profiles = demux::backfill(self.directory.as_ref(), &batch.new_senders).await;
        if !profiles.is_empty() {
            self.shared.roster.write().await.seed(profiles);
        }

        for event in batch.into_events() {
            if self.shared.event_tx.send(event).await.is_err() {
                debug!("event channel closed, receiver dropped");
            }
        }
    }
}

/// Apply the chat-loop failure policy to a failed poll.
fn classify_failure(err: SteamError) -> CycleExit {
    if err.is_unauthorized() {
        CycleExit::Fatal(err)
    } else if err.is_not_found() {
        debug!(error = %err, "chat session not found; ending poll cycle");
        CycleExit::Ended(err.to_string())
    } else {
        warn!(error = %err, "poll failed; ending poll cycle");
        CycleExit::Ended(err.to_string())
    }
}

// ── Protocol calls ──────────────────────────────────────────────────

async fn handshake(executor: &RequestExecutor, config: &ChatConfig) -> Result<ChatSession> {
    let mut request = Request::post(LOGON_RESOURCE).with_param("ui_mode", config.ui_mode.as_str());
    let logon = call::<LogonResponse>(executor, &mut request, |logon| &logon.error).await?;
    Ok(ChatSession::from_logon(logon))
}

/// Friends and their profiles. Best-effort: failures leave the roster partial.
async fn seed_roster(directory: &dyn ProfileDirectory, owner: SteamId) -> FriendRoster {
    let mut roster = FriendRoster::new();
    let friends = match directory.friend_list(owner).await {
        Ok(friends) => friends,
        Err(e) => {
            warn!(error = %e, "friend list lookup failed; starting with an empty roster");
            return roster;
        }
    };
    roster.seed(demux::backfill(directory, &friends).await);
    debug!(friends = friends.len(), known = roster.len(), "roster seeded");
    roster
}

/// Execute `request`, require a successful status and decode the body.
async fn fetch<T: DeserializeOwned>(
    executor: &RequestExecutor,
    request: &mut Request,
) -> Result<(T, Response)> {
    let response = executor.execute_checked(request).await?;
    match serde_json::from_str(&response.content) {
        Ok(payload) => Ok((payload, response)),
        Err(e) => Err(RequestError::deserialization(response, e).into()),
    }
}

/// [`fetch`] plus a check of the payload's status token.
async fn call<T: DeserializeOwned>(
    executor: &RequestExecutor,
    request: &mut Request,
    status: fn(&T) -> &String,
) -> Result<T> {
    let (payload, response) = fetch::<T>(executor, request).await?;
    let token = status(&payload).clone();
    match token.as_str() {
        STATUS_OK => Ok(payload),
        STATUS_NOT_LOGGED_ON => {
            Err(RequestError::authentication(response, "chat session is not logged on").into())
        }
        other => {
            let message = format!("server reported {other:?}");
            Err(RequestError::rejected(response, message).into())
        }
    }
}

// ── Event emission ──────────────────────────────────────────────────

/// Emit a state event. If the channel is full, log a warning and drop it to
/// avoid blocking the poll cycle.
fn emit_event(event_tx: &mpsc::Sender<ChatEvent>, event: ChatEvent) {
    match event_tx.try_send(event) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(dropped)) => {
            warn!(
                "event channel full, dropping event: {:?}",
                std::mem::discriminant(&dropped)
            );
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("event channel closed, receiver dropped");
        }
    }
}

/// Emit a [`Disconnected`](ChatEvent::Disconnected) event.
///
/// Uses `send().await` instead of `try_send` so it is never silently dropped.
async fn emit_disconnected(
    event_tx: &mpsc::Sender<ChatEvent>,
    reason: Option<String>,
    manual: bool,
) {
    let event = ChatEvent::Disconnected { reason, manual };
    if event_tx.send(event).await.is_err() {
        debug!("event channel closed, receiver dropped");
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::auth::{ApiKeyAuthenticator, BearerTokenAuthenticator};
    use crate::executor::ExecutorConfig;
    use crate::protocol::PlayerSummary;
    use crate::transport::{HttpRequest, HttpResponse, HttpTransport, TransportError};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// Replays scripted responses in order and records every request.
    /// Hangs forever once the script runs out.
    struct ScriptedTransport {
        script: StdMutex<VecDeque<HttpResponse>>,
        sent: Arc<StdMutex<Vec<HttpRequest>>>,
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn dispatch(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            let next = self.script.lock().unwrap().pop_front();
            match next {
                Some(response) => Ok(response),
                None => std::future::pending().await,
            }
        }
    }

    struct EmptyDirectory;

    #[async_trait]
    impl ProfileDirectory for EmptyDirectory {
        async fn friend_list(&self, _owner: SteamId) -> Result<Vec<SteamId>> {
            Ok(Vec::new())
        }

        async fn profiles(&self, _ids: &[SteamId]) -> Result<Vec<PlayerSummary>> {
            Ok(Vec::new())
        }
    }

    fn ok(body: &str) -> HttpResponse {
        HttpResponse::new(200, "OK", body)
    }

    const LOGON: &str = r#"{"steamid":"76561197960287930","error":"OK","umqid":"42",
        "timestamp":1,"utc_timestamp":1700000000,"message":7,"push":0}"#;

    fn client_with(
        script: Vec<HttpResponse>,
        config: ChatConfig,
    ) -> (ChatClient, mpsc::Receiver<ChatEvent>, Arc<StdMutex<Vec<HttpRequest>>>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let transport = ScriptedTransport {
            script: StdMutex::new(VecDeque::from(script)),
            sent: Arc::clone(&sent),
        };
        let executor = RequestExecutor::new(ExecutorConfig::new("http://h"), Arc::new(transport))
            .with_authenticator(BearerTokenAuthenticator::new("tok"));
        let (client, events) = ChatClient::new(Arc::new(executor), Arc::new(EmptyDirectory), config);
        (client, events, sent)
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[test]
    fn config_defaults_and_clamping() {
        let config = ChatConfig::new();
        assert_eq!(config.ui_mode, "web");
        assert_eq!(config.poll_wait, Duration::from_secs(20));
        assert_eq!(config.poll_timeout(), Duration::from_secs(25));
        assert!(config.auto_reconnect);
        assert_eq!(config.reconnect_interval, Duration::from_secs(10));

        let config = ChatConfig::new()
            .with_poll_wait(Duration::ZERO)
            .with_event_channel_capacity(0);
        assert_eq!(config.poll_wait, Duration::from_secs(1));
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[tokio::test]
    async fn log_on_requires_bearer_token() {
        let executor = RequestExecutor::new(
            ExecutorConfig::new("http://h"),
            Arc::new(ScriptedTransport {
                script: StdMutex::new(VecDeque::new()),
                sent: Arc::new(StdMutex::new(Vec::new())),
            }),
        )
        .with_authenticator(ApiKeyAuthenticator::new("K"));
        let (mut client, _events) =
            ChatClient::new(Arc::new(executor), Arc::new(EmptyDirectory), ChatConfig::new());

        let err = client.log_on().await.unwrap_err();
        assert!(matches!(err, SteamError::MissingCredentials(AuthKind::BearerToken)));
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test(start_paused = true)]
    async fn log_on_captures_session_and_form_body() {
        let (mut client, mut events, sent) = client_with(vec![ok(LOGON)], ChatConfig::new());

        let session = client.log_on().await.unwrap();
        assert_eq!(session.session_id, "42");
        assert_eq!(session.last_message_seq, 7);
        assert_eq!(events.recv().await.unwrap(), ChatEvent::StateChanged(ConnectionState::Connecting));

        {
            let sent = sent.lock().unwrap();
            assert_eq!(
                sent[0].uri,
                "http://h/ISteamWebUserPresenceOAuth/Logon/v0001?access_token=tok"
            );
            assert_eq!(sent[0].body.as_ref().unwrap().content, "ui_mode=web");
        }

        assert!(matches!(client.log_on().await, Err(SteamError::AlreadyConnected)));
        client.disconnect().await;
    }

    #[tokio::test]
    async fn rejected_logon_returns_to_disconnected() {
        let (mut client, _events, _sent) = client_with(
            vec![HttpResponse::new(401, "Unauthorized", "")],
            ChatConfig::new(),
        );
        let err = client.log_on().await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(client.state(), ConnectionState::Disconnected);
        assert!(client.session().await.is_none());
    }

    #[tokio::test]
    async fn send_without_session_is_not_connected() {
        let (client, _events, sent) = client_with(vec![], ChatConfig::new());
        let err = client
            .send_message(SteamId::from_account_id(2), "hi")
            .await
            .unwrap_err();
        assert!(matches!(err, SteamError::NotConnected));
        assert!(sent.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn first_poll_moves_to_connected() {
        let (mut client, mut events, _sent) = client_with(
            vec![ok(LOGON), ok(r#"{"error":"Timeout","sectimeout":20}"#)],
            ChatConfig::new(),
        );
        client.log_on().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), ChatEvent::StateChanged(ConnectionState::Connecting));
        assert_eq!(events.recv().await.unwrap(), ChatEvent::StateChanged(ConnectionState::Connected));
        assert_eq!(client.session().await.unwrap().last_message_seq, 7);

        client.disconnect().await;
        assert_eq!(client.state(), ConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn not_logged_on_poll_is_fatal() {
        let (mut client, mut events, sent) = client_with(
            vec![ok(LOGON), ok(r#"{"error":"Not Logged On"}"#)],
            ChatConfig::new().with_reconnect_interval(Duration::from_millis(1)),
        );
        client.log_on().await.unwrap();

        let _ = events.recv().await; // Connecting
        assert_eq!(events.recv().await.unwrap(), ChatEvent::StateChanged(ConnectionState::Disconnected));
        match events.recv().await.unwrap() {
            ChatEvent::Disconnected { reason, manual } => {
                assert!(!manual);
                assert!(reason.unwrap().contains("not logged on"));
            }
            other => panic!("unexpected event {other:?}"),
        }
        assert!(client.session().await.is_none());
        // Only logon and the one poll: no reconnect after a fatal failure.
        assert_eq!(sent.lock().unwrap().len(), 2);
    }
}
