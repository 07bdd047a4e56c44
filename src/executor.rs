//! Request execution engine.
//!
//! [`RequestExecutor`] turns a [`Request`] into one transport call:
//!
//! 1. merge executor-scoped default parameters (request-scoped ones win),
//! 2. run the attached [`Authenticator`], if any,
//! 3. compose the URI (a malformed base endpoint stops here),
//! 4. attach headers, the default `User-Agent` and cookies,
//! 5. serialize the body for POST/PUT,
//! 6. dispatch with the effective timeout,
//! 7. count the attempt,
//! 8. classify the outcome into a [`Response`].
//!
//! There is no implicit retry. Transport failures never surface as `Err`;
//! they come back as a [`Response`] whose [`ResponseStatus`] says what happened.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use steam_chat_client::{ApiKeyAuthenticator, ExecutorConfig, Request, RequestExecutor, ReqwestTransport};
//!
//! let executor = RequestExecutor::new(
//!     ExecutorConfig::new("https://api.steampowered.com"),
//!     Arc::new(ReqwestTransport::new()),
//! )
//! .with_authenticator(ApiKeyAuthenticator::new("MY-KEY"));
//!
//! let mut request = Request::get("ISteamUser/GetPlayerSummaries/v0002")
//!     .with_query("steamids", "76561197960287930");
//! let response = executor.execute(&mut request).await;
//! ```

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::{AuthKind, Authenticator};
use crate::error::{Result, SteamError};
use crate::parameter::{Parameter, ParameterKind, ParameterSet};
use crate::request::{DataFormat, Request};
use crate::response::{Response, ResponseStatus};
use crate::transport::{HttpBody, HttpRequest, HttpResponse, HttpTransport, TransportError};
use crate::uri;

/// Default timeout applied when a request does not carry its own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10_000);

const JSON_CONTENT_TYPE: &str = "application/json";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`RequestExecutor`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use steam_chat_client::executor::ExecutorConfig;
/// use steam_chat_client::request::DataFormat;
///
/// let config = ExecutorConfig::new("https://api.steampowered.com")
///     .with_timeout(Duration::from_secs(30))
///     .with_body_format(DataFormat::Json);
/// assert_eq!(config.timeout, Duration::from_secs(30));
/// assert!(config.user_agent.starts_with("steam-chat-client/"));
/// ```
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Base endpoint every resource is resolved against.
    pub base_url: String,
    /// Timeout for requests that do not set a positive one themselves.
    ///
    /// Defaults to **10 seconds**. A zero value is replaced by the default.
    pub timeout: Duration,
    /// `User-Agent` sent when the request carries none.
    pub user_agent: String,
    /// Body serialization for POST/PUT requests without an explicit format.
    pub body_format: DataFormat,
}

impl ExecutorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("steam-chat-client/{}", env!("CARGO_PKG_VERSION")),
            body_format: DataFormat::default(),
        }
    }

    /// Defaults to **10 seconds**. Zero is ignored.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.timeout = timeout;
        }
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_body_format(mut self, format: DataFormat) -> Self {
        self.body_format = format;
        self
    }
}

// ── Executor ────────────────────────────────────────────────────────

/// Executes [`Request`]s over a shared [`HttpTransport`].
///
/// The configuration, default parameters, cookies and authenticator are
/// read-only once the executor is built and shared by every request it runs.
pub struct RequestExecutor {
    config: ExecutorConfig,
    default_parameters: ParameterSet,
    cookies: Vec<(String, String)>,
    authenticator: Option<Arc<dyn Authenticator>>,
    transport: Arc<dyn HttpTransport>,
}

impl RequestExecutor {
    pub fn new(config: ExecutorConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config,
            default_parameters: ParameterSet::new(),
            cookies: Vec::new(),
            authenticator: None,
            transport,
        }
    }

    /// Add a parameter merged into every request that lacks the same `(name, kind)`.
    #[must_use]
    pub fn with_default_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<Value>,
        kind: ParameterKind,
    ) -> Self {
        self.default_parameters.add(name, value, kind);
        self
    }

    #[must_use]
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        self.cookies.retain(|(n, _)| *n != name);
        self.cookies.push((name, value.into()));
        self
    }

    /// Attach the authenticator, replacing any previous one.
    #[must_use]
    pub fn with_authenticator(mut self, authenticator: impl Authenticator + 'static) -> Self {
        self.authenticator = Some(Arc::new(authenticator));
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Kind of the attached authenticator, if any.
    pub fn auth_kind(&self) -> Option<AuthKind> {
        self.authenticator.as_ref().map(|auth| auth.kind())
    }

    /// Compose the URI `request` would be sent to, without authenticating or
    /// mutating it.
    ///
    /// # Errors
    ///
    /// Returns [`SteamError::MalformedEndpoint`] if the base endpoint is not a
    /// well-formed URI.
    pub fn build_uri(&self, request: &Request) -> Result<String> {
        let mut params = request.parameters().clone();
        for param in &self.default_parameters {
            params.insert_if_absent(param.clone());
        }
        uri::compose(
            &self.config.base_url,
            request.resource(),
            &params,
            request.method(),
            self.body_format(request),
        )
    }

    /// Execute `request` and classify the outcome.
    ///
    /// Never fails: transport problems are reported through
    /// [`Response::response_status`]. A malformed base endpoint yields
    /// [`ResponseStatus::Error`] without any dispatch.
    pub async fn execute(&self, request: &mut Request) -> Response {
        match self.try_execute(request).await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "request aborted before dispatch");
                Response::failed(ResponseStatus::Error, err.to_string(), Some(Arc::new(err)))
            }
        }
    }

    /// Blocking twin of [`execute`](Self::execute).
    ///
    /// Drives the same implementation on a private current-thread runtime.
    /// Must not be called from within an async context.
    pub fn execute_blocking(&self, request: &mut Request) -> Response {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.execute(request)),
            Err(e) => {
                let err = SteamError::Io(e);
                Response::failed(ResponseStatus::Error, err.to_string(), Some(Arc::new(err)))
            }
        }
    }

    /// Execute `request` and decode a successful JSON body into `T`.
    ///
    /// # Errors
    ///
    /// - [`SteamError::MalformedEndpoint`] before dispatch.
    /// - [`SteamError::Authentication`] for HTTP 401.
    /// - [`SteamError::Request`] for any other unsuccessful outcome or a
    ///   payload that does not decode (see
    ///   [`RequestError::is_deserialization_issue`](crate::error::RequestError::is_deserialization_issue)).
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &mut Request) -> Result<T> {
        let response = self.try_execute(request).await?;
        response.json().map_err(SteamError::from_request)
    }

    /// Execute `request` and require a successful status, ignoring the body.
    ///
    /// # Errors
    ///
    /// Same as [`execute_json`](Self::execute_json), minus decoding.
    pub async fn execute_checked(&self, request: &mut Request) -> Result<Response> {
        let response = self.try_execute(request).await?;
        response.error_for_status().map_err(SteamError::from_request)
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn body_format(&self, request: &Request) -> DataFormat {
        request.body_format().unwrap_or(self.config.body_format)
    }

    /// Steps 1–8; `Err` only for pre-flight failures.
    async fn try_execute(&self, request: &mut Request) -> Result<Response> {
        for param in &self.default_parameters {
            request.parameters_mut().insert_if_absent(param.clone());
        }

        if let Some(auth) = &self.authenticator {
            auth.authenticate(request);
        }

        let format = self.body_format(request);
        let uri = uri::compose(
            &self.config.base_url,
            request.resource(),
            request.parameters(),
            request.method(),
            format,
        )?;

        let headers = self.headers(request);

        let body = if request.method().has_body() {
            serialize_body(request.parameters(), format)?
        } else {
            None
        };

        let timeout = request
            .timeout()
            .filter(|t| !t.is_zero())
            .unwrap_or(self.config.timeout);

        let http = HttpRequest {
            method: request.method(),
            uri,
            headers,
            body,
            timeout,
        };

        request.record_attempt();
        debug!(
            method = %http.method,
            uri = %http.uri,
            attempt = request.attempts(),
            timeout_ms = timeout.as_millis() as u64,
            "dispatching request"
        );

        let outcome = tokio::time::timeout(timeout, self.transport.dispatch(http)).await;
        Ok(classify(outcome, timeout))
    }

    fn headers(&self, request: &Request) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = request
            .parameters()
            .of_kind(ParameterKind::Header)
            .map(|p| (p.name.clone(), p.value_text()))
            .collect();

        if !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("user-agent"))
        {
            headers.push(("User-Agent".to_string(), self.config.user_agent.clone()));
        }

        if !self.cookies.is_empty() {
            let cookie = self
                .cookies
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; ");
            headers.push(("Cookie".to_string(), cookie));
        }

        headers
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("config", &self.config)
            .field("default_parameters", &self.default_parameters.len())
            .field("cookies", &self.cookies.len())
            .field("auth_kind", &self.auth_kind())
            .finish()
    }
}

/// Serialize the POST/PUT body for `format`. `None` when there is nothing to send.
fn serialize_body(params: &ParameterSet, format: DataFormat) -> Result<Option<HttpBody>> {
    let body_params: Vec<&Parameter> = params.of_kind(ParameterKind::Body).collect();
    let form_params: Vec<&Parameter> = params.of_kind(ParameterKind::FormOrQuery).collect();

    let body = match format {
        DataFormat::Raw => body_params.first().map(|p| HttpBody {
            content: p.value_text(),
            content_type: None,
        }),
        DataFormat::Json => {
            let value = match (body_params.as_slice(), form_params.is_empty()) {
                ([], true) => None,
                ([single], true) => Some(single.value.clone()),
                _ => {
                    let mut merged = Map::new();
                    for param in &body_params {
                        match &param.value {
                            Value::Object(fields) => merged.extend(fields.clone()),
                            other => {
                                merged.insert(param.name.clone(), other.clone());
                            }
                        }
                    }
                    for param in &form_params {
                        merged.insert(param.name.clone(), param.value.clone());
                    }
                    Some(Value::Object(merged))
                }
            };
            match value {
                Some(value) => Some(HttpBody {
                    content: serde_json::to_string(&value)?,
                    content_type: Some(JSON_CONTENT_TYPE.to_string()),
                }),
                None => None,
            }
        }
        DataFormat::FormUrlEncoded => {
            if form_params.is_empty() && body_params.is_empty() {
                None
            } else {
                Some(HttpBody {
                    content: uri::encode_pairs(form_params.into_iter().chain(body_params)),
                    content_type: Some(FORM_CONTENT_TYPE.to_string()),
                })
            }
        }
    };

    Ok(body)
}

type DispatchOutcome = std::result::Result<
    std::result::Result<HttpResponse, TransportError>,
    tokio::time::error::Elapsed,
>;

fn classify(outcome: DispatchOutcome, timeout: Duration) -> Response {
    match outcome {
        Ok(Ok(http)) => {
            debug!(status = http.status, "request completed");
            Response::completed(http.status, http.reason, http.body)
        }
        Ok(Err(err @ TransportError::TimedOut(_))) => {
            warn!(error = %err, "request timed out");
            Response::failed(ResponseStatus::TimedOut, err.to_string(), Some(Arc::new(err)))
        }
        Ok(Err(err @ TransportError::Failed(_))) => {
            warn!(error = %err, "transport failure");
            Response::failed(ResponseStatus::Error, err.to_string(), Some(Arc::new(err)))
        }
        Err(_) => {
            let err = TransportError::TimedOut(format!(
                "no response within {} ms",
                timeout.as_millis()
            ));
            warn!(error = %err, "request timed out");
            Response::failed(ResponseStatus::TimedOut, err.to_string(), Some(Arc::new(err)))
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::auth::{ApiKeyAuthenticator, BearerTokenAuthenticator};
    use crate::request::Method;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    // ── Mock transport ──────────────────────────────────────────────

    /// Records every dispatched request and answers with a fixed outcome.
    struct RecordingTransport {
        sent: Arc<StdMutex<Vec<HttpRequest>>>,
        outcome: fn() -> std::result::Result<HttpResponse, TransportError>,
    }

    #[async_trait]
    impl HttpTransport for RecordingTransport {
        async fn dispatch(
            &self,
            request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            (self.outcome)()
        }
    }

    /// Never answers.
    struct HangingTransport;

    #[async_trait]
    impl HttpTransport for HangingTransport {
        async fn dispatch(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, TransportError> {
            std::future::pending().await
        }
    }

    fn ok() -> std::result::Result<HttpResponse, TransportError> {
        Ok(HttpResponse::new(200, "OK", r#"{"value":1}"#))
    }

    fn executor_with(
        base: &str,
        outcome: fn() -> std::result::Result<HttpResponse, TransportError>,
    ) -> (RequestExecutor, Arc<StdMutex<Vec<HttpRequest>>>) {
        let sent = Arc::new(StdMutex::new(Vec::new()));
        let transport = RecordingTransport {
            sent: Arc::clone(&sent),
            outcome,
        };
        (
            RequestExecutor::new(ExecutorConfig::new(base), Arc::new(transport)),
            sent,
        )
    }

    // ── Tests ───────────────────────────────────────────────────────

    #[tokio::test]
    async fn defaults_do_not_override_request_parameters() {
        let (executor, sent) = executor_with("http://h", ok);
        let executor = executor
            .with_default_parameter("format", "json", ParameterKind::QueryString)
            .with_default_parameter("lang", "en", ParameterKind::QueryString);

        let mut request = Request::get("r").with_query("format", "vdf");
        executor.execute(&mut request).await;

        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].uri, "http://h/r?format=vdf&lang=en");
    }

    #[tokio::test]
    async fn authenticator_runs_once_per_dispatch() {
        let (executor, sent) = executor_with("http://h", ok);
        let executor = executor.with_authenticator(ApiKeyAuthenticator::new("K"));

        let mut request = Request::get("r");
        executor.execute(&mut request).await;
        executor.execute(&mut request).await;

        assert_eq!(request.parameters().count("key", ParameterKind::QueryString), 1);
        assert_eq!(request.attempts(), 2);
        assert!(sent.lock().unwrap()[1].uri.ends_with("?key=K"));
    }

    #[tokio::test]
    async fn default_user_agent_is_added_once() {
        let (executor, sent) = executor_with("http://h", ok);
        let mut plain = Request::get("r");
        let mut custom = Request::get("r").with_header("user-agent", "mine");
        executor.execute(&mut plain).await;
        executor.execute(&mut custom).await;

        let sent = sent.lock().unwrap();
        assert!(sent[0].header("User-Agent").unwrap().starts_with("steam-chat-client/"));
        let agents: Vec<_> = sent[1]
            .headers
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .collect();
        assert_eq!(agents.len(), 1);
        assert_eq!(agents[0].1, "mine");
    }

    #[tokio::test]
    async fn cookies_are_joined_into_one_header() {
        let (executor, sent) = executor_with("http://h", ok);
        let executor = executor.with_cookie("a", "1").with_cookie("b", "2");
        executor.execute(&mut Request::get("r")).await;
        assert_eq!(sent.lock().unwrap()[0].header("cookie"), Some("a=1; b=2"));
    }

    #[tokio::test]
    async fn form_body_for_post() {
        let (executor, sent) = executor_with("http://h", ok);
        let executor = executor.with_authenticator(BearerTokenAuthenticator::new("tok"));
        let mut request = Request::post("ISteamWebUserPresenceOAuth/Poll/v0001")
            .with_param("umqid", "12 34")
            .with_param("message", 5);
        executor.execute(&mut request).await;

        let sent = sent.lock().unwrap();
        assert_eq!(
            sent[0].uri,
            "http://h/ISteamWebUserPresenceOAuth/Poll/v0001?access_token=tok"
        );
        let body = sent[0].body.as_ref().unwrap();
        assert_eq!(body.content, "umqid=12%2034&message=5");
        assert_eq!(body.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn json_body_with_sole_value() {
        let (executor, sent) = executor_with("http://h", ok);
        let mut request = Request::post("r")
            .with_body_format(DataFormat::Json)
            .with_body(serde_json::json!([1, 2, 3]));
        executor.execute(&mut request).await;
        let body = sent.lock().unwrap()[0].body.clone().unwrap();
        assert_eq!(body.content, "[1,2,3]");
        assert_eq!(body.content_type.as_deref(), Some(JSON_CONTENT_TYPE));
    }

    #[tokio::test]
    async fn json_body_merges_form_parameters() {
        let (executor, sent) = executor_with("http://h", ok);
        let mut request = Request::new("r", Method::Put)
            .with_body_format(DataFormat::Json)
            .with_body(serde_json::json!({"text": "hi"}))
            .with_param("type", "saytext");
        executor.execute(&mut request).await;
        let body = sent.lock().unwrap()[0].body.clone().unwrap();
        let value: Value = serde_json::from_str(&body.content).unwrap();
        assert_eq!(value, serde_json::json!({"text": "hi", "type": "saytext"}));
    }

    #[tokio::test]
    async fn raw_body_is_verbatim_without_content_type() {
        let (executor, sent) = executor_with("http://h", ok);
        let mut request = Request::post("r")
            .with_body_format(DataFormat::Raw)
            .with_body("a=b&c")
            .with_param("q", "1");
        executor.execute(&mut request).await;
        let sent = sent.lock().unwrap();
        let body = sent[0].body.clone().unwrap();
        assert_eq!(body.content, "a=b&c");
        assert!(body.content_type.is_none());
        assert_eq!(sent[0].uri, "http://h/r?q=1");
    }

    #[tokio::test]
    async fn get_has_no_body() {
        let (executor, sent) = executor_with("http://h", ok);
        executor
            .execute(&mut Request::get("r").with_body("ignored"))
            .await;
        assert!(sent.lock().unwrap()[0].body.is_none());
    }

    #[tokio::test]
    async fn request_timeout_overrides_default() {
        let (executor, sent) = executor_with("http://h", ok);
        executor
            .execute(&mut Request::get("r").with_timeout(Duration::from_millis(250)))
            .await;
        executor
            .execute(&mut Request::get("r").with_timeout(Duration::ZERO))
            .await;
        let sent = sent.lock().unwrap();
        assert_eq!(sent[0].timeout, Duration::from_millis(250));
        assert_eq!(sent[1].timeout, DEFAULT_TIMEOUT);
    }

    #[tokio::test]
    async fn malformed_endpoint_never_dispatches() {
        let (executor, sent) = executor_with("Definitely isn't a URI... How sad :(", ok);
        let mut request = Request::get("resource");

        assert!(matches!(
            executor.build_uri(&request),
            Err(SteamError::MalformedEndpoint(_))
        ));

        let response = executor.execute(&mut request).await;
        assert_eq!(response.response_status, ResponseStatus::Error);
        assert!(!response.is_successful);
        assert_eq!(request.attempts(), 0);
        assert!(sent.lock().unwrap().is_empty());

        let err = executor
            .execute_json::<Value>(&mut Request::get("resource"))
            .await
            .unwrap_err();
        assert!(matches!(err, SteamError::MalformedEndpoint(_)));
    }

    #[tokio::test]
    async fn transport_failure_becomes_error_status() {
        let (executor, _sent) =
            executor_with("http://h", || Err(TransportError::Failed("refused".into())));
        let mut request = Request::get("r");
        let response = executor.execute(&mut request).await;
        assert_eq!(response.response_status, ResponseStatus::Error);
        assert!(!response.is_successful);
        assert!(response.error_cause.is_some());
        assert_eq!(request.attempts(), 1);
    }

    #[tokio::test]
    async fn transport_timeout_becomes_timed_out_status() {
        let (executor, _sent) =
            executor_with("http://h", || Err(TransportError::TimedOut("slow".into())));
        let response = executor.execute(&mut Request::get("r")).await;
        assert_eq!(response.response_status, ResponseStatus::TimedOut);
    }

    #[tokio::test(start_paused = true)]
    async fn executor_enforces_timeout_around_transport() {
        let executor = RequestExecutor::new(
            ExecutorConfig::new("http://h"),
            Arc::new(HangingTransport),
        );
        let mut request = Request::get("r").with_timeout(Duration::from_millis(1));
        let response = executor.execute(&mut request).await;
        assert_eq!(response.response_status, ResponseStatus::TimedOut);
        assert_eq!(request.attempts(), 1);
    }

    #[tokio::test]
    async fn non_2xx_is_completed_but_unsuccessful() {
        let (executor, _sent) =
            executor_with("http://h", || Ok(HttpResponse::new(503, "Service Unavailable", "")));
        let response = executor.execute(&mut Request::get("r")).await;
        assert_eq!(response.response_status, ResponseStatus::Completed);
        assert_eq!(response.status_code, 503);
        assert!(!response.is_successful);
    }

    #[tokio::test]
    async fn execute_json_classifies_business_failures() {
        let (executor, _sent) =
            executor_with("http://h", || Ok(HttpResponse::new(401, "Unauthorized", "")));
        let err = executor
            .execute_json::<Value>(&mut Request::get("r"))
            .await
            .unwrap_err();
        assert!(err.is_unauthorized());

        let (executor, _sent) = executor_with("http://h", || Ok(HttpResponse::new(200, "OK", "<html>")));
        let err = executor
            .execute_json::<Value>(&mut Request::get("r"))
            .await
            .unwrap_err();
        assert!(err.request_error().unwrap().is_deserialization_issue());
    }

    #[test]
    fn execute_blocking_shares_the_async_path() {
        let (executor, sent) = executor_with("http://h", ok);
        let mut request = Request::get("r");
        let response = executor.execute_blocking(&mut request);
        assert!(response.is_successful);
        assert_eq!(request.attempts(), 1);
        assert_eq!(sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn build_uri_does_not_mutate_or_authenticate() {
        let (executor, _sent) = executor_with("http://h/", ok);
        let executor = executor.with_authenticator(ApiKeyAuthenticator::new("K"));
        let request = Request::get("/r");
        assert_eq!(executor.build_uri(&request).unwrap(), "http://h/r");
        assert!(request.parameters().is_empty());
        assert_eq!(executor.auth_kind(), Some(AuthKind::ApiKey));
    }

    #[test]
    fn config_ignores_zero_timeout() {
        let config = ExecutorConfig::new("http://h").with_timeout(Duration::ZERO);
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}
