//! Authentication strategies applied to a request right before dispatch.
//!
//! An executor carries at most one [`Authenticator`]. Each strategy adds
//! exactly one parameter and reports an [`AuthKind`] tag so callers that need
//! a particular kind of credential (the chat protocol needs a bearer token)
//! can check it with a plain comparison.

use std::fmt;

use crate::parameter::ParameterKind;
use crate::request::Request;

/// Capability tag describing what an authenticator provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthKind {
    /// Static Web API key (`key=` on the query string).
    ApiKey,
    /// OAuth-style bearer token.
    BearerToken,
}

impl fmt::Display for AuthKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey => f.write_str("API key"),
            Self::BearerToken => f.write_str("bearer token"),
        }
    }
}

/// Injects credentials into a [`Request`].
///
/// Invoked exactly once per dispatch, after default parameters are merged and
/// before the URI is composed.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// What kind of credential this strategy adds.
    fn kind(&self) -> AuthKind;

    /// Add the credential parameter to `request`.
    fn authenticate(&self, request: &mut Request);
}

/// Adds a Web API key as the `key` query parameter.
#[derive(Clone)]
pub struct ApiKeyAuthenticator {
    key: String,
}

impl ApiKeyAuthenticator {
    pub const PARAMETER: &'static str = "key";

    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for ApiKeyAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyAuthenticator")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl Authenticator for ApiKeyAuthenticator {
    fn kind(&self) -> AuthKind {
        AuthKind::ApiKey
    }

    fn authenticate(&self, request: &mut Request) {
        request
            .parameters_mut()
            .add(Self::PARAMETER, self.key.as_str(), ParameterKind::QueryString);
    }
}

/// Where a bearer token is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPlacement {
    /// `access_token=<token>` on the query string (what the Steam Web API expects).
    #[default]
    Query,
    /// `Authorization: Bearer <token>` header.
    Header,
}

/// Adds a per-instance bearer token.
#[derive(Clone)]
pub struct BearerTokenAuthenticator {
    token: String,
    placement: TokenPlacement,
}

impl BearerTokenAuthenticator {
    pub const QUERY_PARAMETER: &'static str = "access_token";

    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            placement: TokenPlacement::default(),
        }
    }

    #[must_use]
    pub fn with_placement(mut self, placement: TokenPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for BearerTokenAuthenticator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerTokenAuthenticator")
            .field("token", &"<redacted>")
            .field("placement", &self.placement)
            .finish()
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn kind(&self) -> AuthKind {
        AuthKind::BearerToken
    }

    fn authenticate(&self, request: &mut Request) {
        let params = request.parameters_mut();
        match self.placement {
            TokenPlacement::Query => params.add(
                Self::QUERY_PARAMETER,
                self.token.as_str(),
                ParameterKind::QueryString,
            ),
            TokenPlacement::Header => params.add(
                "Authorization",
                format!("Bearer {}", self.token),
                ParameterKind::Header,
            ),
        }
    }
}
