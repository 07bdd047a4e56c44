//! # Steam Chat Client
//!
//! Async Rust client for the Steam Web API and its long-poll chat protocol.
//!
//! The crate has two layers:
//!
//! - a **request execution engine** ([`RequestExecutor`]) that turns a
//!   [`Request`] into one HTTP call with parameter precedence, authentication,
//!   body encoding, timeouts and outcome classification, and
//! - a **chat client** ([`ChatClient`]) built on it, which logs on, keeps a
//!   long-poll connection alive, reconnects after failures and demultiplexes
//!   incoming traffic into [`ChatEvent`]s.
//!
//! ## Features
//!
//! - **Transport-agnostic**: implement [`HttpTransport`] for any HTTP stack
//! - **reqwest built-in**: default `transport-reqwest` feature provides [`ReqwestTransport`]
//! - **Event-driven**: receive typed [`ChatEvent`]s via a channel
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use steam_chat_client::{
//!     BearerTokenAuthenticator, ChatClient, ChatConfig, ChatEvent, ExecutorConfig,
//!     RequestExecutor, ReqwestTransport, WebApiDirectory,
//! };
//!
//! let executor = Arc::new(
//!     RequestExecutor::new(
//!         ExecutorConfig::new("https://api.steampowered.com"),
//!         Arc::new(ReqwestTransport::new()),
//!     )
//!     .with_authenticator(BearerTokenAuthenticator::new(token)),
//! );
//! let directory = Arc::new(WebApiDirectory::new(Arc::clone(&executor)));
//! let (mut client, mut events) = ChatClient::new(executor, directory, ChatConfig::new());
//! client.log_on().await?;
//!
//! while let Some(event) = events.recv().await {
//!     if let ChatEvent::MessagesReceived { messages, .. } = event {
//!         for message in messages {
//!             println!("{}: {:?}", message.sender, message.text);
//!         }
//!     }
//! }
//! ```

pub mod auth;
pub mod client;
pub mod demux;
pub mod directory;
pub mod error;
pub mod event;
pub mod executor;
pub mod parameter;
pub mod protocol;
pub mod request;
pub mod response;
pub mod roster;
pub mod status;
pub mod steam_id;
pub mod transport;
pub mod transports;
pub mod uri;

// Re-export primary types for ergonomic imports.
pub use auth::{ApiKeyAuthenticator, AuthKind, Authenticator, BearerTokenAuthenticator};
pub use client::{ChatClient, ChatConfig, ChatSession};
pub use directory::{ProfileDirectory, WebApiDirectory};
pub use error::{RequestError, SteamError};
pub use event::{ChatEvent, ConnectionState};
pub use executor::{ExecutorConfig, RequestExecutor};
pub use parameter::{Parameter, ParameterKind, ParameterSet};
pub use protocol::{ChatMessage, MessageKind, PersonaState};
pub use request::{DataFormat, Method, Request};
pub use response::{Response, ResponseStatus};
pub use roster::FriendRoster;
pub use steam_id::SteamId;
pub use transport::HttpTransport;

#[cfg(feature = "transport-reqwest")]
pub use transports::ReqwestTransport;
