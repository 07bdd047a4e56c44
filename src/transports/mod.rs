//! HTTP transport implementations.
//!
//! This module provides concrete [`HttpTransport`](crate::HttpTransport)
//! implementations behind feature gates. Enable the corresponding Cargo
//! feature to pull in a transport:
//!
//! | Feature             | Transport           |
//! |---------------------|---------------------|
//! | `transport-reqwest` | [`ReqwestTransport`] |
//!
//! # Example
//!
//! ```rust,ignore
//! # async fn example() -> Result<(), steam_chat_client::SteamError> {
//! use std::sync::Arc;
//! use steam_chat_client::{ExecutorConfig, RequestExecutor, ReqwestTransport};
//!
//! let executor = RequestExecutor::new(
//!     ExecutorConfig::new("https://api.steampowered.com"),
//!     Arc::new(ReqwestTransport::new()),
//! );
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "transport-reqwest")]
pub mod reqwest_client;

#[cfg(feature = "transport-reqwest")]
pub use reqwest_client::ReqwestTransport;
