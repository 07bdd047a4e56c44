//! Events emitted by a [`ChatClient`](crate::client::ChatClient).
//!
//! Events arrive on the bounded [`tokio::sync::mpsc::Receiver<ChatEvent>`]
//! returned from [`ChatClient::new`](crate::client::ChatClient::new), in the
//! order the connection task produced them.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::protocol::ChatMessage;

/// Lifecycle state of a chat connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Disconnected,
    /// Handshake done or in progress, no poll has succeeded yet.
    Connecting,
    Connected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
        };
        f.write_str(s)
    }
}

/// An event produced by the chat connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// The connection moved to a new [`ConnectionState`].
    StateChanged(ConnectionState),

    /// Conversation traffic (text, typing, left-conversation) from one poll,
    /// in ascending timestamp order.
    MessagesReceived {
        server_timestamp: DateTime<Utc>,
        messages: Vec<ChatMessage>,
    },

    /// Presence and relationship notifications from one poll, in ascending
    /// timestamp order. Never contains the session owner's own notifications.
    PresenceChanged {
        server_timestamp: DateTime<Utc>,
        notifications: Vec<ChatMessage>,
    },

    /// The poll cycle ended.
    ///
    /// `manual` is `true` when the cycle was ended by
    /// [`disconnect`](crate::client::ChatClient::disconnect); such a
    /// disconnect is never followed by an automatic reconnect.
    Disconnected {
        reason: Option<String>,
        manual: bool,
    },
}
