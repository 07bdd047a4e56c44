//! Wire types for the Steam Web API chat protocol.
//!
//! The `*Response` structs mirror the JSON returned by the
//! `ISteamWebUserPresenceOAuth` and `ISteamUser` interfaces field for field.
//! [`PollResponse::into_poll_result`] converts a raw poll payload into the
//! typed [`PollResult`] the demultiplexer consumes.
//!
//! Field names on the wire:
//!
//! | Concept            | Wire name     |
//! |--------------------|---------------|
//! | session id         | `umqid`       |
//! | server wait budget | `sectimeout`  |
//! | sequence cursor    | `message` (request), `messagelast` (response) |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::steam_id::SteamId;

// ── Resources ───────────────────────────────────────────────────────

pub const LOGON_RESOURCE: &str = "ISteamWebUserPresenceOAuth/Logon/v0001";
pub const POLL_RESOURCE: &str = "ISteamWebUserPresenceOAuth/Poll/v0001";
pub const MESSAGE_RESOURCE: &str = "ISteamWebUserPresenceOAuth/Message/v0001";
pub const LOGOFF_RESOURCE: &str = "ISteamWebUserPresenceOAuth/Logoff/v0001";
pub const FRIEND_LIST_RESOURCE: &str = "ISteamUser/GetFriendList/v0001";
pub const PLAYER_SUMMARIES_RESOURCE: &str = "ISteamUser/GetPlayerSummaries/v0002";

/// Status token for a healthy response.
pub const STATUS_OK: &str = "OK";
/// Status token for a poll that waited out its budget without data.
pub const STATUS_TIMEOUT: &str = "Timeout";
/// Status token for a poll against a session the server no longer knows.
pub const STATUS_NOT_LOGGED_ON: &str = "Not Logged On";

// ── Enums ───────────────────────────────────────────────────────────

/// Online status of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum PersonaState {
    #[default]
    Offline,
    Online,
    Busy,
    Away,
    Snooze,
    LookingToTrade,
    LookingToPlay,
    /// A value this client does not know about.
    Unknown(u8),
}

impl From<u8> for PersonaState {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Offline,
            1 => Self::Online,
            2 => Self::Busy,
            3 => Self::Away,
            4 => Self::Snooze,
            5 => Self::LookingToTrade,
            6 => Self::LookingToPlay,
            other => Self::Unknown(other),
        }
    }
}

impl From<PersonaState> for u8 {
    fn from(state: PersonaState) -> Self {
        match state {
            PersonaState::Offline => 0,
            PersonaState::Online => 1,
            PersonaState::Busy => 2,
            PersonaState::Away => 3,
            PersonaState::Snooze => 4,
            PersonaState::LookingToTrade => 5,
            PersonaState::LookingToPlay => 6,
            PersonaState::Unknown(other) => other,
        }
    }
}

/// Kind of an item in a poll batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    #[serde(rename = "saytext", alias = "emote", alias = "my_saytext", alias = "my_emote")]
    Text,
    #[serde(rename = "typing")]
    Typing,
    #[serde(rename = "leftconversation")]
    LeftConversation,
    #[serde(rename = "personastate")]
    PersonaStateChanged,
    #[serde(rename = "personarelationship")]
    RelationshipChanged,
    /// Any type this client does not handle; dropped by the demultiplexer.
    #[serde(other)]
    Unknown,
}

impl MessageKind {
    /// Conversation traffic (as opposed to presence/relationship notifications).
    pub fn is_conversation(&self) -> bool {
        matches!(self, Self::Text | Self::Typing | Self::LeftConversation)
    }

    pub fn is_notification(&self) -> bool {
        matches!(self, Self::PersonaStateChanged | Self::RelationshipChanged)
    }
}

/// Outgoing chat message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutgoingKind {
    SayText,
    Typing,
}

impl OutgoingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SayText => "saytext",
            Self::Typing => "typing",
        }
    }
}

// ── Logon / logoff / message ────────────────────────────────────────

/// Response of the logon handshake.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogonResponse {
    pub steamid: SteamId,
    /// Session id for every later call.
    pub umqid: String,
    /// Initial sequence cursor.
    pub message: i64,
    /// Per-connection push flag.
    #[serde(default)]
    pub push: u8,
    /// Server-local millisecond clock.
    #[serde(default)]
    pub timestamp: u64,
    /// Server wall clock, seconds since the epoch.
    #[serde(default)]
    pub utc_timestamp: i64,
    pub error: String,
}

/// Response of the send-message and logoff calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckResponse {
    #[serde(default)]
    pub utc_timestamp: Option<i64>,
    pub error: String,
}

// ── Poll ────────────────────────────────────────────────────────────

/// One raw item of a poll batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollMessage {
    #[serde(rename = "type")]
    pub kind: MessageKind,
    /// Server-local millisecond clock; breaks ties between equal wall-clock seconds.
    #[serde(default)]
    pub timestamp: u64,
    /// Seconds since the epoch.
    pub utc_timestamp: i64,
    pub steamid_from: SteamId,
    #[serde(default)]
    pub status_flags: Option<u32>,
    #[serde(default)]
    pub persona_state: Option<PersonaState>,
    #[serde(default)]
    pub persona_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Raw poll response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollResponse {
    #[serde(default)]
    pub pollid: Option<u64>,
    #[serde(default)]
    pub messages: Vec<PollMessage>,
    /// New sequence cursor. Absent on `Timeout`.
    #[serde(default)]
    pub messagelast: Option<i64>,
    #[serde(default)]
    pub timestamp: Option<u64>,
    #[serde(default)]
    pub utc_timestamp: Option<i64>,
    #[serde(default)]
    pub messagebase: Option<i64>,
    #[serde(default)]
    pub sectimeout: Option<u32>,
    pub error: String,
}

/// Outcome token of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Ok,
    Timeout,
    ErrorText(String),
}

impl PollStatus {
    pub fn from_token(token: &str) -> Self {
        match token {
            STATUS_OK => Self::Ok,
            STATUS_TIMEOUT => Self::Timeout,
            other => Self::ErrorText(other.to_string()),
        }
    }
}

/// A chat item after decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub sender: SteamId,
    pub persona_state: Option<PersonaState>,
    pub persona_name: Option<String>,
    pub text: Option<String>,
    pub timestamp: DateTime<Utc>,
    /// Server-local millisecond clock, used only as an ordering tie-breaker.
    pub server_clock: u64,
}

impl From<PollMessage> for ChatMessage {
    fn from(raw: PollMessage) -> Self {
        Self {
            kind: raw.kind,
            sender: raw.steamid_from,
            persona_state: raw.persona_state,
            persona_name: raw.persona_name,
            text: raw.text,
            timestamp: timestamp_from_secs(raw.utc_timestamp),
            server_clock: raw.timestamp,
        }
    }
}

/// Decoded poll response.
#[derive(Debug, Clone, PartialEq)]
pub struct PollResult {
    pub status: PollStatus,
    /// New cursor, or the previous one when the server did not send any.
    pub last_message_seq: i64,
    pub server_timestamp: DateTime<Utc>,
    /// In transport order; not guaranteed sorted.
    pub raw_messages: Vec<ChatMessage>,
}

impl PollResponse {
    /// Convert into a [`PollResult`], keeping `previous_seq` when the server
    /// sent no cursor and never moving the cursor backwards.
    pub fn into_poll_result(self, previous_seq: i64) -> PollResult {
        let last_message_seq = self
            .messagelast
            .map_or(previous_seq, |seq| seq.max(previous_seq));
        let server_timestamp = self
            .utc_timestamp
            .map_or_else(Utc::now, timestamp_from_secs);
        PollResult {
            status: PollStatus::from_token(&self.error),
            last_message_seq,
            server_timestamp,
            raw_messages: self.messages.into_iter().map(ChatMessage::from).collect(),
        }
    }
}

pub(crate) fn timestamp_from_secs(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

// ── Directory ───────────────────────────────────────────────────────

/// Profile snapshot returned by `GetPlayerSummaries`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub steamid: SteamId,
    #[serde(default)]
    pub personaname: String,
    #[serde(default)]
    pub profileurl: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub avatarfull: Option<String>,
    #[serde(default)]
    pub personastate: PersonaState,
    #[serde(default)]
    pub lastlogoff: Option<i64>,
    #[serde(default)]
    pub realname: Option<String>,
    #[serde(default)]
    pub gameextrainfo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummariesResponse {
    pub response: PlayerSummariesBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSummariesBody {
    #[serde(default)]
    pub players: Vec<PlayerSummary>,
}

/// One entry of `GetFriendList`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendEntry {
    pub steamid: SteamId,
    #[serde(default)]
    pub relationship: String,
    #[serde(default)]
    pub friend_since: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendListResponse {
    pub friendslist: FriendListBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendListBody {
    #[serde(default)]
    pub friends: Vec<FriendEntry>,
}
