//! Splits a poll batch into conversation messages and presence notifications.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::directory::ProfileDirectory;
use crate::event::ChatEvent;
use crate::protocol::{ChatMessage, MessageKind, PlayerSummary, PollResult};
use crate::roster::{FriendRoster, RosterUpdate};
use crate::steam_id::SteamId;

/// One poll batch after demultiplexing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Demultiplexed {
    pub server_timestamp: DateTime<Utc>,
    /// Text, typing and left-conversation items, oldest first.
    pub messages: Vec<ChatMessage>,
    /// Presence and relationship items from other accounts, oldest first.
    pub notifications: Vec<ChatMessage>,
    /// Senders that were added to the roster by this batch and still need a profile.
    pub new_senders: Vec<SteamId>,
}

impl Demultiplexed {
    /// Events for this batch: `MessagesReceived` then `PresenceChanged`,
    /// each only when non-empty.
    pub fn into_events(self) -> Vec<ChatEvent> {
        let mut events = Vec::with_capacity(2);
        if !self.messages.is_empty() {
            events.push(ChatEvent::MessagesReceived {
                server_timestamp: self.server_timestamp,
                messages: self.messages,
            });
        }
        if !self.notifications.is_empty() {
            events.push(ChatEvent::PresenceChanged {
                server_timestamp: self.server_timestamp,
                notifications: self.notifications,
            });
        }
        events
    }
}

/// Sort `result`'s items by timestamp, route them, and fold notifications
/// into `roster`. Notifications sent by `owner` are dropped without touching
/// the roster.
pub fn demultiplex(result: PollResult, owner: SteamId, roster: &mut FriendRoster) -> Demultiplexed {
    let mut items = result.raw_messages;
    items.sort_by_key(|item| (item.timestamp, item.server_clock));

    let mut batch = Demultiplexed {
        server_timestamp: result.server_timestamp,
        ..Demultiplexed::default()
    };

    for item in items {
        match item.kind {
            kind if kind.is_conversation() => batch.messages.push(item),
            kind if kind.is_notification() => {
                if item.sender == owner {
                    continue;
                }
                if roster.apply_notification(&item) == RosterUpdate::Inserted
                    && !batch.new_senders.contains(&item.sender)
                {
                    batch.new_senders.push(item.sender);
                }
                batch.notifications.push(item);
            }
            MessageKind::Unknown => debug!(sender = %item.sender, "skipping unknown poll item"),
            _ => {}
        }
    }

    batch
}

/// Fetch profiles for senders the roster only knows partially.
///
/// Best-effort: a failed lookup is logged and yields nothing, so the partial
/// entries stay as they are.
pub async fn backfill(directory: &dyn ProfileDirectory, ids: &[SteamId]) -> Vec<PlayerSummary> {
    if ids.is_empty() {
        return Vec::new();
    }
    match directory.profiles(ids).await {
        Ok(profiles) => profiles,
        Err(e) => {
            warn!(error = %e, count = ids.len(), "profile backfill failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::error::{Result, SteamError};
    use crate::protocol::{timestamp_from_secs, PersonaState, PollStatus};
    use async_trait::async_trait;

    const OWNER: u32 = 1;
    const FRIEND: u32 = 2;

    fn item(kind: MessageKind, from: u32, at: i64) -> ChatMessage {
        ChatMessage {
            kind,
            sender: SteamId::from_account_id(from),
            persona_state: None,
            persona_name: None,
            text: None,
            timestamp: timestamp_from_secs(at),
            server_clock: 0,
        }
    }

    fn poll(items: Vec<ChatMessage>) -> PollResult {
        PollResult {
            status: PollStatus::Ok,
            last_message_seq: 1,
            server_timestamp: timestamp_from_secs(100),
            raw_messages: items,
        }
    }

    #[test]
    fn conversation_items_are_sorted_by_timestamp() {
        let mut roster = FriendRoster::new();
        let mut late = item(MessageKind::Text, FRIEND, 30);
        late.text = Some("third".into());
        let mut early = item(MessageKind::Text, FRIEND, 10);
        early.text = Some("first".into());
        let typing = item(MessageKind::Typing, FRIEND, 20);

        let batch = demultiplex(
            poll(vec![late, early, typing]),
            SteamId::from_account_id(OWNER),
            &mut roster,
        );

        let stamps: Vec<i64> = batch.messages.iter().map(|m| m.timestamp.timestamp()).collect();
        assert_eq!(stamps, vec![10, 20, 30]);
        assert!(batch.notifications.is_empty());
        assert!(roster.is_empty());
    }

    #[test]
    fn owner_notifications_are_ignored() {
        let mut roster = FriendRoster::new();
        let mut own = item(MessageKind::PersonaStateChanged, OWNER, 10);
        own.persona_state = Some(PersonaState::Away);

        let batch = demultiplex(poll(vec![own]), SteamId::from_account_id(OWNER), &mut roster);
        assert!(batch.notifications.is_empty());
        assert!(roster.is_empty());
        assert!(batch.into_events().is_empty());
    }

    #[test]
    fn notifications_update_roster_and_list_new_senders() {
        let mut roster = FriendRoster::new();
        let mut first = item(MessageKind::PersonaStateChanged, FRIEND, 10);
        first.persona_state = Some(PersonaState::Online);
        let mut second = item(MessageKind::PersonaStateChanged, FRIEND, 11);
        second.persona_state = Some(PersonaState::Snooze);

        let batch = demultiplex(
            poll(vec![second, first]),
            SteamId::from_account_id(OWNER),
            &mut roster,
        );
        assert_eq!(batch.new_senders, vec![SteamId::from_account_id(FRIEND)]);
        assert_eq!(
            roster.get(&SteamId::from_account_id(FRIEND)).unwrap().persona_state,
            PersonaState::Snooze
        );

        let events = batch.into_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], ChatEvent::PresenceChanged { notifications, .. } if notifications.len() == 2));
    }

    #[test]
    fn mixed_batch_emits_messages_before_presence() {
        let mut roster = FriendRoster::new();
        let batch = demultiplex(
            poll(vec![
                item(MessageKind::RelationshipChanged, FRIEND, 5),
                item(MessageKind::Text, FRIEND, 6),
                item(MessageKind::Unknown, FRIEND, 7),
            ]),
            SteamId::from_account_id(OWNER),
            &mut roster,
        );
        let events = batch.into_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], ChatEvent::MessagesReceived { .. }));
        assert!(matches!(events[1], ChatEvent::PresenceChanged { .. }));
    }

    struct FailingDirectory;

    #[async_trait]
    impl ProfileDirectory for FailingDirectory {
        async fn friend_list(&self, _owner: SteamId) -> Result<Vec<SteamId>> {
            Err(SteamError::NotConnected)
        }

        async fn profiles(&self, _ids: &[SteamId]) -> Result<Vec<PlayerSummary>> {
            Err(SteamError::NotConnected)
        }
    }

    #[tokio::test]
    async fn failed_backfill_keeps_partial_entry() {
        let mut roster = FriendRoster::new();
        let mut presence = item(MessageKind::PersonaStateChanged, FRIEND, 10);
        presence.persona_name = Some("Bob".into());
        let batch = demultiplex(poll(vec![presence]), SteamId::from_account_id(OWNER), &mut roster);

        let profiles = backfill(&FailingDirectory, &batch.new_senders).await;
        assert!(profiles.is_empty());
        roster.seed(profiles);

        let entry = roster.get(&SteamId::from_account_id(FRIEND)).unwrap();
        assert!(entry.profile.is_none());
        assert_eq!(entry.persona_name.as_deref(), Some("Bob"));
    }
}
