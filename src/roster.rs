//! Local cache of known accounts and their latest presence.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::protocol::{timestamp_from_secs, ChatMessage, PersonaState, PlayerSummary};
use crate::steam_id::SteamId;

/// What the client knows about one account.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RosterEntry {
    /// Last profile snapshot from the directory. `None` until a lookup succeeds.
    pub profile: Option<PlayerSummary>,
    pub persona_name: Option<String>,
    pub persona_state: PersonaState,
    pub last_logoff: Option<DateTime<Utc>>,
}

impl RosterEntry {
    fn from_profile(profile: PlayerSummary) -> Self {
        let mut entry = Self::default();
        entry.apply_profile(profile);
        entry
    }

    fn apply_profile(&mut self, profile: PlayerSummary) {
        if !profile.personaname.is_empty() {
            self.persona_name = Some(profile.personaname.clone());
        }
        self.persona_state = profile.personastate;
        if let Some(secs) = profile.lastlogoff {
            self.last_logoff = Some(timestamp_from_secs(secs));
        }
        self.profile = Some(profile);
    }
}

/// Outcome of folding a notification into the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterUpdate {
    Updated,
    /// The sender was not known; an entry with partial data was created.
    Inserted,
}

/// Map from [`SteamId`] to [`RosterEntry`].
///
/// Owned by the connection task; other callers get clones via
/// [`ChatClient::roster`](crate::client::ChatClient::roster).
#[derive(Debug, Clone, Default)]
pub struct FriendRoster {
    entries: HashMap<SteamId, RosterEntry>,
}

impl FriendRoster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or refresh entries from directory snapshots.
    pub fn seed(&mut self, profiles: impl IntoIterator<Item = PlayerSummary>) {
        for profile in profiles {
            self.apply_profile(profile);
        }
    }

    /// Merge one directory snapshot, creating the entry if needed.
    pub fn apply_profile(&mut self, profile: PlayerSummary) {
        match self.entries.get_mut(&profile.steamid) {
            Some(entry) => entry.apply_profile(profile),
            None => {
                self.entries
                    .insert(profile.steamid, RosterEntry::from_profile(profile));
            }
        }
    }

    /// Fold a presence or relationship notification into the roster.
    ///
    /// Going `Offline` stamps `last_logoff` with the notification time.
    pub fn apply_notification(&mut self, notification: &ChatMessage) -> RosterUpdate {
        let update = if self.entries.contains_key(&notification.sender) {
            RosterUpdate::Updated
        } else {
            RosterUpdate::Inserted
        };
        let entry = self.entries.entry(notification.sender).or_default();

        if let Some(name) = &notification.persona_name {
            entry.persona_name = Some(name.clone());
        }
        if let Some(state) = notification.persona_state {
            entry.persona_state = state;
            if state == PersonaState::Offline {
                entry.last_logoff = Some(notification.timestamp);
            }
        }
        update
    }

    pub fn get(&self, id: &SteamId) -> Option<&RosterEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &SteamId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SteamId, &RosterEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
