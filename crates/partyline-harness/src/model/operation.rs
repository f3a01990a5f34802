//! Operations for model-based testing.
//!
//! Operations represent everything the transport's server side or the local
//! application can do to a session. They are generated randomly by proptest
//! and applied to both the model and a real session.

use arbitrary::Arbitrary;
use partyline_proto::{Application, FriendSession, Platform, PresenceStatus};

/// Friend index, mapped onto a small fixed set of account ids.
pub type FriendId = u8;

/// Resource index, mapped onto a small fixed set of resource names.
pub type ResourceId = u8;

/// Account ids used by the model. Some need local-part escaping.
const ACCOUNTS: [&str; 4] = ["abc123", "jo smith", "d'artagnan", "zed@home"];

/// Account id of `friend`.
pub fn friend_account(friend: FriendId) -> &'static str {
    ACCOUNTS[usize::from(friend) % ACCOUNTS.len()]
}

/// Every account id the model can produce.
pub fn all_accounts() -> impl Iterator<Item = &'static str> {
    ACCOUNTS.into_iter()
}

/// Resource name of `resource`.
pub fn resource_name(resource: ResourceId) -> String {
    format!("r{}", resource % 3)
}

/// Status the local user can announce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum ModelStatus {
    /// Online.
    Online,
    /// Away.
    Away,
    /// Offline.
    Offline,
}

impl ModelStatus {
    /// Matching presence status.
    pub fn to_status(self) -> PresenceStatus {
        match self {
            Self::Online => PresenceStatus::Online,
            Self::Away => PresenceStatus::Away,
            Self::Offline => PresenceStatus::Offline,
        }
    }
}

/// Status payload a friend publishes, from a fixed catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub enum PayloadKind {
    /// No status text.
    Absent,
    /// Whitespace only.
    Blank,
    /// In the lobby with a two-person party.
    Lobby,
    /// In a match, no party info.
    InMatch,
    /// Not JSON.
    Broken,
}

impl PayloadKind {
    /// Status text put on the wire.
    pub fn text(self) -> Option<&'static str> {
        match self {
            Self::Absent => None,
            Self::Blank => Some("  \n"),
            Self::Lobby => Some(
                r#"{"SessionId":"","Status":"Battle Royale Lobby - 2 / 4","bIsPlaying":false,"bIsJoinable":true,"bHasVoiceSupport":false,"Properties":{"party.joininfodata.286331153_j":{"sourcePlatform":"PSN","partyId":"p-77","key":"k-77","appId":"Fortnite"},"Event_PartySize_s":"2","Event_PartyMaxSize_s":"4"}}"#,
            ),
            Self::InMatch => Some(
                r#"{"SessionId":"m-9","Status":"Playing Solo - 42 left","bIsPlaying":true,"bIsJoinable":false,"bHasVoiceSupport":true,"Properties":{"Event_PlayersAlive_s":"42"}}"#,
            ),
            Self::Broken => Some("{\"SessionId\":"),
        }
    }

    /// Session an available friend with this payload is expected to show.
    pub fn expected_session(self) -> Option<FriendSession> {
        match self {
            Self::Absent | Self::Blank | Self::Broken => None,
            Self::Lobby => Some(FriendSession {
                id: String::new(),
                status_text: "Battle Royale Lobby - 2 / 4".to_string(),
                is_playing: false,
                is_joinable: true,
                has_voice_support: false,
                party_member_count: Some(2),
                party_max_member_count: Some(4),
                party_id: Some("p-77".to_string()),
                party_key: Some("k-77".to_string()),
                platform: Some(Platform::PlayStation),
                application: Some(Application::GameClient),
                remaining_player_count: None,
            }),
            Self::InMatch => Some(FriendSession {
                id: "m-9".to_string(),
                status_text: "Playing Solo - 42 left".to_string(),
                is_playing: true,
                is_joinable: false,
                has_voice_support: true,
                remaining_player_count: Some(42),
                ..FriendSession::default()
            }),
        }
    }
}

/// Small chat body, expanded deterministically from a seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Arbitrary)]
pub struct SmallBody {
    /// Body seed.
    pub seed: u8,
}

impl SmallBody {
    /// Expand to the message body.
    pub fn text(self) -> String {
        format!("msg-{}", self.seed)
    }
}

/// Operations that can be applied to the system.
#[derive(Debug, Clone, Arbitrary)]
pub enum Operation {
    /// Server adds a contact to the roster.
    AddFriend {
        /// Contact added.
        friend: FriendId,
    },

    /// Server reports a changed roster entry.
    UpdateFriend {
        /// Contact updated.
        friend: FriendId,
    },

    /// Server removes a contact from the roster.
    RemoveFriend {
        /// Contact removed.
        friend: FriendId,
    },

    /// A contact's resource publishes a presence.
    SetPresence {
        /// Contact.
        friend: FriendId,
        /// Resource of the contact.
        resource: ResourceId,
        /// Availability flag.
        available: bool,
        /// Away sub-flag.
        away: bool,
        /// Priority, folded into 0..=2.
        priority: i8,
        /// Status payload.
        payload: PayloadKind,
    },

    /// A contact sends a message.
    ReceiveMessage {
        /// Sender.
        friend: FriendId,
        /// Body.
        body: SmallBody,
        /// Chat type when set, headline otherwise.
        chat: bool,
    },

    /// Local user sends a chat message.
    SendChat {
        /// Recipient.
        friend: FriendId,
        /// Body.
        body: SmallBody,
    },

    /// Local user changes status.
    UpdateStatus {
        /// New status.
        status: ModelStatus,
    },

    /// Connection goes down or comes back.
    SetConnected {
        /// New connection state.
        connected: bool,
    },
}

/// Result of applying an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationResult {
    /// Operation succeeded.
    Ok,

    /// A send was refused because the connection is down.
    NotConnected,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use partyline_proto::decode_session;

    use super::*;

    #[test]
    fn catalogue_decodes_to_expected_sessions() {
        for kind in [PayloadKind::Absent, PayloadKind::Blank, PayloadKind::Lobby, PayloadKind::InMatch]
        {
            assert_eq!(decode_session(kind.text()).unwrap(), kind.expected_session(), "{kind:?}");
        }
        assert!(decode_session(PayloadKind::Broken.text()).is_err());
    }

    #[test]
    fn friend_ids_wrap_around() {
        assert_eq!(friend_account(0), friend_account(4));
        assert_eq!(resource_name(5), "r2");
    }
}
