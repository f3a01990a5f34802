//! Availability of friends and of the local user.
//!
//! The transport reports availability as a flag plus an "away" sub-flag.
//! [`PresenceStatus::from_availability`] folds the two into the three states
//! the application sees. [`OutboundPresence::for_status`] goes the other way
//! when the local user changes status.

use std::fmt;

use crate::address::Address;

/// Three-valued presence of a friend or of the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceStatus {
    /// Available and active.
    Online,
    /// Available but marked away.
    Away,
    /// Not available.
    Offline,
}

impl PresenceStatus {
    /// Classify a raw availability flag and away sub-flag.
    ///
    /// `is_away` only matters when `is_available` is set: an unavailable
    /// contact is offline whatever its mode says.
    pub const fn from_availability(is_available: bool, is_away: bool) -> Self {
        match (is_available, is_away) {
            (false, _) => Self::Offline,
            (true, true) => Self::Away,
            (true, false) => Self::Online,
        }
    }

    /// True for [`Online`](Self::Online) and [`Away`](Self::Away).
    pub const fn is_available(self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Away => write!(f, "away"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Presence stanza type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceType {
    /// `available`
    Available,
    /// `unavailable`
    Unavailable,
}

/// Presence stanza mode (`<show/>`).
///
/// Only `away` is ever announced; the other XMPP modes have no status to map
/// from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresenceMode {
    /// `away`: temporarily away.
    Away,
}

/// Presence stanza sent when the local user changes status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutboundPresence {
    /// Stanza type.
    pub kind: PresenceType,
    /// Stanza mode, absent for plain availability.
    pub mode: Option<PresenceMode>,
}

impl OutboundPresence {
    /// Stanza announcing `status`.
    pub const fn for_status(status: PresenceStatus) -> Self {
        match status {
            PresenceStatus::Offline => Self { kind: PresenceType::Unavailable, mode: None },
            PresenceStatus::Away => {
                Self { kind: PresenceType::Available, mode: Some(PresenceMode::Away) }
            },
            PresenceStatus::Online => Self { kind: PresenceType::Available, mode: None },
        }
    }
}

/// Presence as reported by the transport for one address.
///
/// `status_text` carries the friend's JSON session payload, see
/// [`decode_session`](crate::session::decode_session).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    /// Sender, usually a full address with a resource.
    pub from: Address,
    /// Availability flag.
    pub available: bool,
    /// Away sub-flag.
    pub away: bool,
    /// Resource priority, used by the transport to pick the best presence.
    pub priority: i8,
    /// Free-text status.
    pub status_text: Option<String>,
}

impl PresenceRecord {
    /// Available presence with no mode and no status text.
    pub fn available(from: Address) -> Self {
        Self { from, available: true, away: false, priority: 0, status_text: None }
    }

    /// Unavailable presence, also what the transport reports for unknown
    /// contacts.
    pub fn unavailable(from: Address) -> Self {
        Self { from, available: false, away: false, priority: 0, status_text: None }
    }

    /// Set the away sub-flag.
    #[must_use]
    pub fn with_away(mut self, away: bool) -> Self {
        self.away = away;
        self
    }

    /// Set the resource priority.
    #[must_use]
    pub fn with_priority(mut self, priority: i8) -> Self {
        self.priority = priority;
        self
    }

    /// Set the free-text status.
    #[must_use]
    pub fn with_status_text(mut self, text: impl Into<String>) -> Self {
        self.status_text = Some(text.into());
        self
    }

    /// Classified status of this record.
    pub const fn status(&self) -> PresenceStatus {
        PresenceStatus::from_availability(self.available, self.away)
    }
}
