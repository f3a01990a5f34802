//! Model world.
//!
//! Tracks what the server side knows (roster, per-resource presences, the
//! connection) and what the application must have seen as a result.

use std::collections::{BTreeMap, BTreeSet};

use partyline_proto::{FriendSession, OutboundPresence, PresenceMode, PresenceStatus, PresenceType};

use super::operation::{
    FriendId, ModelStatus, Operation, OperationResult, PayloadKind, ResourceId, friend_account,
};

/// Something the application observed through its handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// Roster snapshot.
    FriendsList(BTreeSet<String>),
    /// Friend presence.
    Presence {
        /// Friend.
        account_id: String,
        /// Classified status.
        status: PresenceStatus,
        /// Decoded session.
        session: Option<FriendSession>,
    },
    /// Inbound chat message.
    Chat {
        /// Sender.
        account_id: String,
        /// Body.
        body: String,
    },
}

/// Observable state for oracle comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservableState {
    /// Handler invocations, in order.
    pub events: Vec<Observed>,
    /// Cached sent bodies per correspondent with history.
    pub sent: BTreeMap<String, Vec<String>>,
    /// Cached received bodies per correspondent with history.
    pub received: BTreeMap<String, Vec<String>>,
    /// Presences the local user announced.
    pub announced: Vec<OutboundPresence>,
}

#[derive(Debug, Clone, Copy)]
struct ModelPresence {
    available: bool,
    away: bool,
    priority: i8,
    payload: PayloadKind,
}

/// Model world - the reference implementation.
#[derive(Debug, Clone)]
pub struct ModelWorld {
    roster: BTreeSet<&'static str>,
    presences: BTreeMap<&'static str, BTreeMap<ResourceId, ModelPresence>>,
    connected: bool,
    events: Vec<Observed>,
    sent: BTreeMap<String, Vec<String>>,
    received: BTreeMap<String, Vec<String>>,
    announced: Vec<OutboundPresence>,
}

impl Default for ModelWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelWorld {
    /// Connected world with an empty roster.
    pub fn new() -> Self {
        Self {
            roster: BTreeSet::new(),
            presences: BTreeMap::new(),
            connected: true,
            events: Vec::new(),
            sent: BTreeMap::new(),
            received: BTreeMap::new(),
            announced: Vec::new(),
        }
    }

    /// Apply an operation and return the result.
    pub fn apply(&mut self, op: &Operation) -> OperationResult {
        match *op {
            Operation::AddFriend { friend } => {
                self.roster.insert(friend_account(friend));
                self.emit_roster();
            },
            Operation::UpdateFriend { .. } => self.emit_roster(),
            Operation::RemoveFriend { friend } => {
                let account = friend_account(friend);
                self.roster.remove(account);
                self.presences.remove(account);
                self.emit_roster();
            },
            Operation::SetPresence { friend, resource, available, away, priority, payload } => {
                self.apply_presence(friend, resource, ModelPresence {
                    available,
                    away,
                    priority: priority.rem_euclid(3),
                    payload,
                });
            },
            Operation::ReceiveMessage { friend, body, chat } => {
                if chat {
                    let account_id = friend_account(friend).to_string();
                    self.received.entry(account_id.clone()).or_default().push(body.text());
                    self.events.push(Observed::Chat { account_id, body: body.text() });
                }
            },
            Operation::SendChat { friend, body } => {
                if !self.connected {
                    return OperationResult::NotConnected;
                }
                self.sent.entry(friend_account(friend).to_string()).or_default().push(body.text());
            },
            Operation::UpdateStatus { status } => {
                if !self.connected {
                    return OperationResult::NotConnected;
                }
                self.announced.push(announcement(status));
            },
            Operation::SetConnected { connected } => self.connected = connected,
        }

        OperationResult::Ok
    }

    /// Extract observable state for comparison.
    pub fn observable_state(&self) -> ObservableState {
        ObservableState {
            events: self.events.clone(),
            sent: self.sent.clone(),
            received: self.received.clone(),
            announced: self.announced.clone(),
        }
    }

    /// Current roster.
    pub fn roster(&self) -> BTreeSet<String> {
        self.roster.iter().map(|account| (*account).to_string()).collect()
    }

    fn emit_roster(&mut self) {
        let snapshot = self.roster();
        self.events.push(Observed::FriendsList(snapshot));
    }

    fn apply_presence(&mut self, friend: FriendId, resource: ResourceId, presence: ModelPresence) {
        let account = friend_account(friend);
        let resources = self.presences.entry(account).or_default();
        resources.insert(resource % 3, presence);

        // Highest priority, then present over away, then first resource
        let mut best: Option<ModelPresence> = None;
        for candidate in resources.values().filter(|p| p.available) {
            let replaces = match best {
                None => true,
                Some(current) => {
                    candidate.priority > current.priority
                        || (candidate.priority == current.priority && current.away && !candidate.away)
                },
            };
            if replaces {
                best = Some(*candidate);
            }
        }

        let (status, session) = match best {
            None => (PresenceStatus::Offline, None),
            Some(p) if p.away => (PresenceStatus::Away, p.payload.expected_session()),
            Some(p) => (PresenceStatus::Online, p.payload.expected_session()),
        };

        self.events.push(Observed::Presence { account_id: account.to_string(), status, session });
    }
}

fn announcement(status: ModelStatus) -> OutboundPresence {
    match status {
        ModelStatus::Online => OutboundPresence { kind: PresenceType::Available, mode: None },
        ModelStatus::Away => {
            OutboundPresence { kind: PresenceType::Available, mode: Some(PresenceMode::Away) }
        },
        ModelStatus::Offline => OutboundPresence { kind: PresenceType::Unavailable, mode: None },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::operation::SmallBody;

    #[test]
    fn every_roster_change_snapshots_full_roster() {
        let mut world = ModelWorld::new();
        world.apply(&Operation::AddFriend { friend: 0 });
        world.apply(&Operation::AddFriend { friend: 1 });
        world.apply(&Operation::RemoveFriend { friend: 0 });

        let state = world.observable_state();
        assert_eq!(state.events.len(), 3);
        assert_eq!(
            state.events[2],
            Observed::FriendsList(BTreeSet::from(["jo smith".to_string()]))
        );
    }

    #[test]
    fn sends_fail_while_disconnected() {
        let mut world = ModelWorld::new();
        world.apply(&Operation::SetConnected { connected: false });

        let result = world.apply(&Operation::SendChat { friend: 0, body: SmallBody { seed: 1 } });
        assert_eq!(result, OperationResult::NotConnected);
        assert!(world.observable_state().sent.is_empty());
    }

    #[test]
    fn away_resource_loses_to_present_one() {
        let mut world = ModelWorld::new();
        let presence = |resource, away| Operation::SetPresence {
            friend: 0,
            resource,
            available: true,
            away,
            priority: 0,
            payload: PayloadKind::Absent,
        };
        world.apply(&presence(0, true));
        world.apply(&presence(1, false));

        let last = world.observable_state().events.pop();
        assert!(matches!(last, Some(Observed::Presence { status: PresenceStatus::Online, .. })));
    }
}
