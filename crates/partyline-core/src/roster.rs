//! Roster tracker.
//!
//! Turns transport roster events into application callbacks:
//!
//! - any membership change (added, updated, deleted) re-reads the full roster
//!   and emits it as one snapshot
//! - a presence change is resolved to the sender's best presence, classified
//!   and its status payload decoded
//!
//! The tracker keeps no state of its own. Every snapshot and every presence
//! lookup goes back to the transport.

use std::{collections::HashSet, sync::Arc};

use partyline_proto::{Address, PresenceRecord, PresenceStatus, decode_session};
use tracing::{debug, trace, warn};

use crate::{
    handler::{FriendHandler, FriendResource, PresenceEvent},
    transport::{ListenerId, RosterEvent, RosterListener, Transport},
};

struct TrackerState<T: Transport> {
    transport: Arc<T>,
    handler: Arc<dyn FriendHandler>,
}

impl<T: Transport> TrackerState<T> {
    fn publish_snapshot(&self) {
        let account_ids = self.friend_ids();
        debug!(friends = account_ids.len(), "roster snapshot");
        self.handler.on_friends_list_received(&account_ids, self);
    }

    fn publish_presence(&self, record: &PresenceRecord) {
        let Some(local) = record.from.local_part() else {
            trace!(from = %record.from, "ignoring presence without local part");
            return;
        };

        let bare = match Address::bare(local, self.transport.service_domain()) {
            Ok(bare) => bare,
            Err(e) => {
                trace!(from = %record.from, error = %e, "ignoring presence with unusable address");
                return;
            },
        };

        let event = self.resolve(&bare);
        trace!(account_id = %event.account_id, status = %event.status, "friend presence");
        self.handler.on_friend_presence_received(&event, self);
    }

    /// Classify and decode the best presence of `bare`.
    fn resolve(&self, bare: &Address) -> PresenceEvent {
        let best = self.transport.best_presence(bare);
        let status = best.status();
        let account_id = bare.account_id().unwrap_or_default();

        let session = if status == PresenceStatus::Offline {
            None
        } else {
            match decode_session(best.status_text.as_deref()) {
                Ok(session) => session,
                Err(e) => {
                    warn!(%account_id, error = %e, "undecodable status payload, dropping session");
                    None
                },
            }
        };

        PresenceEvent { account_id, status, session }
    }
}

impl<T: Transport> RosterListener for TrackerState<T> {
    fn on_roster_event(&self, event: &RosterEvent) {
        match event {
            RosterEvent::EntriesAdded(_)
            | RosterEvent::EntriesUpdated(_)
            | RosterEvent::EntriesDeleted(_) => self.publish_snapshot(),
            RosterEvent::PresenceChanged(record) => self.publish_presence(record),
        }
    }
}

impl<T: Transport> FriendResource for TrackerState<T> {
    fn friend_ids(&self) -> HashSet<String> {
        self.transport.roster_entries().iter().filter_map(Address::account_id).collect()
    }

    fn presence_of(&self, account_id: &str) -> Option<PresenceEvent> {
        let bare = Address::for_account(account_id, self.transport.service_domain()).ok()?;
        Some(self.resolve(&bare))
    }
}

/// Emits roster snapshots and friend presence to a [`FriendHandler`].
///
/// Registers itself as a roster listener on construction and deregisters on
/// [`close`](Self::close) or drop.
pub struct RosterTracker<T: Transport> {
    state: Arc<TrackerState<T>>,
    listener: Option<ListenerId>,
}

impl<T: Transport> RosterTracker<T> {
    /// Create a tracker and register it on `transport`.
    pub fn new(transport: Arc<T>, handler: Arc<dyn FriendHandler>) -> Self {
        let state = Arc::new(TrackerState { transport, handler });
        let as_listener: Arc<dyn RosterListener> = state.clone();
        let listener = state.transport.add_roster_listener(as_listener);
        debug!(?listener, "roster tracker registered");

        Self { state, listener: Some(listener) }
    }

    /// Stop receiving roster events. Idempotent.
    pub fn close(&mut self) {
        if let Some(listener) = self.listener.take() {
            self.state.transport.remove_roster_listener(listener);
            debug!(?listener, "roster tracker closed");
        }
    }

    /// True until [`close`](Self::close) has run.
    pub fn is_open(&self) -> bool {
        self.listener.is_some()
    }
}

impl<T: Transport> FriendResource for RosterTracker<T> {
    fn friend_ids(&self) -> HashSet<String> {
        self.state.friend_ids()
    }

    fn presence_of(&self, account_id: &str) -> Option<PresenceEvent> {
        self.state.presence_of(account_id)
    }
}

impl<T: Transport> Drop for RosterTracker<T> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<T: Transport> std::fmt::Debug for RosterTracker<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterTracker").field("listener", &self.listener).finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parking_lot::Mutex;
    use partyline_proto::Platform;

    use super::*;
    use crate::test_transport::FakeTransport;

    #[derive(Default)]
    struct Recorder {
        snapshots: Mutex<Vec<HashSet<String>>>,
        presences: Mutex<Vec<PresenceEvent>>,
    }

    impl FriendHandler for Recorder {
        fn on_friends_list_received(&self, account_ids: &HashSet<String>, _: &dyn FriendResource) {
            self.snapshots.lock().push(account_ids.clone());
        }

        fn on_friend_presence_received(&self, event: &PresenceEvent, _: &dyn FriendResource) {
            self.presences.lock().push(event.clone());
        }
    }

    fn addr(s: &str) -> Address {
        Address::parse(s).unwrap()
    }

    fn ids(list: &[&str]) -> HashSet<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn every_membership_change_emits_full_snapshot() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        transport.set_roster(vec![addr("a@d"), addr("b@d")]);
        transport.deliver_roster(&RosterEvent::EntriesAdded(vec![addr("b@d")]));
        transport.deliver_roster(&RosterEvent::EntriesUpdated(vec![addr("a@d")]));
        transport.set_roster(vec![addr("b@d")]);
        transport.deliver_roster(&RosterEvent::EntriesDeleted(vec![addr("a@d")]));

        let snapshots = recorder.snapshots.lock();
        assert_eq!(*snapshots, [ids(&["a", "b"]), ids(&["a", "b"]), ids(&["b"])]);
    }

    #[test]
    fn snapshot_skips_entries_without_local_part() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        transport.set_roster(vec![addr("gateway.d"), addr("jo\\20smith@d")]);
        transport.deliver_roster(&RosterEvent::EntriesAdded(vec![]));

        assert_eq!(recorder.snapshots.lock()[0], ids(&["jo smith"]));
    }

    #[test]
    fn presence_uses_best_presence_of_bare_address() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        let payload = r#"{"SessionId":"","Status":"Battle Royale Lobby","bIsPlaying":false,
            "bIsJoinable":false,"bHasVoiceSupport":false,"Properties":{
            "party.joininfodata.286331153_j":{"sourcePlatform":"WIN","partyId":"p","key":"k",
            "appId":"Fortnite"}}}"#;
        transport.set_best_presence(
            addr("abc123@d"),
            PresenceRecord::available(addr("abc123@d/V2:Fortnite:WIN"))
                .with_away(true)
                .with_status_text(payload),
        );

        // Triggering record carries no payload; the best presence does
        transport.deliver_roster(&RosterEvent::PresenceChanged(PresenceRecord::available(addr(
            "abc123@d/other",
        ))));

        let presences = recorder.presences.lock();
        assert_eq!(presences.len(), 1);
        assert_eq!(presences[0].account_id, "abc123");
        assert_eq!(presences[0].status, PresenceStatus::Away);
        let session = presences[0].session.as_ref().unwrap();
        assert_eq!(session.platform, Some(Platform::Windows));
        assert_eq!(session.status_text, "Battle Royale Lobby");
    }

    #[test]
    fn offline_presence_never_carries_session() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        let payload = r#"{"SessionId":"","Status":"","bIsPlaying":false,"bIsJoinable":false,"bHasVoiceSupport":false}"#;
        transport.set_best_presence(
            addr("abc123@d"),
            PresenceRecord::unavailable(addr("abc123@d/r")).with_status_text(payload),
        );
        transport.deliver_roster(&RosterEvent::PresenceChanged(PresenceRecord::unavailable(addr(
            "abc123@d/r",
        ))));

        let presences = recorder.presences.lock();
        assert_eq!(presences[0].status, PresenceStatus::Offline);
        assert_eq!(presences[0].session, None);
    }

    #[test]
    fn malformed_payload_degrades_to_no_session() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        transport.set_best_presence(
            addr("abc123@d"),
            PresenceRecord::available(addr("abc123@d/r")).with_status_text("{not json"),
        );
        transport.deliver_roster(&RosterEvent::PresenceChanged(PresenceRecord::available(addr(
            "abc123@d/r",
        ))));

        let presences = recorder.presences.lock();
        assert_eq!(presences[0].status, PresenceStatus::Online);
        assert_eq!(presences[0].session, None);
    }

    #[test]
    fn presence_without_local_part_is_dropped() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let _tracker = RosterTracker::new(transport.clone(), recorder.clone());

        transport.deliver_roster(&RosterEvent::PresenceChanged(PresenceRecord::available(addr(
            "d/server",
        ))));

        assert!(recorder.presences.lock().is_empty());
    }

    #[test]
    fn presence_of_unknown_friend_is_offline() {
        let transport = Arc::new(FakeTransport::new("d"));
        let tracker = RosterTracker::new(transport, Arc::new(crate::NoopHandler));

        let event = tracker.presence_of("stranger").unwrap();
        assert_eq!(event.status, PresenceStatus::Offline);
        assert_eq!(event.session, None);
        assert_eq!(tracker.presence_of(""), None);
    }

    #[test]
    fn close_deregisters_once() {
        let transport = Arc::new(FakeTransport::new("d"));
        let recorder = Arc::new(Recorder::default());
        let mut tracker = RosterTracker::new(transport.clone(), recorder.clone());

        tracker.close();
        tracker.close();
        assert!(!tracker.is_open());
        assert_eq!(transport.roster_listener_count(), 0);

        transport.deliver_roster(&RosterEvent::EntriesAdded(vec![]));
        assert!(recorder.snapshots.lock().is_empty());
    }
}
