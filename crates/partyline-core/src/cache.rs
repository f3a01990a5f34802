//! Per-correspondent chat history.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::transport::Direction;

/// Append-only message bodies, keyed by correspondent account id.
///
/// Sent and received messages live in two independent maps, each behind its
/// own lock. Locks are held only for the append or the copy-out.
#[derive(Debug, Default)]
pub struct MessageCache {
    sent: Mutex<HashMap<String, Vec<String>>>,
    received: Mutex<HashMap<String, Vec<String>>>,
}

impl MessageCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `body` as exchanged with `account_id` in `direction`.
    pub fn append(&self, direction: Direction, account_id: &str, body: &str) {
        self.map(direction)
            .lock()
            .entry(account_id.to_string())
            .or_default()
            .push(body.to_string());
    }

    /// Bodies exchanged with `account_id` in `direction`, oldest first.
    ///
    /// Empty for correspondents with no history.
    pub fn bodies(&self, direction: Direction, account_id: &str) -> Vec<String> {
        self.map(direction).lock().get(account_id).cloned().unwrap_or_default()
    }

    fn map(&self, direction: Direction) -> &Mutex<HashMap<String, Vec<String>>> {
        match direction {
            Direction::Inbound => &self.received,
            Direction::Outbound => &self.sent,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::{sync::Arc, thread};

    use proptest::prelude::*;

    use super::*;

    #[test]
    fn unknown_correspondent_is_empty() {
        let cache = MessageCache::new();
        cache.append(Direction::Inbound, "abc123", "hey");
        assert!(cache.bodies(Direction::Inbound, "nobody").is_empty());
    }

    #[test]
    fn directions_are_independent() {
        let cache = MessageCache::new();
        cache.append(Direction::Outbound, "abc123", "hi");
        cache.append(Direction::Inbound, "abc123", "hey");

        assert_eq!(cache.bodies(Direction::Outbound, "abc123"), ["hi"]);
        assert_eq!(cache.bodies(Direction::Inbound, "abc123"), ["hey"]);
    }

    #[test]
    fn concurrent_appends_keep_every_entry_in_thread_order() {
        let cache = Arc::new(MessageCache::new());

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..250 {
                        cache.append(Direction::Inbound, "peer", &format!("{t}:{i}"));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let bodies = cache.bodies(Direction::Inbound, "peer");
        assert_eq!(bodies.len(), 1000);
        for t in 0..4 {
            let prefix = format!("{t}:");
            let seen: Vec<usize> = bodies
                .iter()
                .filter_map(|b| b.strip_prefix(&prefix))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(seen, (0..250).collect::<Vec<_>>(), "thread {t} out of order");
        }
    }

    proptest! {
        #[test]
        fn prop_bodies_preserve_append_order(
            entries in prop::collection::vec(("[a-c]", ".{0,8}"), 0..40)
        ) {
            let cache = MessageCache::new();
            for (peer, body) in &entries {
                cache.append(Direction::Outbound, peer, body);
            }

            for peer in ["a", "b", "c"] {
                let expected: Vec<String> = entries
                    .iter()
                    .filter(|(p, _)| p == peer)
                    .map(|(_, b)| b.clone())
                    .collect();
                prop_assert_eq!(cache.bodies(Direction::Outbound, peer), expected);
            }
        }
    }
}
