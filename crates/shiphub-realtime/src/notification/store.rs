//! In-memory notification feed with unread accounting.

use std::collections::VecDeque;

use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::debug;

use shiphub_core::config::NotificationFeedConfig;
use shiphub_entity::notification::Notification;

/// Capacity of the new-notification broadcast channel.
const ADDED_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Default)]
struct Feed {
    /// Newest first.
    entries: VecDeque<Notification>,
    /// Maintained incrementally.
    unread: usize,
}

impl Feed {
    fn counted_unread(&self) -> usize {
        self.entries.iter().filter(|n| n.is_unread()).count()
    }
}

/// Ordered, newest-first notification feed.
///
/// `unread_count()` always equals the number of unread entries. It is kept
/// incrementally and checked against a full count in debug builds.
#[derive(Debug)]
pub struct NotificationStore {
    feed: RwLock<Feed>,
    /// Maximum entries; `0` is unbounded.
    max_len: usize,
    added_tx: broadcast::Sender<Notification>,
}

impl NotificationStore {
    /// Creates an empty feed. `max_len == 0` keeps it unbounded.
    pub fn new(max_len: usize) -> Self {
        let (added_tx, _) = broadcast::channel(ADDED_CHANNEL_CAPACITY);
        Self {
            feed: RwLock::new(Feed::default()),
            max_len,
            added_tx,
        }
    }

    /// Creates a feed from configuration.
    pub fn from_config(config: &NotificationFeedConfig) -> Self {
        Self::new(config.max_feed_len)
    }

    /// Prepends a notification, evicting the oldest entry when bounded.
    pub fn add_notification(&self, notification: Notification) {
        {
            let mut feed = self.feed.write();
            if notification.is_unread() {
                feed.unread += 1;
            }
            feed.entries.push_front(notification.clone());

            if self.max_len > 0 && feed.entries.len() > self.max_len {
                if let Some(evicted) = feed.entries.pop_back() {
                    if evicted.is_unread() {
                        feed.unread = feed.unread.saturating_sub(1);
                    }
                    debug!(notification_id = %evicted.id, "Evicted oldest notification");
                }
            }

            debug_assert_eq!(feed.unread, feed.counted_unread());
        }

        debug!(
            notification_id = %notification.id,
            kind = %notification.kind,
            "Notification added"
        );
        // No subscribers is fine.
        let _ = self.added_tx.send(notification);
    }

    /// Marks one notification read. Returns `false` (and changes nothing)
    /// when the id is unknown or the entry is already read.
    pub fn mark_as_read(&self, id: &str) -> bool {
        let mut feed = self.feed.write();
        let Some(entry) = feed.entries.iter_mut().find(|n| n.id == id) else {
            return false;
        };
        if entry.is_read {
            return false;
        }

        entry.is_read = true;
        feed.unread = feed.unread.saturating_sub(1);
        debug_assert_eq!(feed.unread, feed.counted_unread());
        true
    }

    /// Marks every notification read.
    pub fn mark_all_as_read(&self) {
        let mut feed = self.feed.write();
        for entry in feed.entries.iter_mut() {
            entry.is_read = true;
        }
        feed.unread = 0;
    }

    /// Empties the feed.
    pub fn clear_notifications(&self) {
        let mut feed = self.feed.write();
        feed.entries.clear();
        feed.unread = 0;
    }

    /// Number of unread notifications.
    pub fn unread_count(&self) -> usize {
        self.feed.read().unread
    }

    /// Number of notifications.
    pub fn len(&self) -> usize {
        self.feed.read().entries.len()
    }

    /// Whether the feed is empty.
    pub fn is_empty(&self) -> bool {
        self.feed.read().entries.is_empty()
    }

    /// Copy of the feed, newest first.
    pub fn snapshot(&self) -> Vec<Notification> {
        self.feed.read().entries.iter().cloned().collect()
    }

    /// Looks up a notification by id.
    pub fn get(&self, id: &str) -> Option<Notification> {
        self.feed.read().entries.iter().find(|n| n.id == id).cloned()
    }

    /// Maximum feed length (`0` = unbounded).
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Receives every notification added from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.added_tx.subscribe()
    }
}

impl Default for NotificationStore {
    fn default() -> Self {
        Self::new(0)
    }
}
