use super::model::{ChatEntry, EntryId, EntryOrigin};
use chrono::Utc;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Default)]
struct Inner {
    entries: Vec<ChatEntry>,
    last_id: u64,
}

/// Ordered, append-only log of chat entries.
///
/// The store performs no validation; it is a pure ordered sink. Reads return
/// snapshots, so a caller can re-read at any time to observe the current order.
#[derive(Debug, Default)]
pub struct TranscriptStore {
    inner: RwLock<Inner>,
}

impl TranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry and returns a copy of it.
    ///
    /// The id and timestamp are assigned under the same lock as the push, so
    /// ids follow insertion order.
    pub fn append(&self, origin: EntryOrigin, text: impl Into<String>) -> ChatEntry {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.last_id += 1;
        let entry = ChatEntry {
            id: EntryId(inner.last_id),
            text: text.into(),
            origin,
            created_at: Utc::now(),
        };
        inner.entries.push(entry.clone());
        tracing::debug!(
            "[TranscriptStore] appended {} ({:?}), len={}",
            entry.id,
            entry.origin,
            inner.entries.len()
        );
        entry
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Vec<ChatEntry> {
        self.read(|entries| entries.to_vec())
    }

    /// Entries appended after `id`, in insertion order.
    pub fn since(&self, id: EntryId) -> Vec<ChatEntry> {
        self.read(|entries| {
            let start = entries.partition_point(|e| e.id <= id);
            entries[start..].to_vec()
        })
    }

    pub fn last(&self) -> Option<ChatEntry> {
        self.read(|entries| entries.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.read(|entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read<R>(&self, f: impl FnOnce(&[ChatEntry]) -> R) -> R {
        let inner = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&inner.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_store_is_empty() {
        let store = TranscriptStore::new();
        assert!(store.is_empty());
        assert!(store.last().is_none());
    }

    #[test]
    fn test_append_preserves_order_and_ids() {
        let store = TranscriptStore::new();
        let first = store.append(EntryOrigin::User, "find coffee shops");
        let second = store.append(EntryOrigin::Assistant, "Here are 2 options");

        assert!(first.id < second.id);
        let entries = store.list();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0], first);
        assert_eq!(entries[1], second);
        assert!(entries[0].is_user());
        assert!(entries[1].is_assistant());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let store = TranscriptStore::new();
        store.append(EntryOrigin::User, "hello");
        store.append(EntryOrigin::User, "hello");
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_since_returns_newer_entries() {
        let store = TranscriptStore::new();
        let first = store.append(EntryOrigin::Assistant, "greeting");
        store.append(EntryOrigin::User, "a");
        store.append(EntryOrigin::Assistant, "b");

        let newer = store.since(first.id);
        assert_eq!(
            newer.iter().map(|e| e.text.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert!(store.since(EntryId(3)).is_empty());
        assert_eq!(store.since(EntryId(0)).len(), 3);
    }

    #[test]
    fn test_list_is_a_snapshot() {
        let store = TranscriptStore::new();
        store.append(EntryOrigin::User, "one");
        let snapshot = store.list();
        store.append(EntryOrigin::User, "two");
        assert_eq!(snapshot.len(), 1);
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn test_format_time_is_hour_minute() {
        let store = TranscriptStore::new();
        let entry = store.append(EntryOrigin::User, "x");
        let formatted = entry.format_time();
        assert_eq!(formatted.len(), 5);
        assert_eq!(&formatted[2..3], ":");
    }
}
