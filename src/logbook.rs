//! Logbook: the user-facing record of what the transfer system did.
//!
//! Appended to by the background loop, read by whoever drives the system.
//! Readers get snapshots; they never hold the lock while formatting.

use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::Mutex;

use crate::model::{LogEntry, TransferEvent};

/// Shared, append-only list of log entries. Cloning shares the same list.
#[derive(Debug, Clone, Default)]
pub struct Logbook {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logbook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event`, stamped with the current time.
    pub fn append(&self, event: TransferEvent) {
        let entry = LogEntry {
            at: Timestamp::now(),
            event,
        };
        self.entries.lock().push(entry);
    }

    /// Copy of every entry so far, oldest first.
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Copy of entries from index `from` on. Empty if there are none yet.
    pub fn since(&self, from: usize) -> Vec<LogEntry> {
        self.entries
            .lock()
            .get(from..)
            .map(<[LogEntry]>::to_vec)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::thread;

    #[test]
    fn entries_keep_insertion_order() {
        let logbook = Logbook::new();
        logbook.append(TransferEvent::NoRecordings);
        logbook.append(TransferEvent::Stopped);

        let events: Vec<_> = logbook.snapshot().into_iter().map(|e| e.event).collect();
        assert_eq!(events, vec![TransferEvent::NoRecordings, TransferEvent::Stopped]);
    }

    #[test]
    fn since_returns_only_new_entries() {
        let logbook = Logbook::new();
        assert!(logbook.since(0).is_empty());

        logbook.append(TransferEvent::NoRecordings);
        logbook.append(TransferEvent::Stopped);

        assert_eq!(logbook.since(1).len(), 1);
        assert!(logbook.since(2).is_empty());
        assert!(logbook.since(10).is_empty());
    }

    #[test]
    fn clones_share_entries_across_threads() {
        let logbook = Logbook::new();
        let writer = logbook.clone();

        thread::spawn(move || {
            for _ in 0..100 {
                writer.append(TransferEvent::NoRecordings);
            }
        })
        .join()
        .unwrap();

        assert_eq!(logbook.len(), 100);
        assert!(!logbook.is_empty());
    }
}
