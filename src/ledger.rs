//! Transfer ledger: which recordings have already been pulled.
//!
//! Grows only. Lives in memory for the life of the process; a restart
//! forgets everything.

use std::collections::HashSet;

use crate::model::RecordingId;

/// Set of recordings already transferred.
///
/// Owned by a single orchestrator; not shared between threads.
#[derive(Debug, Default)]
pub struct TransferLedger {
    transferred: HashSet<RecordingId>,
}

impl TransferLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn already_transferred(&self, id: &RecordingId) -> bool {
        self.transferred.contains(id)
    }

    pub fn mark_transferred(&mut self, id: RecordingId) {
        self.transferred.insert(id);
    }

    pub fn len(&self) -> usize {
        self.transferred.len()
    }
}
