//! Logbook events: what the transfer system did, in the order it did it.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{RecordingCategory, RecordingId};

/// A single logbook entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: Timestamp,

    #[serde(flatten)]
    pub event: TransferEvent,
}

/// Something the transfer system did.
///
/// Tagged enum so each serialized entry is self-describing.
/// `Display` renders the human-readable form shown in logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TransferEvent {
    /// The background loop was launched.
    Started {
        /// Identifies this run in diagnostic logs.
        run: Uuid,
    },

    /// The background loop was asked to stop.
    Stopped,

    /// A recording was pulled to local storage.
    Transferred {
        category: RecordingCategory,
        id: RecordingId,
    },

    /// The latest recording had already been pulled; nothing was done.
    AlreadyTransferred {
        category: RecordingCategory,
        id: RecordingId,
    },

    /// A pull was attempted and failed. The recording stays eligible.
    TransferFailed {
        category: RecordingCategory,
        id: RecordingId,
        error: String,
    },

    /// Neither recording directory had anything in it.
    NoRecordings,
}

impl fmt::Display for TransferEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { .. } => f.write_str("transfer system started"),
            Self::Stopped => f.write_str("transfer system stopped"),
            Self::Transferred { category, id } => write!(f, "transferred {category}:{id}"),
            Self::AlreadyTransferred { category, id } => {
                write!(f, "{category} already transferred:{id}")
            }
            Self::TransferFailed {
                category,
                id,
                error,
            } => write!(f, "transfer failed {category}:{id}: {error}"),
            Self::NoRecordings => f.write_str("no recordings found"),
        }
    }
}
