//! Core data model for voix-transfer.
//!
//! These types describe what the transfer loop observes and records:
//! call states, recordings on the device, and logbook entries.

mod call_state;
mod event;
mod recording;

pub use call_state::CallState;
pub use event::{LogEntry, TransferEvent};
pub use recording::{RecordingCategory, RecordingId};
