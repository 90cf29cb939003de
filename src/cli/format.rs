//! Output formatting for CLI display.

use crate::model::{CallState, LogEntry};
use crate::orchestrator::CycleOutcome;

/// One log entry per line: UTC time, then the event.
pub(super) fn format_entry(entry: &LogEntry) -> String {
    format!("{}  {}", entry.at.strftime("%Y-%m-%d %H:%M:%SZ"), entry.event)
}

/// Short summary of what a foreground cycle did.
pub(super) fn format_outcome(outcome: &CycleOutcome) -> String {
    match outcome {
        CycleOutcome::Transferred { category, id } => format!("Transferred {category} recording {id}"),
        CycleOutcome::AlreadyTransferred { category, id } => {
            format!("Newest {category} recording {id} was already transferred")
        }
        CycleOutcome::PullFailed {
            category,
            id,
            error,
        } => format!("Failed to transfer {category} recording {id}: {error}"),
        CycleOutcome::NothingFound => "No recordings found".to_string(),
        CycleOutcome::Cancelled => "Cancelled".to_string(),
    }
}

pub(super) fn format_state(state: CallState) -> &'static str {
    match state {
        CallState::NoCall => "idle (no call)",
        CallState::OutgoingCall => "outgoing call in progress",
        CallState::IncomingCall => "incoming call in progress",
        CallState::Unknown => "unknown (could not read call state)",
    }
}
