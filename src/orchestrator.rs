//! Transfer orchestration: the cycle that turns "call ended" into a pulled file.
//!
//! One cycle waits for the current call to end, picks the newest recording,
//! and pulls it unless the ledger says it was already pulled. Incoming
//! recordings take priority: outgoing is only looked at when the incoming
//! directory is empty, even if the incoming recording was already pulled.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::{ChannelError, DeviceChannel};
use crate::detector::CallStateDetector;
use crate::ledger::TransferLedger;
use crate::lifecycle::RunFlag;
use crate::locator::{DEFAULT_REMOTE_ROOT, RecordingLocator};
use crate::logbook::Logbook;
use crate::model::{RecordingCategory, RecordingId, TransferEvent};

/// Tunables for a transfer orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Recordings root on the device.
    pub remote_root: String,

    /// Local directory recordings are pulled into.
    pub destination: PathBuf,

    /// Delay between call-state polls.
    pub call_poll: Duration,

    /// Delay between transfer cycles.
    pub cycle_poll: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_root: DEFAULT_REMOTE_ROOT.to_string(),
            destination: PathBuf::from("."),
            call_poll: Duration::from_secs(5),
            cycle_poll: Duration::from_secs(10),
        }
    }
}

/// What a single cycle ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// A new recording was pulled.
    Transferred {
        category: RecordingCategory,
        id: RecordingId,
    },

    /// The newest recording had been pulled before.
    AlreadyTransferred {
        category: RecordingCategory,
        id: RecordingId,
    },

    /// The pull failed; the recording will be tried again next cycle.
    PullFailed {
        category: RecordingCategory,
        id: RecordingId,
        error: ChannelError,
    },

    /// Neither directory had a recording.
    NothingFound,

    /// The system was stopped while waiting for the call to end.
    Cancelled,
}

/// Runs transfer cycles against one device.
pub struct TransferOrchestrator {
    channel: Arc<dyn DeviceChannel>,
    detector: CallStateDetector,
    locator: RecordingLocator,
    ledger: TransferLedger,
    destination: PathBuf,
    cycle_poll: Duration,
    logbook: Logbook,
}

impl TransferOrchestrator {
    pub fn new(channel: Arc<dyn DeviceChannel>, settings: Settings) -> Self {
        Self {
            detector: CallStateDetector::new(Arc::clone(&channel), settings.call_poll),
            locator: RecordingLocator::new(Arc::clone(&channel), settings.remote_root),
            channel,
            ledger: TransferLedger::new(),
            destination: settings.destination,
            cycle_poll: settings.cycle_poll,
            logbook: Logbook::new(),
        }
    }

    /// Handle to the logbook this orchestrator writes to.
    pub fn logbook(&self) -> Logbook {
        self.logbook.clone()
    }

    /// Run one cycle: wait for the call to end, then transfer if there is
    /// something new.
    pub fn run_cycle(&mut self, flag: &RunFlag) -> CycleOutcome {
        if self.detector.await_call_end(flag).is_none() {
            return CycleOutcome::Cancelled;
        }

        let found = self
            .locator
            .latest_recording(RecordingCategory::Incoming)
            .map(|id| (RecordingCategory::Incoming, id))
            .or_else(|| {
                self.locator
                    .latest_recording(RecordingCategory::Outgoing)
                    .map(|id| (RecordingCategory::Outgoing, id))
            });

        let Some((category, id)) = found else {
            tracing::info!("no recordings found");
            self.logbook.append(TransferEvent::NoRecordings);
            return CycleOutcome::NothingFound;
        };

        self.transfer(category, id)
    }

    /// Run cycles until `flag` is lowered, sleeping between them.
    pub fn run_loop(&mut self, flag: &RunFlag) {
        while flag.is_raised() {
            let outcome = self.run_cycle(flag);
            tracing::debug!(?outcome, "cycle complete");

            if outcome == CycleOutcome::Cancelled || !flag.sleep(self.cycle_poll) {
                break;
            }
        }
    }

    fn transfer(&mut self, category: RecordingCategory, id: RecordingId) -> CycleOutcome {
        if self.ledger.already_transferred(&id) {
            tracing::info!(%category, %id, "recording already transferred");
            self.logbook.append(TransferEvent::AlreadyTransferred {
                category,
                id: id.clone(),
            });
            return CycleOutcome::AlreadyTransferred { category, id };
        }

        let remote = self.locator.remote_path(category, &id);
        match self.channel.pull_file(&remote, &self.destination) {
            Ok(()) => {
                self.logbook.append(TransferEvent::Transferred {
                    category,
                    id: id.clone(),
                });
                self.ledger.mark_transferred(id.clone());
                tracing::info!(
                    %category,
                    %id,
                    destination = %self.destination.display(),
                    total = self.ledger.len(),
                    "recording transferred"
                );
                CycleOutcome::Transferred { category, id }
            }
            Err(error) => {
                tracing::warn!(%category, %id, %error, "recording transfer failed");
                self.logbook.append(TransferEvent::TransferFailed {
                    category,
                    id: id.clone(),
                    error: error.to_string(),
                });
                CycleOutcome::PullFailed {
                    category,
                    id,
                    error,
                }
            }
        }
    }
}
