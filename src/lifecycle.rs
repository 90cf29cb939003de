//! Lifecycle: start and stop the transfer loop on a background thread.
//!
//! The controlling thread calls [`TransferSystem::start`],
//! [`TransferSystem::stop`] and [`TransferSystem::logs`]; at most one worker
//! thread runs the orchestrator loop. The only state both sides write is the
//! run flag. Each start raises a fresh flag, so stopping lowers exactly the
//! flag of the loop being stopped and a later start can't revive it.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use uuid::Uuid;

use crate::logbook::Logbook;
use crate::model::{LogEntry, TransferEvent};
use crate::orchestrator::TransferOrchestrator;

/// Cross-thread switch a running loop checks between suspensions.
#[derive(Debug, Clone)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    /// A new flag, already raised.
    pub fn raised() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn lower(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Sleep for `interval`, then report whether the flag is still raised.
    pub fn sleep(&self, interval: Duration) -> bool {
        thread::sleep(interval);
        self.is_raised()
    }
}

/// Whether the background loop is meant to be running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorState {
    Stopped,
    Running,
}

/// Result of asking the system to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new background loop was launched.
    Started,

    /// A loop was already running; nothing changed.
    AlreadyRunning,
}

/// Owns the orchestrator and the background thread that drives it.
pub struct TransferSystem {
    orchestrator: Arc<Mutex<TransferOrchestrator>>,
    logbook: Logbook,
    current: Mutex<Option<RunFlag>>,
}

impl TransferSystem {
    pub fn new(orchestrator: TransferOrchestrator) -> Self {
        Self {
            logbook: orchestrator.logbook(),
            orchestrator: Arc::new(Mutex::new(orchestrator)),
            current: Mutex::new(None),
        }
    }

    /// Launch the transfer loop unless it is already running.
    ///
    /// Fails only if the worker thread can't be spawned.
    pub fn start(&self) -> io::Result<StartOutcome> {
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(RunFlag::is_raised) {
            tracing::info!("transfer system is already running");
            return Ok(StartOutcome::AlreadyRunning);
        }

        let flag = RunFlag::raised();
        let run = Uuid::new_v4();
        self.logbook.append(TransferEvent::Started { run });

        let worker_flag = flag.clone();
        let orchestrator = Arc::clone(&self.orchestrator);
        let spawned = thread::Builder::new()
            .name("transfer-loop".into())
            .spawn(move || {
                let _span = tracing::info_span!("transfer_loop", %run).entered();
                // A loop from an earlier start may still be finishing its
                // cycle; holding the orchestrator keeps the two apart.
                orchestrator.lock().run_loop(&worker_flag);
                tracing::info!("transfer loop exited");
            });

        if let Err(e) = spawned {
            tracing::error!(error = %e, "failed to spawn transfer loop");
            self.logbook.append(TransferEvent::Stopped);
            return Err(e);
        }

        tracing::info!(%run, "transfer system started");
        *current = Some(flag);
        Ok(StartOutcome::Started)
    }

    /// Ask the loop to stop. Returns without waiting for it.
    ///
    /// The loop notices within one polling interval, after any command
    /// already in flight has finished.
    pub fn stop(&self) {
        if let Some(flag) = self.current.lock().take() {
            flag.lower();
        }
        self.logbook.append(TransferEvent::Stopped);
        tracing::info!("transfer system stopped");
    }

    pub fn state(&self) -> OrchestratorState {
        if self.current.lock().as_ref().is_some_and(RunFlag::is_raised) {
            OrchestratorState::Running
        } else {
            OrchestratorState::Stopped
        }
    }

    /// Snapshot of every log entry so far, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.logbook.snapshot()
    }

    /// Shared handle for following new entries as they arrive.
    pub fn logbook(&self) -> &Logbook {
        &self.logbook
    }
}

impl Drop for TransferSystem {
    fn drop(&mut self) {
        if let Some(flag) = self.current.get_mut().take() {
            flag.lower();
        }
    }
}
