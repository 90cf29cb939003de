//! Call-state detection: poll the device until the current call has ended.
//!
//! Pure polling. There is no push notification from the device, so the
//! detector asks for the telephony state, sleeps, and asks again.

use std::sync::Arc;
use std::time::Duration;

use crate::channel::DeviceChannel;
use crate::lifecycle::RunFlag;
use crate::model::CallState;

/// Shell command that prints the telephony registry's call-state line.
pub const TELEPHONY_QUERY: &str = "dumpsys telephony.registry | grep mCallState";

/// Classify a raw status line.
///
/// Total: any line containing `mCallState=0` means no call, whatever else
/// it contains. Lines matching nothing are `Unknown`.
pub fn classify(line: &str) -> CallState {
    if line.contains("mCallState=0") {
        CallState::NoCall
    } else if line.contains("mCallState=1") {
        CallState::OutgoingCall
    } else if line.contains("mCallState=2") {
        CallState::IncomingCall
    } else {
        CallState::Unknown
    }
}

/// Watches a device's telephony state.
pub struct CallStateDetector {
    channel: Arc<dyn DeviceChannel>,
    interval: Duration,
}

impl CallStateDetector {
    pub fn new(channel: Arc<dyn DeviceChannel>, interval: Duration) -> Self {
        Self { channel, interval }
    }

    /// Query the device once and classify the first line of the answer.
    ///
    /// Channel failures are not errors here: the state is simply `Unknown`.
    pub fn poll_once(&self) -> CallState {
        match self.channel.run_command(TELEPHONY_QUERY) {
            Ok(output) => classify(output.lines().next().unwrap_or_default()),
            Err(e) => {
                tracing::debug!(error = %e, "telephony query failed");
                CallState::Unknown
            }
        }
    }

    /// Block until the device reports no active call.
    ///
    /// Returns `Some(CallState::NoCall)` once observed. The run flag is
    /// checked after every sleep; if it was lowered the wait is abandoned
    /// and `None` is returned.
    pub fn await_call_end(&self, flag: &RunFlag) -> Option<CallState> {
        tracing::debug!("waiting for call to end");

        loop {
            let state = self.poll_once();
            match state {
                CallState::NoCall => {
                    tracing::info!("call has ended");
                    return Some(state);
                }
                CallState::OutgoingCall | CallState::IncomingCall => {
                    tracing::info!(%state, "call in progress");
                }
                CallState::Unknown => tracing::warn!("unable to determine call state"),
            }

            if !flag.sleep(self.interval) {
                tracing::debug!("stopped while waiting for call to end");
                return None;
            }
        }
    }
}
