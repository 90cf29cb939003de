//! Device channel: run commands on, and pull files from, the remote device.
//!
//! A channel is plain request/response. It keeps no state and never retries;
//! callers decide what a failure means for them.

mod adb;
#[cfg(test)]
pub mod scripted;

use std::path::Path;
use std::time::Duration;

pub use adb::Adb;

/// Errors a channel can report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// The channel tool itself could not be run (missing binary, bad path).
    #[error("failed to launch channel: {0}")]
    LaunchFailure(String),

    /// The command ran on the device but reported failure.
    #[error("command failed: {0}")]
    NonZeroExit(String),

    /// The command exceeded the configured timeout and was killed.
    #[error("command timed out after {}s", .0.as_secs_f64())]
    TimedOut(Duration),
}

pub type Result<T> = core::result::Result<T, ChannelError>;

/// The two operations the transfer system needs from a device.
pub trait DeviceChannel: Send + Sync {
    /// Run `command` on the device and return its trimmed standard output.
    fn run_command(&self, command: &str) -> Result<String>;

    /// Copy `remote` from the device into `local` (a file or directory path).
    fn pull_file(&self, remote: &str, local: &Path) -> Result<()>;
}
