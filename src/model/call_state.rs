//! Telephony call states as reported by the device.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single observation of the device's telephony state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallState {
    /// No call is active. A previous call, if any, has ended.
    NoCall,

    /// An outgoing call is in progress.
    OutgoingCall,

    /// An incoming call is in progress.
    IncomingCall,

    /// The status line could not be read or matched.
    Unknown,
}

impl fmt::Display for CallState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::NoCall => "no call",
            Self::OutgoingCall => "outgoing call",
            Self::IncomingCall => "incoming call",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}
