//! Recordings on the device: which directory they live in, and their names.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which recording directory on the device a file was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingCategory {
    Incoming,
    Outgoing,
}

impl RecordingCategory {
    /// Directory name under the remote recordings root.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Incoming => "incoming",
            Self::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for RecordingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A recording's filename as listed on the device.
///
/// Opaque: two ids are the same recording only if the names match exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordingId(String);

impl From<&str> for RecordingId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for RecordingId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
