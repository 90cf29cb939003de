//! Recording lookup: find the newest recording in a category directory.
//!
//! "Newest" is the last entry of the device's `ls` output, in whatever
//! order the device lists it. Nothing is sorted by timestamp.

use std::sync::Arc;

use crate::channel::DeviceChannel;
use crate::model::{RecordingCategory, RecordingId};

/// Where the recording app stores calls on the device.
pub const DEFAULT_REMOTE_ROOT: &str = "/sdcard/Documents/voix";

/// Lists recording directories on the device.
pub struct RecordingLocator {
    channel: Arc<dyn DeviceChannel>,
    root: String,
}

impl RecordingLocator {
    /// Creates a locator for recordings under `root` (no trailing slash needed).
    pub fn new(channel: Arc<dyn DeviceChannel>, root: impl Into<String>) -> Self {
        let mut root = root.into();
        while root.len() > 1 && root.ends_with('/') {
            root.pop();
        }
        Self { channel, root }
    }

    /// Remote directory for a category, with trailing slash.
    pub fn directory(&self, category: RecordingCategory) -> String {
        format!("{}/{}/", self.root, category.dir_name())
    }

    /// Remote path of a recording.
    pub fn remote_path(&self, category: RecordingCategory, id: &RecordingId) -> String {
        format!("{}{id}", self.directory(category))
    }

    /// The last-listed recording in `category`, if the directory has any.
    ///
    /// A listing failure counts as "nothing found".
    pub fn latest_recording(&self, category: RecordingCategory) -> Option<RecordingId> {
        let dir = self.directory(category);
        let listing = match self.channel.run_command(&format!("ls {dir}")) {
            Ok(listing) => listing,
            Err(e) => {
                tracing::debug!(%category, error = %e, "listing recordings failed");
                return None;
            }
        };

        listing
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .map(RecordingId::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::channel::ChannelError;
    use crate::channel::scripted::ScriptedChannel;

    const INCOMING_LS: &str = "ls /sdcard/Documents/voix/incoming/";
    const OUTGOING_LS: &str = "ls /sdcard/Documents/voix/outgoing/";

    fn locator(channel: &Arc<ScriptedChannel>) -> RecordingLocator {
        RecordingLocator::new(Arc::clone(channel) as Arc<dyn DeviceChannel>, DEFAULT_REMOTE_ROOT)
    }

    #[test]
    fn directories_match_device_layout() {
        let channel = Arc::new(ScriptedChannel::new());
        let locator = locator(&channel);

        assert_eq!(
            locator.directory(RecordingCategory::Incoming),
            "/sdcard/Documents/voix/incoming/"
        );
        assert_eq!(
            locator.remote_path(RecordingCategory::Outgoing, &"rec2.amr".into()),
            "/sdcard/Documents/voix/outgoing/rec2.amr"
        );
    }

    #[test]
    fn trailing_slashes_on_root_are_ignored() {
        let channel = Arc::new(ScriptedChannel::new());
        let locator = RecordingLocator::new(channel, "/sdcard/rec//");

        assert_eq!(locator.directory(RecordingCategory::Incoming), "/sdcard/rec/incoming/");
    }

    #[test]
    fn latest_is_last_listed_not_sorted() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond(INCOMING_LS, "zeta.amr\nalpha.amr\nmid.amr\n");

        let latest = locator(&channel).latest_recording(RecordingCategory::Incoming);

        assert_eq!(latest, Some(RecordingId::from("mid.amr")));
        assert_eq!(channel.commands(), vec![INCOMING_LS.to_string()]);
    }

    #[test]
    fn empty_listing_is_none() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.respond(OUTGOING_LS, "").respond(OUTGOING_LS, "\n  \n");

        let locator = locator(&channel);
        assert_eq!(locator.latest_recording(RecordingCategory::Outgoing), None);
        assert_eq!(locator.latest_recording(RecordingCategory::Outgoing), None);
    }

    #[test]
    fn channel_error_is_none() {
        let channel = Arc::new(ScriptedChannel::new());
        channel.fail(
            INCOMING_LS,
            ChannelError::NonZeroExit("No such file or directory".into()),
        );

        assert_eq!(
            locator(&channel).latest_recording(RecordingCategory::Incoming),
            None
        );
    }
}
