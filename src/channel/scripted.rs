//! In-memory channel that plays back scripted responses.
//!
//! Each command has a queue of responses. When the queue runs dry the
//! command's sticky response (if any) is returned forever after.
//! Everything the channel is asked to do is recorded for assertions.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{ChannelError, DeviceChannel, Result};

#[derive(Default)]
pub struct ScriptedChannel {
    queued: Mutex<HashMap<String, VecDeque<Result<String>>>>,
    sticky: Mutex<HashMap<String, Result<String>>>,
    pull_failures: Mutex<VecDeque<ChannelError>>,
    commands: Mutex<Vec<String>>,
    pulls: Mutex<Vec<(String, PathBuf)>>,
}

impl ScriptedChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one successful response for `command`.
    pub fn respond(&self, command: &str, output: &str) -> &Self {
        self.push(command, Ok(output.to_string()))
    }

    /// Queue one failure for `command`.
    pub fn fail(&self, command: &str, error: ChannelError) -> &Self {
        self.push(command, Err(error))
    }

    /// Answer `command` with `output` whenever nothing is queued.
    pub fn always(&self, command: &str, output: &str) -> &Self {
        self.sticky
            .lock()
            .insert(command.to_string(), Ok(output.to_string()));
        self
    }

    /// Make the next pull fail with `error`.
    pub fn fail_next_pull(&self, error: ChannelError) -> &Self {
        self.pull_failures.lock().push_back(error);
        self
    }

    /// Every command run so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    /// How many times `command` has been run.
    pub fn count(&self, command: &str) -> usize {
        self.commands.lock().iter().filter(|c| *c == command).count()
    }

    /// Every pull attempted so far, successful or not.
    pub fn pulls(&self) -> Vec<(String, PathBuf)> {
        self.pulls.lock().clone()
    }

    fn push(&self, command: &str, response: Result<String>) -> &Self {
        self.queued
            .lock()
            .entry(command.to_string())
            .or_default()
            .push_back(response);
        self
    }
}

impl DeviceChannel for ScriptedChannel {
    fn run_command(&self, command: &str) -> Result<String> {
        self.commands.lock().push(command.to_string());

        if let Some(response) = self
            .queued
            .lock()
            .get_mut(command)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        self.sticky.lock().get(command).cloned().unwrap_or_else(|| {
            Err(ChannelError::NonZeroExit(format!(
                "no scripted response for `{command}`"
            )))
        })
    }

    fn pull_file(&self, remote: &str, local: &Path) -> Result<()> {
        self.pulls
            .lock()
            .push((remote.to_string(), local.to_path_buf()));

        match self.pull_failures.lock().pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}
