//! `adb`-backed device channel.
//!
//! Commands go through `adb shell`, files come back through `adb pull`.
//! By default a command may run for as long as it likes; a timeout only
//! applies when one is configured.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{ChannelError, DeviceChannel, Result};

/// How often a timed command is checked for completion.
const WAIT_SLICE: Duration = Duration::from_millis(20);

/// Talks to a device through the `adb` command-line tool.
#[derive(Debug, Clone)]
pub struct Adb {
    program: PathBuf,
    serial: Option<String>,
    timeout: Option<Duration>,
}

impl Adb {
    /// Creates a channel that invokes `program` (usually just `adb`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            serial: None,
            timeout: None,
        }
    }

    /// Targets a specific device by serial (`adb -s <serial>`).
    #[must_use]
    pub fn with_serial(mut self, serial: Option<String>) -> Self {
        self.serial = serial;
        self
    }

    /// Kills commands that run longer than `timeout`. `None` waits forever.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full argument list for one invocation, device selector first.
    fn args<I, S>(&self, rest: I) -> Vec<OsString>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut args = Vec::new();
        if let Some(serial) = &self.serial {
            args.push(OsString::from("-s"));
            args.push(OsString::from(serial));
        }
        args.extend(rest.into_iter().map(Into::into));
        args
    }

    /// Run adb with `args` and return trimmed stdout on success.
    fn execute(&self, args: Vec<OsString>) -> Result<String> {
        tracing::debug!(program = %self.program.display(), ?args, "invoking adb");

        let mut command = Command::new(&self.program);
        command.args(&args);

        let output = match self.timeout {
            None => command.output().map_err(|e| {
                ChannelError::LaunchFailure(format!(
                    "failed to run {}: {e}",
                    self.program.display()
                ))
            })?,
            Some(timeout) => run_with_timeout(command, &self.program, timeout)?,
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                output.status.to_string()
            } else {
                stderr
            };
            return Err(ChannelError::NonZeroExit(detail));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl DeviceChannel for Adb {
    fn run_command(&self, command: &str) -> Result<String> {
        self.execute(self.args(["shell", command]))
    }

    fn pull_file(&self, remote: &str, local: &Path) -> Result<()> {
        let args = self.args([
            OsString::from("pull"),
            OsString::from(remote),
            local.as_os_str().to_os_string(),
        ]);
        self.execute(args).map(|_| ())
    }
}

/// Spawn `command` and wait at most `timeout` for it, killing it on expiry.
///
/// Pipes are drained on their own threads so a chatty child can't stall
/// on a full pipe while we wait on it.
fn run_with_timeout(mut command: Command, program: &Path, timeout: Duration) -> Result<Output> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|e| {
        ChannelError::LaunchFailure(format!("failed to run {}: {e}", program.display()))
    })?;

    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                // Already-exited races are fine; there is nothing else to clean up.
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %program.display(), ?timeout, "adb command timed out");
                return Err(ChannelError::TimedOut(timeout));
            }
            Ok(None) => thread::sleep(WAIT_SLICE),
            Err(e) => {
                return Err(ChannelError::LaunchFailure(format!(
                    "failed to wait on {}: {e}",
                    program.display()
                )));
            }
        }
    };

    Ok(Output {
        status,
        stdout: collect(stdout),
        stderr: collect(stderr),
    })
}

fn drain(mut pipe: impl Read + Send + 'static) -> JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = pipe.read_to_end(&mut buf);
        buf
    })
}

fn collect(reader: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn args_without_serial() {
        let adb = Adb::new("adb");
        let args = adb.args(["shell", "ls /sdcard"]);
        assert_eq!(args, vec![OsString::from("shell"), OsString::from("ls /sdcard")]);
    }

    #[test]
    fn args_with_serial_come_first() {
        let adb = Adb::new("adb").with_serial(Some("R58M123".into()));
        let args = adb.args(["pull", "/sdcard/a.amr", "."]);
        assert_eq!(
            args,
            ["-s", "R58M123", "pull", "/sdcard/a.amr", "."]
                .map(OsString::from)
                .to_vec()
        );
    }

    #[test]
    fn missing_program_is_launch_failure() {
        let dir = TempDir::new().unwrap();
        let adb = Adb::new(dir.path().join("no-such-adb"));

        let err = adb.run_command("true").unwrap_err();
        assert!(matches!(err, ChannelError::LaunchFailure(_)));
    }

    #[test]
    fn missing_program_with_timeout_is_launch_failure() {
        let dir = TempDir::new().unwrap();
        let adb = Adb::new(dir.path().join("no-such-adb"))
            .with_timeout(Some(Duration::from_secs(1)));

        let err = adb.pull_file("/sdcard/x.amr", dir.path()).unwrap_err();
        assert!(matches!(err, ChannelError::LaunchFailure(_)));
    }

    #[cfg(unix)]
    mod scripts {
        use super::*;

        use std::fs;
        use std::os::unix::fs::PermissionsExt;

        /// Write an executable shell script standing in for adb.
        fn fake_adb(dir: &TempDir, body: &str) -> PathBuf {
            let path = dir.path().join("adb");
            fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn run_command_returns_trimmed_stdout() {
            let dir = TempDir::new().unwrap();
            let adb = Adb::new(fake_adb(&dir, r#"echo "  $@  ""#)).with_serial(Some("ABC".into()));

            let out = adb.run_command("ls /sdcard/Documents/voix/incoming/").unwrap();
            assert_eq!(out, "-s ABC shell ls /sdcard/Documents/voix/incoming/");
        }

        #[test]
        fn failing_command_carries_stderr() {
            let dir = TempDir::new().unwrap();
            let adb = Adb::new(fake_adb(&dir, "echo 'device offline' >&2\nexit 1"));

            let err = adb.run_command("dumpsys telephony.registry").unwrap_err();
            assert_eq!(err, ChannelError::NonZeroExit("device offline".into()));
        }

        #[test]
        fn pull_passes_remote_and_local() {
            let dir = TempDir::new().unwrap();
            let record = dir.path().join("args.txt");
            let script = format!("echo \"$@\" > '{}'", record.display());
            let adb = Adb::new(fake_adb(&dir, &script));

            adb.pull_file("/sdcard/Documents/voix/incoming/rec1.amr", Path::new("/tmp/out"))
                .unwrap();

            let args = fs::read_to_string(record).unwrap();
            assert_eq!(
                args.trim(),
                "pull /sdcard/Documents/voix/incoming/rec1.amr /tmp/out"
            );
        }

        #[test]
        fn slow_command_times_out() {
            let dir = TempDir::new().unwrap();
            let timeout = Duration::from_millis(100);
            let adb = Adb::new(fake_adb(&dir, "sleep 5")).with_timeout(Some(timeout));

            let started = Instant::now();
            let err = adb.run_command("dumpsys telephony.registry").unwrap_err();

            assert_eq!(err, ChannelError::TimedOut(timeout));
            assert!(started.elapsed() < Duration::from_secs(4));
        }

        #[test]
        fn fast_command_within_timeout_succeeds() {
            let dir = TempDir::new().unwrap();
            let adb = Adb::new(fake_adb(&dir, "echo mCallState=0"))
                .with_timeout(Some(Duration::from_secs(5)));

            assert_eq!(adb.run_command("dumpsys").unwrap(), "mCallState=0");
        }
    }
}
