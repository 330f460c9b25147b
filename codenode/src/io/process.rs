//! Child-process plumbing for external sandbox runtimes.

use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, error, instrument, warn};
use wait_timeout::ChildExt;

/// Captured interpreter output.
#[derive(Debug)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub stdout_truncated: usize,
    pub stderr_truncated: usize,
    pub timed_out: bool,
}

/// Run a command with a deadline, bounded capture, and optional streaming of
/// stderr lines.
///
/// Both pipes are drained concurrently while the child runs, so output
/// cannot deadlock the child. `output_limit_bytes` bounds each captured
/// stream; bytes beyond it are discarded while the pipe keeps draining.
/// When `stderr_line_sink` is set, each stderr line is handed to it as it
/// arrives, before any truncation.
#[instrument(skip_all, fields(timeout_secs = timeout.as_secs(), output_limit_bytes))]
pub fn run_with_deadline(
    mut cmd: Command,
    stdin: Option<&[u8]>,
    timeout: Duration,
    output_limit_bytes: usize,
    stderr_line_sink: Option<&(dyn Fn(&str) + Send + Sync)>,
) -> Result<CommandOutput> {
    if stdin.is_some() {
        cmd.stdin(Stdio::piped());
    } else {
        cmd.stdin(Stdio::null());
    }
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

    debug!("spawning sandbox process");
    let mut child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => {
            error!(err = %err, "failed to spawn sandbox command");
            return Err(err).context("spawn sandbox command");
        }
    };

    if let Some(input) = stdin {
        let mut child_stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("stdin was not piped"))?;
        child_stdin.write_all(input).context("write stdin")?;
        // The handle drops here, closing the pipe so the child sees EOF.
    }

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("stdout was not piped"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow!("stderr was not piped"))?;

    type Captured = (Vec<u8>, usize);
    let (status, timed_out, stdout, stderr) = thread::scope(
        |scope| -> Result<(ExitStatus, bool, Captured, Captured)> {
        let stdout_handle = scope.spawn(move || drain(stdout, output_limit_bytes, None));
        let stderr_handle =
            scope.spawn(move || drain(stderr, output_limit_bytes, stderr_line_sink));

        let mut timed_out = false;
        let status = match child
            .wait_timeout(timeout)
            .context("wait for sandbox command")?
        {
            Some(status) => status,
            None => {
                warn!(
                    timeout_secs = timeout.as_secs(),
                    "sandbox command timed out, killing"
                );
                timed_out = true;
                child.kill().context("kill sandbox command")?;
                child.wait().context("wait after kill")?
            }
        };

        let stdout = stdout_handle
            .join()
            .map_err(|_| anyhow!("stdout reader thread panicked"))??;
        let stderr = stderr_handle
            .join()
            .map_err(|_| anyhow!("stderr reader thread panicked"))??;
        Ok((status, timed_out, stdout, stderr))
    })?;

    let (stdout, stdout_truncated) = stdout;
    let (stderr, stderr_truncated) = stderr;
    if stdout_truncated > 0 || stderr_truncated > 0 {
        warn!(stdout_truncated, stderr_truncated, "sandbox output truncated");
    }

    debug!(exit_code = ?status.code(), timed_out, "sandbox command finished");
    Ok(CommandOutput {
        status,
        stdout,
        stderr,
        stdout_truncated,
        stderr_truncated,
        timed_out,
    })
}

/// Drain a stream line by line with a capture limit and optional line sink.
fn drain<R: Read>(
    reader: R,
    limit: usize,
    line_sink: Option<&(dyn Fn(&str) + Send + Sync)>,
) -> Result<(Vec<u8>, usize)> {
    let mut lines = BufReader::new(reader);
    let mut kept = Vec::new();
    let mut dropped = 0usize;

    loop {
        let mut line = Vec::new();
        let n = lines
            .read_until(b'\n', &mut line)
            .context("read sandbox output")?;
        if n == 0 {
            break;
        }

        if let Some(sink) = line_sink {
            sink(String::from_utf8_lossy(&line).trim_end_matches(['\r', '\n']));
        }

        let room = limit.saturating_sub(kept.len());
        let keep = n.min(room);
        kept.extend_from_slice(&line[..keep]);
        dropped += n - keep;
    }

    Ok((kept, dropped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn captures_stdout_and_exit_status() {
        let output = run_with_deadline(
            sh("printf 'hello'"),
            None,
            Duration::from_secs(5),
            1000,
            None,
        )
        .expect("run");
        assert!(output.status.success());
        assert_eq!(output.stdout, b"hello");
        assert!(!output.timed_out);
    }

    #[test]
    fn forwards_stdin_to_the_child() {
        let output = run_with_deadline(
            sh("cat"),
            Some(b"from stdin"),
            Duration::from_secs(5),
            1000,
            None,
        )
        .expect("run");
        assert_eq!(output.stdout, b"from stdin");
    }

    #[test]
    fn kills_the_child_on_timeout() {
        let output = run_with_deadline(
            sh("sleep 5"),
            None,
            Duration::from_millis(100),
            1000,
            None,
        )
        .expect("run");
        assert!(output.timed_out);
    }

    #[test]
    fn streams_stderr_lines_to_the_sink() {
        let seen: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let sink = |line: &str| seen.lock().expect("lock").push(line.to_string());

        let output = run_with_deadline(
            sh("echo one >&2; echo two >&2"),
            None,
            Duration::from_secs(5),
            1000,
            Some(&sink),
        )
        .expect("run");

        assert!(output.status.success());
        assert_eq!(
            *seen.lock().expect("lock"),
            vec!["one".to_string(), "two".to_string()]
        );
    }

    #[test]
    fn truncates_capture_beyond_the_limit() {
        let output = run_with_deadline(
            sh("printf '0123456789'"),
            None,
            Duration::from_secs(5),
            4,
            None,
        )
        .expect("run");
        assert_eq!(output.stdout, b"0123");
        assert_eq!(output.stdout_truncated, 6);
    }
}
