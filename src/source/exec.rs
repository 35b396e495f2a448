//! Bounded execution of management-interface commands.
//!
//! `wmic`, `dmidecode` and friends occasionally hang on degraded hosts, so
//! every spawned query polls for completion against a deadline and is killed
//! once it expires. Timeouts surface as ordinary [`SourceError`]s.

use std::io::Read;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::source::SourceError;

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Run a command to completion within `timeout`, returning captured stdout.
pub(crate) fn run_with_timeout(
    mut command: Command,
    timeout: Duration,
) -> Result<String, SourceError> {
    let name = command.get_program().to_string_lossy().into_owned();
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|source| SourceError::Spawn {
        command: name.clone(),
        source,
    })?;

    // Pipes are drained on their own threads so a chatty child can never fill
    // the pipe buffer and stall while we poll its exit status.
    let stdout = spawn_reader(child.stdout.take());
    let stderr = spawn_reader(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SourceError::Timeout {
                        command: name,
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(source) => {
                let _ = child.kill();
                return Err(SourceError::Spawn {
                    command: name,
                    source,
                });
            }
        }
    };

    let stdout = stdout.join().unwrap_or_default();
    if !status.success() {
        let stderr = stderr.join().unwrap_or_default();
        let reason = match stderr.lines().map(str::trim).find(|line| !line.is_empty()) {
            Some(line) => line.to_string(),
            None => status.to_string(),
        };
        return Err(SourceError::Failed {
            command: name,
            reason,
        });
    }

    Ok(stdout)
}

fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buffer = String::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_string(&mut buffer);
        }
        buffer
    })
}
