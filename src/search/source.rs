/// Runs one plocate process and streams its output
///
/// Each database gets its own task. Tasks never talk to each other; they
/// only push events into the session's channel.

use crate::core::{DatabaseKind, SearchCommand};
use crate::error::LocateError;
use crate::search::CancellationToken;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

// plocate exits with 1 when nothing matched
const NO_MATCH_EXIT: i32 = 1;

/// What a source task reports back to its session
#[derive(Debug)]
pub enum SourceEvent {
    Line {
        database: DatabaseKind,
        path: String,
    },
    Failed {
        database: DatabaseKind,
        error: LocateError,
    },
    Finished {
        database: DatabaseKind,
        lines: usize,
    },
}

/// Spawn the task that owns one plocate process
pub fn spawn_source(
    command: SearchCommand,
    events: mpsc::UnboundedSender<SourceEvent>,
    token: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(run_source(command, events, token))
}

async fn run_source(
    command: SearchCommand,
    events: mpsc::UnboundedSender<SourceEvent>,
    token: CancellationToken,
) {
    let database = command.database;
    if token.is_cancelled() {
        return;
    }

    debug!(%database, command = %command.display(), "spawning search");

    let spawned = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();

    let mut child = match spawned {
        Ok(child) => child,
        Err(source) => {
            warn!(%database, error = %source, "could not launch search tool");
            let _ = events.send(SourceEvent::Failed {
                database,
                error: LocateError::Spawn { database, source },
            });
            return;
        }
    };

    let Some(stdout) = child.stdout.take() else {
        terminate(&mut child, None).await;
        let _ = events.send(SourceEvent::Failed {
            database,
            error: LocateError::Generic(format!("no output pipe for {} search", database)),
        });
        return;
    };

    // Drain stderr on the side so a chatty tool can't fill the pipe and stall
    let stderr_task = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).trim().to_string()
        })
    });

    let mut segments = BufReader::new(stdout).split(b'\n');
    let mut lines = 0usize;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(%database, lines, "search cancelled");
                terminate(&mut child, stderr_task).await;
                return;
            }
            segment = segments.next_segment() => match segment {
                Ok(Some(raw)) => {
                    // Paths aren't guaranteed to be UTF-8
                    let line = String::from_utf8_lossy(&raw);
                    let path = line.trim();
                    if path.is_empty() {
                        continue;
                    }

                    lines += 1;
                    let event = SourceEvent::Line {
                        database,
                        path: path.to_string(),
                    };
                    if events.send(event).is_err() {
                        // session is gone
                        terminate(&mut child, stderr_task).await;
                        return;
                    }
                }
                Ok(None) => break,
                Err(source) => {
                    terminate(&mut child, stderr_task).await;
                    warn!(%database, error = %source, "lost search output");
                    let _ = events.send(SourceEvent::Failed {
                        database,
                        error: LocateError::ReadOutput { database, source },
                    });
                    return;
                }
            }
        }
    }

    let status = tokio::select! {
        biased;
        _ = token.cancelled() => {
            terminate(&mut child, stderr_task).await;
            return;
        }
        status = child.wait() => status,
    };

    let status = match status {
        Ok(status) => status,
        Err(source) => {
            terminate(&mut child, stderr_task).await;
            warn!(%database, error = %source, "could not wait for search tool");
            let _ = events.send(SourceEvent::Failed {
                database,
                error: LocateError::Wait { database, source },
            });
            return;
        }
    };

    let stderr = match stderr_task {
        Some(mut task) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                task.abort();
                return;
            }
            collected = &mut task => collected.unwrap_or_default(),
        },
        None => String::new(),
    };

    let no_match = status.code() == Some(NO_MATCH_EXIT) && lines == 0 && stderr.is_empty();

    let event = if status.success() || no_match {
        debug!(%database, lines, "search finished");
        SourceEvent::Finished { database, lines }
    } else {
        warn!(%database, status = %status, "search tool failed");
        SourceEvent::Failed {
            database,
            error: LocateError::ExitStatus {
                database,
                code: status.into(),
                stderr,
            },
        }
    };

    let _ = events.send(event);
}

async fn terminate(child: &mut Child, stderr_task: Option<JoinHandle<String>>) {
    if let Some(task) = stderr_task {
        task.abort();
    }

    // kill() also reaps the process
    if let Err(e) = child.kill().await {
        debug!(error = %e, "kill after exit");
    }
}
