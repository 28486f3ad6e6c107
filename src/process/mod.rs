use std::path::PathBuf;
use std::process::Stdio;

use log::{debug, info, warn};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

use crate::engine::launch::LaunchEvent;
use crate::engine::models::LaunchRequest;

/// Stream of lifecycle events for one launch.
pub struct LaunchSession {
    events: mpsc::UnboundedReceiver<LaunchEvent>,
}

impl LaunchSession {
    /// Create a session together with the sender the launcher feeds.
    pub fn channel() -> (mpsc::UnboundedSender<LaunchEvent>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { events: rx })
    }

    /// Next event, or `None` once the launcher went away.
    pub async fn next_event(&mut self) -> Option<LaunchEvent> {
        self.events.recv().await
    }
}

/// Capability that performs downloads, verification and process start.
pub trait GameLauncher: Send + Sync + 'static {
    fn launch(&self, request: LaunchRequest) -> Result<LaunchSession, String>;
}

/// Drives an external launcher program.
///
/// The request is written to the program's stdin as one JSON document. Each
/// stdout line holding a JSON [`LaunchEvent`] is forwarded as-is; any other
/// output line (stdout or stderr) is plain output and becomes
/// [`LaunchEvent::Output`]. Only an explicit `data` event marks the game as
/// started. Process exit without a reported close or error ends
/// the session with [`LaunchEvent::Close`].
#[derive(Clone, Debug)]
pub struct ProcessLauncher {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessLauncher {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a whitespace-separated command line.
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_owned);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }
}

impl GameLauncher for ProcessLauncher {
    fn launch(&self, request: LaunchRequest) -> Result<LaunchSession, String> {
        let payload = serde_json::to_vec(&request)
            .map_err(|e| format!("unable to encode launch request: {e}"))?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(!request.detached);

        #[cfg(target_os = "windows")]
        {
            // CREATE_NO_WINDOW
            cmd.creation_flags(0x08000000);
        }

        info!(
            "launch: starting {} for instance {} (detached={})",
            self.program.display(),
            request.instance,
            request.detached
        );
        let mut child = cmd
            .spawn()
            .map_err(|e| format!("failed to start launcher {}: {e}", self.program.display()))?;

        let (tx, session) = LaunchSession::channel();

        if let Some(mut stdin) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(err) = stdin.write_all(&payload).await {
                    warn!("launch: unable to send request to launcher: {err}");
                    return;
                }
                let _ = stdin.write_all(b"\n").await;
                let _ = stdin.shutdown().await;
            });
        }

        if let Some(stderr) = child.stderr.take() {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    if tx.send(LaunchEvent::Output(line)).is_err() {
                        break;
                    }
                }
            });
        }

        let stdout = child.stdout.take();
        tokio::spawn(async move {
            let mut finished = false;
            if let Some(stdout) = stdout {
                let mut lines = BufReader::new(stdout).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    let event = parse_event_line(&line);
                    finished |= event.is_terminal();
                    if tx.send(event).is_err() {
                        debug!("launch: session dropped, no longer forwarding events");
                        break;
                    }
                }
            }
            let event = match child.wait().await {
                Ok(status) => {
                    debug!("launch: launcher exited with {status}");
                    LaunchEvent::Close(status.code())
                }
                Err(err) => LaunchEvent::Error(Some(format!("launcher wait failed: {err}"))),
            };
            if !finished {
                let _ = tx.send(event);
            }
        });

        Ok(session)
    }
}

/// JSON lines are launcher events; anything else is plain output.
pub fn parse_event_line(line: &str) -> LaunchEvent {
    let trimmed = line.trim();
    if trimmed.starts_with('{')
        && let Ok(event) = serde_json::from_str::<LaunchEvent>(trimmed)
    {
        return event;
    }
    LaunchEvent::Output(line.to_owned())
}
