//! Global scoreboard persisted as a single JSON object on disk.
//!
//! The mapping lives in memory; every increment hands a snapshot to a
//! background writer that rewrites the file wholesale. Bursts are coalesced
//! to the latest snapshot, and write failures are logged and dropped.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::{Mutex, mpsc};

use crate::domain::{GlobalScoreboard, Nickname, ScoreboardError, ScoreboardStore};

pub struct JsonFileScoreboardStore {
    scoreboard: Mutex<GlobalScoreboard>,
    writer: mpsc::UnboundedSender<GlobalScoreboard>,
}

impl JsonFileScoreboardStore {
    /// Load the mapping from `path` and start the writer task.
    ///
    /// A missing or malformed file yields an empty scoreboard.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let scoreboard = match read_scoreboard(&path).await {
            Ok(scoreboard) => {
                tracing::info!(
                    "Loaded global scoreboard with {} entries from {}",
                    scoreboard.len(),
                    path.display()
                );
                scoreboard
            }
            Err(ScoreboardError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No global scoreboard at {}, starting empty", path.display());
                GlobalScoreboard::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Ignoring unreadable global scoreboard at {}: {}",
                    path.display(),
                    e
                );
                GlobalScoreboard::default()
            }
        };

        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(write_behind(path, rx));

        Self {
            scoreboard: Mutex::new(scoreboard),
            writer,
        }
    }
}

#[async_trait]
impl ScoreboardStore for JsonFileScoreboardStore {
    async fn increment(&self, nickname: &Nickname) -> GlobalScoreboard {
        let snapshot = {
            let mut scoreboard = self.scoreboard.lock().await;
            let wins = scoreboard.increment(nickname);
            tracing::info!("'{}' now has {} global wins", nickname, wins);
            scoreboard.clone()
        };

        if self.writer.send(snapshot.clone()).is_err() {
            tracing::error!("Scoreboard writer has stopped; win for '{}' not persisted", nickname);
        }
        snapshot
    }

    async fn snapshot(&self) -> GlobalScoreboard {
        self.scoreboard.lock().await.clone()
    }
}

async fn read_scoreboard(path: &Path) -> Result<GlobalScoreboard, ScoreboardError> {
    let contents = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&contents)?)
}

/// Rewrite the whole file with `scoreboard`.
async fn persist(path: &Path, scoreboard: &GlobalScoreboard) -> Result<(), ScoreboardError> {
    let json = serde_json::to_string_pretty(scoreboard)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn write_behind(path: PathBuf, mut rx: mpsc::UnboundedReceiver<GlobalScoreboard>) {
    while let Some(mut latest) = rx.recv().await {
        while let Ok(newer) = rx.try_recv() {
            latest = newer;
        }
        match persist(&path, &latest).await {
            Ok(()) => tracing::debug!("Global scoreboard written to {}", path.display()),
            Err(e) => tracing::error!(
                "Failed to write global scoreboard to {}: {}",
                path.display(),
                e
            ),
        }
    }
}
