//! Cross-room leaderboard of cumulative wins.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::value_object::Nickname;

/// Nickname to win count. Counts only ever grow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GlobalScoreboard(BTreeMap<String, u32>);

impl GlobalScoreboard {
    /// Credit one win and return the new count.
    pub fn increment(&mut self, nickname: &Nickname) -> u32 {
        let wins = self.0.entry(nickname.as_str().to_string()).or_insert(0);
        *wins += 1;
        *wins
    }

    pub fn wins(&self, nickname: &str) -> u32 {
        self.0.get(nickname).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &BTreeMap<String, u32> {
        &self.0
    }
}

impl From<BTreeMap<String, u32>> for GlobalScoreboard {
    fn from(map: BTreeMap<String, u32>) -> Self {
        Self(map)
    }
}

/// Durable home of the [`GlobalScoreboard`].
///
/// `increment` updates the in-memory mapping synchronously and schedules a
/// best-effort write; it never waits for storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScoreboardStore: Send + Sync {
    /// Credit a decisive win and return the updated snapshot.
    async fn increment(&self, nickname: &Nickname) -> GlobalScoreboard;

    async fn snapshot(&self) -> GlobalScoreboard;
}
