//! Server configuration.

use std::{path::PathBuf, time::Duration};

use crate::domain::physics::TICK_MS;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_SCOREBOARD_FILE: &str = "globalScoreboard.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// JSON file backing the global scoreboard
    pub scoreboard_file: PathBuf,
    /// Simulation period; also the simulated time each tick advances
    pub tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            scoreboard_file: PathBuf::from(DEFAULT_SCOREBOARD_FILE),
            tick_ms: TICK_MS,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Tick period, never shorter than one millisecond
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}
