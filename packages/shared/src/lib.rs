//! Utilities shared by the Brickrally binaries: logging bootstrap and clocks.

pub mod logger;
pub mod time;
