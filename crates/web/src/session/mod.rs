//! Sessions over a pluggable persistence handler.
//!
//! A [`SessionStore`] keeps the session data of one client in memory between
//! `start` and `close`. Loading and saving go through a [`SessionHandler`],
//! which owns storage and any cross request locking.
//!
//! On top of plain key/value access the store can tag values:
//! - **flash**: survives exactly one more session start, then is deleted
//! - **temp**: deleted at the first session start after its expiry timestamp

mod store;

pub use store::SessionStore;

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Persistent storage for serialized session data.
#[cfg_attr(test, mockall::automock)]
pub trait SessionHandler {
    /// Serialized data of session `id`, empty when there is none.
    fn read(&mut self, id: &str) -> Result<String, SessionError>;

    fn write(&mut self, id: &str, data: &str) -> Result<(), SessionError>;

    fn destroy(&mut self, id: &str) -> Result<(), SessionError>;

    /// Removes sessions idle for longer than `max_lifetime`, returning how many.
    fn gc(&mut self, max_lifetime: Duration) -> Result<usize, SessionError>;
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session handler error: {reason}")]
    Handler { reason: String },

    #[error("session data serialization error: {source}")]
    Serialize {
        #[from]
        source: serde_json::Error,
    },
}

impl SessionError {
    pub fn handler<S: ToString>(str: S) -> Self {
        Self::Handler { reason: str.to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reserved key the flash and temp tags are stored under.
    pub cache_key: String,
    /// Lifetime of temp values when none is given.
    #[serde(with = "seconds")]
    pub default_temp_ttl: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { cache_key: "__cache__".to_string(), default_temp_ttl: Duration::from_secs(300) }
    }
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer};

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
