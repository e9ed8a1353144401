use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tern_http::protocol::date::unix_now;
use tracing::{debug, trace, warn};

use crate::session::{SessionConfig, SessionError, SessionHandler};

/// Lifecycle tag of a session value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
enum Mark {
    Flash(FlashState),
    /// Absolute unix expiry timestamp.
    Until(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum FlashState {
    New,
    Old,
}

/// The session of one client.
#[derive(Debug)]
pub struct SessionStore<H> {
    handler: H,
    id: String,
    config: SessionConfig,
    data: Map<String, Value>,
    marks: BTreeMap<String, Mark>,
    started: bool,
}

impl<H: SessionHandler> SessionStore<H> {
    pub fn new(handler: H, id: impl Into<String>) -> Self {
        Self::with_config(handler, id, SessionConfig::default())
    }

    pub fn with_config(handler: H, id: impl Into<String>, config: SessionConfig) -> Self {
        Self { handler, id: id.into(), config, data: Map::new(), marks: BTreeMap::new(), started: false }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Loads the session and expires tagged values. Does nothing once started.
    pub fn start(&mut self) -> Result<&mut Self, SessionError> {
        if self.started {
            return Ok(self);
        }

        let raw = self.handler.read(&self.id)?;
        self.started = true;
        self.load(&raw);
        self.sweep(unix_now());
        debug!(id = self.id, values = self.data.len(), "session started");
        Ok(self)
    }

    fn load(&mut self, raw: &str) {
        self.data = Map::new();
        self.marks = BTreeMap::new();
        if raw.is_empty() {
            return;
        }

        match serde_json::from_str::<Map<String, Value>>(raw) {
            Ok(mut data) => {
                if let Some(marks) = data.remove(&self.config.cache_key) {
                    self.marks = serde_json::from_value(marks).unwrap_or_else(|e| {
                        warn!(cause = %e, "drop unreadable session tags");
                        BTreeMap::new()
                    });
                }
                self.data = data;
            }
            Err(e) => warn!(id = self.id, cause = %e, "discard unreadable session data"),
        }
    }

    /// Advances flash tags and drops expired values.
    ///
    /// A fresh flash value becomes old, an old one is deleted together with its
    /// tag, a temp value whose expiry is before `now` is deleted too. Tags whose
    /// value is gone are dropped.
    pub fn sweep(&mut self, now: i64) -> &mut Self {
        let data = &mut self.data;
        let before = self.marks.len();
        self.marks.retain(|name, mark| {
            if !data.get(name).is_some_and(|value| !value.is_null()) {
                return false;
            }
            match mark {
                Mark::Flash(FlashState::New) => {
                    *mark = Mark::Flash(FlashState::Old);
                    true
                }
                Mark::Flash(FlashState::Old) => {
                    data.remove(name);
                    false
                }
                Mark::Until(expiry) if *expiry < now => {
                    data.remove(name);
                    false
                }
                Mark::Until(_) => true,
            }
        });
        trace!(dropped = before - self.marks.len(), "session tags swept");
        self
    }

    /// True when `name` holds a non-null value.
    pub fn has(&self, name: &str) -> bool {
        self.data.get(name).is_some_and(|value| !value.is_null())
    }

    /// The value of `name`, `None` when absent or not a `T`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.data.get(name)?;
        serde_json::from_value(value.clone()).ok()
    }

    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    pub fn get_value(&self, name: &str) -> Option<&Value> {
        self.data.get(name)
    }

    /// Every value, without the tag bookkeeping.
    pub fn all(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn set<T: Serialize>(&mut self, name: &str, value: T) -> Result<&mut Self, SessionError> {
        let value = serde_json::to_value(value)?;
        self.data.insert(name.to_string(), value);
        Ok(self)
    }

    pub fn delete(&mut self, name: &str) -> &mut Self {
        self.data.remove(name);
        self
    }

    /// Stores a value readable until the next session start is over.
    pub fn set_flash<T: Serialize>(&mut self, name: &str, value: T) -> Result<&mut Self, SessionError> {
        self.set(name, value)?;
        Ok(self.mark_flash(&[name]))
    }

    /// Stores a value that expires after `ttl`, the configured default when `None`.
    pub fn set_temp<T: Serialize>(
        &mut self,
        name: &str,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<&mut Self, SessionError> {
        self.set(name, value)?;
        Ok(self.mark_temp(name, ttl))
    }

    /// Tags existing values as flash. Names without a value are skipped.
    pub fn mark_flash(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.add_mark(name, Mark::Flash(FlashState::New));
        }
        self
    }

    pub fn unmark_flash(&mut self, names: &[&str]) -> &mut Self {
        self.remove_marks(names)
    }

    pub fn mark_temp(&mut self, name: &str, ttl: Option<Duration>) -> &mut Self {
        let ttl = ttl.unwrap_or(self.config.default_temp_ttl);
        let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        self.mark_temp_until(name, unix_now().saturating_add(ttl))
    }

    /// Tags an existing value to expire at the unix timestamp `expiry`.
    pub fn mark_temp_until(&mut self, name: &str, expiry: i64) -> &mut Self {
        self.add_mark(name, Mark::Until(expiry));
        self
    }

    pub fn unmark_temp(&mut self, names: &[&str]) -> &mut Self {
        self.remove_marks(names)
    }

    fn add_mark(&mut self, name: &str, mark: Mark) {
        if self.has(name) {
            self.marks.insert(name.to_string(), mark);
        }
    }

    fn remove_marks(&mut self, names: &[&str]) -> &mut Self {
        for name in names {
            self.marks.remove(*name);
        }
        self
    }

    /// Clears every value of a started session.
    pub fn reset(&mut self) -> &mut Self {
        if self.started {
            self.data.clear();
            self.marks.clear();
        }
        self
    }

    /// Deletes the stored session. The in-memory data is left as is.
    pub fn destroy(&mut self) -> Result<&mut Self, SessionError> {
        if self.started {
            self.handler.destroy(&self.id)?;
            self.started = false;
            debug!(id = self.id, "session destroyed");
        }
        Ok(self)
    }

    /// Writes a started session back to the handler.
    pub fn close(&mut self) -> Result<&mut Self, SessionError> {
        if !self.started {
            return Ok(self);
        }

        let serialized = self.serialize()?;
        self.handler.write(&self.id, &serialized)?;
        self.started = false;
        trace!(id = self.id, size = serialized.len(), "session written");
        Ok(self)
    }

    /// Asks the handler to drop sessions idle for longer than `max_lifetime`.
    pub fn gc(&mut self, max_lifetime: Duration) -> Result<usize, SessionError> {
        let removed = self.handler.gc(max_lifetime)?;
        debug!(removed, "session gc");
        Ok(removed)
    }

    fn serialize(&self) -> Result<String, SessionError> {
        let mut data = self.data.clone();
        if !self.marks.is_empty() {
            data.insert(self.config.cache_key.clone(), serde_json::to_value(&self.marks)?);
        }
        Ok(serde_json::to_string(&data)?)
    }
}
