//! Server configuration.

use std::env;
use std::time::Duration;

use crate::bus::DEFAULT_TOPIC_CAPACITY;

/// Settings for the WebSocket gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the listener binds to.
    pub bind_addr: String,

    /// A connection that sends nothing for this long is closed.
    pub idle_timeout: Duration,

    /// Events buffered per room topic before slow subscribers lag.
    pub topic_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            idle_timeout: Duration::from_secs(120),
            topic_capacity: DEFAULT_TOPIC_CAPACITY,
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `PLATEPICK_BIND` and
    /// `PLATEPICK_IDLE_TIMEOUT_SECS`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(addr) = env::var("PLATEPICK_BIND") {
            config.bind_addr = addr;
        }
        if let Ok(raw) = env::var("PLATEPICK_IDLE_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.idle_timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid PLATEPICK_IDLE_TIMEOUT_SECS"),
            }
        }
        config
    }
}
