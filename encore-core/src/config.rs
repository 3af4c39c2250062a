//! Sync subsystem configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the sync queue drain.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SyncConfig {
    /// Per-remote-call timeout in milliseconds. Default: 10_000.
    pub request_timeout_ms: Option<u64>,
    /// Suggested interval between periodic drains, in seconds. Default: 300.
    /// The engine never schedules drains itself; the host's timer reads this
    /// and calls `trigger_sync`. Retries are never immediate-on-failure.
    pub drain_interval_secs: Option<u64>,
    /// Maximum queue entries submitted per drain. 0 = no limit. Default: 0.
    pub max_entries_per_drain: Option<usize>,
}

impl SyncConfig {
    /// Returns the effective per-call timeout, defaulting to 10 seconds.
    pub fn effective_request_timeout_ms(&self) -> u64 {
        self.request_timeout_ms.unwrap_or(10_000)
    }

    /// Returns the effective drain interval, defaulting to 5 minutes.
    pub fn effective_drain_interval_secs(&self) -> u64 {
        self.drain_interval_secs.unwrap_or(300)
    }

    /// Returns the effective per-drain entry cap, defaulting to unlimited.
    pub fn effective_max_entries_per_drain(&self) -> usize {
        match self.max_entries_per_drain {
            Some(0) | None => usize::MAX,
            Some(n) => n,
        }
    }
}
