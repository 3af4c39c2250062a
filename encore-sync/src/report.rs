//! Statistics from one drain attempt.

/// Outcome summary of a `drain()` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Queue entries submitted this drain.
    pub attempted: usize,
    /// Entries confirmed and committed.
    pub succeeded: usize,
    /// Entries that failed and stay queued for retry.
    pub failed: usize,
    /// Total consumption units confirmed by the remote ledger.
    pub submitted_units: u64,
    /// True when this call was coalesced into an already-running drain and
    /// did nothing.
    pub skipped: bool,
}

impl SyncReport {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    /// Whether every attempted entry was confirmed.
    pub fn is_clean(&self) -> bool {
        !self.skipped && self.failed == 0
    }
}
