//! License data model: the 5 license models and the immutable purchase record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The 5 license models a track can be sold under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LicenseType {
    FullOwnership,
    Streaming,
    LimitedPlay,
    TimeLimited,
    Commercial,
}

impl LicenseType {
    /// All 5 license types.
    pub const ALL: [LicenseType; 5] = [
        Self::FullOwnership,
        Self::Streaming,
        Self::LimitedPlay,
        Self::TimeLimited,
        Self::Commercial,
    ];

    /// License type as string (for storage, logging, display).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullOwnership => "full_ownership",
            Self::Streaming => "streaming",
            Self::LimitedPlay => "limited_play",
            Self::TimeLimited => "time_limited",
            Self::Commercial => "commercial",
        }
    }

    /// Parse license type from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "full_ownership" => Some(Self::FullOwnership),
            "streaming" => Some(Self::Streaming),
            "limited_play" => Some(Self::LimitedPlay),
            "time_limited" => Some(Self::TimeLimited),
            "commercial" => Some(Self::Commercial),
            _ => None,
        }
    }

    /// Human-readable description for license cards and upgrade messages.
    pub fn description(&self) -> &'static str {
        match self {
            Self::FullOwnership => "Full ownership (unlimited plays, download, resale)",
            Self::Streaming => "Streaming access (unlimited plays, no download)",
            Self::LimitedPlay => "Limited plays (fixed play allowance)",
            Self::TimeLimited => "Time-limited access (expires on a fixed date)",
            Self::Commercial => "Commercial license (unlimited plays, commercial use)",
        }
    }
}

/// An immutable purchased-license snapshot, supplied by the record fetch
/// collaborator (the marketplace indexer). The engine never writes back to
/// it; `plays_remaining`/`total_plays` are the remote ledger's view and are
/// refreshed at the caller's discretion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LicenseRecord {
    /// Ledger key.
    pub id: String,
    /// On-chain instance identifier, forwarded to the remote sync client.
    pub instance_id: String,
    /// Master recording identifier.
    pub master_id: String,
    pub license_type: LicenseType,
    pub purchase_date: DateTime<Utc>,
    /// Remote-sourced; present only for LimitedPlay licenses.
    pub plays_remaining: Option<u32>,
    /// Remote-sourced; present only for LimitedPlay licenses.
    pub total_plays: Option<u32>,
    /// Present only for TimeLimited licenses; absent means no time restriction.
    pub expiration_date: Option<DateTime<Utc>>,
    pub is_transferable: bool,
}

impl LicenseRecord {
    /// Whether the license is past its expiration date. Recomputed on every
    /// evaluation, never cached.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expiration_date {
            Some(exp) => now > exp,
            None => false,
        }
    }

    /// Whole days until expiration, clamped at zero. `None` when the license
    /// carries no expiration date.
    pub fn days_remaining(&self, now: DateTime<Utc>) -> Option<i64> {
        self.expiration_date
            .map(|exp| (exp - now).num_days().max(0))
    }
}
