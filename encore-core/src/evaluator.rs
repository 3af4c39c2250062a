//! Permission evaluator — pure decisions over a license record and the
//! locally recorded consumption count.
//!
//! All functions here are total and side-effect free; they are safe to call
//! repeatedly for UI purposes without touching the ledger.

use chrono::{DateTime, Utc};

use crate::access::{AccessState, Capabilities};
use crate::license::{LicenseRecord, LicenseType};

/// Sentinel returned for license types without a play allowance.
pub const UNLIMITED_PLAYS: u32 = u32::MAX;

/// Days-remaining threshold below which a time-limited license warns.
const EXPIRY_WARNING_DAYS: i64 = 3;

/// Play count at or below which a limited-play license warns.
const LOW_PLAYS_WARNING: u32 = 3;

/// Result of a playback permission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackPermission {
    Allowed,
    AllowedWithWarning { message: String },
    Denied { reason: String },
}

impl PlaybackPermission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed | Self::AllowedWithWarning { .. })
    }

    /// The warning or denial text, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Allowed => None,
            Self::AllowedWithWarning { message } => Some(message),
            Self::Denied { reason } => Some(reason),
        }
    }
}

/// Effective remaining plays for a limited-play license:
/// `max(0, (plays_remaining ?? total_plays ?? 0) - local_consumed)`.
/// Returns `None` for license types without a play allowance.
///
/// This is the single authoritative figure for play gating; it is never
/// persisted, always recomputed from the latest record and ledger count.
pub fn effective_remaining(record: &LicenseRecord, local_consumed: u64) -> Option<u32> {
    if record.license_type != LicenseType::LimitedPlay {
        return None;
    }
    let granted = u64::from(record.plays_remaining.or(record.total_plays).unwrap_or(0));
    Some(granted.saturating_sub(local_consumed).min(u64::from(u32::MAX)) as u32)
}

/// Effective remaining plays with unlimited types reported as
/// [`UNLIMITED_PLAYS`].
pub fn effective_remaining_plays(record: &LicenseRecord, local_consumed: u64) -> u32 {
    effective_remaining(record, local_consumed).unwrap_or(UNLIMITED_PLAYS)
}

/// Derive the access classification. Precedence is fixed:
/// `Expired > Exhausted > ExpiringSoon > LowPlays > Active`.
pub fn access_state(
    record: &LicenseRecord,
    local_consumed: u64,
    now: DateTime<Utc>,
) -> AccessState {
    if record.is_expired(now) {
        return AccessState::Expired;
    }
    let remaining = effective_remaining(record, local_consumed);
    if remaining == Some(0) {
        return AccessState::Exhausted;
    }
    if let Some(days) = record.days_remaining(now) {
        if days <= EXPIRY_WARNING_DAYS {
            return AccessState::ExpiringSoon;
        }
    }
    if let (Some(remaining), Some(total)) = (remaining, record.total_plays) {
        if remaining <= total / 4 {
            return AccessState::LowPlays;
        }
    }
    AccessState::Active
}

/// Evaluate whether playback may start right now.
///
/// Checks in order: expiry, play exhaustion (limited-play only), low-play
/// warnings, then near-expiry warnings for time-limited licenses.
pub fn evaluate_playback(
    record: &LicenseRecord,
    local_consumed: u64,
    now: DateTime<Utc>,
) -> PlaybackPermission {
    if record.is_expired(now) {
        return PlaybackPermission::Denied {
            reason: "license expired".to_string(),
        };
    }

    if record.license_type == LicenseType::LimitedPlay {
        let remaining = effective_remaining(record, local_consumed).unwrap_or(0);
        if remaining == 0 {
            return PlaybackPermission::Denied {
                reason: "no plays remaining".to_string(),
            };
        }
        if remaining == 1 {
            return PlaybackPermission::AllowedWithWarning {
                message: "last play".to_string(),
            };
        }
        if remaining <= LOW_PLAYS_WARNING {
            return PlaybackPermission::AllowedWithWarning {
                message: format!("{remaining} plays remaining"),
            };
        }
    }

    if record.license_type == LicenseType::TimeLimited {
        if let Some(days) = record.days_remaining(now) {
            if days <= EXPIRY_WARNING_DAYS {
                return PlaybackPermission::AllowedWithWarning {
                    message: format!("expires in {days} days"),
                };
            }
        }
    }

    PlaybackPermission::Allowed
}

/// Whether the license grants download right now. Capability AND not expired.
pub fn can_download(record: &LicenseRecord, now: DateTime<Utc>) -> bool {
    Capabilities::for_type(record.license_type).can_download && !record.is_expired(now)
}

/// Whether the license may be resold right now. Capability AND not expired.
pub fn can_resell(record: &LicenseRecord, now: DateTime<Utc>) -> bool {
    Capabilities::for_type(record.license_type).can_resell && !record.is_expired(now)
}
