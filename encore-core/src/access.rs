//! Access-control table: license type → fixed capability set.
//!
//! Pure and total over the closed `LicenseType` enumeration; adding a
//! license type is a compile-time exhaustiveness requirement here.

use serde::{Deserialize, Serialize};

use crate::license::LicenseType;

/// Audio format granted to downloadable license types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DownloadFormat {
    Wav,
    Mp3,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// The fixed capability set for a license type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub can_download: bool,
    pub can_resell: bool,
    pub has_unlimited_plays: bool,
    pub has_expiration: bool,
    pub download_format: Option<DownloadFormat>,
}

impl Capabilities {
    /// The capability row for a license type. No side effects, no errors.
    pub fn for_type(license_type: LicenseType) -> Self {
        match license_type {
            LicenseType::FullOwnership => Self {
                can_download: true,
                can_resell: true,
                has_unlimited_plays: true,
                has_expiration: false,
                download_format: Some(DownloadFormat::Wav),
            },
            LicenseType::Streaming => Self {
                can_download: false,
                can_resell: false,
                has_unlimited_plays: true,
                has_expiration: false,
                download_format: None,
            },
            LicenseType::LimitedPlay => Self {
                can_download: false,
                can_resell: false,
                has_unlimited_plays: false,
                has_expiration: false,
                download_format: None,
            },
            LicenseType::TimeLimited => Self {
                can_download: false,
                can_resell: false,
                has_unlimited_plays: true,
                has_expiration: true,
                download_format: None,
            },
            LicenseType::Commercial => Self {
                can_download: true,
                can_resell: true,
                has_unlimited_plays: true,
                has_expiration: false,
                download_format: Some(DownloadFormat::Mp3),
            },
        }
    }
}

/// Derived access classification, ordered by precedence: first match wins.
/// Exhaustion and expiry always dominate warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessState {
    Expired,
    Exhausted,
    ExpiringSoon,
    LowPlays,
    Active,
}

impl AccessState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Exhausted => "exhausted",
            Self::ExpiringSoon => "expiring_soon",
            Self::LowPlays => "low_plays",
            Self::Active => "active",
        }
    }
}
