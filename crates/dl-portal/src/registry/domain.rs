use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier wrapper for national identity records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalId(pub String);

/// Identifier wrapper for issued licenses. Opaque token, unique across the
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LicenseId(pub String);

impl LicenseId {
    /// Mint a fresh opaque license token.
    pub fn generate() -> Self {
        Self(format!("DL-{}", Uuid::new_v4().simple()))
    }
}

/// A person record in the external national identity directory. Immutable
/// from the portal's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub national_id: NationalId,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
}

/// An issued physical driving license.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub license_id: LicenseId,
    pub holder: NationalId,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    /// Blob-storage key for the passport photo; the portal stores the key
    /// only, never the bytes.
    pub photo_key: String,
}

impl License {
    /// A license is valid strictly before its expiry date; the expiry date
    /// itself counts as expired.
    pub fn validity_on(&self, date: NaiveDate) -> LicenseValidity {
        if date < self.expiry_date {
            LicenseValidity::Valid
        } else {
            LicenseValidity::Expired
        }
    }
}

/// Computed validity of a license relative to a query date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LicenseValidity {
    Valid,
    Expired,
}

impl LicenseValidity {
    pub const fn label(self) -> &'static str {
        match self {
            LicenseValidity::Valid => "valid",
            LicenseValidity::Expired => "expired",
        }
    }
}
