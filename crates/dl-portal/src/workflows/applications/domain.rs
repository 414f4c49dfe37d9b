use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::domain::{LicenseId, NationalId};

/// Identifier wrapper for license applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub Uuid);

impl ApplicationId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The three kinds of request the portal processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationType {
    New,
    Renewal,
    Reissue,
}

/// Status tracked throughout the application workflow. Labels match the
/// registry's historical records, so renames here are breaking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationStatus {
    Pending,
    Processing,
    Approved,
    #[serde(rename = "Ready for Printing")]
    ReadyForPrinting,
    #[serde(rename = "Renewal Pending")]
    RenewalPending,
    #[serde(rename = "Renewal Processing")]
    RenewalProcessing,
    Renewed,
    #[serde(rename = "Reissue Pending")]
    ReissuePending,
    #[serde(rename = "Reissue Processing")]
    ReissueProcessing,
    Reissued,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Processing => "Processing",
            ApplicationStatus::Approved => "Approved",
            ApplicationStatus::ReadyForPrinting => "Ready for Printing",
            ApplicationStatus::RenewalPending => "Renewal Pending",
            ApplicationStatus::RenewalProcessing => "Renewal Processing",
            ApplicationStatus::Renewed => "Renewed",
            ApplicationStatus::ReissuePending => "Reissue Pending",
            ApplicationStatus::ReissueProcessing => "Reissue Processing",
            ApplicationStatus::Reissued => "Reissued",
        }
    }

    /// An application still awaiting a decision for its type. Terminal
    /// states (Approved, Ready for Printing, Renewed, Reissued) are not
    /// in flight.
    pub const fn is_in_flight(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending
                | ApplicationStatus::Processing
                | ApplicationStatus::RenewalPending
                | ApplicationStatus::RenewalProcessing
                | ApplicationStatus::ReissuePending
                | ApplicationStatus::ReissueProcessing
        )
    }

    /// The single permitted successor in each type's chain:
    ///
    /// Pending -> Processing -> Approved -> Ready for Printing
    /// Renewal Pending -> Renewal Processing -> Renewed
    /// Reissue Pending -> Reissue Processing -> Reissued
    pub const fn next(self) -> Option<ApplicationStatus> {
        match self {
            ApplicationStatus::Pending => Some(ApplicationStatus::Processing),
            ApplicationStatus::Processing => Some(ApplicationStatus::Approved),
            ApplicationStatus::Approved => Some(ApplicationStatus::ReadyForPrinting),
            ApplicationStatus::RenewalPending => Some(ApplicationStatus::RenewalProcessing),
            ApplicationStatus::RenewalProcessing => Some(ApplicationStatus::Renewed),
            ApplicationStatus::ReissuePending => Some(ApplicationStatus::ReissueProcessing),
            ApplicationStatus::ReissueProcessing => Some(ApplicationStatus::Reissued),
            ApplicationStatus::ReadyForPrinting
            | ApplicationStatus::Renewed
            | ApplicationStatus::Reissued => None,
        }
    }

    pub fn allows_transition_to(self, target: ApplicationStatus) -> bool {
        self.next() == Some(target)
    }
}

/// A submitted request for a first-time license.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewApplicationSubmission {
    pub national_id: NationalId,
    #[serde(default)]
    pub is_motor_cycle: bool,
    #[serde(default)]
    pub is_motor_vehicle: bool,
    pub certificate_number: u32,
    pub local_government_area: String,
    pub state: String,
    pub center_location: String,
    pub email: String,
    pub phone_number: String,
}

/// A submitted renewal for an existing license. The national id is validated
/// by the service rather than the deserializer so its absence surfaces as a
/// workflow error, not a malformed-body rejection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewalSubmission {
    #[serde(default)]
    pub national_id: Option<NationalId>,
    #[serde(default)]
    pub is_motor_cycle: bool,
    #[serde(default)]
    pub is_motor_vehicle: bool,
    pub certificate_number: u32,
    pub local_government_area: String,
    pub state: String,
    pub center_location: String,
    pub email: String,
    pub phone_number: String,
}

/// A submitted reissue for a lost, stolen, or damaged license. Vehicle-class
/// flags arrive from form clients as text and are parsed leniently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReissueSubmission {
    #[serde(default)]
    pub national_id: Option<NationalId>,
    #[serde(default, deserialize_with = "deserialize_text_flag")]
    pub is_motor_cycle: bool,
    #[serde(default, deserialize_with = "deserialize_text_flag")]
    pub is_motor_vehicle: bool,
    pub certificate_number: u32,
    pub local_government_area: String,
    pub state: String,
    pub center_location: String,
    pub email: String,
    pub phone_number: String,
    #[serde(default)]
    pub reissue_reason: Option<String>,
    /// Blob-storage key of the supporting document (e.g. a police report).
    #[serde(default)]
    pub reissue_document_key: Option<String>,
}

/// Accepts a native boolean or its textual form; only a case-insensitive
/// "true" maps to `true`.
pub(crate) fn deserialize_text_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(value) => Ok(value.trim().eq_ignore_ascii_case("true")),
    }
}

/// One application record as persisted and returned by the API. Applications
/// are never deleted; superseded or abandoned ones remain as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Application {
    pub application_id: ApplicationId,
    pub application_type: ApplicationType,
    pub status: ApplicationStatus,
    pub national_id: NationalId,
    /// Absent for New applications until one is issued on approval.
    pub license: Option<LicenseId>,
    pub is_motor_cycle: bool,
    pub is_motor_vehicle: bool,
    pub certificate_number: u32,
    pub local_government_area: String,
    pub state: String,
    pub center_location: String,
    pub email: String,
    pub phone_number: String,
    pub applied_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_license_id: Option<LicenseId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_applied_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub renewal_approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reissue_applied_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reissue_approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reissue_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reissue_document_key: Option<String>,
}
