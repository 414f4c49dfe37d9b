//! The license application workflow engine.
//!
//! Applications move through a per-type status chain (New, Renewal, Reissue)
//! with conflict guards on submission and an enforced transition table on
//! review. The store owns the single-in-flight-renewal invariant so the
//! submission guard cannot race.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationType, NewApplicationSubmission,
    ReissueSubmission, RenewalSubmission,
};
pub use repository::{ApplicationRepository, RepositoryError};
pub use router::application_router;
pub use service::{ApplicationError, LicenseApplicationService};
