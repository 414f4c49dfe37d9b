use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;

use super::domain::{LicenseId, LicenseValidity};
use super::repository::{LicenseRegistry, RepositoryError};

/// Read-side service answering validity checks and detail lookups against
/// the license registry.
pub struct LicenseLookupService<L> {
    registry: Arc<L>,
}

impl<L> LicenseLookupService<L>
where
    L: LicenseRegistry + 'static,
{
    pub fn new(registry: Arc<L>) -> Self {
        Self { registry }
    }

    /// Compare the license expiry to `today`.
    pub fn validity(
        &self,
        license_id: &LicenseId,
        today: NaiveDate,
    ) -> Result<LicenseValidity, LookupError> {
        let license = self
            .registry
            .fetch(license_id)?
            .ok_or(LookupError::NotFound)?;
        Ok(license.validity_on(today))
    }

    /// Full detail view including the computed validity status.
    pub fn details(
        &self,
        license_id: &LicenseId,
        today: NaiveDate,
    ) -> Result<LicenseDetailsView, LookupError> {
        let license = self
            .registry
            .fetch(license_id)?
            .ok_or(LookupError::NotFound)?;

        Ok(LicenseDetailsView {
            status: license.validity_on(today).label(),
            license_id: license.license_id,
            holder: license.holder.0,
            issue_date: license.issue_date,
            expiry_date: license.expiry_date,
        })
    }
}

/// Sanitized license view returned by the detail endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseDetailsView {
    pub license_id: LicenseId,
    pub holder: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub status: &'static str,
}

/// Error raised by license lookups.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("license not found")]
    NotFound,
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
