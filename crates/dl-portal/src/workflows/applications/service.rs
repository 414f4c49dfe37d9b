use std::sync::Arc;

use chrono::{Local, Months, Utc};
use tracing::{info, warn};

use super::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationType, NewApplicationSubmission,
    ReissueSubmission, RenewalSubmission,
};
use super::repository::{ApplicationRepository, RepositoryError};
use crate::registry::domain::{License, LicenseId, NationalId};
use crate::registry::repository::{IdentityDirectory, LicenseRegistry};

/// Term of a freshly issued or renewed license.
const LICENSE_TERM_MONTHS: u32 = 60;

/// The application workflow engine: submits, refreshes, and advances license
/// applications, consulting the identity directory and license registry for
/// referential checks and issuing licenses when a record reaches a terminal
/// state. Holds no state between calls; every operation reads the store,
/// decides, and writes back.
pub struct LicenseApplicationService<I, L, R> {
    identities: Arc<I>,
    licenses: Arc<L>,
    repository: Arc<R>,
}

impl<I, L, R> LicenseApplicationService<I, L, R>
where
    I: IdentityDirectory + 'static,
    L: LicenseRegistry + 'static,
    R: ApplicationRepository + 'static,
{
    pub fn new(identities: Arc<I>, licenses: Arc<L>, repository: Arc<R>) -> Self {
        Self {
            identities,
            licenses,
            repository,
        }
    }

    /// Submit a first-time application. The applicant must resolve in the
    /// identity directory; the record starts at Pending with no license.
    pub fn submit_new(
        &self,
        submission: NewApplicationSubmission,
    ) -> Result<Application, ApplicationError> {
        self.require_identity(&submission.national_id)?;

        let application = Application {
            application_id: ApplicationId::generate(),
            application_type: ApplicationType::New,
            status: ApplicationStatus::Pending,
            national_id: submission.national_id,
            license: None,
            is_motor_cycle: submission.is_motor_cycle,
            is_motor_vehicle: submission.is_motor_vehicle,
            certificate_number: submission.certificate_number,
            local_government_area: submission.local_government_area,
            state: submission.state,
            center_location: submission.center_location,
            email: submission.email,
            phone_number: submission.phone_number,
            applied_at: Utc::now(),
            previous_license_id: None,
            renewal_applied_at: None,
            renewal_approved_at: None,
            reissue_applied_at: None,
            reissue_approved_at: None,
            reissue_reason: None,
            reissue_document_key: None,
        };

        let stored = self.repository.insert(application)?;
        info!(application_id = %stored.application_id, "new application submitted");
        Ok(stored)
    }

    /// Submit a renewal against an existing license. Guards run in order and
    /// short-circuit: license exists, identity supplied and known, license is
    /// held by that identity, and no renewal is already in flight for the
    /// pair.
    pub fn submit_renewal(
        &self,
        license_id: &LicenseId,
        submission: RenewalSubmission,
    ) -> Result<Application, ApplicationError> {
        let national_id = self.check_renewal_target(license_id, submission.national_id.as_ref())?;

        if self
            .repository
            .find_in_flight(&national_id, license_id, ApplicationType::Renewal)?
            .is_some()
        {
            return Err(ApplicationError::RenewalInProgress);
        }

        let now = Utc::now();
        let application = Application {
            application_id: ApplicationId::generate(),
            application_type: ApplicationType::Renewal,
            status: ApplicationStatus::RenewalPending,
            national_id,
            license: Some(license_id.clone()),
            is_motor_cycle: submission.is_motor_cycle,
            is_motor_vehicle: submission.is_motor_vehicle,
            certificate_number: submission.certificate_number,
            local_government_area: submission.local_government_area,
            state: submission.state,
            center_location: submission.center_location,
            email: submission.email,
            phone_number: submission.phone_number,
            applied_at: now,
            previous_license_id: Some(license_id.clone()),
            renewal_applied_at: Some(now),
            renewal_approved_at: None,
            reissue_applied_at: None,
            reissue_approved_at: None,
            reissue_reason: None,
            reissue_document_key: None,
        };

        // The store re-checks the in-flight invariant inside its own lock, so
        // a concurrent duplicate that slipped past the read above still fails.
        let stored = self.repository.insert(application).map_err(|err| match err {
            RepositoryError::Conflict => ApplicationError::RenewalInProgress,
            other => ApplicationError::Repository(other),
        })?;
        info!(application_id = %stored.application_id, license_id = %license_id.0, "renewal application submitted");
        Ok(stored)
    }

    /// Refresh the in-flight renewal for the pair: re-applies the submitted
    /// fields, bumps the applied timestamp, and resets the status to Renewal
    /// Pending.
    pub fn update_renewal(
        &self,
        license_id: &LicenseId,
        submission: RenewalSubmission,
    ) -> Result<Application, ApplicationError> {
        let national_id = self.check_renewal_target(license_id, submission.national_id.as_ref())?;

        let mut application = self
            .repository
            .find_in_flight(&national_id, license_id, ApplicationType::Renewal)?
            .ok_or(ApplicationError::NotFound)?;

        application.status = ApplicationStatus::RenewalPending;
        application.is_motor_cycle = submission.is_motor_cycle;
        application.is_motor_vehicle = submission.is_motor_vehicle;
        application.certificate_number = submission.certificate_number;
        application.local_government_area = submission.local_government_area;
        application.state = submission.state;
        application.center_location = submission.center_location;
        application.email = submission.email;
        application.phone_number = submission.phone_number;
        application.renewal_applied_at = Some(Utc::now());

        self.repository.update(application.clone())?;
        Ok(application)
    }

    /// Submit a reissue against an existing license. Each accepted submission
    /// creates a distinct record; an in-flight renewal for the pair blocks a
    /// reissue, but another reissue does not.
    pub fn submit_reissue(
        &self,
        license_id: &LicenseId,
        submission: ReissueSubmission,
    ) -> Result<Application, ApplicationError> {
        let national_id = self.check_renewal_target(license_id, submission.national_id.as_ref())?;

        if self
            .repository
            .find_in_flight(&national_id, license_id, ApplicationType::Renewal)?
            .is_some()
        {
            return Err(ApplicationError::RenewalInProgress);
        }

        let reason = submission
            .reissue_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
            .map(str::to_string)
            .ok_or(ApplicationError::MissingField("reissue_reason"))?;

        let now = Utc::now();
        let application = Application {
            application_id: ApplicationId::generate(),
            application_type: ApplicationType::Reissue,
            status: ApplicationStatus::ReissuePending,
            national_id,
            license: Some(license_id.clone()),
            is_motor_cycle: submission.is_motor_cycle,
            is_motor_vehicle: submission.is_motor_vehicle,
            certificate_number: submission.certificate_number,
            local_government_area: submission.local_government_area,
            state: submission.state,
            center_location: submission.center_location,
            email: submission.email,
            phone_number: submission.phone_number,
            applied_at: now,
            previous_license_id: Some(license_id.clone()),
            renewal_applied_at: None,
            renewal_approved_at: None,
            reissue_applied_at: Some(now),
            reissue_approved_at: None,
            reissue_reason: Some(reason),
            reissue_document_key: submission.reissue_document_key,
        };

        let stored = self.repository.insert(application)?;
        info!(application_id = %stored.application_id, "reissue application submitted");
        Ok(stored)
    }

    /// Refresh the most recent in-flight reissue for the pair.
    pub fn update_reissue(
        &self,
        license_id: &LicenseId,
        submission: ReissueSubmission,
    ) -> Result<Application, ApplicationError> {
        let national_id = self.check_renewal_target(license_id, submission.national_id.as_ref())?;

        let mut application = self
            .repository
            .find_in_flight(&national_id, license_id, ApplicationType::Reissue)?
            .ok_or(ApplicationError::NotFound)?;

        application.status = ApplicationStatus::ReissuePending;
        application.is_motor_cycle = submission.is_motor_cycle;
        application.is_motor_vehicle = submission.is_motor_vehicle;
        application.certificate_number = submission.certificate_number;
        application.local_government_area = submission.local_government_area;
        application.state = submission.state;
        application.center_location = submission.center_location;
        application.email = submission.email;
        application.phone_number = submission.phone_number;
        application.reissue_applied_at = Some(Utc::now());
        if let Some(reason) = submission
            .reissue_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
        {
            application.reissue_reason = Some(reason.to_string());
        }
        if submission.reissue_document_key.is_some() {
            application.reissue_document_key = submission.reissue_document_key;
        }

        self.repository.update(application.clone())?;
        Ok(application)
    }

    /// Fetch one application by identifier.
    pub fn get(&self, id: &ApplicationId) -> Result<Application, ApplicationError> {
        self.repository
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)
    }

    /// All applications, in storage order. No pagination.
    pub fn list(&self) -> Result<Vec<Application>, ApplicationError> {
        Ok(self.repository.list()?)
    }

    /// Move an application one step along its type's status chain. Any other
    /// target is rejected and the record is left untouched. Reaching
    /// Approved, Renewed, or Reissued issues a license as a side effect.
    pub fn advance_status(
        &self,
        id: &ApplicationId,
        target: ApplicationStatus,
    ) -> Result<Application, ApplicationError> {
        let mut application = self
            .repository
            .fetch(id)?
            .ok_or(ApplicationError::NotFound)?;

        if !application.status.allows_transition_to(target) {
            return Err(ApplicationError::InvalidTransition {
                from: application.status.label(),
                to: target.label(),
            });
        }

        let previous = application.clone();
        let now = Utc::now();
        let issued = match target {
            ApplicationStatus::Approved => {
                let license = self.prepare_license(&application, None)?;
                application.license = Some(license.license_id.clone());
                Some(license)
            }
            ApplicationStatus::Renewed => {
                let license = self.prepare_license(&application, None)?;
                application.license = Some(license.license_id.clone());
                application.renewal_approved_at = Some(now);
                Some(license)
            }
            ApplicationStatus::Reissued => {
                // A reissued license is a replacement card: new identifier,
                // same expiry as the one it replaces.
                let previous_id = application
                    .previous_license_id
                    .as_ref()
                    .ok_or(ApplicationError::LicenseNotFound)?;
                let carried_expiry = self
                    .licenses
                    .fetch(previous_id)?
                    .ok_or(ApplicationError::LicenseNotFound)?
                    .expiry_date;
                let license = self.prepare_license(&application, Some(carried_expiry))?;
                application.license = Some(license.license_id.clone());
                application.reissue_approved_at = Some(now);
                Some(license)
            }
            _ => None,
        };

        application.status = target;
        self.repository.update(application.clone())?;

        // The record persists before the license: a rejected insert rolls
        // the record back, so the registry never holds a license that no
        // application references.
        if let Some(license) = issued {
            if let Err(error) = self.licenses.insert(license) {
                if let Err(rollback) = self.repository.update(previous) {
                    warn!(application_id = %application.application_id, error = %rollback, "rollback after rejected license insert failed");
                }
                return Err(ApplicationError::Repository(error));
            }
        }

        info!(application_id = %application.application_id, status = application.status.label(), "application advanced");
        Ok(application)
    }

    fn prepare_license(
        &self,
        application: &Application,
        expiry_override: Option<chrono::NaiveDate>,
    ) -> Result<License, ApplicationError> {
        let issue_date = Local::now().date_naive();
        let expiry_date = match expiry_override {
            Some(date) => date,
            None => issue_date
                .checked_add_months(Months::new(LICENSE_TERM_MONTHS))
                .ok_or_else(|| {
                    ApplicationError::Repository(RepositoryError::Unavailable(
                        "license expiry out of range".to_string(),
                    ))
                })?,
        };

        Ok(License {
            license_id: LicenseId::generate(),
            holder: application.national_id.clone(),
            issue_date,
            expiry_date,
            photo_key: format!("passport_photos/{}.jpg", application.national_id.0),
        })
    }

    /// Shared guard chain for operations that target an existing license:
    /// the license must exist, the identity must be supplied and known, and
    /// the license must be held by that identity.
    fn check_renewal_target(
        &self,
        license_id: &LicenseId,
        national_id: Option<&NationalId>,
    ) -> Result<NationalId, ApplicationError> {
        let license = self
            .licenses
            .fetch(license_id)?
            .ok_or(ApplicationError::LicenseNotFound)?;

        let national_id = national_id
            .ok_or(ApplicationError::MissingField("national_id"))?
            .clone();
        self.require_identity(&national_id)?;

        if license.holder != national_id {
            return Err(ApplicationError::HolderMismatch);
        }

        Ok(national_id)
    }

    fn require_identity(&self, national_id: &NationalId) -> Result<(), ApplicationError> {
        self.identities
            .fetch(national_id)?
            .ok_or(ApplicationError::IdentityNotFound)?;
        Ok(())
    }
}

/// Error raised by the application workflow engine.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("national id not found")]
    IdentityNotFound,
    #[error("license not found")]
    LicenseNotFound,
    #[error("application not found")]
    NotFound,
    #[error("license is not held by the supplied national id")]
    HolderMismatch,
    #[error("a renewal application is already in progress for this license")]
    RenewalInProgress,
    #[error("cannot transition from '{from}' to '{to}'")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
