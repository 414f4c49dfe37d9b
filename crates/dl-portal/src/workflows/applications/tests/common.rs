use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{Duration, Local, NaiveDate};
use serde_json::Value;

use crate::registry::domain::{Identity, License, LicenseId, NationalId};
use crate::registry::repository::{IdentityDirectory, LicenseRegistry, RepositoryError};
use crate::workflows::applications::domain::{
    Application, ApplicationId, ApplicationType, NewApplicationSubmission, ReissueSubmission,
    RenewalSubmission,
};
use crate::workflows::applications::repository::ApplicationRepository;
use crate::workflows::applications::service::LicenseApplicationService;

pub(super) const HOLDER: &str = "NID-42";
pub(super) const SEED_LICENSE: &str = "DL-SEED";

#[derive(Default)]
pub(super) struct MemoryIdentities {
    records: Mutex<HashMap<NationalId, Identity>>,
}

impl MemoryIdentities {
    pub(super) fn seed(&self, identity: Identity) {
        self.records
            .lock()
            .expect("identity mutex poisoned")
            .insert(identity.national_id.clone(), identity);
    }
}

impl IdentityDirectory for MemoryIdentities {
    fn fetch(&self, id: &NationalId) -> Result<Option<Identity>, RepositoryError> {
        let guard = self.records.lock().expect("identity mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryLicenses {
    records: Mutex<HashMap<LicenseId, License>>,
}

impl LicenseRegistry for MemoryLicenses {
    fn insert(&self, license: License) -> Result<License, RepositoryError> {
        let mut guard = self.records.lock().expect("license mutex poisoned");
        if guard.contains_key(&license.license_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(license.license_id.clone(), license.clone());
        Ok(license)
    }

    fn fetch(&self, id: &LicenseId) -> Result<Option<License>, RepositoryError> {
        let guard = self.records.lock().expect("license mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(super) struct MemoryApplications {
    records: Mutex<Vec<Application>>,
}

impl MemoryApplications {
    pub(super) fn len(&self) -> usize {
        self.records.lock().expect("application mutex poisoned").len()
    }
}

impl ApplicationRepository for MemoryApplications {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        // The in-flight renewal constraint lives inside this critical section.
        if application.application_type == ApplicationType::Renewal {
            let duplicate = guard.iter().any(|existing| {
                existing.application_type == ApplicationType::Renewal
                    && existing.status.is_in_flight()
                    && existing.national_id == application.national_id
                    && existing.license == application.license
            });
            if duplicate {
                return Err(RepositoryError::Conflict);
            }
        }
        guard.push(application.clone());
        Ok(application)
    }

    fn update(&self, application: Application) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        match guard
            .iter_mut()
            .find(|existing| existing.application_id == application.application_id)
        {
            Some(slot) => {
                *slot = application;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .find(|application| &application.application_id == id)
            .cloned())
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard.clone())
    }

    fn find_in_flight(
        &self,
        national_id: &NationalId,
        license_id: &LicenseId,
        application_type: ApplicationType,
    ) -> Result<Option<Application>, RepositoryError> {
        let guard = self.records.lock().expect("application mutex poisoned");
        Ok(guard
            .iter()
            .filter(|application| {
                application.application_type == application_type
                    && application.status.is_in_flight()
                    && &application.national_id == national_id
                    && application.license.as_ref() == Some(license_id)
            })
            .max_by_key(|application| {
                match application_type {
                    ApplicationType::Reissue => application.reissue_applied_at,
                    _ => application.renewal_applied_at,
                }
                .unwrap_or(application.applied_at)
            })
            .cloned())
    }
}

/// Repository that fails every call, for exercising 500 paths.
pub(super) struct UnavailableApplications;

impl ApplicationRepository for UnavailableApplications {
    fn insert(&self, _application: Application) -> Result<Application, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update(&self, _application: Application) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &ApplicationId) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn find_in_flight(
        &self,
        _national_id: &NationalId,
        _license_id: &LicenseId,
        _application_type: ApplicationType,
    ) -> Result<Option<Application>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Registry that rejects every insert, for exercising issuance failures.
pub(super) struct UnavailableLicenses;

impl LicenseRegistry for UnavailableLicenses {
    fn insert(&self, _license: License) -> Result<License, RepositoryError> {
        Err(RepositoryError::Unavailable("registry offline".to_string()))
    }

    fn fetch(&self, _id: &LicenseId) -> Result<Option<License>, RepositoryError> {
        Ok(None)
    }
}

pub(super) type TestService =
    LicenseApplicationService<MemoryIdentities, MemoryLicenses, MemoryApplications>;

pub(super) fn holder() -> NationalId {
    NationalId(HOLDER.to_string())
}

pub(super) fn seed_license_id() -> LicenseId {
    LicenseId(SEED_LICENSE.to_string())
}

pub(super) fn future_expiry() -> NaiveDate {
    Local::now().date_naive() + Duration::days(365)
}

pub(super) fn build_service() -> (
    TestService,
    Arc<MemoryIdentities>,
    Arc<MemoryLicenses>,
    Arc<MemoryApplications>,
) {
    let identities = Arc::new(MemoryIdentities::default());
    identities.seed(Identity {
        national_id: holder(),
        full_name: "Ada Obi".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).expect("valid date"),
    });

    let licenses = Arc::new(MemoryLicenses::default());
    licenses
        .insert(License {
            license_id: seed_license_id(),
            holder: holder(),
            issue_date: future_expiry() - Duration::days(365 * 5),
            expiry_date: future_expiry(),
            photo_key: format!("passport_photos/{HOLDER}.jpg"),
        })
        .expect("seed license inserts");

    let repository = Arc::new(MemoryApplications::default());
    let service = LicenseApplicationService::new(
        identities.clone(),
        licenses.clone(),
        repository.clone(),
    );
    (service, identities, licenses, repository)
}

pub(super) fn new_submission() -> NewApplicationSubmission {
    NewApplicationSubmission {
        national_id: holder(),
        is_motor_cycle: true,
        is_motor_vehicle: false,
        certificate_number: 100,
        local_government_area: "Ikeja".to_string(),
        state: "Lagos".to_string(),
        center_location: "Ikeja Licensing Office".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: "+2348012345678".to_string(),
    }
}

pub(super) fn renewal_submission() -> RenewalSubmission {
    RenewalSubmission {
        national_id: Some(holder()),
        is_motor_cycle: false,
        is_motor_vehicle: true,
        certificate_number: 100,
        local_government_area: "Ikeja".to_string(),
        state: "Lagos".to_string(),
        center_location: "Ikeja Licensing Office".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: "+2348012345678".to_string(),
    }
}

pub(super) fn reissue_submission() -> ReissueSubmission {
    ReissueSubmission {
        national_id: Some(holder()),
        is_motor_cycle: false,
        is_motor_vehicle: true,
        certificate_number: 100,
        local_government_area: "Ikeja".to_string(),
        state: "Lagos".to_string(),
        center_location: "Ikeja Licensing Office".to_string(),
        email: "ada@example.com".to_string(),
        phone_number: "+2348012345678".to_string(),
        reissue_reason: Some("stolen wallet".to_string()),
        reissue_document_key: Some("police_reports/cr-2026-118.pdf".to_string()),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
