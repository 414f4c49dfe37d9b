use chrono::{Months, NaiveDate};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use dl_portal::accounts::{Account, AccountRepository, TokenBlacklist};
use dl_portal::registry::{Identity, IdentityDirectory, License, LicenseId, LicenseRegistry, NationalId, RepositoryError};
use dl_portal::workflows::applications::{
    Application, ApplicationId, ApplicationRepository, ApplicationType,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Stand-in for the national identity directory. Production deployments
/// replace this with a client for the civil registry.
#[derive(Default)]
pub(crate) struct InMemoryIdentityDirectory {
    records: Mutex<HashMap<NationalId, Identity>>,
}

impl InMemoryIdentityDirectory {
    pub(crate) fn seed(&self, identity: Identity) {
        self.records
            .lock()
            .expect("identity mutex poisoned")
            .insert(identity.national_id.clone(), identity);
    }
}

impl IdentityDirectory for InMemoryIdentityDirectory {
    fn fetch(&self, id: &NationalId) -> Result<Option<Identity>, RepositoryError> {
        let guard = self.records.lock().expect("identity mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryLicenseRegistry {
    records: Mutex<HashMap<LicenseId, License>>,
}

impl LicenseRegistry for InMemoryLicenseRegistry {
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
pub(crate) struct InMemoryApplicationRepository {
    records: Mutex<Vec<Application>>,
}

impl ApplicationRepository for InMemoryApplicationRepository {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError> {
        let mut guard = self.records.lock().expect("application mutex poisoned");
        // The single-in-flight-renewal constraint is enforced inside this
        // critical section so concurrent submissions cannot both pass it.
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

#[derive(Default)]
pub(crate) struct InMemoryAccountStore {
    records: Mutex<HashMap<String, Account>>,
}

impl AccountRepository for InMemoryAccountStore {
    fn insert(&self, account: Account) -> Result<Account, RepositoryError> {
        let mut guard = self.records.lock().expect("account mutex poisoned");
        if guard.contains_key(&account.email) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(account.email.clone(), account.clone());
        Ok(account)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError> {
        let guard = self.records.lock().expect("account mutex poisoned");
        Ok(guard.get(email).cloned())
    }
}

#[derive(Default)]
pub(crate) struct InMemoryTokenBlacklist {
    revoked: Mutex<HashSet<Uuid>>,
}

impl TokenBlacklist for InMemoryTokenBlacklist {
    fn revoke(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let mut guard = self.revoked.lock().expect("blacklist mutex poisoned");
        Ok(guard.insert(jti))
    }

    fn is_revoked(&self, jti: &Uuid) -> Result<bool, RepositoryError> {
        let guard = self.revoked.lock().expect("blacklist mutex poisoned");
        Ok(guard.contains(jti))
    }
}

/// Seed data for non-production environments: a handful of identities the
/// registry would normally resolve, plus one already-issued license.
pub(crate) fn seed_demo_records(
    identities: &InMemoryIdentityDirectory,
    licenses: &InMemoryLicenseRegistry,
) -> Result<(), RepositoryError> {
    let issue_date = NaiveDate::from_ymd_opt(2023, 3, 14).expect("valid seed date");
    let expiry_date = issue_date
        .checked_add_months(Months::new(60))
        .expect("valid seed expiry");

    for (national_id, full_name, year, month, day) in [
        ("NID-1001", "Adaeze Okafor", 1990, 6, 2),
        ("NID-1002", "Musa Bello", 1984, 11, 19),
        ("NID-1003", "Chiamaka Eze", 1997, 2, 8),
    ] {
        identities.seed(Identity {
            national_id: NationalId(national_id.to_string()),
            full_name: full_name.to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(year, month, day)
                .expect("valid seed birth date"),
        });
    }

    licenses.insert(License {
        license_id: LicenseId("DL-2023-0001".to_string()),
        holder: NationalId("NID-1002".to_string()),
        issue_date,
        expiry_date,
        photo_key: "photos/nid-1002.jpg".to_string(),
    })?;

    Ok(())
}
