use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use crate::accounts::domain::{Account, Registration};
use crate::accounts::repository::{AccountRepository, RepositoryError, TokenBlacklist};
use crate::accounts::service::AccountService;
use crate::accounts::tokens::TokenIssuer;
use crate::config::AuthConfig;
use crate::registry::domain::{Identity, NationalId};
use crate::registry::repository::IdentityDirectory;

pub(super) const HOLDER: &str = "NID-42";

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
pub(super) struct MemoryAccounts {
    records: Mutex<HashMap<String, Account>>,
}

impl AccountRepository for MemoryAccounts {
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
pub(super) struct MemoryBlacklist {
    revoked: Mutex<HashSet<Uuid>>,
}

impl TokenBlacklist for MemoryBlacklist {
    fn revoke(&self, jti: Uuid) -> Result<bool, RepositoryError> {
        let mut guard = self.revoked.lock().expect("blacklist mutex poisoned");
        Ok(guard.insert(jti))
    }

    fn is_revoked(&self, jti: &Uuid) -> Result<bool, RepositoryError> {
        let guard = self.revoked.lock().expect("blacklist mutex poisoned");
        Ok(guard.contains(jti))
    }
}

pub(super) type TestService = AccountService<MemoryIdentities, MemoryAccounts, MemoryBlacklist>;

pub(super) fn auth_config() -> AuthConfig {
    AuthConfig {
        token_secret: "unit-test-secret".to_string(),
        access_ttl_minutes: 15,
        refresh_ttl_days: 7,
    }
}

pub(super) fn issuer() -> Arc<TokenIssuer> {
    Arc::new(TokenIssuer::new(&auth_config()))
}

pub(super) fn holder() -> NationalId {
    NationalId(HOLDER.to_string())
}

pub(super) fn build_service() -> (TestService, Arc<MemoryBlacklist>, Arc<TokenIssuer>) {
    let identities = Arc::new(MemoryIdentities::default());
    identities.seed(Identity {
        national_id: holder(),
        full_name: "Ada Obi".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 6, 15).expect("valid date"),
    });

    let blacklist = Arc::new(MemoryBlacklist::default());
    let tokens = issuer();
    let service = AccountService::new(
        identities,
        Arc::new(MemoryAccounts::default()),
        blacklist.clone(),
        tokens.clone(),
    );
    (service, blacklist, tokens)
}

pub(super) fn registration() -> Registration {
    Registration {
        national_id: holder(),
        email: "ada@example.com".to_string(),
        password: "correct horse battery staple".to_string(),
        first_name: "Ada".to_string(),
        last_name: "Obi".to_string(),
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
