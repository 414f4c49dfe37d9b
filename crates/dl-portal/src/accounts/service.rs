use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, SaltString};
use argon2::{Argon2, PasswordVerifier};
use chrono::Utc;
use tracing::info;

use super::domain::{Account, AccountView, Registration};
use super::repository::{AccountRepository, RepositoryError, TokenBlacklist};
use super::tokens::{TokenError, TokenIssuer, TokenKind, TokenPair};
use crate::registry::repository::IdentityDirectory;

/// Account lifecycle service: registration, credential checks, and refresh
/// token revocation.
pub struct AccountService<I, R, B> {
    identities: Arc<I>,
    repository: Arc<R>,
    blacklist: Arc<B>,
    tokens: Arc<TokenIssuer>,
}

impl<I, R, B> AccountService<I, R, B>
where
    I: IdentityDirectory + 'static,
    R: AccountRepository + 'static,
    B: TokenBlacklist + 'static,
{
    pub fn new(
        identities: Arc<I>,
        repository: Arc<R>,
        blacklist: Arc<B>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            identities,
            repository,
            blacklist,
            tokens,
        }
    }

    /// Create an account linked to a known national id and hand out the
    /// first token pair.
    pub fn register(
        &self,
        registration: Registration,
    ) -> Result<(AccountView, TokenPair), AccountError> {
        let email = registration.email.trim().to_ascii_lowercase();
        if email.is_empty() {
            return Err(AccountError::MissingField("email"));
        }
        if registration.password.is_empty() {
            return Err(AccountError::MissingField("password"));
        }
        self.identities
            .fetch(&registration.national_id)?
            .ok_or(AccountError::UnknownNationalId)?;

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(registration.password.as_bytes(), &salt)
            .map_err(|err| AccountError::Hashing(err.to_string()))?
            .to_string();

        let account = Account {
            national_id: registration.national_id,
            email,
            first_name: registration.first_name,
            last_name: registration.last_name,
            password_hash,
            is_active: true,
            is_staff: false,
            is_superuser: false,
            date_joined: Utc::now(),
        };

        let stored = self.repository.insert(account).map_err(|err| match err {
            RepositoryError::Conflict => AccountError::EmailTaken,
            other => AccountError::Repository(other),
        })?;

        let pair = self.tokens.issue_pair(&stored.national_id)?;
        info!(email = %stored.email, "account registered");
        Ok((stored.view(), pair))
    }

    /// Verify credentials and issue a fresh token pair. Unknown emails,
    /// wrong passwords, and deactivated accounts all report the same way.
    pub fn login(&self, email: &str, password: &str) -> Result<TokenPair, AccountError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AccountError::MissingCredentials);
        }

        let account = self
            .repository
            .find_by_email(&email.trim().to_ascii_lowercase())?
            .ok_or(AccountError::InvalidCredentials)?;
        if !account.is_active {
            return Err(AccountError::InvalidCredentials);
        }

        let parsed = PasswordHash::new(&account.password_hash)
            .map_err(|err| AccountError::Hashing(err.to_string()))?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| AccountError::InvalidCredentials)?;

        Ok(self.tokens.issue_pair(&account.national_id)?)
    }

    /// Revoke a refresh token. Replayed or malformed tokens are rejected;
    /// the router collapses every failure into a generic bad request.
    pub fn logout(&self, refresh_token: &str) -> Result<(), AccountError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        if !self.blacklist.revoke(claims.jti)? {
            return Err(AccountError::TokenRevoked);
        }
        info!(sub = %claims.sub, "refresh token revoked");
        Ok(())
    }
}

/// Error raised by account operations.
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("please provide both email and password")]
    MissingCredentials,
    #[error("national id not found")]
    UnknownNationalId,
    #[error("email already registered")]
    EmailTaken,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("refresh token already revoked")]
    TokenRevoked,
    #[error("password hashing failed: {0}")]
    Hashing(String),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
