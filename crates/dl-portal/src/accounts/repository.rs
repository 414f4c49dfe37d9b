use uuid::Uuid;

use super::domain::Account;
pub use crate::registry::repository::RepositoryError;

/// Storage abstraction for portal accounts. `insert` must reject a duplicate
/// email with [`RepositoryError::Conflict`].
pub trait AccountRepository: Send + Sync {
    fn insert(&self, account: Account) -> Result<Account, RepositoryError>;
    fn find_by_email(&self, email: &str) -> Result<Option<Account>, RepositoryError>;
}

/// Revocation store for refresh-token identifiers.
pub trait TokenBlacklist: Send + Sync {
    /// Revoke a token id. Returns `false` when it was already revoked.
    fn revoke(&self, jti: Uuid) -> Result<bool, RepositoryError>;
    /// Read side of the store. Refresh tokens are only ever presented to
    /// logout, which detects replays through `revoke`'s return value, so no
    /// portal operation calls this; it exists for stores and tests to audit
    /// revocation state.
    fn is_revoked(&self, jti: &Uuid) -> Result<bool, RepositoryError>;
}
