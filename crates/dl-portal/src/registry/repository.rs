use super::domain::{Identity, License, LicenseId, NationalId};

/// Error enumeration shared by the portal's storage abstractions.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Read-only view of the external national identity directory.
pub trait IdentityDirectory: Send + Sync {
    fn fetch(&self, id: &NationalId) -> Result<Option<Identity>, RepositoryError>;
}

/// Storage abstraction over issued licenses. `insert` must reject a duplicate
/// license identifier with [`RepositoryError::Conflict`].
pub trait LicenseRegistry: Send + Sync {
    fn insert(&self, license: License) -> Result<License, RepositoryError>;
    fn fetch(&self, id: &LicenseId) -> Result<Option<License>, RepositoryError>;
}
