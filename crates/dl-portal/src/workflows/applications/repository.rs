use super::domain::{Application, ApplicationId, ApplicationType};
use crate::registry::domain::{LicenseId, NationalId};
pub use crate::registry::repository::RepositoryError;

/// Storage abstraction for application records.
///
/// The store, not the caller, owns the single-in-flight-renewal invariant:
/// `insert` of a Renewal application must atomically fail with
/// [`RepositoryError::Conflict`] when an in-flight Renewal already exists for
/// the same (national id, license) pair, so two concurrent submissions cannot
/// both pass a read-side check. Reissue inserts are never deduplicated.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: Application) -> Result<Application, RepositoryError>;
    fn update(&self, application: Application) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<Application>, RepositoryError>;
    fn list(&self) -> Result<Vec<Application>, RepositoryError>;
    /// Most recently applied in-flight application of the given type for the
    /// (national id, license) pair.
    fn find_in_flight(
        &self,
        national_id: &NationalId,
        license_id: &LicenseId,
        application_type: ApplicationType,
    ) -> Result<Option<Application>, RepositoryError>;
}
