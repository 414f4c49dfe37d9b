//! National identity directory and the registry of issued licenses.
//!
//! The identity directory is an external system of record: the portal reads
//! it to resolve applicants but never writes to it. The license registry is
//! owned here; licenses are written only by the application workflow when a
//! record reaches an approved state.

pub mod domain;
pub mod lookup;
pub mod repository;
pub mod router;

pub use domain::{Identity, License, LicenseId, LicenseValidity, NationalId};
pub use lookup::{LicenseDetailsView, LicenseLookupService, LookupError};
pub use repository::{IdentityDirectory, LicenseRegistry, RepositoryError};
pub use router::license_router;
