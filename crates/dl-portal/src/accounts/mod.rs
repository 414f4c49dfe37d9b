//! Portal accounts: registration, login, and refresh-token revocation.
//!
//! Accounts are keyed by the holder's national id and authenticated with an
//! HS256 access/refresh token pair. Password hashing and token mechanics are
//! delegated to `argon2` and `jsonwebtoken`; this module only wires them to
//! the stores.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;
pub mod tokens;

#[cfg(test)]
mod tests;

pub use domain::{Account, AccountView, Registration};
pub use repository::{AccountRepository, RepositoryError, TokenBlacklist};
pub use router::account_router;
pub use service::{AccountError, AccountService};
pub use tokens::{
    require_auth, AuthenticatedHolder, Claims, TokenError, TokenIssuer, TokenKind, TokenPair,
};
