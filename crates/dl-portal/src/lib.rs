//! Library backing the national driver's license administration portal.
//!
//! The portal is a thin REST surface over three stores: the external national
//! identity directory, the registry of issued licenses, and the application
//! workflow records. The workflow engine in [`workflows::applications`] is the
//! interesting part; the rest is account handling and lookup plumbing.

pub mod accounts;
pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
pub mod workflows;
