//! Workflow engines driving license administration.

pub mod applications;
