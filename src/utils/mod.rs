//! Shared helpers used across the catalog and query boundaries.

pub mod validation;
