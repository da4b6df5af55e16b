//! Core types and error handling for daoforge.
//!
//! This module hosts the crate-wide error type and the user-facing error
//! presentation layer. Component-specific error enums (resolution failures,
//! planning failures) live with their components and convert into
//! [`ForgeError`] or `anyhow::Error` at the boundary; this module owns the
//! taxonomy shared by all of them.

pub mod error;

pub use error::{ErrorContext, ForgeError, user_friendly_error};
