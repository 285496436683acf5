//! Core types and trait definitions for the Acorn claims BFF.
//!
//! This crate is deliberately free of HTTP dependencies. The BFF and the
//! upstream client both depend on it; it depends on nothing proprietary.

pub mod claim;
pub mod error;
pub mod policy;
pub mod token;
pub mod upstream;
pub mod user;

pub use error::{Error, Result};
