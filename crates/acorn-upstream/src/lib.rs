//! HTTP backend for the Acorn claims BFF.
//!
//! Wraps [`reqwest`] so every [`ClaimsUpstream`](acorn_core::upstream::ClaimsUpstream)
//! call becomes exactly one request against the upstream claims API.

mod client;
mod form;

pub mod error;

pub use client::HttpUpstream;
pub use error::{Error, Result};

#[cfg(test)]
mod tests;
