//! promforge core: exposition wire format, name validation, and error types.
//!
//! This crate defines the text exposition contract and the error surface
//! shared by the client crate and by external collectors. It carries no
//! registry or metric state so it can be reused by custom exporters.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `MetricsError`/`Result` so a scrape
//! never crashes the instrumented process.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod exposition;
pub mod validation;

/// Shared result type.
pub use error::{ErrorKind, MetricsError, Result};
