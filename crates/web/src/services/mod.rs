//! Business logic services.
//!
//! - `auth` - Registration, login, and permission checks
//! - `printers` - Validated printer create/update/delete
//!
//! Route handlers stay thin and call into these; services only depend on the
//! storage traits, so tests run them against the in-memory implementations.

pub mod auth;
pub mod printers;

pub use printers::{PrinterError, PrinterService};
