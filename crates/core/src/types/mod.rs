//! Core types for the printer registry.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod permission;
pub mod printer;
pub mod username;

pub use id::*;
pub use permission::Permission;
pub use printer::{PrinterData, PrinterField, PrinterInput};
pub use username::{Username, UsernameError};
