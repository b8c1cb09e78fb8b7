//! Printer Registry Core - Shared types library.
//!
//! This crate provides common types used across all printer registry components:
//! - `web` - The printer management site (listing, CRUD, login/registration)
//! - `cli` - Command-line tools for migrations, users, and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, usernames, permissions, and printer field data
//! - [`validation`] - Validation rules applied to submitted printer data

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;
pub mod validation;

pub use types::*;
pub use validation::ValidationError;
