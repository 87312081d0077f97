//! Clementine Core - Shared domain types.
//!
//! This crate provides the validated domain types used across all
//! Clementine components:
//! - `api` - REST backend binary
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access, no
//! HTTP clients. Every value that crosses the API boundary is parsed into
//! one of these types before any business logic runs, so the rest of the
//! workspace never handles raw, unvalidated strings.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, usernames, prices,
//!   quantities, and roles

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
