//! Parti Poodles Core - Shared types library.
//!
//! This crate provides common types used across all Parti Poodles components:
//! - `site` - Public website and admin back office
//! - `cli` - Command-line tools for migrations, admin users and seeding
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no database access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed record IDs, emails, statuses, prices and image orientation
//! - [`clock`] - Time source used to stamp record timestamps

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod clock;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock, next_timestamp};
pub use types::*;
