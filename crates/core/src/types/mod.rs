//! Core types for Parti Poodles.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod orientation;
pub mod price;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use orientation::Orientation;
pub use price::{PriceRange, format_dollars};
pub use status::*;
