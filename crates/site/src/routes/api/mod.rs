//! JSON API handlers.
//!
//! - `functions` - Named query and mutation functions (`table:function`)
//! - `orientation` - EXIF orientation lookup for client-side image views

pub mod functions;
pub mod orientation;
