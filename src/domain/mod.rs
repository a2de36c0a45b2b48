//! Domain types for the subscription probe
//!
//! Validated values that describe a probe run and the server it runs against,
//! so an invalid plan cannot be constructed.

pub mod image;
pub mod probe_types;

pub use image::*;
pub use probe_types::*;
