//! Shared data model for needful macros and engine settings.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{ValidationError, validate_library, validate_settings};
