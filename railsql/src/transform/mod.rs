//! Transformation module.
//!
//! This module handles CSV to SQL statement transformation:
//! - Flags: Boolean literal parsing for membership columns
//! - Engine: Id assignment and lazy statement derivation
//! - Pipeline: Reader → engine → emitter driver with rollback handling

pub mod engine;
pub mod flags;
pub mod pipeline;

pub use engine::TransformEngine;
pub use flags::parse_flag;
pub use pipeline::*;
