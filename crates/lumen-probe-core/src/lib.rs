//! Lumen Probe Core Library
//!
//! Parsing, validation, and content quality analysis for tab-separated
//! prediction output, plus the trial record types the harness persists.

pub mod error;
pub mod logging;
pub mod quality;
pub mod schema;
pub mod tabular;
pub mod trial;
pub mod validate;
