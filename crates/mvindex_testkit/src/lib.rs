//! # mvindex Testkit
//!
//! Test utilities for mvindex.
//!
//! This crate provides:
//! - Table fixtures and tracing setup
//! - Property-based test generators using proptest
//! - A model-checking harness for tables and their indexes
//! - Fuzz testing harnesses
//! - Stress testing utilities
//! - Key encoding test vectors
//!
//! ## Usage
//!
//! ```rust
//! use mvindex_testkit::prelude::*;
//!
//! let mut harness = IntegrationHarness::new();
//! harness.add("ann", Some("ann@example.com"), Some(30));
//! harness.verify_all();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod fuzz;
pub mod generators;
pub mod integration;
pub mod stress;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::fuzz::*;
    pub use crate::generators::*;
    pub use crate::integration::*;
    pub use crate::stress::*;
    pub use crate::vectors::*;
}

pub use fixtures::*;
pub use fuzz::*;
pub use generators::*;
pub use integration::*;
pub use stress::*;
pub use vectors::*;
