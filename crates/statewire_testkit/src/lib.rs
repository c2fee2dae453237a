//! # statewire testkit
//!
//! Test utilities for the statewire bridge.
//!
//! This crate provides:
//! - A recording [`LocalScope`](statewire_core::LocalScope)
//!   implementation that logs every pulled field
//! - A bridge harness wiring a context, an in-memory remote and a
//!   recording scope together, with a round-trip driver
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```rust
//! use statewire_testkit::prelude::*;
//! use statewire_core::{BindingModifiers, FieldSpec};
//! use serde_json::json;
//!
//! let harness = BridgeHarness::with_state(json!({"count": 1}));
//! let _binding = harness.bind(FieldSpec::names(["count"]), BindingModifiers::default());
//!
//! harness.round_trip("c1");
//! assert_eq!(harness.scope.last_value("count"), Some(json!(1)));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
}

pub use fixtures::*;
pub use generators::*;
