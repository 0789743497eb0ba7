//! Test utilities for Wireup unit tests.
//!
//! Fluent builders for descriptor sets, so tests read like the dependency
//! graph they describe.
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::test_support::{component, set_of};
//!
//! let set = set_of(vec![
//!     component("App").depends_on("IRepo"),
//!     component("SqlRepo").contract("IRepo").unique(),
//! ]);
//! ```

pub mod fixtures;

pub use fixtures::*;
