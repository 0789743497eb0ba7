//! High-level operations.
//!
//! This module contains the implementation of wireup commands.

pub mod generate;
pub mod graph;
pub mod load;
pub mod resolve;

pub use generate::{
    check_output, is_fresh, render, write_output, GenerateOptions, PipelineError, UnitState,
    UnitStatus,
};
pub use graph::{component_dot, group_dot};
pub use load::{load_descriptors, parse_descriptors};
pub use resolve::{analyze, format_report, Analysis};
