//! Command implementations

pub mod completions;
pub mod link;
pub mod sync;
