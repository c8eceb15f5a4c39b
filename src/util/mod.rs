//! Shared utilities

pub mod fs;
pub mod process;
pub mod scoped_file;
pub mod shell;

pub use scoped_file::{JsonFile, ScopedFile, YamlFile};
pub use shell::{Shell, Status};
