//! Infrastructure layer: I/O implementations
//!
//! This layer reads tree documents from the outside world.

pub mod error;
pub mod source;

pub use error::{InfraError, InfraResult, IoResultExt};
pub use source::{source_for, FileDataSource, StaticDataSource, StdinDataSource, TreeDataSource};
