//! Domain layer: tree records, node identity, labels and the shared selection
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod data;
pub mod error;
pub mod identity;
pub mod label;
pub mod selection;

pub use data::{DataPath, NodeKey, TreeNodeData};
pub use error::{DomainError, DomainResult};
pub use identity::{NodeIdentity, NodeRole, RootPatch};
pub use label::{truncate, LabelRules};
pub use selection::{Selection, SelectionState, LANDING_LEVEL};
