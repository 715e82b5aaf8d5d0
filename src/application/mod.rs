//! Application layer: the menu orchestrator and its rendering bridge
//!
//! This layer composes domain pieces into live, stateful trees.

pub mod arena;
pub mod bridge;
pub mod error;
pub mod menu;

pub use arena::NodeHandle;
pub use bridge::{NodeView, Reconciler, RenderBridge, SyncStats, TreeViewConvert};
pub use error::{ApplicationError, ApplicationResult};
pub use menu::{ChangeEvent, MenuSettings, NodeChange, NodeRef, TreeMenu};
