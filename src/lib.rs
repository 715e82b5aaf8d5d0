//! treemenu: a recursive, collapsible navigation tree
//!
//! Every node derives a url and leaf flag from its record, shares one
//! selection with the rest of the tree, and materializes children only
//! while it is expanded or selected.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::{NodeHandle, NodeView, Reconciler, RenderBridge, TreeMenu, TreeViewConvert};
pub use domain::{truncate, NodeKey, Selection, SelectionState, TreeNodeData};
