//! Node identity: role, canonical url and leaf flag derived from a record

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::data::TreeNodeData;

/// Position of a node in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Synthetic top of the tree, backed by a wrapper record
    Root,
    /// Any node built from an entry of a parent's children
    Interior,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRole::Root => write!(f, "root"),
            NodeRole::Interior => write!(f, "interior"),
        }
    }
}

/// What the root patch writes into the wrapper record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPatch {
    pub url: String,
    pub title: String,
}

impl Default for RootPatch {
    fn default() -> Self {
        Self {
            url: "/".into(),
            title: "Portfolio".into(),
        }
    }
}

/// Derived identity of one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdentity {
    pub role: NodeRole,
    pub url: String,
    pub is_leaf: bool,
}

impl NodeIdentity {
    /// Derive identity from `data`, patching the wrapper record when `role` is root.
    ///
    /// Idempotent: binding the same record twice yields the same identity and
    /// leaves the record as the first bind left it.
    pub fn bind(role: NodeRole, data: &mut TreeNodeData, patch: &RootPatch) -> Self {
        if role == NodeRole::Root && data.title != patch.title {
            data.title = patch.title.clone();
        }
        Self::derive(role, data, patch)
    }

    /// Derive identity without touching the record.
    pub fn derive(role: NodeRole, data: &TreeNodeData, patch: &RootPatch) -> Self {
        match role {
            NodeRole::Root => Self {
                role,
                url: patch.url.clone(),
                is_leaf: false,
            },
            NodeRole::Interior => Self {
                role,
                url: interior_url(data),
                is_leaf: !data.has_children(),
            },
        }
    }

    pub fn is_root(&self) -> bool {
        self.role == NodeRole::Root
    }
}

/// `/<sub_level>/<id>`; a missing id leaves the last segment empty.
pub fn interior_url(data: &TreeNodeData) -> String {
    match &data.id {
        Some(id) => format!("/{}/{}", data.sub_level, id),
        None => format!("/{}/", data.sub_level),
    }
}
