//! Tree-wide selection shared by every node of one tree
//!
//! [`SelectionState`] is a cheap handle around `Rc<RefCell<..>>`: cloning it
//! hands out another reference to the same record. A write is visible to all
//! handles at once. Nodes register as subscribers and the owning tree visits
//! them, in registration order, after every value-changing write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use generational_arena::Index;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::domain::data::{NodeKey, TreeNodeData};

/// Sub-level whose selection matches every node of the same sub-level.
pub const LANDING_LEVEL: &str = "portfolio";

/// Current selection: a sub-level plus an optional node id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub level: String,
    pub id: Option<NodeKey>,
}

impl Selection {
    pub fn new(level: impl Into<String>, id: Option<NodeKey>) -> Self {
        Self {
            level: level.into(),
            id,
        }
    }

    /// Selection a node produces when it is clicked.
    pub fn of(data: &TreeNodeData) -> Self {
        Self {
            level: data.sub_level.clone(),
            id: data.id.clone(),
        }
    }

    /// Whether `data` counts as selected under this selection.
    ///
    /// Matches either by landing level (both sides on `landing_level`) or by a
    /// defined id equal to the selected id ([`NodeKey::same_id`]). Records
    /// without an id never match by id.
    pub fn matches(&self, data: &TreeNodeData, landing_level: &str) -> bool {
        if self.level == landing_level && data.sub_level == landing_level {
            return true;
        }
        match (&data.id, &self.id) {
            (Some(own), Some(selected)) => own.same_id(selected),
            _ => false,
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "{}:{}", self.level, id),
            None => write!(f, "{}", self.level),
        }
    }
}

#[derive(Debug)]
struct SelectionInner {
    current: Selection,
    version: u64,
    subscribers: Vec<Index>,
}

/// Shared, versioned selection record with a subscriber registry.
#[derive(Clone)]
pub struct SelectionState {
    inner: Rc<RefCell<SelectionInner>>,
}

impl fmt::Debug for SelectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("SelectionState")
            .field("current", &inner.current)
            .field("version", &inner.version)
            .field("subscriber_count", &inner.subscribers.len())
            .finish()
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(Selection::default())
    }
}

impl SelectionState {
    pub fn new(initial: Selection) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SelectionInner {
                current: initial,
                version: 0,
                subscribers: Vec::new(),
            })),
        }
    }

    pub fn current(&self) -> Selection {
        self.inner.borrow().current.clone()
    }

    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn is_selected(&self, data: &TreeNodeData, landing_level: &str) -> bool {
        self.inner.borrow().current.matches(data, landing_level)
    }

    /// Overwrite the selection. Returns `false` and leaves the version alone
    /// when the value is unchanged.
    pub fn set(&self, selection: Selection) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.current == selection {
            return false;
        }
        trace!("selection {} -> {}", inner.current, selection);
        inner.current = selection;
        inner.version += 1;
        true
    }

    /// Copy `data`'s sub-level and id into the selection.
    pub fn select(&self, data: &TreeNodeData) -> bool {
        self.set(Selection::of(data))
    }

    pub fn subscribe(&self, node: Index) {
        let mut inner = self.inner.borrow_mut();
        if !inner.subscribers.contains(&node) {
            inner.subscribers.push(node);
        }
    }

    pub fn unsubscribe(&self, node: Index) {
        self.inner.borrow_mut().subscribers.retain(|n| *n != node);
    }

    /// Subscribers in registration order, copied out so the caller may mutate
    /// the registry while walking it.
    pub fn subscribers(&self) -> Vec<Index> {
        self.inner.borrow().subscribers.clone()
    }

    pub fn ptr_eq(&self, other: &SelectionState) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}
