//! Rendering bridge: snapshots and mount/unmount reconciliation
//!
//! The menu only decides *what* should be mounted. [`NodeView`] is that
//! declarative picture (children listed only while expanded); [`Reconciler`]
//! diffs it against what a [`RenderBridge`] currently has mounted and issues
//! the minimal mount, unmount and update calls.

use std::collections::HashMap;

use serde::Serialize;
use termtree::Tree;
use tracing::{debug, instrument};

use crate::application::arena::NodeHandle;
use crate::application::menu::{NodeRef, TreeMenu};
use crate::domain::{DomainError, DomainResult, NodeRole};

/// Render-ready snapshot of one node and its visible subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView {
    #[serde(skip)]
    pub handle: NodeHandle,
    pub role: NodeRole,
    pub label: String,
    pub url: String,
    pub selected: bool,
    pub expanded: bool,
    pub leaf: bool,
    pub children: Vec<NodeView>,
}

impl NodeView {
    pub fn capture(node: NodeRef<'_>) -> Self {
        Self {
            handle: node.handle(),
            role: node.role(),
            label: node.label(),
            url: node.url().to_string(),
            selected: node.is_selected(),
            expanded: node.is_expanded(),
            leaf: node.is_leaf(),
            children: node
                .visible_children()
                .into_iter()
                .map(NodeView::capture)
                .collect(),
        }
    }

    /// Handles of the children that should be mounted, in order.
    pub fn desired_children(&self) -> Vec<NodeHandle> {
        self.children.iter().map(|child| child.handle).collect()
    }

    /// Visible nodes in pre-order.
    pub fn flatten(&self) -> Vec<&NodeView> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(view) = stack.pop() {
            out.push(view);
            stack.extend(view.children.iter().rev());
        }
        out
    }

    fn state(&self) -> RenderedState {
        RenderedState {
            label: self.label.clone(),
            url: self.url.clone(),
            selected: self.selected,
            expanded: self.expanded,
        }
    }
}

impl TreeMenu {
    /// Snapshot of everything currently visible, starting at the root.
    pub fn view(&self) -> DomainResult<NodeView> {
        self.root_node()
            .map(NodeView::capture)
            .ok_or_else(|| DomainError::StaleHandle(self.root().to_string()))
    }
}

pub trait TreeViewConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeViewConvert for NodeView {
    fn to_tree_string(&self) -> Tree<String> {
        let marker = match (self.leaf, self.expanded) {
            (true, _) => " ",
            (false, true) => "-",
            (false, false) => "+",
        };
        let selected = if self.selected { " *" } else { "" };
        let text = format!("{} {} ({}){}", marker, self.label, self.url, selected);

        let leaves: Vec<_> = self
            .children
            .iter()
            .map(|child| child.to_tree_string())
            .collect();
        Tree::new(text).with_leaves(leaves)
    }
}

/// What the UI layer must provide to show a menu.
pub trait RenderBridge {
    /// Mount `view` (without its children) under `parent` at `position`.
    /// `parent` is `None` for the root.
    fn mount(&mut self, parent: Option<NodeHandle>, position: usize, view: &NodeView);

    /// Remove a mounted node. Its descendants were unmounted before.
    fn unmount(&mut self, node: NodeHandle);

    /// Refresh a mounted node whose label, url, selection or expansion changed.
    fn update(&mut self, view: &NodeView);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RenderedState {
    label: String,
    url: String,
    selected: bool,
    expanded: bool,
}

/// Counts of bridge calls issued by one [`Reconciler::sync`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub mounted: usize,
    pub unmounted: usize,
    pub updated: usize,
}

/// Remembers what is mounted and brings it in line with a fresh [`NodeView`].
#[derive(Debug, Default)]
pub struct Reconciler {
    root: Option<NodeHandle>,
    mounted_children: HashMap<NodeHandle, Vec<NodeHandle>>,
    rendered: HashMap<NodeHandle, RenderedState>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_mounted(&self, node: NodeHandle) -> bool {
        self.rendered.contains_key(&node)
    }

    pub fn mounted_count(&self) -> usize {
        self.rendered.len()
    }

    /// Mounted children of `node`, in order.
    pub fn mounted_children(&self, node: NodeHandle) -> &[NodeHandle] {
        self.mounted_children
            .get(&node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[instrument(level = "debug", skip_all)]
    pub fn sync<B: RenderBridge>(&mut self, view: &NodeView, bridge: &mut B) -> SyncStats {
        let mut stats = SyncStats::default();

        if self.root != Some(view.handle) {
            if let Some(old_root) = self.root.take() {
                self.unmount_subtree(old_root, bridge, &mut stats);
            }
            bridge.mount(None, 0, view);
            self.rendered.insert(view.handle, view.state());
            self.root = Some(view.handle);
            stats.mounted += 1;
        }
        self.sync_node(view, bridge, &mut stats);

        debug!(
            "sync: +{} -{} ~{}",
            stats.mounted, stats.unmounted, stats.updated
        );
        stats
    }

    fn sync_node<B: RenderBridge>(&mut self, view: &NodeView, bridge: &mut B, stats: &mut SyncStats) {
        let state = view.state();
        if self.rendered.get(&view.handle) != Some(&state) {
            bridge.update(view);
            self.rendered.insert(view.handle, state);
            stats.updated += 1;
        }

        let desired = view.desired_children();
        let current = self.mounted_children.remove(&view.handle).unwrap_or_default();

        for stale in current.iter().filter(|child| !desired.contains(child)) {
            self.unmount_subtree(*stale, bridge, stats);
        }
        for (position, child) in view.children.iter().enumerate() {
            if !current.contains(&child.handle) {
                bridge.mount(Some(view.handle), position, child);
                self.rendered.insert(child.handle, child.state());
                stats.mounted += 1;
            }
            self.sync_node(child, bridge, stats);
        }

        if !desired.is_empty() {
            self.mounted_children.insert(view.handle, desired);
        }
    }

    fn unmount_subtree<B: RenderBridge>(&mut self, node: NodeHandle, bridge: &mut B, stats: &mut SyncStats) {
        for child in self.mounted_children.remove(&node).unwrap_or_default() {
            self.unmount_subtree(child, bridge, stats);
        }
        self.rendered.remove(&node);
        bridge.unmount(node);
        stats.unmounted += 1;
    }
}
