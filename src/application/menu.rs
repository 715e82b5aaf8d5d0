//! Tree menu orchestrator
//!
//! [`TreeMenu`] owns the tree document, the arena of materialized nodes and
//! the shared [`SelectionState`]. It decides when a node's children exist:
//!
//! - data bound or changed: re-derive identity, rebuild children when the
//!   node is expanded and has children, otherwise drop them;
//! - expanded false -> true: build children from the record, in data order;
//! - expanded true -> false: destroy the child subtree;
//! - selection changed: every live node re-evaluates; a selected node opens
//!   its ancestors and force-rebuilds its children (even while collapsed, in
//!   which case they stay hidden);
//! - node created: the new node evaluates the selection once.
//!
//! All propagation is synchronous and depth-first. Nodes destroyed while a
//! walk is in progress are skipped through their stale arena index.

use generational_arena::Index;
use tracing::{debug, instrument, trace};

use crate::application::arena::{MenuArena, MenuNode, NodeHandle};
use crate::domain::data::EMPTY_RECORD;
use crate::domain::{
    DomainError, DomainResult, LabelRules, NodeIdentity, NodeKey, NodeRole, RootPatch,
    Selection, SelectionState, TreeNodeData, LANDING_LEVEL,
};

/// Behaviour knobs of one menu, usually built from [`crate::config::Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuSettings {
    pub root: RootPatch,
    pub label: LabelRules,
    /// Selecting this sub-level selects every node on it
    pub landing_level: String,
}

impl Default for MenuSettings {
    fn default() -> Self {
        Self {
            root: RootPatch::default(),
            label: LabelRules::default(),
            landing_level: LANDING_LEVEL.into(),
        }
    }
}

/// What changed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeChange {
    Expanded,
    Data,
    Children,
    Selection,
}

/// Notification for the rendering side; drained with [`TreeMenu::take_changes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeEvent {
    pub node: NodeHandle,
    pub change: NodeChange,
}

/// Collapsible navigation tree with one shared selection.
///
/// Every mutation queues [`ChangeEvent`]s; a consumer that renders
/// incrementally drains them with [`TreeMenu::take_changes`].
#[derive(Debug)]
pub struct TreeMenu {
    nodes: MenuArena,
    root: Index,
    document: TreeNodeData,
    selection: SelectionState,
    settings: MenuSettings,
    changes: Vec<ChangeEvent>,
}

impl TreeMenu {
    pub fn new(data: TreeNodeData, settings: MenuSettings) -> Self {
        Self::with_selection(data, Selection::default(), settings)
    }

    /// Build the root over `data` with `initial` already selected, e.g. the
    /// selection restored from the current route.
    #[instrument(level = "debug", skip_all, fields(initial = %initial))]
    pub fn with_selection(mut data: TreeNodeData, initial: Selection, settings: MenuSettings) -> Self {
        let selection = SelectionState::new(initial);
        let identity = NodeIdentity::bind(NodeRole::Root, &mut data, &settings.root);
        let mut nodes = MenuArena::new();
        let root = nodes.insert_node(
            MenuNode::new(identity, true, Vec::new(), selection.clone()),
            None,
        );
        selection.subscribe(root);

        let mut menu = Self {
            nodes,
            root,
            document: data,
            selection,
            settings,
            changes: Vec::new(),
        };
        if menu.record(root).has_children() {
            menu.rebuild_children(root);
        }
        menu.react_to_selection(root);
        debug!("menu built with {} live nodes", menu.nodes.len());
        menu
    }

    pub fn root(&self) -> NodeHandle {
        NodeHandle(self.root)
    }

    pub fn document(&self) -> &TreeNodeData {
        &self.document
    }

    pub fn settings(&self) -> &MenuSettings {
        &self.settings
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Read access to a live node.
    pub fn node(&self, handle: NodeHandle) -> Option<NodeRef<'_>> {
        self.nodes.get_node(handle.0).map(|node| NodeRef {
            menu: self,
            idx: handle.0,
            node,
        })
    }

    /// The root is never removed, so this is `Some` for every built menu.
    pub fn root_node(&self) -> Option<NodeRef<'_>> {
        self.node(self.root())
    }

    /// Live nodes in pre-order, hidden ones included.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef<'_>> + '_ {
        self.nodes.iter().map(move |(idx, node)| NodeRef {
            menu: self,
            idx,
            node,
        })
    }

    pub fn live_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        self.nodes.depth()
    }

    /// First live node (pre-order) whose record carries `key`, compared with
    /// [`NodeKey::same_id`].
    pub fn find(&self, key: &NodeKey) -> Option<NodeHandle> {
        self.nodes
            .iter()
            .find(|(idx, _)| {
                self.record(*idx)
                    .id
                    .as_ref()
                    .is_some_and(|id| id.same_id(key))
            })
            .map(|(idx, _)| NodeHandle(idx))
    }

    /// Live node bound to the record at `path`.
    pub fn handle_at(&self, path: &[usize]) -> Option<NodeHandle> {
        let mut current = self.root;
        for depth in 1..=path.len() {
            current = self.child_at(current, &path[..depth])?;
        }
        Some(NodeHandle(current))
    }

    /// Drain pending change notifications.
    ///
    /// Events stay queued until drained. The queue holds at most one event
    /// per live node and change kind; events of destroyed nodes are dropped.
    pub fn take_changes(&mut self) -> Vec<ChangeEvent> {
        std::mem::take(&mut self.changes)
    }

    // ------------------------------------------------------------
    // Mutating entry points
    // ------------------------------------------------------------

    /// Flip a node's expansion. The root stays expanded.
    ///
    /// Returns the expansion state after the call.
    #[instrument(level = "debug", skip(self), fields(node = %handle))]
    pub fn toggle(&mut self, handle: NodeHandle) -> DomainResult<bool> {
        let expanded = self.live(handle)?.expanded;
        if handle.0 == self.root {
            debug!("toggle on root ignored");
            return Ok(true);
        }
        self.set_expanded(handle.0, !expanded);
        Ok(!expanded)
    }

    /// Toggle the rendered node carrying `key`.
    pub fn toggle_expansion(&mut self, key: &NodeKey) -> DomainResult<bool> {
        let handle = self.find_rendered(key)?;
        self.toggle(handle)
    }

    /// Make `handle` the selected node and propagate the change.
    #[instrument(level = "debug", skip(self), fields(node = %handle))]
    pub fn select(&mut self, handle: NodeHandle) -> DomainResult<()> {
        self.live(handle)?;
        let selection = Selection::of(self.record(handle.0));
        self.apply_selection(selection);
        Ok(())
    }

    /// Select the node carrying `key`, materializing its ancestor chain when
    /// it is not rendered yet.
    ///
    /// Returns the live handle of the selected node after propagation.
    #[instrument(level = "debug", skip(self), fields(key = %key))]
    pub fn select_node(&mut self, key: &NodeKey) -> DomainResult<NodeHandle> {
        let handle = match self.find(key) {
            Some(handle) => handle,
            None => {
                let path = self
                    .document
                    .find_path(key)
                    .ok_or_else(|| DomainError::UnknownNode(key.clone()))?;
                self.reveal(&path)
                    .ok_or_else(|| DomainError::UnknownNode(key.clone()))?
            }
        };
        let path = self.live(handle)?.path.clone();
        self.select(handle)?;
        Ok(self.handle_at(&path).unwrap_or(handle))
    }

    /// Overwrite the shared selection, e.g. from a route, and propagate it.
    pub fn apply_selection(&mut self, selection: Selection) {
        if self.selection.set(selection) {
            self.propagate_selection();
        } else {
            trace!("selection unchanged");
        }
    }

    /// Replace the whole tree document. The root re-derives and rebuilds.
    #[instrument(level = "debug", skip_all)]
    pub fn bind_data(&mut self, data: TreeNodeData) {
        self.document = data;
        self.on_data_bound(self.root);
    }

    /// Replace the record bound to one live node.
    #[instrument(level = "debug", skip(self, data), fields(node = %handle))]
    pub fn bind_node_data(&mut self, handle: NodeHandle, data: TreeNodeData) -> DomainResult<()> {
        let path = self.live(handle)?.path.clone();
        if handle.0 == self.root {
            self.bind_data(data);
            return Ok(());
        }
        match self.document.resolve_mut(&path) {
            Some(record) => *record = data,
            None => return Err(DomainError::StaleHandle(handle.to_string())),
        }
        self.on_data_bound(handle.0);
        Ok(())
    }

    /// Expand every ancestor of `handle`.
    pub fn ensure_open(&mut self, handle: NodeHandle) -> DomainResult<()> {
        self.live(handle)?;
        self.ensure_open_idx(handle.0);
        Ok(())
    }

    // ------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------

    fn on_data_bound(&mut self, idx: Index) {
        let Some(node) = self.nodes.get_node(idx) else {
            return;
        };
        let role = node.identity.role;
        let path = node.path.clone();
        let identity = match self.document.resolve_mut(&path) {
            Some(record) => NodeIdentity::bind(role, record, &self.settings.root),
            None => NodeIdentity::derive(role, &EMPTY_RECORD, &self.settings.root),
        };
        let expanded = match self.nodes.get_node_mut(idx) {
            Some(node) => {
                node.identity = identity;
                node.expanded
            }
            None => return,
        };
        self.notify(idx, NodeChange::Data);

        if expanded && self.record(idx).has_children() {
            self.rebuild_children(idx);
        } else {
            self.destroy_children(idx);
        }
    }

    /// Returns whether the flag changed.
    fn set_expanded(&mut self, idx: Index, expanded: bool) -> bool {
        match self.nodes.get_node_mut(idx) {
            Some(node) if node.expanded != expanded => node.expanded = expanded,
            _ => return false,
        }
        trace!("node {} expanded={}", NodeHandle(idx), expanded);
        self.notify(idx, NodeChange::Expanded);
        if expanded {
            self.rebuild_children(idx);
        } else {
            self.destroy_children(idx);
        }
        true
    }

    fn ensure_open_idx(&mut self, idx: Index) {
        let mut next = self.nodes.get_node(idx).and_then(|node| node.parent);
        while let Some(parent) = next {
            self.set_expanded(parent, true);
            next = self.nodes.get_node(parent).and_then(|node| node.parent);
        }
    }

    fn propagate_selection(&mut self) {
        let subscribers = self.selection.subscribers();
        debug!(
            "selection {} -> {} subscribers",
            self.selection.current(),
            subscribers.len()
        );
        for idx in subscribers {
            if !self.nodes.contains(idx) {
                continue;
            }
            self.notify(idx, NodeChange::Selection);
            self.react_to_selection(idx);
        }
    }

    fn react_to_selection(&mut self, idx: Index) {
        if !self.is_selected_idx(idx) {
            return;
        }
        self.ensure_open_idx(idx);
        if self.nodes.contains(idx) {
            self.rebuild_children(idx);
        }
    }

    /// Drop the current children of `idx` and build fresh ones from its record.
    fn rebuild_children(&mut self, idx: Index) {
        self.destroy_children(idx);
        let Some(node) = self.nodes.get_node(idx) else {
            return;
        };
        let path = node.path.clone();
        let count = self.record(idx).child_records().len();

        let mut created = Vec::with_capacity(count);
        for i in 0..count {
            let mut child_path = path.clone();
            child_path.push(i);
            let record = self.document.resolve(&child_path).unwrap_or(&EMPTY_RECORD);
            let identity = NodeIdentity::derive(NodeRole::Interior, record, &self.settings.root);
            let child = self.nodes.insert_node(
                MenuNode::new(identity, false, child_path, self.selection.clone()),
                Some(idx),
            );
            self.selection.subscribe(child);
            created.push(child);
        }
        if count > 0 {
            trace!("node {} built {} children", NodeHandle(idx), count);
            self.notify(idx, NodeChange::Children);
        }

        for child in created {
            if self.nodes.contains(child) {
                self.react_to_selection(child);
            }
        }
    }

    fn destroy_children(&mut self, idx: Index) {
        let removed = self.nodes.remove_descendants(idx);
        if removed.is_empty() {
            return;
        }
        for child in &removed {
            self.selection.unsubscribe(*child);
        }
        let nodes = &self.nodes;
        self.changes.retain(|event| nodes.contains(event.node.0));
        trace!("node {} dropped {} descendants", NodeHandle(idx), removed.len());
        self.notify(idx, NodeChange::Children);
    }

    /// Expand and materialize the chain down to the record at `path`.
    fn reveal(&mut self, path: &[usize]) -> Option<NodeHandle> {
        let mut current = self.root;
        for depth in 1..=path.len() {
            let prefix = &path[..depth];
            if !self.set_expanded(current, true) && self.child_at(current, prefix).is_none() {
                self.rebuild_children(current);
            }
            current = self.child_at(current, prefix)?;
        }
        Some(NodeHandle(current))
    }

    // ------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------

    /// Pending events are coalesced: one entry per (node, change) pair.
    fn notify(&mut self, idx: Index, change: NodeChange) {
        let event = ChangeEvent {
            node: NodeHandle(idx),
            change,
        };
        if !self.changes.contains(&event) {
            self.changes.push(event);
        }
    }

    fn live(&self, handle: NodeHandle) -> DomainResult<&MenuNode> {
        self.nodes
            .get_node(handle.0)
            .ok_or_else(|| DomainError::StaleHandle(handle.to_string()))
    }

    fn find_rendered(&self, key: &NodeKey) -> DomainResult<NodeHandle> {
        match self.find(key) {
            Some(handle) => Ok(handle),
            None if self.document.find_path(key).is_some() => {
                Err(DomainError::NodeNotRendered(key.clone()))
            }
            None => Err(DomainError::UnknownNode(key.clone())),
        }
    }

    fn child_at(&self, parent: Index, path: &[usize]) -> Option<Index> {
        self.nodes
            .get_node(parent)?
            .children
            .iter()
            .copied()
            .find(|&child| {
                self.nodes
                    .get_node(child)
                    .is_some_and(|node| node.path.as_slice() == path)
            })
    }

    fn record(&self, idx: Index) -> &TreeNodeData {
        self.nodes
            .get_node(idx)
            .and_then(|node| self.document.resolve(&node.path))
            .unwrap_or(&EMPTY_RECORD)
    }

    fn is_selected_idx(&self, idx: Index) -> bool {
        match self.nodes.get_node(idx) {
            Some(node) => node
                .selection
                .is_selected(self.record(idx), &self.settings.landing_level),
            None => false,
        }
    }
}

/// Borrowed view of one live node: the contract the rendering side reads.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    menu: &'a TreeMenu,
    idx: Index,
    node: &'a MenuNode,
}

impl<'a> NodeRef<'a> {
    pub fn handle(&self) -> NodeHandle {
        NodeHandle(self.idx)
    }

    pub fn data(&self) -> &'a TreeNodeData {
        self.menu.record(self.idx)
    }

    pub fn role(&self) -> NodeRole {
        self.node.identity.role
    }

    pub fn url(&self) -> &'a str {
        &self.node.identity.url
    }

    pub fn is_leaf(&self) -> bool {
        self.node.identity.is_leaf
    }

    pub fn is_expanded(&self) -> bool {
        self.node.expanded
    }

    pub fn is_selected(&self) -> bool {
        self.menu.is_selected_idx(self.idx)
    }

    /// Title cut to the configured length.
    pub fn label(&self) -> String {
        self.menu.settings.label.apply(&self.data().title).into_owned()
    }

    pub fn path(&self) -> &'a [usize] {
        &self.node.path
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node
            .parent
            .and_then(|parent| self.menu.node(NodeHandle(parent)))
    }

    /// Materialized children, hidden ones included.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        self.node
            .children
            .iter()
            .filter_map(|&child| self.menu.node(NodeHandle(child)))
            .collect()
    }

    /// Children the rendering side should mount: none while collapsed.
    pub fn visible_children(&self) -> Vec<NodeRef<'a>> {
        if self.node.expanded {
            self.children()
        } else {
            Vec::new()
        }
    }

    pub fn has_materialized_children(&self) -> bool {
        !self.node.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn work_tree() -> TreeNodeData {
        TreeNodeData::root(vec![
            TreeNodeData::new(1, "work", "Work").with_children(vec![
                TreeNodeData::new(11, "project", "Alpha")
                    .with_children(vec![TreeNodeData::new(111, "detail", "Alpha detail")]),
                TreeNodeData::new(12, "project", "Beta"),
            ]),
            TreeNodeData::new(2, "about", "About"),
        ])
    }

    #[test]
    fn given_new_menu_when_built_then_only_root_children_live() {
        let menu = TreeMenu::new(work_tree(), MenuSettings::default());
        // root + work + about
        assert_eq!(menu.live_count(), 3);
        assert_eq!(menu.root_node().unwrap().data().title, "Portfolio");
    }

    #[test]
    fn given_collapsed_node_when_toggled_twice_then_children_gone() {
        let mut menu = TreeMenu::new(work_tree(), MenuSettings::default());
        let work = menu.find(&NodeKey::Int(1)).unwrap();

        assert!(menu.toggle(work).unwrap());
        assert_eq!(menu.node(work).unwrap().children().len(), 2);
        assert!(!menu.toggle(work).unwrap());
        assert!(!menu.node(work).unwrap().has_materialized_children());
        assert_eq!(menu.live_count(), 3);
    }

    #[test]
    fn given_stale_handle_when_toggling_then_error() {
        let mut menu = TreeMenu::new(work_tree(), MenuSettings::default());
        let work = menu.find(&NodeKey::Int(1)).unwrap();
        menu.toggle(work).unwrap();
        let alpha = menu.find(&NodeKey::Int(11)).unwrap();
        menu.toggle(work).unwrap();

        assert!(matches!(menu.toggle(alpha), Err(DomainError::StaleHandle(_))));
    }

    #[test]
    fn given_selected_collapsed_node_when_selected_then_children_built_but_hidden() {
        let mut menu = TreeMenu::new(work_tree(), MenuSettings::default());
        let work = menu.find(&NodeKey::Int(1)).unwrap();

        menu.select(work).unwrap();

        let node = menu.node(work).unwrap();
        assert!(!node.is_expanded());
        assert!(node.has_materialized_children());
        assert!(node.visible_children().is_empty());
    }

    #[test]
    fn given_changes_when_drained_then_empty_afterwards() {
        let mut menu = TreeMenu::new(work_tree(), MenuSettings::default());
        menu.take_changes();
        let work = menu.find(&NodeKey::Int(1)).unwrap();
        menu.toggle(work).unwrap();

        let changes = menu.take_changes();
        assert!(changes.contains(&ChangeEvent {
            node: work,
            change: NodeChange::Expanded
        }));
        assert!(menu.take_changes().is_empty());
    }
}
