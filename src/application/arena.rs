use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::{DataPath, NodeIdentity, SelectionState};

/// Stable reference to a materialized node.
///
/// Handles go stale when the node is destroyed (collapse, rebuild, data
/// change); lookups through a stale handle return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(pub(crate) Index);

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "node#{}.{}", slot, generation)
    }
}

/// Materialized tree node in the arena-based hierarchy.
#[derive(Debug)]
pub struct MenuNode {
    /// Role, url and leaf flag derived from the bound record
    pub identity: NodeIdentity,
    /// Whether the child subtree is shown
    pub expanded: bool,
    /// Index of the owning node, None for the root
    pub parent: Option<Index>,
    /// Indices of materialized children, in data order
    pub children: Vec<Index>,
    /// Location of the bound record inside the tree document
    pub path: DataPath,
    /// Selection shared with every other node of the tree
    pub selection: SelectionState,
}

impl MenuNode {
    pub fn new(
        identity: NodeIdentity,
        expanded: bool,
        path: DataPath,
        selection: SelectionState,
    ) -> Self {
        Self {
            identity,
            expanded,
            parent: None,
            children: Vec::new(),
            path,
            selection,
        }
    }
}

/// Arena holding every live node of one menu.
#[derive(Debug)]
pub struct MenuArena {
    arena: Arena<MenuNode>,
    root: Option<Index>,
}

impl Default for MenuArena {
    fn default() -> Self {
        Self::new()
    }
}

impl MenuArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    #[instrument(level = "trace", skip(self, node))]
    pub fn insert_node(&mut self, mut node: MenuNode, parent: Option<Index>) -> Index {
        node.parent = parent;
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&MenuNode> {
        self.arena.get(idx)
    }

    pub fn get_node_mut(&mut self, idx: Index) -> Option<&mut MenuNode> {
        self.arena.get_mut(idx)
    }

    pub fn contains(&self, idx: Index) -> bool {
        self.arena.contains(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Materialized children of `idx`, copied out.
    pub fn children_of(&self, idx: Index) -> Vec<Index> {
        self.get_node(idx)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Remove every descendant of `idx`, children first. Returns the removed indices.
    #[instrument(level = "trace", skip(self))]
    pub fn remove_descendants(&mut self, idx: Index) -> Vec<Index> {
        let children = match self.arena.get_mut(idx) {
            Some(node) => std::mem::take(&mut node.children),
            None => return Vec::new(),
        };
        let mut removed = Vec::new();
        for child in children {
            removed.extend(self.remove_descendants(child));
            if self.arena.remove(child).is_some() {
                removed.push(child);
            }
        }
        removed
    }

    pub fn iter(&self) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self)
    }

    /// Levels of materialized nodes, the root counting as one.
    pub fn depth(&self) -> usize {
        self.root.map(|root| self.calculate_depth(root)).unwrap_or(0)
    }

    fn calculate_depth(&self, node_idx: Index) -> usize {
        if let Some(node) = self.get_node(node_idx) {
            1 + node
                .children
                .iter()
                .map(|&child| self.calculate_depth(child))
                .max()
                .unwrap_or(0)
        } else {
            0
        }
    }
}

/// Depth-first, left-to-right walk over live nodes.
pub struct PreOrderIterator<'a> {
    arena: &'a MenuArena,
    stack: Vec<Index>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a MenuArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (Index, &'a MenuNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NodeRole, RootPatch, TreeNodeData};

    fn node(path: DataPath) -> MenuNode {
        let identity = NodeIdentity::derive(
            NodeRole::Interior,
            &TreeNodeData::default(),
            &RootPatch::default(),
        );
        MenuNode::new(identity, false, path, SelectionState::default())
    }

    // root
    // ├── a
    // │   └── a0
    // └── b
    fn sample() -> (MenuArena, [Index; 4]) {
        let mut arena = MenuArena::new();
        let root = arena.insert_node(node(vec![]), None);
        let a = arena.insert_node(node(vec![0]), Some(root));
        let a0 = arena.insert_node(node(vec![0, 0]), Some(a));
        let b = arena.insert_node(node(vec![1]), Some(root));
        (arena, [root, a, a0, b])
    }

    #[test]
    fn given_tree_when_iterating_then_preorder() {
        let (arena, [root, a, a0, b]) = sample();
        let order: Vec<Index> = arena.iter().map(|(idx, _)| idx).collect();
        assert_eq!(order, vec![root, a, a0, b]);
        assert_eq!(arena.depth(), 3);
        assert_eq!(arena.get_node(a0).unwrap().parent, Some(a));
    }

    #[test]
    fn given_subtree_when_removing_descendants_then_children_first() {
        let (mut arena, [root, a, a0, b]) = sample();
        let removed = arena.remove_descendants(root);

        assert_eq!(removed, vec![a0, a, b]);
        assert_eq!(arena.len(), 1);
        assert!(arena.children_of(root).is_empty());
        assert!(!arena.contains(a));
    }

    #[test]
    fn given_removed_slot_when_reinserting_then_old_handle_stays_dead() {
        let (mut arena, [root, a, _, _]) = sample();
        arena.remove_descendants(root);
        let fresh = arena.insert_node(node(vec![0]), Some(root));

        assert_ne!(fresh, a);
        assert!(arena.get_node(a).is_none());
        assert_eq!(arena.children_of(root), vec![fresh]);
    }
}
