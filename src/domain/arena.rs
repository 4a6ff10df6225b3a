//! Arena-backed mindmap tree: the single source of truth for node structure.

use std::collections::HashMap;

use generational_arena::{Arena, Index};
use tracing::{debug, instrument};

use crate::domain::entities::{IdAllocator, NodeData, NodeId, NodeRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Maximum number of levels, root included.
///
/// Each level nests one object and one array in the JSON document; the limit
/// keeps saved maps inside `serde_json`'s parser recursion limit (128).
pub const MAX_TREE_DEPTH: usize = 60;

/// Tree node in the arena-based hierarchy structure.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Payload of this node
    pub data: NodeData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of child nodes in the arena, in insertion order
    pub children: Vec<Index>,
}

/// Single-rooted mindmap tree.
///
/// Nodes live in a generational arena; parent and child links are arena
/// indices. An id→index map is kept current on every insertion and removal so
/// lookups by [`NodeId`] never need a traversal.
///
/// `Clone` is a full structural deep copy: the clone shares nothing mutable
/// with the original, which is what history snapshots rely on.
#[derive(Debug, Clone)]
pub struct MindMap {
    arena: Arena<TreeNode>,
    root: Index,
    index: HashMap<NodeId, Index>,
}

impl MindMap {
    /// Tree consisting of `root` only.
    pub fn new(root: NodeData) -> Self {
        let mut arena = Arena::new();
        let id = root.id.clone();
        let root = arena.insert(TreeNode {
            data: root,
            parent: None,
            children: Vec::new(),
        });
        let mut index = HashMap::new();
        index.insert(id, root);
        Self { arena, root, index }
    }

    /// Tree with a single root labeled `label`, id taken from `ids`.
    pub fn with_root(ids: &mut IdAllocator, label: &str) -> Self {
        Self::new(NodeData {
            id: ids.allocate(|_| false),
            label: label.to_string(),
            color: None,
            font_size: None,
        })
    }

    /// Allocates a fresh id (unused in this tree) and builds a detached node.
    #[instrument(level = "trace", skip(self, ids))]
    pub fn create_node(
        &self,
        ids: &mut IdAllocator,
        label: &str,
        color: Option<String>,
        font_size: Option<u32>,
    ) -> NodeData {
        let id = ids.allocate(|candidate| self.contains(candidate));
        NodeData {
            id,
            label: label.to_string(),
            color,
            font_size,
        }
    }

    pub fn root(&self) -> Index {
        self.root
    }

    pub fn root_id(&self) -> &NodeId {
        &self.root_node().data.id
    }

    pub fn root_node(&self) -> &TreeNode {
        &self.arena[self.root]
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn index_of(&self, id: &NodeId) -> Option<Index> {
        self.index.get(id).copied()
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.index.contains_key(id)
    }

    /// Resolves `id`; equivalent to a pre-order search since ids are unique.
    pub fn find_by_id(&self, id: &NodeId) -> Option<&TreeNode> {
        self.index_of(id).and_then(|idx| self.arena.get(idx))
    }

    /// Like [`find_by_id`](Self::find_by_id) but reports `NotFound`.
    pub fn node(&self, id: &NodeId) -> DomainResult<&TreeNode> {
        self.find_by_id(id)
            .ok_or_else(|| DomainError::NotFound(id.clone()))
    }

    fn node_mut(&mut self, id: &NodeId) -> DomainResult<&mut TreeNode> {
        let idx = self
            .index_of(id)
            .ok_or_else(|| DomainError::NotFound(id.clone()))?;
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::NotFound(id.clone()))
    }

    /// Parent of `id`, `None` for the root.
    pub fn parent_of(&self, id: &NodeId) -> DomainResult<Option<&TreeNode>> {
        let node = self.node(id)?;
        Ok(node.parent.and_then(|p| self.arena.get(p)))
    }

    pub fn children_of(&self, id: &NodeId) -> DomainResult<Vec<&TreeNode>> {
        let node = self.node(id)?;
        Ok(node
            .children
            .iter()
            .filter_map(|&c| self.arena.get(c))
            .collect())
    }

    pub(crate) fn insert_under(&mut self, parent: Index, data: NodeData) -> Index {
        let id = data.id.clone();
        let idx = self.arena.insert(TreeNode {
            data,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.arena.get_mut(parent) {
            parent.children.push(idx);
        }
        self.index.insert(id, idx);
        idx
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// The child must be a detached node: it may neither be the parent itself
    /// nor share an id with any node already in the tree.
    #[instrument(level = "debug", skip(self, child), fields(child = %child.id))]
    pub fn append_child(&mut self, parent: &NodeId, child: NodeData) -> DomainResult<Index> {
        if &child.id == parent {
            return Err(DomainError::invalid_operation(format!(
                "node {} cannot be appended to itself",
                parent
            )));
        }
        let parent_idx = self
            .index_of(parent)
            .ok_or_else(|| DomainError::NotFound(parent.clone()))?;
        if self.contains(&child.id) {
            return Err(DomainError::invalid_operation(format!(
                "node {} is already part of the tree",
                child.id
            )));
        }
        let idx = self.insert_under(parent_idx, child);
        debug!("appended child to {}", parent);
        Ok(idx)
    }

    /// Removes the first child of `parent` with id `child_id`, along with its
    /// whole subtree. Returns the removed node's data.
    #[instrument(level = "debug", skip(self))]
    pub fn remove_child(&mut self, parent: &NodeId, child_id: &NodeId) -> DomainResult<NodeData> {
        let parent_idx = self
            .index_of(parent)
            .ok_or_else(|| DomainError::NotFound(parent.clone()))?;
        let position = self.arena[parent_idx]
            .children
            .iter()
            .position(|&c| self.arena.get(c).is_some_and(|n| &n.data.id == child_id))
            .ok_or_else(|| DomainError::NotFound(child_id.clone()))?;
        let child_idx = self.arena[parent_idx].children.remove(position);

        let subtree: Vec<Index> = self.iter_postorder_from(child_idx).map(|(i, _)| i).collect();
        let mut removed = None;
        for idx in subtree {
            if let Some(node) = self.arena.remove(idx) {
                self.index.remove(&node.data.id);
                if idx == child_idx {
                    removed = Some(node.data);
                }
            }
        }
        debug!("removed subtree of {} from {}", child_id, parent);
        removed.ok_or_else(|| DomainError::NotFound(child_id.clone()))
    }

    /// Removes `id` and its subtree from wherever it hangs.
    pub fn detach(&mut self, id: &NodeId) -> DomainResult<NodeData> {
        let parent = self
            .parent_of(id)?
            .map(|p| p.data.id.clone())
            .ok_or_else(|| DomainError::invalid_operation("cannot delete the root node"))?;
        self.remove_child(&parent, id)
    }

    pub fn set_label(&mut self, id: &NodeId, label: String) -> DomainResult<()> {
        self.node_mut(id)?.data.label = label;
        Ok(())
    }

    pub fn set_color(&mut self, id: &NodeId, color: Option<String>) -> DomainResult<()> {
        self.node_mut(id)?.data.color = color;
        Ok(())
    }

    pub fn set_font_size(&mut self, id: &NodeId, size: Option<u32>) -> DomainResult<()> {
        self.node_mut(id)?.data.font_size = size;
        Ok(())
    }

    /// Independent copy of the whole tree.
    pub fn clone_deep(&self) -> Self {
        self.clone()
    }

    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// Pre-order traversal: parent before children, children in order.
    pub fn iter(&self) -> TreeIterator<'_> {
        TreeIterator::new(self, self.root)
    }

    pub fn iter_postorder(&self) -> PostOrderIterator<'_> {
        self.iter_postorder_from(self.root)
    }

    fn iter_postorder_from(&self, start: Index) -> PostOrderIterator<'_> {
        PostOrderIterator::new(self, start)
    }

    /// Number of levels in the tree; a lone root has depth 1.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 1)];
        while let Some((idx, level)) = stack.pop() {
            if let Some(node) = self.get_node(idx) {
                deepest = deepest.max(level);
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Distance from the root; the root itself is at depth 0.
    pub fn depth_of(&self, id: &NodeId) -> DomainResult<usize> {
        let mut current = self.node(id)?;
        let mut depth = 0;
        while let Some(parent) = current.parent.and_then(|p| self.arena.get(p)) {
            depth += 1;
            current = parent;
        }
        Ok(depth)
    }

    pub fn leaf_ids(&self) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.children.is_empty())
            .map(|(_, node)| node.data.id.clone())
            .collect()
    }

    /// Persisted form of the whole tree, ids included.
    pub fn to_record(&self) -> NodeRecord {
        // Post-order: every child record is finished before its parent claims it
        let mut built: HashMap<Index, NodeRecord> = HashMap::new();
        for (idx, node) in self.iter_postorder() {
            let record = NodeRecord {
                id: Some(node.data.id.clone()),
                label: node.data.label.clone(),
                color: node.data.color.clone(),
                font_size: node.data.font_size,
                children: node
                    .children
                    .iter()
                    .filter_map(|child| built.remove(child))
                    .collect(),
            };
            built.insert(idx, record);
        }
        built
            .remove(&self.root)
            .unwrap_or_else(|| NodeRecord::new(self.root_node().data.label.clone()))
    }
}

impl PartialEq for MindMap {
    fn eq(&self, other: &Self) -> bool {
        self.to_record() == other.to_record()
    }
}

impl Eq for MindMap {}

pub struct TreeIterator<'a> {
    tree: &'a MindMap,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(tree: &'a MindMap, start: Index) -> Self {
        Self {
            tree,
            stack: vec![start],
        }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
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

pub struct PostOrderIterator<'a> {
    tree: &'a MindMap,
    stack: Vec<(Index, bool)>,
}

impl<'a> PostOrderIterator<'a> {
    fn new(tree: &'a MindMap, start: Index) -> Self {
        Self {
            tree,
            stack: vec![(start, false)],
        }
    }
}

impl<'a> Iterator for PostOrderIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, visited)) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                if !visited {
                    self.stack.push((current_idx, true));
                    for &child in node.children.iter().rev() {
                        self.stack.push((child, false));
                    }
                } else {
                    return Some((current_idx, node));
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(id: &str, label: &str) -> NodeData {
        NodeData {
            id: NodeId::from(id),
            label: label.to_string(),
            color: None,
            font_size: None,
        }
    }

    //      r
    //     / \
    //    a   b
    //    |
    //    c
    fn small_tree() -> MindMap {
        let mut tree = MindMap::new(node("r", "Root"));
        tree.append_child(&"r".into(), node("a", "A")).unwrap();
        tree.append_child(&"r".into(), node("b", "B")).unwrap();
        tree.append_child(&"a".into(), node("c", "C")).unwrap();
        tree
    }

    #[test]
    fn test_preorder_visits_parent_before_children_in_order() {
        let tree = small_tree();
        let ids: Vec<&str> = tree.iter().map(|(_, n)| n.data.id.as_str()).collect();
        assert_eq!(ids, vec!["r", "a", "c", "b"]);
    }

    #[test]
    fn test_postorder_visits_children_first() {
        let tree = small_tree();
        let ids: Vec<&str> = tree
            .iter_postorder()
            .map(|(_, n)| n.data.id.as_str())
            .collect();
        assert_eq!(ids, vec!["c", "a", "b", "r"]);
    }

    #[test]
    fn test_remove_child_drops_subtree_from_index() {
        let mut tree = small_tree();
        let removed = tree.remove_child(&"r".into(), &"a".into()).unwrap();
        assert_eq!(removed.label, "A");
        assert!(!tree.contains(&"a".into()));
        assert!(!tree.contains(&"c".into()));
        assert_eq!(tree.node_count(), 2);
    }

    #[test]
    fn test_depth_and_depth_of() {
        let tree = small_tree();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.depth_of(&"r".into()).unwrap(), 0);
        assert_eq!(tree.depth_of(&"c".into()).unwrap(), 2);
    }

    #[test]
    fn test_leaf_ids() {
        let tree = small_tree();
        assert_eq!(tree.leaf_ids(), vec![NodeId::from("c"), NodeId::from("b")]);
    }
}
