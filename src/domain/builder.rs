//! Tree builder turning persisted records into arena trees.

use std::collections::HashSet;

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::{MindMap, MAX_TREE_DEPTH};
use crate::domain::entities::{IdAllocator, NodeData, NodeId, NodeRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs [`MindMap`]s from nested [`NodeRecord`]s.
///
/// Input is validated up front, so a rejected record never yields a partial
/// tree.
pub struct TreeBuilder {
    explicit_ids: HashSet<NodeId>,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            explicit_ids: HashSet::new(),
        }
    }

    /// Validate `record`, assign missing ids and build the tree.
    #[instrument(level = "debug", skip(self, record), fields(root = %record.label))]
    pub fn build(&mut self, mut record: NodeRecord) -> DomainResult<MindMap> {
        self.assign_missing_ids(&mut record)?;

        let (root_data, children) = into_parts(record)?;
        let mut tree = MindMap::new(root_data);
        let mut stack: Vec<(NodeRecord, Index)> = children
            .into_iter()
            .rev()
            .map(|child| (child, tree.root()))
            .collect();

        while let Some((record, parent_idx)) = stack.pop() {
            let (data, children) = into_parts(record)?;
            let idx = tree.insert_under(parent_idx, data);
            for child in children.into_iter().rev() {
                stack.push((child, idx));
            }
        }

        debug!("built tree with {} nodes", tree.node_count());
        Ok(tree)
    }

    /// Deterministic id pass.
    ///
    /// Visits nodes in pre-order (parent before children, children in listed
    /// order) and gives every node without an id the next free `node_<n>`,
    /// counting from `node_0` and skipping ids already present in the record.
    /// The same input therefore always receives the same ids.
    pub fn assign_missing_ids(&mut self, record: &mut NodeRecord) -> DomainResult<()> {
        self.validate(record)?;

        let mut ids = IdAllocator::new();
        let mut stack: Vec<&mut NodeRecord> = vec![record];
        while let Some(node) = stack.pop() {
            if node.id.is_none() {
                node.id = Some(ids.allocate(|candidate| self.explicit_ids.contains(candidate)));
            }
            for child in node.children.iter_mut().rev() {
                stack.push(child);
            }
        }
        Ok(())
    }

    fn validate(&mut self, record: &NodeRecord) -> DomainResult<()> {
        self.explicit_ids.clear();

        let mut stack = vec![(record, 1)];
        while let Some((node, level)) = stack.pop() {
            if level > MAX_TREE_DEPTH {
                return Err(DomainError::invalid_argument(format!(
                    "mindmap deeper than {} levels",
                    MAX_TREE_DEPTH
                )));
            }
            if let Some(id) = &node.id {
                if !self.explicit_ids.insert(id.clone()) {
                    return Err(DomainError::invalid_argument(format!(
                        "duplicate node id: {}",
                        id
                    )));
                }
            }
            if node.label.trim().is_empty() {
                return Err(DomainError::invalid_argument(match &node.id {
                    Some(id) => format!("node {} has an empty label", id),
                    None => "node with an empty label".to_string(),
                }));
            }
            if node.font_size == Some(0) {
                return Err(DomainError::invalid_argument(format!(
                    "node '{}' has font size 0",
                    node.label
                )));
            }
            stack.extend(node.children.iter().rev().map(|child| (child, level + 1)));
        }
        Ok(())
    }
}

fn into_parts(record: NodeRecord) -> DomainResult<(NodeData, Vec<NodeRecord>)> {
    let NodeRecord {
        id,
        label,
        color,
        font_size,
        children,
    } = record;
    let id = id.ok_or_else(|| {
        DomainError::invalid_argument(format!("node '{}' has no id after id assignment", label))
    })?;
    Ok((
        NodeData {
            id,
            label,
            color,
            font_size,
        },
        children,
    ))
}

/// The demonstration map shown on first start.
pub fn sample_record() -> NodeRecord {
    fn leaf(label: &str, color: &str) -> NodeRecord {
        NodeRecord::new(label).with_color(color)
    }

    NodeRecord::new("Web Development")
        .with_color("#3498db")
        .with_children(vec![
            NodeRecord::new("Frontend").with_color("#e74c3c").with_children(vec![
                leaf("HTML", "#f39c12"),
                leaf("CSS", "#9b59b6"),
                leaf("JavaScript", "#1abc9c"),
            ]),
            NodeRecord::new("Backend").with_color("#2ecc71").with_children(vec![
                leaf("Node.js", "#27ae60"),
                leaf("Python", "#16a085"),
                leaf("Databases", "#8e44ad"),
            ]),
            NodeRecord::new("Tools").with_color("#d35400").with_children(vec![
                leaf("Git", "#c0392b"),
                leaf("VS Code", "#2980b9"),
                leaf("Docker", "#7f8c8d"),
            ]),
        ])
}
