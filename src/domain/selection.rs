//! Currently selected node.

use crate::domain::arena::MindMap;
use crate::domain::entities::NodeId;
use crate::domain::error::{DomainError, DomainResult};

/// Holds at most one selected node id, always validated against a tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<NodeId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects `id` if it resolves in `tree`; otherwise the selection is left as is.
    pub fn select(&mut self, id: &NodeId, tree: &MindMap) -> DomainResult<()> {
        if !tree.contains(id) {
            return Err(DomainError::NotFound(id.clone()));
        }
        self.selected = Some(id.clone());
        Ok(())
    }

    pub fn clear(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selected.as_ref()
    }

    pub fn is_selected(&self, id: &NodeId) -> bool {
        self.selected.as_ref() == Some(id)
    }

    /// Drops the selection if it no longer resolves in `tree`.
    pub fn revalidate(&mut self, tree: &MindMap) {
        if self.selected.as_ref().is_some_and(|id| !tree.contains(id)) {
            self.selected = None;
        }
    }
}
