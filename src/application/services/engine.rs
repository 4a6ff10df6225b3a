//! Edit engine service
//!
//! Owns the canonical tree, its history and the selection. Every edit runs the
//! same sequence: validate, mutate, checkpoint the resulting tree, update the
//! selection, notify the renderer. Validation happens before anything is
//! touched, so a rejected edit leaves tree, history and selection unchanged.

use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::renderer::{Intent, Outcome, Renderer};
use crate::config::Settings;
use crate::domain::{
    normalize_label, DomainError, DomainResult, HistoryLog, IdAllocator, MindMap, NodeId,
    NodeRecord, SelectionState, TreeBuilder, TreeNode, DEFAULT_HISTORY_CAPACITY, MAX_TREE_DEPTH,
};

/// Engine knobs taken from [`Settings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub history_capacity: usize,
    pub root_label: String,
    pub child_label: String,
    pub sibling_label: String,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            root_label: "Central Idea".into(),
            child_label: "New Child".into(),
            sibling_label: "New Sibling".into(),
        }
    }
}

impl From<&Settings> for EngineOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            history_capacity: settings.history_capacity,
            root_label: settings.root_label.clone(),
            child_label: settings.child_label.clone(),
            sibling_label: settings.sibling_label.clone(),
        }
    }
}

/// Mindmap editing engine.
pub struct EditEngine {
    tree: MindMap,
    history: HistoryLog,
    selection: SelectionState,
    ids: IdAllocator,
    options: EngineOptions,
    renderer: Option<Box<dyn Renderer>>,
}

impl EditEngine {
    /// Engine holding a lone root labeled with the configured root label.
    pub fn new(options: EngineOptions) -> Self {
        let mut ids = IdAllocator::new();
        let tree = MindMap::with_root(&mut ids, &options.root_label);
        Self::start(options, tree, ids)
    }

    /// Engine starting from a bulk-loaded record.
    pub fn from_record(options: EngineOptions, record: NodeRecord) -> DomainResult<Self> {
        let tree = TreeBuilder::new().build(record)?;
        Ok(Self::start(options, tree, IdAllocator::new()))
    }

    fn start(options: EngineOptions, tree: MindMap, mut ids: IdAllocator) -> Self {
        for (_, node) in tree.iter() {
            ids.observe(&node.data.id);
        }
        let mut history = HistoryLog::new(options.history_capacity);
        history.checkpoint(&tree);
        Self {
            tree,
            history,
            selection: SelectionState::new(),
            ids,
            options,
            renderer: None,
        }
    }

    /// Attaches a renderer and draws the current state once.
    pub fn with_renderer(mut self, renderer: Box<dyn Renderer>) -> Self {
        self.renderer = Some(renderer);
        self.notify();
        self
    }

    pub fn tree(&self) -> &MindMap {
        &self.tree
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn selected(&self) -> Option<&NodeId> {
        self.selection.selected()
    }

    pub fn selected_node(&self) -> Option<&TreeNode> {
        self.selection
            .selected()
            .and_then(|id| self.tree.find_by_id(id))
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn mark_saved(&mut self) {
        self.history.mark_saved();
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.history.has_unsaved_changes()
    }

    #[instrument(level = "debug", skip(self))]
    pub fn select(&mut self, id: &NodeId) -> DomainResult<()> {
        self.selection.select(id, &self.tree)?;
        self.notify();
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.notify();
    }

    /// Appends a new node under `parent` and selects it.
    ///
    /// Fails with `InvalidOperation` when the child would exceed [`MAX_TREE_DEPTH`].
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(
        &mut self,
        parent: &NodeId,
        label: &str,
        color: Option<String>,
        font_size: Option<u32>,
    ) -> DomainResult<NodeId> {
        if self.tree.depth_of(parent)? + 1 >= MAX_TREE_DEPTH {
            return Err(DomainError::invalid_operation(format!(
                "mindmaps are limited to {} levels",
                MAX_TREE_DEPTH
            )));
        }
        check_font_size(font_size)?;

        let label = normalize_label(label, &self.options.child_label);
        let id = self.insert(parent, &label, color, font_size)?;
        self.selection.select(&id, &self.tree)?;
        self.notify();
        Ok(id)
    }

    /// Appends a new node under the parent of `node`. The selection is kept.
    #[instrument(level = "debug", skip(self))]
    pub fn add_sibling(
        &mut self,
        node: &NodeId,
        label: &str,
        color: Option<String>,
        font_size: Option<u32>,
    ) -> DomainResult<NodeId> {
        let parent = self
            .tree
            .parent_of(node)?
            .map(|p| p.data.id.clone())
            .ok_or_else(|| DomainError::invalid_operation("cannot add a sibling to the root node"))?;
        check_font_size(font_size)?;

        let label = normalize_label(label, &self.options.sibling_label);
        let id = self.insert(&parent, &label, color, font_size)?;
        self.notify();
        Ok(id)
    }

    fn insert(
        &mut self,
        parent: &NodeId,
        label: &str,
        color: Option<String>,
        font_size: Option<u32>,
    ) -> DomainResult<NodeId> {
        let node = self
            .tree
            .create_node(&mut self.ids, label, normalize_color(color), font_size);
        let id = node.id.clone();
        self.tree.append_child(parent, node)?;
        self.history.checkpoint(&self.tree);
        debug!("inserted {} under {}", id, parent);
        Ok(id)
    }

    /// Removes `node` and its subtree; clears the selection.
    #[instrument(level = "debug", skip(self))]
    pub fn delete_node(&mut self, node: &NodeId) -> DomainResult<&MindMap> {
        let removed = self.tree.detach(node)?;
        self.history.checkpoint(&self.tree);
        self.selection.clear();
        debug!("deleted '{}'", removed.label);
        self.notify();
        Ok(&self.tree)
    }

    /// Sets the trimmed label; blank input leaves the node untouched.
    #[instrument(level = "debug", skip(self))]
    pub fn rename_node(&mut self, node: &NodeId, new_label: &str) -> DomainResult<&MindMap> {
        self.tree.node(node)?;
        let label = new_label.trim();
        if label.is_empty() {
            debug!("blank label for {}, keeping current", node);
            return Ok(&self.tree);
        }
        self.tree.set_label(node, label.to_string())?;
        self.commit();
        Ok(&self.tree)
    }

    /// Sets or clears the node color.
    #[instrument(level = "debug", skip(self))]
    pub fn recolor_node(&mut self, node: &NodeId, color: Option<String>) -> DomainResult<&MindMap> {
        self.tree.set_color(node, normalize_color(color))?;
        self.commit();
        Ok(&self.tree)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn set_font_size(&mut self, node: &NodeId, size: u32) -> DomainResult<&MindMap> {
        self.tree.node(node)?;
        check_font_size(Some(size))?;
        self.tree.set_font_size(node, Some(size))?;
        self.commit();
        Ok(&self.tree)
    }

    /// Replaces the whole tree with `record` after validation and id assignment.
    #[instrument(level = "debug", skip(self, record))]
    pub fn replace_tree(&mut self, record: NodeRecord) -> DomainResult<&MindMap> {
        let tree = TreeBuilder::new().build(record)?;
        for (_, node) in tree.iter() {
            self.ids.observe(&node.data.id);
        }
        self.tree = tree;
        self.history.checkpoint(&self.tree);
        self.selection.clear();
        info!("tree replaced: {} nodes", self.tree.node_count());
        self.notify();
        Ok(&self.tree)
    }

    /// Loads parsed JSON data; anything but an object describing a tree is rejected.
    pub fn load(&mut self, data: Value) -> DomainResult<&MindMap> {
        let record = NodeRecord::from_value(data)?;
        self.replace_tree(record)
    }

    /// Starts over with a lone root; blank or missing labels use the configured root label.
    #[instrument(level = "debug", skip(self))]
    pub fn new_map(&mut self, label: Option<&str>) -> &MindMap {
        let label = normalize_label(label.unwrap_or_default(), &self.options.root_label);
        self.tree = MindMap::with_root(&mut self.ids, &label);
        self.history.checkpoint(&self.tree);
        self.selection.clear();
        self.notify();
        &self.tree
    }

    /// Restores the previous snapshot; `None` if there is nothing to undo.
    #[instrument(level = "debug", skip(self))]
    pub fn undo(&mut self) -> Option<&MindMap> {
        let tree = self.history.undo()?;
        self.restore(tree);
        Some(&self.tree)
    }

    /// Restores the next snapshot; `None` if there is nothing to redo.
    #[instrument(level = "debug", skip(self))]
    pub fn redo(&mut self) -> Option<&MindMap> {
        let tree = self.history.redo()?;
        self.restore(tree);
        Some(&self.tree)
    }

    fn restore(&mut self, tree: MindMap) {
        self.tree = tree;
        self.selection.clear();
        self.notify();
    }

    /// Routes a renderer intent to the matching operation.
    pub fn dispatch(&mut self, intent: Intent) -> DomainResult<Outcome> {
        debug!("dispatch: {:?}", intent);
        let outcome = match intent {
            Intent::Select(id) => {
                self.select(&id)?;
                Outcome::Applied
            }
            Intent::AddChild {
                parent,
                label,
                color,
                font_size,
            } => Outcome::Created(self.add_child(&parent, &label, color, font_size)?),
            Intent::AddSibling {
                node,
                label,
                color,
                font_size,
            } => Outcome::Created(self.add_sibling(&node, &label, color, font_size)?),
            Intent::Delete(id) => {
                self.delete_node(&id)?;
                Outcome::Applied
            }
            Intent::Rename { node, text } => {
                self.rename_node(&node, &text)?;
                if text.trim().is_empty() {
                    Outcome::Unchanged
                } else {
                    Outcome::Applied
                }
            }
            Intent::Recolor { node, color } => {
                self.recolor_node(&node, color)?;
                Outcome::Applied
            }
            Intent::SetFontSize { node, size } => {
                self.set_font_size(&node, size)?;
                Outcome::Applied
            }
            Intent::Undo => applied_if(self.undo().is_some()),
            Intent::Redo => applied_if(self.redo().is_some()),
            Intent::New => {
                self.new_map(None);
                Outcome::Applied
            }
            Intent::Load(data) => {
                self.load(data)?;
                Outcome::Applied
            }
        };
        Ok(outcome)
    }

    fn commit(&mut self) {
        self.history.checkpoint(&self.tree);
        self.selection.revalidate(&self.tree);
        self.notify();
    }

    fn notify(&mut self) {
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&self.tree, self.selection.selected());
        }
    }
}

impl Default for EditEngine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

fn applied_if(changed: bool) -> Outcome {
    if changed {
        Outcome::Applied
    } else {
        Outcome::Unchanged
    }
}

fn check_font_size(size: Option<u32>) -> DomainResult<()> {
    match size {
        Some(0) => Err(DomainError::invalid_argument("font size must be positive")),
        _ => Ok(()),
    }
}

/// Blank colors mean "use the default".
fn normalize_color(color: Option<String>) -> Option<String> {
    color
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Recorder {
        frames: Rc<RefCell<Vec<(usize, Option<NodeId>)>>>,
    }

    impl Renderer for Recorder {
        fn render(&mut self, tree: &MindMap, selected: Option<&NodeId>) {
            self.frames
                .borrow_mut()
                .push((tree.node_count(), selected.cloned()));
        }
    }

    #[test]
    fn test_renderer_sees_every_accepted_change() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut engine = EditEngine::default().with_renderer(Box::new(Recorder {
            frames: Rc::clone(&frames),
        }));
        let root = engine.tree().root_id().clone();

        let child = engine.add_child(&root, "Topic A", None, None).unwrap();
        engine.delete_node(&child).unwrap();
        engine.undo();

        let frames = frames.borrow();
        assert_eq!(
            *frames,
            vec![(1, None), (2, Some(child)), (1, None), (2, None)]
        );
    }

    #[test]
    fn test_rejected_edit_does_not_notify() {
        let frames = Rc::new(RefCell::new(Vec::new()));
        let mut engine = EditEngine::default().with_renderer(Box::new(Recorder {
            frames: Rc::clone(&frames),
        }));
        let root = engine.tree().root_id().clone();

        assert!(engine.delete_node(&root).is_err());

        assert_eq!(frames.borrow().len(), 1);
    }

    #[test]
    fn test_blank_color_clears_color() {
        let mut engine = EditEngine::default();
        let root = engine.tree().root_id().clone();
        engine
            .recolor_node(&root, Some("#ff0000".to_string()))
            .unwrap();
        engine.recolor_node(&root, Some("  ".to_string())).unwrap();
        assert_eq!(engine.tree().root_node().data.color, None);
    }
}
