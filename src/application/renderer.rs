//! Boundary between the engine and whatever draws the tree.

use serde_json::Value;

use crate::domain::{MindMap, NodeId};

/// Receives the authoritative tree after every accepted change.
///
/// The tree is only borrowed for the duration of the call; a renderer keeps
/// whatever derived view it needs and sends edits back as [`Intent`]s.
pub trait Renderer {
    fn render(&mut self, tree: &MindMap, selected: Option<&NodeId>);
}

/// User intent emitted by a renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    Select(NodeId),
    AddChild {
        parent: NodeId,
        label: String,
        color: Option<String>,
        font_size: Option<u32>,
    },
    AddSibling {
        node: NodeId,
        label: String,
        color: Option<String>,
        font_size: Option<u32>,
    },
    Delete(NodeId),
    Rename {
        node: NodeId,
        text: String,
    },
    Recolor {
        node: NodeId,
        color: Option<String>,
    },
    SetFontSize {
        node: NodeId,
        size: u32,
    },
    Undo,
    Redo,
    New,
    Load(Value),
}

/// What a dispatched intent did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A node was created
    Created(NodeId),
    /// The tree or the selection changed
    Applied,
    /// Nothing to do (empty undo/redo, blank rename)
    Unchanged,
}
