//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::{DomainError, DomainResult};

/// Prefix of engine-assigned node identifiers (`node_0`, `node_1`, ...).
pub const NODE_ID_PREFIX: &str = "node_";

/// Stable node identifier.
///
/// Opaque to the engine: ids loaded from a file are kept verbatim, ids created
/// by the engine follow the `node_<n>` scheme.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sequence number of an engine-style id (`node_7` → 7).
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(NODE_ID_PREFIX)?.parse().ok()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Data payload of one mindmap node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    /// Assigned once at creation, never changed
    pub id: NodeId,
    /// Display text, never empty
    pub label: String,
    /// Explicit color; `None` means the presentation default
    pub color: Option<String>,
    /// Explicit font size; `None` means the presentation default
    pub font_size: Option<u32>,
}

impl fmt::Display for NodeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

/// Persisted form of a (sub)tree.
///
/// Serialized as `{ id?, label, color?, fontSize?, children: [...] }`.
/// `name` is accepted in place of `label` so files written by the jphmind
/// web app load unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(alias = "name")]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(default)]
    pub children: Vec<NodeRecord>,
}

impl NodeRecord {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            id: None,
            label: label.into(),
            color: None,
            font_size: None,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_children(mut self, children: Vec<NodeRecord>) -> Self {
        self.children = children;
        self
    }

    /// Typed view of parsed JSON; anything but an object describing a tree is rejected.
    pub fn from_value(value: Value) -> DomainResult<Self> {
        if !value.is_object() {
            return Err(DomainError::invalid_argument(
                "mindmap data must be a JSON object",
            ));
        }
        serde_json::from_value(value).map_err(|e| {
            DomainError::invalid_argument(format!("malformed mindmap data: {}", e))
        })
    }
}

/// Monotonic `node_<n>` id source.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for which `taken` is false.
    pub fn allocate(&mut self, taken: impl Fn(&NodeId) -> bool) -> NodeId {
        loop {
            let id = NodeId::new(format!("{}{}", NODE_ID_PREFIX, self.next));
            // Wraps only after 2^64 allocations; `taken` still keeps ids unique in a tree
            self.next = self.next.wrapping_add(1);
            if !taken(&id) {
                return id;
            }
        }
    }

    /// Advance past an id seen elsewhere so it is never handed out again.
    ///
    /// `node_<u64::MAX>` cannot be moved past; allocation then falls back on
    /// the `taken` check.
    pub fn observe(&mut self, id: &NodeId) {
        if let Some(next) = id.sequence().and_then(|seq| seq.checked_add(1)) {
            if next > self.next {
                self.next = next;
            }
        }
    }
}

/// Trim `input`; blank input yields `default`.
pub fn normalize_label(input: &str, default: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        default.trim().to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_parses_engine_ids_only() {
        assert_eq!(NodeId::from("node_12").sequence(), Some(12));
        assert_eq!(NodeId::from("r").sequence(), None);
        assert_eq!(NodeId::from("node_x").sequence(), None);
    }

    #[test]
    fn test_allocator_skips_taken_ids() {
        let mut ids = IdAllocator::new();
        let taken = NodeId::from("node_0");
        let id = ids.allocate(|candidate| candidate == &taken);
        assert_eq!(id.as_str(), "node_1");
        assert_eq!(ids.allocate(|_| false).as_str(), "node_2");
    }

    #[test]
    fn test_allocator_observe_moves_past_seen_ids() {
        let mut ids = IdAllocator::new();
        ids.observe(&NodeId::from("node_41"));
        ids.observe(&NodeId::from("node_3"));
        assert_eq!(ids.allocate(|_| false).as_str(), "node_42");
    }

    #[test]
    fn test_allocator_observe_largest_sequence_does_not_overflow() {
        let mut ids = IdAllocator::new();
        ids.observe(&NodeId::from("node_7"));
        ids.observe(&NodeId::from(format!("node_{}", u64::MAX)));
        assert_eq!(ids.allocate(|_| false).as_str(), "node_8");
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Topic  ", "New Child"), "Topic");
        assert_eq!(normalize_label("   ", "New Child"), "New Child");
    }

    #[test]
    fn test_record_accepts_legacy_name_key() {
        let record: NodeRecord =
            serde_json::from_str(r##"{"name": "Central Idea", "color": "#3498db"}"##).unwrap();
        assert_eq!(record.label, "Central Idea");
        assert_eq!(record.color.as_deref(), Some("#3498db"));
        assert!(record.children.is_empty());
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        let err = NodeRecord::from_value(serde_json::json!("Central Idea")).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }
}
