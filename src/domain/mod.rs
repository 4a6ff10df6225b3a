//! Domain layer: the mindmap tree, its history and selection
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod entities;
pub mod error;
pub mod history;
pub mod selection;

pub use arena::{MindMap, TreeNode, MAX_TREE_DEPTH};
pub use builder::{sample_record, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use history::{HistoryLog, DEFAULT_HISTORY_CAPACITY};
pub use selection::SelectionState;
