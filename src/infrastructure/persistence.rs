//! JSON persistence of mindmaps.
//!
//! Documents use the nested `{ id?, label, color?, fontSize?, children }`
//! shape of [`NodeRecord`]. Saving writes a sibling temp file first and renames
//! it over the target, so an interrupted save never leaves a truncated file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::{MindMap, NodeRecord, TreeBuilder};
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::error_ext::IoResultExt;
use crate::infrastructure::traits::FileSystem;

/// Reads and writes mindmap documents through a [`FileSystem`].
pub struct MindMapStore {
    fs: Arc<dyn FileSystem>,
}

impl MindMapStore {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Reads `path` as untyped JSON, for [`EditEngine::load`](crate::application::EditEngine::load).
    #[instrument(level = "debug", skip(self))]
    pub fn read_value(&self, path: &Path) -> InfraResult<Value> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read mindmap", path)?;
        parse_value(&content, &path.display().to_string())
    }

    /// Reads `path` and builds the tree, assigning ids where missing.
    pub fn load(&self, path: &Path) -> InfraResult<MindMap> {
        let record = NodeRecord::from_value(self.read_value(path)?)?;
        Ok(TreeBuilder::new().build(record)?)
    }

    /// Writes `tree` to `path` as pretty-printed JSON.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, path: &Path, tree: &MindMap) -> InfraResult<()> {
        let json = to_json(tree)?;
        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;

        let tmp = temp_path(path);
        self.fs
            .write(&tmp, &json)
            .with_path_context("write mindmap", &tmp)?;
        self.fs
            .rename(&tmp, path)
            .with_path_context("replace mindmap", path)?;
        debug!("saved {} nodes to {}", tree.node_count(), path.display());
        Ok(())
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.is_file(path)
    }
}

/// Pretty-printed JSON document for `tree`.
pub fn to_json(tree: &MindMap) -> InfraResult<String> {
    serde_json::to_string_pretty(&tree.to_record())
        .map_err(|e| InfraError::json("serialize mindmap", e))
}

/// Parses a document; only JSON syntax is checked here.
pub fn parse_value(content: &str, context: &str) -> InfraResult<Value> {
    serde_json::from_str(content).map_err(|e| InfraError::json(context, e))
}

/// Download-style file name of the web app: `mindmap_YYYY-MM-DD.json`.
pub fn default_file_name(date: NaiveDate) -> String {
    format!("mindmap_{}.json", date.format("%Y-%m-%d"))
}

/// `dir/mindmap_<today>.json`.
pub fn default_path(dir: &Path) -> PathBuf {
    dir.join(default_file_name(chrono::Local::now().date_naive()))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
