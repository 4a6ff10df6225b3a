//! Tests for MindMapStore JSON persistence

use std::fs;
use std::sync::Arc;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use jphmind::application::{EditEngine, EngineOptions};
use jphmind::domain::{sample_record, DomainError, NodeId, NodeRecord, TreeBuilder, MAX_TREE_DEPTH};
use jphmind::infrastructure::persistence::{default_path, to_json};
use jphmind::infrastructure::traits::RealFileSystem;
use jphmind::infrastructure::{InfraError, MindMapStore};
use jphmind::application::ApplicationError;

#[fixture]
fn store() -> MindMapStore {
    MindMapStore::new(Arc::new(RealFileSystem))
}

#[rstest]
fn given_edited_tree_when_save_then_load_then_structurally_equal(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("map.json");
    let mut engine = EditEngine::from_record(EngineOptions::default(), sample_record()).unwrap();
    let root = engine.tree().root_id().clone();
    let child = engine
        .add_child(&root, "Testing", Some("#abcabc".into()), Some(11))
        .unwrap();
    engine.rename_node(&NodeId::from("node_1"), "Client").unwrap();

    // Act
    store.save(&path, engine.tree()).unwrap();
    let loaded = store.load(&path).unwrap();

    // Assert
    assert_eq!(&loaded, engine.tree());
    let node = loaded.node(&child).unwrap();
    assert_eq!(node.data.font_size, Some(11));
    assert_eq!(node.data.color.as_deref(), Some("#abcabc"));
}

#[rstest]
fn given_tree_built_to_max_depth_when_save_then_load_then_structurally_equal(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("deep.json");
    let mut engine = EditEngine::default();
    let mut deepest = engine.tree().root_id().clone();
    for level in 1..MAX_TREE_DEPTH {
        deepest = engine
            .add_child(&deepest, &format!("Level {}", level), None, None)
            .unwrap();
    }

    // Act
    store.save(&path, engine.tree()).unwrap();
    let loaded = store.load(&path).unwrap();

    // Assert
    assert_eq!(&loaded, engine.tree());
    assert_eq!(loaded.depth(), MAX_TREE_DEPTH);
    assert!(loaded.contains(&deepest));
}

#[rstest]
fn given_file_deeper_than_limit_when_loading_then_invalid_argument(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("too_deep.json");
    let mut record = NodeRecord::new("leaf");
    for i in 1..=MAX_TREE_DEPTH {
        record = NodeRecord::new(format!("level {}", i)).with_children(vec![record]);
    }
    fs::write(&path, serde_json::to_string(&record).unwrap()).unwrap();

    // Act
    let err = store.load(&path).unwrap_err();

    // Assert
    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::Domain(DomainError::InvalidArgument(_)))
    ));
}

#[rstest]
fn given_missing_parent_dir_when_saving_then_created_without_temp_leftover(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested/deeper/map.json");
    let tree = TreeBuilder::new().build(NodeRecord::new("Root")).unwrap();

    // Act
    store.save(&path, &tree).unwrap();

    // Assert
    assert!(store.exists(&path));
    assert!(!path.with_file_name("map.json.tmp").exists());
}

#[rstest]
fn given_web_app_file_with_name_key_when_loading_then_ids_assigned(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("legacy.json");
    fs::write(
        &path,
        r##"{"name": "Central Idea", "color": "#3498db", "children": [{"name": "Idea", "fontSize": 16}]}"##,
    )
    .unwrap();

    // Act
    let tree = store.load(&path).unwrap();

    // Assert
    assert_eq!(tree.root_id().as_str(), "node_0");
    assert_eq!(tree.root_node().data.label, "Central Idea");
    let child = tree.node(&NodeId::from("node_1")).unwrap();
    assert_eq!(child.data.label, "Idea");
    assert_eq!(child.data.font_size, Some(16));
}

#[rstest]
fn given_saved_tree_when_reading_json_then_camel_case_and_no_nulls(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("map.json");
    let tree = TreeBuilder::new()
        .build(NodeRecord::new("Root").with_children(vec![NodeRecord::new("Sized").with_font_size(20)]))
        .unwrap();

    // Act
    store.save(&path, &tree).unwrap();
    let content = fs::read_to_string(&path).unwrap();

    // Assert
    assert!(content.contains("\"fontSize\": 20"));
    assert!(!content.contains("null"));
    assert!(!content.contains("\"color\""));
    assert_eq!(content, to_json(&tree).unwrap());
}

#[rstest]
fn given_invalid_json_when_loading_then_json_error(store: MindMapStore) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("broken.json");
    fs::write(&path, "{ \"label\": ").unwrap();

    // Act
    let err = store.load(&path).unwrap_err();

    // Assert
    assert!(matches!(err, InfraError::Json { .. }));
}

#[rstest]
fn given_json_array_when_loading_then_invalid_argument(store: MindMapStore) {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("array.json");
    fs::write(&path, "[]").unwrap();

    let err = store.load(&path).unwrap_err();

    assert!(matches!(
        err,
        InfraError::Application(ApplicationError::Domain(DomainError::InvalidArgument(_)))
    ));
}

#[rstest]
fn given_missing_file_when_loading_then_io_error(store: MindMapStore) {
    let temp = TempDir::new().unwrap();

    let err = store.load(&temp.path().join("absent.json")).unwrap_err();

    assert!(matches!(err, InfraError::Io { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn given_data_dir_when_resolving_default_path_then_dated_file_name() {
    let temp = TempDir::new().unwrap();

    let path = default_path(temp.path());

    let name = path.file_name().unwrap().to_string_lossy().to_string();
    assert!(name.starts_with("mindmap_"));
    assert!(name.ends_with(".json"));
    assert_eq!(name.len(), "mindmap_2024-01-01.json".len());
    assert_eq!(path.parent().unwrap(), temp.path());
}
