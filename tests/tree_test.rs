//! Tests for the arena-backed MindMap tree

use rstest::{fixture, rstest};

use jphmind::domain::{
    DomainError, IdAllocator, MindMap, NodeData, NodeId, NodeRecord, TreeBuilder, MAX_TREE_DEPTH,
};

/// Root(r) -> [A -> [A1, A2], B]
#[fixture]
fn tree() -> MindMap {
    TreeBuilder::new()
        .build(
            NodeRecord::new("Root").with_id("r").with_children(vec![
                NodeRecord::new("A").with_id("a").with_children(vec![
                    NodeRecord::new("A1").with_id("a1"),
                    NodeRecord::new("A2").with_id("a2"),
                ]),
                NodeRecord::new("B").with_id("b"),
            ]),
        )
        .unwrap()
}

fn id(s: &str) -> NodeId {
    NodeId::from(s)
}

fn detached(id: &str, label: &str) -> NodeData {
    NodeData {
        id: NodeId::from(id),
        label: label.into(),
        color: None,
        font_size: None,
    }
}

#[rstest]
fn given_tree_when_iterating_then_preorder_and_postorder(tree: MindMap) {
    // Act
    let pre: Vec<&str> = tree.iter().map(|(_, n)| n.data.id.as_str()).collect();
    let post: Vec<&str> = tree.iter_postorder().map(|(_, n)| n.data.id.as_str()).collect();

    // Assert
    assert_eq!(pre, vec!["r", "a", "a1", "a2", "b"]);
    assert_eq!(post, vec!["a1", "a2", "a", "b", "r"]);
}

#[rstest]
fn given_tree_when_finding_by_id_then_resolves_or_none(tree: MindMap) {
    assert_eq!(tree.find_by_id(&id("a2")).unwrap().data.label, "A2");
    assert!(tree.find_by_id(&id("zz")).is_none());
    assert!(matches!(tree.node(&id("zz")), Err(DomainError::NotFound(_))));
}

#[rstest]
fn given_tree_when_querying_shape_then_depths_and_leaves(tree: MindMap) {
    assert_eq!(tree.node_count(), 5);
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.depth_of(&id("r")).unwrap(), 0);
    assert_eq!(tree.depth_of(&id("a1")).unwrap(), 2);
    assert_eq!(tree.leaf_ids(), vec![id("a1"), id("a2"), id("b")]);
    assert_eq!(tree.parent_of(&id("a1")).unwrap().unwrap().data.id, id("a"));
    assert!(tree.parent_of(&id("r")).unwrap().is_none());
}

#[rstest]
fn given_node_when_appending_then_last_child(mut tree: MindMap) {
    // Act
    tree.append_child(&id("a"), detached("a3", "A3")).unwrap();

    // Assert
    let children: Vec<&str> = tree
        .children_of(&id("a"))
        .unwrap()
        .iter()
        .map(|n| n.data.label.as_str())
        .collect();
    assert_eq!(children, vec!["A1", "A2", "A3"]);
    assert!(tree.contains(&id("a3")));
}

#[rstest]
#[case("a", "a")]
#[case("b", "a1")]
fn given_invalid_child_when_appending_then_invalid_operation(
    mut tree: MindMap,
    #[case] parent: &str,
    #[case] child: &str,
) {
    // Arrange
    let before = tree.clone();

    // Act
    let err = tree.append_child(&id(parent), detached(child, "X")).unwrap_err();

    // Assert
    assert!(matches!(err, DomainError::InvalidOperation(_)));
    assert_eq!(tree, before);
}

#[rstest]
fn given_missing_parent_when_appending_then_not_found(mut tree: MindMap) {
    let err = tree.append_child(&id("nope"), detached("x", "X")).unwrap_err();
    assert_eq!(err, DomainError::NotFound(id("nope")));
}

#[rstest]
fn given_subtree_when_removing_then_descendants_leave_index(mut tree: MindMap) {
    // Act
    let removed = tree.remove_child(&id("r"), &id("a")).unwrap();

    // Assert
    assert_eq!(removed.label, "A");
    assert_eq!(tree.node_count(), 2);
    for gone in ["a", "a1", "a2"] {
        assert!(!tree.contains(&id(gone)));
    }
}

#[rstest]
fn given_non_child_when_removing_then_not_found(mut tree: MindMap) {
    let err = tree.remove_child(&id("b"), &id("a1")).unwrap_err();
    assert_eq!(err, DomainError::NotFound(id("a1")));
    assert_eq!(tree.node_count(), 5);
}

#[rstest]
fn given_root_when_detaching_then_invalid_operation(mut tree: MindMap) {
    let err = tree.detach(&id("r")).unwrap_err();
    assert!(matches!(err, DomainError::InvalidOperation(_)));
}

#[rstest]
fn given_clone_when_original_mutates_then_clone_is_independent(mut tree: MindMap) {
    // Arrange
    let copy = tree.clone_deep();

    // Act
    tree.set_label(&id("a"), "Changed".into()).unwrap();
    tree.detach(&id("b")).unwrap();

    // Assert
    assert_eq!(copy.find_by_id(&id("a")).unwrap().data.label, "A");
    assert!(copy.contains(&id("b")));
    assert_ne!(copy, tree);
}

#[rstest]
fn given_tree_when_converting_to_record_then_structure_preserved(tree: MindMap) {
    // Act
    let record = tree.to_record();
    let rebuilt = TreeBuilder::new().build(record.clone()).unwrap();

    // Assert
    assert_eq!(record.children.len(), 2);
    assert_eq!(record.children[0].children[1].id, Some(id("a2")));
    assert_eq!(rebuilt, tree);
}

#[test]
fn given_deepest_allowed_chain_when_converting_to_record_then_every_level_kept() {
    // Arrange
    let mut ids = IdAllocator::new();
    let mut tree = MindMap::with_root(&mut ids, "Root");
    let mut parent = tree.root_id().clone();
    for level in 1..MAX_TREE_DEPTH {
        let node = tree.create_node(&mut ids, &format!("Level {}", level), None, None);
        let id = node.id.clone();
        tree.append_child(&parent, node).unwrap();
        parent = id;
    }

    // Act
    let record = tree.to_record();

    // Assert
    assert_eq!(tree.depth(), MAX_TREE_DEPTH);
    let mut levels = 1;
    let mut current = &record;
    while let Some(child) = current.children.first() {
        levels += 1;
        current = child;
    }
    assert_eq!(levels, MAX_TREE_DEPTH);
    assert_eq!(current.id.as_ref(), Some(&parent));
    assert_eq!(TreeBuilder::new().build(record).unwrap(), tree);
}

#[test]
fn given_existing_ids_when_creating_node_then_fresh_id_skips_them() {
    // Arrange
    let mut ids = IdAllocator::new();
    let mut tree = MindMap::new(detached("node_0", "Root"));
    tree.append_child(&id("node_0"), detached("node_1", "Taken"))
        .unwrap();

    // Act
    let data = tree.create_node(&mut ids, "Fresh", Some("#fff".into()), Some(12));

    // Assert
    assert_eq!(data.id, id("node_2"));
    assert_eq!(data.color.as_deref(), Some("#fff"));
    assert!(!tree.contains(&data.id));
}
