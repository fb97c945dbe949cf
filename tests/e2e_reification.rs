//! End-to-end tests for relationship reification: shadow-node
//! materialization, idempotence, invisibility of the reserved key, and the
//! deletion cascade.

use typed_graph::{
    ContainerRef, Direction, Error, GraphDatabase, MemoryBackend, TxMode, Value,
};

const RESERVED: &str = "typed_graph.internal.shadow_node_id";

// ============================================================================
// 1. Materialization is lazy and idempotent
// ============================================================================

#[tokio::test]
async fn test_materialization_is_lazy_and_idempotent() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();

    // Nothing materialized yet: endpoints and type reads don't need the shadow.
    assert_eq!(db.start_container(&tx, rel).await.unwrap(), ContainerRef::Node(a));
    assert_eq!(db.end_container(&tx, rel).await.unwrap(), ContainerRef::Node(b));
    assert!(!db.is_materialized(&tx, rel).await.unwrap());

    let n1 = db.container_node(&mut tx, rel.into()).await.unwrap();
    assert!(db.is_materialized(&tx, rel).await.unwrap());

    let n2 = db.container_node(&mut tx, rel.into()).await.unwrap();
    assert_eq!(n1, n2);

    // Exactly one extra node was created: a, b, and the shadow.
    use typed_graph::StorageBackend;
    assert_eq!(db.backend().node_count(&tx).await.unwrap(), 3);
}

// ============================================================================
// 2. Materialization survives re-opening the same store
// ============================================================================

#[tokio::test]
async fn test_materialization_survives_reopen() {
    let backend = MemoryBackend::new();
    let db = GraphDatabase::with_backend(backend.clone());
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();
    let n1 = db.container_node(&mut tx, rel.into()).await.unwrap();
    db.commit(tx).await.unwrap();

    // A fresh service over the same store resolves the recorded shadow node
    // instead of creating a new one.
    let db2 = GraphDatabase::with_backend(backend);
    let mut tx = db2.begin(TxMode::ReadWrite).await.unwrap();
    let n2 = db2.container_node(&mut tx, rel.into()).await.unwrap();
    assert_eq!(n1, n2);
}

// ============================================================================
// 3. Edge about edge
// ============================================================================

#[tokio::test]
async fn test_relationship_from_relationship() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let annotator = db.create_node(&mut tx).await.unwrap();

    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();

    // An edge whose source is another edge.
    let about = db.relationship_type("ANNOTATES");
    let annotation = db
        .create_relationship(&mut tx, annotator.into(), rel.into(), &about)
        .await
        .unwrap();

    // The annotation lands on the shadow node of `rel`.
    let shadow = db.container_node(&mut tx, rel.into()).await.unwrap();
    assert_eq!(
        db.end_container(&tx, annotation).await.unwrap(),
        ContainerRef::Node(shadow)
    );

    // And is visible when querying the relationship as a container.
    let incoming = db
        .relationships(&mut tx, rel.into(), Direction::Incoming, Some(&about))
        .await
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].id, annotation);

    assert!(db
        .has_relationship(&mut tx, rel.into(), Direction::Both, None)
        .await
        .unwrap());
    assert_eq!(
        db.other_container(&mut tx, annotation, rel.into()).await.unwrap(),
        ContainerRef::Node(annotator)
    );
}

// ============================================================================
// 4. Reserved key is invisible on a reified relationship
// ============================================================================

#[tokio::test]
async fn test_reserved_key_invisible_after_reification() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();
    db.container_node(&mut tx, rel.into()).await.unwrap();

    let container = ContainerRef::Relationship(rel);

    // The key is now physically present on the relationship...
    let raw = db.relationship_by_id(&tx, rel).await.unwrap();
    assert!(raw.get(RESERVED).is_some());

    // ...but no public path exposes it.
    assert!(db.property_keys(&tx, container).await.unwrap().is_empty());
    assert!(db.property_types(&tx, container).await.unwrap().is_empty());
    assert!(!db.has_raw_property(&tx, container, RESERVED).await.unwrap());
    let err = db.raw_property(&tx, container, RESERVED).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");

    // And no public path mutates it.
    let err = db
        .set_raw_property(&mut tx, container, RESERVED, Value::Int(99))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ReservedKey(_)), "got {err:?}");
    let err = db.remove_raw_property(&mut tx, container, RESERVED).await.unwrap_err();
    assert!(matches!(err, Error::ReservedKey(_)), "got {err:?}");
}

// ============================================================================
// 5. Deletion cascade
// ============================================================================

#[tokio::test]
async fn test_delete_cascades_to_shadow_node() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();
    let shadow = db.container_node(&mut tx, rel.into()).await.unwrap();

    db.delete_relationship(&mut tx, rel).await.unwrap();

    let err = db.node_by_id(&tx, shadow).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
    let err = db.relationship_by_id(&tx, rel).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
}

#[tokio::test]
async fn test_delete_unmaterialized_relationship_leaves_no_shadow() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();

    db.delete_relationship(&mut tx, rel).await.unwrap();

    use typed_graph::StorageBackend;
    assert_eq!(db.backend().node_count(&tx).await.unwrap(), 2);
}

#[tokio::test]
async fn test_delete_fails_while_shadow_is_connected() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let annotator = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let about = db.relationship_type("ANNOTATES");

    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();
    let annotation = db
        .create_relationship(&mut tx, annotator.into(), rel.into(), &about)
        .await
        .unwrap();

    // The shadow still participates in the annotation; deletion propagates
    // the backend failure and leaves the relationship intact.
    let err = db.delete_relationship(&mut tx, rel).await.unwrap_err();
    assert!(matches!(err, Error::ConstraintViolation(_)), "got {err:?}");
    assert!(db.relationship_by_id(&tx, rel).await.is_ok());

    // After removing the annotation, the cascade goes through.
    db.delete_relationship(&mut tx, annotation).await.unwrap();
    db.delete_relationship(&mut tx, rel).await.unwrap();
}

// ============================================================================
// 6. The full scenario
// ============================================================================

#[tokio::test]
async fn test_likes_scenario() {
    let db = GraphDatabase::open_memory();
    let mut tx = db.begin(TxMode::ReadWrite).await.unwrap();

    let a = db.create_node(&mut tx).await.unwrap();
    let b = db.create_node(&mut tx).await.unwrap();
    let likes = db.relationship_type("LIKES");
    let rel = db.create_relationship(&mut tx, a.into(), b.into(), &likes).await.unwrap();

    let n1 = db.container_node(&mut tx, rel.into()).await.unwrap();

    let note = db.string_property_type("note");
    let container = ContainerRef::Relationship(rel);
    db.set_property(&mut tx, container, &note, "hello".to_string()).await.unwrap();

    assert_eq!(db.container_node(&mut tx, rel.into()).await.unwrap(), n1);
    assert_eq!(db.property_value(&tx, container, &note).await.unwrap(), "hello");

    db.delete_relationship(&mut tx, rel).await.unwrap();
    let err = db.node_by_id(&tx, n1).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got {err:?}");
}
