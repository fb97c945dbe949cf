//! The extended database service: factory/registry root of the typed layer.
//!
//! `GraphDatabase` wraps a storage backend and exposes typed property types,
//! relationship types, and container resolution. It is a pure view over the
//! backend: it opens no transactions of its own, performs no retries, and
//! persists nothing beyond the one reserved reification key.

use tracing::debug;

use crate::model::{Direction, Node, NodeId, PropertyMap, RelId, Relationship, Value};
use crate::storage::{BackendConfig, MemoryBackend, StorageBackend};
use crate::tx::TxMode;
use crate::{Error, Result};

use super::container::{ensure_writable, is_reserved_key, ContainerRef, SHADOW_NODE_KEY};
use super::datatype::{Datatype, PropertyValue};
use super::property::Property;
use super::property_type::{AnyPropertyType, ComparablePropertyType, PropertyType};
use super::rel_type::RelationshipType;

// ============================================================================
// GraphDatabase
// ============================================================================

/// The primary entry point. Wraps a storage backend and provides the typed
/// property system and relationship reification on top of it.
pub struct GraphDatabase<B: StorageBackend> {
    backend: B,
}

impl GraphDatabase<MemoryBackend> {
    /// In-memory database for testing and embedding.
    pub fn open_memory() -> Self {
        Self::with_backend(MemoryBackend::new())
    }

    /// Open a database from a backend configuration.
    pub fn open(config: &BackendConfig) -> Self {
        match config {
            BackendConfig::Memory => Self::open_memory(),
        }
    }
}

impl<B: StorageBackend> GraphDatabase<B> {
    /// Create a database service over the given backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Access the underlying backend (for advanced use).
    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ========================================================================
    // Transactions (thin delegation — the backend owns all semantics)
    // ========================================================================

    pub async fn begin(&self, mode: TxMode) -> Result<B::Tx> {
        self.backend.begin_tx(mode).await
    }

    pub async fn commit(&self, tx: B::Tx) -> Result<()> {
        self.backend.commit_tx(tx).await
    }

    pub async fn rollback(&self, tx: B::Tx) -> Result<()> {
        self.backend.rollback_tx(tx).await
    }

    // ========================================================================
    // Property type factories
    // ========================================================================

    pub fn boolean_property_type(&self, name: impl Into<String>) -> PropertyType<bool> {
        PropertyType::new(name)
    }

    pub fn boolean_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<bool>> {
        PropertyType::new(name)
    }

    pub fn byte_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<u8> {
        ComparablePropertyType::new(name)
    }

    pub fn byte_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<u8>> {
        PropertyType::new(name)
    }

    pub fn short_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<i16> {
        ComparablePropertyType::new(name)
    }

    pub fn short_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<i16>> {
        PropertyType::new(name)
    }

    pub fn long_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<i64> {
        ComparablePropertyType::new(name)
    }

    pub fn long_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<i64>> {
        PropertyType::new(name)
    }

    pub fn float_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<f32> {
        ComparablePropertyType::new(name)
    }

    pub fn float_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<f32>> {
        PropertyType::new(name)
    }

    pub fn double_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<f64> {
        ComparablePropertyType::new(name)
    }

    pub fn double_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<f64>> {
        PropertyType::new(name)
    }

    pub fn string_property_type(&self, name: impl Into<String>) -> ComparablePropertyType<String> {
        ComparablePropertyType::new(name)
    }

    pub fn string_array_property_type(&self, name: impl Into<String>) -> PropertyType<Vec<String>> {
        PropertyType::new(name)
    }

    pub fn datetime_property_type(
        &self,
        name: impl Into<String>,
    ) -> ComparablePropertyType<chrono::DateTime<chrono::Utc>> {
        ComparablePropertyType::new(name)
    }

    /// Resolve a named relationship type.
    pub fn relationship_type(&self, name: impl Into<String>) -> RelationshipType {
        RelationshipType::new(name)
    }

    // ========================================================================
    // Elements
    // ========================================================================

    pub async fn create_node(&self, tx: &mut B::Tx) -> Result<NodeId> {
        self.backend.create_node(tx, PropertyMap::new()).await
    }

    pub async fn node_by_id(&self, tx: &B::Tx, id: NodeId) -> Result<Node> {
        self.backend
            .get_node(tx, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Node {id}")))
    }

    pub async fn relationship_by_id(&self, tx: &B::Tx, id: RelId) -> Result<Relationship> {
        self.backend
            .get_relationship(tx, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Relationship {id}")))
    }

    /// All relationship types in use, as resolvable handles.
    pub async fn relationship_types(&self, tx: &B::Tx) -> Result<Vec<RelationshipType>> {
        let names = self.backend.relationship_types(tx).await?;
        Ok(names.into_iter().map(RelationshipType::new).collect())
    }

    pub async fn delete_node(&self, tx: &mut B::Tx, id: NodeId) -> Result<()> {
        if !self.backend.delete_node(tx, id).await? {
            return Err(Error::NotFound(format!("Node {id}")));
        }
        Ok(())
    }

    /// Delete a relationship, cascading to its shadow node if one was
    /// materialized.
    ///
    /// The shadow node is deleted first: if that fails (e.g. the shadow still
    /// participates in relationships), the error propagates and the
    /// relationship stays intact, so success is never reported with a shadow
    /// node orphaned.
    pub async fn delete_relationship(&self, tx: &mut B::Tx, id: RelId) -> Result<()> {
        let rel = self.relationship_by_id(tx, id).await?;
        if let Some(shadow) = shadow_node_id(&rel)? {
            self.backend.delete_node(tx, shadow).await?;
            debug!(relationship = %id, shadow_node = %shadow, "deleted shadow node");
        }
        self.backend.delete_relationship(tx, id).await?;
        Ok(())
    }

    // ========================================================================
    // Typed property access
    // ========================================================================

    /// Bind a property type to a container. Does not touch the backing store
    /// until the binding is read or written.
    pub fn property<T: PropertyValue>(
        &self,
        container: ContainerRef,
        property_type: impl Into<PropertyType<T>>,
    ) -> Property<'_, B, T> {
        Property::new(self, container, property_type.into())
    }

    /// Read the value stored under the type's name.
    pub async fn property_value<T: PropertyValue>(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
        property_type: &PropertyType<T>,
    ) -> Result<T> {
        let value = self
            .read_property(tx, container, property_type.name())
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Property '{}' on {container}", property_type.name()))
            })?;
        T::from_value(value)
    }

    pub async fn has_property<T: PropertyValue>(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
        property_type: &PropertyType<T>,
    ) -> Result<bool> {
        Ok(self
            .read_property(tx, container, property_type.name())
            .await?
            .is_some())
    }

    pub async fn set_property<T: PropertyValue>(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        property_type: &PropertyType<T>,
        value: T,
    ) -> Result<()> {
        self.write_property(tx, container, property_type.name(), value.into_value())
            .await
    }

    /// Remove the value stored under the type's name and return it.
    pub async fn remove_property<T: PropertyValue>(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        property_type: &PropertyType<T>,
    ) -> Result<T> {
        let prior = self
            .take_property(tx, container, property_type.name())
            .await?
            .ok_or_else(|| {
                Error::NotFound(format!("Property '{}' on {container}", property_type.name()))
            })?;
        T::from_value(prior)
    }

    /// Enumerate all property types present on a container, reconstructed
    /// from stored keys with inferred datatypes. The reserved key never
    /// appears; keys whose values have no typed counterpart are skipped.
    pub async fn property_types(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
    ) -> Result<Vec<AnyPropertyType>> {
        let props = self.container_properties(tx, container).await?;
        let mut types: Vec<AnyPropertyType> = props
            .iter()
            .filter(|(key, _)| !is_reserved_key(key))
            .filter_map(|(key, value)| {
                Datatype::of_value(value).map(|datatype| AnyPropertyType {
                    name: key.clone(),
                    datatype,
                })
            })
            .collect();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }

    // ========================================================================
    // Generic (raw) property access — same containers, same guard
    // ========================================================================

    pub async fn raw_property(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
        key: &str,
    ) -> Result<Value> {
        self.read_property(tx, container, key)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property '{key}' on {container}")))
    }

    pub async fn has_raw_property(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
        key: &str,
    ) -> Result<bool> {
        Ok(self.read_property(tx, container, key).await?.is_some())
    }

    pub async fn set_raw_property(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        key: &str,
        value: Value,
    ) -> Result<()> {
        self.write_property(tx, container, key, value).await
    }

    pub async fn remove_raw_property(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        key: &str,
    ) -> Result<Value> {
        self.take_property(tx, container, key)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Property '{key}' on {container}")))
    }

    /// All property keys present on a container, reserved key excluded.
    pub async fn property_keys(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
    ) -> Result<Vec<String>> {
        let props = self.container_properties(tx, container).await?;
        let mut keys: Vec<String> = props
            .into_keys()
            .filter(|key| !is_reserved_key(key))
            .collect();
        keys.sort();
        Ok(keys)
    }

    // ========================================================================
    // Containers & reification
    // ========================================================================

    /// Resolve a container to the node that anchors its relationships.
    ///
    /// A node is its own anchor. A relationship resolves to its shadow node,
    /// materializing it on first use: the shadow's identifier is recorded
    /// under the reserved key on the relationship, so later calls (including
    /// through a fresh `GraphDatabase` over the same store) recover the same
    /// node.
    ///
    /// The check-then-create sequence is not compare-and-swap; callers must
    /// not invoke this concurrently on the same unmaterialized relationship
    /// outside the backend's write-transaction isolation.
    pub async fn container_node(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
    ) -> Result<NodeId> {
        match container {
            ContainerRef::Node(id) => Ok(id),
            ContainerRef::Relationship(id) => {
                let rel = self.relationship_by_id(tx, id).await?;
                if let Some(shadow) = shadow_node_id(&rel)? {
                    return Ok(shadow);
                }
                let shadow = self.backend.create_node(tx, PropertyMap::new()).await?;
                // Direct backend write: the guarded paths reject this key.
                self.backend
                    .set_relationship_property(
                        tx,
                        id,
                        SHADOW_NODE_KEY,
                        Value::Int(shadow.0 as i64),
                    )
                    .await?;
                debug!(relationship = %id, shadow_node = %shadow, "materialized shadow node");
                Ok(shadow)
            }
        }
    }

    /// Whether a relationship has materialized its shadow node.
    pub async fn is_materialized(&self, tx: &B::Tx, id: RelId) -> Result<bool> {
        let rel = self.relationship_by_id(tx, id).await?;
        Ok(shadow_node_id(&rel)?.is_some())
    }

    /// Create a relationship between two containers. Either endpoint may
    /// itself be a relationship; it is materialized as needed.
    pub async fn create_relationship(
        &self,
        tx: &mut B::Tx,
        from: ContainerRef,
        to: ContainerRef,
        rel_type: &RelationshipType,
    ) -> Result<RelId> {
        let src = self.container_node(tx, from).await?;
        let dst = self.container_node(tx, to).await?;
        self.backend
            .create_relationship(tx, src, dst, rel_type.name(), PropertyMap::new())
            .await
    }

    /// Relationships anchored at a container, optionally filtered by
    /// direction and type. Querying a relationship container materializes it.
    pub async fn relationships(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        dir: Direction,
        rel_type: Option<&RelationshipType>,
    ) -> Result<Vec<Relationship>> {
        let node = self.container_node(tx, container).await?;
        self.backend
            .get_relationships(tx, node, dir, rel_type.map(RelationshipType::name))
            .await
    }

    pub async fn has_relationship(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        dir: Direction,
        rel_type: Option<&RelationshipType>,
    ) -> Result<bool> {
        Ok(!self.relationships(tx, container, dir, rel_type).await?.is_empty())
    }

    /// The start endpoint of a relationship. Does not materialize anything.
    pub async fn start_container(&self, tx: &B::Tx, id: RelId) -> Result<ContainerRef> {
        let rel = self.relationship_by_id(tx, id).await?;
        Ok(ContainerRef::Node(rel.src))
    }

    /// The end endpoint of a relationship. Does not materialize anything.
    pub async fn end_container(&self, tx: &B::Tx, id: RelId) -> Result<ContainerRef> {
        let rel = self.relationship_by_id(tx, id).await?;
        Ok(ContainerRef::Node(rel.dst))
    }

    /// The endpoint of `id` opposite to `from`. Resolving `from` may
    /// materialize it if it is a relationship container.
    pub async fn other_container(
        &self,
        tx: &mut B::Tx,
        id: RelId,
        from: ContainerRef,
    ) -> Result<ContainerRef> {
        let from_node = self.container_node(tx, from).await?;
        let rel = self.relationship_by_id(tx, id).await?;
        let other = rel.other_node(from_node).ok_or_else(|| {
            Error::NotFound(format!("{from} is not an endpoint of relationship {id}"))
        })?;
        Ok(ContainerRef::Node(other))
    }

    // ========================================================================
    // Internal property plumbing
    // ========================================================================

    /// Read one property. The reserved key reads as absent: it is never
    /// exposed through any public path.
    pub(crate) async fn read_property(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
        key: &str,
    ) -> Result<Option<Value>> {
        if is_reserved_key(key) {
            return Ok(None);
        }
        let mut props = self.container_properties(tx, container).await?;
        Ok(props.remove(key))
    }

    /// The single write path: typed and raw sets both land here, behind the
    /// reserved-key guard.
    pub(crate) async fn write_property(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        key: &str,
        value: Value,
    ) -> Result<()> {
        ensure_writable(key)?;
        match container {
            ContainerRef::Node(id) => {
                self.backend.set_node_property(tx, id, key, value).await
            }
            ContainerRef::Relationship(id) => {
                self.backend.set_relationship_property(tx, id, key, value).await
            }
        }
    }

    /// The single remove path, behind the same guard.
    pub(crate) async fn take_property(
        &self,
        tx: &mut B::Tx,
        container: ContainerRef,
        key: &str,
    ) -> Result<Option<Value>> {
        ensure_writable(key)?;
        match container {
            ContainerRef::Node(id) => {
                self.backend.remove_node_property(tx, id, key).await
            }
            ContainerRef::Relationship(id) => {
                self.backend.remove_relationship_property(tx, id, key).await
            }
        }
    }

    async fn container_properties(
        &self,
        tx: &B::Tx,
        container: ContainerRef,
    ) -> Result<PropertyMap> {
        match container {
            ContainerRef::Node(id) => Ok(self.node_by_id(tx, id).await?.properties),
            ContainerRef::Relationship(id) => {
                Ok(self.relationship_by_id(tx, id).await?.properties)
            }
        }
    }
}

/// Decode the shadow node identifier recorded on a relationship, if any.
fn shadow_node_id(rel: &Relationship) -> Result<Option<NodeId>> {
    match rel.get(SHADOW_NODE_KEY) {
        None => Ok(None),
        Some(Value::Int(id)) => Ok(Some(NodeId(*id as u64))),
        Some(other) => Err(Error::Storage(format!(
            "corrupt shadow node id on relationship {}: {}",
            rel.id,
            other.kind_name()
        ))),
    }
}
