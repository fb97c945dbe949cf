//! # typed-graph — Typed Properties and Relationship Reification
//!
//! An extension layer over a property graph storage engine. The engine only
//! understands opaque `key -> Value` properties; this crate adds two things
//! on top:
//!
//! 1. **Typed property types**: `PropertyType<T>` handles carry a datatype in
//!    the type system, so property access is checked at the one boundary where
//!    an opaque stored `Value` is converted back to `T`.
//! 2. **Relationship reification**: a relationship can act as a relationship
//!    endpoint itself. The first time it is used as a container, a shadow node
//!    is created and its identifier recorded under a reserved property key on
//!    the relationship. Every later use resolves the same node.
//!
//! ## Design Principles
//!
//! 1. **Trait-first**: `StorageBackend` is the contract with the engine
//! 2. **Clean DTOs**: `Node`, `Relationship`, `Value` cross all boundaries
//! 3. **View, not store**: the typed layer persists nothing of its own beyond
//!    one reserved key; durability and transactions belong to the backend
//! 4. **One guard**: every property write/remove funnels through a single
//!    reserved-key check
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use typed_graph::{ContainerRef, GraphDatabase, TxMode};
//!
//! # async fn example() -> typed_graph::Result<()> {
//! let db = GraphDatabase::open_memory();
//! let mut tx = db.begin(TxMode::ReadWrite).await?;
//!
//! let alice = db.create_node(&mut tx).await?;
//! let bob = db.create_node(&mut tx).await?;
//!
//! let likes = db.relationship_type("LIKES");
//! let rel = db.create_relationship(&mut tx, alice.into(), bob.into(), &likes).await?;
//!
//! // Treat the relationship as a container and annotate it with a typed property.
//! let note = db.string_property_type("note");
//! db.set_property(&mut tx, ContainerRef::Relationship(rel), &note, "hello".into()).await?;
//!
//! db.commit(tx).await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod model;
pub mod storage;
pub mod tx;
pub mod typed;
pub mod export;

// ============================================================================
// Re-exports: Model (the DTOs)
// ============================================================================

pub use model::{
    Node, Relationship, Value, PropertyMap,
    NodeId, RelId, Direction,
};

// ============================================================================
// Re-exports: Storage
// ============================================================================

pub use storage::{StorageBackend, BackendConfig, MemoryBackend};

// ============================================================================
// Re-exports: Transactions
// ============================================================================

pub use tx::{Transaction, TxMode, TxId};

// ============================================================================
// Re-exports: Typed layer
// ============================================================================

pub use typed::{
    GraphDatabase, ContainerRef, Property, PropertyType, ComparablePropertyType,
    AnyPropertyType, Datatype, PropertyValue, ComparableValue, RelationshipType,
    is_reserved_key,
};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Attempt to set or remove the reification-reserved property key.
    #[error("Property key '{0}' is reserved for internal use")]
    ReservedKey(String),

    /// Stored value cannot have been written under the declared datatype.
    #[error("Type mismatch: expected {expected}, stored value is {got}")]
    TypeMismatch { expected: typed::Datatype, got: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Transaction error: {0}")]
    Tx(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
