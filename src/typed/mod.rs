//! # Typed Layer
//!
//! The core of the crate: a strongly-typed property model and relationship
//! reification over the untyped `StorageBackend` primitives.
//!
//! Two invariants rule everything here:
//!
//! 1. The reserved reification key is invisible and immutable through every
//!    public property path, typed or generic.
//! 2. A relationship's shadow node, once materialized, is stable for the
//!    lifetime of the relationship.

pub mod datatype;
pub mod property_type;
pub mod container;
pub mod property;
pub mod rel_type;
pub mod db;

pub use datatype::{Datatype, PropertyValue, ComparableValue};
pub use property_type::{PropertyType, ComparablePropertyType, AnyPropertyType};
pub use container::{ContainerRef, is_reserved_key};
pub use property::Property;
pub use rel_type::RelationshipType;
pub use db::GraphDatabase;
