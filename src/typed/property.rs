//! The bound `Property<T>` view.

use crate::storage::StorageBackend;
use crate::Result;

use super::container::ContainerRef;
use super::datatype::PropertyValue;
use super::db::GraphDatabase;
use super::property_type::PropertyType;

/// A property type bound to a container.
///
/// A transient view, re-created on demand: it holds no state beyond the
/// (container, type) pair and does not touch the backing store until a value
/// is read or written.
pub struct Property<'g, B: StorageBackend, T: PropertyValue> {
    db: &'g GraphDatabase<B>,
    container: ContainerRef,
    property_type: PropertyType<T>,
}

impl<'g, B: StorageBackend, T: PropertyValue> Property<'g, B, T> {
    pub(crate) fn new(
        db: &'g GraphDatabase<B>,
        container: ContainerRef,
        property_type: PropertyType<T>,
    ) -> Self {
        Self { db, container, property_type }
    }

    pub fn container(&self) -> ContainerRef {
        self.container
    }

    pub fn property_type(&self) -> &PropertyType<T> {
        &self.property_type
    }

    /// Read the stored value. `NotFound` when absent.
    pub async fn value(&self, tx: &B::Tx) -> Result<T> {
        self.db
            .property_value(tx, self.container, &self.property_type)
            .await
    }

    pub async fn exists(&self, tx: &B::Tx) -> Result<bool> {
        self.db
            .has_property(tx, self.container, &self.property_type)
            .await
    }

    pub async fn set(&self, tx: &mut B::Tx, value: T) -> Result<()> {
        self.db
            .set_property(tx, self.container, &self.property_type, value)
            .await
    }

    /// Remove the stored value and return it. `NotFound` when absent.
    pub async fn remove(&self, tx: &mut B::Tx) -> Result<T> {
        self.db
            .remove_property(tx, self.container, &self.property_type)
            .await
    }
}
