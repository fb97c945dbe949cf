//! Property type handles.
//!
//! A `PropertyType<T>` is a name plus a compile-time datatype. It carries no
//! runtime payload beyond the name and has no independent lifecycle: it only
//! has presence through stored keys, so two instances with the same name and
//! datatype are interchangeable.

use std::marker::PhantomData;
use std::ops::Deref;

use super::datatype::{ComparableValue, Datatype, PropertyValue};

// ============================================================================
// PropertyType
// ============================================================================

/// A named, datatype-tagged handle for one property slot.
#[derive(Debug, Clone)]
pub struct PropertyType<T: PropertyValue> {
    name: String,
    _value: PhantomData<fn() -> T>,
}

impl<T: PropertyValue> PropertyType<T> {
    /// Construct a handle for the given name.
    ///
    /// No central registry checks the name against other handles or against
    /// the reserved key; a name/datatype mismatch surfaces as a
    /// `TypeMismatch` at read time, and reserved-key use is rejected at
    /// write/remove time.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), _value: PhantomData }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn datatype(&self) -> Datatype {
        T::DATATYPE
    }
}

impl<T: PropertyValue> PartialEq for PropertyType<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl<T: PropertyValue> Eq for PropertyType<T> {}

// ============================================================================
// ComparablePropertyType
// ============================================================================

/// A `PropertyType` whose datatype has a total order.
///
/// Ordered datatypes (byte, short, long, float, double, string, datetime)
/// get this variant from the database-service factories; boolean and array
/// types only get the plain handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComparablePropertyType<T: ComparableValue>(PropertyType<T>);

impl<T: ComparableValue> ComparablePropertyType<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self(PropertyType::new(name))
    }
}

impl<T: ComparableValue> Deref for ComparablePropertyType<T> {
    type Target = PropertyType<T>;

    fn deref(&self) -> &PropertyType<T> {
        &self.0
    }
}

impl<T: ComparableValue> From<ComparablePropertyType<T>> for PropertyType<T> {
    fn from(pt: ComparablePropertyType<T>) -> Self {
        pt.0
    }
}

// ============================================================================
// AnyPropertyType
// ============================================================================

/// A datatype-erased property type, reconstructed from a stored key during
/// enumeration. The datatype is inferred from the stored value, so narrow
/// numeric kinds report their widened form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AnyPropertyType {
    pub name: String,
    pub datatype: Datatype,
}

impl std::fmt::Display for AnyPropertyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.datatype)
    }
}
