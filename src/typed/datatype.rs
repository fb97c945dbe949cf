//! Datatypes the typed layer supports, and their mapping onto engine values.
//!
//! The backing store only understands the opaque `Value` kinds. Each
//! supported datatype maps onto exactly one of them on write; the reverse
//! conversion on read is the single place where the type contract of a
//! `PropertyType` is checked. A stored value that cannot have been written
//! under the declared datatype is a `TypeMismatch`, never a silent coercion.

use chrono::{DateTime, Utc};

use crate::model::Value;
use crate::{Error, Result};

// ============================================================================
// Datatype tags
// ============================================================================

/// Runtime tag for a supported property datatype.
///
/// Narrow numeric kinds (byte, short, float) widen into the engine's
/// `Int`/`Float` on write, so enumeration over stored values can only ever
/// infer the widest kind (`Long`/`Double`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Boolean,
    Byte,
    Short,
    Long,
    Float,
    Double,
    Text,
    DateTime,
    BooleanArray,
    ByteArray,
    ShortArray,
    LongArray,
    FloatArray,
    DoubleArray,
    TextArray,
}

impl Datatype {
    /// Infer the datatype of a stored value, for property-type enumeration.
    ///
    /// Returns None for kinds that have no typed counterpart (e.g. maps
    /// written through the raw path).
    pub fn of_value(value: &Value) -> Option<Datatype> {
        match value {
            Value::Bool(_) => Some(Datatype::Boolean),
            Value::Int(_) => Some(Datatype::Long),
            Value::Float(_) => Some(Datatype::Double),
            Value::String(_) => Some(Datatype::Text),
            Value::Bytes(_) => Some(Datatype::ByteArray),
            Value::DateTime(_) => Some(Datatype::DateTime),
            Value::List(items) => match items.first() {
                Some(Value::Bool(_)) => Some(Datatype::BooleanArray),
                Some(Value::Int(_)) => Some(Datatype::LongArray),
                Some(Value::Float(_)) => Some(Datatype::DoubleArray),
                Some(Value::String(_)) | None => Some(Datatype::TextArray),
                _ => None,
            },
            Value::Null | Value::Map(_) => None,
        }
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Datatype::Boolean => "BOOLEAN",
            Datatype::Byte => "BYTE",
            Datatype::Short => "SHORT",
            Datatype::Long => "LONG",
            Datatype::Float => "FLOAT",
            Datatype::Double => "DOUBLE",
            Datatype::Text => "TEXT",
            Datatype::DateTime => "DATETIME",
            Datatype::BooleanArray => "BOOLEAN[]",
            Datatype::ByteArray => "BYTE[]",
            Datatype::ShortArray => "SHORT[]",
            Datatype::LongArray => "LONG[]",
            Datatype::FloatArray => "FLOAT[]",
            Datatype::DoubleArray => "DOUBLE[]",
            Datatype::TextArray => "TEXT[]",
        };
        write!(f, "{name}")
    }
}

// ============================================================================
// PropertyValue — the conversion boundary
// ============================================================================

/// A Rust type usable as the value of a `PropertyType`.
///
/// `from_value` is the trusted-downcast point of the whole layer: it is the
/// only place an opaque stored value turns back into a typed one, and it
/// reports `Error::TypeMismatch` instead of coercing.
pub trait PropertyValue: Send + Sync + Sized + 'static {
    const DATATYPE: Datatype;

    fn into_value(self) -> Value;

    fn from_value(value: Value) -> Result<Self>;
}

/// Marker for datatypes with a total order, usable for index/sort-capable
/// properties. Boolean and array datatypes are not ordered in this model.
pub trait ComparableValue: PropertyValue + PartialOrd {}

fn mismatch<T>(expected: Datatype, got: &Value) -> Result<T> {
    Err(Error::TypeMismatch { expected, got: got.kind_name().to_string() })
}

// ============================================================================
// Scalar impls
// ============================================================================

impl PropertyValue for bool {
    const DATATYPE: Datatype = Datatype::Boolean;

    fn into_value(self) -> Value { Value::Bool(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for u8 {
    const DATATYPE: Datatype = Datatype::Byte;

    fn into_value(self) -> Value { Value::Int(i64::from(self)) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => u8::try_from(i)
                .map_err(|_| Error::TypeMismatch {
                    expected: Self::DATATYPE,
                    got: format!("INTEGER({i})"),
                }),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for i16 {
    const DATATYPE: Datatype = Datatype::Short;

    fn into_value(self) -> Value { Value::Int(i64::from(self)) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => i16::try_from(i)
                .map_err(|_| Error::TypeMismatch {
                    expected: Self::DATATYPE,
                    got: format!("INTEGER({i})"),
                }),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for i64 {
    const DATATYPE: Datatype = Datatype::Long;

    fn into_value(self) -> Value { Value::Int(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Int(i) => Ok(i),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for f32 {
    const DATATYPE: Datatype = Datatype::Float;

    fn into_value(self) -> Value { Value::Float(f64::from(self)) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            // A widened f32 narrows back exactly; anything else was not
            // written under this datatype.
            Value::Float(f) if f64::from(f as f32) == f || f.is_nan() => Ok(f as f32),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for f64 {
    const DATATYPE: Datatype = Datatype::Double;

    fn into_value(self) -> Value { Value::Float(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Float(f) => Ok(f),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for String {
    const DATATYPE: Datatype = Datatype::Text;

    fn into_value(self) -> Value { Value::String(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl PropertyValue for DateTime<Utc> {
    const DATATYPE: Datatype = Datatype::DateTime;

    fn into_value(self) -> Value { Value::DateTime(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

impl ComparableValue for u8 {}
impl ComparableValue for i16 {}
impl ComparableValue for i64 {}
impl ComparableValue for f32 {}
impl ComparableValue for f64 {}
impl ComparableValue for String {}
impl ComparableValue for DateTime<Utc> {}

// ============================================================================
// Array impls
// ============================================================================

/// Byte arrays use the engine's dedicated `Bytes` kind rather than a list.
impl PropertyValue for Vec<u8> {
    const DATATYPE: Datatype = Datatype::ByteArray;

    fn into_value(self) -> Value { Value::Bytes(self) }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Bytes(b) => Ok(b),
            other => mismatch(Self::DATATYPE, &other),
        }
    }
}

macro_rules! list_property_value {
    ($elem:ty, $datatype:expr) => {
        impl PropertyValue for Vec<$elem> {
            const DATATYPE: Datatype = $datatype;

            fn into_value(self) -> Value {
                Value::List(self.into_iter().map(PropertyValue::into_value).collect())
            }

            fn from_value(value: Value) -> Result<Self> {
                match value {
                    Value::List(items) => items
                        .into_iter()
                        .map(<$elem>::from_value)
                        .collect::<Result<Vec<_>>>()
                        .map_err(|_| Error::TypeMismatch {
                            expected: Self::DATATYPE,
                            got: "LIST".to_string(),
                        }),
                    other => mismatch(Self::DATATYPE, &other),
                }
            }
        }
    };
}

list_property_value!(bool, Datatype::BooleanArray);
list_property_value!(i16, Datatype::ShortArray);
list_property_value!(i64, Datatype::LongArray);
list_property_value!(f32, Datatype::FloatArray);
list_property_value!(f64, Datatype::DoubleArray);
list_property_value!(String, Datatype::TextArray);

// ============================================================================
// Tests
// ============================================================================
