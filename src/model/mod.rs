//! # Property Graph Model
//!
//! Clean DTOs that define the property graph this layer sits on.
//! These types cross every boundary: storage ↔ typed layer ↔ user.
//!
//! Design rule: this module is pure data — no I/O, no state, no async.

pub mod node;
pub mod relationship;
pub mod value;
pub mod property_map;

pub use node::{Node, NodeId};
pub use relationship::{Relationship, RelId, Direction};
pub use value::Value;
pub use property_map::PropertyMap;
