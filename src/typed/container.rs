//! Relationship containers and the reserved reification key.
//!
//! A container is anything that can be the endpoint of a relationship and
//! carry typed properties: a node, or a relationship acting through its
//! shadow node. The reserved key is the one property name this layer owns;
//! every write/remove path funnels through `ensure_writable` so the
//! invariant cannot be bypassed by a new access method later.

use crate::model::{NodeId, RelId};
use crate::{Error, Result};

/// The property key under which a relationship records its shadow node's
/// identifier. Internal constant, never part of the public surface.
pub(crate) const SHADOW_NODE_KEY: &str = "typed_graph.internal.shadow_node_id";

/// Whether a property key is reserved by the reification layer.
pub fn is_reserved_key(key: &str) -> bool {
    key == SHADOW_NODE_KEY
}

/// Reject writes and removes under the reserved key. The single guard for
/// both the typed and the generic property paths.
pub(crate) fn ensure_writable(key: &str) -> Result<()> {
    if is_reserved_key(key) {
        return Err(Error::ReservedKey(key.to_string()));
    }
    Ok(())
}

// ============================================================================
// ContainerRef
// ============================================================================

/// Reference to a graph element usable as a relationship endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContainerRef {
    Node(NodeId),
    Relationship(RelId),
}

impl From<NodeId> for ContainerRef {
    fn from(id: NodeId) -> Self {
        ContainerRef::Node(id)
    }
}

impl From<RelId> for ContainerRef {
    fn from(id: RelId) -> Self {
        ContainerRef::Relationship(id)
    }
}

impl std::fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContainerRef::Node(id) => write!(f, "Node {id}"),
            ContainerRef::Relationship(id) => write!(f, "Relationship {id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_key_guard() {
        assert!(ensure_writable("note").is_ok());
        assert!(matches!(
            ensure_writable(SHADOW_NODE_KEY),
            Err(Error::ReservedKey(_))
        ));
    }

    #[test]
    fn test_container_from_ids() {
        assert_eq!(ContainerRef::from(NodeId(1)), ContainerRef::Node(NodeId(1)));
        assert_eq!(ContainerRef::from(RelId(2)), ContainerRef::Relationship(RelId(2)));
    }
}
