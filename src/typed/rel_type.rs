//! Named relationship-type handles.

/// A named relationship type, resolved through the database service.
///
/// Stateless beyond its name: two handles with the same name classify the
/// same relationships.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipType {
    name: String,
}

impl RelationshipType {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl From<&str> for RelationshipType {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
