//! Policy (relationship) types

use serde::{Deserialize, Serialize};

/// Relation checked by admin shortcuts
pub const ADMIN_RELATION: &str = "admin";

/// Relation checked by ownership shortcuts
pub const OWNER_RELATION: &str = "owner";

/// Object on which platform administrators hold [`ADMIN_RELATION`]
pub const PLATFORM_OBJECT: &str = "platform";

/// A `(subject, relation, object)` triple
///
/// Used both as a question ("may `subject` do `relation` on `object`?") and as
/// a relationship to write or delete.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PolicyRequest {
    /// Acting principal
    pub subject: String,
    /// Relation or permission name
    pub relation: String,
    /// Target object
    pub object: String,
}

impl PolicyRequest {
    /// Create a new policy request
    pub fn new(
        subject: impl Into<String>,
        relation: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }

    /// Whether any component is empty
    pub fn is_incomplete(&self) -> bool {
        self.subject.is_empty() || self.relation.is_empty() || self.object.is_empty()
    }
}

impl std::fmt::Display for PolicyRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}@{}", self.object, self.relation, self.subject)
    }
}
