//! Shared identifiers and value types

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! id_newtype {
    ($name:ident) => {
        /// Opaque, org-scoped identifier.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(u: Uuid) -> Self {
                Self(u)
            }
        }
    };
}

id_newtype!(OrganizationId);
id_newtype!(RuleTemplateId);
id_newtype!(RuleVersionId);
id_newtype!(TransactionId);
id_newtype!(EvaluationResultId);
id_newtype!(AlertId);
id_newtype!(ComplianceListId);
id_newtype!(ComplianceEntryId);
id_newtype!(AccountId);

/// Decision reached for an evaluated transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// No rule produced a blocking or review-worthy action.
    Allow,
    /// At least one rule produced a review-worthy action (alert, webhook, queue publish).
    Review,
    /// At least one rule produced a `block_transaction` action.
    Block,
}

impl Decision {
    /// Combine two decisions keeping the most severe (Block > Review > Allow).
    pub fn combine(self, other: Decision) -> Decision {
        use Decision::*;
        match (self, other) {
            (Block, _) | (_, Block) => Block,
            (Review, _) | (_, Review) => Review,
            (Allow, Allow) => Allow,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Allow => write!(f, "ALLOW"),
            Decision::Review => write!(f, "REVIEW"),
            Decision::Block => write!(f, "BLOCK"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_combine_prefers_most_severe() {
        assert_eq!(Decision::Block.combine(Decision::Allow), Decision::Block);
        assert_eq!(Decision::Review.combine(Decision::Allow), Decision::Review);
        assert_eq!(Decision::Allow.combine(Decision::Allow), Decision::Allow);
        assert_eq!(Decision::Review.combine(Decision::Block), Decision::Block);
    }

    #[test]
    fn id_newtypes_roundtrip_json() {
        let id = OrganizationId::new();
        let json = serde_json::to_string(&id).unwrap();
        let back: OrganizationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }
}
