//! Error types for the compliance engine

use thiserror::Error;

/// Abstract error kinds surfaced to the HTTP shell (see spec §7).
#[derive(Error, Debug)]
pub enum ComplianceError {
    /// Referenced template, version, alert, or list absent in the scoping org.
    #[error("{kind} not found: {id}")]
    EntityNotFound {
        /// Kind of entity that was missing (e.g. "rule_template").
        kind: &'static str,
        /// Identifier that was looked up.
        id: String,
    },

    /// Structural invalidity (condition tree shape, per-operator value shape).
    #[error("validation failed: {0:?}")]
    ValidationError(Vec<String>),

    /// Semantic invariant violated (baseline missing, cycle in inheritance, ...).
    #[error("business rule violation ({code}): {message}")]
    BusinessRuleViolation {
        /// Stable machine-readable sub-code, e.g. "BASELINE_REQUIRED".
        code: &'static str,
        /// Human-readable detail.
        message: String,
    },

    /// Disallowed state transition (alert lifecycle).
    #[error("invalid state transition from {current} to {attempted}; allowed: {allowed:?}")]
    InvalidState {
        /// Current status.
        current: String,
        /// Status that was attempted.
        attempted: String,
        /// Statuses the current one could legally transition to.
        allowed: Vec<String>,
    },

    /// Violates a uniqueness contract (duplicate list code, duplicate template code, ...).
    #[error("duplicate operation: {0}")]
    DuplicateOperation(String),

    /// Operating on a deactivated template/rule.
    #[error("inactive entity: {0}")]
    InactiveEntity(String),

    /// Missing tenancy scope.
    #[error("organization context required")]
    OrganizationContextRequired,

    /// Database error propagated from the persistence layer.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ComplianceError {
    /// Stable machine-readable code for the §7 error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ComplianceError::EntityNotFound { .. } => "ENTITY_NOT_FOUND",
            ComplianceError::ValidationError(_) => "VALIDATION_ERROR",
            ComplianceError::BusinessRuleViolation { .. } => "BUSINESS_RULE_VIOLATION",
            ComplianceError::InvalidState { .. } => "INVALID_STATE",
            ComplianceError::DuplicateOperation(_) => "DUPLICATE_OPERATION",
            ComplianceError::InactiveEntity(_) => "INACTIVE_ENTITY",
            ComplianceError::OrganizationContextRequired => "ORGANIZATION_CONTEXT_REQUIRED",
            ComplianceError::Database(_) => "DATABASE_ERROR",
            ComplianceError::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }

    /// Construct an entity-not-found error.
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ComplianceError::EntityNotFound { kind, id: id.into() }
    }

    /// Construct a business rule violation.
    pub fn business_rule(code: &'static str, message: impl Into<String>) -> Self {
        ComplianceError::BusinessRuleViolation { code, message: message.into() }
    }
}

/// Result type alias for compliance-engine operations.
pub type Result<T> = std::result::Result<T, ComplianceError>;
