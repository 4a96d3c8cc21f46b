//! Domain error taxonomy.
//!
//! Creator-only violations are deliberately reported as [`DomainError::NotFound`]
//! so a caller cannot distinguish "exists but not yours" from "does not
//! exist". The server boundary maps each variant to an HTTP status and a
//! JSON body.

/// Errors produced by the task query and mutation engines.
#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    /// One or more required fields are missing or invalid.
    #[error("Validation Error")]
    Validation {
        /// Per-field messages.
        errors: Vec<String>,
    },

    /// The named entity is absent, or not visible to the caller.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was violated on persistence.
    #[error("Duplicate field value entered")]
    Conflict {
        /// The field that collided.
        field: &'static str,
    },

    /// Anything else; surfaced generically at the boundary.
    #[error("{0}")]
    Unexpected(String),
}

impl DomainError {
    /// Builds a validation error from a single message.
    #[must_use]
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![message.into()],
        }
    }
}
