use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Unrecognised {kind} value: {value}")]
    UnknownValue { kind: &'static str, value: String },

    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition { from: String, to: String },

    #[error("Role {role} may not {action}")]
    Unauthorized { role: String, action: String },

    #[error("Purchase request {pr_number} cannot be deleted while {status}")]
    DeleteLocked { pr_number: String, status: String },

    #[error("Purchase request {pr_number} is read-only while {status}")]
    ReadOnly { pr_number: String, status: String },

    #[error("Invalid username or password")]
    InvalidCredentials,
}

impl Error {
    /// Shorthand for a required-field or bad-input failure.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
