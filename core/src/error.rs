//! Error taxonomy for the reporting core
//!
//! Failures fall into four categories: configuration (no connection string
//! anywhere), connectivity (TLS/DNS/network/credential failure during
//! connect or the liveness probe), query (an individual find/aggregate/write
//! call failed after a handle existed), and validation (bad input rejected
//! before any store access). A zero-match update or delete is NOT an error;
//! it is reported as [`MutationOutcome::NotFound`].
//!
//! No variant is ever allowed to terminate the process: the presentation
//! layer renders every failure as a message plus a safe default.

use thiserror::Error;

/// Operator guidance shown when no connection string could be resolved.
pub const CONFIGURATION_GUIDANCE: &str = "Add it to secrets.toml under [mongo] \
(uri = \"mongodb+srv://...\") in the StartUpLens config directory, or set the \
MONGO_URI environment variable.";

/// Remediation checklist appended to every connectivity failure.
pub const CONNECTIVITY_CHECKLIST: &str = "Checklist:\n\
- Network Access: temporarily allow 0.0.0.0/0 for the calling host.\n\
- Use the mongodb+srv:// URI, include /StartUpLensDB and ?retryWrites=true&w=majority&appName=StartUpLens.\n\
- Username/password are correct (URL-encode special characters).\n\
- TLS trust-root material is installed, or point STARTUPLENS_TLS_CA_FILE at a CA bundle.";

/// Error type for every operation in the reporting core.
#[derive(Debug, Error)]
pub enum LensError {
    /// No connection string in the secrets file or the environment. The
    /// operation aborts before any store access.
    #[error("MongoDB connection string not found. {guidance}")]
    Configuration {
        /// How to supply a connection string
        guidance: String,
    },

    /// Connect or liveness probe failed (TLS/DNS/network/credentials).
    #[error("database connection failed (TLS/DNS/network): {detail}\n{CONNECTIVITY_CHECKLIST}")]
    Connectivity {
        /// Driver-level failure detail
        detail: String,
    },

    /// An individual query failed after a handle was obtained. Callers
    /// treat this as "no data this refresh" rather than aborting the view.
    #[error("query failed: {0}")]
    Query(String),

    /// Input rejected before any store call.
    #[error("invalid {field}: {message}")]
    Validation {
        /// Offending input field
        field: String,
        /// Field-level message
        message: String,
    },
}

impl LensError {
    /// Configuration error carrying the standard guidance text.
    pub fn missing_connection_string() -> Self {
        Self::Configuration {
            guidance: CONFIGURATION_GUIDANCE.to_string(),
        }
    }

    /// Connectivity error from a driver failure.
    pub fn connectivity(detail: impl std::fmt::Display) -> Self {
        Self::Connectivity {
            detail: detail.to_string(),
        }
    }

    /// Query error from a driver failure.
    pub fn query(detail: impl std::fmt::Display) -> Self {
        Self::Query(detail.to_string())
    }

    /// Validation error for a named field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result of an exact-name update or delete.
///
/// Zero matches is a normal, non-fatal outcome distinct from a query error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    /// A document was matched and the mutation applied
    Applied,
    /// No document matched the given name
    NotFound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_carries_guidance() {
        let err = LensError::missing_connection_string();
        let message = err.to_string();
        assert!(message.contains("connection string not found"));
        assert!(message.contains("MONGO_URI"));
        assert!(message.contains("secrets.toml"));
    }

    #[test]
    fn test_connectivity_error_appends_checklist() {
        let err = LensError::connectivity("DNS resolution failed");
        let message = err.to_string();
        assert!(message.contains("DNS resolution failed"));
        assert!(message.contains("Network Access"));
        assert!(message.contains("mongodb+srv://"));
    }

    #[test]
    fn test_validation_error_names_field() {
        let err = LensError::validation("startup_name", "must not be empty");
        assert_eq!(err.to_string(), "invalid startup_name: must not be empty");
    }

    #[test]
    fn test_mutation_outcome_distinguishes_not_found() {
        assert_ne!(MutationOutcome::Applied, MutationOutcome::NotFound);
    }
}
