//! Result and error types for Ubicar.

use thiserror::Error;

/// Result type for Ubicar operations
pub type UbicarResult<T> = Result<T, UbicarError>;

/// Errors that can occur in Ubicar
///
/// All variants except [`UbicarError::Json`] are programmer-facing contract
/// violations: they are raised immediately and never retried or swallowed.
#[derive(Debug, Error)]
pub enum UbicarError {
    /// A locator schema was registered twice under the same path
    #[error("[{owner}] a locator schema with the path '{path}' already exists.\nExisting schema: {existing}\nAttempted to add schema: {attempted}")]
    DuplicateRegistration {
        /// Name of the owning page object / component
        owner: String,
        /// The conflicting path
        path: String,
        /// Serialized form of the schema already registered
        existing: String,
        /// Serialized form of the schema that was rejected
        attempted: String,
    },

    /// No locator schema is registered under the requested path
    #[error("[{owner}] locator schema not found for path: '{path}'")]
    SchemaNotFound {
        /// Name of the owning page object / component
        owner: String,
        /// The path that failed to resolve
        path: String,
    },

    /// A sub-path key is not a prefix of the bound path, or has no snapshot entry
    #[error("invalid sub-path '{sub_path}' for '{path}'. Allowed sub-paths are:\n{allowed}")]
    InvalidSubPath {
        /// The offending sub-path key
        sub_path: String,
        /// The handle's bound path
        path: String,
        /// Every valid sub-path present in the snapshot, in chain order
        allowed: String,
    },

    /// An update supplied a field name outside the legal schema field set
    #[error("invalid property: '{field}' is not a valid property of a locator schema")]
    InvalidProperty {
        /// The unknown field name
        field: String,
    },

    /// An update attempted to change the immutable path identity field
    #[error("[{owner}] invalid property: 'locatorSchemaPath' cannot be updated. Attempted to update locatorSchemaPath from '{from}' to '{to}'")]
    IllegalIdentityMutation {
        /// Name of the owning page object / component
        owner: String,
        /// The schema's current path
        from: String,
        /// The path value the update tried to install
        to: String,
    },

    /// A legacy numeric chain position is outside the bound path's sub-path range
    #[error("invalid index {position} for '{path}': the chain has {chain_len} steps")]
    InvalidIndex {
        /// The out-of-range chain position
        position: usize,
        /// The handle's bound path
        path: String,
        /// Number of sub-paths in the chain
        chain_len: usize,
    },

    /// A schema names a locator strategy whose required field is absent
    #[error("locator schema '{path}' selects the '{method}' strategy but '.{field}' is not defined")]
    StrategyFieldMissing {
        /// Path of the incomplete schema
        path: String,
        /// The strategy named by `locatorMethod`
        method: String,
        /// The missing strategy field
        field: String,
    },

    /// The builder fold completed without ever composing a query
    #[error("failed to build nested locator for path: '{path}'")]
    BuildFailure {
        /// The bound path with no registered steps
        path: String,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_sub_path_message_enumerates_alternatives() {
        let err = UbicarError::InvalidSubPath {
            sub_path: "not.a.prefix".to_string(),
            path: "a.b.c".to_string(),
            allowed: "a,\na.b,\na.b.c".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("not.a.prefix"));
        assert!(text.contains("a,\na.b,\na.b.c"));
    }

    #[test]
    fn test_identity_mutation_names_the_transition() {
        let err = UbicarError::IllegalIdentityMutation {
            owner: "LoginPage".to_string(),
            from: "a.b".to_string(),
            to: "x.y".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("from 'a.b' to 'x.y'"));
        assert!(text.contains("[LoginPage]"));
    }

    #[test]
    fn test_strategy_field_missing_message() {
        let err = UbicarError::StrategyFieldMissing {
            path: "main.button".to_string(),
            method: "role".to_string(),
            field: "role".to_string(),
        };
        assert!(err.to_string().contains("'.role' is not defined"));
    }
}
