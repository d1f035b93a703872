//! Error types for the staygrid engine.
//!
//! This module provides the error hierarchy for all engine operations,
//! using `thiserror` for ergonomic error handling. Callers are expected to
//! branch on the error *kind* (via `matches!` or the `is_*` predicates),
//! never on message text.

use thiserror::Error;

/// Result type alias for operations that may fail with an engine error.
///
/// # Examples
///
/// ```
/// use staygrid::{Error, Result};
///
/// fn example_operation() -> Result<u32> {
///     Ok(2)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the staygrid engine.
///
/// The variants follow the engine's error taxonomy:
///
/// - [`Error::Validation`] - caller-correctable input problem; no mutation
///   was attempted.
/// - [`Error::NotFound`] - a referenced reservation/cell/room is absent;
///   no mutation was attempted.
/// - [`Error::Consistency`] - a mutation touched fewer rows than the input
///   set size, or a selection spans rows outside the stated source. The
///   enclosing transaction is rolled back; nothing is partially applied.
/// - [`Error::ResourceUnavailable`] - no candidate resource could be
///   claimed; the caller may retry with different criteria.
/// - [`Error::Store`] - connectivity/transport failure from the store.
///   Safe to retry for pure reads; never automatically retried for a
///   mutating operation.
#[derive(Debug, Error)]
pub enum Error {
    /// A validation error occurred.
    #[error("validation error for '{field}': {message}")]
    Validation {
        /// The field that failed validation.
        field: String,
        /// A description of the validation failure.
        message: String,
    },

    /// The requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The resource that was not found.
        resource: String,
    },

    /// A multi-row mutation did not affect the expected number of rows,
    /// or a selection referenced rows outside the stated source.
    #[error("consistency violation: {details}")]
    Consistency {
        /// Details about the violation.
        details: String,
    },

    /// No resource candidate could be allocated or claimed.
    #[error("resource unavailable: {reason}")]
    ResourceUnavailable {
        /// The reason no resource is available.
        reason: String,
    },

    /// A database error occurred.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// A configuration error occurred.
    #[error("configuration error: {0}")]
    Configuration(#[from] serde_yaml::Error),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An unsupported schema version was encountered.
    #[error("unsupported schema version: expected {expected}, found {found}")]
    UnsupportedSchemaVersion {
        /// The expected schema version.
        expected: i32,
        /// The schema version found in the database.
        found: i32,
    },
}

impl Error {
    /// Builds a validation error for the given field.
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Builds a consistency error with the given details.
    pub(crate) fn consistency(details: impl Into<String>) -> Self {
        Self::Consistency {
            details: details.into(),
        }
    }

    /// Builds a not-found error for the given resource description.
    pub(crate) fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Check if the error indicates a missing resource.
    ///
    /// # Examples
    ///
    /// ```
    /// use staygrid::Error;
    ///
    /// let err = Error::NotFound { resource: "reservation 42".to_string() };
    /// assert!(err.is_not_found());
    /// ```
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if the error is a consistency violation.
    ///
    /// Consistency violations always mean the enclosing transaction was
    /// rolled back with nothing applied.
    ///
    /// # Examples
    ///
    /// ```
    /// use staygrid::Error;
    ///
    /// let err = Error::Consistency { details: "expected 3 rows, updated 2".to_string() };
    /// assert!(err.is_consistency());
    /// ```
    #[must_use]
    pub fn is_consistency(&self) -> bool {
        matches!(self, Self::Consistency { .. })
    }

    /// Check if the error is caller-correctable input validation.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if the error means no resource candidate was available.
    ///
    /// These failures performed no mutation; the caller may retry with
    /// different criteria.
    #[must_use]
    pub fn is_resource_unavailable(&self) -> bool {
        matches!(self, Self::ResourceUnavailable { .. })
    }
}

/// Returns true when a rusqlite error is a uniqueness/constraint conflict.
///
/// Used by the lock-skip allocation path: a constraint conflict on insert
/// means a competing transaction already claimed the row, and the candidate
/// should be skipped rather than treated as a failure.
pub(crate) fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
