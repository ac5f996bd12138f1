//! Error types for Rankset
//!
//! The engine distinguishes expected "absent" outcomes from genuine failures.
//! Removing a missing element, ranging past the end of the set, or asking for
//! an out-of-range rank are normal results and are reported as `false`,
//! `None`, or an empty vector, never through this module.
//!
//! The only hard failure is an invariant violation between the score index
//! and the skip list, which should be unreachable through the `SortedSet`
//! facade.

use crate::storage::ElementId;

/// Main error type for Rankset operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The score index and the skip list disagree on membership.
    ///
    /// Raised when the index reports an element as present but the skip list
    /// has no node under the recorded `(score, element)` key. The failing
    /// operation is aborted before any partial mutation, leaving both
    /// structures as they were.
    #[error("score index and skip list disagree on membership of element {element}")]
    InvariantViolation {
        /// The element whose membership is in dispute
        element: ElementId,
    },
}

/// Type alias for Results throughout Rankset
pub type Result<T> = std::result::Result<T, EngineError>;
