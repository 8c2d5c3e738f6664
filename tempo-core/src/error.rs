//! Error types for tempo.

use thiserror::Error;

/// Errors returned when constructing or reconfiguring a driver.
///
/// Normal operation never produces errors: a host without timing facilities
/// simply never fires, and numeric edge cases settle deterministically.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// An option value is outside its allowed range.
    #[error("invalid `{field}`: {reason}")]
    InvalidConfig {
        /// Name of the offending option.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// A vector value changed length over a driver's lifetime.
    #[error("value length mismatch: expected {expected} components, found {found}")]
    LengthMismatch {
        /// Component count fixed at creation.
        expected: usize,
        /// Component count of the rejected value.
        found: usize,
    },

    /// The scope a driver was created in has already been disposed.
    #[error("scope has been disposed")]
    ScopeDisposed,
}

/// Result type for tempo operations.
pub type Result<T> = std::result::Result<T, Error>;
