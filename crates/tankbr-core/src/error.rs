//! Error types for the simulation core.

use thiserror::Error;

/// A match constant that cannot produce a well-formed battle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count or duration that must be at least one is zero.
    #[error("`{field}` must be at least 1")]
    Zero {
        /// Offending field name.
        field: &'static str,
    },

    /// A length or speed that must be strictly positive is not.
    #[error("`{field}` must be positive, got {value}")]
    NonPositive {
        /// Offending field name.
        field: &'static str,
        /// Supplied value.
        value: f64,
    },

    /// A numeric field is NaN or infinite.
    #[error("`{field}` must be finite")]
    NotFinite {
        /// Offending field name.
        field: &'static str,
    },
}
