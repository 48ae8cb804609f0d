use thiserror::Error;

/// A misconfiguration detected while building a classifier or aggregator.
///
/// These are never recoverable at runtime: a wrong threshold table would silently corrupt
/// every classification, so callers should abort startup instead of falling back.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A numeric profile id outside 1..=7.
    #[error("Unknown workload profile: {0}")]
    UnknownProfile(u32),
    /// A profile name that matches no profile.
    #[error("Unknown workload profile name: {0:?}")]
    UnknownProfileName(String),
    /// A scoring exponent that is NaN, infinite or negative.
    #[error("Invalid alpha: {0} (must be finite and non-negative)")]
    InvalidAlpha(f64),
    /// A load bucket width under one nanosecond.
    #[error("Load bucket width must be non-zero")]
    InvalidLoadBucket,
    /// A threshold table whose limit at `level` exceeds the limit of the level below.
    #[error("Threshold at level {level} is larger than the one below it")]
    NonMonotonicThresholds { level: usize },
}
