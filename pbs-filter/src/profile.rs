use std::{fmt, str::FromStr};

use pbs_common::NUM_LEVELS;
use pbs_wire::PriorityLevel;

use crate::ConfigError;

/// How a classifier scores a flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScoringMode {
    /// Score against bytes already sent. Flow sizes are never known.
    #[default]
    Blind,
    /// Score against bytes remaining, learned from the flow's first size hint.
    NonBlind,
}

impl ScoringMode {
    /// Whether flow sizes are unknown to the classifier.
    pub const fn is_blind(self) -> bool {
        matches!(self, Self::Blind)
    }
}

/// The workload a run is tuned for. Each profile selects its own threshold tables.
///
/// W1 to W5 are the production flow-size distributions; `Incast` and `Background` are the
/// synthetic workloads used for incast and background-traffic experiments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WorkloadProfile {
    #[default]
    W1,
    W2,
    W3,
    W4,
    W5,
    Incast,
    Background,
}

impl WorkloadProfile {
    pub const ALL: [Self; 7] =
        [Self::W1, Self::W2, Self::W3, Self::W4, Self::W5, Self::Incast, Self::Background];

    /// The numeric id of the profile, as used on command lines and in result file names.
    pub const fn id(self) -> u32 {
        match self {
            Self::W1 => 1,
            Self::W2 => 2,
            Self::W3 => 3,
            Self::W4 => 4,
            Self::W5 => 5,
            Self::Incast => 6,
            Self::Background => 7,
        }
    }

    /// The lowercase name of the profile, as accepted by [`FromStr`].
    pub const fn name(self) -> &'static str {
        match self {
            Self::W1 => "w1",
            Self::W2 => "w2",
            Self::W3 => "w3",
            Self::W4 => "w4",
            Self::W5 => "w5",
            Self::Incast => "incast",
            Self::Background => "background",
        }
    }

    /// The raw limits for this profile, tuned for alpha = 10.
    ///
    /// The synthetic profiles have no non-blind tuning and use the same limits in both modes.
    const fn limits(self, mode: ScoringMode) -> [f64; NUM_LEVELS] {
        match (self, mode) {
            (Self::W1, ScoringMode::Blind) => {
                [2.5e-19, 1e-21, 4.4e-24, 1.9e-26, 7.8e-29, 3.3e-31, 1.4e-33, 5.8e-36]
            }
            (Self::W1, ScoringMode::NonBlind) => {
                [1.64e-08, 3.15e-19, 6.08e-30, 1.17e-40, 2.26e-51, 4.37e-62, 8.42e-72, 1.62e-83]
            }
            (Self::W2, ScoringMode::Blind) => {
                [6.1e-20, 1.5e-23, 3.6e-27, 8.7e-31, 2.1e-34, 5.1e-38, 1.2e-41, 2.9e-45]
            }
            (Self::W2, ScoringMode::NonBlind) => {
                [3.7e-07, 4.8e-18, 6.3e-29, 8.24e-40, 1.07e-50, 1.41e-61, 1.84e-72, 3.13e-94]
            }
            (Self::W3, ScoringMode::Blind) => {
                [5.8e-21, 7.3e-26, 9e-31, 1.1e-35, 1.3e-40, 1.6e-45, 2e-50, 2.5e-55]
            }
            (Self::W3, ScoringMode::NonBlind) => {
                [4.08e-06, 3.95e-17, 3.82e-28, 3.69e-39, 3.58e-50, 3.45e-61, 3.34e-72, 3.24e-82]
            }
            (Self::W4, ScoringMode::Blind) | (Self::Incast, _) => {
                [2.6e-21, 1.2e-26, 5.3e-32, 2.4e-37, 1.1e-42, 4.9e-48, 2.2e-53, 1e-58]
            }
            (Self::W4, ScoringMode::NonBlind) => {
                [1.62e-05, 1.32e-16, 1.07e-27, 8.76e-39, 7.13e-50, 5.8e-61, 4.72e-72, 3.84e-83]
            }
            (Self::W5, ScoringMode::Blind) | (Self::Background, _) => {
                [1.2e-21, 2.7e-27, 6e-33, 1.3e-38, 3e-44, 6.5e-50, 1.4e-55, 3.2e-61]
            }
            (Self::W5, ScoringMode::NonBlind) => {
                [4.71e-05, 3.94e-16, 3.3e-27, 2.76e-38, 2.31e-49, 1.94e-60, 1.62e-71, 1.36e-82]
            }
        }
    }

    /// Returns the threshold table for this profile in the given mode.
    pub const fn thresholds(self, mode: ScoringMode) -> ThresholdTable {
        ThresholdTable { limits: self.limits(mode) }
    }
}

impl TryFrom<u32> for WorkloadProfile {
    type Error = ConfigError;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::ALL.into_iter().find(|p| p.id() == id).ok_or(ConfigError::UnknownProfile(id))
    }
}

impl FromStr for WorkloadProfile {
    type Err = ConfigError;

    /// Accepts either the numeric id (`"3"`) or the name (`"w3"`, `"incast"`), case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(id) = s.parse::<u32>() {
            return Self::try_from(id);
        }

        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::UnknownProfileName(s.to_owned()))
    }
}

impl fmt::Display for WorkloadProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The score limits separating the priority levels, indexed by level.
///
/// Limits are non-increasing with the level: a packet is placed in the highest level whose
/// limit is at least its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdTable {
    limits: [f64; NUM_LEVELS],
}

impl ThresholdTable {
    /// Builds a custom table, checking that the limits never increase with the level.
    #[allow(clippy::neg_cmp_op_on_partial_ord)]
    pub fn new(limits: [f64; NUM_LEVELS]) -> Result<Self, ConfigError> {
        for level in 1..NUM_LEVELS {
            // Also rejects NaN limits.
            if !(limits[level] <= limits[level - 1]) {
                return Err(ConfigError::NonMonotonicThresholds { level });
            }
        }

        Ok(Self { limits })
    }

    #[inline]
    pub const fn limits(&self) -> &[f64; NUM_LEVELS] {
        &self.limits
    }

    #[inline]
    pub const fn limit(&self, level: PriorityLevel) -> f64 {
        self.limits[level.index()]
    }

    /// Bins a raw score: scans from the top level down and returns the first level whose limit
    /// is at least `score`.
    ///
    /// Scores above every limit (and NaN) fall to level 0, the same level that holds scores
    /// just under `limits[0]`. The two cases are indistinguishable in the result.
    #[inline]
    pub fn bin(&self, score: f64) -> PriorityLevel {
        PriorityLevel::all()
            .rev()
            .find(|level| score <= self.limits[level.index()])
            .unwrap_or(PriorityLevel::ZERO)
    }
}
