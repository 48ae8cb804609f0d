use std::time::Duration;

use crate::{ConfigError, ScoringMode, ThresholdTable, WorkloadProfile};

mod filter;
pub use filter::*;

/// The default scoring exponent.
pub const DEFAULT_ALPHA: f64 = 0.001;

/// Computes the raw score of a packet: the flow's age weighed against `work` bytes (sent so
/// far in blind mode, remaining in non-blind mode). A `work` of zero counts as one byte.
#[inline]
pub fn raw_score(age_nanos: u64, work: u64, alpha: f64) -> f64 {
    age_nanos as f64 / (work.max(1) as f64).powf(alpha)
}

/// Options for a [`Classifier`].
#[derive(Debug, Clone)]
pub struct ClassifierOptions {
    /// The scoring exponent.
    pub alpha: f64,
    /// The workload profile selecting the threshold table.
    pub profile: WorkloadProfile,
    /// Overrides the profile's threshold table when set.
    pub thresholds: Option<ThresholdTable>,
    /// When `false`, every packet goes to level 0 and no scores are computed.
    pub pbs_enabled: bool,
    /// Whether flow sizes are known up front.
    pub mode: ScoringMode,
    /// Sends connection setup/teardown packets and packets on `control_ports` straight to
    /// level 0 without touching any flow state.
    pub control_gate: bool,
    /// Ports whose traffic counts as control traffic, in either direction.
    pub control_ports: Vec<u16>,
    /// Width of the time buckets of the load series.
    pub load_bucket: Duration,
}

impl Default for ClassifierOptions {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            profile: WorkloadProfile::default(),
            thresholds: None,
            pbs_enabled: true,
            mode: ScoringMode::Blind,
            control_gate: true,
            control_ports: Vec::new(),
            load_bucket: Duration::from_nanos(1),
        }
    }
}

impl ClassifierOptions {
    /// Sets the scoring exponent.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets the workload profile.
    pub fn with_profile(mut self, profile: WorkloadProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Uses a custom threshold table instead of the profile's.
    pub fn with_thresholds(mut self, thresholds: ThresholdTable) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Enables or disables priority scoring altogether.
    pub fn with_pbs(mut self, enabled: bool) -> Self {
        self.pbs_enabled = enabled;
        self
    }

    /// Sets the scoring mode.
    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    /// Shorthand for [`Self::with_mode`] with [`ScoringMode::NonBlind`].
    pub fn non_blind(self) -> Self {
        self.with_mode(ScoringMode::NonBlind)
    }

    /// Enables or disables the control packet gate.
    pub fn with_control_gate(mut self, enabled: bool) -> Self {
        self.control_gate = enabled;
        self
    }

    /// Adds a port whose traffic is treated as control traffic.
    pub fn with_control_port(mut self, port: u16) -> Self {
        self.control_ports.push(port);
        self
    }

    /// Sets the width of the load series buckets.
    pub fn with_load_bucket(mut self, bucket: Duration) -> Self {
        self.load_bucket = bucket;
        self
    }

    /// The threshold table these options resolve to.
    pub fn threshold_table(&self) -> ThresholdTable {
        self.thresholds.unwrap_or_else(|| self.profile.thresholds(self.mode))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if !self.alpha.is_finite() || self.alpha < 0.0 {
            return Err(ConfigError::InvalidAlpha(self.alpha));
        }

        load_bucket_nanos(self.load_bucket)?;
        Ok(())
    }
}

/// Converts a bucket width to whole nanoseconds, rejecting widths under one nanosecond.
pub(crate) fn load_bucket_nanos(bucket: Duration) -> Result<u64, ConfigError> {
    match bucket.as_nanos() {
        0 => Err(ConfigError::InvalidLoadBucket),
        nanos => Ok(u64::try_from(nanos).unwrap_or(u64::MAX)),
    }
}
