use std::{fmt, ops::Sub, time::Duration};

/// A point on the simulation's logical clock, in nanoseconds since the start of the run.
///
/// This is never wall-clock time. Callers are expected to hand successive calls on the same
/// observer non-decreasing values; differences that would go negative saturate to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimTime(u64);

impl SimTime {
    /// The start of the simulation.
    pub const ZERO: Self = Self(0);

    #[inline]
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    #[inline]
    pub const fn from_micros(micros: u64) -> Self {
        Self(micros.saturating_mul(1_000))
    }

    #[inline]
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Returns the time elapsed since `earlier`, or [`Duration::ZERO`] if `earlier` is later
    /// than `self`.
    #[inline]
    pub fn saturating_duration_since(self, earlier: Self) -> Duration {
        Duration::from_nanos(self.0.saturating_sub(earlier.0))
    }

    /// Rounds down to the start of the bucket of width `bucket_nanos` containing this instant.
    #[inline]
    pub const fn bucket(self, bucket_nanos: u64) -> u64 {
        self.0 - self.0 % bucket_nanos
    }
}

impl From<Duration> for SimTime {
    fn from(elapsed: Duration) -> Self {
        Self(u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX))
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.saturating_duration_since(rhs)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ns", self.0)
    }
}
