use std::time::Duration;

use crate::{classifier::load_bucket_nanos, ConfigError};

mod filter;
pub use filter::*;

/// Options for an [`Aggregator`].
#[derive(Debug, Clone)]
pub struct AggregatorOptions {
    /// Width of the time buckets of the load series.
    pub load_bucket: Duration,
}

impl Default for AggregatorOptions {
    fn default() -> Self {
        Self { load_bucket: Duration::from_nanos(1) }
    }
}

impl AggregatorOptions {
    /// Sets the width of the load series buckets.
    pub fn with_load_bucket(mut self, bucket: Duration) -> Self {
        self.load_bucket = bucket;
        self
    }

    pub(crate) fn validate(&self) -> Result<u64, ConfigError> {
        load_bucket_nanos(self.load_bucket)
    }
}
