use tracing::trace;

use pbs_common::SimTime;
use pbs_wire::{FlowKey, Packet, PriorityLevel};

use super::AggregatorOptions;
use crate::{ConfigError, FilterStats, FlowRecord, SwitchLoad};

/// The switch-side aggregator.
///
/// Never scores anything: it trusts the priority tag attached upstream, and records per-flow
/// and switch-wide statistics for every packet crossing it.
#[derive(Debug)]
pub struct Aggregator {
    options: AggregatorOptions,
    stats: FilterStats,
}

impl Aggregator {
    pub fn new(options: AggregatorOptions) -> Result<Self, ConfigError> {
        let bucket = options.validate()?;
        Ok(Self { options, stats: FilterStats::new(bucket) })
    }

    /// Accounts `packet`, seen at `now`, and returns the level it carries (level 0 if it carries
    /// none). The packet's tag is left as is.
    pub fn observe<P: Packet + ?Sized>(&mut self, packet: &P, now: SimTime) -> PriorityLevel {
        let size = packet.size();
        self.stats.record_egress(size, now);

        let level = packet.priority().map_or(PriorityLevel::ZERO, |tag| tag.level());

        if let Some(key) = packet.flow_key() {
            let record = self.stats.flow_mut(key);
            record.record_packet(size, now);
            record.record_level(level, size);
            trace!(flow = %key, %level, "observed");
        }

        level
    }

    pub const fn options(&self) -> &AggregatorOptions {
        &self.options
    }

    pub const fn stats(&self) -> &FilterStats {
        &self.stats
    }

    pub fn flow(&self, key: FlowKey) -> Option<&FlowRecord> {
        self.stats.flow(key)
    }

    /// All flows that crossed this switch, ordered by key.
    pub fn flows(&self) -> Vec<(FlowKey, &FlowRecord)> {
        self.stats.flows()
    }

    pub const fn total_bytes(&self) -> u64 {
        self.stats.total_bytes()
    }

    pub const fn load(&self) -> &SwitchLoad {
        self.stats.load()
    }

    /// Average rate of every flow with a non-zero age, in bits per nanosecond, ordered by key.
    pub fn flow_rates(&self) -> Vec<f64> {
        self.stats
            .flows()
            .into_iter()
            .filter_map(|(_, record)| record.rate_bits_per_nanos())
            .collect()
    }
}
