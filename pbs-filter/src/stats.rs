use std::collections::hash_map::Entry;

use rustc_hash::FxHashMap;

use pbs_common::SimTime;
use pbs_wire::FlowKey;

use crate::{FlowRecord, SwitchLoad};

/// Statistics owned by one observation point: its flow records, plus totals over every
/// packet it processed.
#[derive(Debug)]
pub struct FilterStats {
    flows: FxHashMap<FlowKey, FlowRecord>,
    total_bytes: u64,
    load: SwitchLoad,
}

impl FilterStats {
    pub(crate) fn new(load_bucket_nanos: u64) -> Self {
        Self {
            flows: FxHashMap::default(),
            total_bytes: 0,
            load: SwitchLoad::new(load_bucket_nanos),
        }
    }

    #[inline]
    pub(crate) fn record_egress(&mut self, bytes: u32, now: SimTime) {
        self.total_bytes += u64::from(bytes);
        self.load.record(now, bytes);
    }

    /// Returns the record for `key`, creating an empty one on first sight.
    #[inline]
    pub(crate) fn flow_mut(&mut self, key: FlowKey) -> &mut FlowRecord {
        match self.flows.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                tracing::debug!(flow = %key, "new flow");
                entry.insert(FlowRecord::new())
            }
        }
    }

    #[inline]
    pub fn flow(&self, key: FlowKey) -> Option<&FlowRecord> {
        self.flows.get(&key)
    }

    /// All flows, ordered by key.
    pub fn flows(&self) -> Vec<(FlowKey, &FlowRecord)> {
        let mut flows: Vec<_> = self.flows.iter().map(|(&key, record)| (key, record)).collect();
        flows.sort_unstable_by_key(|(key, _)| *key);
        flows
    }

    #[inline]
    pub fn num_flows(&self) -> usize {
        self.flows.len()
    }

    /// Bytes of every packet processed, including packets that belong to no flow.
    #[inline]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    #[inline]
    pub const fn load(&self) -> &SwitchLoad {
        &self.load
    }
}
