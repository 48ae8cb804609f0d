use std::time::Duration;

use pbs_common::{SimTime, NUM_LEVELS};
use pbs_wire::PriorityLevel;

/// Declared size assumed for a flow whose size hint was never seen, in bytes.
///
/// Large enough that such flows always look like they have plenty of work remaining.
pub const UNKNOWN_FLOW_SIZE: u64 = 20_000_000;

/// One entry of a flow's raw score trace.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreSample {
    /// The raw score computed for the packet.
    pub score: f64,
    /// Cumulative bytes of the flow, including the packet.
    pub bytes_sent: u64,
    /// Age of the flow when the packet was seen.
    pub age_nanos: u64,
}

/// Running state of one flow, as seen from a single observation point.
#[derive(Debug, Clone)]
pub struct FlowRecord {
    bytes_sent: u64,
    packets_sent: u32,
    first_seen_at: SimTime,
    last_seen_at: SimTime,
    is_first_packet: bool,
    declared_size: Option<u64>,
    bytes_by_level: [u64; NUM_LEVELS],
    packets_by_level: [u32; NUM_LEVELS],
    score_trace: Vec<ScoreSample>,
}

impl Default for FlowRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl FlowRecord {
    pub const fn new() -> Self {
        Self {
            bytes_sent: 0,
            packets_sent: 0,
            first_seen_at: SimTime::ZERO,
            last_seen_at: SimTime::ZERO,
            is_first_packet: true,
            declared_size: None,
            bytes_by_level: [0; NUM_LEVELS],
            packets_by_level: [0; NUM_LEVELS],
            score_trace: Vec::new(),
        }
    }

    /// Accounts a packet of `size` bytes seen at `now`. Must be followed by
    /// [`Self::record_level`] for the same packet.
    pub(crate) fn record_packet(&mut self, size: u32, now: SimTime) {
        if self.is_first_packet {
            self.first_seen_at = now;
        } else if now < self.last_seen_at {
            tracing::warn!(%now, last = %self.last_seen_at, "clock moved backwards");
        }

        self.bytes_sent += u64::from(size);
        self.packets_sent += 1;
        self.last_seen_at = now;
    }

    /// Books the packet into the histogram of the level it was assigned, and closes out the
    /// flow's first packet.
    pub(crate) fn record_level(&mut self, level: PriorityLevel, size: u32) {
        self.bytes_by_level[level.index()] += u64::from(size);
        self.packets_by_level[level.index()] += 1;
        self.is_first_packet = false;
    }

    pub(crate) fn push_score(&mut self, sample: ScoreSample) {
        self.score_trace.push(sample);
    }

    pub(crate) fn set_declared_size(&mut self, size: u64) {
        self.declared_size = Some(size);
    }

    #[inline]
    pub const fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    #[inline]
    pub const fn packets_sent(&self) -> u32 {
        self.packets_sent
    }

    #[inline]
    pub const fn first_seen_at(&self) -> SimTime {
        self.first_seen_at
    }

    #[inline]
    pub const fn last_seen_at(&self) -> SimTime {
        self.last_seen_at
    }

    /// Time between the first and the latest packet. Zero on the first packet.
    #[inline]
    pub fn age(&self) -> Duration {
        self.last_seen_at - self.first_seen_at
    }

    #[inline]
    pub fn age_nanos(&self) -> u64 {
        u64::try_from(self.age().as_nanos()).unwrap_or(u64::MAX)
    }

    /// Whether the packet currently being processed is the flow's first one.
    #[inline]
    pub const fn is_first_packet(&self) -> bool {
        self.is_first_packet
    }

    /// The flow size learned from a size hint, if any.
    #[inline]
    pub const fn declared_size(&self) -> Option<u64> {
        self.declared_size
    }

    /// Bytes left to send, assuming [`UNKNOWN_FLOW_SIZE`] when no size was declared. Never zero.
    #[inline]
    pub fn remaining_bytes(&self) -> u64 {
        self.declared_size.unwrap_or(UNKNOWN_FLOW_SIZE).saturating_sub(self.bytes_sent).max(1)
    }

    #[inline]
    pub const fn bytes_by_level(&self) -> &[u64; NUM_LEVELS] {
        &self.bytes_by_level
    }

    #[inline]
    pub const fn packets_by_level(&self) -> &[u32; NUM_LEVELS] {
        &self.packets_by_level
    }

    /// Every score computed for this flow, in packet order. Empty when scoring is disabled.
    #[inline]
    pub fn score_trace(&self) -> &[ScoreSample] {
        &self.score_trace
    }

    /// Share of the flow's bytes that went into `level`.
    pub fn byte_share(&self, level: PriorityLevel) -> f64 {
        pbs_common::ratio(self.bytes_by_level[level.index()], self.bytes_sent)
    }

    /// Average rate of the flow in bits per nanosecond, or `None` while its age is zero.
    pub fn rate_bits_per_nanos(&self) -> Option<f64> {
        let age = self.age_nanos();
        (age != 0).then(|| self.bytes_sent as f64 * 8.0 / age as f64)
    }
}
