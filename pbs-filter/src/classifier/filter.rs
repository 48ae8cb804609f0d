use tracing::{info, trace, warn};

use pbs_common::SimTime;
use pbs_wire::{FlowKey, Packet, PrioTag, PriorityLevel};

use super::{load_bucket_nanos, raw_score, ClassifierOptions};
use crate::{ConfigError, FilterStats, FlowRecord, ScoreSample, SwitchLoad, ThresholdTable};

/// The endpoint-side priority classifier.
///
/// Tracks every flow it sees, scores each data packet from the flow's age and bytes sent
/// (or remaining), bins the score into one of the priority levels and tags the packet with it.
/// One instance per observation point; instances never share state.
#[derive(Debug)]
pub struct Classifier {
    options: ClassifierOptions,
    thresholds: ThresholdTable,
    stats: FilterStats,
}

impl Classifier {
    /// Creates a classifier. Fails on invalid options, which callers should treat as fatal.
    pub fn new(options: ClassifierOptions) -> Result<Self, ConfigError> {
        options.validate()?;
        let bucket = load_bucket_nanos(options.load_bucket)?;
        let thresholds = options.threshold_table();

        info!(
            profile = %options.profile,
            mode = ?options.mode,
            alpha = options.alpha,
            pbs_enabled = options.pbs_enabled,
            "classifier ready"
        );

        Ok(Self { options, thresholds, stats: FilterStats::new(bucket) })
    }

    /// Classifies `packet`, seen at `now`: updates its flow, attaches the priority tag and
    /// returns the assigned level.
    ///
    /// Never fails. Packets without a flow and control packets get level 0 and leave every
    /// flow record untouched.
    pub fn classify<P: Packet + ?Sized>(&mut self, packet: &mut P, now: SimTime) -> PriorityLevel {
        let size = packet.size();
        self.stats.record_egress(size, now);

        let Some(key) = packet.flow_key() else {
            trace!(size, "no flow key, using level 0");
            return tag(packet, PriorityLevel::ZERO);
        };

        if self.is_control(packet) {
            trace!(flow = %key, "control packet, using level 0");
            return tag(packet, PriorityLevel::ZERO);
        }

        let record = self.stats.flow_mut(key);
        record.record_packet(size, now);

        let level = if self.options.pbs_enabled {
            let score = score_packet(&self.options, key, record, packet);
            if self.options.mode.is_blind() && record.is_first_packet() {
                // Nothing to go on yet.
                PriorityLevel::ZERO
            } else {
                self.thresholds.bin(score)
            }
        } else {
            PriorityLevel::ZERO
        };

        record.record_level(level, size);
        trace!(flow = %key, bytes = record.bytes_sent(), %level, "classified");

        tag(packet, level)
    }

    fn is_control<P: Packet + ?Sized>(&self, packet: &P) -> bool {
        if !self.options.control_gate {
            return false;
        }

        packet.transport().is_some_and(|header| {
            header.flags.is_handshake() ||
                self.options.control_ports.contains(&header.dst_port) ||
                self.options.control_ports.contains(&header.src_port)
        })
    }

    pub const fn options(&self) -> &ClassifierOptions {
        &self.options
    }

    /// The threshold table in use for this run.
    pub const fn thresholds(&self) -> &ThresholdTable {
        &self.thresholds
    }

    pub const fn stats(&self) -> &FilterStats {
        &self.stats
    }

    pub fn flow(&self, key: FlowKey) -> Option<&FlowRecord> {
        self.stats.flow(key)
    }

    /// All flows seen so far, ordered by key.
    pub fn flows(&self) -> Vec<(FlowKey, &FlowRecord)> {
        self.stats.flows()
    }

    pub const fn total_bytes(&self) -> u64 {
        self.stats.total_bytes()
    }

    pub const fn load(&self) -> &SwitchLoad {
        self.stats.load()
    }
}

/// Computes the raw score of the packet just accounted in `record` and appends it to the
/// flow's trace. In non-blind mode this is also where the flow's size is learned.
fn score_packet<P: Packet + ?Sized>(
    options: &ClassifierOptions,
    key: FlowKey,
    record: &mut FlowRecord,
    packet: &mut P,
) -> f64 {
    let work = if options.mode.is_blind() {
        record.bytes_sent()
    } else {
        if record.declared_size().is_none() {
            match packet.take_size_hint() {
                Some(hint) => record.set_declared_size(u64::from(hint.flow_size())),
                None if record.is_first_packet() => {
                    warn!(flow = %key, "no flow size hint on first packet, assuming a large flow");
                }
                None => {}
            }
        }
        record.remaining_bytes()
    };

    let age_nanos = record.age_nanos();
    let score = raw_score(age_nanos, work, options.alpha);
    record.push_score(ScoreSample { score, bytes_sent: record.bytes_sent(), age_nanos });

    score
}

#[inline]
fn tag<P: Packet + ?Sized>(packet: &mut P, level: PriorityLevel) -> PriorityLevel {
    packet.set_priority(PrioTag::new(level));
    level
}
