//! Plain-text and CSV dumps of classifier and aggregator state.
//!
//! All writers are read-only over the observers and emit flows in key order, so two identical
//! runs produce identical files.

use std::io::{self, Write};

use pbs_wire::PriorityLevel;

use crate::{Aggregator, Classifier, FilterStats, FlowRecord, SwitchLoad};

const RULE: &str =
    "================================================================================";

/// Writes a human-readable summary of a classifier: its settings, then every flow with its
/// byte share per level and full score trace.
pub fn write_classifier_stats(classifier: &Classifier, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Alpha: {}", classifier.options().alpha)?;
    writeln!(out, "Total Bytes: {}\n", classifier.total_bytes())?;

    let limits = classifier.thresholds().limits();
    for (key, record) in classifier.flows() {
        write_flow_header(out, key, record)?;

        write!(out, "Priority Limits: ")?;
        for limit in limits {
            write!(out, "{limit:e}, ")?;
        }
        writeln!(out)?;

        write_byte_shares(out, record)?;

        writeln!(out, "Raw Priority History: ")?;
        for sample in record.score_trace() {
            writeln!(out, "{:e},{},{}", sample.score, sample.bytes_sent, sample.age_nanos)?;
        }
        writeln!(out, "\n")?;
    }

    out.flush()
}

/// Writes a human-readable summary of an aggregator: switch total, then every flow with its
/// byte share per level.
pub fn write_aggregator_stats(aggregator: &Aggregator, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{RULE}")?;
    writeln!(out, "Total Bytes: {}\n", aggregator.total_bytes())?;

    for (key, record) in aggregator.flows() {
        write_flow_header(out, key, record)?;
        write_byte_shares(out, record)?;
    }

    out.flush()
}

fn write_flow_header(
    out: &mut impl Write,
    key: pbs_wire::FlowKey,
    record: &FlowRecord,
) -> io::Result<()> {
    writeln!(
        out,
        "FlowID: {key},\tPackets Sent: {},\tBytes Sent: {},\tFlow Age: {} ns",
        record.packets_sent(),
        record.bytes_sent(),
        record.age_nanos()
    )
}

fn write_byte_shares(out: &mut impl Write, record: &FlowRecord) -> io::Result<()> {
    writeln!(out, "Priority History: ")?;
    for level in PriorityLevel::all() {
        writeln!(out, "Priority: {level}, %-txBytes: {}", record.byte_share(level))?;
    }
    writeln!(out)
}

/// One row per flow: `flow,bytes_at_level_0,...,bytes_at_level_7,`.
pub fn write_byte_histograms(stats: &FilterStats, out: &mut impl Write) -> io::Result<()> {
    for (key, record) in stats.flows() {
        write!(out, "{key},")?;
        for bytes in record.bytes_by_level() {
            write!(out, "{bytes},")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One row per flow: `flow,packets_at_level_0,...,packets_at_level_7,`.
pub fn write_packet_histograms(stats: &FilterStats, out: &mut impl Write) -> io::Result<()> {
    for (key, record) in stats.flows() {
        write!(out, "{key},")?;
        for packets in record.packets_by_level() {
            write!(out, "{packets},")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// One row per flow: the flow key followed by a `score,bytes,age,` triple per packet.
pub fn write_score_traces(stats: &FilterStats, out: &mut impl Write) -> io::Result<()> {
    for (key, record) in stats.flows() {
        write!(out, "{key},")?;
        for sample in record.score_trace() {
            write!(out, "{:e},{},{},", sample.score, sample.bytes_sent, sample.age_nanos)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Header line plus one `flow_id,total_bytes,p0_bytes,...,p7_bytes,` row per flow.
pub fn write_flow_categories(stats: &FilterStats, out: &mut impl Write) -> io::Result<()> {
    write!(out, "flow_id,total_bytes,")?;
    for level in PriorityLevel::all() {
        write!(out, "p{level}_bytes,")?;
    }
    writeln!(out)?;

    for (key, record) in stats.flows() {
        write!(out, "{key},{},", record.bytes_sent())?;
        for bytes in record.bytes_by_level() {
            write!(out, "{bytes},")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Header line plus one `bucket_start_ns,bytes` row per load bucket, in time order.
pub fn write_egress_load(load: &SwitchLoad, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "#<Time Bucket>,<Bytes>")?;
    for (bucket, bytes) in load.iter() {
        writeln!(out, "{bucket},{bytes}")?;
    }
    Ok(())
}
