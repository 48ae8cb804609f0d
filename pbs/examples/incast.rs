//! Replays a small incast through host classifiers and one switch aggregator, then dumps the
//! switch's flow categories and egress load to stdout.
//!
//! Usage: `cargo run --example incast -- [profile] [alpha]`

use std::{
    io,
    net::{IpAddr, Ipv4Addr},
};

use pbs::{
    report, Aggregator, AggregatorOptions, Classifier, ClassifierOptions, FiveTuple, Packet,
    SimPacket, SimTime, TcpFlags, WorkloadProfile,
};
use tracing::info;

const SENDERS: u8 = 8;
const MSS: u32 = 1460;
const RESPONSE_SIZE: u32 = 32 * 1024;
/// Serialization delay of one MSS on a 10 Gbit/s link.
const MSS_TIME_NS: u64 = 1_168;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = tracing_subscriber::fmt::try_init();

    let mut args = std::env::args().skip(1);
    let profile: WorkloadProfile = args.next().as_deref().unwrap_or("incast").parse()?;
    let alpha: f64 = args.next().as_deref().unwrap_or("10").parse()?;

    let options = ClassifierOptions::default().with_profile(profile).with_alpha(alpha);
    let mut hosts = (0..SENDERS)
        .map(|_| Classifier::new(options.clone()))
        .collect::<Result<Vec<_>, _>>()?;
    let mut switch = Aggregator::new(AggregatorOptions::default())?;

    let receiver = IpAddr::V4(Ipv4Addr::new(10, 0, 1, 1));
    let flows: Vec<_> = (0..SENDERS)
        .map(|i| FiveTuple::tcp(IpAddr::V4(Ipv4Addr::new(10, 0, 0, i + 1)), 50_000, receiver, 9))
        .collect();

    // All senders answer at once; the switch sees their packets interleaved.
    for (i, tuple) in flows.iter().enumerate() {
        let now = SimTime::from_nanos(i as u64);
        let mut syn = SimPacket::from_tuple(tuple, 40).with_flags(TcpFlags::SYN);
        hosts[i].classify(&mut syn, now);
        switch.observe(&syn, now);
    }

    let mut sent = vec![0u32; flows.len()];
    let mut round = 1;
    while sent.iter().any(|&s| s < RESPONSE_SIZE) {
        for (i, tuple) in flows.iter().enumerate() {
            if sent[i] >= RESPONSE_SIZE {
                continue;
            }

            let size = MSS.min(RESPONSE_SIZE - sent[i]);
            sent[i] += size;

            let now = SimTime::from_nanos(round * MSS_TIME_NS * u64::from(SENDERS) + i as u64);
            let mut pkt = SimPacket::from_tuple(tuple, size);
            hosts[i].classify(&mut pkt, now);
            switch.observe(&pkt, now);
            debug_assert!(pkt.priority().is_some());
        }
        round += 1;
    }

    info!(
        flows = switch.stats().num_flows(),
        bytes = switch.total_bytes(),
        %profile,
        alpha,
        "incast replayed"
    );

    let mut stdout = io::stdout().lock();
    report::write_flow_categories(switch.stats(), &mut stdout)?;
    report::write_egress_load(switch.load(), &mut stdout)?;
    report::write_classifier_stats(&hosts[0], &mut stdout)?;

    Ok(())
}
