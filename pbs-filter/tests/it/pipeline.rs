use std::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};

use pbs_common::{constants::KiB, SimTime};
use pbs_filter::{
    report, Aggregator, AggregatorOptions, Classifier, ClassifierOptions, WorkloadProfile,
};
use pbs_wire::{FiveTuple, Packet, PriorityLevel, SimPacket, TcpFlags};

const MSS: u32 = 1460;

fn host(n: u8) -> IpAddr {
    IpAddr::V4(Ipv4Addr::new(10, 0, 0, n))
}

/// Two hosts each send one flow through an edge switch and a shared aggregation switch.
/// The hosts classify, the switches only account.
#[test]
fn switches_respect_and_measure_host_decisions() {
    let _ = tracing_subscriber::fmt::try_init();

    let options = ClassifierOptions::default().with_profile(WorkloadProfile::W4).with_alpha(10.0);
    let mut hosts = [Classifier::new(options.clone()).unwrap(), Classifier::new(options).unwrap()];
    let mut edge = Aggregator::new(AggregatorOptions::default()).unwrap();
    let mut agg = Aggregator::new(
        AggregatorOptions::default().with_load_bucket(Duration::from_micros(100)),
    )
    .unwrap();

    let flows =
        [FiveTuple::tcp(host(1), 49152, host(3), 9), FiveTuple::tcp(host(2), 49153, host(3), 9)];
    let sizes = [64 * KiB, 4 * KiB];

    let mut now = 0;
    for (i, tuple) in flows.iter().enumerate() {
        let mut syn = SimPacket::from_tuple(tuple, 40).with_flags(TcpFlags::SYN);
        hosts[i].classify(&mut syn, SimTime::from_nanos(now));
        agg.observe(&syn, SimTime::from_nanos(now));

        let mut sent = 0;
        while sent < sizes[i] {
            now += 1_200;
            let size = MSS.min(sizes[i] - sent);
            sent += size;

            let mut pkt = SimPacket::from_tuple(tuple, size);
            let at = SimTime::from_nanos(now);
            let level = hosts[i].classify(&mut pkt, at);

            if i == 0 {
                assert_eq!(edge.observe(&pkt, at), level);
            }
            assert_eq!(agg.observe(&pkt, at), level);
            assert_eq!(pkt.priority().map(|t| t.level()), Some(level));
        }
    }

    for (i, tuple) in flows.iter().enumerate() {
        let key = tuple.flow_key();
        let at_host = hosts[i].flow(key).unwrap();
        let at_agg = agg.flow(key).unwrap();

        assert_eq!(at_host.bytes_sent(), u64::from(sizes[i]));
        // The switch also saw the SYN, which the host kept out of its flow state.
        assert_eq!(at_agg.bytes_sent(), at_host.bytes_sent() + 40);
        assert_eq!(at_agg.bytes_by_level()[0], at_host.bytes_by_level()[0] + 40);
        assert_eq!(&at_agg.bytes_by_level()[1..], &at_host.bytes_by_level()[1..]);
    }

    assert_eq!(edge.stats().num_flows(), 1);
    assert_eq!(agg.total_bytes(), u64::from(sizes[0] + sizes[1]) + 80);
    assert_eq!(agg.load().total(), agg.total_bytes());
    assert!(agg.load().iter().all(|(bucket, _)| bucket % 100_000 == 0));
    assert_eq!(agg.flow_rates().len(), 2);

    // Past its first packet, the long flow is scored off the floor.
    let long = hosts[0].flow(flows[0].flow_key()).unwrap();
    assert!(long.packets_by_level()[1..].iter().any(|&n| n > 0));

    let mut csv = Vec::new();
    report::write_flow_categories(agg.stats(), &mut csv).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 3);
}

#[test]
fn untagged_traffic_is_accounted_at_floor() {
    let mut agg = Aggregator::new(AggregatorOptions::default()).unwrap();
    let tuple = FiveTuple::tcp(host(1), 5000, host(2), 80);

    for i in 0..4 {
        let level = agg.observe(&SimPacket::from_tuple(&tuple, MSS), SimTime::from_nanos(i * 10));
        assert_eq!(level, PriorityLevel::ZERO);
    }

    let record = agg.flow(tuple.flow_key()).unwrap();
    assert_eq!(record.bytes_by_level()[0], 4 * u64::from(MSS));
    assert_eq!(record.age_nanos(), 30);
}
