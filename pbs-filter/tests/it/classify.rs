use std::collections::{HashMap, HashSet};

use pbs_common::SimTime;
use pbs_filter::{Classifier, ClassifierOptions, ScoringMode, WorkloadProfile};
use pbs_wire::{FlowKey, Packet, PriorityLevel, SimPacket, TcpFlags};
use rand::{rngs::StdRng, Rng, SeedableRng};

/// A seeded, time-ordered mix of data packets over a handful of flows, with the occasional
/// handshake packet, size hint and malformed packet sprinkled in.
fn random_trace(seed: u64, len: usize) -> Vec<(SimTime, SimPacket)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut now = 0u64;

    (0..len)
        .map(|_| {
            now += rng.gen_range(0..50_000);
            let flow = FlowKey::new(rng.gen_range(0..16));
            let size = rng.gen_range(40..=1500);

            let pkt = match rng.gen_range(0..100) {
                0..=2 => SimPacket::new(flow, 40).with_flags(TcpFlags::SYN),
                3 => SimPacket::malformed(size),
                4..=9 => {
                    SimPacket::new(flow, size).with_size_hint(rng.gen_range(1_000..2_000_000))
                }
                _ => SimPacket::new(flow, size),
            };
            (SimTime::from_nanos(now), pkt)
        })
        .collect()
}

fn run(
    options: ClassifierOptions,
    trace: &[(SimTime, SimPacket)],
) -> (Classifier, Vec<PriorityLevel>) {
    let mut classifier = Classifier::new(options).unwrap();
    let levels = trace
        .iter()
        .map(|(now, pkt)| classifier.classify(&mut pkt.clone(), *now))
        .collect();
    (classifier, levels)
}

#[test]
fn histograms_track_totals_after_every_packet() {
    let _ = tracing_subscriber::fmt::try_init();

    for mode in [ScoringMode::Blind, ScoringMode::NonBlind] {
        let options = ClassifierOptions::default()
            .with_profile(WorkloadProfile::W3)
            .with_alpha(10.0)
            .with_mode(mode);
        let mut classifier = Classifier::new(options).unwrap();
        let mut previous: HashMap<FlowKey, (u64, [u64; 8])> = HashMap::new();

        for (now, mut pkt) in random_trace(7, 2_000) {
            classifier.classify(&mut pkt, now);

            let Some(key) = pkt.flow_key() else { continue };
            let Some(record) = classifier.flow(key) else { continue };

            assert_eq!(record.bytes_by_level().iter().sum::<u64>(), record.bytes_sent());
            assert_eq!(record.packets_by_level().iter().sum::<u32>(), record.packets_sent());

            let (bytes, hist) = previous.entry(key).or_insert((0, [0; 8]));
            assert!(record.bytes_sent() >= *bytes);
            for (after, before) in record.bytes_by_level().iter().zip(hist.iter()) {
                assert!(after >= before);
            }
            *bytes = record.bytes_sent();
            *hist = *record.bytes_by_level();
        }
    }
}

#[test]
fn levels_match_threshold_scan() {
    let options = ClassifierOptions::default().with_profile(WorkloadProfile::W1).with_alpha(10.0);
    let trace = random_trace(11, 1_000);
    let mut classifier = Classifier::new(options).unwrap();
    let mut seen = HashSet::new();

    for (now, mut pkt) in trace {
        let is_data = pkt.transport().is_none();
        let level = classifier.classify(&mut pkt, now);

        let Some(key) = pkt.flow_key().filter(|_| is_data) else {
            assert_eq!(level, PriorityLevel::ZERO);
            continue;
        };

        let record = classifier.flow(key).unwrap();
        let first = seen.insert(key);
        let score = record.score_trace().last().unwrap().score;

        if first {
            assert_eq!(level, PriorityLevel::ZERO);
        } else {
            let limits = classifier.thresholds().limits();
            let expected = (0..8).rev().find(|&l| score <= limits[l]).unwrap_or(0);
            assert_eq!(level.index(), expected);
        }
    }
}

#[test]
fn disabled_pbs_puts_everything_on_the_floor() {
    for profile in WorkloadProfile::ALL {
        for alpha in [0.001, 1.0, 10.0] {
            let options = ClassifierOptions::default()
                .with_profile(profile)
                .with_alpha(alpha)
                .with_pbs(false);
            let (classifier, levels) = run(options, &random_trace(3, 300));

            assert!(levels.iter().all(|level| *level == PriorityLevel::ZERO));
            for (_, record) in classifier.flows() {
                assert!(record.score_trace().is_empty());
                assert_eq!(record.packets_by_level()[0], record.packets_sent());
            }
        }
    }
}

#[test]
fn handshakes_never_touch_counters() {
    let mut classifier = Classifier::new(ClassifierOptions::default().with_alpha(10.0)).unwrap();
    let flow = FlowKey::new(1);

    classifier.classify(&mut SimPacket::new(flow, 40).with_flags(TcpFlags::SYN), SimTime::ZERO);
    classifier.classify(&mut SimPacket::new(flow, 1460), SimTime::from_nanos(1_000));
    classifier.classify(&mut SimPacket::new(flow, 1460), SimTime::from_nanos(2_000));

    let before = classifier.flow(flow).unwrap().clone();
    let level = classifier.classify(
        &mut SimPacket::new(flow, 40).with_flags(TcpFlags::FIN | TcpFlags::ACK),
        SimTime::from_nanos(3_000),
    );
    let after = classifier.flow(flow).unwrap();

    assert_eq!(level, PriorityLevel::ZERO);
    assert_eq!(after.bytes_sent(), before.bytes_sent());
    assert_eq!(after.packets_sent(), before.packets_sent());
    assert_eq!(after.bytes_by_level(), before.bytes_by_level());
    assert_eq!(after.last_seen_at(), before.last_seen_at());
    // The SYN was never counted, so the flow starts at its first data packet.
    assert_eq!(after.first_seen_at(), SimTime::from_nanos(1_000));
}

#[test]
fn replay_is_deterministic() {
    let trace = random_trace(42, 3_000);

    for mode in [ScoringMode::Blind, ScoringMode::NonBlind] {
        let options = ClassifierOptions::default()
            .with_profile(WorkloadProfile::W5)
            .with_alpha(10.0)
            .with_mode(mode);

        let (a, levels_a) = run(options.clone(), &trace);
        let (b, levels_b) = run(options, &trace);

        assert_eq!(levels_a, levels_b);
        assert_eq!(a.total_bytes(), b.total_bytes());

        let flows_a = a.flows();
        let flows_b = b.flows();
        assert_eq!(flows_a.len(), flows_b.len());
        for ((key_a, ra), (key_b, rb)) in flows_a.iter().zip(&flows_b) {
            assert_eq!(key_a, key_b);
            assert_eq!(ra.bytes_by_level(), rb.bytes_by_level());
            assert_eq!(ra.packets_by_level(), rb.packets_by_level());
            assert_eq!(ra.score_trace(), rb.score_trace());
        }
    }
}

#[test]
fn non_blind_score_uses_remaining_bytes() {
    let alpha = 10.0;
    let mut classifier =
        Classifier::new(ClassifierOptions::default().non_blind().with_alpha(alpha)).unwrap();
    let flow = FlowKey::new(5);
    let size = 100_000u64;

    classifier.classify(&mut SimPacket::new(flow, 1460).with_size_hint(size as u32), SimTime::ZERO);
    for i in 1..20u64 {
        classifier.classify(&mut SimPacket::new(flow, 1460), SimTime::from_nanos(i * 12_000));

        let record = classifier.flow(flow).unwrap();
        let sample = record.score_trace().last().unwrap();
        let remaining = size.saturating_sub(sample.bytes_sent).max(1);
        assert_eq!(sample.score, sample.age_nanos as f64 / (remaining as f64).powf(alpha));
    }
}

#[test]
fn first_packet_in_blind_mode_is_always_floor() {
    for profile in WorkloadProfile::ALL {
        let mut classifier =
            Classifier::new(ClassifierOptions::default().with_profile(profile).with_alpha(10.0))
                .unwrap();

        for flow in 0..32 {
            let mut pkt = SimPacket::new(FlowKey::new(flow), 1 + flow * 40);
            let level = classifier.classify(&mut pkt, SimTime::from_nanos(u64::from(flow) * 7));
            assert_eq!(level, PriorityLevel::ZERO);
            assert_eq!(classifier.flow(FlowKey::new(flow)).unwrap().age_nanos(), 0);
        }
    }
}
