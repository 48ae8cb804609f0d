use std::collections::{btree_map, BTreeMap};

use pbs_common::SimTime;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Bytes seen per time bucket, keyed by the bucket's start in nanoseconds.
///
/// Used for egress-load reporting only; it never feeds back into scheduling.
#[derive(Debug, Clone)]
pub struct SwitchLoad {
    bucket_nanos: u64,
    buckets: BTreeMap<u64, u64>,
}

impl SwitchLoad {
    /// # Panics
    /// Panics if `bucket_nanos` is zero. Options are validated before this is reached.
    pub(crate) fn new(bucket_nanos: u64) -> Self {
        assert_ne!(bucket_nanos, 0, "load bucket width must be non-zero");
        Self { bucket_nanos, buckets: BTreeMap::new() }
    }

    #[inline]
    pub(crate) fn record(&mut self, now: SimTime, bytes: u32) {
        *self.buckets.entry(now.bucket(self.bucket_nanos)).or_default() += u64::from(bytes);
    }

    #[inline]
    pub const fn bucket_nanos(&self) -> u64 {
        self.bucket_nanos
    }

    /// Bytes recorded in the bucket starting at `bucket`, if any.
    #[inline]
    pub fn get(&self, bucket: u64) -> Option<u64> {
        self.buckets.get(&bucket).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Sum over all buckets.
    pub fn total(&self) -> u64 {
        self.buckets.values().sum()
    }

    /// `(bucket start, bytes)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, u64)> + '_ {
        self.buckets.iter().map(|(&bucket, &bytes)| (bucket, bytes))
    }

    /// `(bucket start, bytes per second)` pairs in time order.
    pub fn rates(&self) -> impl Iterator<Item = (u64, f64)> + '_ {
        let scale = NANOS_PER_SEC / self.bucket_nanos as f64;
        self.iter().map(move |(bucket, bytes)| (bucket, bytes as f64 * scale))
    }
}

impl<'a> IntoIterator for &'a SwitchLoad {
    type Item = (&'a u64, &'a u64);
    type IntoIter = btree_map::Iter<'a, u64, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.buckets.iter()
    }
}
