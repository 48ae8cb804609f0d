#![doc(issue_tracker_base_url = "https://github.com/pbs-sched/pbs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod time;
pub use time::SimTime;

/// Number of strict-priority levels a packet can be binned into.
pub const NUM_LEVELS: usize = 8;

#[allow(non_upper_case_globals)]
pub mod constants {
    pub const KiB: u32 = 1024;
    pub const MiB: u32 = 1024 * KiB;
    pub const GiB: u32 = 1024 * MiB;
}

/// Returns `part / whole`, or 0.0 when `whole` is zero.
#[inline]
pub fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64
}
