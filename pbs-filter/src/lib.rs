#![doc(issue_tracker_base_url = "https://github.com/pbs-sched/pbs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

//! Priority-based scheduling (PBS) packet filters.
//!
//! A [`Classifier`] sits at an endpoint. For every packet it updates the packet's flow, computes
//! a raw score from the flow's age and bytes sent (or, in non-blind mode, bytes remaining),
//! bins it into one of eight levels using the [`ThresholdTable`] of the configured
//! [`WorkloadProfile`], and tags the packet. An [`Aggregator`] sits at a switch and only
//! accounts the tags it sees.

mod aggregator;
pub use aggregator::*;

mod classifier;
pub use classifier::*;

mod error;
pub use error::ConfigError;

mod flow;
pub use flow::{FlowRecord, ScoreSample, UNKNOWN_FLOW_SIZE};

mod load;
pub use load::SwitchLoad;

mod profile;
pub use profile::{ScoringMode, ThresholdTable, WorkloadProfile};

pub mod report;

mod stats;
pub use stats::FilterStats;
