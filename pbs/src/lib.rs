#![doc(issue_tracker_base_url = "https://github.com/pbs-sched/pbs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

pub use pbs_common::{SimTime, NUM_LEVELS};
pub use pbs_filter::*;
pub use pbs_wire::*;
