#![doc(issue_tracker_base_url = "https://github.com/pbs-sched/pbs/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]

mod flow;
pub use flow::{FiveTuple, FlowKey, IPPROTO_TCP, IPPROTO_UDP};

mod packet;
pub use packet::{Packet, SimPacket, TcpFlags, TransportHeader};

mod tag;
pub use tag::{FlowSizeTag, PrioTag, PriorityLevel, TagError};
