use std::{
    fmt,
    hash::{Hash, Hasher},
    net::IpAddr,
};

use rustc_hash::FxHasher;

/// IANA protocol number for TCP.
pub const IPPROTO_TCP: u8 = 6;
/// IANA protocol number for UDP.
pub const IPPROTO_UDP: u8 = 17;

/// Opaque identifier of a flow, derived from the packet's 5-tuple hash.
///
/// Two distinct 5-tuples that hash to the same key are treated as one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FlowKey(u32);

impl FlowKey {
    pub const fn new(hash: u32) -> Self {
        Self(hash)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for FlowKey {
    fn from(hash: u32) -> Self {
        Self(hash)
    }
}

impl From<&FiveTuple> for FlowKey {
    fn from(tuple: &FiveTuple) -> Self {
        let mut hasher = FxHasher::default();
        tuple.hash(&mut hasher);
        let hash = hasher.finish();
        // Fold the upper half in so both halves contribute to the key.
        Self((hash ^ (hash >> 32)) as u32)
    }
}

impl fmt::Display for FlowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The header fields that identify a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiveTuple {
    pub src: IpAddr,
    pub dst: IpAddr,
    pub src_port: u16,
    pub dst_port: u16,
    pub protocol: u8,
}

impl FiveTuple {
    pub const fn tcp(src: IpAddr, src_port: u16, dst: IpAddr, dst_port: u16) -> Self {
        Self { src, dst, src_port, dst_port, protocol: IPPROTO_TCP }
    }

    pub fn flow_key(&self) -> FlowKey {
        FlowKey::from(self)
    }
}
