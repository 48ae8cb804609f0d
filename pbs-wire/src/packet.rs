use crate::{FiveTuple, FlowKey, FlowSizeTag, PrioTag};

/// TCP control flags, as found in byte 13 of the TCP header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct TcpFlags(u8);

impl TcpFlags {
    pub const FIN: Self = Self(0x01);
    pub const SYN: Self = Self(0x02);
    pub const RST: Self = Self(0x04);
    pub const PSH: Self = Self(0x08);
    pub const ACK: Self = Self(0x10);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Whether these flags open or close a connection.
    pub const fn is_handshake(self) -> bool {
        self.intersects(Self::SYN.union(Self::FIN))
    }
}

impl std::ops::BitOr for TcpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

/// The transport header fields the classifier inspects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransportHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub flags: TcpFlags,
}

/// A handle to a packet owned by the surrounding simulator.
///
/// Classifiers and aggregators only ever look at a packet through this trait: its size, its
/// flow identity, its transport header, and the two pieces of metadata that travel with it.
pub trait Packet {
    /// Size of the packet in bytes, headers included.
    fn size(&self) -> u32;

    /// The flow this packet belongs to, or `None` if its header could not be recognized.
    fn flow_key(&self) -> Option<FlowKey>;

    /// The transport header, if the packet carries one.
    fn transport(&self) -> Option<TransportHeader>;

    /// Returns the declared-size hint without removing it.
    fn peek_size_hint(&self) -> Option<FlowSizeTag>;

    /// Removes and returns the declared-size hint.
    fn take_size_hint(&mut self) -> Option<FlowSizeTag>;

    /// The priority tag, if one was attached upstream.
    fn priority(&self) -> Option<PrioTag>;

    /// Attaches (or replaces) the priority tag.
    fn set_priority(&mut self, tag: PrioTag);
}

/// A plain in-memory [`Packet`], useful for driving the classifiers from a trace or a test.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimPacket {
    size: u32,
    flow: Option<FlowKey>,
    transport: Option<TransportHeader>,
    size_hint: Option<FlowSizeTag>,
    prio: Option<PrioTag>,
}

impl SimPacket {
    /// Creates a data packet of `size` bytes belonging to `flow`.
    pub fn new(flow: FlowKey, size: u32) -> Self {
        Self { size, flow: Some(flow), ..Default::default() }
    }

    /// Creates a packet for the flow identified by `tuple`, with its ports filled in.
    pub fn from_tuple(tuple: &FiveTuple, size: u32) -> Self {
        Self {
            size,
            flow: Some(tuple.flow_key()),
            transport: Some(TransportHeader {
                src_port: tuple.src_port,
                dst_port: tuple.dst_port,
                flags: TcpFlags::empty(),
            }),
            ..Default::default()
        }
    }

    /// Creates a packet without a recognizable header.
    pub fn malformed(size: u32) -> Self {
        Self { size, ..Default::default() }
    }

    pub fn with_transport(mut self, transport: TransportHeader) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the TCP flags, creating an otherwise empty transport header if needed.
    pub fn with_flags(mut self, flags: TcpFlags) -> Self {
        self.transport.get_or_insert_with(TransportHeader::default).flags = flags;
        self
    }

    pub fn with_size_hint(mut self, flow_size: u32) -> Self {
        self.size_hint = Some(FlowSizeTag::new(flow_size));
        self
    }

    pub fn with_priority(mut self, tag: PrioTag) -> Self {
        self.prio = Some(tag);
        self
    }
}

impl Packet for SimPacket {
    fn size(&self) -> u32 {
        self.size
    }

    fn flow_key(&self) -> Option<FlowKey> {
        self.flow
    }

    fn transport(&self) -> Option<TransportHeader> {
        self.transport
    }

    fn peek_size_hint(&self) -> Option<FlowSizeTag> {
        self.size_hint
    }

    fn take_size_hint(&mut self) -> Option<FlowSizeTag> {
        self.size_hint.take()
    }

    fn priority(&self) -> Option<PrioTag> {
        self.prio
    }

    fn set_priority(&mut self, tag: PrioTag) {
        self.prio = Some(tag);
    }
}
