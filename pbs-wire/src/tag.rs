use std::fmt;

use bytes::{Buf, BufMut};
use thiserror::Error;

use pbs_common::NUM_LEVELS;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("Tag truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("Invalid priority level: {0}")]
    InvalidLevel(u8),
}

/// One of the [`NUM_LEVELS`] strict-priority classes a packet can be binned into.
///
/// Level 0 doubles as the floor: packets that cannot or should not be scored land there.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PriorityLevel(u8);

impl PriorityLevel {
    /// The floor level.
    pub const ZERO: Self = Self(0);
    /// The topmost level.
    pub const MAX: Self = Self(NUM_LEVELS as u8 - 1);

    /// Returns the level with the given index.
    ///
    /// # Panics
    /// Panics if `level` is not below [`NUM_LEVELS`].
    #[inline]
    pub const fn new(level: u8) -> Self {
        assert!((level as usize) < NUM_LEVELS, "priority level out of range");
        Self(level)
    }

    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns the level as an index into per-level arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// All levels, lowest index first.
    pub fn all() -> impl DoubleEndedIterator<Item = Self> {
        (0..NUM_LEVELS as u8).map(Self)
    }
}

impl TryFrom<u8> for PriorityLevel {
    type Error = TagError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (value as usize) < NUM_LEVELS {
            Ok(Self(value))
        } else {
            Err(TagError::InvalidLevel(value))
        }
    }
}

impl From<PriorityLevel> for u8 {
    fn from(level: PriorityLevel) -> Self {
        level.0
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The priority tag attached to a packet once it has been classified. Queueing disciplines
/// read it to pick a strict-priority band; aggregation points read it for accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrioTag {
    level: PriorityLevel,
}

impl PrioTag {
    pub const fn new(level: PriorityLevel) -> Self {
        Self { level }
    }

    pub const fn level(&self) -> PriorityLevel {
        self.level
    }

    /// Returns the length of the encoded tag in bytes.
    #[inline]
    pub const fn len() -> usize {
        1
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.level.get());
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self, TagError> {
        if src.remaining() < Self::len() {
            return Err(TagError::Truncated { expected: Self::len(), actual: src.remaining() });
        }

        let level = PriorityLevel::try_from(src.get_u8())?;
        Ok(Self { level })
    }
}

/// An out-of-band hint carrying a flow's total size in bytes, attached by the sender to the
/// first packet of a flow. Only non-blind classifiers consume it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSizeTag {
    flow_size: u32,
}

impl FlowSizeTag {
    pub const fn new(flow_size: u32) -> Self {
        Self { flow_size }
    }

    pub const fn flow_size(&self) -> u32 {
        self.flow_size
    }

    /// Returns the length of the encoded tag in bytes.
    #[inline]
    pub const fn len() -> usize {
        4
    }

    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_u32(self.flow_size);
    }

    pub fn decode(src: &mut impl Buf) -> Result<Self, TagError> {
        if src.remaining() < Self::len() {
            return Err(TagError::Truncated { expected: Self::len(), actual: src.remaining() });
        }

        Ok(Self { flow_size: src.get_u32() })
    }
}
