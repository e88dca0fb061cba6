//! Channel identifiers, bit depths and volume formats.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Number of channels every buffer carries.
pub const MAX_CHANNELS: usize = 8;

/// Voxel channel identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelId {
    /// Discrete block/material type.
    #[default]
    Type = 0,
    /// Signed distance, negative inside matter.
    Sdf = 1,
    /// Packed color.
    Color = 2,
    /// Four packed 4-bit texture indices.
    Indices = 3,
    /// Four packed 4-bit texture weights.
    Weights = 4,
    Data5 = 5,
    Data6 = 6,
    Data7 = 7,
}

impl ChannelId {
    /// All channels in index order.
    pub const ALL: [Self; MAX_CHANNELS] = [
        Self::Type,
        Self::Sdf,
        Self::Color,
        Self::Indices,
        Self::Weights,
        Self::Data5,
        Self::Data6,
        Self::Data7,
    ];

    /// Channel from its numeric index.
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < MAX_CHANNELS {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Numeric index of the channel.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Bit of this channel inside a [`ChannelMask`].
    #[inline]
    pub const fn mask(self) -> ChannelMask {
        ChannelMask::from_bits_retain(1 << self as u8)
    }
}

bitflags! {
    /// Set of channels, one bit per [`ChannelId`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ChannelMask: u8 {
        const TYPE = 1 << 0;
        const SDF = 1 << 1;
        const COLOR = 1 << 2;
        const INDICES = 1 << 3;
        const WEIGHTS = 1 << 4;
        const DATA5 = 1 << 5;
        const DATA6 = 1 << 6;
        const DATA7 = 1 << 7;
    }
}

impl ChannelMask {
    /// Check if a channel is part of the mask.
    #[inline]
    pub const fn has(self, channel: ChannelId) -> bool {
        self.bits() & (1 << channel as u8) != 0
    }

    /// Iterate over the channels in the mask.
    pub fn channels(self) -> impl Iterator<Item = ChannelId> {
        ChannelId::ALL.into_iter().filter(move |c| self.has(*c))
    }
}

impl From<ChannelId> for ChannelMask {
    fn from(channel: ChannelId) -> Self {
        channel.mask()
    }
}

/// Bit depth of a channel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Depth {
    #[default]
    Bits8,
    Bits16,
    Bits32,
    Bits64,
}

impl Depth {
    /// Size of one value in bytes.
    #[inline]
    pub const fn byte_count(self) -> usize {
        match self {
            Self::Bits8 => 1,
            Self::Bits16 => 2,
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Largest integer value a voxel can hold at this depth.
    #[inline]
    pub const fn max_value(self) -> u64 {
        match self {
            Self::Bits8 => u8::MAX as u64,
            Self::Bits16 => u16::MAX as u64,
            Self::Bits32 => u32::MAX as u64,
            Self::Bits64 => u64::MAX,
        }
    }
}

/// Storage state of a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Compression {
    /// One value for the whole buffer.
    Uniform,
    /// One value per voxel.
    Raw,
}

/// Channel depth layout of a volume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoxelFormat {
    pub depths: [Depth; MAX_CHANNELS],
}

impl VoxelFormat {
    /// Depth of a channel.
    #[inline]
    pub const fn depth(&self, channel: ChannelId) -> Depth {
        self.depths[channel as usize]
    }

    /// Return a copy with one channel depth changed.
    #[must_use]
    pub const fn with_depth(mut self, channel: ChannelId, depth: Depth) -> Self {
        self.depths[channel as usize] = depth;
        self
    }
}

impl Default for VoxelFormat {
    fn default() -> Self {
        Self {
            depths: [
                Depth::Bits16, // Type
                Depth::Bits32, // Sdf
                Depth::Bits32, // Color
                Depth::Bits16, // Indices
                Depth::Bits16, // Weights
                Depth::Bits8,
                Depth::Bits8,
                Depth::Bits8,
            ],
        }
    }
}
