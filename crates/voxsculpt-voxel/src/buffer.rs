//! Dense multi-channel voxel buffer.
//!
//! Each channel is either uniform (one value for the whole buffer) or raw
//! (one value per voxel). Writes that would break uniformity decompress the
//! channel first. Voxels are laid out with Y varying fastest, then X, then Z,
//! matching [`Box3i::for_each_cell`].

use glam::IVec3;
use hashbrown::HashMap;
use voxsculpt_core::constants::SDF_FAR_OUTSIDE;
use voxsculpt_core::Box3i;

use crate::format::{ChannelId, ChannelMask, Compression, Depth, VoxelFormat, MAX_CHANNELS};
use crate::metadata::VoxelMetadata;

/// Scale applied to distances before 8-bit snorm quantization.
pub const QUANTIZED_SDF_8_BITS_SCALE: f32 = 0.1;
/// Scale applied to distances before 16-bit snorm quantization.
pub const QUANTIZED_SDF_16_BITS_SCALE: f32 = 0.002;

/// Per-voxel storage of one channel.
#[derive(Clone, Debug, PartialEq)]
pub enum RawChannel {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
}

impl RawChannel {
    fn filled(depth: Depth, len: usize, value: u64) -> Self {
        match depth {
            Depth::Bits8 => Self::U8(vec![value as u8; len]),
            Depth::Bits16 => Self::U16(vec![value as u16; len]),
            Depth::Bits32 => Self::U32(vec![value as u32; len]),
            Depth::Bits64 => Self::U64(vec![value; len]),
        }
    }

    #[inline]
    fn get(&self, i: usize) -> u64 {
        match self {
            Self::U8(v) => u64::from(v[i]),
            Self::U16(v) => u64::from(v[i]),
            Self::U32(v) => u64::from(v[i]),
            Self::U64(v) => v[i],
        }
    }

    #[inline]
    fn set(&mut self, i: usize, value: u64) {
        match self {
            Self::U8(v) => v[i] = value as u8,
            Self::U16(v) => v[i] = value as u16,
            Self::U32(v) => v[i] = value as u32,
            Self::U64(v) => v[i] = value,
        }
    }

    fn first_if_uniform(&self) -> Option<u64> {
        fn uniform<T: Copy + PartialEq + Into<u64>>(v: &[T]) -> Option<u64> {
            let first = *v.first()?;
            v.iter().all(|x| *x == first).then(|| first.into())
        }
        match self {
            Self::U8(v) => uniform(v),
            Self::U16(v) => uniform(v),
            Self::U32(v) => uniform(v),
            Self::U64(v) => uniform(v),
        }
    }

    /// View the channel as raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::U8(v) => v,
            Self::U16(v) => bytemuck::cast_slice(v),
            Self::U32(v) => bytemuck::cast_slice(v),
            Self::U64(v) => bytemuck::cast_slice(v),
        }
    }

    /// View a 32-bit channel as floats.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match self {
            Self::U32(v) => Some(bytemuck::cast_slice(v)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum ChannelData {
    Uniform(u64),
    Raw(RawChannel),
}

#[derive(Clone, Debug, PartialEq)]
struct Channel {
    depth: Depth,
    data: ChannelData,
}

impl Channel {
    fn new(id: ChannelId, depth: Depth) -> Self {
        Self {
            depth,
            data: ChannelData::Uniform(default_value(id, depth)),
        }
    }
}

/// Value a channel holds right after creation.
///
/// The SDF channel starts far outside any matter, other channels start at zero.
pub fn default_value(channel: ChannelId, depth: Depth) -> u64 {
    match channel {
        ChannelId::Sdf => encode_sdf(SDF_FAR_OUTSIDE, depth),
        _ => 0,
    }
}

/// Encode a signed distance into the raw bits stored at `depth`.
///
/// Quantized depths saturate.
pub fn encode_sdf(value: f32, depth: Depth) -> u64 {
    match depth {
        Depth::Bits8 => {
            let q = (value * QUANTIZED_SDF_8_BITS_SCALE).clamp(-1.0, 1.0) * 127.0;
            u64::from(q.round() as i8 as u8)
        }
        Depth::Bits16 => {
            let q = (value * QUANTIZED_SDF_16_BITS_SCALE).clamp(-1.0, 1.0) * 32767.0;
            u64::from(q.round() as i16 as u16)
        }
        Depth::Bits32 => u64::from(value.to_bits()),
        Depth::Bits64 => f64::from(value).to_bits(),
    }
}

/// Decode raw bits stored at `depth` into a signed distance.
pub fn decode_sdf(raw: u64, depth: Depth) -> f32 {
    match depth {
        Depth::Bits8 => f32::from(raw as u8 as i8) / 127.0 / QUANTIZED_SDF_8_BITS_SCALE,
        Depth::Bits16 => f32::from(raw as u16 as i16) / 32767.0 / QUANTIZED_SDF_16_BITS_SCALE,
        Depth::Bits32 => f32::from_bits(raw as u32),
        Depth::Bits64 => f64::from_bits(raw) as f32,
    }
}

/// Dense box of voxels with independently typed channels.
#[derive(Clone, Debug, PartialEq)]
pub struct VoxelBuffer {
    size: IVec3,
    channels: [Channel; MAX_CHANNELS],
    metadata: HashMap<IVec3, VoxelMetadata>,
}

impl Default for VoxelBuffer {
    fn default() -> Self {
        Self::new(IVec3::ZERO)
    }
}

impl VoxelBuffer {
    /// Create a buffer of the given size using the default format.
    pub fn new(size: IVec3) -> Self {
        Self::with_format(size, VoxelFormat::default())
    }

    /// Create a buffer of the given size and format.
    pub fn with_format(size: IVec3, format: VoxelFormat) -> Self {
        Self {
            size: size.max(IVec3::ZERO),
            channels: std::array::from_fn(|i| Channel::new(ChannelId::ALL[i], format.depths[i])),
            metadata: HashMap::new(),
        }
    }

    /// Resize the buffer and reset every channel to its default value.
    ///
    /// Channel depths are preserved.
    pub fn create(&mut self, size: IVec3) {
        let format = self.format();
        *self = Self::with_format(size, format);
    }

    /// Size of the buffer in voxels.
    #[inline]
    pub const fn size(&self) -> IVec3 {
        self.size
    }

    /// Box covering the buffer in its own coordinates.
    #[inline]
    pub const fn local_box(&self) -> Box3i {
        Box3i::new(IVec3::ZERO, self.size)
    }

    /// Number of voxels.
    #[inline]
    pub fn volume(&self) -> usize {
        self.local_box().volume()
    }

    /// Channel depth layout.
    pub fn format(&self) -> VoxelFormat {
        VoxelFormat {
            depths: std::array::from_fn(|i| self.channels[i].depth),
        }
    }

    /// Adopt the channel depths of another buffer, resetting every channel.
    pub fn copy_format(&mut self, other: &Self) {
        let format = other.format();
        for (i, channel) in self.channels.iter_mut().enumerate() {
            *channel = Channel::new(ChannelId::ALL[i], format.depths[i]);
        }
    }

    /// Change the depth of one channel, resetting its content.
    pub fn set_channel_depth(&mut self, channel: ChannelId, depth: Depth) {
        self.channels[channel.index()] = Channel::new(channel, depth);
    }

    /// Depth of a channel.
    #[inline]
    pub fn channel_depth(&self, channel: ChannelId) -> Depth {
        self.channels[channel.index()].depth
    }

    /// Compression state of a channel.
    #[inline]
    pub fn channel_compression(&self, channel: ChannelId) -> Compression {
        match self.channels[channel.index()].data {
            ChannelData::Uniform(_) => Compression::Uniform,
            ChannelData::Raw(_) => Compression::Raw,
        }
    }

    /// Per-voxel data of a channel, or `None` when the channel is uniform.
    pub fn channel_data_read_only(&self, channel: ChannelId) -> Option<&RawChannel> {
        match &self.channels[channel.index()].data {
            ChannelData::Uniform(_) => None,
            ChannelData::Raw(raw) => Some(raw),
        }
    }

    /// Uniform value of a channel, or `None` when the channel is raw.
    pub fn uniform_value(&self, channel: ChannelId) -> Option<u64> {
        match self.channels[channel.index()].data {
            ChannelData::Uniform(v) => Some(v),
            ChannelData::Raw(_) => None,
        }
    }

    /// Check if a position lies inside the buffer.
    #[inline]
    pub fn is_position_valid(&self, pos: IVec3) -> bool {
        self.local_box().contains_point(pos)
    }

    /// Linear index of a voxel.
    #[inline]
    pub fn index(&self, pos: IVec3) -> usize {
        debug_assert!(self.is_position_valid(pos));
        (pos.y + self.size.y * (pos.x + self.size.x * pos.z)) as usize
    }

    /// Force a channel out of uniform compression.
    pub fn decompress_channel(&mut self, channel: ChannelId) {
        let len = self.volume();
        let ch = &mut self.channels[channel.index()];
        if let ChannelData::Uniform(value) = ch.data {
            ch.data = ChannelData::Raw(RawChannel::filled(ch.depth, len, value));
        }
    }

    /// Turn every raw channel holding a single value back into a uniform channel.
    pub fn compress_uniform_channels(&mut self) {
        for ch in &mut self.channels {
            let uniform = match &ch.data {
                ChannelData::Raw(raw) => raw.first_if_uniform(),
                ChannelData::Uniform(_) => None,
            };
            if let Some(value) = uniform {
                ch.data = ChannelData::Uniform(value);
            }
        }
    }

    /// Read a raw value. Positions outside the buffer read the channel default.
    pub fn get_voxel(&self, pos: IVec3, channel: ChannelId) -> u64 {
        let ch = &self.channels[channel.index()];
        if !self.is_position_valid(pos) {
            return default_value(channel, ch.depth);
        }
        match &ch.data {
            ChannelData::Uniform(v) => *v,
            ChannelData::Raw(raw) => raw.get(self.index(pos)),
        }
    }

    /// Write a raw value, truncated to the channel depth.
    ///
    /// Returns `false` when `pos` is outside the buffer.
    pub fn set_voxel(&mut self, pos: IVec3, value: u64, channel: ChannelId) -> bool {
        if !self.is_position_valid(pos) {
            return false;
        }
        let index = self.index(pos);
        let len = self.volume();
        let ch = &mut self.channels[channel.index()];
        let value = value & ch.depth.max_value();
        match ch.data {
            ChannelData::Uniform(v) if v == value => {}
            ChannelData::Uniform(v) => {
                let mut raw = RawChannel::filled(ch.depth, len, v);
                raw.set(index, value);
                ch.data = ChannelData::Raw(raw);
            }
            ChannelData::Raw(ref mut raw) => raw.set(index, value),
        }
        true
    }

    /// Read a value as a signed distance.
    pub fn get_voxel_f(&self, pos: IVec3, channel: ChannelId) -> f32 {
        decode_sdf(self.get_voxel(pos, channel), self.channel_depth(channel))
    }

    /// Write a signed distance, quantized to the channel depth.
    pub fn set_voxel_f(&mut self, pos: IVec3, value: f32, channel: ChannelId) -> bool {
        let raw = encode_sdf(value, self.channel_depth(channel));
        self.set_voxel(pos, raw, channel)
    }

    /// Set a whole channel to one value, making it uniform.
    pub fn fill(&mut self, value: u64, channel: ChannelId) {
        let ch = &mut self.channels[channel.index()];
        ch.data = ChannelData::Uniform(value & ch.depth.max_value());
    }

    /// Set a whole channel to one signed distance.
    pub fn fill_f(&mut self, value: f32, channel: ChannelId) {
        let raw = encode_sdf(value, self.channel_depth(channel));
        self.fill(raw, channel);
    }

    /// Reset a channel to its default value.
    pub fn clear_channel(&mut self, channel: ChannelId) {
        let value = default_value(channel, self.channel_depth(channel));
        self.fill(value, channel);
    }

    /// Set every voxel of a box (clipped to the buffer) to one value.
    pub fn fill_area(&mut self, area: Box3i, value: u64, channel: ChannelId) {
        let area = area.clipped(&self.local_box());
        if area == self.local_box() {
            self.fill(value, channel);
            return;
        }
        area.for_each_cell(|pos| {
            self.set_voxel(pos, value, channel);
        });
    }

    /// Copy the channels in `mask` from `src_box` of `src` to `dst_min` in this buffer.
    ///
    /// The copied region is clipped to both buffers. When `src` carries any
    /// metadata, the region's metadata is replaced by the source's; otherwise
    /// destination metadata is left alone.
    pub fn copy_channels_from(
        &mut self,
        src: &Self,
        src_box: Box3i,
        dst_min: IVec3,
        mask: ChannelMask,
    ) {
        let src_box = src_box.clipped(&src.local_box());
        let offset = dst_min - src_box.position;
        let dst_box = Box3i::new(src_box.position + offset, src_box.size).clipped(&self.local_box());
        let src_box = Box3i::new(dst_box.position - offset, dst_box.size);
        if src_box.is_empty() {
            return;
        }

        for channel in mask.channels() {
            if src_box == src.local_box() && dst_box == self.local_box() {
                if let Some(value) = src.uniform_value(channel) {
                    if src.channel_depth(channel) == self.channel_depth(channel) {
                        self.fill(value, channel);
                        continue;
                    }
                }
            }
            let same_depth = src.channel_depth(channel) == self.channel_depth(channel);
            src_box.for_each_cell(|src_pos| {
                let dst_pos = src_pos + offset;
                if same_depth {
                    self.set_voxel(dst_pos, src.get_voxel(src_pos, channel), channel);
                } else {
                    self.set_voxel_f(dst_pos, src.get_voxel_f(src_pos, channel), channel);
                }
            });
        }

        if src.metadata.is_empty() {
            return;
        }
        self.metadata.retain(|pos, _| !dst_box.contains_point(*pos));
        for (pos, meta) in &src.metadata {
            if src_box.contains_point(*pos) {
                self.metadata.insert(*pos + offset, meta.clone());
            }
        }
    }

    /// Metadata attached to a voxel.
    pub fn get_voxel_metadata(&self, pos: IVec3) -> Option<&VoxelMetadata> {
        self.metadata.get(&pos)
    }

    /// Attach or remove metadata. Returns `false` when `pos` is outside the buffer.
    pub fn set_voxel_metadata(&mut self, pos: IVec3, meta: Option<VoxelMetadata>) -> bool {
        if !self.is_position_valid(pos) {
            return false;
        }
        match meta {
            Some(meta) => {
                self.metadata.insert(pos, meta);
            }
            None => {
                self.metadata.remove(&pos);
            }
        }
        true
    }

    /// Remove metadata of every voxel inside a box.
    pub fn clear_voxel_metadata_in_area(&mut self, area: Box3i) {
        self.metadata.retain(|pos, _| !area.contains_point(*pos));
    }

    /// Iterate over every voxel carrying metadata.
    pub fn metadata(&self) -> impl Iterator<Item = (&IVec3, &VoxelMetadata)> {
        self.metadata.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_buffer_is_uniform_far_outside() {
        let buffer = VoxelBuffer::new(IVec3::splat(4));
        assert_eq!(buffer.channel_compression(ChannelId::Sdf), Compression::Uniform);
        assert_eq!(buffer.get_voxel_f(IVec3::ONE, ChannelId::Sdf), SDF_FAR_OUTSIDE);
        assert!(buffer.channel_data_read_only(ChannelId::Sdf).is_none());
    }

    #[test]
    fn write_decompresses_channel() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(4));
        assert!(buffer.set_voxel_f(IVec3::new(1, 2, 3), -2.5, ChannelId::Sdf));
        assert_eq!(buffer.channel_compression(ChannelId::Sdf), Compression::Raw);
        assert_eq!(buffer.get_voxel_f(IVec3::new(1, 2, 3), ChannelId::Sdf), -2.5);
        assert_eq!(buffer.get_voxel_f(IVec3::ZERO, ChannelId::Sdf), SDF_FAR_OUTSIDE);

        let floats = buffer
            .channel_data_read_only(ChannelId::Sdf)
            .and_then(RawChannel::as_f32)
            .unwrap();
        assert_eq!(floats.len(), 64);
        assert_eq!(floats[buffer.index(IVec3::new(1, 2, 3))], -2.5);
    }

    #[test]
    fn writing_uniform_value_keeps_compression() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(4));
        buffer.set_voxel(IVec3::ZERO, 0, ChannelId::Type);
        assert_eq!(buffer.channel_compression(ChannelId::Type), Compression::Uniform);
    }

    #[test]
    fn recompress_uniform_channel() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(2));
        buffer.set_voxel(IVec3::ZERO, 3, ChannelId::Type);
        buffer.set_voxel(IVec3::ZERO, 0, ChannelId::Type);
        assert_eq!(buffer.channel_compression(ChannelId::Type), Compression::Raw);
        buffer.compress_uniform_channels();
        assert_eq!(buffer.channel_compression(ChannelId::Type), Compression::Uniform);
    }

    #[test]
    fn quantized_sdf_saturates() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(2));
        buffer.set_channel_depth(ChannelId::Sdf, Depth::Bits16);
        buffer.set_voxel_f(IVec3::ZERO, SDF_FAR_OUTSIDE, ChannelId::Sdf);
        assert_relative_eq!(
            buffer.get_voxel_f(IVec3::ZERO, ChannelId::Sdf),
            1.0 / QUANTIZED_SDF_16_BITS_SCALE
        );
        buffer.set_voxel_f(IVec3::ONE, 1.5, ChannelId::Sdf);
        assert_relative_eq!(
            buffer.get_voxel_f(IVec3::ONE, ChannelId::Sdf),
            1.5,
            epsilon = 0.01
        );
    }

    #[test]
    fn value_truncated_to_depth() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(2));
        buffer.set_voxel(IVec3::ZERO, 0x1_0005, ChannelId::Type);
        assert_eq!(buffer.get_voxel(IVec3::ZERO, ChannelId::Type), 5);
    }

    #[test]
    fn out_of_bounds_access() {
        let mut buffer = VoxelBuffer::new(IVec3::splat(2));
        assert!(!buffer.set_voxel(IVec3::splat(5), 1, ChannelId::Type));
        assert_eq!(buffer.get_voxel(IVec3::splat(-1), ChannelId::Type), 0);
    }

    #[test]
    fn copy_region_with_offset() {
        let mut src = VoxelBuffer::new(IVec3::splat(4));
        src.set_voxel(IVec3::new(1, 1, 1), 7, ChannelId::Type);
        src.set_voxel_metadata(IVec3::new(1, 1, 1), Some(VoxelMetadata::Int(42)));

        let mut dst = VoxelBuffer::new(IVec3::splat(4));
        dst.copy_channels_from(
            &src,
            Box3i::new(IVec3::ONE, IVec3::splat(2)),
            IVec3::ZERO,
            ChannelMask::TYPE,
        );
        assert_eq!(dst.get_voxel(IVec3::ZERO, ChannelId::Type), 7);
        assert_eq!(dst.get_voxel(IVec3::ONE, ChannelId::Type), 0);
        assert_eq!(dst.get_voxel_metadata(IVec3::ZERO), Some(&VoxelMetadata::Int(42)));
    }

    #[test]
    fn copy_without_source_metadata_keeps_destination_metadata() {
        let src = VoxelBuffer::new(IVec3::splat(4));
        let mut dst = VoxelBuffer::new(IVec3::splat(4));
        dst.set_voxel_metadata(IVec3::new(2, 2, 2), Some(VoxelMetadata::Int(7)));

        dst.copy_channels_from(&src, src.local_box(), IVec3::ZERO, ChannelMask::SDF);
        assert_eq!(dst.get_voxel_metadata(IVec3::new(2, 2, 2)), Some(&VoxelMetadata::Int(7)));
    }

    #[test]
    fn copy_with_source_metadata_replaces_region() {
        let mut src = VoxelBuffer::new(IVec3::splat(2));
        src.set_voxel_metadata(IVec3::ZERO, Some(VoxelMetadata::Int(1)));
        let mut dst = VoxelBuffer::new(IVec3::splat(4));
        dst.set_voxel_metadata(IVec3::ONE, Some(VoxelMetadata::Int(2)));
        dst.set_voxel_metadata(IVec3::splat(3), Some(VoxelMetadata::Int(3)));

        dst.copy_channels_from(&src, src.local_box(), IVec3::ZERO, ChannelMask::SDF);
        assert_eq!(dst.get_voxel_metadata(IVec3::ZERO), Some(&VoxelMetadata::Int(1)));
        assert_eq!(dst.get_voxel_metadata(IVec3::ONE), None);
        assert_eq!(dst.get_voxel_metadata(IVec3::splat(3)), Some(&VoxelMetadata::Int(3)));
    }

    #[test]
    fn copy_format_resets_content() {
        let mut src = VoxelBuffer::new(IVec3::splat(2));
        src.set_channel_depth(ChannelId::Sdf, Depth::Bits16);
        let mut dst = VoxelBuffer::new(IVec3::splat(2));
        dst.set_voxel_f(IVec3::ZERO, -1.0, ChannelId::Sdf);
        dst.copy_format(&src);
        assert_eq!(dst.channel_depth(ChannelId::Sdf), Depth::Bits16);
        assert_eq!(dst.channel_compression(ChannelId::Sdf), Compression::Uniform);
    }
}
