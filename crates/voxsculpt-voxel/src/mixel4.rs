//! Four-texture blending packed into a pair of 16-bit channels.
//!
//! The `Indices` channel holds four 4-bit texture indices and the `Weights`
//! channel holds the matching four 4-bit weights.

/// Pack four texture indices (0..16) into a u16.
#[inline]
pub const fn encode_indices_to_packed_u16(a: u8, b: u8, c: u8, d: u8) -> u16 {
    (a as u16 & 0xF) | ((b as u16 & 0xF) << 4) | ((c as u16 & 0xF) << 8) | ((d as u16 & 0xF) << 12)
}

/// Unpack four texture indices.
#[inline]
pub const fn decode_indices_from_packed_u16(packed: u16) -> [u8; 4] {
    [
        (packed & 0xF) as u8,
        ((packed >> 4) & 0xF) as u8,
        ((packed >> 8) & 0xF) as u8,
        ((packed >> 12) & 0xF) as u8,
    ]
}

/// Pack four 8-bit weights into a u16, keeping 4 bits of precision each.
#[inline]
pub fn encode_weights_to_packed_u16_lossy(a: u8, b: u8, c: u8, d: u8) -> u16 {
    let q = |w: u8| (u16::from(w) * 15 + 127) / 255;
    q(a) | (q(b) << 4) | (q(c) << 8) | (q(d) << 12)
}

/// Unpack four weights back to the 0..=255 range.
#[inline]
pub const fn decode_weights_from_packed_u16(packed: u16) -> [u8; 4] {
    let w = decode_indices_from_packed_u16(packed);
    [w[0] * 17, w[1] * 17, w[2] * 17, w[3] * 17]
}

/// Blend `texture_index` into a packed voxel with the given target weight (0..1).
///
/// The texture takes over the slot already holding it, or else the slot with
/// the lowest weight. Remaining weights are rescaled so the total stays 1.
pub fn blend_texture_packed_u16(
    texture_index: u8,
    target_weight: f32,
    encoded_indices: &mut u16,
    encoded_weights: &mut u16,
) {
    let mut indices = decode_indices_from_packed_u16(*encoded_indices);
    let weights = decode_weights_from_packed_u16(*encoded_weights);
    let mut weights_f = weights.map(|w| f32::from(w) / 255.0);

    let slot = match indices.iter().position(|i| *i == texture_index) {
        Some(slot) => slot,
        None => {
            let mut slot = 0;
            for i in 1..4 {
                if weights_f[i] < weights_f[slot] {
                    slot = i;
                }
            }
            indices[slot] = texture_index;
            weights_f[slot] = 0.0;
            slot
        }
    };

    let target = weights_f[slot] + (1.0 - weights_f[slot]) * target_weight.clamp(0.0, 1.0);
    let others: f32 = (0..4).filter(|i| *i != slot).map(|i| weights_f[i]).sum();
    if others <= f32::EPSILON {
        weights_f = [0.0; 4];
        weights_f[slot] = 1.0;
    } else {
        let k = (1.0 - target) / others;
        for (i, w) in weights_f.iter_mut().enumerate() {
            if i == slot {
                *w = target;
            } else {
                *w *= k;
            }
        }
    }

    let w8 = weights_f.map(|w| (w.clamp(0.0, 1.0) * 255.0).round() as u8);
    *encoded_indices = encode_indices_to_packed_u16(indices[0], indices[1], indices[2], indices[3]);
    *encoded_weights = encode_weights_to_packed_u16_lossy(w8[0], w8[1], w8[2], w8[3]);
}

/// Normalize four weights so they sum to 1. A null sum gives all zeros.
pub fn normalize_weights(weights: [f32; 4]) -> [f32; 4] {
    let sum: f32 = weights.iter().sum();
    if sum < 0.00001 {
        return [0.0; 4];
    }
    weights.map(|w| w / sum)
}
