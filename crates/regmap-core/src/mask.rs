use tracing::trace;

/// Width in bits of every emitted mask literal.
pub const MASK_BITS: u32 = 32;

fn ones(width: u32) -> u128 {
    if width >= u128::BITS {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Bit mask covering `bit_width` bits starting at `bit_offset`.
///
/// The mask is computed in 128-bit arithmetic and then truncated to the low
/// [`MASK_BITS`] bits, so bits shifted past bit 31 are dropped.
pub fn field_mask(bit_width: u32, bit_offset: u32) -> u32 {
    let wide = ones(bit_width).checked_shl(bit_offset).unwrap_or(0);
    let mask = (wide & u128::from(u32::MAX)) as u32;
    trace!(bit_width, bit_offset, mask, "field mask");
    mask
}

/// Format a mask as a `0x`-prefixed, zero-padded, 8-digit lowercase hex literal.
pub fn format_mask(mask: u32) -> String {
    format!("{mask:#010x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_low_bit() {
        assert_eq!(format_mask(field_mask(1, 0)), "0x00000001");
    }

    #[test]
    fn nibble_at_offset() {
        assert_eq!(format_mask(field_mask(4, 0)), "0x0000000f");
        assert_eq!(format_mask(field_mask(4, 8)), "0x00000f00");
    }

    #[test]
    fn full_word() {
        assert_eq!(format_mask(field_mask(32, 0)), "0xffffffff");
    }

    #[test]
    fn bits_past_word_are_dropped() {
        assert_eq!(format_mask(field_mask(8, 28)), "0xf0000000");
        assert_eq!(format_mask(field_mask(64, 0)), "0xffffffff");
        assert_eq!(format_mask(field_mask(4, 32)), "0x00000000");
        assert_eq!(format_mask(field_mask(200, 0)), "0xffffffff");
        assert_eq!(format_mask(field_mask(1, 200)), "0x00000000");
    }

    #[test]
    fn zero_width_is_empty() {
        assert_eq!(format_mask(field_mask(0, 5)), "0x00000000");
    }
}
