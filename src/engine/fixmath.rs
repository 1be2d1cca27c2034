//! 8-bit by 16-bit multiplies in the shape the fixed caster needs.
//!
//! Every product is scaled down by 256, so a table value of 256 means 1.0.

/// `256 - x` modulo 256: the complementary angle within a quadrant, or the
/// distance to the next tile edge from a sub-tile offset.
#[inline]
pub fn invert(x: u8) -> u8 {
    (x ^ 0xFF).wrapping_add(1)
}

/// `(v * f) >> 8`, computed from the high and low bytes of `f` so no
/// intermediate needs more than 16 bits.
#[inline]
pub fn mul_u(v: u8, f: u16) -> u16 {
    let v = u16::from(v);
    let high = v * (f >> 8);
    let low = v * (f & 0xFF);
    high + (low >> 8)
}

/// Signed flavour of [`mul_u`]. Negative products come back as the ones'
/// complement of the magnitude, i.e. one below the exact value.
#[inline]
pub fn mul_s(v: u8, f: i16) -> i16 {
    // |f| <= 32768 and v <= 255 keep the magnitude below i16::MAX.
    let magnitude = mul_u(v, f.unsigned_abs()) as i16;
    if f < 0 { !magnitude } else { magnitude }
}
