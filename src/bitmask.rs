//! Packs several sub-fields into one fixed-width unsigned integer, and splits them back out.
//!
//! A partition is an ordered list of bit widths ("masks") that add up to the width of the
//! integer. The first mask covers the most significant bits. For example, the partition
//! `[1, 7]` over a `u8` describes a 1-bit flag in bit 7 followed by a 7-bit value in bits
//! 0..=6:
//!
//! ```
//! use binary_cursor::bitmask;
//!
//! let packed: u8 = bitmask::pack(&[1, 7], &[1, 100]).unwrap();
//! assert_eq!(packed, 0b1_1100100);
//! assert_eq!(bitmask::unpack(&[1, 7], packed).unwrap(), [1, 100]);
//! ```
//!
//! All arithmetic is done in `u64`, so 64-bit partitions never lose precision. Every argument
//! is validated before any bit is extracted or combined.

use crate::error::MaskError;
use alloc::vec::Vec;

/// An unsigned integer type that sub-fields can be packed into.
pub trait PackedInt: Copy {
    /// Width of the integer, in bits.
    const BITS: u32;

    /// Widens the value to `u64`.
    fn to_u64(self) -> u64;

    /// Narrows `value` to this type. `value` always fits.
    fn from_u64(value: u64) -> Self;
}

macro_rules! packed_int {
    ($($ty:ty),*) => {
        $(
            impl PackedInt for $ty {
                const BITS: u32 = <$ty>::BITS;

                #[inline(always)]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline(always)]
                fn from_u64(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

packed_int!(u8, u16, u32, u64);

/// Largest value that fits in `bits` bits. `bits` must be in `1..=64`.
#[inline(always)]
fn low_mask(bits: u32) -> u64 {
    u64::MAX >> (64 - bits)
}

/// Checks that `masks` is a valid partition of a `width`-bit integer.
///
/// `width` must be 8, 16, 32 or 64. The partition must not be empty, every mask must be at
/// least 1 bit wide, and the masks must add up to `width`.
pub fn validate_masks(width: u32, masks: &[u32]) -> Result<(), MaskError> {
    if !matches!(width, 8 | 16 | 32 | 64) {
        return Err(MaskError::UnsupportedWidth(width));
    }
    if masks.is_empty() {
        return Err(MaskError::Empty);
    }
    if let Some(index) = masks.iter().position(|&m| m == 0) {
        return Err(MaskError::ZeroWidth { index });
    }

    let total: u64 = masks.iter().map(|&m| u64::from(m)).sum();
    if total != u64::from(width) {
        return Err(MaskError::WidthMismatch {
            expected: width,
            actual: total,
        });
    }

    Ok(())
}

/// Splits the `width`-bit integer `packed` into one value per mask.
///
/// The first element of the result holds the most significant `masks[0]` bits. Bits of
/// `packed` above `width` are ignored.
pub fn unpack_bits(width: u32, masks: &[u32], packed: u64) -> Result<Vec<u64>, MaskError> {
    validate_masks(width, masks)?;

    let mut remaining = width;
    let values = masks
        .iter()
        .map(|&mask| {
            remaining -= mask;
            // `remaining` stays below 64 because every mask is at least 1 bit wide.
            (packed >> remaining) & low_mask(mask)
        })
        .collect();

    Ok(values)
}

/// Combines `values` into a single `width`-bit integer, one value per mask.
///
/// `values[0]` lands in the most significant `masks[0]` bits. Fails if the partition is
/// invalid, if the number of values differs from the number of masks, or if a value does not
/// fit in its mask.
pub fn pack_bits(width: u32, masks: &[u32], values: &[u64]) -> Result<u64, MaskError> {
    validate_masks(width, masks)?;

    if values.len() != masks.len() {
        return Err(MaskError::ValueCountMismatch {
            masks: masks.len(),
            values: values.len(),
        });
    }

    for (index, (&mask, &value)) in masks.iter().zip(values).enumerate() {
        if value > low_mask(mask) {
            return Err(MaskError::ValueOverflow { index, value, mask });
        }
    }

    let mut remaining = width;
    let mut packed: u64 = 0;
    for (&mask, &value) in masks.iter().zip(values) {
        remaining -= mask;
        packed |= value << remaining;
    }

    Ok(packed)
}

/// Splits `packed` into one value per mask. See [`unpack_bits`].
pub fn unpack<T: PackedInt>(masks: &[u32], packed: T) -> Result<Vec<T>, MaskError> {
    let values = unpack_bits(T::BITS, masks, packed.to_u64())?;
    Ok(values.into_iter().map(T::from_u64).collect())
}

/// Combines `values` into a single integer, one value per mask. See [`pack_bits`].
pub fn pack<T: PackedInt>(masks: &[u32], values: &[T]) -> Result<T, MaskError> {
    let wide: Vec<u64> = values.iter().map(|v| v.to_u64()).collect();
    Ok(T::from_u64(pack_bits(T::BITS, masks, &wide)?))
}
