use crate::bitmask::{pack, pack_bits, unpack, unpack_bits, validate_masks};
use crate::MaskError;
use proptest::prelude::*;

#[test]
fn flag_and_seven_bits() {
    assert_eq!(pack_bits(8, &[1, 7], &[1, 100]), Ok(0b1_1100100));
    assert_eq!(pack_bits(8, &[1, 7], &[1, 100]), Ok(228));
    assert_eq!(unpack_bits(8, &[1, 7], 228), Ok(vec![1, 100]));
}

#[test]
fn typed_pack_unpack() {
    let packed: u16 = pack(&[4, 4, 8], &[0xa, 0x5, 0x3c]).unwrap();
    assert_eq!(packed, 0xa53c);
    assert_eq!(unpack(&[4, 4, 8], packed), Ok(vec![0xa, 0x5, 0x3c]));
}

#[test]
fn single_mask_is_identity() {
    assert_eq!(pack_bits(8, &[8], &[0xab]), Ok(0xab));
    assert_eq!(unpack_bits(8, &[8], 0xab), Ok(vec![0xab]));
    assert_eq!(pack_bits(64, &[64], &[u64::MAX]), Ok(u64::MAX));
    assert_eq!(unpack_bits(64, &[64], u64::MAX), Ok(vec![u64::MAX]));
}

#[test]
fn order_is_packing_order() {
    // Not sorted by size: the 7-bit field comes first.
    assert_eq!(pack_bits(8, &[7, 1], &[100, 1]), Ok((100 << 1) | 1));
    assert_eq!(unpack_bits(8, &[7, 1], 201), Ok(vec![100, 1]));
}

#[test]
fn zeros_are_legal() {
    assert_eq!(pack_bits(32, &[16, 8, 8], &[0, 0, 0]), Ok(0));
    assert_eq!(unpack_bits(32, &[16, 8, 8], 0), Ok(vec![0, 0, 0]));
}

#[test]
fn full_width_64() {
    let masks = [1, 62, 1];
    let values = [1, (1u64 << 62) - 1, 1];
    assert_eq!(pack_bits(64, &masks, &values), Ok(u64::MAX));
    assert_eq!(unpack_bits(64, &masks, u64::MAX), Ok(values.to_vec()));

    let packed: u64 = pack(&[32, 32], &[0xdead_beef, 0x0bad_f00d]).unwrap();
    assert_eq!(packed, 0xdead_beef_0bad_f00d);
}

#[test]
fn unpack_ignores_bits_above_width() {
    assert_eq!(unpack_bits(8, &[4, 4], 0xff12), Ok(vec![1, 2]));
}

#[test]
fn mask_sum_mismatch() {
    assert_eq!(
        pack_bits(8, &[3, 4], &[0, 0]),
        Err(MaskError::WidthMismatch {
            expected: 8,
            actual: 7
        })
    );
    assert_eq!(
        unpack_bits(16, &[8, 8, 8], 0),
        Err(MaskError::WidthMismatch {
            expected: 16,
            actual: 24
        })
    );
}

#[test]
fn value_does_not_fit() {
    assert_eq!(
        pack_bits(8, &[1, 7], &[2, 0]),
        Err(MaskError::ValueOverflow {
            index: 0,
            value: 2,
            mask: 1
        })
    );
    assert_eq!(
        pack_bits(8, &[4, 4], &[15, 16]),
        Err(MaskError::ValueOverflow {
            index: 1,
            value: 16,
            mask: 4
        })
    );
}

#[test]
fn malformed_partitions() {
    assert_eq!(validate_masks(8, &[]), Err(MaskError::Empty));
    assert_eq!(
        validate_masks(8, &[4, 0, 4]),
        Err(MaskError::ZeroWidth { index: 1 })
    );
    assert_eq!(validate_masks(12, &[12]), Err(MaskError::UnsupportedWidth(12)));
    assert!(validate_masks(32, &[u32::MAX, 33]).is_err());
    assert_eq!(validate_masks(64, &[60, 4]), Ok(()));
}

#[test]
fn value_count_mismatch() {
    assert_eq!(
        pack_bits(8, &[4, 4], &[1]),
        Err(MaskError::ValueCountMismatch {
            masks: 2,
            values: 1
        })
    );
}

/// Splits `width` into a random partition.
fn partition(width: u32) -> impl Strategy<Value = Vec<u32>> {
    proptest::collection::vec(1u32..=width, 1..=width as usize).prop_map(move |raw| {
        let mut masks = Vec::new();
        let mut left = width;
        for m in raw {
            if left == 0 {
                break;
            }
            let m = m.min(left);
            masks.push(m);
            left -= m;
        }
        if left > 0 {
            masks.push(left);
        }
        masks
    })
}

fn partition_and_values() -> impl Strategy<Value = (u32, Vec<u32>, Vec<u64>)> {
    prop_oneof![Just(8u32), Just(16u32), Just(32u32), Just(64u32)]
        .prop_flat_map(partition_with_width)
}

fn partition_with_width(width: u32) -> impl Strategy<Value = (u32, Vec<u32>, Vec<u64>)> {
    partition(width).prop_flat_map(move |masks| {
        let values: Vec<_> = masks
            .iter()
            .map(|&m| 0..=(u64::MAX >> (64 - m)))
            .collect();
        (Just(width), Just(masks), values)
    })
}

proptest! {
    #[test]
    fn pack_then_unpack((width, masks, values) in partition_and_values()) {
        let packed = pack_bits(width, &masks, &values).unwrap();
        if width < 64 {
            prop_assert!(packed < (1u64 << width));
        }
        prop_assert_eq!(unpack_bits(width, &masks, packed).unwrap(), values);
    }

    #[test]
    fn unpack_then_pack(packed in any::<u32>(), masks in partition(32)) {
        let values = unpack(&masks, packed).unwrap();
        prop_assert_eq!(pack(&masks, &values).unwrap(), packed);
    }
}
