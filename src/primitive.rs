use crate::cursor::Endian;
use zerocopy::byteorder::{BE, F32, F64, I16, I32, I64, LE, U16, U32, U64};

/// A fixed-width value that can be read from or written to a buffer in either byte order.
pub trait Primitive: Copy {
    /// Encoded width, in bytes.
    const SIZE: usize;

    /// The encoded form of the value. Always `[u8; Self::SIZE]`.
    type Bytes: AsRef<[u8]> + AsMut<[u8]> + Default;

    /// Decodes a value from its encoded form.
    fn from_bytes(bytes: Self::Bytes, endian: Endian) -> Self;

    /// Encodes a value.
    fn to_bytes(self, endian: Endian) -> Self::Bytes;
}

impl Primitive for u8 {
    const SIZE: usize = 1;
    type Bytes = [u8; 1];

    #[inline(always)]
    fn from_bytes(bytes: [u8; 1], _endian: Endian) -> Self {
        bytes[0]
    }

    #[inline(always)]
    fn to_bytes(self, _endian: Endian) -> [u8; 1] {
        [self]
    }
}

impl Primitive for i8 {
    const SIZE: usize = 1;
    type Bytes = [u8; 1];

    #[inline(always)]
    fn from_bytes(bytes: [u8; 1], _endian: Endian) -> Self {
        bytes[0] as i8
    }

    #[inline(always)]
    fn to_bytes(self, _endian: Endian) -> [u8; 1] {
        [self as u8]
    }
}

/// Any nonzero byte decodes as `true`. `true` is encoded as 1.
impl Primitive for bool {
    const SIZE: usize = 1;
    type Bytes = [u8; 1];

    #[inline(always)]
    fn from_bytes(bytes: [u8; 1], _endian: Endian) -> Self {
        bytes[0] != 0
    }

    #[inline(always)]
    fn to_bytes(self, _endian: Endian) -> [u8; 1] {
        [self as u8]
    }
}

macro_rules! byte_ordered {
    ($($ty:ty => $wire:ident, $size:literal;)*) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = $size;
                type Bytes = [u8; $size];

                #[inline(always)]
                fn from_bytes(bytes: [u8; $size], endian: Endian) -> Self {
                    match endian {
                        Endian::Little => $wire::<LE>::from_bytes(bytes).get(),
                        Endian::Big => $wire::<BE>::from_bytes(bytes).get(),
                    }
                }

                #[inline(always)]
                fn to_bytes(self, endian: Endian) -> [u8; $size] {
                    match endian {
                        Endian::Little => $wire::<LE>::new(self).to_bytes(),
                        Endian::Big => $wire::<BE>::new(self).to_bytes(),
                    }
                }
            }
        )*
    };
}

byte_ordered! {
    u16 => U16, 2;
    u32 => U32, 4;
    u64 => U64, 8;
    i16 => I16, 2;
    i32 => I32, 4;
    i64 => I64, 8;
    f32 => F32, 4;
    f64 => F64, 8;
}
