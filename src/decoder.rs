use crate::bitmask::{self, PackedInt};
use crate::cursor::{self, Cursor, Endian};
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use alloc::string::String;
use alloc::vec::Vec;

/// Reads values from a slice of bytes.
///
/// The decoder keeps an offset into `data` and a byte order. Every read starts at the offset
/// and advances it by the number of bytes consumed. A read that would run past the end of
/// `data` (or that starts at a negative offset) fails with [`Error::OutOfBounds`] and leaves
/// the offset where it was.
///
/// Reads never copy more than they must. [`Decoder::read_bytes`], [`Decoder::read_str`] and
/// the `read_terminated_*` functions return slices of `data`.
#[derive(Clone, Debug)]
pub struct Decoder<'a> {
    data: &'a [u8],
    offset: isize,
    endian: Endian,
}

impl<'a> Decoder<'a> {
    /// Constructor. Starts at offset 0, little-endian.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: 0,
            endian: Endian::Little,
        }
    }

    /// Creates a decoder that uses the given byte order.
    pub fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            offset: 0,
            endian,
        }
    }

    /// Moves the starting offset to `offset`.
    pub fn starting_at(mut self, offset: isize) -> Self {
        self.offset = offset;
        self
    }

    /// The whole input buffer.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The bytes from the current offset to the end of the buffer. Empty when out of bounds.
    pub fn remaining_data(&self) -> &'a [u8] {
        match usize::try_from(self.offset) {
            Ok(o) if o < self.data.len() => &self.data[o..],
            _ => &[],
        }
    }

    /// Reads a slice of bytes whose length is `len`. This function returns a slice reference
    /// to the bytes; it does not copy them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let range = cursor::span(self.offset, len, self.data.len())?;
        cursor::advance(&mut self.offset, len);
        Ok(&self.data[range])
    }

    /// Reads a small array of bytes, with a constant length.
    #[inline(always)]
    pub fn read_cbytes<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Reads any [`Primitive`] value in the current byte order.
    #[inline(always)]
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        let mut bytes = T::Bytes::default();
        bytes.as_mut().copy_from_slice(self.read_bytes(T::SIZE)?);
        Ok(T::from_bytes(bytes, self.endian))
    }

    /// Reads a single `u8` value.
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read()
    }

    /// Reads a `u16` in the current byte order.
    pub fn read_u16(&mut self) -> Result<u16> {
        self.read()
    }

    /// Reads a `u32` in the current byte order.
    pub fn read_u32(&mut self) -> Result<u32> {
        self.read()
    }

    /// Reads a `u64` in the current byte order.
    pub fn read_u64(&mut self) -> Result<u64> {
        self.read()
    }

    /// Reads a single `i8` value.
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read()
    }

    /// Reads a `i16` in the current byte order.
    pub fn read_i16(&mut self) -> Result<i16> {
        self.read()
    }

    /// Reads a `i32` in the current byte order.
    pub fn read_i32(&mut self) -> Result<i32> {
        self.read()
    }

    /// Reads a `i64` in the current byte order.
    pub fn read_i64(&mut self) -> Result<i64> {
        self.read()
    }

    /// Reads an IEEE 754 single-precision value in the current byte order.
    pub fn read_f32(&mut self) -> Result<f32> {
        self.read()
    }

    /// Reads an IEEE 754 double-precision value in the current byte order.
    pub fn read_f64(&mut self) -> Result<f64> {
        self.read()
    }

    /// Reads a one-byte boolean. Any nonzero byte is `true`.
    pub fn read_bool(&mut self) -> Result<bool> {
        self.read()
    }

    /// Reads an unsigned integer and splits it into sub-fields, one per mask.
    ///
    /// The first element of the result holds the most significant bits. The offset advances
    /// by the width of `T`, as for an unmasked read. The partition is validated before
    /// anything is read; see [`bitmask::validate_masks`].
    pub fn read_masked<T: PackedInt + Primitive>(&mut self, masks: &[u32]) -> Result<Vec<T>> {
        bitmask::validate_masks(T::BITS, masks)?;
        let packed: T = self.read()?;
        Ok(bitmask::unpack(masks, packed)?)
    }

    /// Reads a `u8` split into sub-fields. See [`Decoder::read_masked`].
    pub fn read_u8_masked(&mut self, masks: &[u32]) -> Result<Vec<u8>> {
        self.read_masked(masks)
    }

    /// Reads a `u16` split into sub-fields. See [`Decoder::read_masked`].
    pub fn read_u16_masked(&mut self, masks: &[u32]) -> Result<Vec<u16>> {
        self.read_masked(masks)
    }

    /// Reads a `u32` split into sub-fields. See [`Decoder::read_masked`].
    pub fn read_u32_masked(&mut self, masks: &[u32]) -> Result<Vec<u32>> {
        self.read_masked(masks)
    }

    /// Reads a `u64` split into sub-fields. See [`Decoder::read_masked`].
    pub fn read_u64_masked(&mut self, masks: &[u32]) -> Result<Vec<u64>> {
        self.read_masked(masks)
    }

    /// Reads `len` bytes and returns them as `&str`.
    ///
    /// This does not copy any data. If the bytes are not well-formed UTF-8, this fails with
    /// [`Error::Undecodable`] and the offset is not advanced.
    pub fn read_str(&mut self, len: usize) -> Result<&'a str> {
        let range = cursor::span(self.offset, len, self.data.len())?;
        let s = core::str::from_utf8(&self.data[range]).map_err(|_| Error::Undecodable {
            encoding: Encoding::Utf8,
        })?;
        cursor::advance(&mut self.offset, len);
        Ok(s)
    }

    /// Reads `len` bytes and decodes them as text in the given encoding.
    ///
    /// If the bytes are not valid in `encoding`, this fails with [`Error::Undecodable`] and the
    /// offset is not advanced.
    pub fn read_string(&mut self, len: usize, encoding: Encoding) -> Result<String> {
        let range = cursor::span(self.offset, len, self.data.len())?;
        let s = encoding.decode(&self.data[range])?;
        cursor::advance(&mut self.offset, len);
        Ok(s)
    }

    /// Reads a `len`-byte slice as `bstr::BStr`.
    ///
    /// The caller must handle validating that the string is well-formed UTF-8, if necessary.
    #[cfg(feature = "bstr")]
    pub fn read_bstr(&mut self, len: usize) -> Result<&'a bstr::BStr> {
        Ok(bstr::BStr::new(self.read_bytes(len)?))
    }

    /// Reads the bytes up to the next zero byte, and consumes the zero byte.
    ///
    /// The returned slice does not include the terminator. The offset advances by the length of
    /// the slice plus one. If the buffer ends before a zero byte is found, this fails with
    /// [`Error::MissingTerminator`] and the offset is not advanced.
    pub fn read_terminated_bytes(&mut self) -> Result<&'a [u8]> {
        let start = cursor::span(self.offset, 1, self.data.len())?.start;
        let Some(len) = self.data[start..].iter().position(|&b| b == 0) else {
            return Err(Error::MissingTerminator {
                offset: self.offset,
            });
        };
        cursor::advance(&mut self.offset, len + 1);
        Ok(&self.data[start..start + len])
    }

    /// Reads a null-terminated UTF-8 string. See [`Decoder::read_terminated_bytes`].
    pub fn read_terminated_str(&mut self) -> Result<&'a str> {
        let saved = self.offset;
        let bytes = self.read_terminated_bytes()?;
        core::str::from_utf8(bytes).map_err(|_| {
            self.offset = saved;
            Error::Undecodable {
                encoding: Encoding::Utf8,
            }
        })
    }

    /// Reads a null-terminated string and decodes it in the given encoding. See
    /// [`Decoder::read_terminated_bytes`].
    pub fn read_terminated_string(&mut self, encoding: Encoding) -> Result<String> {
        let saved = self.offset;
        let bytes = self.read_terminated_bytes()?;
        encoding.decode(bytes).inspect_err(|_| self.offset = saved)
    }

    /// Reads a null-terminated string as `bstr::BStr`. See [`Decoder::read_terminated_bytes`].
    #[cfg(feature = "bstr")]
    pub fn read_terminated_bstr(&mut self) -> Result<&'a bstr::BStr> {
        Ok(bstr::BStr::new(self.read_terminated_bytes()?))
    }
}

impl Cursor for Decoder<'_> {
    fn buffer_len(&self) -> usize {
        self.data.len()
    }

    fn offset(&self) -> isize {
        self.offset
    }

    fn seek(&mut self, offset: isize) {
        self.offset = offset;
    }

    fn endian(&self) -> Endian {
        self.endian
    }

    fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }
}
