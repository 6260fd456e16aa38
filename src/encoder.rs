use crate::bitmask::{self, PackedInt};
use crate::cursor::{self, Cursor, Endian};
use crate::decoder::Decoder;
use crate::encoding::Encoding;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::{Deref, DerefMut, Range};
use log::{debug, trace, warn};

/// Number of bytes a dynamically sized buffer grows by, unless configured otherwise.
pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Backing storage of an [`Encoder`].
///
/// Storage with a fixed capacity (`&mut [u8]`, `[u8; N]`) uses the default implementations.
/// Resizable storage (`Vec<u8>`, `Box<[u8]>`) can also be used for dynamically sized writes.
pub trait Storage: AsRef<[u8]> + AsMut<[u8]> {
    /// Returns `true` if [`Storage::try_resize`] can change the length of this storage.
    fn is_resizable(&self) -> bool {
        false
    }

    /// Changes the length of the storage to `new_len` bytes, keeping the bytes below
    /// `min(len, new_len)` and zero-filling any new bytes. Returns `false`, and changes
    /// nothing, if the storage has a fixed capacity or the memory cannot be allocated.
    fn try_resize(&mut self, _new_len: usize) -> bool {
        false
    }
}

impl Storage for Vec<u8> {
    fn is_resizable(&self) -> bool {
        true
    }

    fn try_resize(&mut self, new_len: usize) -> bool {
        if let Some(extra) = new_len.checked_sub(self.len()) {
            if self.try_reserve(extra).is_err() {
                return false;
            }
        }
        self.resize(new_len, 0);
        true
    }
}

/// Resizing replaces the boxed slice with a new allocation.
impl Storage for Box<[u8]> {
    fn is_resizable(&self) -> bool {
        true
    }

    fn try_resize(&mut self, new_len: usize) -> bool {
        let mut bytes = core::mem::take(self).into_vec();
        let resized = bytes.try_resize(new_len);
        *self = bytes.into_boxed_slice();
        resized
    }
}

impl Storage for &mut [u8] {}

impl<const N: usize> Storage for [u8; N] {}

/// State of an open dynamic-sizing scope.
#[derive(Clone, Debug)]
struct Sizing {
    chunk_size: usize,
    /// The buffer is never cropped below this length.
    floor: usize,
    /// End of the furthest write made during the scope.
    high_water: usize,
}

/// Writes values into a byte buffer.
///
/// The encoder keeps an offset into its storage and a byte order. Every write starts at the
/// offset and advances it by the number of bytes written. Normally a write that would run past
/// the end of the storage fails with [`Error::OutOfBounds`], without modifying anything.
///
/// Inside a dynamic-sizing scope (see [`Encoder::with_dynamic_size`] and [`Encoder::build`])
/// the storage instead grows in whole chunks as writes need it, and is cropped back to the
/// bytes actually written when the scope closes. Growing and cropping may move the storage to
/// a new allocation, so any slice obtained from [`Encoder::get_ref`] before or during the scope
/// must be fetched again afterwards.
///
/// Two coders may work over the same bytes, for instance an `Encoder` and the `Decoder`
/// returned by [`Encoder::decoder`]. Nothing inside this type synchronizes such uses; the
/// borrow checker, or the caller, must keep them apart.
#[derive(Debug)]
pub struct Encoder<B = Vec<u8>> {
    buf: B,
    offset: isize,
    endian: Endian,
    sizing: Option<Sizing>,
}

impl<B: Storage> Encoder<B> {
    /// Creates an encoder that writes into `buf`, starting at offset 0, little-endian.
    pub fn wrap(buf: B) -> Self {
        Self {
            buf,
            offset: 0,
            endian: Endian::Little,
            sizing: None,
        }
    }

    /// Creates an encoder that writes into `buf` using the given byte order.
    pub fn wrap_with_endian(buf: B, endian: Endian) -> Self {
        Self {
            endian,
            ..Self::wrap(buf)
        }
    }

    /// Moves the starting offset to `offset`.
    pub fn starting_at(mut self, offset: isize) -> Self {
        self.offset = offset;
        self
    }

    /// Accesses the bytes of the buffer.
    pub fn get_ref(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Mutably accesses the bytes of the buffer.
    pub fn get_mut(&mut self) -> &mut [u8] {
        self.buf.as_mut()
    }

    /// Extracts the inner buffer
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Creates a decoder over the bytes of this encoder, at the encoder's current offset and
    /// byte order.
    pub fn decoder(&self) -> Decoder<'_> {
        Decoder::with_endian(self.buf.as_ref(), self.endian).starting_at(self.offset)
    }

    /// Returns `true` while a dynamic-sizing scope is open.
    pub fn is_dynamic(&self) -> bool {
        self.sizing.is_some()
    }

    /// Claims `bytes` bytes at the current offset, growing the buffer first if a
    /// dynamic-sizing scope is open.
    ///
    /// The high-water mark only moves once the span has been claimed, so a failed write never
    /// changes the length the buffer is cropped to.
    fn reserve(&mut self, bytes: usize) -> Result<Range<usize>> {
        let len = self.buf.as_ref().len();
        if let Some(sizing) = &self.sizing {
            if let Some(new_len) = grown_len(self.offset, bytes, len, sizing.chunk_size) {
                trace!(
                    "growing buffer from {len} to {new_len} bytes (chunk size {})",
                    sizing.chunk_size
                );
                if !self.buf.try_resize(new_len) {
                    debug!("storage refused to grow from {len} to {new_len} bytes");
                    return Err(Error::OutOfBounds {
                        offset: self.offset,
                        requested: bytes,
                        available: cursor::clearance(self.offset, len),
                    });
                }
            }
        }

        let range = cursor::span(self.offset, bytes, self.buf.as_ref().len())?;
        if let Some(sizing) = &mut self.sizing {
            sizing.high_water = sizing.high_water.max(range.end);
        }
        Ok(range)
    }

    /// Writes `bytes` to the output.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let range = self.reserve(bytes.len())?;
        self.buf.as_mut()[range].copy_from_slice(bytes);
        cursor::advance(&mut self.offset, bytes.len());
        Ok(())
    }

    /// Writes a small, fixed-size array of bytes.
    pub fn write_cbytes<const N: usize>(&mut self, value: [u8; N]) -> Result<()> {
        self.write_bytes(&value)
    }

    /// Writes any [`Primitive`] value in the current byte order.
    #[inline(always)]
    pub fn write<T: Primitive>(&mut self, value: T) -> Result<()> {
        self.write_bytes(value.to_bytes(self.endian).as_ref())
    }

    /// Writes a single `u8` value
    pub fn write_u8(&mut self, value: u8) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `u16` value
    pub fn write_u16(&mut self, value: u16) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `u32` value
    pub fn write_u32(&mut self, value: u32) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `u64` value
    pub fn write_u64(&mut self, value: u64) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `i8` value
    pub fn write_i8(&mut self, value: i8) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `i16` value
    pub fn write_i16(&mut self, value: i16) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `i32` value
    pub fn write_i32(&mut self, value: i32) -> Result<()> {
        self.write(value)
    }

    /// Writes a single `i64` value
    pub fn write_i64(&mut self, value: i64) -> Result<()> {
        self.write(value)
    }

    /// Writes an `f32` value, using its 4-byte IEEE 754 representation.
    pub fn write_f32(&mut self, value: f32) -> Result<()> {
        self.write(value)
    }

    /// Writes an `f64` value, using its 8-byte IEEE 754 representation.
    pub fn write_f64(&mut self, value: f64) -> Result<()> {
        self.write(value)
    }

    /// Writes a `bool` value. True is encoded as 1. False is encoded as 0.
    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(value)
    }

    /// Packs `values` into one unsigned integer, one value per mask, and writes it.
    ///
    /// `values[0]` lands in the most significant `masks[0]` bits. The partition and the values
    /// are validated before anything is written; see [`bitmask::pack_bits`].
    pub fn write_masked<T: PackedInt + Primitive>(
        &mut self,
        masks: &[u32],
        values: &[T],
    ) -> Result<()> {
        let packed = bitmask::pack(masks, values)?;
        self.write(packed)
    }

    /// Packs sub-fields into a `u8` and writes it. See [`Encoder::write_masked`].
    pub fn write_u8_masked(&mut self, masks: &[u32], values: &[u8]) -> Result<()> {
        self.write_masked(masks, values)
    }

    /// Packs sub-fields into a `u16` and writes it. See [`Encoder::write_masked`].
    pub fn write_u16_masked(&mut self, masks: &[u32], values: &[u16]) -> Result<()> {
        self.write_masked(masks, values)
    }

    /// Packs sub-fields into a `u32` and writes it. See [`Encoder::write_masked`].
    pub fn write_u32_masked(&mut self, masks: &[u32], values: &[u32]) -> Result<()> {
        self.write_masked(masks, values)
    }

    /// Packs sub-fields into a `u64` and writes it. See [`Encoder::write_masked`].
    pub fn write_u64_masked(&mut self, masks: &[u32], values: &[u64]) -> Result<()> {
        self.write_masked(masks, values)
    }

    /// Writes the UTF-8 bytes of `s`, without a length prefix or terminator.
    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    /// Encodes `s` in the given encoding and writes the result, without a length prefix or
    /// terminator.
    pub fn write_string(&mut self, s: &str, encoding: Encoding) -> Result<()> {
        let bytes = encoding.encode(s)?;
        self.write_bytes(&bytes)
    }

    /// Encodes `s` in the given encoding, writes the result, then writes one zero byte.
    pub fn write_terminated_string(&mut self, s: &str, encoding: Encoding) -> Result<()> {
        self.write_string(s, encoding)?;
        self.write_u8(0)
    }

    /// Writes the UTF-8 bytes of `s` followed by one zero byte.
    pub fn write_terminated_str(&mut self, s: &str) -> Result<()> {
        self.write_str(s)?;
        self.write_u8(0)
    }

    /// Opens a dynamic-sizing scope that stays open until the returned guard is dropped.
    ///
    /// While the scope is open, a write that does not fit grows the buffer by the smallest
    /// multiple of `chunk_size` that makes it fit. Seeking never grows the buffer. When the
    /// guard is dropped, the buffer is cropped to the end of the furthest write made during the
    /// scope, but never below its length when the scope was opened, and the offset is clamped
    /// to the new length.
    ///
    /// Fails with [`Error::InvalidChunkSize`] if `chunk_size` is zero, with
    /// [`Error::AlreadyDynamic`] if a scope is already open and with [`Error::FixedStorage`] if
    /// the storage cannot be resized.
    pub fn dynamic_scope(&mut self, chunk_size: usize) -> Result<DynamicScope<'_, B>> {
        let floor = self.buf.as_ref().len();
        self.open_sizing(chunk_size, floor)?;
        Ok(DynamicScope { encoder: self })
    }

    /// Opens a dynamic-sizing scope whose crop floor is `minimum_size` instead of the current
    /// length of the buffer. See [`Encoder::dynamic_scope`].
    ///
    /// A buffer shorter than `minimum_size` is grown to it before the scope is returned. A
    /// longer one may lose its bytes past `minimum_size` when the scope closes, unless they are
    /// overwritten during the scope.
    ///
    /// Fails with [`Error::InvalidMinimumSize`] if `minimum_size` is zero, and with
    /// [`Error::ResizeFailed`] if the buffer cannot be grown to `minimum_size`.
    pub fn dynamic_scope_with_minimum(
        &mut self,
        chunk_size: usize,
        minimum_size: usize,
    ) -> Result<DynamicScope<'_, B>> {
        DynamicOptions::default()
            .with_chunk_size(chunk_size)
            .with_minimum_size(minimum_size)
            .validate()?;
        self.open_sizing(chunk_size, minimum_size)?;

        if self.buf.as_ref().len() < minimum_size && !self.buf.try_resize(minimum_size) {
            self.sizing = None;
            return Err(Error::ResizeFailed { len: minimum_size });
        }
        Ok(DynamicScope { encoder: self })
    }

    /// Runs `f` inside a dynamic-sizing scope. See [`Encoder::dynamic_scope`].
    ///
    /// The scope is closed, and the buffer cropped, even if `f` fails. An error from `f` takes
    /// precedence over a failure to crop.
    pub fn with_dynamic_size<R>(
        &mut self,
        chunk_size: usize,
        f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let mut scope = self.dynamic_scope(chunk_size)?;
        let result = f(&mut *scope);
        let closed = scope.close();
        let value = result?;
        closed.map(|()| value)
    }

    fn open_sizing(&mut self, chunk_size: usize, floor: usize) -> Result<()> {
        if chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        if self.sizing.is_some() {
            return Err(Error::AlreadyDynamic);
        }
        if !self.buf.is_resizable() {
            return Err(Error::FixedStorage);
        }

        debug!("dynamic sizing opened: chunk size {chunk_size}, floor {floor}");
        self.sizing = Some(Sizing {
            chunk_size,
            floor,
            high_water: 0,
        });
        Ok(())
    }

    fn close_sizing(&mut self) -> Result<()> {
        let Some(sizing) = self.sizing.take() else {
            return Ok(());
        };

        let len = sizing.floor.max(sizing.high_water);
        debug!(
            "dynamic sizing closed: cropping {} bytes to {len} (high water {}, floor {})",
            self.buf.as_ref().len(),
            sizing.high_water,
            sizing.floor
        );
        let cropped = len == self.buf.as_ref().len() || self.buf.try_resize(len);

        let new_len = self.buf.as_ref().len();
        if usize::try_from(self.offset).is_ok_and(|o| o > new_len) {
            self.offset = new_len as isize;
        }

        if cropped {
            Ok(())
        } else {
            Err(Error::ResizeFailed { len })
        }
    }
}

/// Length a buffer of `len` bytes must grow to, in whole chunks, for `bytes` bytes to fit at
/// `offset`. Returns `None` if they already fit, or if they cannot fit in any allocation.
fn grown_len(offset: isize, bytes: usize, len: usize, chunk_size: usize) -> Option<usize> {
    let end = usize::try_from(offset).ok()?.checked_add(bytes)?;
    if end <= len {
        return None;
    }
    let new_len = (end - len)
        .div_ceil(chunk_size)
        .checked_mul(chunk_size)?
        .checked_add(len)?;
    // No allocation exceeds isize::MAX bytes.
    isize::try_from(new_len).is_ok().then_some(new_len)
}

impl Encoder<Vec<u8>> {
    /// Creates a new `Encoder` over an empty `Vec<u8>`.
    ///
    /// Writes fail until a dynamic-sizing scope is opened.
    pub fn new() -> Self {
        Self::wrap(Vec::new())
    }

    /// Creates an encoder over a zero-filled buffer of exactly `len` bytes.
    pub fn with_size(len: usize) -> Self {
        Self::wrap(vec![0; len])
    }

    /// Builds a dynamically sized buffer.
    ///
    /// Allocates `max(chunk_size, minimum_size)` bytes, then runs `builder` inside a
    /// dynamic-sizing scope. Returns the buffer cropped to the end of the furthest write, but
    /// never shorter than `minimum_size`.
    ///
    /// ```
    /// use binary_cursor::{DynamicOptions, Encoder};
    ///
    /// let bytes = Encoder::build(DynamicOptions::default(), |e| e.write_u32(0x12345678)).unwrap();
    /// assert_eq!(bytes, [0x78, 0x56, 0x34, 0x12]);
    /// ```
    pub fn build(
        options: DynamicOptions,
        builder: impl FnOnce(&mut Self) -> Result<()>,
    ) -> Result<Vec<u8>> {
        options.validate()?;

        let minimum = options.minimum_size.unwrap_or(0);
        let initial = vec![0; options.chunk_size.max(minimum)];
        let mut encoder =
            Self::wrap_with_endian(initial, options.endian).starting_at(options.initial_offset);

        encoder.open_sizing(options.chunk_size, minimum)?;
        let result = builder(&mut encoder);
        let closed = encoder.close_sizing();
        result?;
        closed?;

        Ok(encoder.into_inner())
    }
}

impl Default for Encoder<Vec<u8>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Storage> Cursor for Encoder<B> {
    fn buffer_len(&self) -> usize {
        self.buf.as_ref().len()
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

/// An open dynamic-sizing scope. Created by [`Encoder::dynamic_scope`].
///
/// Dereferences to the encoder. Dropping the scope crops the buffer and closes the scope.
pub struct DynamicScope<'e, B: Storage> {
    encoder: &'e mut Encoder<B>,
}

impl<B: Storage> Deref for DynamicScope<'_, B> {
    type Target = Encoder<B>;

    fn deref(&self) -> &Encoder<B> {
        self.encoder
    }
}

impl<B: Storage> DerefMut for DynamicScope<'_, B> {
    fn deref_mut(&mut self) -> &mut Encoder<B> {
        self.encoder
    }
}

impl<B: Storage> DynamicScope<'_, B> {
    /// Closes the scope, cropping the buffer.
    ///
    /// Dropping the scope does the same, but can only log a failure to crop. This reports it as
    /// [`Error::ResizeFailed`]; the scope is closed either way.
    pub fn close(mut self) -> Result<()> {
        self.encoder.close_sizing()
    }
}

impl<B: Storage> Drop for DynamicScope<'_, B> {
    fn drop(&mut self) {
        if let Err(e) = self.encoder.close_sizing() {
            warn!("closing dynamic sizing scope: {e}");
        }
    }
}

/// Options for [`Encoder::build`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct DynamicOptions {
    /// Number of bytes added each time the buffer grows. Must be positive.
    pub chunk_size: usize,
    /// The built buffer is never shorter than this. Must be positive if set.
    pub minimum_size: Option<usize>,
    /// Offset at which the builder starts writing.
    pub initial_offset: isize,
    /// Byte order the builder starts with.
    pub endian: Endian,
}

impl Default for DynamicOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            minimum_size: None,
            initial_offset: 0,
            endian: Endian::Little,
        }
    }
}

impl DynamicOptions {
    /// Sets the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Sets the minimum size of the built buffer.
    pub fn with_minimum_size(mut self, minimum_size: usize) -> Self {
        self.minimum_size = Some(minimum_size);
        self
    }

    /// Sets the offset at which the builder starts writing.
    pub fn with_initial_offset(mut self, initial_offset: isize) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    /// Sets the byte order the builder starts with.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    /// Checks that the chunk size and minimum size are positive.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidChunkSize);
        }
        if self.minimum_size == Some(0) {
            return Err(Error::InvalidMinimumSize);
        }
        Ok(())
    }
}
