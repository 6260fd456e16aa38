use crate::error::{Error, Result};
use core::ops::{Deref, DerefMut, Range};

/// Byte order used for multi-byte numeric values.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

/// Position and byte-order tracking shared by [`crate::Decoder`] and [`crate::Encoder`].
///
/// The offset is a signed byte position relative to the start of the buffer. Moving it never
/// fails; an offset that is negative or past the end of the buffer is only reported when the
/// next read or write is attempted.
pub trait Cursor {
    /// Length of the underlying buffer, in bytes.
    fn buffer_len(&self) -> usize;

    /// The current offset.
    fn offset(&self) -> isize;

    /// Moves the offset to `offset`. No bounds check is done here.
    fn seek(&mut self, offset: isize);

    /// The byte order used by multi-byte reads and writes.
    fn endian(&self) -> Endian;

    /// Changes the byte order. Only affects reads and writes issued after the change.
    fn set_endian(&mut self, endian: Endian);

    /// Moves the offset by `delta` bytes, forwards or backwards.
    fn skip(&mut self, delta: isize) {
        self.seek(self.offset().saturating_add(delta));
    }

    /// Number of bytes between the current offset and the end of the buffer.
    ///
    /// Returns 0 if the cursor is out of bounds.
    fn clearance(&self) -> usize {
        clearance(self.offset(), self.buffer_len())
    }

    /// Returns `true` if `bytes` bytes can be read or written at the current offset.
    fn has_clearance(&self, bytes: usize) -> bool {
        self.has_clearance_at(bytes, self.offset())
    }

    /// Returns `true` if `from` lies inside the buffer and `from + bytes` does not pass its end.
    fn has_clearance_at(&self, bytes: usize, from: isize) -> bool {
        has_clearance(from, bytes, self.buffer_len())
    }

    /// Returns `true` if the offset does not address a byte of the buffer.
    fn is_out_of_bounds(&self) -> bool {
        !usize::try_from(self.offset()).is_ok_and(|o| o < self.buffer_len())
    }

    /// Moves the offset to `offset` until the returned guard is dropped.
    fn offset_guard(&mut self, offset: isize) -> OffsetGuard<'_, Self>
    where
        Self: Sized,
    {
        let saved = self.offset();
        self.seek(offset);
        OffsetGuard {
            cursor: self,
            saved,
        }
    }

    /// Switches to `endian` until the returned guard is dropped.
    fn endian_guard(&mut self, endian: Endian) -> EndianGuard<'_, Self>
    where
        Self: Sized,
    {
        let saved = self.endian();
        self.set_endian(endian);
        EndianGuard {
            cursor: self,
            saved,
        }
    }

    /// Runs `f` with the offset temporarily moved to `offset`.
    ///
    /// The previous offset is restored when `f` returns, whatever it returns, and also if it
    /// panics.
    fn with_offset<R>(&mut self, offset: isize, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut guard = self.offset_guard(offset);
        f(&mut *guard)
    }

    /// Runs `f` with the byte order temporarily set to `endian`.
    ///
    /// The previous byte order is restored when `f` returns, whatever it returns, and also if
    /// it panics.
    fn with_endian<R>(&mut self, endian: Endian, f: impl FnOnce(&mut Self) -> R) -> R
    where
        Self: Sized,
    {
        let mut guard = self.endian_guard(endian);
        f(&mut *guard)
    }
}

/// Restores a cursor's offset when dropped. Created by [`Cursor::offset_guard`].
pub struct OffsetGuard<'c, C: Cursor> {
    cursor: &'c mut C,
    saved: isize,
}

impl<C: Cursor> Deref for OffsetGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.cursor
    }
}

impl<C: Cursor> DerefMut for OffsetGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.cursor
    }
}

impl<C: Cursor> Drop for OffsetGuard<'_, C> {
    fn drop(&mut self) {
        self.cursor.seek(self.saved);
    }
}

/// Restores a cursor's byte order when dropped. Created by [`Cursor::endian_guard`].
pub struct EndianGuard<'c, C: Cursor> {
    cursor: &'c mut C,
    saved: Endian,
}

impl<C: Cursor> Deref for EndianGuard<'_, C> {
    type Target = C;

    fn deref(&self) -> &C {
        self.cursor
    }
}

impl<C: Cursor> DerefMut for EndianGuard<'_, C> {
    fn deref_mut(&mut self) -> &mut C {
        self.cursor
    }
}

impl<C: Cursor> Drop for EndianGuard<'_, C> {
    fn drop(&mut self) {
        self.cursor.set_endian(self.saved);
    }
}

pub(crate) fn clearance(offset: isize, len: usize) -> usize {
    match usize::try_from(offset) {
        Ok(o) if o < len => len - o,
        _ => 0,
    }
}

pub(crate) fn has_clearance(from: isize, bytes: usize, len: usize) -> bool {
    match usize::try_from(from) {
        Ok(from) => from < len && bytes <= len - from,
        Err(_) => false,
    }
}

/// Locates `bytes` bytes at `offset` in a buffer of `len` bytes.
///
/// An empty span is accepted anywhere in `0..=len`.
pub(crate) fn span(offset: isize, bytes: usize, len: usize) -> Result<Range<usize>> {
    if let Ok(start) = usize::try_from(offset) {
        if has_clearance(offset, bytes, len) || (bytes == 0 && start <= len) {
            return Ok(start..start + bytes);
        }
    }
    Err(Error::OutOfBounds {
        offset,
        requested: bytes,
        available: clearance(offset, len),
    })
}

/// Advances `offset` past a span of `bytes` bytes that [`span`] has already accepted.
pub(crate) fn advance(offset: &mut isize, bytes: usize) {
    // A successful span lies within the buffer, and a buffer cannot exceed isize::MAX bytes.
    *offset += bytes as isize;
}
