//! Cursor-based binary encoder and decoder.
//!
//! [`Decoder`] reads and [`Encoder`] writes fixed-width values (integers, floats, booleans, byte
//! arrays and strings) at a movable offset in a byte buffer, in little-endian or big-endian
//! byte order. Both implement [`Cursor`], which also provides scoped changes of the offset and
//! byte order.
//!
//! Two features go beyond plain reads and writes:
//!
//! * Bit-masked integers. An unsigned integer can be read as, or written from, several
//!   sub-fields of caller-chosen widths. See [`bitmask`].
//! * Dynamic sizing. Inside a dynamic-sizing scope the encoder grows its buffer in chunks as
//!   writes need it, and crops it to the bytes actually written when the scope closes. See
//!   [`Encoder::build`] and [`Encoder::with_dynamic_size`].
//!
//! ```
//! use binary_cursor::{Decoder, Encoder, Endian, DynamicOptions};
//!
//! let bytes = Encoder::build(DynamicOptions::default().with_endian(Endian::Big), |e| {
//!     e.write_u16(0x0102)?;
//!     e.write_u8_masked(&[1, 7], &[1, 100])?;
//!     e.write_terminated_str("hi")
//! })
//! .unwrap();
//! assert_eq!(bytes, [0x01, 0x02, 228, b'h', b'i', 0]);
//!
//! let mut d = Decoder::with_endian(&bytes, Endian::Big);
//! assert_eq!(d.read_u16(), Ok(0x0102));
//! assert_eq!(d.read_u8_masked(&[1, 7]), Ok(vec![1, 100]));
//! assert_eq!(d.read_terminated_str(), Ok("hi"));
//! ```
//!
//! With the default `std` feature disabled the crate is `no_std`, but still requires `alloc`.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![forbid(unused_must_use)]
#![warn(missing_docs)]

extern crate alloc;

pub mod bitmask;
mod cursor;
mod decoder;
mod encoder;
mod encoding;
mod error;
mod primitive;


pub use bitmask::PackedInt;
pub use cursor::{Cursor, Endian, EndianGuard, OffsetGuard};
pub use decoder::Decoder;
pub use encoder::{DynamicOptions, DynamicScope, Encoder, Storage, DEFAULT_CHUNK_SIZE};
pub use encoding::{Encoding, UnknownEncoding};
pub use error::{Error, ErrorKind, MaskError, Result};
pub use primitive::Primitive;
