use crate::error::{Error, Result};
use alloc::string::String;
use alloc::vec::Vec;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use core::fmt;
use core::str::FromStr;
use zerocopy::byteorder::{LE, U16};
use zerocopy::FromBytes;

/// Text encoding used by the string reads and writes of [`crate::Decoder`] and
/// [`crate::Encoder`].
///
/// Reading turns bytes into text and writing turns text into bytes. For `Base64` and `Hex`,
/// the text is the textual form of the bytes: writing `"AQID"` as `Base64` writes the three
/// bytes `[1, 2, 3]`, and reading those three bytes back as `Base64` returns `"AQID"`.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default, Hash)]
pub enum Encoding {
    /// UTF-8.
    #[default]
    Utf8,
    /// UTF-16, little-endian code units.
    Utf16Le,
    /// ISO-8859-1. Each byte is one character in `U+0000..=U+00FF`.
    Latin1,
    /// Standard base64 alphabet, with padding.
    Base64,
    /// Lowercase hexadecimal. Decoding also accepts uppercase.
    Hex,
}

impl Encoding {
    /// Converts `text` into the bytes that represent it in this encoding.
    pub fn encode(self, text: &str) -> Result<Vec<u8>> {
        let unencodable = || Error::Unencodable { encoding: self };
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16Le => Ok(text
                .encode_utf16()
                .flat_map(|unit| unit.to_le_bytes())
                .collect()),
            Self::Latin1 => text
                .chars()
                .map(|c| u8::try_from(c).map_err(|_| unencodable()))
                .collect(),
            Self::Base64 => STANDARD.decode(text).map_err(|_| unencodable()),
            Self::Hex => hex::decode(text).map_err(|_| unencodable()),
        }
    }

    /// Converts `bytes` into text according to this encoding.
    pub fn decode(self, bytes: &[u8]) -> Result<String> {
        let undecodable = || Error::Undecodable { encoding: self };
        match self {
            Self::Utf8 => core::str::from_utf8(bytes)
                .map(String::from)
                .map_err(|_| undecodable()),
            Self::Utf16Le => {
                let units = <[U16<LE>]>::ref_from_bytes(bytes).map_err(|_| undecodable())?;
                char::decode_utf16(units.iter().map(|unit| unit.get()))
                    .collect::<core::result::Result<String, _>>()
                    .map_err(|_| undecodable())
            }
            Self::Latin1 => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Base64 => Ok(STANDARD.encode(bytes)),
            Self::Hex => Ok(hex::encode(bytes)),
        }
    }

    /// The canonical name of this encoding, as accepted by `FromStr`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf8",
            Self::Utf16Le => "utf16le",
            Self::Latin1 => "latin1",
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unknown encoding name.
#[derive(Clone, Eq, PartialEq, Debug, thiserror::Error)]
#[error("unknown text encoding {0:?}")]
pub struct UnknownEncoding(pub String);

impl FromStr for Encoding {
    type Err = UnknownEncoding;

    /// Parses an encoding name. Names are case-insensitive.
    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let encoding = match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Self::Utf8,
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Self::Utf16Le,
            "latin1" | "binary" => Self::Latin1,
            "base64" => Self::Base64,
            "hex" => Self::Hex,
            _ => return Err(UnknownEncoding(String::from(s))),
        };
        Ok(encoding)
    }
}
