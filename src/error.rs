use crate::encoding::Encoding;
use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for `Decoder`, `Encoder` and the bit-mask codec.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum Error {
    /// The requested span does not fit between the cursor's offset and the end of the buffer.
    ///
    /// This is reported before any byte of the buffer is read or modified.
    #[error("requested {requested} bytes at offset {offset}, but only {available} are available")]
    OutOfBounds {
        /// Offset at which the span was requested.
        offset: isize,
        /// Number of bytes requested.
        requested: usize,
        /// Clearance at `offset`.
        available: usize,
    },

    /// A bit partition, or a value packed into it, is malformed.
    #[error("invalid bit mask: {0}")]
    Mask(#[from] MaskError),

    /// A dynamic-sizing chunk size of zero was requested.
    #[error("dynamic sizing chunk size must be positive")]
    InvalidChunkSize,

    /// A dynamic-sizing minimum size of zero was requested.
    #[error("dynamic sizing minimum size must be positive")]
    InvalidMinimumSize,

    /// The text cannot be represented in the requested encoding.
    #[error("the text cannot be encoded as {encoding}")]
    Unencodable {
        /// The requested encoding.
        encoding: Encoding,
    },

    /// A dynamic-sizing scope was opened while another one is still active.
    #[error("dynamic sizing is already active on this encoder")]
    AlreadyDynamic,

    /// A dynamic-sizing scope was opened over storage that cannot be resized.
    #[error("the encoder's storage has a fixed capacity")]
    FixedStorage,

    /// Resizable storage refused to change its length.
    #[error("the encoder's storage could not be resized to {len} bytes")]
    ResizeFailed {
        /// The length that was requested.
        len: usize,
    },

    /// A null-terminated read reached the end of the buffer without finding a zero byte.
    #[error("no null terminator after offset {offset}")]
    MissingTerminator {
        /// Offset at which the read started.
        offset: isize,
    },

    /// The bytes read are not valid in the requested encoding.
    #[error("the data is not valid {encoding}")]
    Undecodable {
        /// The requested encoding.
        encoding: Encoding,
    },
}

/// Broad classification of an [`Error`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ErrorKind {
    /// A read or write exceeded the available clearance.
    Bounds,
    /// An argument (bit partition, packed value, sizing option, text) was rejected.
    Validation,
    /// The encoder was in the wrong state for the operation.
    State,
    /// The input data is malformed.
    Format,
}

impl Error {
    /// Returns the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::OutOfBounds { .. } => ErrorKind::Bounds,
            Self::Mask(_)
            | Self::InvalidChunkSize
            | Self::InvalidMinimumSize
            | Self::Unencodable { .. } => ErrorKind::Validation,
            Self::AlreadyDynamic | Self::FixedStorage | Self::ResizeFailed { .. } => {
                ErrorKind::State
            }
            Self::MissingTerminator { .. } | Self::Undecodable { .. } => ErrorKind::Format,
        }
    }
}

/// Describes which constraint of a bit partition was broken.
#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum MaskError {
    /// Only 8, 16, 32 and 64 bit integers can be packed.
    #[error("unsupported integer width {0}")]
    UnsupportedWidth(u32),

    /// The partition contains no masks.
    #[error("the partition is empty")]
    Empty,

    /// A mask of zero bits was given.
    #[error("mask {index} has a width of zero")]
    ZeroWidth {
        /// Position of the mask in the partition.
        index: usize,
    },

    /// The masks do not add up to the width of the integer.
    #[error("masks add up to {actual} bits, expected {expected}")]
    WidthMismatch {
        /// Width of the packed integer.
        expected: u32,
        /// Sum of the masks.
        actual: u64,
    },

    /// The number of values does not match the number of masks.
    #[error("{values} values were given for {masks} masks")]
    ValueCountMismatch {
        /// Number of masks.
        masks: usize,
        /// Number of values.
        values: usize,
    },

    /// A value does not fit in its mask.
    #[error("value {value} at index {index} does not fit in {mask} bits")]
    ValueOverflow {
        /// Position of the value in the partition.
        index: usize,
        /// The offending value.
        value: u64,
        /// Width of its mask.
        mask: u32,
    },
}
