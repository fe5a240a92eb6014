//! Error type returned by decompression and validation.

use core::fmt;

/// An error produced while decompressing, validating, or compressing a Snappy buffer.
///
/// Every variant but [`Error::InputTooLarge`] and [`Error::SegmentLengthMismatch`] corresponds to
/// a distinct way a compressed buffer can fail to be a valid Snappy stream; callers who don't
/// care about the distinction can match on `Err(_)` and treat it as "corrupt".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The input ended while the leading length varint still expected more bytes.
    TruncatedVarint,
    /// The length varint used its full 5 bytes and the 5th byte still had its continuation bit
    /// set.
    UnterminatedVarint,
    /// The length varint decodes to a value that doesn't fit in 32 bits.
    OverflowingVarint,
    /// A tag byte was read but its trailing bytes extend past the end of the input.
    TruncatedToken,
    /// A literal's declared length runs past the end of the input or past the declared
    /// uncompressed length.
    LiteralOverrun,
    /// A copy's declared length would write past the declared uncompressed length.
    CopyOverrun,
    /// A copy's offset is zero, or points before the start of the output.
    BadOffset,
    /// The token stream ended before producing the declared uncompressed length.
    ShortStream,
    /// Bytes remain in the input after the declared uncompressed length was reached.
    TrailingGarbage,
    /// The declared uncompressed length exceeds a caller-supplied budget.
    OutputBudgetExceeded,
    /// `compress`/`compress_from_segments` was given more than `u32::MAX` bytes of input; the
    /// wire format has no way to represent that length.
    InputTooLarge,
    /// `decompress_to_segments` was given a segment list whose total length is smaller than the
    /// buffer's declared uncompressed length.
    SegmentLengthMismatch {
        /// Declared uncompressed length, from the varint header.
        expected: usize,
        /// Sum of the lengths of the segments the caller supplied.
        actual: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::TruncatedVarint => f.write_str("input ended inside the length varint"),
            Error::UnterminatedVarint => {
                f.write_str("length varint used 5 bytes and still had its continuation bit set")
            }
            Error::OverflowingVarint => {
                f.write_str("length varint decodes to a value that doesn't fit in 32 bits")
            }
            Error::TruncatedToken => {
                f.write_str("a token's trailing bytes run past the end of the input")
            }
            Error::LiteralOverrun => {
                f.write_str("a literal's length runs past the input or the declared output size")
            }
            Error::CopyOverrun => {
                f.write_str("a copy's length would write past the declared output size")
            }
            Error::BadOffset => f.write_str("a copy's offset is zero or points before the output"),
            Error::ShortStream => {
                f.write_str("the token stream ended before reaching the declared length")
            }
            Error::TrailingGarbage => {
                f.write_str("extra bytes follow the token stream after the declared length")
            }
            Error::OutputBudgetExceeded => {
                f.write_str("the declared uncompressed length exceeds the caller's budget")
            }
            Error::InputTooLarge => f.write_str("input is larger than u32::MAX bytes"),
            Error::SegmentLengthMismatch { expected, actual } => write!(
                f,
                "segments total {} bytes, less than the {} bytes the buffer declares",
                actual, expected,
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
