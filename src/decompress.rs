//! The decompressor: reads the length-prefixed token stream produced by [`crate::compress`] and
//! reconstructs the original bytes into a [`Sink`] (§4.6).
//!
//! The core loop is generic over the output [`Sink`] rather than dynamically dispatched, so the
//! same code monomorphizes into a tight loop for both the contiguous [`SliceSink`] and the
//! segmented [`ScatterSink`] (§9 design note on devirtualization).

use alloc::vec;
use alloc::vec::Vec;

use crate::error::Error;
use crate::sink::{ScatterSink, Sink, SliceSink};
use crate::tag::{TagKind, TAG_TABLE};
use crate::varint::decode_varint;

/// Reads only the leading varint and returns the declared uncompressed length, without touching
/// the rest of the stream.
pub fn get_uncompressed_length(input: &[u8]) -> Result<u32, Error> {
    let (len, _) = decode_varint(input)?;
    Ok(len)
}

/// Decompresses `input` into a freshly allocated `Vec<u8>`.
pub fn decompress(input: &[u8]) -> Result<Vec<u8>, Error> {
    decompress_bounded(input, u32::MAX as usize)
}

/// Decompresses `input`, failing with [`Error::OutputBudgetExceeded`] if the declared
/// uncompressed length exceeds `max_len`. Use this on untrusted input where an attacker-supplied
/// length header must not drive an unbounded allocation (§7, S8).
pub fn decompress_bounded(input: &[u8], max_len: usize) -> Result<Vec<u8>, Error> {
    let (len, consumed) = decode_varint(input)?;
    let len = len as usize;
    if len > max_len {
        return Err(Error::OutputBudgetExceeded);
    }
    let mut output = vec![0u8; len];
    let token_stream = &input[consumed..];
    let mut sink = SliceSink::new(&mut output, 0);
    decompress_tokens(token_stream, &mut sink, len)?;
    Ok(output)
}

/// Decompresses `input` directly into a pre-sized, already-allocated buffer.
pub fn decompress_into(input: &[u8], output: &mut [u8]) -> Result<usize, Error> {
    let (len, consumed) = decode_varint(input)?;
    let len = len as usize;
    if len != output.len() {
        return Err(Error::SegmentLengthMismatch {
            expected: len,
            actual: output.len(),
        });
    }
    let mut sink = SliceSink::new(output, 0);
    decompress_tokens(&input[consumed..], &mut sink, len)?;
    Ok(len)
}

/// Decompresses `input` across an ordered list of fixed-size segments (§4.7 scatter writer).
///
/// The segments' total length must be at least the declared uncompressed length; a caller that
/// hands over exactly `U` bytes of capacity gets every byte written, while a caller pre-allocating
/// from a pool of fixed-size pages (and so over-provisioning) simply leaves the tail of the last
/// segment untouched.
pub fn decompress_to_segments(input: &[u8], segments: &mut [&mut [u8]]) -> Result<(), Error> {
    let (len, consumed) = decode_varint(input)?;
    let len = len as usize;
    let total: usize = segments.iter().map(|s| s.len()).sum();
    if total < len {
        return Err(Error::SegmentLengthMismatch {
            expected: len,
            actual: total,
        });
    }
    let mut sink = ScatterSink::new(segments);
    decompress_tokens(&input[consumed..], &mut sink, len)
}

/// Consumes the token stream in `tokens`, writing exactly `declared_len` bytes to `sink`.
///
/// This is the single implementation shared by every public decompression entry point and by
/// [`crate::validate::is_valid_compressed`] (via [`crate::validate::NullSink`]): the only thing
/// that differs between "decompress" and "validate" is which [`Sink`] is passed in.
pub(crate) fn decompress_tokens<S: Sink>(
    tokens: &[u8],
    sink: &mut S,
    declared_len: usize,
) -> Result<(), Error> {
    let mut ip = 0usize;
    let end = tokens.len();

    while sink.pos() < declared_len {
        let tag = *tokens.get(ip).ok_or(Error::ShortStream)?;
        let entry = &TAG_TABLE[tag as usize];
        ip += 1;

        let extra = entry.extra_bytes as usize;
        if ip + extra > end {
            return Err(Error::TruncatedToken);
        }
        let trailer_bytes = &tokens[ip..ip + extra];
        ip += extra;

        match entry.kind {
            TagKind::Literal => {
                let len = if extra == 0 {
                    entry.len as usize
                } else {
                    (read_le(trailer_bytes) as usize) + 1
                };
                if ip + len > end {
                    return Err(Error::LiteralOverrun);
                }
                #[cfg(feature = "checked-decode")]
                if sink.pos() + len > declared_len {
                    return Err(Error::LiteralOverrun);
                }
                sink.extend_from_slice(&tokens[ip..ip + len]);
                ip += len;
            }
            TagKind::Copy1 | TagKind::Copy2 | TagKind::Copy4 => {
                let len = entry.len as usize;
                let offset = match entry.kind {
                    TagKind::Copy1 => ((entry.offset_high as usize) << 8) | trailer_bytes[0] as usize,
                    _ => read_le(trailer_bytes) as usize,
                };
                if offset == 0 || offset > sink.pos() {
                    return Err(Error::BadOffset);
                }
                #[cfg(feature = "checked-decode")]
                if sink.pos() + len > declared_len {
                    return Err(Error::CopyOverrun);
                }
                let start = sink.pos() - offset;
                if offset >= len {
                    sink.extend_from_within(start, len);
                } else if offset == 1 {
                    // A self-overlapping copy with offset 1 is a run-length fill of the single
                    // preceding byte (§4.6); reading it once and splatting it is cheaper than the
                    // general byte-by-byte overlap loop.
                    sink.extend_with_fill(sink.byte_at(start), len);
                } else {
                    sink.extend_from_within_overlapping(start, len);
                }
            }
        }
    }

    if ip != end {
        return Err(Error::TrailingGarbage);
    }
    Ok(())
}

#[inline]
fn read_le(bytes: &[u8]) -> u32 {
    let mut value = 0u32;
    for (i, &b) in bytes.iter().enumerate() {
        value |= (b as u32) << (8 * i);
    }
    value
}
