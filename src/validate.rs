//! Structure-only validation (§4.8): answers "is this a valid compressed blob" without producing
//! any output.
//!
//! [`NullSink`] tracks the logical output position the same way [`crate::sink::SliceSink`] and
//! [`crate::sink::ScatterSink`] do, but never actually allocates or writes `U` bytes -- §7
//! requires that validating a buffer with a pathological declared length not itself perform a
//! large allocation.

use crate::decompress::decompress_tokens;
use crate::sink::Sink;
use crate::varint::decode_varint;

/// A [`Sink`] that discards every write, used only to track the logical output position.
pub(crate) struct NullSink {
    pos: usize,
    capacity: usize,
}

impl Sink for NullSink {
    #[inline]
    fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    fn byte_at(&self, _pos: usize) -> u8 {
        // Called for the offset==1 self-overlapping-copy fast path, but a null sink never wrote
        // any real bytes to read back; any value is fine since nothing is written here either.
        0
    }

    #[inline]
    fn extend_from_slice(&mut self, data: &[u8]) {
        self.pos += data.len();
    }

    #[inline]
    fn extend_with_fill(&mut self, _byte: u8, len: usize) {
        self.pos += len;
    }

    #[inline]
    fn extend_from_within(&mut self, _start: usize, len: usize) {
        self.pos += len;
    }

    #[inline]
    fn extend_from_within_overlapping(&mut self, _start: usize, len: usize) {
        self.pos += len;
    }
}

/// Returns whether `input` is a structurally valid compressed blob: the token stream decodes to
/// exactly the declared length with no overrun or invalid offset, and no bytes are left over.
///
/// This never allocates an output buffer, so it's safe to call on a buffer whose declared length
/// is a deliberately huge, attacker-controlled value (§7, S8).
pub fn is_valid_compressed(input: &[u8]) -> bool {
    let Ok((len, consumed)) = decode_varint(input) else {
        return false;
    };
    let mut sink = NullSink {
        pos: 0,
        capacity: len as usize,
    };
    decompress_tokens(&input[consumed..], &mut sink, len as usize).is_ok()
}
