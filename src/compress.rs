//! The compressor: a single-pass, fragment-at-a-time match finder and token emitter.
//!
//! Input is split into fragments of at most [`BLOCK_SIZE`] bytes (§4.5). Each fragment is
//! compressed independently against its own hash table (§4.3) by [`compress_fragment`] (§4.4);
//! the decompressor never sees the fragment boundaries, so a stream is just the varint-encoded
//! total length followed by the concatenation of every fragment's tokens.

use alloc::vec::Vec;

use crate::error::Error;
use crate::find_match_length::find_match_length;
use crate::hashtable::HashTable;
use crate::varint::encode_varint;

/// Maximum size of a single fragment compressed against one hash table.
pub const BLOCK_SIZE: usize = 65536;

/// The shortest match the hash table can find; a 4-byte fingerprint is the matching unit.
const MIN_MATCH: usize = 4;

/// Upper bound on the size of `compress(input)` for an input of `len` bytes (§6). Sized so a
/// caller can pre-allocate the output buffer once and never reallocate mid-compression.
#[inline]
pub fn max_compressed_len(len: usize) -> usize {
    32 + len + len / 6
}

/// Compresses `input` into a freshly allocated buffer.
///
/// Fails only if `input` is larger than [`u32::MAX`] bytes -- the wire format's length header
/// can't represent anything bigger.
pub fn compress(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::with_capacity(max_compressed_len(input.len()));
    compress_into(input, &mut out)?;
    Ok(out)
}

/// Compresses `input`, appending the result to `out` (which is not cleared first).
pub fn compress_into(input: &[u8], out: &mut Vec<u8>) -> Result<(), Error> {
    if input.len() > u32::MAX as usize {
        return Err(Error::InputTooLarge);
    }
    encode_varint(out, input.len() as u32);

    let mut table = HashTable::new(input.len().min(BLOCK_SIZE));
    for fragment in input.chunks(BLOCK_SIZE) {
        table.reset(fragment.len());
        compress_fragment(fragment, &mut table, out);
    }
    Ok(())
}

/// `compressFromSegments` (§4.5.1): logically `compress(concat(segments))`, implemented by
/// flattening the segments into one contiguous scratch buffer first. The format has no notion of
/// a multi-segment *compressed* stream, only a multi-segment logical input, so there is no way to
/// compress each segment independently and concatenate the results.
pub fn compress_from_segments(segments: &[&[u8]]) -> Result<Vec<u8>, Error> {
    let total_len: usize = segments.iter().map(|s| s.len()).sum();
    if total_len > u32::MAX as usize {
        return Err(Error::InputTooLarge);
    }
    let mut flattened = Vec::with_capacity(total_len);
    for segment in segments {
        flattened.extend_from_slice(segment);
    }
    compress(&flattened)
}

/// Compresses one fragment (at most [`BLOCK_SIZE`] bytes) into `out`, using `table` as scratch
/// match-finding memory. `table` must already be sized/reset for `fragment.len()`.
pub(crate) fn compress_fragment(fragment: &[u8], table: &mut HashTable, out: &mut Vec<u8>) {
    let len = fragment.len();
    if len < MIN_MATCH {
        if len > 0 {
            emit_literal(out, fragment);
        }
        return;
    }

    // The last position a 4-byte match can start at.
    let limit = len - MIN_MATCH;
    let mut ip = 0usize;
    let mut next_emit = 0usize;
    // Mirrors the reference Snappy skip policy: the stride between hash probes grows the longer
    // we go without a match, trading ratio for throughput on incompressible data.
    let mut skip = 32usize;

    while ip <= limit {
        let fp = fingerprint(fragment, ip);
        let candidate = table.get(fp);
        table.insert(fp, ip);

        if candidate >= ip || !four_byte_match(fragment, candidate, ip) {
            // A hash collision whose prefix doesn't actually match is not an error, just a
            // missed opportunity; skip ahead and try again.
            let step = (skip >> 5).max(1);
            skip += skip >> 5;
            ip += step;
            continue;
        }

        skip = 32;
        emit_literal(out, &fragment[next_emit..ip]);

        let (extra, short) = find_match_length(&fragment[candidate + 4..], &fragment[ip + 4..], len - ip - 4);
        let match_len = MIN_MATCH + extra;
        emit_copy(out, ip - candidate, match_len, short);

        // After emitting a copy, hash the position right after its start so a short
        // near-duplicate match starting inside this one can still be found later.
        let chain_pos = ip + 1;
        if chain_pos + MIN_MATCH <= len {
            table.insert(fingerprint(fragment, chain_pos), chain_pos);
        }

        ip += match_len;
        next_emit = ip;
    }

    if next_emit < len {
        emit_literal(out, &fragment[next_emit..len]);
    }
}

#[inline]
fn four_byte_match(fragment: &[u8], candidate: usize, ip: usize) -> bool {
    fragment[candidate..candidate + 4] == fragment[ip..ip + 4]
}

#[cfg(not(feature = "safe-encode"))]
#[inline]
fn fingerprint(fragment: &[u8], pos: usize) -> u32 {
    debug_assert!(pos + 4 <= fragment.len());
    unsafe {
        let ptr = fragment.as_ptr().add(pos) as *const u32;
        u32::from_le(ptr.read_unaligned())
    }
}

#[cfg(feature = "safe-encode")]
#[inline]
fn fingerprint(fragment: &[u8], pos: usize) -> u32 {
    let bytes: [u8; 4] = fragment[pos..pos + 4].try_into().unwrap();
    u32::from_le_bytes(bytes)
}

/// Appends a LITERAL token (§3) for `literal`, which must be non-empty.
fn emit_literal(out: &mut Vec<u8>, literal: &[u8]) {
    if literal.is_empty() {
        return;
    }
    let n = (literal.len() - 1) as u32;
    if n < 60 {
        out.push((n as u8) << 2);
    } else {
        let mut buf = [0u8; 4];
        let nbytes = encode_length_bytes(n, &mut buf);
        out.push(((59 + nbytes) as u8) << 2);
        out.extend_from_slice(&buf[..nbytes]);
    }
    out.extend_from_slice(literal);
}

/// Encodes `n` into the minimum number of little-endian bytes (1 to 4) that represent it.
fn encode_length_bytes(n: u32, buf: &mut [u8; 4]) -> usize {
    if n < (1 << 8) {
        buf[0] = n as u8;
        1
    } else if n < (1 << 16) {
        buf[..2].copy_from_slice(&(n as u16).to_le_bytes());
        2
    } else if n < (1 << 24) {
        buf[..3].copy_from_slice(&n.to_le_bytes()[..3]);
        3
    } else {
        *buf = n.to_le_bytes();
        4
    }
}

/// Appends one or more copy tokens (§3) totalling `len` bytes at `offset`. `offset` must be
/// within the COPY_4 range; the fragment compressor only ever produces offsets that fit in
/// COPY_1/COPY_2 since a fragment is at most [`BLOCK_SIZE`] bytes.
///
/// `short` is [`find_match_length`]'s hint (§4.9) that the match is shorter than 8 bytes beyond
/// the initial 4-byte fingerprint, i.e. that `len < 12` -- exactly the condition under which the
/// most compact COPY_1 tag (§3) can apply. When `len <= 64` there is a single token and the hint
/// is handed straight to [`emit_copy_at_most_64`]; a match long enough to need chunking is never
/// short, so the hint is known `false` for every full 64/60-byte chunk, and only the final,
/// possibly-short remainder is re-derived from its own length.
fn emit_copy(out: &mut Vec<u8>, offset: usize, mut len: usize, short: bool) {
    debug_assert!(len >= MIN_MATCH);
    if len <= 64 {
        emit_copy_at_most_64(out, offset, len, short);
        return;
    }
    while len >= 68 {
        emit_copy_at_most_64(out, offset, 64, false);
        len -= 64;
    }
    if len > 64 {
        emit_copy_at_most_64(out, offset, 60, false);
        len -= 60;
    }
    emit_copy_at_most_64(out, offset, len, (4..=11).contains(&len));
}

/// Emits a single copy token for `len` (at most 64) bytes. `prefer_copy1` is the
/// [`find_match_length`] short-match hint (§4.9), equivalent to `(4..=11).contains(&len)`: rather
/// than re-deriving that range from `len`, the tag selection consumes the hint directly to pick
/// the most compact tag, falling back to COPY_2/COPY_4 when the offset is too large for COPY_1's
/// 11-bit range even though the length would otherwise qualify.
fn emit_copy_at_most_64(out: &mut Vec<u8>, offset: usize, len: usize, prefer_copy1: bool) {
    debug_assert!((1..=64).contains(&len));
    if prefer_copy1 && offset <= 2047 {
        debug_assert!((4..=11).contains(&len));
        let len_minus_4 = (len - 4) as u8;
        let tag = 0b01 | (len_minus_4 << 2) | (((offset >> 8) as u8) << 5);
        out.push(tag);
        out.push((offset & 0xff) as u8);
    } else if offset <= 0xffff {
        let tag = 0b10 | (((len - 1) as u8) << 2);
        out.push(tag);
        out.extend_from_slice(&(offset as u16).to_le_bytes());
    } else {
        let tag = 0b11 | (((len - 1) as u8) << 2);
        out.push(tag);
        out.extend_from_slice(&(offset as u32).to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decompress::decompress;
    use alloc::vec;
    use alloc::vec::Vec;

    fn roundtrip(input: &[u8]) {
        let compressed = compress(input).unwrap();
        assert_le!(compressed.len(), max_compressed_len(input.len()));
        let decompressed = decompress(&compressed).unwrap();
        assert_eq!(decompressed, input);
    }

    #[test]
    fn empty_input() {
        let compressed = compress(b"").unwrap();
        assert_eq!(compressed, vec![0x00]);
    }

    #[test]
    fn single_byte() {
        let compressed = compress(b"a").unwrap();
        assert_eq!(compressed, vec![0x01, 0x00, b'a']);
    }

    #[test]
    fn literal_only_roundtrips() {
        roundtrip(b"hello, world! this has no repeats whatsoever, abcdefghijklmnop");
    }

    #[test]
    fn repeated_pattern_roundtrips() {
        let input: Vec<u8> = b"abcabcabcabcabcabcabcabcabcabc".to_vec();
        roundtrip(&input);
    }

    #[test]
    fn long_literal_roundtrips() {
        let input: Vec<u8> = (0..100_000u32).map(|i| (i % 251) as u8).collect();
        roundtrip(&input);
    }

    #[test]
    fn multi_fragment_input_roundtrips() {
        let mut input = Vec::new();
        for i in 0..5 {
            input.extend(core::iter::repeat((b'a' + i) as u8).take(BLOCK_SIZE + 17));
        }
        roundtrip(&input);
    }

    #[test]
    fn highly_compressible_single_byte_run() {
        roundtrip(&vec![42u8; 500_000]);
    }

    #[test]
    fn max_compressed_len_matches_formula() {
        assert_eq!(max_compressed_len(0), 32);
        assert_eq!(max_compressed_len(6), 39);
        assert_eq!(max_compressed_len(600), 732);
    }

    #[test]
    fn compress_from_segments_matches_concat() {
        let segments: [&[u8]; 4] = [b"", b"hello ", b"", b"world"];
        let from_segments = compress_from_segments(&segments).unwrap();
        let concatenated: Vec<u8> = segments.concat();
        let expected = compress(&concatenated).unwrap();
        assert_eq!(from_segments, expected);
    }

    #[test]
    fn emit_copy_at_most_64_honors_the_short_hint() {
        // len=8, offset=100: eligible for COPY_1 by length/offset alone, but the hint is what
        // actually picks it here -- passing `prefer_copy1=false` must fall back to COPY_2 even
        // though the length would otherwise qualify.
        let mut short = Vec::new();
        emit_copy_at_most_64(&mut short, 100, 8, true);
        assert_eq!(short.len(), 2, "COPY_1 is a 2-byte token");
        assert_eq!(short[0] & 0x03, 0b01);

        let mut long = Vec::new();
        emit_copy_at_most_64(&mut long, 100, 8, false);
        assert_eq!(long.len(), 3, "COPY_2 is a 3-byte token");
        assert_eq!(long[0] & 0x03, 0b10);
    }

    #[test]
    fn emit_copy_at_most_64_falls_back_past_copy1_offset_range() {
        // The hint says "prefer COPY_1", but offset 3000 exceeds COPY_1's 11-bit range, so the
        // emitter must still fall back to COPY_2.
        let mut out = Vec::new();
        emit_copy_at_most_64(&mut out, 3000, 6, true);
        assert_eq!(out[0] & 0x03, 0b10);
    }

    #[test]
    fn emit_copy_chunks_a_long_match_and_still_compacts_the_remainder() {
        // len=70 chunks into a 64-byte COPY_2 token plus a 6-byte remainder; the remainder is
        // short enough for COPY_1 even though the overall match (hint=false) was not.
        let mut out = Vec::new();
        emit_copy(&mut out, 50, 70, false);
        assert_eq!(out[0] & 0x03, 0b10, "first chunk (len=64) is COPY_2");
        // First chunk is tag + 2 offset bytes = 3 bytes.
        assert_eq!(out[3] & 0x03, 0b01, "6-byte remainder fits COPY_1");
    }

    #[test]
    fn short_matches_roundtrip_via_compact_copy1_tag() {
        // "abcd" repeated just enough to produce a short (<12-byte) match candidate.
        let input = b"xxxxabcdabcd".to_vec();
        roundtrip(&input);
    }
}
