//! Longest-common-prefix primitive used by the fragment compressor to extend a 4-byte hash hit
//! into a full match.
//!
//! Both inputs are read up to `limit` bytes; the comparison never reads past that point, even
//! when it fast-paths through word-sized comparisons (the compressor's hot loop otherwise relies
//! on this to stay inside the caller-supplied input buffer when inputs sit next to a guard page).

/// Returns the length of the longest common prefix of `a` and `b`, bounded by `limit`, together
/// with a flag that is `true` iff that length is less than 8 (a hint the emitter uses to prefer
/// the most compact copy tag).
#[inline]
pub(crate) fn find_match_length(a: &[u8], b: &[u8], limit: usize) -> (usize, bool) {
    let limit = limit.min(a.len()).min(b.len());
    let mut matched = 0;

    while matched + 8 <= limit {
        let wa = u64::from_ne_bytes(a[matched..matched + 8].try_into().unwrap());
        let wb = u64::from_ne_bytes(b[matched..matched + 8].try_into().unwrap());
        let diff = wa ^ wb;
        if diff != 0 {
            let len = matched + (diff.trailing_zeros() as usize / 8);
            return (len, len < 8);
        }
        matched += 8;
    }

    while matched < limit && a[matched] == b[matched] {
        matched += 1;
    }

    (matched, matched < 8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_length_match() {
        assert_eq!(find_match_length(b"012345", b"012345", 6), (6, true));
    }

    #[test]
    fn mismatch_inside_a_word() {
        assert_eq!(
            find_match_length(b"01234567abc", b"01234567axc", 9),
            (9, false)
        );
    }

    #[test]
    fn mismatch_on_first_byte() {
        assert_eq!(
            find_match_length(b"01234567xxxxxxxx", b"?1234567xxxxxxxx", 16),
            (0, true)
        );
    }

    #[test]
    fn never_reads_past_limit() {
        // The limit is shorter than both slices; a buggy word-at-a-time fast path reading past
        // it would pick up the trailing 0xff bytes and report a longer match.
        let a = [1u8, 2, 3, 4, 5, 6, 7, 8, 0xff, 0xff];
        let b = [1u8, 2, 3, 4, 5, 6, 7, 8, 0x00, 0x00];
        assert_eq!(find_match_length(&a, &b, 8), (8, false));
    }

    #[test]
    fn short_match_flag_boundary() {
        let a = [1u8; 8];
        let b = [1u8; 8];
        assert_eq!(find_match_length(&a, &b, 8), (8, false));
        let a7 = [1u8; 7];
        let b7 = [1u8; 7];
        assert_eq!(find_match_length(&a7, &b7, 7), (7, true));
    }
}
