/*! Pure Rust, high performance implementation of Snappy compression.

A byte-oriented, general-purpose lossless compression codec optimized for speed over ratio: a
variable-length integer giving the uncompressed length, followed by a stream of tagged tokens
(literals and back-references) that together reproduce the source. The format has no magic
number, no version byte and no checksum -- the byte stream itself is the contract, and any
conforming encoder's output is accepted by any conforming decoder.

# Examples
```
use snappy_flex::{compress, decompress};
let input: &[u8] = b"Hello people, what's up?";
let compressed = compress(input).unwrap();
let decompressed = decompress(&compressed).unwrap();
assert_eq!(input, decompressed.as_slice());
```

# Feature Flags
There are three relevant feature flags: `std`, `safe-encode` and `safe-decode`, all on by
default.

`safe-decode` and `safe-encode` keep the hot loops of decompression and compression,
respectively, in safe Rust. Turning either off swaps in raw-pointer fast paths for that side of
the codec; `checked-decode` (also on by default) keeps the bounds checks that make decompressing
untrusted input memory-safe even when `safe-decode` is off, so the only thing an unsafe build
buys is speed, never weaker validation.

`std` is required only for [`Error`] to implement [`std::error::Error`]; with `std` off the crate
is `#![no_std]` and depends only on `alloc`.
*/
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

#[cfg(test)]
#[macro_use]
extern crate more_asserts;

pub mod compress;
pub mod decompress;
mod error;
mod fastcpy;
#[cfg(not(feature = "safe-decode"))]
mod fastcpy_unsafe;
mod find_match_length;
mod hashtable;
mod sink;
mod tag;
pub mod validate;
mod varint;

pub use compress::{
    compress, compress_from_segments, compress_into, max_compressed_len, BLOCK_SIZE,
};
pub use decompress::{
    decompress, decompress_bounded, decompress_into, decompress_to_segments,
    get_uncompressed_length,
};
pub use error::Error;
pub use sink::{ScatterSink, Sink, SliceSink};
pub use validate::is_valid_compressed;
