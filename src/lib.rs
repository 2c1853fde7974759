/*! LZ4 block format codec in safe Rust.

Produces and consumes raw LZ4 blocks as used inside any framed LZ4 stream.
Framing (magic numbers, frame descriptors, checksums) is left to the caller;
every function here maps one input buffer to one output buffer.

Two encoders share the same wire format: [`compress_block`] scans with a
single caller-owned [`HashTable`], while [`compress_block_hc`] additionally
keeps a collision chain per hash bucket and searches up to `depth` candidates
per position for the longest match in the 64 KiB window.

A return value of `Ok(0)` from either encoder means the input did not get
smaller; the caller should store it raw.

# Examples
```
use lz4_block::{compress_block, compress_block_bound, uncompress_block, HashTable};

let input = [0x61u8; 64];
let mut table = HashTable::new();
let mut compressed = vec![0u8; compress_block_bound(input.len())];
let n = compress_block(&input, &mut compressed, &mut table).unwrap();
assert!(n > 0);

let mut decompressed = vec![0u8; input.len()];
let len = uncompress_block(&compressed[..n], &mut decompressed).unwrap();
assert_eq!(&decompressed[..len], &input[..]);
```
*/
#![forbid(unsafe_code)]

#[macro_use]
extern crate quick_error;

#[cfg(test)]
#[macro_use]
extern crate more_asserts;

pub mod block;

pub use block::hashtable::HashTable;
pub use block::{
    compress_block, compress_block_bound, compress_block_hc, uncompress_block, Error,
};
