/*!

<https://github.com/lz4/lz4/blob/dev/doc/lz4_Block_format.md>

A block is a run of sequences followed by one closing sequence. Every
sequence starts with a token byte: the high nibble is the literal length,
the low nibble the match length minus the minimum of 4. A nibble of 15 is
continued with `0xFF` bytes and closed by one byte in `0..=0xFE`; the
decoded length is the sum. After the literals comes the 16-bit little-endian
back-reference offset, `1..=65535`. The closing sequence has literals only
and carries at least the last five bytes of the input.

*/

pub mod compress;
pub mod compress_hc;
pub mod decompress;
pub mod hashtable;

pub use compress::compress_block;
pub use compress_hc::compress_block_hc;
pub use decompress::uncompress_block;

use byteorder::{ByteOrder, LittleEndian};

/// Maximum back-reference distance; also the cell count of the match tables.
pub(crate) const WINDOW_SIZE: usize = 64 * 1024;

/// Modulo mask for chain indexing.
pub(crate) const WINDOW_MASK: usize = WINDOW_SIZE - 1;

/// The minimum length of a duplicate.
pub(crate) const MINMATCH: usize = 4;

/// <https://github.com/lz4/lz4/blob/dev/doc/lz4_Block_format.md#end-of-block-restrictions>
/// The last match must start at least 12 bytes before the end of block, so
/// the last `MFLIMIT` bytes of the input never start a match.
pub(crate) const MFLIMIT: usize = 12;

/// Inputs above this size are handed back to the caller for raw storage;
/// their positions would no longer fit the 32-bit table cells.
pub(crate) const MAX_INPUT_SIZE: usize = 0x7E00_0000;

quick_error! {
    /// An error representing a malformed block or an undersized buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Error {
        /// The source is truncated or corrupt, or the destination cannot
        /// hold the result.
        InvalidSourceShortBuffer {
            display("invalid source data or short destination buffer")
        }
    }
}

/// Worst-case compressed size for an input of `n` bytes.
///
/// Sizing the destination to this bound guarantees the encoders never run
/// out of room, whatever the input. Returns 0 when `n` is too large for a
/// single block.
#[inline]
pub fn compress_block_bound(n: usize) -> usize {
    if n > MAX_INPUT_SIZE {
        return 0;
    }
    n + n / 255 + 16
}

/// Read a 4-byte batch as a little-endian integer.
#[inline]
pub(crate) fn get_batch(input: &[u8], pos: usize) -> u32 {
    LittleEndian::read_u32(&input[pos..])
}

#[inline]
pub(crate) fn get_batch_u64(input: &[u8], pos: usize) -> u64 {
    LittleEndian::read_u64(&input[pos..])
}

#[test]
fn test_compress_block_bound() {
    assert_eq!(compress_block_bound(0), 16);
    assert_eq!(compress_block_bound(254), 254 + 16);
    assert_eq!(compress_block_bound(255), 255 + 1 + 16);
    assert_eq!(compress_block_bound(MAX_INPUT_SIZE + 1), 0);
}
