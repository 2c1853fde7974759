//! The high compression algorithm.
//!
//! Same wire format as [`compress_block`](crate::compress_block), but every
//! hash bucket keeps a chain of all earlier positions with that hash. Up to
//! `depth` candidates are tried per position and the longest match in the
//! window wins, trading speed for ratio.

use crate::block::compress::{emit_sequence, finish_block, match_length};
use crate::block::hashtable::hash;
use crate::block::{
    get_batch, Error, MAX_INPUT_SIZE, MFLIMIT, MINMATCH, WINDOW_MASK, WINDOW_SIZE,
};

/// Compress all of `src` as one block into `dst`, searching up to `depth`
/// candidate positions per scan position. `depth` of 0 lifts the limit, so
/// the search is bounded by the window alone.
///
/// Returns the number of bytes written to `dst`; `Ok(0)` means the input
/// did not get smaller and should be stored raw, exactly as for the fast
/// encoder. Both search tables are local to the call.
pub fn compress_block_hc(src: &[u8], dst: &mut [u8], depth: usize) -> Result<usize, Error> {
    if src.len() <= MFLIMIT || src.len() > MAX_INPUT_SIZE || dst.is_empty() {
        return Ok(0);
    }
    let depth = if depth == 0 { WINDOW_SIZE } else { depth };
    let sn = src.len() - MFLIMIT;

    // Bucket heads, and one chain slot per window position linking back to
    // the previous position with the same hash.
    let mut head = vec![0u32; WINDOW_SIZE];
    let mut chain = vec![0u32; WINDOW_SIZE];

    let mut si = 0;
    let mut anchor = 0;
    let mut di = 0;

    while si < sn {
        let h = hash(get_batch(src, si)) as usize;

        // Walk the chain, keeping the longest match in the window. A slot
        // value of 0 ends the chain; position 0 is never a member.
        let mut best_len = 0;
        let mut best_offset = 0;
        let mut next = head[h] as usize;
        let mut tries = depth;
        while tries > 0 && next > 0 && si - next < WINDOW_SIZE {
            // A candidate can only improve on the current best if it also
            // matches one byte past the best length; probing that byte
            // rejects most candidates without measuring them.
            if src[next + best_len] == src[si + best_len] {
                let len = match_length(src, next, si, sn);
                if len >= MINMATCH && len > best_len {
                    best_len = len;
                    best_offset = si - next;
                }
            }
            next = chain[next & WINDOW_MASK] as usize;
            tries -= 1;
        }

        // Record the scan position itself once the walk is done.
        chain[si & WINDOW_MASK] = head[h];
        head[h] = si as u32;

        if best_len == 0 {
            si += 1;
            continue;
        }

        // Make the positions inside the match findable by later searches.
        // The 4-byte batch slides one byte at a time; for matches longer
        // than the window only the last window's worth is recorded.
        let match_end = si + best_len;
        let mut pos = if best_len > WINDOW_SIZE {
            match_end - WINDOW_SIZE
        } else {
            si + 1
        };
        let mut batch = get_batch(src, pos);
        loop {
            let hp = hash(batch) as usize;
            chain[pos & WINDOW_MASK] = head[hp];
            head[hp] = pos as u32;
            pos += 1;
            if pos >= match_end {
                break;
            }
            batch = (batch >> 8) | ((src[pos + 3] as u32) << 24);
        }

        di = emit_sequence(
            dst,
            di,
            &src[anchor..si],
            best_offset as u16,
            best_len - MINMATCH,
        )?;
        si = match_end;
        anchor = si;
    }

    finish_block(dst, di, src, anchor)
}
