//! The fast compression algorithm.
//!
//! A single hash table maps every 4-byte batch to the position it was last
//! seen at. This gives a reasonable compression ratio at high speed and
//! fixed memory usage, which contrary to other approaches makes it less
//! memory hungry.

use byteorder::{ByteOrder, LittleEndian};

use crate::block::hashtable::{hash, HashTable};
use crate::block::{
    get_batch, get_batch_u64, Error, MAX_INPUT_SIZE, MFLIMIT, MINMATCH, WINDOW_SIZE,
};

#[inline]
fn token_from_lengths(lit_len: usize, match_excess: usize) -> u8 {
    // Saturated nibbles; values of 15 are continued after the token.
    let hi = if lit_len < 0xF {
        (lit_len as u8) << 4
    } else {
        0xF0
    };
    let lo = if match_excess < 0xF {
        match_excess as u8
    } else {
        0xF
    };
    hi | lo
}

/// Write a length that did not fit its token nibble: a run of `0xFF` bytes
/// closed by one byte in `0..=0xFE`.
#[inline]
pub(crate) fn write_length_ext(dst: &mut [u8], mut di: usize, mut n: usize) -> Result<usize, Error> {
    while n >= 0xFF {
        if di >= dst.len() {
            return Err(Error::InvalidSourceShortBuffer);
        }
        dst[di] = 0xFF;
        di += 1;
        n -= 0xFF;
    }
    if di >= dst.len() {
        return Err(Error::InvalidSourceShortBuffer);
    }
    dst[di] = n as u8;
    Ok(di + 1)
}

/// Emit one sequence: token, literal run, 16-bit offset and the match
/// length extension. Returns the advanced output cursor.
#[inline]
pub(crate) fn emit_sequence(
    dst: &mut [u8],
    mut di: usize,
    literals: &[u8],
    offset: u16,
    match_excess: usize,
) -> Result<usize, Error> {
    if di >= dst.len() {
        return Err(Error::InvalidSourceShortBuffer);
    }
    dst[di] = token_from_lengths(literals.len(), match_excess);
    di += 1;
    if literals.len() >= 0xF {
        di = write_length_ext(dst, di, literals.len() - 0xF)?;
    }
    if di + literals.len() + 2 > dst.len() {
        return Err(Error::InvalidSourceShortBuffer);
    }
    dst[di..di + literals.len()].copy_from_slice(literals);
    di += literals.len();
    LittleEndian::write_u16(&mut dst[di..di + 2], offset);
    di += 2;
    if match_excess >= 0xF {
        di = write_length_ext(dst, di, match_excess - 0xF)?;
    }
    Ok(di)
}

/// Close the block with the trailing literal run.
///
/// Also the place where "not worth compressing" is decided: with no match
/// emitted at all, or with the output cursor reaching the position the
/// trailing literals start at, raw storage is at least as small and 0 is
/// returned.
#[inline]
pub(crate) fn finish_block(
    dst: &mut [u8],
    mut di: usize,
    src: &[u8],
    anchor: usize,
) -> Result<usize, Error> {
    if anchor == 0 {
        return Ok(0);
    }
    let literals = &src[anchor..];
    if di >= dst.len() {
        return Err(Error::InvalidSourceShortBuffer);
    }
    dst[di] = token_from_lengths(literals.len(), 0);
    di += 1;
    if literals.len() >= 0xF {
        di = write_length_ext(dst, di, literals.len() - 0xF)?;
    }
    if di >= anchor {
        return Ok(0);
    }
    if di + literals.len() > dst.len() {
        return Err(Error::InvalidSourceShortBuffer);
    }
    dst[di..di + literals.len()].copy_from_slice(literals);
    Ok(di + literals.len())
}

/// Length of the common prefix of `src[candidate..]` and `src[pos..]`,
/// compared in 8-byte words; the first differing byte is found through the
/// trailing zero count of the XOR. Never reads or counts past `limit`.
#[inline]
pub(crate) fn match_length(src: &[u8], candidate: usize, pos: usize, limit: usize) -> usize {
    let mut n = 0;
    while pos + n < limit {
        let diff = get_batch_u64(src, candidate + n) ^ get_batch_u64(src, pos + n);
        if diff != 0 {
            n += (diff.trailing_zeros() >> 3) as usize;
            break;
        }
        n += 8;
    }
    n.min(limit.saturating_sub(pos))
}

/// Compress all of `src` as one block into `dst`, looking up duplicates in
/// the caller's `table`.
///
/// Returns the number of bytes written to `dst`. `Ok(0)` means the input
/// did not get smaller and should be stored raw. Sizing `dst` with
/// [`compress_block_bound`](crate::compress_block_bound) rules out
/// [`Error::InvalidSourceShortBuffer`].
///
/// The table is updated in place so the next block of a stream profits from
/// it; it is never cleared here. Cells left over from earlier inputs are
/// rejected by a range check and a content compare, so passing a dirty
/// table is fine.
pub fn compress_block(src: &[u8], dst: &mut [u8], table: &mut HashTable) -> Result<usize, Error> {
    if src.len() <= MFLIMIT || src.len() > MAX_INPUT_SIZE || dst.is_empty() {
        return Ok(0);
    }
    // No match may start in the last MFLIMIT bytes.
    let sn = src.len() - MFLIMIT;

    let mut si = 0;
    let mut anchor = 0;
    let mut di = 0;

    while si < sn {
        let batch = get_batch(src, si);
        let h = hash(batch);
        let candidate = table.get(h);
        table.put(h, si);

        // Stale cells from a previous, larger input land outside the
        // current scan range.
        if candidate >= sn || candidate >= si {
            si += 1;
            continue;
        }
        let offset = si - candidate;
        if offset >= WINDOW_SIZE || get_batch(src, candidate) != batch {
            si += 1;
            continue;
        }

        let match_start = si;
        let extra = match_length(src, candidate + MINMATCH, si + MINMATCH, sn);
        let match_len = MINMATCH + extra;
        si += match_len;

        di = emit_sequence(
            dst,
            di,
            &src[anchor..match_start],
            offset as u16,
            match_len - MINMATCH,
        )?;
        anchor = si;
    }

    finish_block(dst, di, src, anchor)
}
