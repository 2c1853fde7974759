//! The decompression algorithm.

use byteorder::{ByteOrder, LittleEndian};

use crate::block::{Error, MINMATCH};

/// Read a length continuation: a run of `0xFF` bytes closed by one byte in
/// `0..=0xFE`, summed up.
#[inline]
fn read_length_ext(input: &[u8], pos: &mut usize) -> Result<usize, Error> {
    let mut n = 0usize;
    loop {
        let extra = *input.get(*pos).ok_or(Error::InvalidSourceShortBuffer)?;
        *pos += 1;
        n += extra as usize;
        if extra != 0xFF {
            return Ok(n);
        }
    }
}

/// Copy a match of `len` bytes ending up at `di`, sourced `offset` bytes
/// back in the already produced output. The source may overlap the bytes
/// being written, so the copy must run forward: an offset of 1 replicates
/// the previous byte `len` times.
#[inline]
fn copy_match(dst: &mut [u8], di: usize, offset: usize, len: usize) {
    let start = di - offset;
    if offset == 1 {
        let b = dst[start];
        dst[di..di + len].fill(b);
    } else if offset >= len {
        dst.copy_within(start..start + len, di);
    } else {
        for i in 0..len {
            dst[di + i] = dst[start + i];
        }
    }
}

/// Decompress the block in `src` into `dst`.
///
/// Returns the number of bytes written; `dst` must be at least as large as
/// the uncompressed content. Truncated input, a zero offset, an offset
/// reaching before the start of the output, and an undersized `dst` all
/// report [`Error::InvalidSourceShortBuffer`].
pub fn uncompress_block(src: &[u8], dst: &mut [u8]) -> Result<usize, Error> {
    if src.is_empty() {
        return Ok(0);
    }

    let mut si = 0;
    let mut di = 0;
    loop {
        let token = *src.get(si).ok_or(Error::InvalidSourceShortBuffer)?;
        si += 1;

        // Literal run.
        let mut lit_len = (token >> 4) as usize;
        if lit_len == 0xF {
            lit_len += read_length_ext(src, &mut si)?;
        }
        if lit_len > 0 {
            let lit_end = si
                .checked_add(lit_len)
                .ok_or(Error::InvalidSourceShortBuffer)?;
            if lit_end > src.len() || di + lit_len > dst.len() {
                return Err(Error::InvalidSourceShortBuffer);
            }
            dst[di..di + lit_len].copy_from_slice(&src[si..lit_end]);
            si = lit_end;
            di += lit_len;
        }
        if si == src.len() {
            // The closing sequence carries no match.
            return Ok(di);
        }

        // Back reference.
        if si + 2 > src.len() {
            return Err(Error::InvalidSourceShortBuffer);
        }
        let offset = LittleEndian::read_u16(&src[si..]) as usize;
        si += 2;
        if offset == 0 || offset > di {
            return Err(Error::InvalidSourceShortBuffer);
        }

        let mut match_len = MINMATCH + (token & 0xF) as usize;
        if (token & 0xF) as usize == 0xF {
            match_len += read_length_ext(src, &mut si)?;
        }
        if di + match_len > dst.len() {
            return Err(Error::InvalidSourceShortBuffer);
        }
        copy_match(dst, di, offset, match_len);
        di += match_len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        let mut dst = [0u8; 8];
        assert_eq!(uncompress_block(&[], &mut dst).unwrap(), 0);
    }

    #[test]
    fn all_literal() {
        let mut dst = [0u8; 3];
        assert_eq!(
            uncompress_block(&[0x30, b'a', b'4', b'9'], &mut dst).unwrap(),
            3
        );
        assert_eq!(&dst, b"a49");
    }

    #[test]
    fn offset_oob() {
        let mut dst = [0u8; 8];
        uncompress_block(&[0x10, b'a', 2, 0, 0x10, b'b'], &mut dst).unwrap_err();
        uncompress_block(&[0x40, b'a'], &mut dst).unwrap_err();
    }

    #[test]
    fn zero_offset() {
        let mut dst = [0u8; 16];
        assert_eq!(
            uncompress_block(&[0x14, b'a', 0, 0, 0x10, b'b'], &mut dst),
            Err(Error::InvalidSourceShortBuffer)
        );
    }

    #[test]
    fn offset_one_replicates() {
        // One literal, then an eight byte match one byte back, then the
        // closing literals.
        let block = [0x14, 0xAA, 0x01, 0x00, 0x50, b'v', b'w', b'x', b'y', b'z'];
        let mut dst = [0u8; 14];
        assert_eq!(uncompress_block(&block, &mut dst).unwrap(), 14);
        assert_eq!(&dst[..9], &[0xAA; 9]);
        assert_eq!(&dst[9..], b"vwxyz");
    }

    #[test]
    fn overlapping_forward_copy() {
        // Literals "abc", then a match of offset 3 and length 7, which
        // overlaps its own output and must repeat "abc".
        let block = [0x33, b'a', b'b', b'c', 0x03, 0x00, 0x50, b'q', b'q', b'q', b'q', b'q'];
        let mut dst = [0u8; 15];
        assert_eq!(uncompress_block(&block, &mut dst).unwrap(), 15);
        assert_eq!(&dst[..10], b"abcabcabca");
        assert_eq!(&dst[10..], b"qqqqq");
    }

    #[test]
    fn truncated_mid_sequence() {
        let mut dst = [0u8; 64];
        // Literal run cut short.
        uncompress_block(&[0x50, b'a', b'b'], &mut dst).unwrap_err();
        // Offset cut short.
        uncompress_block(&[0x14, b'a', 0x01], &mut dst).unwrap_err();
        // Length extension cut short.
        uncompress_block(&[0x1F, b'a', 0x01, 0x00, 0xFF], &mut dst).unwrap_err();
        // Block may not end right after a match.
        uncompress_block(&[0x14, b'a', 0x01, 0x00], &mut dst).unwrap_err();
    }

    #[test]
    fn destination_exactly_sized_or_short() {
        let block = [0x14, 0xAA, 0x01, 0x00, 0x50, b'v', b'w', b'x', b'y', b'z'];
        let mut exact = [0u8; 14];
        assert_eq!(uncompress_block(&block, &mut exact).unwrap(), 14);
        let mut short = [0u8; 13];
        assert_eq!(
            uncompress_block(&block, &mut short),
            Err(Error::InvalidSourceShortBuffer)
        );
    }
}
