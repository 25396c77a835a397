//! Block layout: header/footer bit-packing and neighbor addressing.
//!
//! Every block begins with a 4-byte header and, if currently free, ends with
//! a matching 4-byte footer. Both words encode the same three fields packed
//! into 32 bits:
//!
//! ```text
//!   bits [3..31]  size in bytes, a multiple of 8
//!   bit  1        prev_alloc — is the preceding physical block allocated?
//!   bit  0        alloc      — is this block allocated?
//! ```
//!
//! A block is addressed by `bp`, the offset (relative to the heap base) of
//! the first byte after its header — not a pointer, because the free-list
//! links and the heads table are themselves heap-relative offsets (see
//! [`crate::freelist`]), and keeping block addressing on the same footing
//! avoids two parallel addressing schemes living side by side.
//!
//! ```text
//!   ...| HDR | bp ------------------------> payload/links ... | FTR |...
//!            ^ bp points here               (FTR only present when free)
//! ```
//!
//! None of these functions read or write outside a block's own header word
//! (or its footer, when free) — all other state lives in [`crate::heap`].

/// Size in bytes of one header/footer/link field.
pub const FIELD: u32 = 4;

/// Minimum block size: header + succ + pred + footer, already 8-byte aligned.
pub const MIN_BLOCK: u32 = 4 * FIELD;

/// Packs a size/alloc/prev_alloc triple into one header or footer word.
///
/// `size` must already be 8-byte aligned; the low 3 bits it would otherwise
/// occupy are reused for the two flag bits.
#[inline]
pub const fn pack(size: u32, alloc: bool, prev_alloc: bool) -> u32 {
  (size & !0x7) | (alloc as u32) | ((prev_alloc as u32) << 1)
}

/// Extracts the size field from a header/footer word.
#[inline]
pub const fn size_of_word(word: u32) -> u32 {
  word & !0x7
}

/// Extracts the `alloc` bit from a header/footer word.
#[inline]
pub const fn alloc_of_word(word: u32) -> bool {
  word & 0x1 != 0
}

/// Extracts the `prev_alloc` bit from a header/footer word.
#[inline]
pub const fn prev_alloc_of_word(word: u32) -> bool {
  word & 0x2 != 0
}

/// Offset of `bp`'s header, relative to `bp`.
#[inline]
pub const fn header_offset(bp: u32) -> u32 {
  bp - FIELD
}

/// Offset of `bp`'s footer, relative to `bp`, given the block's `size`.
///
/// Only meaningful while the block is free — allocated blocks have no
/// footer, so this must never be read unless the caller already knows the
/// block is free.
#[inline]
pub const fn footer_offset(bp: u32, size: u32) -> u32 {
  bp + size - 2 * FIELD
}

/// Offset of the next physical block's `bp`, given this block's header word.
#[inline]
pub const fn next_offset(bp: u32, header_word: u32) -> u32 {
  bp + size_of_word(header_word)
}

/// Offset of the previous physical block's `bp`, given the footer word that
/// sits just before `bp`'s header.
///
/// Precondition: the caller has already confirmed `prev_alloc_of_word` is
/// false for this block — only then does the predecessor have a footer to
/// read a size out of.
#[inline]
pub const fn prev_offset(bp: u32, prev_footer_word: u32) -> u32 {
  bp - size_of_word(prev_footer_word)
}

/// Offset of a free block's `succ` link field — the first word of its
/// payload area.
#[inline]
pub const fn succ_offset(bp: u32) -> u32 {
  bp
}

/// Offset of a free block's `pred` link field — the second word of its
/// payload area.
#[inline]
pub const fn pred_offset(bp: u32) -> u32 {
  bp + FIELD
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn pack_roundtrip() {
    for size in (0u32..4096).step_by(8) {
      for alloc in [false, true] {
        for prev_alloc in [false, true] {
          let word = pack(size, alloc, prev_alloc);
          assert_eq!(size_of_word(word), size);
          assert_eq!(alloc_of_word(word), alloc);
          assert_eq!(prev_alloc_of_word(word), prev_alloc);
        }
      }
    }
  }

  #[test]
  fn pack_masks_low_bits_of_size() {
    // size is documented to already be 8-byte aligned; pack must not
    // let stray low bits leak into the flag bits.
    let word = pack(40 | 0x3, true, true);
    assert_eq!(size_of_word(word), 40);
  }

  #[test]
  fn header_and_footer_offsets() {
    let bp = 1000u32;
    assert_eq!(header_offset(bp), 996);
    assert_eq!(footer_offset(bp, 32), bp + 32 - 8);
  }

  #[test]
  fn neighbor_offsets() {
    let bp = 1000u32;
    let header_word = pack(32, true, true);
    assert_eq!(next_offset(bp, header_word), 1032);

    let prev_footer_word = pack(48, false, true);
    assert_eq!(prev_offset(bp, prev_footer_word), 952);
  }

  #[test]
  fn link_offsets_overlay_payload_start() {
    let bp = 2000u32;
    assert_eq!(succ_offset(bp), bp);
    assert_eq!(pred_offset(bp), bp + 4);
  }
}
