//! Placer/splitter: decide whether to split a chosen free block, and
//! either way commit the request by writing the allocated block's header
//! and updating the successor's `prev_alloc` bit.
//!
//! Precondition: `bp` is currently free with size `c >= asize`. Grounded
//! on `original_source/mm.c`'s `place`.

use crate::block::{
  alloc_of_word, footer_offset, header_offset, next_offset, pack, prev_alloc_of_word, size_of_word, MIN_BLOCK,
};
use crate::coalesce::coalesce;
use crate::freelist::unlink;
use crate::mem::{get, put};

/// Places a request of `asize` bytes at the start of free block `bp`,
/// splitting off and coalescing a free remainder when it would be at
/// least [`MIN_BLOCK`] bytes, or consuming the whole block otherwise.
///
/// Returns `bp` unchanged — placement never moves the allocated prefix.
///
/// # Safety
/// `bp` must be a currently-free block with `size_of(header(bp)) >= asize`;
/// `base` must point at a heap with `classes` configured size classes.
pub unsafe fn place(base: *mut u8, classes: usize, bp: u32, asize: u32) -> u32 {
  unsafe {
    let header = get(base, header_offset(bp));
    let csize = size_of_word(header);
    let prev_alloc = prev_alloc_of_word(header);
    debug_assert!(csize >= asize, "place() called with a block too small for the request");

    unlink(base, bp);

    if csize - asize >= MIN_BLOCK {
      put(base, header_offset(bp), pack(asize, true, prev_alloc));

      let remainder_bp = bp + asize;
      let remainder_size = csize - asize;
      let word = pack(remainder_size, false, true);
      put(base, header_offset(remainder_bp), word);
      put(base, footer_offset(remainder_bp, remainder_size), word);
      coalesce(base, classes, remainder_bp);

      log::trace!("place({bp}): split {csize} into {asize} + {remainder_size} remainder");
    } else {
      put(base, header_offset(bp), pack(csize, true, prev_alloc));

      let succ_bp = next_offset(bp, pack(csize, true, prev_alloc));
      let succ_header = get(base, header_offset(succ_bp));
      let succ_size = size_of_word(succ_header);
      let succ_alloc = alloc_of_word(succ_header);
      let succ_word = pack(succ_size, succ_alloc, true);
      put(base, header_offset(succ_bp), succ_word);
      if !succ_alloc {
        put(base, footer_offset(succ_bp, succ_size), succ_word);
      }

      log::trace!("place({bp}): consumed whole block of {csize} bytes ({} asked)", asize);
    }

    bp
  }
}
