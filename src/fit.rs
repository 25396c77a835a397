//! Fit search: walk size classes ascending from the smallest that could
//! satisfy a request, first-fit within each class.
//!
//! Grounded on `original_source/mm.c`'s `find_fit`: search the class
//! `asize` belongs to from its head; on reaching the tail without a match,
//! move up one class and repeat, until a class has a block of sufficient
//! size or every class has been exhausted.

use crate::block::{header_offset, succ_offset};
use crate::freelist::{class_of, head_offset, read_size, TAIL_OFFSET};
use crate::mem::get;

/// Returns the offset of the first free block of size `>= asize`, or
/// `None` if no class holds one.
///
/// # Safety
/// `base` must point at a heap with `classes` configured size classes and
/// a well-formed free-list index.
pub unsafe fn find_fit(base: *mut u8, classes: usize, asize: u32) -> Option<u32> {
  unsafe {
    let start = class_of(asize, classes);
    for class in start..classes {
      let mut bp = get(base, head_offset(class));
      while bp != TAIL_OFFSET {
        if read_size(base, header_offset(bp)) >= asize {
          return Some(bp);
        }
        bp = get(base, succ_offset(bp));
      }
    }
    None
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::block::{footer_offset, pack};
  use crate::freelist::insert;
  use crate::mem::put;

  const CLASSES: usize = 13;

  fn make_heap() -> Vec<u8> {
    vec![0u8; 8 + CLASSES * 4 + 4096]
  }

  unsafe fn add_free_block(base: *mut u8, bp: u32, size: u32) {
    unsafe {
      let word = pack(size, false, true);
      put(base, header_offset(bp), word);
      put(base, footer_offset(bp, size), word);
      insert(base, CLASSES, bp, size);
    }
  }

  #[test]
  fn finds_exact_class_match() {
    let mut heap = make_heap();
    let base = heap.as_mut_ptr();
    let bp = 8 + (CLASSES as u32) * 4 + 4;
    unsafe {
      add_free_block(base, bp, 32);
      assert_eq!(find_fit(base, CLASSES, 32), Some(bp));
    }
  }

  #[test]
  fn ascends_to_a_higher_class_on_miss() {
    let mut heap = make_heap();
    let base = heap.as_mut_ptr();
    let small_bp = 8 + (CLASSES as u32) * 4 + 4;
    let big_bp = small_bp + 32;
    unsafe {
      add_free_block(base, small_bp, 24); // too small for a 64-byte request
      add_free_block(base, big_bp, 128);
      assert_eq!(find_fit(base, CLASSES, 64), Some(big_bp));
    }
  }

  #[test]
  fn returns_none_when_nothing_fits() {
    let mut heap = make_heap();
    let base = heap.as_mut_ptr();
    let bp = 8 + (CLASSES as u32) * 4 + 4;
    unsafe {
      add_free_block(base, bp, 32);
      assert_eq!(find_fit(base, CLASSES, 4096), None);
    }
  }

  #[test]
  fn first_fit_within_a_class_prefers_the_head() {
    let mut heap = make_heap();
    let base = heap.as_mut_ptr();
    let bp1 = 8 + (CLASSES as u32) * 4 + 4;
    let bp2 = bp1 + 32;
    unsafe {
      add_free_block(base, bp1, 32);
      add_free_block(base, bp2, 32); // inserted later, LIFO head
      assert_eq!(find_fit(base, CLASSES, 32), Some(bp2));
    }
  }
}
