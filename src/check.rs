//! The consistency checker: a read-only traversal that verifies every
//! invariant in the data model and reports (never repairs) violations.
//!
//! Two traversals are performed: one in physical block order from the
//! prologue to the epilogue, one per free-list size class. The free-block
//! counts the two traversals produce must agree.
//!
//! Grounded on `original_source/mm.c`'s `checkheap`/`checkblock`/
//! `check_list`/`printblock`, with `printf` replaced by `log::trace!` for
//! the verbose per-block dump and `log::error!` for each violation as it
//! is found — a diagnostic sink, not a panic.

use crate::align::is_aligned8;
use crate::block::{
  alloc_of_word, footer_offset, header_offset, next_offset, prev_alloc_of_word, size_of_word, MIN_BLOCK,
};
use crate::error::{CheckTag, Violation};
use crate::freelist::{class_of, head_offset, pred_offset, read_size, succ_offset, TAIL_OFFSET};
use crate::layout::prologue_bp;
use crate::mem::get;

/// Walks the heap in both physical and free-list order and returns every
/// violation found. An empty vector means the heap is consistent.
///
/// `heap_bytes` is the current size of the arena (`hi - lo`), used for the
/// `in_heap` bound checks.
///
/// # Safety
/// `base` must be the heap's base pointer, initialized with `classes`
/// configured size classes.
pub unsafe fn check_heap(base: *mut u8, classes: usize, heap_bytes: u32, tag: CheckTag, verbose: bool) -> Vec<Violation> {
  let mut violations = Vec::new();

  unsafe {
    let prologue = prologue_bp(classes);
    let prologue_header = get(base, header_offset(prologue));
    let prologue_footer = get(base, footer_offset(prologue, 8));

    if size_of_word(prologue_header) != 8 || !alloc_of_word(prologue_header) {
      violations.push(Violation::BadPrologue {
        tag,
        size: size_of_word(prologue_header),
        alloc: alloc_of_word(prologue_header),
      });
    }
    if prologue_header != prologue_footer {
      violations.push(Violation::HeaderFooterMismatch {
        tag,
        offset: prologue,
        header: prologue_header,
        footer: prologue_footer,
      });
    }

    let mut free_count_physical = 0usize;
    let mut prev_alloc = true;
    let mut prev_bp = prologue;
    let mut bp = next_offset(prologue, prologue_header);

    loop {
      let header = get(base, header_offset(bp));
      let size = size_of_word(header);

      if size == 0 {
        if !alloc_of_word(header) {
          violations.push(Violation::BadEpilogue { tag, size, alloc: alloc_of_word(header) });
        }
        if bp != heap_bytes {
          violations.push(Violation::TilingGap { tag, offset: bp });
        }
        if verbose {
          log::trace!("[{tag}] {bp}: epilogue");
        }
        break;
      }

      if !is_aligned8(bp as usize) {
        violations.push(Violation::Misaligned { tag, offset: bp });
      }
      if size < MIN_BLOCK {
        violations.push(Violation::TooSmall { tag, offset: bp, size });
      }

      let alloc = alloc_of_word(header);
      if !alloc {
        let footer = get(base, footer_offset(bp, size));
        if footer != header {
          violations.push(Violation::HeaderFooterMismatch { tag, offset: bp, header, footer });
        }
      }

      let claimed_prev_alloc = prev_alloc_of_word(header);
      if claimed_prev_alloc != prev_alloc {
        violations.push(Violation::PrevAllocMismatch {
          tag,
          offset: bp,
          prev_alloc: claimed_prev_alloc,
          actual: prev_alloc,
        });
      }
      if !prev_alloc && !alloc {
        violations.push(Violation::AdjacentFreeBlocks { tag, first: prev_bp, second: bp });
      }
      if !alloc {
        free_count_physical += 1;
      }

      if verbose {
        log::trace!("[{tag}] {bp}: size={size} alloc={alloc} prev_alloc={claimed_prev_alloc}");
      }

      prev_alloc = alloc;
      prev_bp = bp;
      bp = next_offset(bp, header);
    }

    let mut free_count_by_list = 0usize;
    for class in 0..classes {
      let root = head_offset(class);
      let mut ptr = get(base, root);
      while ptr != TAIL_OFFSET {
        free_count_by_list += 1;

        if ptr >= heap_bytes {
          violations.push(Violation::OutOfHeap { tag, offset: ptr });
        }

        let succ = get(base, succ_offset(ptr));
        let pred = get(base, pred_offset(ptr));
        if get(base, succ_offset(pred)) != ptr {
          violations.push(Violation::PredSuccMismatch { tag, offset: ptr });
        }
        if succ != TAIL_OFFSET && get(base, pred_offset(succ)) != ptr {
          violations.push(Violation::SuccPredMismatch { tag, offset: ptr });
        }

        let size = read_size(base, header_offset(ptr));
        let computed_class = class_of(size, classes);
        if computed_class != class {
          violations.push(Violation::WrongClass {
            tag,
            offset: ptr,
            size,
            actual_class: class,
            expected_class: computed_class,
          });
        }

        ptr = succ;
      }
    }

    if free_count_physical != free_count_by_list {
      violations.push(Violation::FreeCountMismatch { tag, physical: free_count_physical, by_list: free_count_by_list });
    }
  }

  for v in &violations {
    log::error!("{v}");
  }

  violations
}
