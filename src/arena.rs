//! The heap arena: the sbrk-like primitive this allocator is built on.
//!
//! Uses `libc::sbrk` directly, the same contract a bump allocator would,
//! but does not call `sbrk` on every allocation; [`crate::heap::Heap`]
//! calls [`Arena::grow`] only on a fit-search miss.
//!
//! `sbrk` moves the process-wide program break, so only one [`Arena`] (and
//! therefore only one [`crate::heap::Heap`]) should be live per process —
//! two arenas would both think they own the region between the old and new
//! break. The data model itself has no hidden process-wide state beyond
//! this OS resource, so nothing stops a caller from constructing a second
//! `Heap`; it just won't be safe to use concurrently with the first one
//! while both touch the real break. See `DESIGN.md`.

use std::ptr;

/// Owns the heap's `[lo, hi)` byte range, grown on demand via `sbrk`.
pub struct Arena {
  lo: *mut u8,
  hi: *mut u8,
}

impl Arena {
  /// An arena with no backing memory yet. [`Arena::grow`] must be called
  /// at least once (this is what [`crate::heap::Heap::init`] does) before
  /// `bounds()` means anything.
  pub const fn uninit() -> Self {
    Self {
      lo: ptr::null_mut(),
      hi: ptr::null_mut(),
    }
  }

  /// Current heap bounds `[lo, hi)`.
  #[inline]
  pub fn bounds(&self) -> (*mut u8, *mut u8) {
    (self.lo, self.hi)
  }

  /// Address of the first byte of the heap.
  #[inline]
  pub fn lo(&self) -> *mut u8 {
    self.lo
  }

  /// Address one past the last byte of the heap.
  #[inline]
  pub fn hi(&self) -> *mut u8 {
    self.hi
  }

  /// Requests `n` fresh bytes contiguous with the current high-water
  /// mark. `n` must be a positive multiple of 4; this crate always
  /// calls it with a multiple of 8.
  ///
  /// Returns the base of the new region, or `None` on `sbrk` failure
  /// (out of memory, or `RLIMIT_DATA` exceeded). No existing block is
  /// mutated on failure.
  pub fn grow(&mut self, n: usize) -> Option<*mut u8> {
    debug_assert!(n > 0 && n % 4 == 0, "grow() request must be a positive multiple of 4");

    // SAFETY: sbrk is a plain syscall wrapper; the only invariant it
    // relies on is that this process doesn't call it from elsewhere
    // concurrently with unrelated expectations about the break.
    let prev = unsafe { libc::sbrk(n as libc::intptr_t) };
    if prev as isize == -1 {
      log::debug!("arena: sbrk({n}) failed, out of memory");
      return None;
    }

    let base = prev as *mut u8;
    if self.lo.is_null() {
      self.lo = base;
    }
    self.hi = unsafe { base.add(n) };
    log::debug!("arena: grew by {n} bytes, bounds now {:?}..{:?}", self.lo, self.hi);
    Some(base)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn uninit_bounds_are_null() {
    let arena = Arena::uninit();
    assert_eq!(arena.bounds(), (ptr::null_mut(), ptr::null_mut()));
  }

  #[test]
  fn grow_extends_hi_by_exactly_n() {
    let mut arena = Arena::uninit();
    let base1 = arena.grow(64).expect("first grow should succeed");
    let (lo, hi) = arena.bounds();
    assert_eq!(lo, base1);
    assert_eq!(hi, unsafe { base1.add(64) });

    let base2 = arena.grow(32).expect("second grow should succeed");
    assert_eq!(base2, hi, "second grow must be contiguous with the first");
    let (lo2, hi2) = arena.bounds();
    assert_eq!(lo2, lo, "lo is set once and never moves");
    assert_eq!(hi2, unsafe { base2.add(32) });
  }
}
