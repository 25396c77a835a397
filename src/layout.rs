//! The heap prelude: the fixed region at the very bottom of the arena that
//! holds the tail sentinel, the size-class head table, the prologue block
//! and the epilogue block — everything before the first user-addressable
//! block.
//!
//! ```text
//!   offset 0                         prelude_bytes(K)
//!      |                                    |
//!      v                                    v
//!   [tail: succ|pred][head_0]..[head_{K-1}][prologue hdr|ftr][epilogue hdr]
//!                                                              ^
//!                                                     prologue_bp(K) is the
//!                                                     prologue block's `bp`;
//!                                                     its header sits right
//!                                                     before it and its
//!                                                     footer coincides with
//!                                                     it (an 8-byte, no-
//!                                                     payload block).
//! ```
//!
//! All of these are pure functions of `classes` (`K`); nothing here touches
//! memory. Grounded on `original_source/mm.c`'s `mm_init`, which lays out
//! exactly this prelude for `N_SEGLIST` classes.

use crate::block::FIELD;

/// Total size of the prelude: tail (2 fields) + `classes` heads + prologue
/// header/footer (2 fields) + epilogue header (1 field).
#[inline]
pub const fn prelude_bytes(classes: usize) -> u32 {
  (classes as u32 + 5) * FIELD
}

/// The prologue block's `bp`. This is also `heap_listp` — the starting
/// point of physical-order block traversal.
#[inline]
pub const fn prologue_bp(classes: usize) -> u32 {
  (classes as u32 + 3) * FIELD
}

/// The epilogue block's `bp`, immediately after a freshly initialized
/// prelude (before any user block has been carved out). Equal to
/// `prologue_bp(classes) + 8`, the prologue's fixed size.
#[inline]
pub const fn initial_epilogue_bp(classes: usize) -> u32 {
  prelude_bytes(classes)
}
