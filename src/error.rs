//! Error taxonomy.
//!
//! The allocator's public API keeps the C-shaped "null means failure"
//! contract: resource exhaustion is the only condition
//! [`crate::heap::Heap::alloc`]/`realloc`/`calloc` surface to a caller, and
//! they surface it as `None`, not as a `Result` — that shape is part of the
//! data model, not a detail to "Rustify" away. What *does* get a typed
//! error is everything at the edges that a caller can hand malformed input
//! to: building a [`crate::config::HeapConfig`] (see
//! [`crate::config::ConfigError`]) and tagging a [`crate::check`] call.

use thiserror::Error;

/// A caller-supplied tag identifying where a [`crate::check`] call came
/// from, surfaced in diagnostic output the way the original's `lineno`
/// parameter did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CheckTag(pub i32);

impl CheckTag {
  /// The tag used for checks the library inserts automatically between
  /// API calls rather than ones requested by a caller.
  pub const INTERNAL: CheckTag = CheckTag(0);
}

impl std::fmt::Display for CheckTag {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// The arena failed to supply the memory [`crate::heap::Heap::init`] needed
/// for the initial prelude and first chunk.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("heap arena out of memory during initialization")]
pub struct InitError;

/// A single invariant breach reported by [`crate::check::check_heap`].
///
/// The checker never repairs a violation, only reports it — this is a
/// diagnostic sink, not an exceptional return.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Violation {
  #[error("[{tag}] bad prologue: size={size}, alloc={alloc}")]
  BadPrologue { tag: CheckTag, size: u32, alloc: bool },

  #[error("[{tag}] bad epilogue: size={size}, alloc={alloc}")]
  BadEpilogue { tag: CheckTag, size: u32, alloc: bool },

  #[error("[{tag}] block at offset {offset} is not 8-byte aligned")]
  Misaligned { tag: CheckTag, offset: u32 },

  #[error("[{tag}] block at offset {offset} has size {size} below the minimum block size")]
  TooSmall { tag: CheckTag, offset: u32, size: u32 },

  #[error("[{tag}] free block at offset {offset}: header {header:#x} != footer {footer:#x}")]
  HeaderFooterMismatch { tag: CheckTag, offset: u32, header: u32, footer: u32 },

  #[error(
    "[{tag}] block at offset {offset} has prev_alloc={prev_alloc}, but the previous block's alloc bit is {actual}"
  )]
  PrevAllocMismatch { tag: CheckTag, offset: u32, prev_alloc: bool, actual: bool },

  #[error("[{tag}] two consecutive free blocks at offsets {first} and {second}")]
  AdjacentFreeBlocks { tag: CheckTag, first: u32, second: u32 },

  #[error("[{tag}] heap tiling is broken: block at offset {offset} does not end where the next one starts")]
  TilingGap { tag: CheckTag, offset: u32 },

  #[error("[{tag}] free-list offset {offset} lies outside the heap")]
  OutOfHeap { tag: CheckTag, offset: u32 },

  #[error("[{tag}] free-list link broken: succ(pred({offset})) != {offset}")]
  PredSuccMismatch { tag: CheckTag, offset: u32 },

  #[error("[{tag}] free-list link broken: pred(succ({offset})) != {offset}")]
  SuccPredMismatch { tag: CheckTag, offset: u32 },

  #[error("[{tag}] block at offset {offset} with size {size} is in class {actual_class}, but belongs in class {expected_class}")]
  WrongClass { tag: CheckTag, offset: u32, size: u32, actual_class: usize, expected_class: usize },

  #[error(
    "[{tag}] free-block count mismatch: {physical} found by physical-order traversal, {by_list} found across free lists"
  )]
  FreeCountMismatch { tag: CheckTag, physical: usize, by_list: usize },
}

impl Violation {
  /// The tag this violation was reported under.
  pub fn tag(&self) -> CheckTag {
    match self {
      Violation::BadPrologue { tag, .. }
      | Violation::BadEpilogue { tag, .. }
      | Violation::Misaligned { tag, .. }
      | Violation::TooSmall { tag, .. }
      | Violation::HeaderFooterMismatch { tag, .. }
      | Violation::PrevAllocMismatch { tag, .. }
      | Violation::AdjacentFreeBlocks { tag, .. }
      | Violation::TilingGap { tag, .. }
      | Violation::OutOfHeap { tag, .. }
      | Violation::PredSuccMismatch { tag, .. }
      | Violation::SuccPredMismatch { tag, .. }
      | Violation::WrongClass { tag, .. }
      | Violation::FreeCountMismatch { tag, .. } => *tag,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn violation_display_includes_tag() {
    let v = Violation::TooSmall { tag: CheckTag(42), offset: 100, size: 8 };
    let rendered = v.to_string();
    assert!(rendered.contains("42"));
    assert!(rendered.contains("100"));
  }

  #[test]
  fn tag_accessor_matches_construction() {
    let v = Violation::OutOfHeap { tag: CheckTag(7), offset: 0 };
    assert_eq!(v.tag(), CheckTag(7));
  }
}
