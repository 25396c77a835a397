//! Tunables for a [`crate::heap::Heap`]: the size-class count `K` (default
//! 13, must be odd) and the growth chunk size `CHUNK` (default 512 bytes;
//! 4 KiB is a reasonable alternative for workloads with larger requests).
//!
//! Exposed as a runtime-checked struct rather than compile-time constants
//! so tests can exercise a tiny `CHUNK` to force grow-on-miss deterministically
//! without recompiling, the same way the original C driver would require
//! editing and rebuilding with a different `CHUNKSIZE` macro.

use thiserror::Error;

use crate::block::MIN_BLOCK;

/// Default number of size classes (must be odd; see [`HeapConfig::validate`]).
pub const DEFAULT_CLASSES: usize = 13;

/// Default heap growth increment, in bytes.
pub const DEFAULT_CHUNK: usize = 512;

/// Runtime configuration for a [`crate::heap::Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapConfig {
  /// Number of segregated size classes, `K`.
  pub classes: usize,
  /// Bytes requested from the arena on a fit-search miss.
  pub chunk: usize,
}

impl Default for HeapConfig {
  fn default() -> Self {
    Self {
      classes: DEFAULT_CLASSES,
      chunk: DEFAULT_CHUNK,
    }
  }
}

impl HeapConfig {
  /// Builds a config, rejecting values that would break the prelude
  /// layout or the growth policy.
  pub fn new(classes: usize, chunk: usize) -> Result<Self, ConfigError> {
    let cfg = Self { classes, chunk };
    cfg.validate()?;
    Ok(cfg)
  }

  /// Checks the invariants [`HeapConfig`]'s fields must hold:
  /// - `classes` must be odd and at least 3 (so the prelude — tail plus
  ///   class heads — leaves the prologue 8-byte aligned, per the data
  ///   model's prelude layout);
  /// - `chunk` must be a multiple of 8 no smaller than [`MIN_BLOCK`] — the
  ///   same floor `original_source/mm.c`'s `extend_heap` enforces with
  ///   `if (words < 4) words = 4;`, since a grow smaller than one minimum
  ///   block can't even hold the free block `extend_heap` carves from it.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.classes < 3 || self.classes % 2 == 0 {
      return Err(ConfigError::InvalidClassCount(self.classes));
    }
    if self.chunk == 0 || self.chunk % 8 != 0 || self.chunk < MIN_BLOCK as usize {
      return Err(ConfigError::InvalidChunk(self.chunk));
    }
    Ok(())
  }
}

/// Errors rejecting a [`HeapConfig`] at construction time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("class count {0} must be odd and >= 3")]
  InvalidClassCount(usize),
  #[error("chunk size {0} must be a multiple of 8 of at least {1} bytes", MIN_BLOCK)]
  InvalidChunk(usize),
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_config_is_valid() {
    HeapConfig::default().validate().unwrap();
  }

  #[test]
  fn rejects_even_class_count() {
    assert_eq!(HeapConfig::new(12, 512), Err(ConfigError::InvalidClassCount(12)));
  }

  #[test]
  fn rejects_too_few_classes() {
    assert_eq!(HeapConfig::new(1, 512), Err(ConfigError::InvalidClassCount(1)));
  }

  #[test]
  fn rejects_misaligned_chunk() {
    assert_eq!(HeapConfig::new(13, 100), Err(ConfigError::InvalidChunk(100)));
    assert_eq!(HeapConfig::new(13, 0), Err(ConfigError::InvalidChunk(0)));
  }

  #[test]
  fn rejects_chunk_below_one_minimum_block() {
    // A chunk smaller than MIN_BLOCK can't even hold the single free
    // block extend_heap would carve from it — see the corruption this
    // used to let through via Heap::with_config + init().
    assert_eq!(HeapConfig::new(13, 8), Err(ConfigError::InvalidChunk(8)));
  }

  #[test]
  fn accepts_smallest_valid_chunk_for_tests() {
    HeapConfig::new(13, MIN_BLOCK as usize).unwrap();
    HeapConfig::new(13, 32).unwrap();
  }
}
