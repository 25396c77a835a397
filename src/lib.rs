//! # seglloc - A Segregated-Fit Memory Allocator
//!
//! This crate provides a **segregated free-list allocator**: user memory
//! comes from a single, monotonically-growing arena (managed with the
//! `sbrk` system call, like a classic Unix heap), and freed blocks are
//! indexed by size class so that `alloc`/`free`/`realloc`/`calloc` can find
//! and recycle space without ever scanning the whole heap.
//!
//! ## Overview
//!
//! ```text
//!   Segregated free lists, one per size class:
//!
//!   class 0  [16, 32)    -> bp -> bp -> tail
//!   class 1  [32, 64)    -> tail
//!   class 2  [64, 128)   -> bp -> tail
//!     ...
//!   class K-1 [16*2^(K-1), inf) -> bp -> tail
//!
//!   Each block carries a boundary tag (header, and — while free — a
//!   matching footer) so neighbors can be found and merged in O(1):
//!
//!   ...| HDR | payload / free-list links | FTR |...
//! ```
//!
//! A request is rounded up to an 8-byte-aligned block size, then satisfied
//! by the first block big enough in the smallest size class that could
//! hold it (first-fit within a class, ascending on a miss). If no class
//! has room, the arena is grown by `sbrk` and the new space is carved off
//! instead. Freeing a block immediately coalesces it with any free
//! physical neighbor, using each block's `prev_alloc` bit to tell whether
//! a footer even exists to read.
//!
//! ## Crate Structure
//!
//! ```text
//!   seglloc
//!   ├── align      - 8-byte alignment helpers
//!   ├── mem        - raw word access into the heap buffer
//!   ├── block      - header/footer bit-packing, neighbor addressing
//!   ├── layout     - the fixed heap prelude (tail, class heads, prologue, epilogue)
//!   ├── freelist   - the segregated free-list index (insert/unlink/class_of)
//!   ├── coalesce   - boundary-tag merging of adjacent free blocks
//!   ├── fit        - first-fit search across size classes
//!   ├── place      - split-or-consume placement of a fit
//!   ├── check      - the two-pass consistency checker
//!   ├── config     - runtime-tunable `HeapConfig` (class count, growth chunk)
//!   ├── error      - the typed errors at the edges of the API
//!   ├── arena      - the sbrk-backed memory source
//!   ├── heap       - `Heap`, the public alloc/free/realloc/calloc surface
//!   └── global     - an optional `GlobalAlloc` adapter over a `Heap`
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use seglloc::Heap;
//!
//! let mut heap = Heap::new();
//! let p = heap.alloc(64).expect("allocation failed");
//!
//! unsafe {
//!     std::ptr::write_bytes(p, 0xAB, 64);
//!     heap.free(p);
//! }
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded core**: [`Heap`] itself carries no synchronization;
//!   [`GlobalHeap`] adds a `Mutex` only where `GlobalAlloc` requires `Sync`.
//! - **Never shrinks**: the arena grows via `sbrk` and never returns memory
//!   to the OS, even once every block in it is free.
//! - **Unix-only**: requires `libc` and `sbrk` (POSIX systems).
//!
//! ## Safety
//!
//! This crate is inherently unsafe as it deals with raw memory management.
//! [`Heap::free`], [`Heap::realloc`] and [`Heap::check`] require `unsafe`
//! blocks; [`Heap::alloc`], [`Heap::calloc`] and [`Heap::init`] are safe
//! wrappers that do their unsafe work internally.

pub mod align;
mod arena;
mod block;
mod check;
mod coalesce;
pub mod config;
pub mod error;
mod fit;
mod freelist;
pub mod global;
pub mod heap;
mod layout;
mod mem;
mod place;

pub use config::{ConfigError, HeapConfig};
pub use error::{CheckTag, InitError, Violation};
pub use global::GlobalHeap;
pub use heap::Heap;
