//! # rallocator - A Free-List Allocator over a Simulated Heap
//!
//! This crate implements a **free-list allocator** on top of an
//! [`Arena`], a fixed-capacity region that stands in for the process
//! heap. It exists to compare block placement strategies (first-fit,
//! best-fit, worst-fit) without touching the system allocator once the
//! arena is set up.
//!
//! ## Overview
//!
//! ```text
//!   Arena (simulated heap):
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │   ┌────┬───────┬──────┬───────┬──────┬───────────────────────────┐   │
//!   │   │ A  │  B1   │ free │  B2   │ free │     not yet reserved      │   │
//!   │   └────┴───────┴──────┴───────┴──────┴───────────────────────────┘   │
//!   │   ▲                                  ▲                           ▲   │
//!   │   │                                  │                           │   │
//!   │ start                               top                         end  │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   A  = anchor node of the free list (no payload)
//!   Bn = allocated blocks, free = blocks on the free list
//! ```
//!
//! Requests first search the free list under the configured
//! [`SearchMode`]. Only on a miss does the allocator bump the arena top.
//! Freed blocks go back on the list in address order and merge with
//! address-adjacent neighbors right away.
//!
//! ## Crate Structure
//!
//! ```text
//!   rallocator
//!   ├── align      - Alignment macros (align!, align_to!)
//!   ├── arena      - Arena: bump-only simulated heap
//!   ├── block      - Header / FreeNode metadata overlays (internal)
//!   ├── config     - SearchMode, AllocatorConfig, MAX_HEAP_SIZE
//!   ├── error      - ArenaError, AllocError
//!   └── free_list  - FreeListAllocator implementation
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rallocator::{AllocatorConfig, Arena, FreeListAllocator, SearchMode};
//!
//! let arena = Arena::with_capacity(4096);
//! let mut allocator =
//!   FreeListAllocator::init(arena, AllocatorConfig::new(SearchMode::BestFit)).unwrap();
//!
//! let ptr = allocator.allocate(64);
//! assert!(!ptr.is_null());
//!
//! unsafe {
//!   ptr.write_bytes(0xAB, 64);
//!   allocator.free(ptr);
//! }
//!
//! // The freed block is reused without growing the arena.
//! let used = allocator.arena().size();
//! assert_eq!(allocator.allocate(64), ptr);
//! assert_eq!(allocator.arena().size(), used);
//! ```
//!
//! ## Block Layout
//!
//! ```text
//!   Allocated block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    Header             │         User Data              │
//!   │  size: payload bytes  │                                │
//!   │  magic: 543456        │                                │
//!   └───────────────────────┴────────────────────────────────┘
//!                           ▲
//!                           └── Pointer returned to user (8-byte aligned)
//!
//!   Free block:
//!   ┌───────────────────────┬────────────────────────────────┐
//!   │    FreeNode           │         (unused)               │
//!   │  size: whole span     │                                │
//!   │  next: next free      │                                │
//!   └───────────────────────┴────────────────────────────────┘
//! ```
//!
//! ## Limitations
//!
//! - **Single-threaded only**: No synchronization primitives
//! - **Linear free list**: Search, insert and coalesce are O(n)
//! - **No in-place realloc**: Reallocation always moves the block
//!
//! ## Safety
//!
//! Allocation is safe to call. Freeing and reallocating trust the pointer
//! they are given, so they are `unsafe`. Enable
//! [`AllocatorConfig::verify_headers`] to reject damaged or foreign
//! pointers instead of corrupting the free list.

pub mod align;
mod arena;
mod block;
mod config;
mod error;
mod free_list;

pub use arena::Arena;
pub use block::{HEADER_SIZE, MAGIC, NODE_SIZE};
pub use config::{AllocatorConfig, MAX_HEAP_SIZE, SEARCH_SCHEME_VAR, SearchMode};
pub use error::{AllocError, AllocResult, ArenaError, ArenaResult};
pub use free_list::{FreeBlock, FreeListAllocator};
