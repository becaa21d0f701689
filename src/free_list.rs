use std::{cmp, ptr, ptr::NonNull};

use tracing::{debug, error, warn};

use crate::{
  align,
  arena::Arena,
  block::{FreeNode, HEADER_SIZE, Header, MAGIC, NODE_SIZE},
  config::{AllocatorConfig, SearchMode},
  error::{AllocError, AllocResult, ArenaError},
};

/// A free block as seen from outside: its offset from the arena start
/// and its full span in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreeBlock {
  pub offset: usize,
  pub size: usize,
}

/// Free-list allocator carving blocks out of an owned [`Arena`].
///
/// ```text
///   arena start
///   ┌────────┬──────────────┬──────────┬──────────────┬──────────┐
///   │ anchor │ header│ data │ FreeNode │ header│ data │ FreeNode │ ...
///   └────────┴──────────────┴──────────┴──────────────┴──────────┘
///       │                        ▲  │                      ▲
///       └────────────────────────┘  └──────────────────────┘
///              next (ascending address order)
/// ```
///
/// The list always starts at the anchor node carved at initialization.
/// The anchor holds no payload, so it is never handed out nor merged with
/// the block that follows it.
pub struct FreeListAllocator {
  arena: Arena,
  head: *mut FreeNode,
  config: AllocatorConfig,
}

impl FreeListAllocator {
  /// Takes ownership of an initialized arena and seeds the free list.
  pub fn init(
    mut arena: Arena,
    config: AllocatorConfig,
  ) -> AllocResult<Self> {
    let head = Self::seed(&mut arena)?;

    debug!(search_mode = %config.search_mode, "free list initialized");

    Ok(Self { arena, head, config })
  }

  fn seed(arena: &mut Arena) -> AllocResult<*mut FreeNode> {
    let block = arena.grow(NODE_SIZE)?;
    Ok(unsafe { FreeNode::write(block.as_ptr(), NODE_SIZE) })
  }

  pub fn arena(&self) -> &Arena {
    &self.arena
  }

  pub fn config(&self) -> &AllocatorConfig {
    &self.config
  }

  pub fn set_search_mode(
    &mut self,
    mode: SearchMode,
  ) {
    self.config.search_mode = mode;
  }

  pub fn into_arena(self) -> Arena {
    self.arena
  }

  /// Rewinds the arena and starts over with a fresh anchor. Every pointer
  /// handed out so far becomes invalid.
  pub fn reset(&mut self) -> AllocResult<()> {
    self.arena.reset();
    self.head = Self::seed(&mut self.arena)?;
    Ok(())
  }

  /// Block size needed to serve `size` payload bytes, header included.
  fn needed_size(
    &self,
    size: usize,
  ) -> AllocResult<usize> {
    size
      .checked_add(HEADER_SIZE + align::ALIGNMENT)
      .map(|_| align!(size + HEADER_SIZE))
      .ok_or(AllocError::Arena(ArenaError::CapacityExceeded {
        requested: size,
        available: self.arena.remaining(),
      }))
  }

  /// Allocates `size` bytes, returning null on failure.
  pub fn allocate(
    &mut self,
    size: usize,
  ) -> *mut u8 {
    match self.try_allocate(size) {
      Ok(payload) => payload.as_ptr(),
      Err(err) => {
        error!(size, "allocation failed: {}", err);
        ptr::null_mut()
      }
    }
  }

  pub fn try_allocate(
    &mut self,
    size: usize,
  ) -> AllocResult<NonNull<u8>> {
    if self.config.search_mode == SearchMode::Unset {
      return Err(AllocError::SearchModeUnset);
    }

    let needed = self.needed_size(size)?;

    unsafe {
      let node = self.find_fit(needed);

      let payload = if node.is_null() {
        let block = self.arena.grow(needed)?;
        Header::write(block.as_ptr(), needed - HEADER_SIZE)
      } else {
        self.take(node, needed)
      };

      debug!(size, needed, payload = ?payload, "allocated");

      // Both paths write through a non-null arena address.
      Ok(NonNull::new_unchecked(payload))
    }
  }

  /// Picks a candidate under the configured search mode. The anchor never
  /// qualifies.
  unsafe fn find_fit(
    &self,
    needed: usize,
  ) -> *mut FreeNode {
    unsafe {
      let mut found: *mut FreeNode = ptr::null_mut();
      let mut current = (*self.head).next;

      while !current.is_null() {
        let size = (*current).size;

        if size >= needed {
          match self.config.search_mode {
            SearchMode::FirstFit => return current,
            SearchMode::BestFit => {
              if found.is_null() || size < (*found).size {
                found = current;
              }
            }
            SearchMode::WorstFit => {
              if found.is_null() || size > (*found).size {
                found = current;
              }
            }
            SearchMode::Unset => return ptr::null_mut(),
          }
        }

        current = (*current).next;
      }

      found
    }
  }

  /// Unlinks `node`, splits off the tail when it can hold a free node of
  /// its own, and writes the header of what is handed out.
  unsafe fn take(
    &mut self,
    node: *mut FreeNode,
    needed: usize,
  ) -> *mut u8 {
    unsafe {
      self.remove(node);

      let size = (*node).size;
      let remainder = size - needed;

      let span = if remainder > NODE_SIZE {
        let rest = FreeNode::write((node as *mut u8).add(needed), remainder);
        debug!(block = ?node, needed, remainder, "split");
        self.insert(rest);
        needed
      } else {
        size
      };

      Header::write(node as *mut u8, span - HEADER_SIZE)
    }
  }

  /// Returns a block to the free list.
  ///
  /// # Safety
  ///
  /// `address` must be null or a live pointer obtained from this allocator.
  pub unsafe fn free(
    &mut self,
    address: *mut u8,
  ) {
    if let Err(err) = unsafe { self.try_free(address) } {
      error!(address = ?address, "free failed: {}", err);
    }
  }

  /// # Safety
  ///
  /// Same contract as [`FreeListAllocator::free`]. With `verify_headers`
  /// enabled, pointers outside the arena or with a damaged header are
  /// rejected instead of corrupting the list.
  pub unsafe fn try_free(
    &mut self,
    address: *mut u8,
  ) -> AllocResult<()> {
    if address.is_null() {
      return Ok(());
    }

    unsafe {
      let header = self.checked_header(address)?;
      let span = (*header).size + HEADER_SIZE;

      let node = FreeNode::write(header as *mut u8, span);
      self.insert(node);
      self.coalesce();
    }

    debug!(address = ?address, "freed");
    Ok(())
  }

  /// Moves the contents of `address` into a fresh block of `size` bytes.
  /// Returns null when `size` is zero or the new block cannot be served.
  ///
  /// # Safety
  ///
  /// Same contract as [`FreeListAllocator::free`].
  pub unsafe fn reallocate(
    &mut self,
    address: *mut u8,
    size: usize,
  ) -> *mut u8 {
    match unsafe { self.try_reallocate(address, size) } {
      Ok(Some(payload)) => payload.as_ptr(),
      Ok(None) => ptr::null_mut(),
      Err(err) => {
        error!(address = ?address, size, "reallocation failed: {}", err);
        ptr::null_mut()
      }
    }
  }

  /// `Ok(None)` means `size` was zero and the block was freed. On error the
  /// old block is left as it was.
  ///
  /// # Safety
  ///
  /// Same contract as [`FreeListAllocator::free`].
  pub unsafe fn try_reallocate(
    &mut self,
    address: *mut u8,
    size: usize,
  ) -> AllocResult<Option<NonNull<u8>>> {
    if address.is_null() {
      return self.try_allocate(size).map(Some);
    }

    unsafe {
      if size == 0 {
        self.try_free(address)?;
        return Ok(None);
      }

      let old_header = self.checked_header(address)?;
      let new_payload = self.try_allocate(size)?;
      let new_header = Header::from_payload(new_payload.as_ptr());

      let copy_size = cmp::min((*old_header).size, (*new_header).size);
      ptr::copy_nonoverlapping(address, new_payload.as_ptr(), copy_size);

      self.try_free(address)?;

      Ok(Some(new_payload))
    }
  }

  /// Usable bytes behind a pointer handed out by this allocator.
  ///
  /// # Safety
  ///
  /// `address` must be a live pointer obtained from this allocator.
  pub unsafe fn payload_size(
    &self,
    address: *mut u8,
  ) -> usize {
    unsafe { (*Header::from_payload(address)).size }
  }

  unsafe fn checked_header(
    &self,
    address: *mut u8,
  ) -> AllocResult<*mut Header> {
    if !self.config.verify_headers {
      return Ok(unsafe { Header::from_payload(address) });
    }

    let header_addr = (address as usize).wrapping_sub(HEADER_SIZE);
    let corrupt = AllocError::CorruptHeader { addr: header_addr };

    if header_addr % align::ALIGNMENT != 0 {
      return Err(corrupt);
    }

    let first_header = self.head as usize + NODE_SIZE;
    let header_end = header_addr.wrapping_add(HEADER_SIZE - 1);
    if header_addr < first_header || !self.arena.contains(header_end as *const u8) {
      return Err(corrupt);
    }

    let header = unsafe { Header::from_payload(address) };
    if unsafe { (*header).magic } != MAGIC {
      return Err(corrupt);
    }

    Ok(header)
  }

  /// Links `node` in at its address-sorted position, then merges neighbors.
  unsafe fn insert(
    &mut self,
    node: *mut FreeNode,
  ) {
    unsafe {
      let mut previous: *mut FreeNode = ptr::null_mut();
      let mut current = self.head;

      while !current.is_null() && node > current {
        previous = current;
        current = (*current).next;
      }

      if previous.is_null() {
        (*node).next = self.head;
        self.head = node;
      } else {
        (*previous).next = node;
        (*node).next = current;
      }

      self.coalesce();
    }
  }

  /// Unlinks `node`. Returns `false` when it is not on the list.
  unsafe fn remove(
    &mut self,
    node: *mut FreeNode,
  ) -> bool {
    unsafe {
      let mut previous: *mut FreeNode = ptr::null_mut();
      let mut current = self.head;

      while !current.is_null() && current != node {
        previous = current;
        current = (*current).next;
      }

      if current.is_null() {
        warn!(node = ?node, "node not found");
        return false;
      }

      if previous.is_null() {
        self.head = (*current).next;
      } else {
        (*previous).next = (*current).next;
      }

      self.coalesce();
      true
    }
  }

  /// Merges every run of address-adjacent free blocks in one forward pass.
  unsafe fn coalesce(&mut self) {
    unsafe {
      if self.head.is_null() {
        return;
      }

      let mut current = (*self.head).next;

      while !current.is_null() {
        let next = (*current).next;
        if next.is_null() {
          break;
        }

        if (*current).end() == next as *mut u8 {
          debug!(block = ?current, absorbed = (*next).size, "coalesce");
          (*current).size += (*next).size;
          (*current).next = (*next).next;
        } else {
          current = next;
        }
      }
    }
  }

  /// Free blocks in address order, excluding the anchor.
  pub fn free_blocks(&self) -> Vec<FreeBlock> {
    let start = self.arena.start() as usize;
    let mut blocks = Vec::new();

    unsafe {
      let mut current = (*self.head).next;

      while !current.is_null() {
        blocks.push(FreeBlock {
          offset: current as usize - start,
          size: (*current).size,
        });
        current = (*current).next;
      }
    }

    blocks
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  const CAPACITY: usize = 4096;

  fn heap(mode: SearchMode) -> FreeListAllocator {
    FreeListAllocator::init(Arena::with_capacity(CAPACITY), AllocatorConfig::new(mode)).unwrap()
  }

  fn offset(
    allocator: &FreeListAllocator,
    address: *mut u8,
  ) -> usize {
    address as usize - allocator.arena().start() as usize
  }

  /// Span an arena-served request of `size` bytes occupies.
  fn span(size: usize) -> usize {
    align!(size + HEADER_SIZE)
  }

  #[test]
  fn test_init_requires_initialized_arena() {
    let result = FreeListAllocator::init(Arena::new(), AllocatorConfig::default());

    assert!(matches!(result, Err(AllocError::Arena(ArenaError::Uninitialized))));
  }

  #[test]
  fn test_first_allocation_grows_arena() {
    let mut allocator = heap(SearchMode::FirstFit);

    assert!(allocator.free_blocks().is_empty());
    assert_eq!(allocator.arena().size(), NODE_SIZE);

    let first = allocator.allocate(8);

    assert!(!first.is_null());
    assert_eq!(offset(&allocator, first), NODE_SIZE + HEADER_SIZE);
    assert_eq!(allocator.arena().size(), NODE_SIZE + span(8));
    assert!(allocator.free_blocks().is_empty());
  }

  #[test]
  fn test_allocate_zero_bytes() {
    let mut allocator = heap(SearchMode::FirstFit);

    let address = allocator.allocate(0);

    assert!(!address.is_null());
    assert_eq!(unsafe { allocator.payload_size(address) }, 0);
    assert!(allocator.free_blocks().is_empty());
  }

  #[test]
  fn test_payloads_are_aligned() {
    let mut allocator = heap(SearchMode::BestFit);
    let mut live = Vec::new();

    for size in [1, 3, 8, 13, 27, 64, 100] {
      live.push(allocator.allocate(size));
    }
    unsafe {
      allocator.free(live[1]);
      allocator.free(live[4]);
    }
    live.push(allocator.allocate(5));
    live.push(allocator.allocate(9));

    for address in live {
      assert_eq!(address as usize % align::ALIGNMENT, 0);
    }
  }

  #[test]
  fn test_free_then_reuse() {
    for mode in [SearchMode::FirstFit, SearchMode::BestFit, SearchMode::WorstFit] {
      let mut allocator = heap(mode);

      let first = allocator.allocate(64);
      let used = allocator.arena().size();

      unsafe { allocator.free(first) };
      let second = allocator.allocate(64);

      assert_eq!(first, second, "{mode}");
      assert_eq!(allocator.arena().size(), used, "{mode}");
      assert!(allocator.free_blocks().is_empty(), "{mode}");
    }
  }

  #[test]
  fn test_free_null_is_noop() {
    let mut allocator = heap(SearchMode::FirstFit);
    allocator.allocate(16);

    unsafe { allocator.free(ptr::null_mut()) };

    assert!(allocator.free_blocks().is_empty());
  }

  #[test]
  fn test_adjacent_frees_coalesce_in_either_order() {
    for reversed in [false, true] {
      let mut allocator = heap(SearchMode::FirstFit);

      let a = allocator.allocate(64);
      let b = allocator.allocate(64);
      let _guard = allocator.allocate(8);

      unsafe {
        if reversed {
          allocator.free(b);
          allocator.free(a);
        } else {
          allocator.free(a);
          allocator.free(b);
        }
      }

      assert_eq!(
        allocator.free_blocks(),
        vec![FreeBlock {
          offset: NODE_SIZE,
          size: 2 * span(64),
        }]
      );

      let used = allocator.arena().size();
      let merged = allocator.allocate(120);

      assert_eq!(merged, a);
      assert_eq!(allocator.arena().size(), used);
    }
  }

  #[test]
  fn test_coalesce_run_of_three_in_one_pass() {
    let mut allocator = heap(SearchMode::FirstFit);

    let a = allocator.allocate(32);
    let b = allocator.allocate(32);
    let c = allocator.allocate(32);
    let _guard = allocator.allocate(8);

    unsafe {
      allocator.free(a);
      allocator.free(c);
      assert_eq!(allocator.free_blocks().len(), 2);

      allocator.free(b);
    }

    assert_eq!(
      allocator.free_blocks(),
      vec![FreeBlock {
        offset: NODE_SIZE,
        size: 3 * span(32),
      }]
    );
  }

  #[test]
  fn test_anchor_never_merges() {
    let mut allocator = heap(SearchMode::FirstFit);

    let first = allocator.allocate(24);
    unsafe { allocator.free(first) };

    assert_eq!(
      allocator.free_blocks(),
      vec![FreeBlock {
        offset: NODE_SIZE,
        size: span(24),
      }]
    );
  }

  /// Frees blocks of 32, 128 and 64 bytes, separated by live spacers.
  fn three_holes(mode: SearchMode) -> (FreeListAllocator, [*mut u8; 3]) {
    let mut allocator = heap(mode);
    let mut holes = [ptr::null_mut(); 3];

    for (hole, block) in holes.iter_mut().zip([32, 128, 64]) {
      *hole = allocator.allocate(block - HEADER_SIZE);
      allocator.allocate(8);
    }
    for hole in holes {
      unsafe { allocator.free(hole) };
    }

    let sizes: Vec<usize> = allocator.free_blocks().iter().map(|b| b.size).collect();
    assert_eq!(sizes, vec![32, 128, 64]);

    (allocator, holes)
  }

  #[test]
  fn test_search_mode_selection() {
    let cases = [
      (SearchMode::FirstFit, 1),
      (SearchMode::BestFit, 2),
      (SearchMode::WorstFit, 1),
    ];

    for (mode, expected) in cases {
      let (mut allocator, holes) = three_holes(mode);
      let used = allocator.arena().size();

      let address = allocator.allocate(40);

      assert_eq!(address, holes[expected], "{mode}");
      assert_eq!(allocator.arena().size(), used, "{mode}");
    }
  }

  #[test]
  fn test_split_leaves_tail_free() {
    let (mut allocator, holes) = three_holes(SearchMode::FirstFit);
    let tail = offset(&allocator, holes[1]) - HEADER_SIZE + span(40);

    allocator.allocate(40);

    let blocks = allocator.free_blocks();
    assert_eq!(blocks.len(), 3);
    assert_eq!(
      blocks[1],
      FreeBlock {
        offset: tail,
        size: 128 - span(40),
      }
    );
    assert_eq!(unsafe { allocator.payload_size(holes[1]) }, span(40) - HEADER_SIZE);
  }

  #[test]
  fn test_small_remainder_is_not_split() {
    let (mut allocator, holes) = three_holes(SearchMode::BestFit);

    let address = allocator.allocate(40);

    assert_eq!(address, holes[2]);
    assert_eq!(unsafe { allocator.payload_size(address) }, 64 - HEADER_SIZE);
    assert_eq!(allocator.free_blocks().len(), 2);
  }

  #[test]
  fn test_unset_mode_fails_without_growth() {
    let mut allocator = heap(SearchMode::Unset);
    let used = allocator.arena().size();

    assert!(allocator.allocate(16).is_null());
    assert_eq!(allocator.try_allocate(16), Err(AllocError::SearchModeUnset));
    assert_eq!(allocator.arena().size(), used);
    assert!(allocator.arena().remaining() > 16);

    allocator.set_search_mode(SearchMode::FirstFit);
    assert!(!allocator.allocate(16).is_null());
  }

  #[test]
  fn test_capacity_is_never_exceeded() {
    let mut allocator = heap(SearchMode::WorstFit);
    let mut live = Vec::new();

    for round in 0.. {
      let address = allocator.allocate(40 + round % 7 * 24);
      assert!(allocator.arena().top() <= allocator.arena().end());

      if address.is_null() {
        break;
      }
      live.push(address);
      if round % 3 == 0 {
        unsafe { allocator.free(live.swap_remove(live.len() / 2)) };
      }
    }

    assert!(allocator.arena().size() <= CAPACITY);
    assert!(matches!(
      allocator.try_allocate(CAPACITY),
      Err(AllocError::Arena(ArenaError::CapacityExceeded { .. }))
    ));
  }

  #[test]
  fn test_huge_request_fails() {
    let mut allocator = heap(SearchMode::FirstFit);

    assert!(allocator.allocate(usize::MAX).is_null());
    assert_eq!(allocator.arena().size(), NODE_SIZE);
  }

  #[test]
  fn test_reallocate_null_is_allocate() {
    let mut plain = heap(SearchMode::FirstFit);
    let mut realloc = heap(SearchMode::FirstFit);

    let expected = plain.allocate(100);
    let address = unsafe { realloc.reallocate(ptr::null_mut(), 100) };

    assert_eq!(offset(&realloc, address), offset(&plain, expected));
    assert_eq!(realloc.arena().size(), plain.arena().size());
  }

  #[test]
  fn test_reallocate_zero_is_free() {
    let mut plain = heap(SearchMode::FirstFit);
    let mut realloc = heap(SearchMode::FirstFit);

    let a = plain.allocate(48);
    plain.allocate(8);
    let b = realloc.allocate(48);
    realloc.allocate(8);

    unsafe {
      plain.free(a);
      assert!(realloc.reallocate(b, 0).is_null());
    }

    assert_eq!(realloc.free_blocks(), plain.free_blocks());
    let fresh = unsafe { realloc.try_reallocate(ptr::null_mut(), 0) };
    assert_eq!(fresh.map(|p| p.is_some()), Ok(true));
  }

  #[test]
  fn test_reallocate_shrink_keeps_prefix() {
    let mut allocator = heap(SearchMode::FirstFit);

    unsafe {
      let old = allocator.allocate(64);
      for i in 0..64 {
        *old.add(i) = i as u8;
      }

      let new = allocator.reallocate(old, 16);

      assert!(!new.is_null());
      assert_ne!(new, old);
      for i in 0..16 {
        assert_eq!(*new.add(i), i as u8);
      }
      assert_eq!(allocator.free_blocks()[0].offset, offset(&allocator, old) - HEADER_SIZE);
    }
  }

  #[test]
  fn test_reallocate_grow_keeps_contents() {
    let mut allocator = heap(SearchMode::BestFit);

    unsafe {
      let old = allocator.allocate(24);
      for i in 0..24 {
        *old.add(i) = 0xA0 | i as u8;
      }

      let new = allocator.reallocate(old, 200);

      assert!(allocator.payload_size(new) >= 200);
      for i in 0..24 {
        assert_eq!(*new.add(i), 0xA0 | i as u8);
      }
    }
  }

  #[test]
  fn test_failed_reallocate_keeps_old_block() {
    let mut allocator = heap(SearchMode::FirstFit);

    unsafe {
      let old = allocator.allocate(32);
      *old = 7;

      assert!(allocator.reallocate(old, CAPACITY).is_null());
      assert_eq!(*old, 7);
      assert!(allocator.free_blocks().is_empty());
    }
  }

  #[test]
  fn test_verify_headers_rejects_damaged_header() {
    let config = AllocatorConfig::new(SearchMode::FirstFit).with_verify_headers(true);
    let mut allocator = FreeListAllocator::init(Arena::with_capacity(CAPACITY), config).unwrap();

    unsafe {
      let address = allocator.allocate(32);
      allocator.allocate(8);
      let header = Header::from_payload(address);

      (*header).magic = 0;
      assert_eq!(
        allocator.try_free(address),
        Err(AllocError::CorruptHeader {
          addr: header as usize,
        })
      );
      assert!(allocator.free_blocks().is_empty());

      (*header).magic = MAGIC;
      assert_eq!(allocator.try_free(address), Ok(()));
      assert_eq!(allocator.free_blocks().len(), 1);

      assert!(matches!(allocator.try_free(address), Err(AllocError::CorruptHeader { .. })));
      assert_eq!(allocator.free_blocks().len(), 1);
    }
  }

  #[test]
  fn test_verify_headers_rejects_foreign_pointer() {
    let config = AllocatorConfig::new(SearchMode::FirstFit).with_verify_headers(true);
    let mut allocator = FreeListAllocator::init(Arena::with_capacity(CAPACITY), config).unwrap();
    let mut outside = [0u64; 4];

    unsafe {
      let foreign = (outside.as_mut_ptr() as *mut u8).add(HEADER_SIZE);

      assert!(matches!(allocator.try_free(foreign), Err(AllocError::CorruptHeader { .. })));
      assert!(matches!(
        allocator.try_reallocate(foreign, 8),
        Err(AllocError::CorruptHeader { .. })
      ));
    }
    assert_eq!(allocator.arena().size(), NODE_SIZE);
  }

  #[test]
  fn test_verify_headers_rejects_misaligned_pointer() {
    let config = AllocatorConfig::new(SearchMode::FirstFit).with_verify_headers(true);
    let mut allocator = FreeListAllocator::init(Arena::with_capacity(CAPACITY), config).unwrap();

    unsafe {
      let address = allocator.allocate(32);
      allocator.allocate(8);
      let used = allocator.arena().size();

      assert!(matches!(
        allocator.try_free(address.add(1)),
        Err(AllocError::CorruptHeader { .. })
      ));
      assert!(matches!(
        allocator.try_reallocate(address.add(1), 8),
        Err(AllocError::CorruptHeader { .. })
      ));
      assert!(allocator.free_blocks().is_empty());
      assert_eq!(allocator.arena().size(), used);

      assert_eq!(allocator.try_free(address), Ok(()));
    }
  }

  #[test]
  fn test_verify_headers_rejects_header_past_top() {
    let config = AllocatorConfig::new(SearchMode::FirstFit).with_verify_headers(true);
    let mut allocator = FreeListAllocator::init(Arena::with_capacity(CAPACITY), config).unwrap();
    allocator.allocate(32);

    let top = allocator.arena().top();
    let address = unsafe { top.add(HEADER_SIZE - align::ALIGNMENT) };

    assert!(matches!(
      unsafe { allocator.try_free(address) },
      Err(AllocError::CorruptHeader { .. })
    ));
  }

  #[test]
  fn test_set_search_mode_updates_config() {
    let mut allocator = heap(SearchMode::Unset);

    allocator.set_search_mode(SearchMode::WorstFit);

    assert_eq!(allocator.config().search_mode, SearchMode::WorstFit);
    assert!(!allocator.config().verify_headers);
  }

  #[test]
  fn test_into_arena_keeps_reserved_bytes() {
    let mut allocator = heap(SearchMode::FirstFit);
    allocator.allocate(64);
    let used = allocator.arena().size();

    let mut arena = allocator.into_arena();

    assert!(arena.is_initialized());
    assert_eq!(arena.size(), used);
    arena.reset();
    assert_eq!(arena.size(), 0);
  }

  #[test]
  fn test_remove_missing_node() {
    let mut allocator = heap(SearchMode::FirstFit);
    let address = allocator.allocate(32);

    unsafe {
      let stray = Header::from_payload(address) as *mut FreeNode;
      assert!(!allocator.remove(stray));
    }
    assert!(allocator.free_blocks().is_empty());
  }

  #[test]
  fn test_reset_starts_over() {
    let mut allocator = heap(SearchMode::FirstFit);

    let first = allocator.allocate(32);
    let second = allocator.allocate(32);
    unsafe { allocator.free(second) };

    allocator.reset().unwrap();

    assert!(allocator.free_blocks().is_empty());
    assert_eq!(allocator.arena().size(), NODE_SIZE);
    assert_eq!(allocator.allocate(32), first);
  }

  #[test]
  fn test_independent_heaps() {
    let mut left = heap(SearchMode::FirstFit);
    let mut right = heap(SearchMode::WorstFit);

    let a = left.allocate(64);
    unsafe { left.free(a) };
    right.allocate(64);

    assert_eq!(left.free_blocks().len(), 1);
    assert!(right.free_blocks().is_empty());
    assert!(!right.arena().contains(a));
  }
}
