use std::{alloc::Layout, ptr, ptr::NonNull};

use libc::{c_void, free, malloc};
use tracing::{debug, error};

use crate::{
  align::ALIGNMENT,
  error::{ArenaError, ArenaResult},
};

/// A simulated heap: one fixed-capacity region with a bump `top`.
///
/// ```text
///   start                      top                         end
///     ┌─────────┬──────┬────────┬───────────────────────────┐
///     │ block   │ ...  │ block  │      not yet reserved     │
///     └─────────┴──────┴────────┴───────────────────────────┘
/// ```
///
/// `top` only moves forward through [`Arena::grow`] and jumps back to
/// `start` on [`Arena::reset`]. It never passes `end`.
pub struct Arena {
  start: *mut u8,
  top: *mut u8,
  end: *mut u8,
}

impl Arena {
  /// Creates an arena with no backing region. Every `grow` fails until
  /// [`Arena::init`] is called.
  pub const fn new() -> Self {
    Self {
      start: ptr::null_mut(),
      top: ptr::null_mut(),
      end: ptr::null_mut(),
    }
  }

  pub fn with_capacity(capacity: usize) -> Self {
    let mut arena = Self::new();
    arena.init(capacity);
    arena
  }

  /// Reserves the backing region.
  ///
  /// # Panics
  ///
  /// Panics if the arena is already initialized. Aborts through
  /// [`std::alloc::handle_alloc_error`] if the system cannot supply
  /// `capacity` bytes.
  pub fn init(
    &mut self,
    capacity: usize,
  ) {
    if self.is_initialized() {
      error!("memory already initialized, call teardown before init");
      panic!("arena initialized twice");
    }

    let start = unsafe { malloc(capacity.max(1)) } as *mut u8;

    if start.is_null() {
      error!("failed to allocate {} bytes from the system", capacity);
      let layout =
        Layout::from_size_align(capacity.max(1), ALIGNMENT).unwrap_or(Layout::new::<u8>());
      std::alloc::handle_alloc_error(layout);
    }

    self.start = start;
    self.top = start;
    self.end = unsafe { start.add(capacity) };

    debug!("system memory initialized");
    self.log_status();
  }

  /// Reserves `n` bytes and returns the previous top.
  pub fn grow(
    &mut self,
    n: usize,
  ) -> ArenaResult<NonNull<u8>> {
    let Some(old_top) = NonNull::new(self.top) else {
      error!("system memory not initialized");
      return Err(ArenaError::Uninitialized);
    };

    let available = self.remaining();
    if n > available {
      error!(requested = n, available, "memory limit exceeded");
      return Err(ArenaError::CapacityExceeded { requested: n, available });
    }

    self.top = unsafe { self.top.add(n) };
    debug!(bytes = n, top = ?self.top, "arena grew");

    Ok(old_top)
  }

  /// Rewinds `top` to `start`. Everything handed out before is invalid.
  pub fn reset(&mut self) {
    self.top = self.start;
    debug!("arena reset");
  }

  /// Releases the backing region. No-op on an uninitialized arena.
  pub fn teardown(&mut self) {
    if !self.is_initialized() {
      return;
    }

    unsafe { free(self.start as *mut c_void) };

    self.start = ptr::null_mut();
    self.top = ptr::null_mut();
    self.end = ptr::null_mut();
  }

  pub fn is_initialized(&self) -> bool {
    !self.start.is_null()
  }

  pub fn start(&self) -> *mut u8 {
    self.start
  }

  pub fn top(&self) -> *mut u8 {
    self.top
  }

  pub fn end(&self) -> *mut u8 {
    self.end
  }

  /// Bytes reserved so far (`top - start`).
  pub fn size(&self) -> usize {
    self.top as usize - self.start as usize
  }

  pub fn capacity(&self) -> usize {
    self.end as usize - self.start as usize
  }

  pub fn remaining(&self) -> usize {
    self.end as usize - self.top as usize
  }

  /// Whether `addr` lies inside the reserved part of the arena.
  pub fn contains(
    &self,
    addr: *const u8,
  ) -> bool {
    self.is_initialized() && addr >= self.start as *const u8 && addr < self.top as *const u8
  }

  fn log_status(&self) {
    debug!("memory start: {:?}", self.start);
    debug!("memory brk: {:?}", self.top);
    debug!("memory size: {}", self.size());
  }
}

impl Default for Arena {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Arena {
  fn drop(&mut self) {
    self.teardown();
  }
}
