use std::{mem, ptr};

/// Sanity tag stamped into every header handed to a caller.
pub const MAGIC: i32 = 543456;

pub const HEADER_SIZE: usize = mem::size_of::<Header>();
pub const NODE_SIZE: usize = mem::size_of::<FreeNode>();

/// Metadata overlaid on the leading bytes of an allocated block.
///
/// `size` is the usable payload capacity: the block's span minus
/// `HEADER_SIZE`.
#[repr(C)]
pub struct Header {
  pub size: usize,
  pub magic: i32,
}

/// Metadata overlaid on the leading bytes of a free block.
///
/// `size` is the whole span of the block, record included.
#[repr(C)]
pub struct FreeNode {
  pub size: usize,
  pub next: *mut FreeNode,
}

impl Header {
  /// Writes a header at `at` and returns the payload address just past it.
  ///
  /// # Safety
  ///
  /// `at` must be valid for writes of `HEADER_SIZE` bytes and aligned for
  /// `Header`.
  pub unsafe fn write(
    at: *mut u8,
    size: usize,
  ) -> *mut u8 {
    unsafe {
      ptr::write(at as *mut Header, Self { size, magic: MAGIC });
      at.add(HEADER_SIZE)
    }
  }

  /// Returns the header that precedes `payload`.
  ///
  /// # Safety
  ///
  /// `payload` must have been produced by [`Header::write`].
  pub unsafe fn from_payload(payload: *mut u8) -> *mut Header {
    unsafe { payload.sub(HEADER_SIZE) as *mut Header }
  }
}

impl FreeNode {
  /// Reinterprets the bytes at `at` as an unlinked free node of `size` bytes.
  ///
  /// # Safety
  ///
  /// `at` must be valid for writes of `NODE_SIZE` bytes and aligned for
  /// `FreeNode`.
  pub unsafe fn write(
    at: *mut u8,
    size: usize,
  ) -> *mut FreeNode {
    let node = at as *mut FreeNode;
    unsafe {
      ptr::write(
        node,
        Self {
          size,
          next: ptr::null_mut(),
        },
      );
    }
    node
  }

  /// First byte past the end of the block.
  pub fn end(&self) -> *mut u8 {
    unsafe { (self as *const FreeNode as *mut u8).add(self.size) }
  }
}
