/// Boundary every block size and payload address is rounded to.
pub const ALIGNMENT: usize = 8;

/// Rounds `value` up to the allocator's [`ALIGNMENT`] boundary.
///
/// # Examples
///
/// ```rust
/// use rallocator::align;
///
/// assert_eq!(align!(13), 16);
/// assert_eq!(align!(16), 16);
/// assert_eq!(align!(17), 24);
/// ```
#[macro_export]
macro_rules! align {
  ($value:expr) => {
    $crate::align_to!($value, $crate::align::ALIGNMENT)
  };
}

/// Rounds `value` up to `alignment`, which must be a power of two.
///
/// ```rust
/// use rallocator::align_to;
///
/// assert_eq!(align_to!(5, 4), 8);
/// assert_eq!(align_to!(33, 32), 64);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $alignment:expr) => {
    ($value + $alignment - 1) & !($alignment - 1)
  };
}
