use thiserror::Error;

/// Recoverable arena failures. The arena is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
  #[error("system memory not initialized")]
  Uninitialized,

  #[error("memory limit exceeded: requested {requested} bytes, {available} available")]
  CapacityExceeded { requested: usize, available: usize },
}

/// Recoverable allocator failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
  #[error(transparent)]
  Arena(#[from] ArenaError),

  #[error("no search mode configured")]
  SearchModeUnset,

  #[error("unknown search mode: {0:?}")]
  UnknownSearchMode(String),

  #[error("corrupt block header at {addr:#x}")]
  CorruptHeader { addr: usize },
}

pub type ArenaResult<T> = Result<T, ArenaError>;
pub type AllocResult<T> = Result<T, AllocError>;
