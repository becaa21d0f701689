use std::{env, fmt, str::FromStr};

use tracing::warn;

use crate::error::AllocError;

/// Default capacity of the simulated heap: 20 MiB.
pub const MAX_HEAP_SIZE: usize = 20 * (1 << 20);

/// Environment variable read by [`AllocatorConfig::from_env`].
pub const SEARCH_SCHEME_VAR: &str = "SEARCH_SCHEME";

/// Placement policy used to pick a free block for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
  /// First block in address order that is large enough.
  #[default]
  FirstFit,
  /// Smallest block that is large enough.
  BestFit,
  /// Largest block that is large enough.
  WorstFit,
  /// No policy. Every allocation fails, including arena growth.
  Unset,
}

impl SearchMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      SearchMode::FirstFit => "FIRST_FIT",
      SearchMode::BestFit => "BEST_FIT",
      SearchMode::WorstFit => "WORST_FIT",
      SearchMode::Unset => "UNSET",
    }
  }
}

impl fmt::Display for SearchMode {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SearchMode {
  type Err = AllocError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "FIRST_FIT" => Ok(SearchMode::FirstFit),
      "BEST_FIT" => Ok(SearchMode::BestFit),
      "WORST_FIT" => Ok(SearchMode::WorstFit),
      other => Err(AllocError::UnknownSearchMode(other.to_string())),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AllocatorConfig {
  pub search_mode: SearchMode,
  /// Reject `free`/`reallocate` on pointers whose header lost its sanity tag.
  pub verify_headers: bool,
}

impl AllocatorConfig {
  pub fn new(search_mode: SearchMode) -> Self {
    Self {
      search_mode,
      verify_headers: false,
    }
  }

  pub fn with_verify_headers(
    mut self,
    verify: bool,
  ) -> Self {
    self.verify_headers = verify;
    self
  }

  /// Reads the search mode from `SEARCH_SCHEME`.
  ///
  /// An absent or unrecognized value yields [`SearchMode::Unset`].
  pub fn from_env() -> Self {
    Self::from_search_scheme(env::var(SEARCH_SCHEME_VAR).ok().as_deref())
  }

  pub fn from_search_scheme(scheme: Option<&str>) -> Self {
    let search_mode = match scheme {
      None => {
        warn!("{} not set, allocation disabled", SEARCH_SCHEME_VAR);
        SearchMode::Unset
      }
      Some(value) => value.parse().unwrap_or_else(|err| {
        warn!("{}, allocation disabled", err);
        SearchMode::Unset
      }),
    };

    Self::new(search_mode)
  }
}
