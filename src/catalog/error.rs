use crate::impl_prelude::*;

use std::fmt;
use std::io;

/// Reasons a catalog can't be loaded. Only the display name of the catalog is
/// ever attached to these in logs, never the internal offsets.
#[derive(Debug)]
pub enum LoadError {
  /// The source was empty or doesn't exist. This is the normal state of
  /// affairs for untranslated languages and shouldn't be reported loudly.
  NotFound,
  Corrupt(&'static str),
  Io(io::Error),
}

impl LoadError {
  #[inline]
  pub fn is_not_found(&self) -> bool { matches!(self, Self::NotFound) }
}

impl From<io::Error> for LoadError {
  fn from(error: io::Error) -> Self {
    if error.kind() == io::ErrorKind::NotFound {
      Self::NotFound
    } else {
      Self::Io(error)
    }
  }
}

impl fmt::Display for LoadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::NotFound => write!(f, "catalog not found"),
      Self::Corrupt(reason) => write!(f, "invalid \".mo\" file: {}", reason),
      Self::Io(error) => write!(f, "failed to read the catalog: {}", error),
    }
  }
}

impl StdError for LoadError {
  #[inline]
  fn source(&self) -> Option<&(dyn StdError + 'static)> {
    match self {
      Self::Io(error) => Some(error),
      _ => None,
    }
  }
}
