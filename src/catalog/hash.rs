//! The string hash used by GNU gettext for the hash tables embedded in `.mo`
//! files, see `hash_string` in
//! <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-runtime/intl/hash-string.c>.
//! The tables are precomputed by the compiler, so this has to stay bit-exact.

const HASH_WORD_BITS: u32 = 32;

pub fn hash_string(bytes: &[u8]) -> u32 {
  let mut hash: u32 = 0;
  for &b in bytes {
    hash <<= 4;
    hash = hash.wrapping_add(b as u32);
    let top_nibble = hash & (0xf << (HASH_WORD_BITS - 4));
    if top_nibble != 0 {
      hash ^= top_nibble >> (HASH_WORD_BITS - 8);
      hash ^= top_nibble;
    }
  }
  hash
}

/// Initial slot and probe increment for a table of `table_size` slots. The
/// table size must be greater than 2.
#[inline]
pub fn probe_start(hash: u32, table_size: u32) -> (u32, u32) {
  (hash % table_size, 1 + hash % (table_size - 2))
}

/// Advances `index` by `incr` modulo `table_size` without a division.
#[inline]
pub fn probe_next(index: u32, incr: u32, table_size: u32) -> u32 {
  if index >= table_size - incr {
    index - (table_size - incr)
  } else {
    index + incr
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_short_strings_do_not_fold() {
    assert_eq!(hash_string(b""), 0);
    assert_eq!(hash_string(b"a"), 0x61);
    assert_eq!(hash_string(b"hello"), 0x006e_c32f);
  }

  #[test]
  fn test_long_strings_fold_the_top_nibble() {
    assert_eq!(hash_string(b"Hello, world!"), 153_469_889);
    assert_eq!(hash_string(b"abcdefghijklmnop"), 196_715_280);
    assert_eq!(hash_string(b"Language-Team"), 409_677);
  }

  #[test]
  fn test_probing_wraps_around() {
    let size = 7;
    let (start, incr) = probe_start(12, size);
    assert_eq!((start, incr), (5, 3));
    assert_eq!(probe_next(start, incr, size), 1);
    assert_eq!(probe_next(1, incr, size), 4);
    // Visits every slot of a prime-sized table before coming back.
    let mut seen = vec![false; size as usize];
    let mut index = start;
    for _ in 0..size {
      seen[index as usize] = true;
      index = probe_next(index, incr, size);
    }
    assert!(seen.iter().all(|&s| s));
  }
}
