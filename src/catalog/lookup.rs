use super::hash;
use super::header::{read_u32_le, Header, DESCRIPTOR_SIZE, HASH_SLOT_SIZE};
use crate::utils::until_nul;

use std::cmp::Ordering;
use std::fmt;

/// A `(length, offset)` pair locating a string inside the catalog buffer. The
/// length doesn't include the terminating NUL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringDesc {
  pub length: u32,
  pub offset: u32,
}

/// Read-only view of the two descriptor tables of a normalized buffer. Every
/// accessor bounds-checks against the buffer and returns `None` instead of
/// panicking on garbage.
#[derive(Debug, Clone, Copy)]
pub struct StringTables<'data> {
  data: &'data [u8],
  string_count: usize,
  orig_table_offset: usize,
  trans_table_offset: usize,
}

impl<'data> StringTables<'data> {
  pub fn new(data: &'data [u8], header: &Header) -> Self {
    Self {
      data,
      string_count: header.string_count as usize,
      orig_table_offset: header.orig_table_offset as usize,
      trans_table_offset: header.trans_table_offset as usize,
    }
  }

  #[inline(always)]
  pub fn data(&self) -> &'data [u8] { self.data }
  #[inline(always)]
  pub fn string_count(&self) -> usize { self.string_count }

  fn descriptor(&self, table_offset: usize, index: usize) -> Option<StringDesc> {
    if index >= self.string_count {
      return None;
    }
    let entry_offset = table_offset.checked_add(index.checked_mul(DESCRIPTOR_SIZE)?)?;
    Some(StringDesc {
      length: read_u32_le(self.data, entry_offset)?,
      offset: read_u32_le(self.data, entry_offset.checked_add(4)?)?,
    })
  }

  fn string(&self, desc: StringDesc) -> Option<&'data [u8]> {
    let start = desc.offset as usize;
    self.data.get(start..start.checked_add(desc.length as usize)?)
  }

  /// The whole original string, including the plural msgid of plural entries
  /// (joined to the singular one with a NUL).
  pub fn original(&self, index: usize) -> Option<&'data [u8]> {
    self.string(self.descriptor(self.orig_table_offset, index)?)
  }

  /// The part of the original string a C `strcmp` would compare.
  pub fn original_key(&self, index: usize) -> Option<&'data [u8]> {
    self.original(index).map(until_nul)
  }

  pub fn translation(&self, index: usize) -> Option<&'data [u8]> {
    self.string(self.descriptor(self.trans_table_offset, index)?)
  }

  /// Checks the precondition of [`SortedLookup`]. Well-formed files always
  /// satisfy it, but nothing in the format enforces it.
  pub fn is_sorted(&self) -> bool {
    let mut prev_key: Option<&[u8]> = None;
    for index in 0..self.string_count {
      let key = match self.original_key(index) {
        Some(key) => key,
        None => return false,
      };
      if prev_key.map_or(false, |prev_key| prev_key > key) {
        return false;
      }
      prev_key = Some(key);
    }
    true
  }
}

assert_trait_is_object_safe!(Lookup);

/// Resolves a message id to an index into the descriptor tables. Implementors
/// are picked once when a catalog is loaded, depending on whether the file
/// provides a hash table.
pub trait Lookup: fmt::Debug + Send + Sync {
  fn name(&self) -> &'static str;

  /// `msgid` must not contain NUL bytes.
  fn find(&self, tables: &StringTables<'_>, msgid: &[u8]) -> Option<usize>;
}

#[derive(Debug, Clone)]
pub struct HashLookup {
  table_offset: usize,
  table_size: u32,
}

impl HashLookup {
  pub fn new(header: &Header) -> Self {
    debug_assert!(header.has_hash_table());
    Self { table_offset: header.hash_table_offset as usize, table_size: header.hash_table_size }
  }

  fn slot(&self, data: &[u8], index: u32) -> Option<u32> {
    read_u32_le(data, self.table_offset + index as usize * HASH_SLOT_SIZE)
  }
}

impl Lookup for HashLookup {
  fn name(&self) -> &'static str { "hash table" }

  fn find(&self, tables: &StringTables<'_>, msgid: &[u8]) -> Option<usize> {
    let hash_value = hash::hash_string(msgid);
    let (mut index, incr) = hash::probe_start(hash_value, self.table_size);

    // A table without empty slots would make an unsuccessful probe go round
    // in circles forever.
    for _ in 0..self.table_size {
      let slot = self.slot(tables.data(), index)?;
      if slot == 0 {
        return None;
      }
      let string_index = (slot - 1) as usize;

      // The lengths are compared with `>=` and not `==` because plural
      // entries store the singular and the plural msgid joined with a NUL
      // under one descriptor.
      if let Some(original) = tables.original(string_index) {
        if original.len() >= msgid.len()
          && &original[..msgid.len()] == msgid
          && original.get(msgid.len()).map_or(true, |&b| b == 0)
        {
          return Some(string_index);
        }
      }

      index = hash::probe_next(index, incr, self.table_size);
    }

    None
  }
}

/// Binary search over the original strings, for files compiled without a
/// hash table. Relies on the original strings being sorted.
#[derive(Debug, Clone)]
pub struct SortedLookup;

impl Lookup for SortedLookup {
  fn name(&self) -> &'static str { "binary search" }

  fn find(&self, tables: &StringTables<'_>, msgid: &[u8]) -> Option<usize> {
    let mut bottom = 0;
    let mut top = tables.string_count();
    while bottom < top {
      let index = bottom + (top - bottom) / 2;
      let key = tables.original_key(index)?;
      match msgid.cmp(key) {
        Ordering::Less => top = index,
        Ordering::Greater => bottom = index + 1,
        Ordering::Equal => return Some(index),
      }
    }
    None
  }
}

pub fn for_header(header: &Header) -> Box<dyn Lookup> {
  if header.has_hash_table() {
    Box::new(HashLookup::new(header))
  } else {
    Box::new(SortedLookup)
  }
}
