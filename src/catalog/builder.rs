//! Writes `.mo` files with the same layout GNU msgfmt produces: the header,
//! both descriptor tables, the hash table and then the strings themselves.
//! See `write_table` in
//! <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/write-mo.c>.

use super::hash;
use super::header::{ByteOrder, DESCRIPTOR_SIZE, HASH_SLOT_SIZE, HEADER_SIZE, MAGIC};
use super::CONTEXT_SEPARATOR;
use crate::utils::until_nul;

use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct CatalogBuilder {
  /// Sorted by key, which is what makes binary search over the written file
  /// possible.
  messages: BTreeMap<Vec<u8>, Vec<u8>>,
  byte_order: ByteOrder,
  hash_table: bool,
}

impl Default for CatalogBuilder {
  fn default() -> Self { Self::new() }
}

impl CatalogBuilder {
  pub fn new() -> Self {
    Self {
      messages: BTreeMap::new(),
      byte_order: ByteOrder::LittleEndian,
      hash_table: true,
    }
  }

  pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
    self.byte_order = byte_order;
    self
  }

  pub fn with_hash_table(mut self, hash_table: bool) -> Self {
    self.hash_table = hash_table;
    self
  }

  #[inline(always)]
  pub fn len(&self) -> usize { self.messages.len() }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.messages.is_empty() }

  /// Sets the header entry, the translation of the empty msgid.
  pub fn metadata(&mut self, text: &str) -> &mut Self { self.add("", text) }

  pub fn add(&mut self, msgid: impl AsRef<[u8]>, msgstr: impl AsRef<[u8]>) -> &mut Self {
    self.messages.insert(msgid.as_ref().to_vec(), msgstr.as_ref().to_vec());
    self
  }

  pub fn add_with_context(
    &mut self,
    context: impl AsRef<[u8]>,
    msgid: impl AsRef<[u8]>,
    msgstr: impl AsRef<[u8]>,
  ) -> &mut Self {
    self.add(context_key(context.as_ref(), msgid.as_ref()), msgstr)
  }

  pub fn add_plural<S: AsRef<[u8]>>(
    &mut self,
    msgid: impl AsRef<[u8]>,
    msgid_plural: impl AsRef<[u8]>,
    forms: &[S],
  ) -> &mut Self {
    let mut key = msgid.as_ref().to_vec();
    key.push(0);
    key.extend_from_slice(msgid_plural.as_ref());
    self.add(key, join_with_nul(forms))
  }

  pub fn add_plural_with_context<S: AsRef<[u8]>>(
    &mut self,
    context: impl AsRef<[u8]>,
    msgid: impl AsRef<[u8]>,
    msgid_plural: impl AsRef<[u8]>,
    forms: &[S],
  ) -> &mut Self {
    self.add_plural(context_key(context.as_ref(), msgid.as_ref()), msgid_plural, forms)
  }

  pub fn build(&self) -> Vec<u8> {
    let string_count = self.messages.len();
    let hash_table_size = if self.hash_table { hash_table_size_for(string_count) } else { 0 };

    let orig_table_offset = HEADER_SIZE;
    let trans_table_offset = orig_table_offset + string_count * DESCRIPTOR_SIZE;
    let hash_table_offset = trans_table_offset + string_count * DESCRIPTOR_SIZE;
    let strings_offset = hash_table_offset + hash_table_size * HASH_SLOT_SIZE;

    let mut strings = Vec::new();
    let mut push_string = |s: &[u8]| -> (usize, usize) {
      let offset = strings_offset + strings.len();
      strings.extend_from_slice(s);
      strings.push(0);
      (s.len(), offset)
    };
    let orig_descs: Vec<(usize, usize)> =
      self.messages.keys().map(|k| push_string(k.as_slice())).collect();
    let trans_descs: Vec<(usize, usize)> =
      self.messages.values().map(|v| push_string(v.as_slice())).collect();

    let mut hash_slots = vec![0u32; hash_table_size];
    if hash_table_size > 0 {
      for (index, key) in self.messages.keys().enumerate() {
        // Plural entries are hashed by their singular msgid only, which is
        // what lookups hash too.
        let hash_value = hash::hash_string(until_nul(key));
        let size = hash_table_size as u32;
        let (mut slot, incr) = hash::probe_start(hash_value, size);
        while hash_slots[slot as usize] != 0 {
          slot = hash::probe_next(slot, incr, size);
        }
        hash_slots[slot as usize] = index as u32 + 1;
      }
    }

    let mut out = Vec::with_capacity(strings_offset + strings.len());
    let mut put = |value: usize| out.extend_from_slice(&self.byte_order.write_u32(value as u32));
    put(MAGIC as usize);
    // Revision.
    put(0);
    put(string_count);
    put(orig_table_offset);
    put(trans_table_offset);
    put(hash_table_size);
    put(hash_table_offset);
    for &(length, offset) in orig_descs.iter().chain(trans_descs.iter()) {
      put(length);
      put(offset);
    }
    for &slot in &hash_slots {
      put(slot as usize);
    }
    out.extend_from_slice(&strings);
    out
  }
}

pub fn context_key(context: &[u8], msgid: &[u8]) -> Vec<u8> {
  let mut key = Vec::with_capacity(context.len() + 1 + msgid.len());
  key.extend_from_slice(context);
  key.push(CONTEXT_SEPARATOR);
  key.extend_from_slice(msgid);
  key
}

fn join_with_nul<S: AsRef<[u8]>>(forms: &[S]) -> Vec<u8> {
  let mut joined = Vec::new();
  for (i, form) in forms.iter().enumerate() {
    if i > 0 {
      joined.push(0);
    }
    joined.extend_from_slice(form.as_ref());
  }
  joined
}

/// Same sizing as msgfmt: the next prime after 4/3 of the number of strings,
/// and never less than 3 since two slots can't be probed.
pub fn hash_table_size_for(string_count: usize) -> usize {
  next_prime(string_count * 4 / 3).max(3)
}

fn next_prime(seed: usize) -> usize {
  let mut candidate = seed | 1;
  while !is_prime(candidate) {
    candidate += 2;
  }
  candidate
}

fn is_prime(candidate: usize) -> bool {
  if candidate < 2 {
    return false;
  }
  let mut divisor = 2;
  while divisor * divisor <= candidate {
    if candidate % divisor == 0 {
      return false;
    }
    divisor += 1;
  }
  true
}

#[cfg(test)]
mod tests {
  use super::super::header::read_u32_le;
  use super::*;

  #[test]
  fn test_hash_table_sizes() {
    assert_eq!(hash_table_size_for(0), 3);
    assert_eq!(hash_table_size_for(1), 3);
    assert_eq!(hash_table_size_for(3), 5);
    assert_eq!(hash_table_size_for(10), 13);
    assert_eq!(hash_table_size_for(100), 137);
  }

  #[test]
  fn test_layout() {
    let mut builder = CatalogBuilder::new().with_hash_table(false);
    builder.add("b", "B").add("a", "AA");
    let data = builder.build();

    assert_eq!(read_u32_le(&data, 0), Some(MAGIC));
    assert_eq!(read_u32_le(&data, 8), Some(2));
    assert_eq!(read_u32_le(&data, 12), Some(28));
    assert_eq!(read_u32_le(&data, 16), Some(44));
    assert_eq!(read_u32_le(&data, 20), Some(0));
    assert_eq!(read_u32_le(&data, 24), Some(60));
    // Sorted originals, then the translations in the same order.
    assert_eq!(&data[60..], b"a\0b\0AA\0B\0");
    assert_eq!(read_u32_le(&data, 28), Some(1));
    assert_eq!(read_u32_le(&data, 32), Some(60));
    assert_eq!(read_u32_le(&data, 44), Some(2));
    assert_eq!(read_u32_le(&data, 48), Some(64));
  }

  #[test]
  fn test_plural_and_context_keys() {
    let mut builder = CatalogBuilder::new();
    builder.add_plural("file", "files", &["soubor", "soubory", "souborů"]);
    builder.add_plural_with_context("menu", "item", "items", &["x", "y"]);
    let keys: Vec<&[u8]> = builder.messages.keys().map(Vec::as_slice).collect();
    assert_eq!(keys, vec![&b"file\0files"[..], &b"menu\x04item\0items"[..]]);
    let forms = &builder.messages[&b"file\0files"[..]];
    assert_eq!(forms.as_slice(), "soubor\0soubory\0souborů".as_bytes());
  }

  #[test]
  fn test_big_endian_output() {
    let mut builder = CatalogBuilder::new().with_byte_order(ByteOrder::BigEndian);
    builder.add("a", "b");
    let data = builder.build();
    assert_eq!(&data[..4], &[0x95, 0x04, 0x12, 0xde]);
    assert_eq!(&data[8..12], &[0, 0, 0, 1]);
  }
}
