//! The fixed-size header at the start of every `.mo` file and the one-shot
//! byte order normalization of the structures it points to. See
//! <https://www.gnu.org/software/gettext/manual/gettext.html#MO-Files>.

use super::LoadError;

use std::convert::TryInto;
use std::ops::Range;

pub const MAGIC: u32 = 0x9504_12de;
pub const MAGIC_SWAPPED: u32 = 0xde12_0495;

pub const HEADER_SIZE: usize = 7 * 4;
pub const DESCRIPTOR_SIZE: usize = 8;
pub const HASH_SLOT_SIZE: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
  LittleEndian,
  BigEndian,
}

impl ByteOrder {
  pub fn name(self) -> &'static str {
    match self {
      Self::LittleEndian => "little-endian",
      Self::BigEndian => "big-endian",
    }
  }

  #[inline]
  pub fn read_u32(self, bytes: [u8; 4]) -> u32 {
    match self {
      Self::LittleEndian => u32::from_le_bytes(bytes),
      Self::BigEndian => u32::from_be_bytes(bytes),
    }
  }

  #[inline]
  pub fn write_u32(self, value: u32) -> [u8; 4] {
    match self {
      Self::LittleEndian => value.to_le_bytes(),
      Self::BigEndian => value.to_be_bytes(),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
  /// Byte order the file was stored in. The loaded buffer itself is always
  /// little-endian after [`parse_and_normalize`].
  pub byte_order: ByteOrder,
  pub revision: u32,
  pub string_count: u32,
  pub orig_table_offset: u32,
  pub trans_table_offset: u32,
  pub hash_table_size: u32,
  pub hash_table_offset: u32,
}

impl Header {
  /// Tables with two slots or less can't be probed (the increment is computed
  /// modulo `size - 2`), so they are treated as missing.
  #[inline]
  pub fn has_hash_table(&self) -> bool { self.hash_table_size > 2 }
}

/// Reads a little-endian word, which every structure in a normalized buffer
/// is stored as.
#[inline]
pub fn read_u32_le(data: &[u8], offset: usize) -> Option<u32> {
  let bytes = data.get(offset..offset.checked_add(4)?)?;
  Some(u32::from_le_bytes(bytes.try_into().ok()?))
}

fn read_field(data: &[u8], index: usize, byte_order: ByteOrder) -> u32 {
  let offset = index * 4;
  let mut word = [0; 4];
  word.copy_from_slice(&data[offset..offset + 4]);
  byte_order.read_u32(word)
}

fn table_region(
  offset: u32,
  count: u32,
  entry_size: usize,
  file_size: usize,
) -> Result<Range<usize>, LoadError> {
  let start = offset as u64;
  let end = start + count as u64 * entry_size as u64;
  if end > file_size as u64 {
    return Err(LoadError::Corrupt("table extends past the end of the file"));
  }
  Ok(start as usize..end as usize)
}

fn regions_overlap(a: &Range<usize>, b: &Range<usize>) -> bool {
  a.start < b.end && b.start < a.end
}

fn swap_words(region: &mut [u8]) {
  for word in region.chunks_exact_mut(4) {
    word.reverse();
  }
}

/// Validates the header against the size of `data` and, for files written in
/// the opposite byte order, byte-swaps the header, both descriptor tables and
/// the hash table in place. Nothing in `data` is touched unless validation
/// succeeds, and every word is swapped at most once because the swapped
/// regions are required not to overlap.
pub fn parse_and_normalize(data: &mut [u8]) -> Result<Header, LoadError> {
  if data.len() < HEADER_SIZE {
    return Err(LoadError::Corrupt("file is too small"));
  }

  let byte_order = match read_field(data, 0, ByteOrder::LittleEndian) {
    MAGIC => ByteOrder::LittleEndian,
    MAGIC_SWAPPED => ByteOrder::BigEndian,
    _ => return Err(LoadError::Corrupt("unknown signature")),
  };

  let header = Header {
    byte_order,
    revision: read_field(data, 1, byte_order),
    string_count: read_field(data, 2, byte_order),
    orig_table_offset: read_field(data, 3, byte_order),
    trans_table_offset: read_field(data, 4, byte_order),
    hash_table_size: read_field(data, 5, byte_order),
    hash_table_offset: read_field(data, 6, byte_order),
  };

  if header.string_count == 0 {
    return Err(LoadError::Corrupt("catalog contains no strings"));
  }

  let file_size = data.len();
  let header_region = 0..HEADER_SIZE;
  let orig_region =
    table_region(header.orig_table_offset, header.string_count, DESCRIPTOR_SIZE, file_size)?;
  let trans_region =
    table_region(header.trans_table_offset, header.string_count, DESCRIPTOR_SIZE, file_size)?;
  let hash_region =
    table_region(header.hash_table_offset, header.hash_table_size, HASH_SLOT_SIZE, file_size)?;

  let mut regions = vec![header_region, orig_region, trans_region];
  if header.has_hash_table() {
    regions.push(hash_region);
  }
  for (i, a) in regions.iter().enumerate() {
    for b in &regions[i + 1..] {
      if regions_overlap(a, b) {
        return Err(LoadError::Corrupt("tables overlap"));
      }
    }
  }

  if byte_order == ByteOrder::BigEndian {
    for region in regions {
      swap_words(&mut data[region]);
    }
  }

  Ok(header)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn header_bytes(fields: [u32; 7], byte_order: ByteOrder) -> Vec<u8> {
    fields.iter().flat_map(|&f| byte_order.write_u32(f).to_vec()).collect()
  }

  #[test]
  fn test_big_endian_header_is_normalized() {
    let mut data = header_bytes([MAGIC, 0, 1, 28, 36, 0, 44], ByteOrder::BigEndian);
    data.extend_from_slice(&[0, 0, 0, 1, 0, 0, 0, 44]);
    data.extend_from_slice(&[0, 0, 0, 2, 0, 0, 0, 46]);
    data.extend_from_slice(b"a\0b\0");

    let header = parse_and_normalize(&mut data).unwrap();
    assert_eq!(header.byte_order, ByteOrder::BigEndian);
    assert_eq!(header.string_count, 1);
    assert_eq!(header.trans_table_offset, 36);
    assert_eq!(read_u32_le(&data, 0), Some(MAGIC));
    assert_eq!(read_u32_le(&data, 28), Some(1));
    assert_eq!(read_u32_le(&data, 32), Some(44));
    assert_eq!(read_u32_le(&data, 36), Some(2));
    assert_eq!(&data[44..], b"a\0b\0");
  }

  #[test]
  fn test_unknown_signature() {
    let mut data = vec![0; 32];
    assert!(matches!(parse_and_normalize(&mut data), Err(LoadError::Corrupt(_))));
  }

  #[test]
  fn test_table_past_the_end() {
    let mut data = header_bytes([MAGIC, 0, 100, 28, 36, 0, 44], ByteOrder::LittleEndian);
    data.resize(64, 0);
    assert!(matches!(parse_and_normalize(&mut data), Err(LoadError::Corrupt(_))));
  }

  #[test]
  fn test_huge_offsets_do_not_overflow() {
    let fields = [MAGIC, 0, u32::MAX, u32::MAX, u32::MAX, u32::MAX, u32::MAX];
    let mut data = header_bytes(fields, ByteOrder::LittleEndian);
    data.resize(64, 0);
    assert!(matches!(parse_and_normalize(&mut data), Err(LoadError::Corrupt(_))));
  }

  #[test]
  fn test_overlapping_tables() {
    let mut data = header_bytes([MAGIC, 0, 1, 28, 28, 0, 36], ByteOrder::LittleEndian);
    data.resize(64, 0);
    assert!(matches!(parse_and_normalize(&mut data), Err(LoadError::Corrupt("tables overlap"))));
  }

  #[test]
  fn test_tiny_hash_table_is_ignored() {
    // A two-slot table overlapping the translations table is never read, so
    // it doesn't make the file invalid.
    let mut data = header_bytes([MAGIC, 0, 1, 28, 36, 2, 36], ByteOrder::LittleEndian);
    data.resize(64, 0);
    let header = parse_and_normalize(&mut data).unwrap();
    assert!(!header.has_hash_table());
  }
}
