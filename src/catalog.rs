//! Loading of compiled gettext message catalogs (`.mo` files) and lookups in
//! them. See <https://www.gnu.org/software/gettext/manual/gettext.html#MO-Files>
//! and `_nl_load_domain`/`_nl_find_msg` in
//! <https://github.com/autotools-mirror/gettext/tree/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-runtime/intl>.

pub mod builder;
pub mod error;
pub mod hash;
pub mod header;
pub mod lookup;

pub use self::builder::CatalogBuilder;
pub use self::error::LoadError;
pub use self::header::{ByteOrder, Header};

use self::lookup::{Lookup, StringTables};
use crate::plural::PluralRule;
use crate::utils::{
  buffer_capacity_for_reading_file, find_subslice, trim_ascii_whitespace, until_nul,
};

use std::fs;
use std::io::Read;
use std::path::Path;

/// Joins the context and the msgid in the keys of entries with a `msgctxt`.
pub const CONTEXT_SEPARATOR: u8 = 0x04;

pub const MIN_FILE_SIZE: usize = 32;
pub const DEFAULT_MAX_FILE_SIZE: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
  /// Files larger than this are rejected as corrupt.
  pub max_file_size: usize,
  /// Reject files without a hash table whose original strings aren't sorted,
  /// instead of silently returning wrong results from the binary search.
  pub verify_sorted: bool,
}

impl Default for LoadOptions {
  fn default() -> Self { Self { max_file_size: DEFAULT_MAX_FILE_SIZE, verify_sorted: false } }
}

#[derive(Debug)]
pub struct Catalog {
  display_name: String,
  data: Box<[u8]>,
  header: Header,
  lookup: Box<dyn Lookup>,
  plural_rule: PluralRule,
}

impl Catalog {
  pub fn open(path: &Path, options: &LoadOptions) -> Result<Self, LoadError> {
    let file = fs::File::open(path)?;
    let capacity = buffer_capacity_for_reading_file(&file).min(options.max_file_size + 1);
    let data = read_limited(file, Vec::with_capacity(capacity), options)?;
    Self::from_bytes(data, path.display().to_string(), options)
  }

  /// Reads the whole stream and parses it. `display_name` is used for
  /// diagnostics only.
  pub fn load<R: Read>(
    reader: R,
    display_name: impl Into<String>,
    options: &LoadOptions,
  ) -> Result<Self, LoadError> {
    let data = read_limited(reader, Vec::new(), options)?;
    Self::from_bytes(data, display_name, options)
  }

  pub fn from_bytes(
    data: Vec<u8>,
    display_name: impl Into<String>,
    options: &LoadOptions,
  ) -> Result<Self, LoadError> {
    if data.is_empty() {
      return Err(LoadError::NotFound);
    }
    if data.len() < MIN_FILE_SIZE {
      return Err(LoadError::Corrupt("file is too small"));
    }
    if data.len() > options.max_file_size {
      return Err(LoadError::Corrupt("file is too large"));
    }

    let mut data = data.into_boxed_slice();
    let header = header::parse_and_normalize(&mut data)?;

    let mut catalog = Self {
      display_name: display_name.into(),
      data,
      header,
      lookup: lookup::for_header(&header),
      plural_rule: PluralRule::default(),
    };

    if options.verify_sorted && !header.has_hash_table() && !catalog.tables().is_sorted() {
      return Err(LoadError::Corrupt("original strings are not sorted"));
    }

    let plural_rule =
      catalog.metadata().map_or_else(PluralRule::default, PluralRule::from_metadata);
    catalog.plural_rule = plural_rule;
    Ok(catalog)
  }

  #[inline(always)]
  pub fn display_name(&self) -> &str { &self.display_name }
  #[inline(always)]
  pub fn header(&self) -> &Header { &self.header }
  #[inline(always)]
  pub fn plural_rule(&self) -> &PluralRule { &self.plural_rule }
  #[inline(always)]
  pub fn len(&self) -> usize { self.header.string_count as usize }
  #[inline(always)]
  pub fn is_empty(&self) -> bool { self.len() == 0 }
  #[inline(always)]
  pub fn lookup_strategy(&self) -> &'static str { self.lookup.name() }

  #[inline]
  pub fn tables(&self) -> StringTables<'_> { StringTables::new(&self.data, &self.header) }

  /// Finds the translation of `msgid`. Everything after a NUL in `msgid` is
  /// ignored, the same way as in a C string. For plural entries the returned
  /// span contains all forms separated by NULs, see [`Self::lookup_plural`].
  pub fn lookup(&self, msgid: impl AsRef<[u8]>) -> Option<&[u8]> {
    let msgid = until_nul(msgid.as_ref());
    let tables = self.tables();
    let index = self.lookup.find(&tables, msgid)?;
    tables.translation(index)
  }

  pub fn lookup_with_context(
    &self,
    context: impl AsRef<[u8]>,
    msgid: impl AsRef<[u8]>,
  ) -> Option<&[u8]> {
    self.lookup(builder::context_key(context.as_ref(), msgid.as_ref()))
  }

  /// Picks the form for the count `n` out of a translation returned by
  /// [`Self::lookup`], according to the catalog's plural rule.
  #[inline]
  pub fn lookup_plural<'t>(&self, n: i32, translation: &'t [u8]) -> &'t [u8] {
    self.plural_rule.select(n, translation)
  }

  /// The header entry, i.e. the translation of the empty string.
  pub fn metadata(&self) -> Option<&[u8]> { self.lookup(b"") }

  pub fn metadata_field(&self, name: &str) -> Option<&[u8]> {
    metadata_field(self.metadata()?, name)
  }

  /// The `Language-Team` field, meant to be shown to the user as the credits
  /// of the translation. Empty if the catalog doesn't have one.
  pub fn translation_description(&self) -> &[u8] {
    self.metadata_field("Language-Team").unwrap_or(b"")
  }

  /// All `(original, translation)` pairs in the order they are stored in.
  /// Entries pointing outside of the buffer are skipped.
  pub fn entries(&self) -> impl Iterator<Item = (&[u8], &[u8])> + '_ {
    let tables = self.tables();
    (0..tables.string_count())
      .filter_map(move |index| Some((tables.original(index)?, tables.translation(index)?)))
  }
}

fn read_limited<R: Read>(
  reader: R,
  mut buf: Vec<u8>,
  options: &LoadOptions,
) -> Result<Vec<u8>, LoadError> {
  // One extra byte is enough to tell that the limit was exceeded.
  reader.take(options.max_file_size as u64 + 1).read_to_end(&mut buf)?;
  Ok(buf)
}

/// Finds a `Name: value` line in a header entry and returns the trimmed value.
pub fn metadata_field<'a>(metadata: &'a [u8], name: &str) -> Option<&'a [u8]> {
  let name = name.as_bytes();
  metadata.split(|&b| b == b'\n').find_map(|line| {
    let rest = line.strip_prefix(name)?;
    let value = rest.strip_prefix(b":")?;
    Some(trim_ascii_whitespace(value))
  })
}

/// Returns the part of a header entry following `plural=`, cut off at the
/// first `;` or line break.
pub fn extract_plural_expression(metadata: &[u8]) -> Option<&[u8]> {
  const KEY: &[u8] = b"plural=";
  let start = find_subslice(metadata, KEY)? + KEY.len();
  let rest = &metadata[start..];
  let end = rest.iter().position(|&b| matches!(b, b';' | b'\r' | b'\n')).unwrap_or(rest.len());
  Some(&rest[..end])
}

pub fn extract_plural_count(metadata: &[u8]) -> Option<u32> {
  const KEY: &[u8] = b"nplurals=";
  let start = find_subslice(metadata, KEY)? + KEY.len();
  let rest = trim_ascii_whitespace(&metadata[start..]);
  let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
  std::str::from_utf8(&rest[..digits]).ok()?.parse().ok()
}
