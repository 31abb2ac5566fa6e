//! Turns `.po` sources into `.mo` catalogs, a small subset of what `msgfmt`
//! does. See <https://www.gnu.org/software/gettext/manual/gettext.html#msgfmt-Invocation>.

use crate::catalog::builder::context_key;
use crate::catalog::{ByteOrder, CatalogBuilder};
use crate::gettext_po::{self, ParsingError};
use crate::impl_prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
  /// Like `msgfmt --use-fuzzy`.
  pub include_fuzzy: bool,
  pub hash_table: bool,
  pub byte_order: ByteOrder,
}

impl Default for CompileOptions {
  fn default() -> Self {
    Self { include_fuzzy: false, hash_table: true, byte_order: ByteOrder::LittleEndian }
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
  pub translated: usize,
  pub fuzzy_skipped: usize,
  pub untranslated_skipped: usize,
}

pub fn compile(
  src: &str,
  options: &CompileOptions,
) -> Result<(CatalogBuilder, CompileStats), ParsingError> {
  let mut builder = CatalogBuilder::new()
    .with_hash_table(options.hash_table)
    .with_byte_order(options.byte_order);
  let mut stats = CompileStats::default();
  let mut seen_keys = std::collections::HashSet::new();

  for message in gettext_po::parse(src) {
    let message = message?;

    // The header entry is kept even when it is fuzzy, which it usually is
    // in freshly initialized translations.
    if message.is_header() {
      builder.metadata(&message.joined_msgstr().concat());
      continue;
    }

    let msgstr = message.joined_msgstr();
    if msgstr.iter().all(String::is_empty) {
      stats.untranslated_skipped += 1;
      continue;
    }
    if message.is_fuzzy() && !options.include_fuzzy {
      stats.fuzzy_skipped += 1;
      continue;
    }

    let msgctxt = message.joined_msgctxt();
    let msgid = message.joined_msgid();
    let key = match &msgctxt {
      Some(msgctxt) => context_key(msgctxt.as_bytes(), msgid.as_bytes()),
      None => msgid.clone().into_bytes(),
    };
    if !seen_keys.insert(key.clone()) {
      warn!("duplicate message definition for {:?}, the last one wins", msgid);
    }

    match message.joined_msgid_plural() {
      Some(msgid_plural) => {
        builder.add_plural(&key, msgid_plural, &msgstr);
      }
      None => {
        builder.add(&key, &msgstr[0]);
      }
    }
    stats.translated += 1;
  }

  Ok((builder, stats))
}
