//! The process-wide active catalog and gettext-style functions translating
//! through it. Lookups that find nothing return the untranslated text, so
//! callers never have to care whether a catalog is loaded at all.

use crate::catalog::{Catalog, LoadError, LoadOptions};
use crate::impl_prelude::*;

use once_cell::sync::Lazy;
use std::io::Read;
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static ACTIVE_CATALOG: Lazy<RwLock<Option<Arc<Catalog>>>> = Lazy::new(|| RwLock::new(None));

// Nothing can be left half-updated in the slot, it only ever holds a whole
// catalog or none, so a poisoned lock is safe to keep using.
fn read_slot() -> RwLockReadGuard<'static, Option<Arc<Catalog>>> {
  ACTIVE_CATALOG.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_slot() -> RwLockWriteGuard<'static, Option<Arc<Catalog>>> {
  ACTIVE_CATALOG.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
pub(crate) static TEST_SLOT_LOCK: Lazy<std::sync::Mutex<()>> =
  Lazy::new(|| std::sync::Mutex::new(()));

#[cfg(test)]
pub(crate) fn lock_slot_for_test() -> std::sync::MutexGuard<'static, ()> {
  TEST_SLOT_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn current() -> Option<Arc<Catalog>> { read_slot().clone() }

pub fn is_loaded() -> bool { read_slot().is_some() }

/// Makes `catalog` the active one, dropping the previous catalog once no
/// reader holds it anymore.
pub fn install(catalog: Catalog) -> Arc<Catalog> {
  let catalog = Arc::new(catalog);
  *write_slot() = Some(Arc::clone(&catalog));
  catalog
}

pub fn unload() {
  let previous = write_slot().take();
  if let Some(previous) = previous {
    debug!("unloaded the catalog {:?}", previous.display_name());
  }
}

pub fn load_from_file(path: &Path) -> bool {
  try_load_from_file(path, &LoadOptions::default()).is_ok()
}

pub fn load_from_reader<R: Read>(reader: R, display_name: &str) -> bool {
  try_load_from_reader(reader, display_name, &LoadOptions::default()).is_ok()
}

pub fn try_load_from_file(path: &Path, options: &LoadOptions) -> Result<Arc<Catalog>, LoadError> {
  finish_loading(path.display().to_string(), Catalog::open(path, options))
}

pub fn try_load_from_reader<R: Read>(
  reader: R,
  display_name: &str,
  options: &LoadOptions,
) -> Result<Arc<Catalog>, LoadError> {
  finish_loading(display_name.to_owned(), Catalog::load(reader, display_name, options))
}

/// A failed load leaves no catalog active, not even the previous one.
fn finish_loading(
  display_name: String,
  result: Result<Catalog, LoadError>,
) -> Result<Arc<Catalog>, LoadError> {
  match result {
    Ok(catalog) => {
      info!(
        "loaded the catalog {:?}: {} entries, {} byte order, {} lookups",
        display_name,
        catalog.len(),
        catalog.header().byte_order.name(),
        catalog.lookup_strategy(),
      );
      Ok(install(catalog))
    }
    Err(error) => {
      unload();
      if error.is_not_found() {
        debug!("catalog {:?} not found", display_name);
      } else {
        error!("failed to load the catalog {:?}: {}", display_name, error);
      }
      Err(error)
    }
  }
}

fn translate<'a>(
  translation: impl FnOnce(&Catalog) -> Option<String>,
  fallback: &'a str,
) -> Cow<'a, str> {
  match current().and_then(|catalog| translation(&*catalog)) {
    Some(translation) => Cow::Owned(translation),
    None => Cow::Borrowed(fallback),
  }
}

// Empty translations are how untranslated entries are stored, those fall
// back to the original text too.
fn decode(text: &[u8]) -> Option<String> {
  if text.is_empty() {
    return None;
  }
  Some(String::from_utf8_lossy(text).into_owned())
}

pub fn gettext(msgid: &str) -> Cow<str> {
  translate(|catalog| decode(catalog.lookup(msgid)?), msgid)
}

pub fn pgettext<'a>(context: &str, msgid: &'a str) -> Cow<'a, str> {
  translate(|catalog| decode(catalog.lookup_with_context(context, msgid)?), msgid)
}

pub fn ngettext<'a>(singular: &'a str, plural: &'a str, n: i32) -> Cow<'a, str> {
  let fallback = if n == 1 { singular } else { plural };
  translate(|catalog| decode(catalog.lookup_plural(n, catalog.lookup(singular)?)), fallback)
}

pub fn npgettext<'a>(context: &str, singular: &'a str, plural: &'a str, n: i32) -> Cow<'a, str> {
  let fallback = if n == 1 { singular } else { plural };
  translate(
    |catalog| decode(catalog.lookup_plural(n, catalog.lookup_with_context(context, singular)?)),
    fallback,
  )
}

/// The credits line of the active catalog, empty when nothing is loaded.
pub fn translation_description() -> String {
  match current() {
    Some(catalog) => String::from_utf8_lossy(catalog.translation_description()).into_owned(),
    None => String::new(),
  }
}

/// Strips the region, script and other specifiers from a language id,
/// e.g. `pt_BR` becomes `pt` and `sr-Latn` becomes `sr`.
pub fn try_remove_language_specifiers(language: &str) -> &str {
  match language.find(|c| matches!(c, '-' | '_' | '.' | '@')) {
    Some(index) => &language[..index],
    None => language,
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageSelection {
  /// A catalog for this language was loaded.
  Translated(String),
  /// The source language came first in the preference list, no catalog is
  /// needed.
  Source,
  /// None of the preferred languages has a catalog.
  Unavailable,
}

/// Walks the user's preferred languages in order and tries to load a catalog
/// for each one with `try_load`, then for its base language without
/// specifiers. Stops at the first success or when the source language comes
/// up.
pub fn try_load_preferred_language<I, S, F>(
  languages: I,
  source_language: &str,
  mut try_load: F,
) -> LanguageSelection
where
  I: IntoIterator<Item = S>,
  S: AsRef<str>,
  F: FnMut(&str) -> bool,
{
  for language in languages {
    let language = language.as_ref();
    if language.is_empty() {
      continue;
    }
    let base_language = try_remove_language_specifiers(language);
    let candidates = if base_language != language && !base_language.is_empty() {
      vec![language, base_language]
    } else {
      vec![language]
    };

    for candidate in candidates {
      if candidate == source_language {
        debug!("preferred language {:?} is the source language", candidate);
        return LanguageSelection::Source;
      }
      if try_load(candidate) {
        return LanguageSelection::Translated(candidate.to_owned());
      }
    }
  }
  LanguageSelection::Unavailable
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::CatalogBuilder;

  fn sample_catalog() -> Vec<u8> {
    let mut builder = CatalogBuilder::new();
    builder
      .metadata(concat!(
        "Language-Team: Polish <pl@li.org>\n",
        "Plural-Forms: nplurals=3; ",
        "plural=(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2);\n",
      ))
      .add("Start game", "Rozpocznij grę")
      .add("Untranslated", "")
      .add_plural("%d coin", "%d coins", &["%d moneta", "%d monety", "%d monet"])
      .add_with_context("verb", "Play", "Graj")
      .add_plural_with_context(
        "enemy",
        "%d bat",
        "%d bats",
        &["%d nietoperz", "%d nietoperze", ""],
      );
    builder.build()
  }

  fn load_sample(name: &str) -> bool { load_from_reader(&sample_catalog()[..], name) }

  #[test]
  fn test_fallbacks_without_a_catalog() {
    let _guard = lock_slot_for_test();
    unload();
    assert!(!is_loaded());
    assert_eq!(gettext("Start game"), "Start game");
    assert_eq!(ngettext("%d coin", "%d coins", 1), "%d coin");
    assert_eq!(ngettext("%d coin", "%d coins", 0), "%d coins");
    assert_eq!(pgettext("verb", "Play"), "Play");
    assert_eq!(translation_description(), "");
  }

  #[test]
  fn test_translations() {
    let _guard = lock_slot_for_test();
    assert!(load_sample("pl.mo"));
    assert_eq!(gettext("Start game"), "Rozpocznij grę");
    assert_eq!(gettext("Untranslated"), "Untranslated");
    assert_eq!(gettext("Missing"), "Missing");
    assert_eq!(ngettext("%d coin", "%d coins", 1), "%d moneta");
    assert_eq!(ngettext("%d coin", "%d coins", 3), "%d monety");
    assert_eq!(ngettext("%d coin", "%d coins", 5), "%d monet");
    assert_eq!(pgettext("verb", "Play"), "Graj");
    assert_eq!(pgettext("noun", "Play"), "Play");
    assert_eq!(npgettext("enemy", "%d bat", "%d bats", 2), "%d nietoperze");
    assert_eq!(npgettext("enemy", "%d bat", "%d bats", 7), "%d bats");
    assert_eq!(translation_description(), "Polish <pl@li.org>");
    unload();
  }

  #[test]
  fn test_unload_is_idempotent() {
    let _guard = lock_slot_for_test();
    assert!(load_sample("pl.mo"));
    unload();
    assert!(!is_loaded());
    unload();
    assert!(!is_loaded());
  }

  #[test]
  fn test_reload_replaces_the_catalog() {
    let _guard = lock_slot_for_test();
    assert!(load_sample("first.mo"));
    let first = current().unwrap();

    let mut builder = CatalogBuilder::new();
    builder.add("Start game", "Spiel starten");
    assert!(load_from_reader(&builder.build()[..], "second.mo"));
    assert_eq!(current().unwrap().display_name(), "second.mo");
    assert_eq!(gettext("Start game"), "Spiel starten");
    assert_eq!(pgettext("verb", "Play"), "Play");
    // Readers holding on to the old catalog are unaffected.
    assert_eq!(first.lookup("Start game"), Some("Rozpocznij grę".as_bytes()));
    unload();
  }

  #[test]
  fn test_failed_load_leaves_nothing_loaded() {
    let _guard = lock_slot_for_test();
    assert!(load_sample("pl.mo"));
    assert!(!load_from_reader(&[0u8; 10][..], "garbage.mo"));
    assert!(!is_loaded());

    assert!(load_sample("pl.mo"));
    assert!(!load_from_reader(&b""[..], "empty.mo"));
    assert!(!is_loaded());

    let path = Path::new("/nonexistent/catalog/path.mo");
    let result = try_load_from_file(path, &LoadOptions::default());
    assert!(matches!(result, Err(LoadError::NotFound)));
    assert!(!is_loaded());
  }

  #[test]
  fn test_language_specifiers() {
    assert_eq!(try_remove_language_specifiers("pt_BR"), "pt");
    assert_eq!(try_remove_language_specifiers("sr-Latn"), "sr");
    assert_eq!(try_remove_language_specifiers("de.UTF-8"), "de");
    assert_eq!(try_remove_language_specifiers("cs"), "cs");
    assert_eq!(try_remove_language_specifiers(""), "");
  }

  #[test]
  fn test_preferred_language_selection() {
    let mut attempts = Vec::new();
    let selection = try_load_preferred_language(&["fr_CA", "de_AT", "en"], "en", |language| {
      attempts.push(language.to_owned());
      language == "de"
    });
    assert_eq!(selection, LanguageSelection::Translated("de".to_owned()));
    assert_eq!(attempts, vec!["fr_CA", "fr", "de_AT", "de"]);

    let selection = try_load_preferred_language(vec!["", "en_US", "cs"], "en", |_| false);
    assert_eq!(selection, LanguageSelection::Source);

    let selection = try_load_preferred_language(vec!["cs", "sk"], "en", |_| false);
    assert_eq!(selection, LanguageSelection::Unavailable);
  }
}
