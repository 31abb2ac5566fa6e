#![allow(non_camel_case_types, clippy::not_unsafe_ptr_arg_deref, unreachable_patterns)]

//! C interface to the active catalog. Every string is passed as a pointer and
//! a length, strings returned through `out_*` parameters point into the
//! loaded catalog and stay valid until it is unloaded or replaced.

use crate::catalog::{LoadError, LoadOptions};
use crate::i18n;

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::process;
use std::ptr;
use std::slice;
use std::str;

#[no_mangle]
pub static MOLOCALE_VERSION_PTR: &u8 = &crate::CRATE_VERSION.as_bytes()[0];
#[no_mangle]
pub static MOLOCALE_VERSION_LEN: usize = crate::CRATE_VERSION.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub enum molocale_result {
  MOLOCALE_OK = 0,
  MOLOCALE_ERR_GENERIC_RUST_PANIC = 1,
  MOLOCALE_ERR_INVALID_ARGUMENT = 2,
  MOLOCALE_ERR_NOT_FOUND = 3,
  MOLOCALE_ERR_CORRUPT = 4,
  MOLOCALE_ERR_IO = 5,
  MOLOCALE_ERR_NOT_LOADED = 6,
}
use molocale_result::*;

impl From<&LoadError> for molocale_result {
  fn from(error: &LoadError) -> Self {
    match error {
      LoadError::NotFound => MOLOCALE_ERR_NOT_FOUND,
      LoadError::Corrupt(_) => MOLOCALE_ERR_CORRUPT,
      LoadError::Io(_) => MOLOCALE_ERR_IO,
    }
  }
}

fn catch_panics(f: impl FnOnce() -> molocale_result) -> molocale_result {
  match panic::catch_unwind(AssertUnwindSafe(f)) {
    Ok(v) => v,
    Err(_) => process::abort(),
  }
}

/// Null is accepted for empty strings only.
unsafe fn bytes_arg<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
  if len == 0 {
    Some(&[])
  } else if ptr.is_null() {
    None
  } else {
    Some(slice::from_raw_parts(ptr, len))
  }
}

unsafe fn write_bytes_out(bytes: &[u8], out_ptr: *mut *const u8, out_len: *mut usize) {
  *out_ptr = bytes.as_ptr();
  *out_len = bytes.len();
}

#[no_mangle]
pub extern "C" fn molocale_init_logging() -> molocale_result {
  catch_panics(|| {
    crate::init_logging();
    crate::logging::print_banner_message();
    MOLOCALE_OK
  })
}

#[no_mangle]
pub extern "C" fn molocale_error_description(myself: molocale_result) -> *const u8 {
  let s: &'static str = match myself {
    MOLOCALE_OK => "this isn't actually an error\0",
    MOLOCALE_ERR_GENERIC_RUST_PANIC => "a generic Rust panic\0",
    MOLOCALE_ERR_INVALID_ARGUMENT => "an argument is a null pointer or isn't valid UTF-8\0",
    MOLOCALE_ERR_NOT_FOUND => "the catalog or the message wasn't found\0",
    MOLOCALE_ERR_CORRUPT => "the catalog is not a valid \".mo\" file\0",
    MOLOCALE_ERR_IO => "failed to read the catalog\0",
    MOLOCALE_ERR_NOT_LOADED => "no catalog is loaded\0",
    _ => "unknown error\0",
  };
  s.as_ptr()
}

#[no_mangle]
pub extern "C" fn molocale_error_id_str(myself: molocale_result) -> *const u8 {
  macro_rules! lookup_error_id {
    ($var:expr, [$($name:path),+ $(,)?]) => {
      match $var {
        $($name => concat!(stringify!($name), "\0").as_ptr(),)+
        _ => return ptr::null(),
      }
    };
  }
  lookup_error_id!(myself, [
    MOLOCALE_OK,
    MOLOCALE_ERR_GENERIC_RUST_PANIC,
    MOLOCALE_ERR_INVALID_ARGUMENT,
    MOLOCALE_ERR_NOT_FOUND,
    MOLOCALE_ERR_CORRUPT,
    MOLOCALE_ERR_IO,
    MOLOCALE_ERR_NOT_LOADED,
  ])
}

#[no_mangle]
pub extern "C" fn molocale_load_from_file(
  path_ptr: *const u8,
  path_len: usize,
) -> molocale_result {
  catch_panics(|| {
    let path = unsafe { bytes_arg(path_ptr, path_len) };
    let path = match path.and_then(|b| str::from_utf8(b).ok()) {
      Some(v) => v,
      None => return MOLOCALE_ERR_INVALID_ARGUMENT,
    };
    match i18n::try_load_from_file(Path::new(path), &LoadOptions::default()) {
      Ok(_) => MOLOCALE_OK,
      Err(error) => molocale_result::from(&error),
    }
  })
}

/// The data is copied, the caller's buffer may be freed right after this
/// returns.
#[no_mangle]
pub extern "C" fn molocale_load_from_memory(
  data_ptr: *const u8,
  data_len: usize,
  name_ptr: *const u8,
  name_len: usize,
) -> molocale_result {
  catch_panics(|| {
    let data = match unsafe { bytes_arg(data_ptr, data_len) } {
      Some(v) => v,
      None => return MOLOCALE_ERR_INVALID_ARGUMENT,
    };
    let name = match unsafe { bytes_arg(name_ptr, name_len) } {
      Some(v) => String::from_utf8_lossy(v),
      None => return MOLOCALE_ERR_INVALID_ARGUMENT,
    };
    match i18n::try_load_from_reader(data, &name, &LoadOptions::default()) {
      Ok(_) => MOLOCALE_OK,
      Err(error) => molocale_result::from(&error),
    }
  })
}

#[no_mangle]
pub extern "C" fn molocale_unload() -> molocale_result {
  catch_panics(|| {
    i18n::unload();
    MOLOCALE_OK
  })
}

#[no_mangle]
pub extern "C" fn molocale_is_loaded(out: *mut bool) -> molocale_result {
  catch_panics(|| {
    unsafe { *out = i18n::is_loaded() };
    MOLOCALE_OK
  })
}

/// For plural entries the returned string contains all forms separated by
/// NULs, pass it to [`molocale_lookup_plural`] to pick one.
#[no_mangle]
pub extern "C" fn molocale_lookup_translation(
  msgid_ptr: *const u8,
  msgid_len: usize,
  out_ptr: *mut *const u8,
  out_len: *mut usize,
) -> molocale_result {
  catch_panics(|| {
    let msgid = match unsafe { bytes_arg(msgid_ptr, msgid_len) } {
      Some(v) => v,
      None => return MOLOCALE_ERR_INVALID_ARGUMENT,
    };
    let catalog = match i18n::current() {
      Some(v) => v,
      None => return MOLOCALE_ERR_NOT_LOADED,
    };
    match catalog.lookup(msgid) {
      Some(translation) => {
        unsafe { write_bytes_out(translation, out_ptr, out_len) };
        MOLOCALE_OK
      }
      None => MOLOCALE_ERR_NOT_FOUND,
    }
  })
}

/// The returned string is a part of `translation`.
#[no_mangle]
pub extern "C" fn molocale_lookup_plural(
  n: i32,
  translation_ptr: *const u8,
  translation_len: usize,
  out_ptr: *mut *const u8,
  out_len: *mut usize,
) -> molocale_result {
  catch_panics(|| {
    let translation = match unsafe { bytes_arg(translation_ptr, translation_len) } {
      Some(v) => v,
      None => return MOLOCALE_ERR_INVALID_ARGUMENT,
    };
    let catalog = match i18n::current() {
      Some(v) => v,
      None => return MOLOCALE_ERR_NOT_LOADED,
    };
    unsafe { write_bytes_out(catalog.lookup_plural(n, translation), out_ptr, out_len) };
    MOLOCALE_OK
  })
}

#[no_mangle]
pub extern "C" fn molocale_translation_description(
  out_ptr: *mut *const u8,
  out_len: *mut usize,
) -> molocale_result {
  catch_panics(|| {
    let catalog = match i18n::current() {
      Some(v) => v,
      None => return MOLOCALE_ERR_NOT_LOADED,
    };
    unsafe { write_bytes_out(catalog.translation_description(), out_ptr, out_len) };
    MOLOCALE_OK
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::CatalogBuilder;
  use std::ffi::CStr;

  unsafe fn out_bytes<'a>(ptr: *const u8, len: usize) -> &'a [u8] {
    slice::from_raw_parts(ptr, len)
  }

  fn lookup(msgid: &str, out_ptr: &mut *const u8, out_len: &mut usize) -> molocale_result {
    molocale_lookup_translation(msgid.as_ptr(), msgid.len(), out_ptr, out_len)
  }

  #[test]
  fn test_lookups_through_the_c_interface() {
    let _guard = i18n::lock_slot_for_test();
    let mut builder = CatalogBuilder::new();
    builder
      .metadata("Language-Team: Esperanto\nPlural-Forms: nplurals=2; plural=n != 1;\n")
      .add("Hello", "Saluton")
      .add_plural("%d apple", "%d apples", &["%d pomo", "%d pomoj"]);
    let data = builder.build();
    let name = "eo.mo";
    let result = molocale_load_from_memory(data.as_ptr(), data.len(), name.as_ptr(), name.len());
    assert_eq!(result, MOLOCALE_OK);
    drop(data);

    let (mut ptr, mut len): (*const u8, usize) = (ptr::null(), 0);
    assert_eq!(lookup("Hello", &mut ptr, &mut len), MOLOCALE_OK);
    assert_eq!(unsafe { out_bytes(ptr, len) }, b"Saluton");

    assert_eq!(lookup("%d apple", &mut ptr, &mut len), MOLOCALE_OK);
    let (forms_ptr, forms_len) = (ptr, len);
    assert_eq!(molocale_lookup_plural(3, forms_ptr, forms_len, &mut ptr, &mut len), MOLOCALE_OK);
    assert_eq!(unsafe { out_bytes(ptr, len) }, b"%d pomoj");

    assert_eq!(molocale_translation_description(&mut ptr, &mut len), MOLOCALE_OK);
    assert_eq!(unsafe { out_bytes(ptr, len) }, b"Esperanto");

    assert_eq!(lookup("Goodbye", &mut ptr, &mut len), MOLOCALE_ERR_NOT_FOUND);

    assert_eq!(molocale_unload(), MOLOCALE_OK);
    assert_eq!(lookup("Hello", &mut ptr, &mut len), MOLOCALE_ERR_NOT_LOADED);
  }

  #[test]
  fn test_load_errors() {
    let _guard = i18n::lock_slot_for_test();
    let garbage = [0u8; 40];
    let load_from_memory = |data_ptr: *const u8, data_len: usize| {
      molocale_load_from_memory(data_ptr, data_len, ptr::null(), 0)
    };
    assert_eq!(load_from_memory(garbage.as_ptr(), garbage.len()), MOLOCALE_ERR_CORRUPT);
    assert_eq!(load_from_memory(ptr::null(), 0), MOLOCALE_ERR_NOT_FOUND);
    assert_eq!(load_from_memory(ptr::null(), 5), MOLOCALE_ERR_INVALID_ARGUMENT);
    let path = "/nonexistent/catalog.mo";
    assert_eq!(molocale_load_from_file(path.as_ptr(), path.len()), MOLOCALE_ERR_NOT_FOUND);
    let mut loaded = true;
    assert_eq!(molocale_is_loaded(&mut loaded), MOLOCALE_OK);
    assert!(!loaded);
  }

  #[test]
  fn test_error_strings() {
    let id = unsafe { CStr::from_ptr(molocale_error_id_str(MOLOCALE_ERR_CORRUPT) as *const _) };
    assert_eq!(id.to_str().unwrap(), "MOLOCALE_ERR_CORRUPT");
    let description =
      unsafe { CStr::from_ptr(molocale_error_description(MOLOCALE_OK) as *const _) };
    assert_eq!(description.to_str().unwrap(), "this isn't actually an error");
  }
}
