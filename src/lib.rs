#![deny(missing_debug_implementations)]
#![allow(clippy::new_without_default)]

#[macro_use]
pub mod macros;

pub mod catalog;
pub mod cli;
pub mod compile_po;
pub mod ffi;
pub mod gettext_po;
pub mod i18n;
pub mod impl_prelude;
pub mod logging;
pub mod plural;
pub mod utils;

pub const CRATE_TITLE: &str = "MoLocale";
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
pub const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Returns `false` if some other logger had been installed already.
pub fn init_logging() -> bool {
  env_logger::try_init_from_env(env_logger::Env::default().default_filter_or(
    // The logging level of `env_logger` can't be changed once the logger has
    // been installed, so instead let's by default allow all logging levels
    // on the `env_logger` side, we will lower the logging level later on
    // ourselves on the `log` side.
    "trace",
  ))
  .is_ok()
}
