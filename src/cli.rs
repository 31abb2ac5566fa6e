pub mod compile;
pub mod completions;
pub mod dump;
pub mod info;
pub mod lookup;
pub mod plural;

use crate::catalog::{self, LoadOptions};
use crate::impl_prelude::*;

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct GlobalOpts {
  pub verbose: bool,
  pub max_catalog_size: usize,
  pub verify_sorted: bool,
}

impl GlobalOpts {
  pub fn add_to_arg_parser(app: clap::Command<'_>) -> clap::Command<'_> {
    app
      .arg(
        clap::Arg::new("verbose")
          .short('v')
          .long("verbose")
          .global(true)
          .help("Print more logs, may help with troubleshooting."),
      )
      .arg(
        clap::Arg::new("max_catalog_size")
          .value_name("BYTES")
          .value_hint(clap::ValueHint::Other)
          .long("max-catalog-size")
          .global(true)
          .value_parser(clap::value_parser!(usize))
          .help("Catalogs larger than this are rejected as corrupt. [default: 16 MiB]"),
      )
      .arg(
        clap::Arg::new("verify_sorted")
          .long("verify-sorted")
          .global(true)
          .help(
            "Reject catalogs without a hash table whose original strings aren't sorted, binary \
            search gives wrong answers on those.",
          ),
      )
  }

  pub fn from_matches(matches: &clap::ArgMatches) -> Self {
    Self {
      verbose: matches.is_present("verbose"),
      max_catalog_size: matches
        .get_one::<usize>("max_catalog_size")
        .copied()
        .unwrap_or(catalog::DEFAULT_MAX_FILE_SIZE),
      verify_sorted: matches.is_present("verify_sorted"),
    }
  }

  pub fn load_options(&self) -> LoadOptions {
    LoadOptions { max_file_size: self.max_catalog_size, verify_sorted: self.verify_sorted }
  }
}

pub trait Command {
  fn name(&self) -> &'static str;
  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help>;
  fn run(&self, global_opts: GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()>;
}

assert_trait_is_object_safe!(Command);

pub fn all_commands() -> Vec<Box<dyn Command>> {
  vec![
    Box::new(compile::CompileCommand),
    Box::new(lookup::LookupCommand),
    Box::new(info::InfoCommand),
    Box::new(dump::DumpCommand),
    Box::new(plural::PluralCommand),
    Box::new(completions::CompletionsCommand),
  ]
}

pub fn create_complete_arg_parser() -> (clap::Command<'static>, Vec<Box<dyn Command>>) {
  let all_commands = all_commands();
  let mut app = clap::Command::new(crate::CRATE_TITLE)
    .version(crate::CRATE_VERSION)
    .about("Compiles, inspects and queries gettext message catalogs.")
    .subcommand_required(true)
    .arg_required_else_help(true);
  app = GlobalOpts::add_to_arg_parser(app);
  for command in &all_commands {
    app = app.subcommand(command.create_arg_parser(clap::Command::new(command.name())));
  }
  (app, all_commands)
}

/// Either a path or `-`, which stands for stdin or stdout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOrStdStream {
  File(PathBuf),
  StdStream,
}

impl FileOrStdStream {
  pub fn display_name(&self) -> Cow<str> {
    match self {
      Self::File(path) => path.to_string_lossy(),
      Self::StdStream => "<stdin>".into(),
    }
  }

  pub fn read_to_string(&self) -> io::Result<String> {
    match self {
      Self::File(path) => fs::read_to_string(path),
      Self::StdStream => {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
      }
    }
  }

  pub fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
    match self {
      Self::File(path) => fs::write(path, bytes),
      Self::StdStream => {
        let mut out = io::stdout();
        out.write_all(bytes)?;
        out.flush()
      }
    }
  }
}

impl<T: ?Sized + AsRef<OsStr>> From<&T> for FileOrStdStream {
  fn from(s: &T) -> Self { Self::from(s.as_ref().to_os_string()) }
}

impl From<OsString> for FileOrStdStream {
  fn from(v: OsString) -> Self {
    if v == "-" {
      Self::StdStream
    } else {
      Self::File(PathBuf::from(v))
    }
  }
}
