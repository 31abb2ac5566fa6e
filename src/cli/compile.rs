use super::FileOrStdStream;
use crate::catalog::ByteOrder;
use crate::compile_po::{self, CompileOptions};
use crate::impl_prelude::*;

use std::ffi::OsString;

#[derive(Debug)]
pub struct CompileCommand;

impl super::Command for CompileCommand {
  fn name(&self) -> &'static str { "compile" }

  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help> {
    app
      .about("Compiles a .po file into a binary .mo catalog, like msgfmt does.")
      .arg(
        clap::Arg::new("input")
          .value_name("PO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(OsString))
          .required(true)
          .help("Path to the source file, or - to read it from stdin."),
      )
      .arg(
        clap::Arg::new("output")
          .value_name("MO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(OsString))
          .short('o')
          .long("output")
          .required(true)
          .help("Path to the compiled catalog, or - to write it to stdout."),
      )
      .arg(
        clap::Arg::new("include_fuzzy")
          .short('f')
          .long("use-fuzzy")
          .help("Compile translations marked as fuzzy too."),
      )
      .arg(
        clap::Arg::new("no_hash_table")
          .long("no-hash")
          //
          .help("Don't write the hash table, lookups will fall back to binary search."),
      )
      .arg(
        clap::Arg::new("big_endian")
          .long("big-endian")
          //
          .help("Write the catalog in big-endian byte order."),
      )
  }

  fn run(&self, _global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_input = FileOrStdStream::from(matches.get_one::<OsString>("input").unwrap());
    let opt_output = FileOrStdStream::from(matches.get_one::<OsString>("output").unwrap());
    let options = CompileOptions {
      include_fuzzy: matches.is_present("include_fuzzy"),
      hash_table: !matches.is_present("no_hash_table"),
      byte_order: if matches.is_present("big_endian") {
        ByteOrder::BigEndian
      } else {
        ByteOrder::LittleEndian
      },
    };

    let filename = opt_input.display_name();
    info!("Compiling {:?}", filename);
    let src =
      opt_input.read_to_string().with_context(|| format!("Failed to read {:?}", filename))?;

    let (builder, stats) = match compile_po::compile(&src, &options) {
      Ok(v) => v,
      Err(error) => {
        error!("{}", error.nice_formatter(&filename, &src));
        bail!("Failed to parse {:?}", filename);
      }
    };
    info!(
      "{} translated messages, {} fuzzy and {} untranslated ones were skipped",
      stats.translated, stats.fuzzy_skipped, stats.untranslated_skipped,
    );

    let bytes = builder.build();
    opt_output.write_all(&bytes).context("Failed to write the compiled catalog")?;
    debug!("Wrote {} bytes", bytes.len());

    Ok(())
  }
}
