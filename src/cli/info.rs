use crate::catalog::Catalog;
use crate::impl_prelude::*;

use std::path::PathBuf;

#[derive(Debug)]
pub struct InfoCommand;

impl super::Command for InfoCommand {
  fn name(&self) -> &'static str { "info" }

  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help> {
    app
      .about("Displays the header and the metadata of a compiled catalog.")
      //
      .arg(
        clap::Arg::new("catalog")
          .value_name("MO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .required(true)
          .help("Path to the catalog."),
      )
  }

  fn run(&self, global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_catalog = matches.get_one::<PathBuf>("catalog").unwrap();

    let catalog = Catalog::open(opt_catalog, &global_opts.load_options())
      .with_context(|| format!("Failed to load the catalog {:?}", opt_catalog))?;
    let header = catalog.header();
    let plural_rule = catalog.plural_rule();

    println!("          File: {}", catalog.display_name());
    println!("    Byte order: {}", header.byte_order.name());
    println!("      Revision: {}", header.revision);
    println!("       Strings: {}", header.string_count);
    println!("    Hash table: {} slots", header.hash_table_size);
    println!("        Lookup: {}", catalog.lookup_strategy());
    println!("  Plural forms: {}", plural_rule.count());
    println!("   Plural rule: {}", plural_rule.expr());
    println!("   Translators: {}", String::from_utf8_lossy(catalog.translation_description()));

    if let Some(metadata) = catalog.metadata() {
      println!();
      for line in String::from_utf8_lossy(metadata).lines() {
        println!("{}", line);
      }
    }

    Ok(())
  }
}
