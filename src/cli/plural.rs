use crate::catalog::Catalog;
use crate::impl_prelude::*;
use crate::plural::{PluralRule, DEFAULT_PLURAL_COUNT};

use std::path::PathBuf;

#[derive(Debug)]
pub struct PluralCommand;

impl super::Command for PluralCommand {
  fn name(&self) -> &'static str { "plural" }

  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help> {
    app
      .about(
        "Evaluates a plural rule, given either as a C expression or taken from a catalog, and \
        prints the form selected for each number.",
      )
      .arg(
        clap::Arg::new("expression")
          .value_name("EXPR")
          .value_hint(clap::ValueHint::Other)
          .short('e')
          .long("expression")
          .help("The expression, in the syntax of the plural= part of the Plural-Forms header."),
      )
      .arg(
        clap::Arg::new("catalog")
          .value_name("MO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .short('c')
          .long("catalog")
          .help("Take the rule from the header of this catalog."),
      )
      .group(clap::ArgGroup::new("rule_source").args(&["expression", "catalog"]).required(true))
      .arg(
        clap::Arg::new("numbers")
          .value_name("N")
          .value_hint(clap::ValueHint::Other)
          .value_parser(clap::value_parser!(i32))
          .action(clap::ArgAction::Append)
          .allow_hyphen_values(true)
          .required(true)
          .help("Numbers to select the forms for."),
      )
  }

  fn run(&self, global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_expression = matches.get_one::<String>("expression");
    let opt_catalog = matches.get_one::<PathBuf>("catalog");
    let opt_numbers: Vec<i32> =
      matches.get_many::<i32>("numbers").map_or_else(Vec::new, |values| values.copied().collect());

    let rule = if let Some(expression) = opt_expression {
      match PluralRule::parse(expression.as_bytes(), DEFAULT_PLURAL_COUNT) {
        Ok(rule) => rule,
        Err(error) => {
          error!("{}", error.nice_formatter("<expression>", expression));
          bail!("Failed to parse the plural expression");
        }
      }
    } else if let Some(path) = opt_catalog {
      let catalog = Catalog::open(path, &global_opts.load_options())
        .with_context(|| format!("Failed to load the catalog {:?}", path))?;
      catalog.plural_rule().clone()
    } else {
      unreachable!()
    };

    info!("Plural rule: {}", rule.expr());
    for n in opt_numbers {
      println!("{} => {}", n, rule.index(n));
    }

    Ok(())
  }
}
