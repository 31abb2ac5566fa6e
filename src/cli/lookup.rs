use crate::i18n::{self, LanguageSelection};
use crate::impl_prelude::*;

use std::path::PathBuf;

#[derive(Debug)]
pub struct LookupCommand;

impl super::Command for LookupCommand {
  fn name(&self) -> &'static str { "lookup" }

  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help> {
    app
      .about(
        "Translates a message the way a program using the catalog would, printing the original \
        text if there is no translation.",
      )
      .arg(
        clap::Arg::new("msgid")
          .value_name("MSGID")
          .value_hint(clap::ValueHint::Other)
          .required(true)
          .help("The original text of the message."),
      )
      .arg(
        clap::Arg::new("catalog")
          .value_name("MO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .short('c')
          .long("catalog")
          .help("Path to the catalog to translate with."),
      )
      .arg(
        clap::Arg::new("locale_dir")
          .value_name("DIR")
          .value_hint(clap::ValueHint::DirPath)
          .value_parser(clap::value_parser!(PathBuf))
          .short('d')
          .long("locale-dir")
          .requires("languages")
          .help("Directory with catalogs named after their languages, e.g. pt_BR.mo."),
      )
      .group(clap::ArgGroup::new("catalog_source").args(&["catalog", "locale_dir"]).required(true))
      .arg(
        clap::Arg::new("languages")
          .value_name("LANG")
          .value_hint(clap::ValueHint::Other)
          .short('l')
          .long("language")
          .action(clap::ArgAction::Append)
          .help(
            "Preferred languages, most wanted first. Languages with specifiers, such as pt_BR, \
            fall back to their base language.",
          ),
      )
      .arg(
        clap::Arg::new("source_language")
          .value_name("LANG")
          .value_hint(clap::ValueHint::Other)
          .long("source-language")
          .default_value("en")
          .help("Language of the original texts, needs no catalog."),
      )
      .arg(
        clap::Arg::new("context")
          .value_name("MSGCTXT")
          .value_hint(clap::ValueHint::Other)
          .long("context")
          .help("Disambiguating context of the message."),
      )
      .arg(
        clap::Arg::new("plural")
          .value_name("MSGID_PLURAL")
          .value_hint(clap::ValueHint::Other)
          .long("plural")
          .requires("count")
          .help("The original plural text, turns the lookup into a plural one."),
      )
      .arg(
        clap::Arg::new("count")
          .value_name("N")
          .value_hint(clap::ValueHint::Other)
          .short('n')
          .long("count")
          .value_parser(clap::value_parser!(i32))
          .allow_hyphen_values(true)
          .help("The number to select the plural form for."),
      )
  }

  fn run(&self, global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_msgid = matches.get_one::<String>("msgid").unwrap();
    let opt_catalog = matches.get_one::<PathBuf>("catalog");
    let opt_locale_dir = matches.get_one::<PathBuf>("locale_dir");
    let opt_languages: Vec<&String> =
      matches.get_many::<String>("languages").map_or_else(Vec::new, |values| values.collect());
    let opt_source_language = matches.get_one::<String>("source_language").unwrap();
    let opt_context = matches.get_one::<String>("context");
    let opt_plural = matches.get_one::<String>("plural");
    let opt_count = matches.get_one::<i32>("count").copied();

    let load_options = global_opts.load_options();
    if let Some(path) = opt_catalog {
      i18n::try_load_from_file(path, &load_options)
        .with_context(|| format!("Failed to load the catalog {:?}", path))?;
    } else if let Some(dir) = opt_locale_dir {
      let selection =
        i18n::try_load_preferred_language(&opt_languages, opt_source_language, |language| {
          let path = dir.join(format!("{}.mo", language));
          i18n::try_load_from_file(&path, &load_options).is_ok()
        });
      match selection {
        LanguageSelection::Translated(language) => info!("Using the catalog for {:?}", language),
        LanguageSelection::Source => info!("The source language is preferred, not translating"),
        LanguageSelection::Unavailable => warn!("None of the preferred languages has a catalog"),
      }
    }

    if let Some(catalog) = i18n::current() {
      let description = i18n::translation_description();
      if !description.is_empty() {
        debug!("Translated by {}", description);
      }
      trace!("{:?} is using {}", catalog.display_name(), catalog.lookup_strategy());
    }

    let text = match (opt_context, opt_plural, opt_count) {
      (None, None, _) => i18n::gettext(opt_msgid),
      (Some(context), None, _) => i18n::pgettext(context, opt_msgid),
      (None, Some(plural), Some(n)) => i18n::ngettext(opt_msgid, plural, n),
      (Some(context), Some(plural), Some(n)) => i18n::npgettext(context, opt_msgid, plural, n),
      (_, Some(_), None) => bail!("--plural requires --count"),
    };
    println!("{}", text);

    i18n::unload();
    Ok(())
  }
}
