use crate::catalog::{Catalog, CONTEXT_SEPARATOR};
use crate::gettext_po;
use crate::impl_prelude::*;
use crate::utils;

use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug)]
pub struct DumpCommand;

impl super::Command for DumpCommand {
  fn name(&self) -> &'static str { "dump" }

  fn create_arg_parser<'help>(&self, app: clap::Command<'help>) -> clap::Command<'help> {
    app
      .about("Prints every entry of a compiled catalog, in the .po syntax or as JSON.")
      .arg(
        clap::Arg::new("catalog")
          .value_name("MO_FILE")
          .value_hint(clap::ValueHint::FilePath)
          .value_parser(clap::value_parser!(PathBuf))
          .required(true)
          .help("Path to the catalog."),
      )
      .arg(
        clap::Arg::new("json")
          .short('J')
          .long("json")
          //
          .help("Print one JSON object per entry."),
      )
      .arg(
        clap::Arg::new("compact_output")
          .long("compact-output")
          .short('c')
          .requires("json")
          .help("Turns off pretty-printing of the resulting JSON."),
      )
  }

  fn run(&self, global_opts: super::GlobalOpts, matches: &clap::ArgMatches) -> AnyResult<()> {
    let opt_catalog = matches.get_one::<PathBuf>("catalog").unwrap();
    let opt_json = matches.is_present("json");
    let opt_compact_output = matches.is_present("compact_output");

    let catalog = Catalog::open(opt_catalog, &global_opts.load_options())
      .with_context(|| format!("Failed to load the catalog {:?}", opt_catalog))?;
    let entries =
      catalog.entries().map(|(original, translation)| DumpedEntry::from_raw(original, translation));

    let mut out = io::stdout();
    let mut is_first_entry = true;
    for entry in entries {
      if opt_json {
        if opt_compact_output {
          serde_json::to_writer(&mut out, &entry)?;
        } else {
          serde_json::to_writer_pretty(&mut out, &entry)?;
        }
        out.write_all(b"\n")?;
      } else {
        if is_first_entry {
          is_first_entry = false;
        } else {
          out.write_all(b"\n")?;
        }
        out.write_all(entry.to_po_syntax().as_bytes())?;
      }
    }
    out.flush()?;

    Ok(())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DumpedEntry<'a> {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub msgctxt: Option<Cow<'a, str>>,
  pub msgid: Cow<'a, str>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub msgid_plural: Option<Cow<'a, str>>,
  pub msgstr: Vec<Cow<'a, str>>,
}

impl<'a> DumpedEntry<'a> {
  /// Splits a stored key into the context, the msgid and the plural msgid,
  /// and the translation into its forms.
  pub fn from_raw(original: &'a [u8], translation: &'a [u8]) -> Self {
    let (msgctxt, key) = match original.iter().position(|&b| b == CONTEXT_SEPARATOR) {
      Some(index) => (Some(&original[..index]), &original[index + 1..]),
      None => (None, original),
    };
    let mut key_parts = key.splitn(2, |&b| b == 0);
    let msgid = key_parts.next().unwrap_or_default();
    let msgid_plural = key_parts.next();
    let msgstr = if msgid_plural.is_some() {
      translation.split(|&b| b == 0).map(String::from_utf8_lossy).collect()
    } else {
      vec![String::from_utf8_lossy(translation)]
    };
    Self {
      msgctxt: msgctxt.map(String::from_utf8_lossy),
      msgid: String::from_utf8_lossy(msgid),
      msgid_plural: msgid_plural.map(String::from_utf8_lossy),
      msgstr,
    }
  }

  pub fn to_po_syntax(&self) -> String {
    let mut out = String::new();
    if let Some(msgctxt) = &self.msgctxt {
      write_po_section(&mut out, "msgctxt", msgctxt);
    }
    write_po_section(&mut out, "msgid", &self.msgid);
    if let Some(msgid_plural) = &self.msgid_plural {
      write_po_section(&mut out, "msgid_plural", msgid_plural);
      for (index, form) in self.msgstr.iter().enumerate() {
        write_po_section(&mut out, &format!("msgstr[{}]", index), form);
      }
    } else if let Some(msgstr) = self.msgstr.first() {
      write_po_section(&mut out, "msgstr", msgstr);
    }
    out
  }
}

/// Multi-line texts are split after every line break, like msgfmt and
/// Poedit write them.
fn write_po_section(out: &mut String, keyword: &str, text: &str) {
  let lines: Vec<&str> = utils::LinesWithEndings::new(text).collect();
  out.push_str(keyword);
  out.push(' ');
  if lines.len() > 1 {
    out.push_str("\"\"\n");
  }
  if lines.is_empty() {
    out.push_str("\"\"\n");
  }
  for line in lines {
    out.push('"');
    gettext_po::escape_str(line, out);
    out.push_str("\"\n");
  }
}
