// See:
// <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/po-gram-gen.y>
// <https://github.com/autotools-mirror/gettext/blob/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-tools/src/po-lex.c>
// <https://www.gnu.org/software/gettext/manual/gettext.html#PO-Files>
// <https://www.gnu.org/software/gettext/manual/gettext.html#Filling-in-the-Header-Entry>
// <https://www.gnu.org/software/gettext/manual/gettext.html#Invoking-the-msginit-Program>
// <https://github.com/izimobil/polib/blob/0ab9af63d227d30fb261c2dd496ee74f91844a86/polib.py>
// <https://github.com/translate/translate/blob/88d13bea244b1894a4bedf67ba5b8b65cc29d3b0/translate/storage/pypo.py>
// <https://github.com/translate/translate/blob/88d13bea244b1894a4bedf67ba5b8b65cc29d3b0/translate/storage/cpo.py>
// <https://docs.oasis-open.org/xliff/v1.2/xliff-profile-po-1.2-pr-02-20061016-DIFF.pdf>
//
// For testing the behavior of GNU gettext the following Python program can be
// used (launch with the environment variable `USECPO` set to `1`):
//
//     from translate.storage.po import pofile
//     import sys
//     POFile(sys.stdin.buffer).serialize(sys.stdout.buffer)
//
// Needless to say, it requires installation of <https://github.com/translate/translate>
// (also see <https://github.com/translate/translate/blob/88d13bea244b1894a4bedf67ba5b8b65cc29d3b0/translate/storage/po.py>).

pub mod lexer;
pub mod parser;

pub use self::lexer::Lexer;
pub use self::parser::{ParsedMessage, Parser};
pub use crate::utils::parsing::{CharPos, CharPosIter, ParsingError};

pub fn parse(src: &str) -> Parser { Parser::new(Lexer::new(src)) }

pub fn escape_str(text: &str, out: &mut String) {
  out.reserve(text.len());
  let mut literal_text_start = 0;

  for (i, &b) in text.as_bytes().iter().enumerate() {
    let escape_type = ESCAPE_TYPE_TABLE[b as usize];
    if escape_type == 0 {
      continue;
    }

    let literal_text = &text[literal_text_start..i];
    out.push_str(literal_text);
    literal_text_start = i + 1;

    if escape_type == XX {
      static HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";
      out.push_str("\\x");
      out.push(HEX_DIGITS[(b >> 4) as usize] as char);
      out.push(HEX_DIGITS[(b & 0xf) as usize] as char);
    } else {
      out.push('\\');
      out.push(escape_type as char);
    };
  }

  let last_literal_text = &text[literal_text_start..];
  out.push_str(last_literal_text);

  const BB: u8 = b'b'; // \x08
  const TT: u8 = b't'; // \x09
  const NN: u8 = b'n'; // \x0A
  const FF: u8 = b'f'; // \x0C
  const RR: u8 = b'r'; // \x0D
  const QU: u8 = b'"'; // \x22
  const BS: u8 = b'\\'; // \x5C
  const XX: u8 = b'x'; // \x00...\x1F except the ones above
  const __: u8 = 0;

  /// See <https://github.com/serde-rs/json/blob/9b64e0b17ca73e7fbecace37758ff19bc35dea05/src/ser.rs#L2123-L2125>.
  static ESCAPE_TYPE_TABLE: [u8; 1 << 8] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    XX, XX, XX, XX, XX, XX, XX, XX, BB, TT, NN, XX, FF, RR, XX, XX, // 0
    XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, XX, // 1
    __, __, QU, __, __, __, __, __, __, __, __, __, __, __, __, __, // 2
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 3
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 4
    __, __, __, __, __, __, __, __, __, __, __, __, BS, __, __, __, // 5
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 6
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 7
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 8
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // 9
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // A
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // B
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // C
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // D
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // E
    __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, __, // F
  ];
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse_all(src: &str) -> Vec<ParsedMessage> {
    parse(src).collect::<Result<Vec<_>, _>>().unwrap()
  }

  #[test]
  fn test_escape_str() {
    let mut buf = String::new();
    escape_str("say \"hi\"\n\tand\\leave\x01", &mut buf);
    assert_eq!(buf, "say \\\"hi\\\"\\n\\tand\\\\leave\\x01");
  }

  #[test]
  fn test_parse_messages() {
    let messages = parse_all(
      r#"# translator comment
msgid ""
msgstr ""
"Language: cs\n"
"Plural-Forms: nplurals=3; plural=(n==1) ? 0 : (n>=2 && n<=4) ? 1 : 2;\n"

#. extracted
#: src/menu.rs:10
#, fuzzy, c-format
msgctxt "menu"
msgid "Open"
msgstr "Otevřít"

msgid "%d file"
msgid_plural "%d files"
msgstr[0] "%d soubor"
msgstr[1] "%d soubory"
msgstr[2] "%d souborů"

#~ msgid "Old"
#~ msgstr "Staré"
"#,
    );
    assert_eq!(messages.len(), 3);

    let header = &messages[0];
    assert!(header.is_header());
    assert_eq!(header.translator_comments, vec![" translator comment"]);
    assert_eq!(header.joined_msgstr()[0].lines().next(), Some("Language: cs"));

    let open = &messages[1];
    assert!(!open.is_header());
    assert!(open.is_fuzzy());
    assert_eq!(open.flags().collect::<Vec<_>>(), vec!["fuzzy", "c-format"]);
    assert_eq!(open.automatic_comments, vec![" extracted"]);
    assert_eq!(open.reference_comments, vec![" src/menu.rs:10"]);
    assert_eq!(open.joined_msgctxt().as_deref(), Some("menu"));
    assert_eq!(open.joined_msgstr(), vec!["Otevřít"]);

    let file = &messages[2];
    assert!(!file.is_fuzzy());
    assert_eq!(file.joined_msgid(), "%d file");
    assert_eq!(file.joined_msgid_plural().as_deref(), Some("%d files"));
    assert_eq!(file.joined_msgstr(), vec!["%d soubor", "%d soubory", "%d souborů"]);
  }

  #[test]
  fn test_empty_context_is_not_missing_context() {
    let messages = parse_all("msgctxt \"\"\nmsgid \"\"\nmsgstr \"x\"\n");
    assert_eq!(messages[0].joined_msgctxt().as_deref(), Some(""));
    assert!(!messages[0].is_header());
  }

  #[test]
  fn test_parse_errors() {
    let first_error = |src: &str| parse(src).find_map(Result::err).unwrap();

    let error = first_error("msgid \"a\"\nmsgstr[0] \"b\"\n");
    assert_eq!(error.message, "msgstr[N] is only allowed after msgid_plural");
    assert_eq!((error.pos.line, error.pos.column), (2, 1));

    let error = first_error("msgid \"a\"\nmsgid_plural \"b\"\nmsgstr[1] \"c\"\n");
    assert_eq!(error.message, "expected msgstr[0], plural forms must be listed in order");

    let error = first_error("msgid \"a\"\nmsgstr \"unterminated\n");
    assert_eq!(error.message, "unterminated string");

    let error = first_error("msgid \"a\"\nmsgstr[x] \"b\"\n");
    assert_eq!(error.message, "expected the index of a plural form");

    let error = first_error("msgid \"a\"\n");
    assert_eq!(error.message, "expected msgstr");
  }
}
