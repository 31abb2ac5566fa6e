use crate::impl_prelude::*;

use std::fmt;
use std::iter;
use std::str;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CharPos {
  pub byte_index: usize,
  pub char_index: usize,
  pub line: usize,
  pub column: usize,
}

impl CharPos {
  /// Position inside a single-line source, such as a plural expression, where
  /// every byte is counted as one column.
  pub fn in_single_line(byte_index: usize) -> Self {
    Self { byte_index, char_index: byte_index, line: 1, column: byte_index + 1 }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsingError {
  pub pos: CharPos,
  pub message: Cow<'static, str>,
}

impl ParsingError {
  pub fn new(pos: CharPos, message: impl Into<Cow<'static, str>>) -> Self {
    Self { pos, message: message.into() }
  }

  #[inline(always)]
  pub fn nice_formatter<'error>(
    &'error self,
    filename: &'error str,
    src: &'error str,
  ) -> NiceParsingErrorFormatter<'error> {
    NiceParsingErrorFormatter { error: self, filename, src: Some(src) }
  }
}

impl fmt::Display for ParsingError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(
      &NiceParsingErrorFormatter { error: self, filename: "<unknown>", src: None },
      f,
    )
  }
}

impl StdError for ParsingError {
}

#[derive(Debug)]
pub struct NiceParsingErrorFormatter<'error> {
  error: &'error ParsingError,
  filename: &'error str,
  src: Option<&'error str>,
}

impl<'error> fmt::Display for NiceParsingErrorFormatter<'error> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let pos = self.error.pos;
    writeln!(f, "Syntax error in {}:{}:{}", self.filename, pos.line, pos.column)?;
    let line_text = self.src.and_then(|src| CharPosIter::find_line(src, pos.line));
    if let Some(line_text) = line_text {
      let line_number_str = format!("{}", pos.line);
      let line_number_margin = " ".repeat(line_number_str.len());
      writeln!(f, "{} | {}", line_number_str, line_text.trim_end_matches(&['\r', '\n'][..]))?;
      // Column numbers start at one, so the pointer line has no separating
      // space after the bar.
      writeln!(f, "{} |{}^", line_number_margin, " ".repeat(pos.column))?;
      write!(f, "{} = {}", line_number_margin, self.error.message)?;
    } else {
      write!(f, "{}", self.error.message)?;
    }
    Ok(())
  }
}

#[derive(Debug, Clone)]
pub struct CharPosIter<'str> {
  iter: str::CharIndices<'str>,
  current_pos: CharPos,
  newline_char_reached: bool,
}

impl<'str> CharPosIter<'str> {
  #[inline(always)]
  pub fn as_str(&self) -> &'str str { self.iter.as_str() }
  #[inline(always)]
  pub fn current_pos(&self) -> CharPos { self.current_pos }

  pub fn new(string: &'str str) -> Self {
    Self {
      iter: string.char_indices(),
      current_pos: CharPos::default(),
      newline_char_reached: true,
    }
  }

  pub fn find_line(string: &str, line_number: usize) -> Option<&str> {
    let mut line_start_index: Option<usize> = None;
    let mut line_end_index: usize = 0;

    for (pos, c) in CharPosIter::new(string) {
      match line_start_index {
        None if pos.line == line_number => line_start_index = Some(pos.byte_index),
        None => {}
        Some(_) if c == '\n' || pos.line != line_number => break,
        Some(_) => {}
      }
      // The end has to be tracked from the very first character of the line:
      // a line that is one character long and the last one in the file never
      // reaches the `break` above.
      line_end_index = pos.byte_index + c.len_utf8();
    }

    line_start_index.map(|start| &string[start..line_end_index])
  }
}

impl<'str> Iterator for CharPosIter<'str> {
  type Item = (CharPos, char);

  fn next(&mut self) -> Option<Self::Item> {
    let (i, c) = self.iter.next()?;
    self.current_pos.byte_index = i;
    self.current_pos.char_index += 1;
    if self.newline_char_reached {
      self.current_pos.column = 1;
      self.current_pos.line += 1;
    } else {
      self.current_pos.column += 1;
    }
    self.newline_char_reached = c == '\n';
    Some((self.current_pos, c))
  }

  #[inline(always)]
  fn count(self) -> usize { self.iter.count() }

  #[inline(always)]
  fn size_hint(&self) -> (usize, Option<usize>) { self.iter.size_hint() }
}

impl iter::FusedIterator for CharPosIter<'_> {
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_find_line() {
    let src = "first\nsecond\nx";
    assert_eq!(CharPosIter::find_line(src, 1), Some("first"));
    assert_eq!(CharPosIter::find_line(src, 2), Some("second"));
    assert_eq!(CharPosIter::find_line(src, 3), Some("x"));
    assert_eq!(CharPosIter::find_line(src, 4), None);
  }

  #[test]
  fn test_nice_formatter_points_at_column() {
    let error = ParsingError::new(CharPos::in_single_line(4), "expected an operand");
    let text = format!("{}", error.nice_formatter("<plural>", "n % "));
    let expected = [
      "Syntax error in <plural>:1:5",
      "1 | n % ",
      "  |     ^",
      "  = expected an operand",
    ];
    assert_eq!(text, expected.join("\n"));
  }
}
