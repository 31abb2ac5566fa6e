pub mod parsing;

use crate::impl_prelude::*;

use std::fs;

pub fn fast_concat_cow(strings: &[Cow<str>]) -> String {
  let mut capacity = 0;
  for s in strings {
    capacity += s.len();
  }
  let mut result = String::with_capacity(capacity);
  for s in strings {
    result.push_str(s);
  }
  result
}

/// Returns the part of `bytes` before the first NUL, i.e. what `strlen` would
/// see if `bytes` was a C string.
#[inline]
pub fn until_nul(bytes: &[u8]) -> &[u8] {
  match bytes.iter().position(|&b| b == 0) {
    Some(nul_index) => &bytes[..nul_index],
    None => bytes,
  }
}

/// Naive substring search, the inputs here are metadata records of a few
/// hundred bytes at most.
pub fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
  if needle.is_empty() {
    return Some(0);
  }
  if needle.len() > haystack.len() {
    return None;
  }
  haystack.windows(needle.len()).position(|window| window == needle)
}

pub fn trim_ascii_whitespace(mut bytes: &[u8]) -> &[u8] {
  while let [first, rest @ ..] = bytes {
    if !first.is_ascii_whitespace() {
      break;
    }
    bytes = rest;
  }
  while let [rest @ .., last] = bytes {
    if !last.is_ascii_whitespace() {
      break;
    }
    bytes = rest;
  }
  bytes
}

/// Taken from <https://stackoverflow.com/a/40457615>.
#[derive(Debug)]
pub struct LinesWithEndings<'a> {
  text: &'a str,
}

impl<'a> LinesWithEndings<'a> {
  #[inline(always)]
  pub fn new(text: &'a str) -> LinesWithEndings<'a> { LinesWithEndings { text } }
}

impl<'a> Iterator for LinesWithEndings<'a> {
  type Item = &'a str;
  fn next(&mut self) -> Option<Self::Item> {
    if self.text.is_empty() {
      return None;
    }
    #[allow(clippy::or_fun_call)]
    let split = self.text.find('\n').map(|i| i + 1).unwrap_or(self.text.len());
    let (line, rest) = self.text.split_at(split);
    self.text = rest;
    Some(line)
  }
}

/// See <https://github.com/rust-lang/rust/blob/1.55.0/library/std/src/fs.rs#L201-L207>
/// and <https://github.com/rust-lang/rust/commit/a990c76d84ccc5c285cbd533ea6020778fa18863>.
pub fn buffer_capacity_for_reading_file(file: &fs::File) -> usize {
  match file.metadata() {
    Ok(m) => m.len() as usize + 1,
    Err(_) => 0,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_until_nul() {
    assert_eq!(until_nul(b"file\0files"), b"file");
    assert_eq!(until_nul(b"file"), b"file");
    assert_eq!(until_nul(b""), b"");
  }

  #[test]
  fn test_find_subslice() {
    let text = b"nplurals=3; plural=n%10==1;";
    assert_eq!(find_subslice(text, b"plural="), Some(12));
    assert_eq!(find_subslice(text, b"nplurals="), Some(0));
    assert_eq!(find_subslice(text, b"plurals=4"), None);
    assert_eq!(find_subslice(b"ab", b"abc"), None);
  }

  #[test]
  fn test_trim_ascii_whitespace() {
    assert_eq!(trim_ascii_whitespace(b"  Czech <cs@li.org>\r"), b"Czech <cs@li.org>");
    assert_eq!(trim_ascii_whitespace(b" \t "), b"");
  }

  #[test]
  fn test_lines_with_endings() {
    let lines: Vec<&str> = LinesWithEndings::new("a\nb\n\nc").collect();
    assert_eq!(lines, vec!["a\n", "b\n", "\n", "c"]);
  }
}
