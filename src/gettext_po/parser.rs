use super::lexer::{CommentType, Lexer, Token, TokenType};
use super::{CharPos, ParsingError};
use crate::utils;

use std::borrow::Cow;
use std::iter;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct ParsedMessage<'src> {
  pub translator_comments: Vec<Cow<'src, str>>,
  pub automatic_comments: Vec<Cow<'src, str>>,
  pub reference_comments: Vec<Cow<'src, str>>,
  pub flags_comments: Vec<Cow<'src, str>>,
  /// `None` and an empty context are different things in gettext.
  pub msgctxt: Option<Vec<Cow<'src, str>>>,
  pub msgid: Vec<Cow<'src, str>>,
  pub msgid_plural: Option<Vec<Cow<'src, str>>>,
  /// A single element for regular messages, one element per form for the
  /// ones with a `msgid_plural`.
  pub msgstr: Vec<Vec<Cow<'src, str>>>,
}

impl<'src> ParsedMessage<'src> {
  pub fn flags(&self) -> impl Iterator<Item = &str> + '_ {
    self.flags_comments.iter().flat_map(|line| line.split(',')).map(str::trim)
  }

  pub fn is_fuzzy(&self) -> bool { self.flags().any(|flag| flag == "fuzzy") }

  /// The header entry carries the catalog's metadata instead of a message.
  pub fn is_header(&self) -> bool {
    self.msgctxt.is_none() && self.msgid.iter().all(|s| s.is_empty())
  }

  pub fn joined_msgctxt(&self) -> Option<String> {
    self.msgctxt.as_ref().map(|parts| utils::fast_concat_cow(parts))
  }
  pub fn joined_msgid(&self) -> String { utils::fast_concat_cow(&self.msgid) }
  pub fn joined_msgid_plural(&self) -> Option<String> {
    self.msgid_plural.as_ref().map(|parts| utils::fast_concat_cow(parts))
  }
  pub fn joined_msgstr(&self) -> Vec<String> {
    self.msgstr.iter().map(|parts| utils::fast_concat_cow(parts)).collect()
  }
}

#[derive(Debug, Clone)]
pub struct Parser<'src> {
  lexer: iter::Peekable<Lexer<'src>>,
  done: bool,
  current_token_start_pos: CharPos,
  current_token_end_pos: CharPos,
}

impl<'src> Parser<'src> {
  pub fn new(lexer: Lexer<'src>) -> Self {
    Self {
      lexer: lexer.peekable(),
      done: false,
      current_token_start_pos: CharPos::default(),
      current_token_end_pos: CharPos::default(),
    }
  }

  fn next_token(&mut self) -> Result<Option<TokenType<'src>>, ParsingError> {
    match self.lexer.next() {
      Some(Ok(token)) => {
        let Token { start_pos, end_pos, type_ } = token;
        self.current_token_start_pos = start_pos;
        self.current_token_end_pos = end_pos;
        Ok(Some(type_))
      }
      Some(Err(error)) => {
        self.done = true;
        Err(error)
      }
      None => {
        self.done = true;
        Ok(None)
      }
    }
  }

  fn peek_token(&mut self) -> Result<Option<&TokenType<'src>>, ParsingError> {
    match self.lexer.peek() {
      Some(Ok(token)) => Ok(Some(&token.type_)),
      Some(Err(error)) => {
        self.done = true;
        Err(error.clone())
      }
      None => {
        self.done = true;
        Ok(None)
      }
    }
  }

  fn emit_error<T>(&mut self, message: impl Into<Cow<'static, str>>) -> Result<T, ParsingError> {
    self.done = true;
    Err(ParsingError::new(self.current_token_start_pos, message))
  }

  fn emit_error_after<T>(
    &mut self,
    message: impl Into<Cow<'static, str>>,
  ) -> Result<T, ParsingError> {
    self.done = true;
    Err(ParsingError::new(self.current_token_end_pos, message))
  }

  fn parse_next_message(&mut self) -> Result<Option<ParsedMessage<'src>>, ParsingError> {
    if self.done {
      return Ok(None);
    }

    let mut message = ParsedMessage::default();

    self.parse_comments_block(&mut message)?;
    // Comments at the very end of the file, usually obsolete entries.
    if self.peek_token()?.is_none() {
      return Ok(None);
    }

    if let Some(TokenType::Msgctxt) = self.peek_token()? {
      self.next_token()?;
      message.msgctxt = Some(self.parse_string_list()?);
    }

    match self.next_token()? {
      Some(TokenType::Msgid) => message.msgid = self.parse_string_list()?,
      _ => return self.emit_error("expected msgctxt or msgid"),
    }

    if let Some(TokenType::MsgidPlural) = self.peek_token()? {
      self.next_token()?;
      message.msgid_plural = Some(self.parse_string_list()?);
    }

    if message.msgid_plural.is_some() {
      while let Some(&TokenType::MsgstrPlural(index)) = self.peek_token()? {
        self.next_token()?;
        if index != message.msgstr.len() {
          return self.emit_error(format!(
            "expected msgstr[{}], plural forms must be listed in order",
            message.msgstr.len(),
          ));
        }
        message.msgstr.push(self.parse_string_list()?);
      }
      if message.msgstr.is_empty() {
        return self.emit_error_after("expected msgstr[0]");
      }
    } else {
      match self.next_token()? {
        Some(TokenType::Msgstr) => message.msgstr.push(self.parse_string_list()?),
        Some(TokenType::MsgstrPlural(_)) => {
          return self.emit_error("msgstr[N] is only allowed after msgid_plural")
        }
        _ => return self.emit_error("expected msgstr"),
      }
    }

    Ok(Some(message))
  }

  fn parse_string_list(&mut self) -> Result<Vec<Cow<'src, str>>, ParsingError> {
    let mut out = Vec::new();
    while self.peek_token()?.map_or(false, |t| matches!(t, TokenType::String(..))) {
      let text = match self.next_token()? {
        Some(TokenType::String(text)) => text,
        _ => unreachable!(),
      };
      out.push(text);
    }
    if out.is_empty() {
      return self.emit_error_after("expected one or more strings");
    }
    Ok(out)
  }

  fn parse_comments_block(&mut self, out: &mut ParsedMessage<'src>) -> Result<(), ParsingError> {
    while self.peek_token()?.map_or(false, |t| matches!(t, TokenType::Comment(..))) {
      let (type_, text) = match self.next_token()? {
        Some(TokenType::Comment(type_, text)) => (type_, text),
        _ => unreachable!(),
      };
      let list = match type_ {
        CommentType::Translator => &mut out.translator_comments,
        CommentType::Automatic => &mut out.automatic_comments,
        CommentType::Reference => &mut out.reference_comments,
        CommentType::Flags => &mut out.flags_comments,
        CommentType::Previous | CommentType::Obsolete => continue,
      };
      list.push(text);
    }
    Ok(())
  }
}

impl<'src> Iterator for Parser<'src> {
  type Item = Result<ParsedMessage<'src>, ParsingError>;

  fn next(&mut self) -> Option<Self::Item> {
    match self.parse_next_message() {
      Ok(Some(v)) => Some(Ok(v)),
      Ok(None) => None,
      Err(e) => Some(Err(e)),
    }
  }
}
