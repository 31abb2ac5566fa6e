//! Recursive descent parser for the C subset used in `Plural-Forms` headers,
//! following the grammar of `plural.y` in
//! <https://github.com/autotools-mirror/gettext/tree/6c9cff1221f2cbf585fbee6f86ff047c8ede5286/gettext-runtime/intl>.
//!
//! ```text
//! ternary    := condition ['?' ternary ':' ternary]
//! condition  := comparison (('&&' | '||') comparison)*
//! comparison := summand (('==' | '!=' | '<=' | '>=' | '<' | '>') summand)*
//! summand    := factor (('+' | '-') factor)*
//! factor     := atom (('*' | '/' | '%') atom)*
//! atom       := '(' ternary ')' | 'n' | integer
//! ```

use super::ast::{BinaryOp, Expr, InvalidMarker};
use crate::utils::parsing::{CharPos, ParsingError};

pub const MAX_DEPTH: usize = 64;
pub const MAX_NODES: usize = 1024;

/// Parses a whole expression. The expression may be followed by whitespace
/// and then a `;` or a line break, anything after that is ignored.
pub fn parse(src: &[u8]) -> Result<Expr, ParsingError> {
  let mut parser = Parser::new(src);
  let expr = parser.parse_ternary();

  if let Some(marker) = expr.find_invalid() {
    return Err(ParsingError::new(CharPos::in_single_line(marker.pos), marker.reason));
  }

  parser.skip_whitespace();
  match parser.peek() {
    None | Some(b';') | Some(b'\r') | Some(b'\n') => Ok(expr),
    Some(_) => Err(ParsingError::new(
      CharPos::in_single_line(parser.pos),
      "unexpected character after the expression",
    )),
  }
}

#[derive(Debug)]
struct Parser<'src> {
  src: &'src [u8],
  pos: usize,
  depth: usize,
  node_count: usize,
}

impl<'src> Parser<'src> {
  fn new(src: &'src [u8]) -> Self { Self { src, pos: 0, depth: 0, node_count: 0 } }

  #[inline(always)]
  fn peek(&self) -> Option<u8> { self.src.get(self.pos).copied() }
  #[inline(always)]
  fn peek_at(&self, offset: usize) -> Option<u8> { self.src.get(self.pos + offset).copied() }

  fn skip_whitespace(&mut self) {
    while let Some(b' ') | Some(b'\t') = self.peek() {
      self.pos += 1;
    }
  }

  fn invalid(&self, reason: &'static str) -> Expr {
    Expr::Invalid(InvalidMarker { pos: self.pos, reason })
  }

  /// Accounts for a new node, or returns a marker in its place once the tree
  /// has grown too big.
  fn node(&mut self, expr: Expr) -> Expr {
    self.node_count += 1;
    if self.node_count > MAX_NODES {
      return self.invalid("expression is too long");
    }
    expr
  }

  fn parse_ternary(&mut self) -> Expr {
    if self.depth >= MAX_DEPTH {
      return self.invalid("expression is nested too deeply");
    }
    self.depth += 1;
    let expr = self.parse_ternary_inner();
    self.depth -= 1;
    expr
  }

  fn parse_ternary_inner(&mut self) -> Expr {
    let condition = self.parse_condition();
    self.skip_whitespace();
    if self.peek() != Some(b'?') {
      return condition;
    }
    self.pos += 1;

    let if_true = self.parse_ternary();
    self.skip_whitespace();
    if self.peek() != Some(b':') {
      let marker = self.invalid("expected ':' of a conditional expression");
      return self.node(Expr::ternary(condition, if_true, marker));
    }
    self.pos += 1;

    let if_false = self.parse_ternary();
    self.node(Expr::ternary(condition, if_true, if_false))
  }

  /// Parses a chain of left-associative operators of the same precedence.
  fn parse_binary_chain(
    &mut self,
    parse_operand: fn(&mut Self) -> Expr,
    match_operator: fn(&Self) -> Option<(BinaryOp, usize)>,
  ) -> Expr {
    let mut lhs = parse_operand(self);
    loop {
      if let Expr::Invalid(_) = lhs {
        return lhs;
      }
      self.skip_whitespace();
      let (op, op_len) = match match_operator(self) {
        Some(op) => op,
        None => return lhs,
      };
      self.pos += op_len;
      let rhs = parse_operand(self);
      lhs = self.node(Expr::binary(op, lhs, rhs));
    }
  }

  fn parse_condition(&mut self) -> Expr {
    self.parse_binary_chain(Self::parse_comparison, |p| match (p.peek(), p.peek_at(1)) {
      (Some(b'&'), Some(b'&')) => Some((BinaryOp::And, 2)),
      (Some(b'|'), Some(b'|')) => Some((BinaryOp::Or, 2)),
      _ => None,
    })
  }

  fn parse_comparison(&mut self) -> Expr {
    self.parse_binary_chain(Self::parse_summand, |p| match (p.peek(), p.peek_at(1)) {
      (Some(b'='), Some(b'=')) => Some((BinaryOp::Eq, 2)),
      (Some(b'!'), Some(b'=')) => Some((BinaryOp::Ne, 2)),
      (Some(b'<'), Some(b'=')) => Some((BinaryOp::Le, 2)),
      (Some(b'>'), Some(b'=')) => Some((BinaryOp::Ge, 2)),
      (Some(b'<'), _) => Some((BinaryOp::Lt, 1)),
      (Some(b'>'), _) => Some((BinaryOp::Gt, 1)),
      _ => None,
    })
  }

  fn parse_summand(&mut self) -> Expr {
    self.parse_binary_chain(Self::parse_factor, |p| match p.peek() {
      Some(b'+') => Some((BinaryOp::Add, 1)),
      Some(b'-') => Some((BinaryOp::Sub, 1)),
      _ => None,
    })
  }

  fn parse_factor(&mut self) -> Expr {
    self.parse_binary_chain(Self::parse_atom, |p| match p.peek() {
      Some(b'*') => Some((BinaryOp::Mul, 1)),
      Some(b'/') => Some((BinaryOp::Div, 1)),
      Some(b'%') => Some((BinaryOp::Rem, 1)),
      _ => None,
    })
  }

  fn parse_atom(&mut self) -> Expr {
    self.skip_whitespace();
    match self.peek() {
      Some(b'(') => {
        self.pos += 1;
        let inner = self.parse_ternary();
        if let Expr::Invalid(_) = inner {
          return inner;
        }
        self.skip_whitespace();
        if self.peek() != Some(b')') {
          return self.invalid("expected ')'");
        }
        self.pos += 1;
        inner
      }
      Some(b'n') => {
        self.pos += 1;
        self.node(Expr::Variable)
      }
      Some(b'0'..=b'9') => self.parse_integer(false),
      Some(b'-') if self.peek_at(1).map_or(false, |c| c.is_ascii_digit()) => {
        self.pos += 1;
        self.parse_integer(true)
      }
      None => self.invalid("expected an operand, found the end of the expression"),
      Some(_) => self.invalid("expected an operand"),
    }
  }

  /// Literals that don't fit into an `i32` saturate.
  fn parse_integer(&mut self, negative: bool) -> Expr {
    let mut value: i32 = 0;
    while let Some(digit @ b'0'..=b'9') = self.peek() {
      let digit = (digit - b'0') as i32;
      value = value.saturating_mul(10);
      value = if negative { value.saturating_sub(digit) } else { value.saturating_add(digit) };
      self.pos += 1;
    }
    self.node(Expr::Literal(value))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn parse_str(src: &str) -> Expr { parse(src.as_bytes()).unwrap() }

  fn error_at(src: &str) -> usize { parse(src.as_bytes()).unwrap_err().pos.byte_index }

  #[test]
  fn test_precedence() {
    assert_eq!(parse_str("1 + 2 * 3").to_string(), "(1 + (2 * 3))");
    assert_eq!(
      parse_str("n%10==1 && n%100!=11").to_string(),
      "(((n % 10) == 1) && ((n % 100) != 11))",
    );
    assert_eq!(parse_str("n - 1 - 2").to_string(), "((n - 1) - 2)");
    assert_eq!(parse_str("n<=1||n>=5&&n<7").to_string(), "(((n <= 1) || (n >= 5)) && (n < 7))");
    assert_eq!(parse_str("n ? 1 : n > 5 ? 2 : 3").to_string(), "(n ? 1 : ((n > 5) ? 2 : 3))");
  }

  #[test]
  fn test_typical_rules() {
    let expr = parse_str("(n%10==1 && n%100!=11) ? 0 : 2");
    assert_eq!(expr.evaluate(21), 0);
    assert_eq!(expr.evaluate(1), 0);
    assert_eq!(expr.evaluate(11), 2);
    assert_eq!(expr.evaluate(5), 2);

    let polish = parse_str(
      "(n==1 ? 0 : n%10>=2 && n%10<=4 && (n%100<10 || n%100>=20) ? 1 : 2)",
    );
    let indices: Vec<i32> =
      [1, 2, 5, 12, 22, 25, 112].iter().map(|&n| polish.evaluate(n)).collect();
    assert_eq!(indices, vec![0, 1, 2, 2, 1, 2, 2]);
  }

  #[test]
  fn test_literals() {
    assert_eq!(parse_str("-1").evaluate(0), -1);
    assert_eq!(parse_str("n-1").evaluate(5), 4);
    assert_eq!(parse_str("99999999999").evaluate(0), i32::MAX);
    assert_eq!(parse_str("-99999999999").evaluate(0), i32::MIN);
    assert_eq!(parse_str("007").evaluate(0), 7);
  }

  #[test]
  fn test_terminators() {
    assert!(parse(b"n != 1;").is_ok());
    assert!(parse(b"n != 1 \r\n").is_ok());
    assert!(parse(b"\tn != 1\t;garbage").is_ok());
    assert_eq!(error_at("n != 1 x"), 7);
  }

  #[test]
  fn test_errors() {
    assert_eq!(error_at("n % "), 4);
    assert_eq!(error_at(""), 0);
    assert_eq!(error_at("(n"), 2);
    assert_eq!(error_at("n ? 1"), 5);
    assert_eq!(error_at("n == x"), 5);
    assert_eq!(error_at("n !! 1"), 2);
    assert_eq!(error_at("- 1"), 0);
    // Errors inside the expression win over trailing garbage after it.
    assert_eq!(error_at("n % ) x"), 4);
  }

  #[test]
  fn test_error_message() {
    let error = parse(b"(n").unwrap_err();
    assert_eq!(error.message, "expected ')'");
    assert_eq!(error.pos.column, 3);
  }

  #[test]
  fn test_depth_limit() {
    let nested = |depth: usize| format!("{}n{}", "(".repeat(depth), ")".repeat(depth));
    assert!(parse(nested(MAX_DEPTH - 1).as_bytes()).is_ok());
    let error = parse(nested(MAX_DEPTH + 10).as_bytes()).unwrap_err();
    assert_eq!(error.message, "expression is nested too deeply");
  }

  #[test]
  fn test_node_limit() {
    let long = vec!["1"; MAX_NODES].join("+");
    let error = parse(long.as_bytes()).unwrap_err();
    assert_eq!(error.message, "expression is too long");
    let short = vec!["1"; MAX_NODES / 4].join("+");
    assert_eq!(parse(short.as_bytes()).unwrap().evaluate(0), (MAX_NODES / 4) as i32);
  }
}
