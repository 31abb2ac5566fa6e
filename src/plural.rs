//! Plural form selection driven by the `Plural-Forms` header of a catalog.
//! See <https://www.gnu.org/software/gettext/manual/gettext.html#Plural-forms>.

pub mod ast;
pub mod parser;

pub use self::ast::{BinaryOp, Expr};

use crate::catalog::{extract_plural_count, extract_plural_expression};
use crate::impl_prelude::*;
use crate::utils::parsing::ParsingError;
use crate::utils::until_nul;

pub const DEFAULT_PLURAL_COUNT: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralRule {
  expr: Expr,
  count: u32,
}

/// The Germanic rule, `n != 1`, used whenever a catalog doesn't specify one.
impl Default for PluralRule {
  fn default() -> Self {
    Self {
      expr: Expr::binary(BinaryOp::Ne, Expr::Variable, Expr::Literal(1)),
      count: DEFAULT_PLURAL_COUNT,
    }
  }
}

impl PluralRule {
  pub fn new(expr: Expr, count: u32) -> Self { Self { expr, count } }

  pub fn parse(expression: &[u8], count: u32) -> Result<Self, ParsingError> {
    Ok(Self::new(parser::parse(expression)?, count))
  }

  /// Builds the rule from a header entry. Never fails: a missing or broken
  /// `plural=` falls back to the default rule.
  pub fn from_metadata(metadata: &[u8]) -> Self {
    let expression = match extract_plural_expression(metadata) {
      Some(expression) => expression,
      None => return Self::default(),
    };
    let count = extract_plural_count(metadata).unwrap_or(DEFAULT_PLURAL_COUNT);
    match Self::parse(expression, count) {
      Ok(rule) => rule,
      Err(error) => {
        let expression = String::from_utf8_lossy(expression);
        debug!(
          "falling back to the default plural rule:\n{}",
          error.nice_formatter("Plural-Forms", &expression),
        );
        Self::default()
      }
    }
  }

  #[inline(always)]
  pub fn expr(&self) -> &Expr { &self.expr }
  /// Number of forms declared by `nplurals=`. Informational only, indices
  /// returned by the expression aren't clamped to it.
  #[inline(always)]
  pub fn count(&self) -> u32 { self.count }

  #[inline]
  pub fn index(&self, n: i32) -> i32 { self.expr.evaluate(n) }

  pub fn select<'t>(&self, n: i32, forms: &'t [u8]) -> &'t [u8] {
    select_form(forms, self.index(n))
  }
}

/// Returns the form number `index` out of NUL-separated `forms`. Negative
/// indices select the first form, indices past the last form give an empty
/// slice.
pub fn select_form(forms: &[u8], index: i32) -> &[u8] {
  let mut rest = forms;
  for _ in 0..index.max(0) {
    match rest.iter().position(|&b| b == 0) {
      Some(nul_index) => rest = &rest[nul_index + 1..],
      None => return &[],
    }
  }
  until_nul(rest)
}

#[cfg(test)]
mod tests {
  use super::*;

  const ARABIC: &[u8] =
    b"n==0 ? 0 : n==1 ? 1 : n==2 ? 2 : n%100>=3 && n%100<=10 ? 3 : n%100>=11 ? 4 : 5";

  #[test]
  fn test_default_rule() {
    let rule = PluralRule::default();
    assert_eq!(rule.count(), 2);
    for &n in &[-1, 0, 1, 2, 11, 100] {
      assert_eq!(rule.index(n), (n != 1) as i32, "n = {}", n);
    }
  }

  #[test]
  fn test_select_form() {
    let forms = b"zero\0one\0two";
    assert_eq!(select_form(forms, 0), b"zero");
    assert_eq!(select_form(forms, 1), b"one");
    assert_eq!(select_form(forms, 2), b"two");
    assert_eq!(select_form(forms, 3), b"");
    assert_eq!(select_form(forms, i32::MAX), b"");
    assert_eq!(select_form(forms, -5), b"zero");
    assert_eq!(select_form(b"", 0), b"");
    assert_eq!(select_form(b"a\0", 1), b"");
  }

  #[test]
  fn test_every_form_is_reachable() {
    let rule = PluralRule::parse(ARABIC, 6).unwrap();
    let forms = b"f0\0f1\0f2\0f3\0f4\0f5";
    let samples =
      [(0, "f0"), (1, "f1"), (2, "f2"), (5, "f3"), (110, "f3"), (11, "f4"), (99, "f4")];
    for &(n, expected) in &samples {
      assert_eq!(rule.select(n, forms), expected.as_bytes(), "n = {}", n);
    }
    assert_eq!(rule.select(100, forms), b"f5");
  }

  #[test]
  fn test_from_metadata() {
    let rule = PluralRule::from_metadata(
      b"Language: ru\nPlural-Forms: nplurals=3; plural=(n%10==1 && n%100!=11 ? 0 : 2);\n",
    );
    assert_eq!(rule.count(), 3);
    assert_eq!(rule.index(21), 0);
    assert_eq!(rule.index(11), 2);

    let rule = PluralRule::from_metadata(b"Plural-Forms: nplurals=1; plural=0;\n");
    assert_eq!(rule.count(), 1);
    assert_eq!(rule.index(5), 0);
  }

  #[test]
  fn test_from_metadata_falls_back() {
    assert_eq!(PluralRule::from_metadata(b"Language: de\n"), PluralRule::default());
    assert_eq!(
      PluralRule::from_metadata(b"Plural-Forms: nplurals=2; plural=n % ;\n"),
      PluralRule::default(),
    );
    assert_eq!(
      PluralRule::from_metadata(b"Plural-Forms: nplurals=2; plural=(n > 1;\n"),
      PluralRule::default(),
    );
  }
}
