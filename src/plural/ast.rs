use std::fmt;

// Lets tests observe which subexpressions were actually evaluated.
#[cfg(test)]
thread_local! {
  static EVALUATED_NODES: std::cell::Cell<usize> = std::cell::Cell::new(0);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  And,
  Or,
}

impl BinaryOp {
  pub fn symbol(self) -> &'static str {
    match self {
      Self::Add => "+",
      Self::Sub => "-",
      Self::Mul => "*",
      Self::Div => "/",
      Self::Rem => "%",
      Self::Eq => "==",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
      Self::And => "&&",
      Self::Or => "||",
    }
  }

  /// Applies an operator whose both operands have already been evaluated.
  /// Arithmetic wraps around, and division or remainder by zero gives zero.
  pub fn apply(self, lhs: i32, rhs: i32) -> i32 {
    match self {
      Self::Add => lhs.wrapping_add(rhs),
      Self::Sub => lhs.wrapping_sub(rhs),
      Self::Mul => lhs.wrapping_mul(rhs),
      Self::Div if rhs == 0 => 0,
      Self::Div => lhs.wrapping_div(rhs),
      Self::Rem if rhs == 0 => 0,
      Self::Rem => lhs.wrapping_rem(rhs),
      Self::Eq => (lhs == rhs) as i32,
      Self::Ne => (lhs != rhs) as i32,
      Self::Lt => (lhs < rhs) as i32,
      Self::Le => (lhs <= rhs) as i32,
      Self::Gt => (lhs > rhs) as i32,
      Self::Ge => (lhs >= rhs) as i32,
      Self::And => (lhs != 0 && rhs != 0) as i32,
      Self::Or => (lhs != 0 || rhs != 0) as i32,
    }
  }
}

/// Left behind by the parser in place of a subexpression it couldn't make
/// sense of, so that parsing itself never has to bail out halfway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvalidMarker {
  /// Byte offset into the expression text.
  pub pos: usize,
  pub reason: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
  Literal(i32),
  Variable,
  Binary { op: BinaryOp, lhs: Box<Expr>, rhs: Box<Expr> },
  Ternary { condition: Box<Expr>, if_true: Box<Expr>, if_false: Box<Expr> },
  Invalid(InvalidMarker),
}

impl Expr {
  pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
    Self::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }
  }

  pub fn ternary(condition: Expr, if_true: Expr, if_false: Expr) -> Self {
    Self::Ternary {
      condition: Box::new(condition),
      if_true: Box::new(if_true),
      if_false: Box::new(if_false),
    }
  }

  pub fn evaluate(&self, n: i32) -> i32 {
    #[cfg(test)]
    EVALUATED_NODES.with(|count| count.set(count.get() + 1));
    match self {
      Self::Literal(value) => *value,
      Self::Variable => n,
      Self::Binary { op: BinaryOp::And, lhs, rhs } => {
        (lhs.evaluate(n) != 0 && rhs.evaluate(n) != 0) as i32
      }
      Self::Binary { op: BinaryOp::Or, lhs, rhs } => {
        (lhs.evaluate(n) != 0 || rhs.evaluate(n) != 0) as i32
      }
      Self::Binary { op, lhs, rhs } => op.apply(lhs.evaluate(n), rhs.evaluate(n)),
      Self::Ternary { condition, if_true, if_false } => {
        if condition.evaluate(n) != 0 {
          if_true.evaluate(n)
        } else {
          if_false.evaluate(n)
        }
      }
      Self::Invalid(_) => 0,
    }
  }

  /// Returns the leftmost invalid marker in the tree. Walks the tree with an
  /// explicit stack instead of recursion.
  pub fn find_invalid(&self) -> Option<&InvalidMarker> {
    let mut stack: Vec<&Expr> = vec![self];
    while let Some(expr) = stack.pop() {
      match expr {
        Self::Literal(_) | Self::Variable => {}
        Self::Binary { lhs, rhs, .. } => {
          stack.push(rhs);
          stack.push(lhs);
        }
        Self::Ternary { condition, if_true, if_false } => {
          stack.push(if_false);
          stack.push(if_true);
          stack.push(condition);
        }
        Self::Invalid(marker) => return Some(marker),
      }
    }
    None
  }
}

/// Prints the expression back with every compound subexpression wrapped in
/// parentheses, which makes the precedence the parser picked explicit.
impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Literal(value) => write!(f, "{}", value),
      Self::Variable => write!(f, "n"),
      Self::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
      Self::Ternary { condition, if_true, if_false } => {
        write!(f, "({} ? {} : {})", condition, if_true, if_false)
      }
      Self::Invalid(marker) => write!(f, "<invalid at {}: {}>", marker.pos, marker.reason),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn n() -> Expr { Expr::Variable }
  fn lit(value: i32) -> Expr { Expr::Literal(value) }

  #[test]
  fn test_arithmetic_wraps() {
    assert_eq!(BinaryOp::Add.apply(i32::MAX, 1), i32::MIN);
    assert_eq!(BinaryOp::Mul.apply(i32::MAX, 2), -2);
    assert_eq!(BinaryOp::Div.apply(i32::MIN, -1), i32::MIN);
    assert_eq!(BinaryOp::Rem.apply(i32::MIN, -1), 0);
    assert_eq!(BinaryOp::Rem.apply(-7, 3), -1);
  }

  #[test]
  fn test_division_by_zero_is_zero() {
    assert_eq!(Expr::binary(BinaryOp::Div, n(), lit(0)).evaluate(5), 0);
    assert_eq!(Expr::binary(BinaryOp::Rem, n(), n()).evaluate(0), 0);
  }

  #[test]
  fn test_logical_operators_give_booleans() {
    let expr = Expr::binary(BinaryOp::And, n(), lit(7));
    assert_eq!(expr.evaluate(3), 1);
    assert_eq!(expr.evaluate(0), 0);
    let expr = Expr::binary(BinaryOp::Or, n(), lit(0));
    assert_eq!(expr.evaluate(-4), 1);
    assert_eq!(expr.evaluate(0), 0);
  }

  #[test]
  fn test_ternary_picks_a_branch() {
    let expr = Expr::ternary(Expr::binary(BinaryOp::Gt, n(), lit(1)), lit(10), lit(20));
    assert_eq!(expr.evaluate(2), 10);
    assert_eq!(expr.evaluate(1), 20);

    let expr = Expr::ternary(
      Expr::binary(BinaryOp::Eq, n(), lit(1)),
      lit(0),
      Expr::binary(BinaryOp::Sub, n(), lit(-2)),
    );
    assert_eq!(expr.to_string(), "((n == 1) ? 0 : (n - -2))");
  }

  #[test]
  fn test_find_invalid_returns_the_leftmost_marker() {
    let first = InvalidMarker { pos: 1, reason: "first" };
    let second = InvalidMarker { pos: 5, reason: "second" };
    let expr = Expr::ternary(
      n(),
      Expr::binary(BinaryOp::Add, Expr::Invalid(first), lit(1)),
      Expr::Invalid(second),
    );
    assert_eq!(expr.find_invalid(), Some(&first));
    assert_eq!(Expr::binary(BinaryOp::Ne, n(), lit(1)).find_invalid(), None);
  }

  #[test]
  fn test_untaken_branches_are_not_evaluated() {
    let evaluate_counting = |expr: &Expr, n: i32| {
      EVALUATED_NODES.with(|count| count.set(0));
      let result = expr.evaluate(n);
      (result, EVALUATED_NODES.with(|count| count.get()))
    };

    // n == 0 ? 1 : 100 / n
    let expr = Expr::ternary(
      Expr::binary(BinaryOp::Eq, n(), lit(0)),
      lit(1),
      Expr::binary(BinaryOp::Div, lit(100), n()),
    );
    assert_eq!(evaluate_counting(&expr, 0), (1, 5));
    assert_eq!(evaluate_counting(&expr, 4), (25, 7));

    let expr = Expr::binary(BinaryOp::And, n(), Expr::binary(BinaryOp::Div, lit(100), n()));
    assert_eq!(evaluate_counting(&expr, 0), (0, 2));
    assert_eq!(evaluate_counting(&expr, 5), (1, 5));

    let expr = Expr::binary(BinaryOp::Or, n(), Expr::binary(BinaryOp::Div, lit(100), n()));
    assert_eq!(evaluate_counting(&expr, 3), (1, 2));
    assert_eq!(evaluate_counting(&expr, 0), (0, 5));
  }
}
