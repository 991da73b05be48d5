use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

/// Comparison operators a filter can apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}
impl CmpOp {
    pub const ALL: [CmpOp; 6] = [Self::Eq, Self::Ne, Self::Lt, Self::Le, Self::Gt, Self::Ge];

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// `left <op> right`. Incomparable values only satisfy `!=`.
    pub fn apply<T, U>(&self, left: &T, right: &U) -> bool
    where
        T: PartialOrd<U> + ?Sized,
        U: ?Sized,
    {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}
impl FromStr for CmpOp {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match Self::ALL.into_iter().find(|op| op.symbol() == s) {
            Some(op) => Ok(op),
            None if s == "==" => Ok(Self::Eq),
            None => exn::bail!(ErrorKind::InvalidOperator(s.to_string())),
        }
    }
}
impl Display for CmpOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("=", CmpOp::Eq)]
    #[case("==", CmpOp::Eq)]
    #[case("!=", CmpOp::Ne)]
    #[case(" <", CmpOp::Lt)]
    #[case("<=", CmpOp::Le)]
    #[case(">", CmpOp::Gt)]
    #[case(">= ", CmpOp::Ge)]
    fn test_parse(#[case] input: &str, #[case] expected: CmpOp) {
        assert_eq!(input.parse::<CmpOp>().unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid() {
        let err = "~".parse::<CmpOp>().unwrap_err();
        assert_eq!(&*err, &ErrorKind::InvalidOperator("~".to_string()));
    }

    #[rstest]
    #[case(CmpOp::Eq, false)]
    #[case(CmpOp::Ne, true)]
    #[case(CmpOp::Lt, true)]
    #[case(CmpOp::Le, true)]
    #[case(CmpOp::Gt, false)]
    #[case(CmpOp::Ge, false)]
    fn test_apply(#[case] op: CmpOp, #[case] expected: bool) {
        assert_eq!(op.apply(&1, &2), expected);
    }

    #[test]
    fn test_apply_incomparable() {
        for op in CmpOp::ALL {
            assert_eq!(op.apply(&f64::NAN, &1.0), op == CmpOp::Ne, "{op}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(CmpOp::Le.to_string(), "<=");
    }
}
