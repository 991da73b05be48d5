//! Comparing bandwidth limits.

use std::str::FromStr;

use swarm_types::{Bandwidth, Limit};
use tracing::instrument;

use crate::CmpOp;
use crate::error::{Error, ErrorKind};

/// What a user compares a limit against: a rate, or just whether there is
/// a limit at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UserLimit {
    /// Bytes per second; infinity for "no limit".
    Rate(f64),
    /// `true` for "limited", `false` for "unlimited".
    Limited(bool),
}
impl FromStr for UserLimit {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "limited" | "on" | "yes" | "true" => Ok(Self::Limited(true)),
            "unlimited" | "off" | "no" | "false" | "none" => Ok(Self::Limited(false)),
            _ => match s.parse::<Bandwidth>() {
                Ok(bandwidth) => Ok(Self::Rate(bandwidth.bytes_per_second() as f64)),
                Err(_) => exn::bail!(ErrorKind::InvalidValue { kind: "bandwidth limit", value: s.to_string() }),
            },
        }
    }
}

/// Compares a torrent's limit against a user's.
///
/// Rates compare numerically, with [`Limit::Unlimited`] as infinity.
/// "Unlimited" means comparing against [`Limit::Unlimited`]. "Limited" is
/// only an equality: `=` matches limited torrents and `!=` unlimited ones;
/// "more than limited" (`>`, `>=`) is unlimited, while "less than limited"
/// matches nothing and `<=` reduces to `=`.
#[instrument(level = "trace", ret)]
pub fn limit_rate_filter(limit: Limit, op: CmpOp, user: UserLimit) -> bool {
    match user {
        UserLimit::Rate(rate) => op.apply(&limit, &rate),
        UserLimit::Limited(false) => op.apply(&limit, &Limit::Unlimited),
        UserLimit::Limited(true) => match op {
            CmpOp::Gt | CmpOp::Ge => limit.is_unlimited(),
            CmpOp::Eq | CmpOp::Ne => !op.apply(&limit, &Limit::Unlimited),
            CmpOp::Lt => false,
            CmpOp::Le => !limit.is_unlimited(),
        },
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn limited(bytes_per_second: u64) -> Limit {
        Limit::Limited(Bandwidth(bytes_per_second))
    }

    #[rstest]
    #[case(Limit::Unlimited, CmpOp::Eq, UserLimit::Limited(false), true)]
    #[case(limited(500), CmpOp::Eq, UserLimit::Limited(false), false)]
    #[case(limited(500), CmpOp::Ne, UserLimit::Limited(false), true)]
    #[case(limited(500), CmpOp::Lt, UserLimit::Limited(false), true)]
    #[case(limited(500), CmpOp::Gt, UserLimit::Limited(true), false)]
    #[case(Limit::Unlimited, CmpOp::Ge, UserLimit::Limited(true), true)]
    #[case(limited(500), CmpOp::Eq, UserLimit::Limited(true), true)]
    #[case(Limit::Unlimited, CmpOp::Eq, UserLimit::Limited(true), false)]
    #[case(Limit::Unlimited, CmpOp::Ne, UserLimit::Limited(true), true)]
    #[case(limited(500), CmpOp::Lt, UserLimit::Limited(true), false)]
    #[case(limited(500), CmpOp::Le, UserLimit::Limited(true), true)]
    #[case(Limit::Unlimited, CmpOp::Le, UserLimit::Limited(true), false)]
    fn test_limited_or_unlimited(#[case] limit: Limit, #[case] op: CmpOp, #[case] user: UserLimit, #[case] expected: bool) {
        assert_eq!(limit_rate_filter(limit, op, user), expected);
    }

    #[rstest]
    #[case(limited(500), CmpOp::Lt, 1000.0, true)]
    #[case(limited(500), CmpOp::Eq, 500.0, true)]
    #[case(Limit::Unlimited, CmpOp::Gt, 1e12, true)]
    #[case(Limit::Unlimited, CmpOp::Eq, f64::INFINITY, true)]
    fn test_rates(#[case] limit: Limit, #[case] op: CmpOp, #[case] rate: f64, #[case] expected: bool) {
        assert_eq!(limit_rate_filter(limit, op, UserLimit::Rate(rate)), expected);
    }

    #[test]
    fn test_parse_user_limit() {
        assert_eq!("limited".parse::<UserLimit>().unwrap(), UserLimit::Limited(true));
        assert_eq!("Unlimited".parse::<UserLimit>().unwrap(), UserLimit::Limited(false));
        assert_eq!("2k".parse::<UserLimit>().unwrap(), UserLimit::Rate(2000.0));
        assert!("fast".parse::<UserLimit>().is_err());
    }
}
