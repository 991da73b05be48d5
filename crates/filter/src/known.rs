use swarm_types::{Known, Ratio};

use crate::CmpOp;

/// `item <op> user`, where an item without a known value never matches.
pub fn cmp_known<T, U>(item: &T, op: CmpOp, user: &U) -> bool
where
    T: Known + PartialOrd<U>,
{
    item.is_known() && op.apply(item, user)
}

/// Compares a torrent's ratio against a number. Torrents with nothing
/// downloaded (`n/a`) or no ratio yet (`?`) never match.
pub fn cmp_ratio(item: Ratio, op: CmpOp, user: f64) -> bool {
    self::cmp_known(&item, op, &user)
}
