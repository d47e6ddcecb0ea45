//! Balance aggregation: folds a group's split history into net balances.

use std::collections::BTreeMap;

use tracing::error;

use crate::Money;
use crate::error::IntegrityError;
use crate::model::{ExpenseSplit, GroupId, NetBalance, UserId};

/// Fold the full ordered split history of `group` into one [`NetBalance`] per
/// user who ever appeared in it, sorted by user id.
///
/// Users whose balance returned to zero are kept. A history whose balances do
/// not sum to zero is corrupt and is reported as an [`IntegrityError`].
pub fn aggregate_balances<'a>(
    group: GroupId,
    history: impl IntoIterator<Item = &'a ExpenseSplit>,
) -> Result<Vec<NetBalance>, IntegrityError> {
    let overflow = || {
        error!(group = %group, "group balances exceed the representable range");
        IntegrityError::Overflow(group)
    };

    let mut balances: BTreeMap<UserId, Money> = BTreeMap::new();
    for delta in history {
        let balance = balances.entry(delta.user_id).or_default();
        *balance = balance.checked_add(delta.signed_amount).ok_or_else(overflow)?;
    }

    let sum = Money::checked_sum(balances.values().copied()).ok_or_else(overflow)?;
    if !sum.is_zero() {
        error!(group = %group, sum = %sum, "group balances do not sum to zero");
        return Err(IntegrityError::UnbalancedGroup(group, sum));
    }

    Ok(balances
        .into_iter()
        .map(|(user_id, amount)| NetBalance {
            user_id,
            group_id: group,
            amount,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(expense: u64, user: UserId, amount: i64) -> ExpenseSplit {
        ExpenseSplit::new(expense, user, Money::from_minor(amount))
    }

    fn amounts(balances: &[NetBalance]) -> Vec<(UserId, i64)> {
        balances
            .iter()
            .map(|b| (b.user_id, b.amount.minor()))
            .collect()
    }

    #[test]
    fn empty_history_has_no_balances() {
        let balances = aggregate_balances(1, std::iter::empty()).unwrap();
        assert!(balances.is_empty());
    }

    #[test]
    fn folds_multiple_expenses() {
        let history = [
            split(1, 1, 300),
            split(1, 1, -100),
            split(1, 2, -100),
            split(1, 3, -100),
            split(2, 2, 60),
            split(2, 1, -30),
            split(2, 3, -30),
        ];
        let balances = aggregate_balances(9, &history).unwrap();

        assert_eq!(amounts(&balances), vec![(1, 170), (2, -40), (3, -130)]);
        assert!(balances.iter().all(|b| b.group_id == 9));
    }

    #[test]
    fn reversal_keeps_user_with_zero_balance() {
        let original = [split(1, 1, 100), split(1, 2, -100)];
        let history: Vec<_> = original
            .iter()
            .copied()
            .chain(original.iter().map(ExpenseSplit::reversed))
            .collect();

        let balances = aggregate_balances(1, &history).unwrap();
        assert_eq!(amounts(&balances), vec![(1, 0), (2, 0)]);
    }

    #[test]
    fn unbalanced_history_is_integrity_error() {
        let history = [split(1, 1, 100), split(1, 2, -90)];
        let result = aggregate_balances(4, &history);
        assert_eq!(
            result,
            Err(IntegrityError::UnbalancedGroup(4, Money::from_minor(10)))
        );
    }

    #[test]
    fn balance_out_of_range_is_integrity_error() {
        let large = i64::MAX - 1;
        let history = [
            split(1, 1, large),
            split(1, 2, -large),
            split(2, 1, large),
            split(2, 2, -large),
        ];
        assert_eq!(aggregate_balances(3, &history), Err(IntegrityError::Overflow(3)));
    }

    #[test]
    fn aggregation_is_idempotent() {
        let history = [split(1, 5, 10), split(1, 2, -7), split(1, 9, -3)];
        let first = aggregate_balances(1, &history).unwrap();
        let second = aggregate_balances(1, &history).unwrap();
        assert_eq!(first, second);
    }
}
