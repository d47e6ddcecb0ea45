//! Debt simplification: reduces net balances to a short list of transfers.
//!
//! The largest remaining creditor is repeatedly matched with the largest
//! remaining debtor, and the smaller of the two amounts changes hands. Each
//! step zeroes at least one party, so at most `n - 1` transfers are produced
//! for `n` non-zero balances. Finding the true minimum number of transfers is
//! NP-hard in general; this greedy matching is an approximation of it, not a
//! guarantee.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashSet};

use tracing::error;

use crate::Money;
use crate::error::IntegrityError;
use crate::model::{NetBalance, SettlementTransfer, UserId};

/// Heap entry: larger amounts first, ties broken by ascending user id.
type Party = (Money, Reverse<UserId>);

/// Compute transfers that bring every balance of one group to zero.
///
/// Zero balances are ignored. Balances that do not sum to zero, that come
/// from more than one group, or that list a user twice are reported as an
/// [`IntegrityError`].
pub fn simplify_debts(balances: &[NetBalance]) -> Result<Vec<SettlementTransfer>, IntegrityError> {
    let Some(first) = balances.first() else {
        return Ok(Vec::new());
    };
    let group = first.group_id;

    if let Some(other) = balances.iter().find(|b| b.group_id != group) {
        error!(
            first = %group,
            second = %other.group_id,
            "balances from multiple groups passed to simplifier"
        );
        return Err(IntegrityError::MixedGroups(group, other.group_id));
    }

    let mut seen = HashSet::with_capacity(balances.len());
    if let Some(duplicate) = balances.iter().find(|b| !seen.insert(b.user_id)) {
        error!(group = %group, user = %duplicate.user_id, "user listed twice in balances");
        return Err(IntegrityError::DuplicateUser(duplicate.user_id));
    }

    let overflow = || {
        error!(group = %group, "balances exceed the representable range");
        IntegrityError::Overflow(group)
    };

    let sum = Money::checked_sum(balances.iter().map(|b| b.amount)).ok_or_else(overflow)?;
    if !sum.is_zero() {
        error!(sum = %sum, "balances do not sum to zero");
        return Err(IntegrityError::UnbalancedBalances(sum));
    }

    let mut creditors: BinaryHeap<Party> = BinaryHeap::new();
    let mut debtors: BinaryHeap<Party> = BinaryHeap::new();
    for balance in balances {
        if balance.amount.is_positive() {
            creditors.push((balance.amount, Reverse(balance.user_id)));
        } else if balance.amount.is_negative() {
            let debt = balance.amount.checked_abs().ok_or_else(overflow)?;
            debtors.push((debt, Reverse(balance.user_id)));
        }
    }

    let mut transfers = Vec::with_capacity(creditors.len().max(debtors.len()));
    // Both heaps drain together because credits and debts are equal in total.
    while let (Some((credit, Reverse(creditor))), Some((debt, Reverse(debtor)))) =
        (creditors.peek().copied(), debtors.peek().copied())
    {
        creditors.pop();
        debtors.pop();

        let amount = credit.min(debt);
        transfers.push(SettlementTransfer {
            from_user_id: debtor,
            to_user_id: creditor,
            amount,
        });

        if credit > amount {
            creditors.push((credit - amount, Reverse(creditor)));
        }
        if debt > amount {
            debtors.push((debt - amount, Reverse(debtor)));
        }
    }
    debug_assert!(creditors.is_empty() && debtors.is_empty());

    Ok(transfers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balance(user: UserId, amount: i64) -> NetBalance {
        NetBalance {
            user_id: user,
            group_id: 1,
            amount: Money::from_minor(amount),
        }
    }

    fn triples(transfers: &[SettlementTransfer]) -> Vec<(UserId, UserId, i64)> {
        transfers
            .iter()
            .map(|t| (t.from_user_id, t.to_user_id, t.amount.minor()))
            .collect()
    }

    #[test]
    fn empty_balances_need_no_transfers() {
        assert!(simplify_debts(&[]).unwrap().is_empty());
    }

    #[test]
    fn zero_balances_need_no_transfers() {
        let balances = [balance(1, 0), balance(2, 0)];
        assert!(simplify_debts(&balances).unwrap().is_empty());
    }

    #[test]
    fn one_creditor_two_debtors() {
        let balances = [balance(1, 50), balance(2, -30), balance(3, -20)];
        let transfers = simplify_debts(&balances).unwrap();
        assert_eq!(triples(&transfers), vec![(2, 1, 30), (3, 1, 20)]);
    }

    #[test]
    fn single_nonzero_balance_is_integrity_error() {
        let result = simplify_debts(&[balance(1, 10)]);
        assert_eq!(
            result,
            Err(IntegrityError::UnbalancedBalances(Money::from_minor(10)))
        );
    }

    #[test]
    fn mixed_groups_is_integrity_error() {
        let mut other = balance(2, -10);
        other.group_id = 2;
        let result = simplify_debts(&[balance(1, 10), other]);
        assert_eq!(result, Err(IntegrityError::MixedGroups(1, 2)));
    }

    #[test]
    fn duplicate_user_is_integrity_error() {
        let result = simplify_debts(&[balance(1, 10), balance(1, -10)]);
        assert_eq!(result, Err(IntegrityError::DuplicateUser(1)));
    }

    #[test]
    fn out_of_range_balances_are_integrity_error() {
        let result = simplify_debts(&[balance(1, i64::MAX), balance(2, i64::MAX), balance(3, 2)]);
        assert_eq!(result, Err(IntegrityError::Overflow(1)));

        // Sums to zero, but a debt of i64::MIN has no positive amount to transfer.
        let result = simplify_debts(&[balance(1, i64::MIN), balance(2, i64::MAX), balance(3, 1)]);
        assert_eq!(result, Err(IntegrityError::Overflow(1)));
    }

    #[test]
    fn largest_parties_are_matched_first() {
        let balances = [
            balance(1, 10),
            balance(2, 70),
            balance(3, -40),
            balance(4, -40),
        ];
        let transfers = simplify_debts(&balances).unwrap();
        // 2 (+70) meets 3 (-40, lower id wins the tie), then 4 pays 2 and 1.
        assert_eq!(
            triples(&transfers),
            vec![(3, 2, 40), (4, 2, 30), (4, 1, 10)]
        );
    }

    #[test]
    fn ties_break_by_ascending_user_id() {
        let balances = [balance(4, 5), balance(2, 5), balance(3, -5), balance(1, -5)];
        let transfers = simplify_debts(&balances).unwrap();
        assert_eq!(triples(&transfers), vec![(1, 2, 5), (3, 4, 5)]);
    }

    #[test]
    fn transfers_zero_out_every_balance() {
        let balances = [
            balance(1, 1234),
            balance(2, -999),
            balance(3, 17),
            balance(4, -300),
            balance(5, 48),
        ];
        let transfers = simplify_debts(&balances).unwrap();

        for b in &balances {
            let paid: Money = transfers
                .iter()
                .filter(|t| t.from_user_id == b.user_id)
                .map(|t| t.amount)
                .sum();
            let received: Money = transfers
                .iter()
                .filter(|t| t.to_user_id == b.user_id)
                .map(|t| t.amount)
                .sum();
            assert_eq!(received - paid, b.amount);
        }
        assert!(transfers.iter().all(|t| t.amount.is_positive()));
        assert!(transfers.len() < balances.len());
    }
}
