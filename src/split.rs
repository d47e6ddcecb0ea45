//! Split normalization: turns an expense total and a [`SplitSpec`] into exact
//! signed deltas.
//!
//! The payer is credited the full total and every participant is debited its
//! share, so the deltas of one expense always sum to zero. Fractional minor
//! units left over by integer division are handed out one unit at a time to
//! participants in ascending user id order.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::model::{ExpenseId, ExpenseSplit, SplitSpec, UserId};
use crate::{Money, Percent};

/// Allowed deviation of a percentage split from 100%, in basis points (0.01%).
const PERCENT_TOLERANCE: i64 = 1;

/// Normalize a split request into ledger deltas.
///
/// Returns the payer's credit first, followed by one debit per participant in
/// ascending user id order. The payer may also be a participant.
pub fn normalize_expense_split(
    expense: ExpenseId,
    payer: UserId,
    total: Money,
    spec: &SplitSpec,
) -> Result<Vec<ExpenseSplit>, ValidationError> {
    if !total.is_positive() {
        return Err(ValidationError::NonPositiveTotal(total));
    }

    let participants = spec.participants();
    if participants.is_empty() {
        return Err(ValidationError::NoParticipants(spec.kind()));
    }
    ensure_unique(&participants)?;

    let shares = match spec {
        SplitSpec::Equal(users) => {
            let weights = users.iter().map(|u| (*u, 1)).collect();
            allocate(total, weights)
        }
        SplitSpec::Percentage(entries) => {
            let mut sum = 0i64;
            for (user, percent) in entries {
                if percent.basis_points() < 0 {
                    return Err(ValidationError::NegativePercent(*user, *percent));
                }
                sum = sum
                    .checked_add(percent.basis_points())
                    .ok_or(ValidationError::Overflow(expense))?;
            }
            if (sum - Percent::HUNDRED.basis_points()).abs() > PERCENT_TOLERANCE {
                return Err(ValidationError::PercentSum(Percent::from_basis_points(sum)));
            }
            let weights = entries
                .iter()
                .map(|(u, p)| (*u, p.basis_points()))
                .collect();
            allocate(total, weights)
        }
        SplitSpec::Shares(entries) => {
            if let Some((user, _)) = entries.iter().find(|(_, s)| *s == 0) {
                return Err(ValidationError::ZeroShares(*user));
            }
            let weights = entries.iter().map(|(u, s)| (*u, i64::from(*s))).collect();
            allocate(total, weights)
        }
        SplitSpec::Exact(entries) => {
            if let Some((user, amount)) = entries.iter().find(|(_, a)| a.is_negative()) {
                return Err(ValidationError::NegativeAmount(*user, *amount));
            }
            let sum = Money::checked_sum(entries.iter().map(|(_, a)| *a))
                .ok_or(ValidationError::Overflow(expense))?;
            if sum != total {
                return Err(ValidationError::ExactSum(total, sum));
            }
            let mut shares = entries.clone();
            shares.sort_by_key(|(user, _)| *user);
            shares
        }
    };

    let mut deltas = Vec::with_capacity(shares.len() + 1);
    deltas.push(ExpenseSplit::new(expense, payer, total));
    deltas.extend(
        shares
            .into_iter()
            .map(|(user, share)| ExpenseSplit::new(expense, user, -share)),
    );

    debug_assert_eq!(
        Money::checked_sum(deltas.iter().map(|d| d.signed_amount)),
        Some(Money::ZERO)
    );
    Ok(deltas)
}

fn ensure_unique(participants: &[UserId]) -> Result<(), ValidationError> {
    let mut seen = HashSet::with_capacity(participants.len());
    for user in participants {
        if !seen.insert(*user) {
            return Err(ValidationError::DuplicateParticipant(*user));
        }
    }
    Ok(())
}

/// Divide `total` proportionally to `weights`, flooring each share and giving
/// the remainder one minor unit at a time in ascending user id order.
///
/// Weights are non-negative and sum to a positive value.
fn allocate(total: Money, mut weights: Vec<(UserId, i64)>) -> Vec<(UserId, Money)> {
    weights.sort_by_key(|(user, _)| *user);

    let total = i128::from(total.minor());
    let weight_sum: i128 = weights.iter().map(|(_, w)| i128::from(*w)).sum();

    let mut shares: Vec<(UserId, i64)> = weights
        .iter()
        .map(|(user, w)| (*user, (total * i128::from(*w) / weight_sum) as i64))
        .collect();

    // Each floor drops less than one unit, so the remainder is below the
    // participant count and a single pass hands it all out.
    let floored: i128 = shares.iter().map(|(_, s)| i128::from(*s)).sum();
    let remainder = (total - floored) as usize;
    for (_, share) in shares.iter_mut().take(remainder) {
        *share += 1;
    }

    shares
        .into_iter()
        .map(|(user, share)| (user, Money::from_minor(share)))
        .collect()
}
