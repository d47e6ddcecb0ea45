//! Error types for the balance ledger.

use thiserror::Error;

use crate::model::{ExpenseId, GroupId, UserId};
use crate::{Money, Percent};

/// Top-level error returned by [`Ledger`](crate::Ledger) operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error("ledger integrity violated: {0}")]
    Integrity(#[from] IntegrityError),

    #[error("{0}")]
    NotFound(#[from] NotFoundError),
}

/// Malformed split specification or write request. Recoverable by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("total: must be positive, got {0}")]
    NonPositiveTotal(Money),
    #[error("participants: {0} split has no participants")]
    NoParticipants(&'static str),
    #[error("participants: user {0} listed more than once")]
    DuplicateParticipant(UserId),
    #[error("amount: user {0} has negative amount {1}")]
    NegativeAmount(UserId, Money),
    #[error("percent: user {0} has negative percentage {1}")]
    NegativePercent(UserId, Percent),
    #[error("shares: user {0} has zero shares")]
    ZeroShares(UserId),
    #[error("percent: percentages sum to {0}, expected 100.00%")]
    PercentSum(Percent),
    #[error("amount: exact amounts sum to {1}, expected {0}")]
    ExactSum(Money, Money),
    #[error("splits: expense {0} splits sum to {1}, expected 0.00")]
    UnbalancedSplits(ExpenseId, Money),
    #[error("splits: split for expense {1} submitted under expense {0}")]
    ForeignSplit(ExpenseId, ExpenseId),
    #[error("expense: expense {0} already has active splits")]
    DuplicateExpense(ExpenseId),
    #[error("group: expense {0} belongs to group {1}, not {2}")]
    GroupMismatch(ExpenseId, GroupId, GroupId),
    #[error("to: user {0} cannot settle with themselves")]
    SelfSettlement(UserId),
    #[error("amount: expense {0} amounts exceed the representable range")]
    Overflow(ExpenseId),
}

/// Conservation invariant violated. Never recoverable locally.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IntegrityError {
    #[error("group {0} balances sum to {1}, expected 0.00")]
    UnbalancedGroup(GroupId, Money),
    #[error("balances sum to {0}, expected 0.00")]
    UnbalancedBalances(Money),
    #[error("balances span groups {0} and {1}")]
    MixedGroups(GroupId, GroupId),
    #[error("user {0} appears more than once in the balances")]
    DuplicateUser(UserId),
    #[error("group {0} balances exceed the representable range")]
    Overflow(GroupId),
}

/// Referenced expense or group is absent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("group {0} not found")]
    Group(GroupId),
    #[error("expense {0} not found")]
    Expense(ExpenseId),
}
