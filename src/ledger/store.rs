use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};

use crate::Money;
use crate::error::{LedgerError, NotFoundError, ValidationError};
use crate::model::{ExpenseId, ExpenseRecord, ExpenseSplit, ExpenseState, GroupId};

/// Storage of per-group split history.
///
/// Implementations are responsible for serializing concurrent writes to the
/// same group; the ledger assumes every read is a consistent snapshot.
pub trait LedgerStore {
    /// Append the full delta set of `expense` to the history of `group`.
    fn append_splits(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        deltas: Vec<ExpenseSplit>,
    ) -> Result<(), LedgerError>;

    /// Append the exact negation of the active deltas of `expense`.
    ///
    /// Returns the group the expense belongs to.
    fn reverse_splits(&mut self, expense: ExpenseId) -> Result<GroupId, LedgerError>;

    /// Ordered split history of `group`, reversals included.
    fn read_group_history(&self, group: GroupId) -> Result<Cow<'_, [ExpenseSplit]>, LedgerError>;

    /// Group of `expense` if it currently has active splits.
    fn active_group(&self, expense: ExpenseId) -> Option<GroupId>;

    /// Every group with recorded history, in ascending order.
    fn groups(&self) -> Vec<GroupId>;
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    histories: BTreeMap<GroupId, Vec<ExpenseSplit>>,
    expenses: HashMap<ExpenseId, ExpenseRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of expenses ever recorded, reversed ones included.
    pub fn expense_count(&self) -> usize {
        self.expenses.len()
    }

    pub fn get_expense(&self, expense: ExpenseId) -> Option<&ExpenseRecord> {
        self.expenses.get(&expense)
    }
}

impl LedgerStore for MemoryStore {
    /// Append the deltas of `expense`:
    /// - Ensure every delta references `expense` and they sum to zero
    ///   without leaving the `i64` range
    /// - Ensure the expense is not active and stays in its original group
    /// - Push the deltas to the group history and keep them for reversal
    fn append_splits(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        deltas: Vec<ExpenseSplit>,
    ) -> Result<(), LedgerError> {
        if let Some(foreign) = deltas.iter().find(|d| d.expense_id != expense) {
            return Err(ValidationError::ForeignSplit(expense, foreign.expense_id).into());
        }

        // Every delta must stay negatable for a later reversal.
        if deltas.iter().any(|d| d.signed_amount.checked_neg().is_none()) {
            return Err(ValidationError::Overflow(expense).into());
        }
        let sum = Money::checked_sum(deltas.iter().map(|d| d.signed_amount))
            .ok_or(ValidationError::Overflow(expense))?;
        if !sum.is_zero() {
            return Err(ValidationError::UnbalancedSplits(expense, sum).into());
        }

        if let Some(record) = self.expenses.get(&expense) {
            if record.group != group {
                return Err(ValidationError::GroupMismatch(expense, record.group, group).into());
            }
            if record.state == ExpenseState::Active {
                return Err(ValidationError::DuplicateExpense(expense).into());
            }
        }

        self.histories
            .entry(group)
            .or_default()
            .extend(deltas.iter().copied());
        self.expenses
            .insert(expense, ExpenseRecord::new(group, deltas));

        Ok(())
    }

    /// Reverse the deltas of `expense`:
    /// - Find the active expense record
    /// - Push the negated deltas to the group history
    /// - Mark the record reversed so it can be recorded again
    fn reverse_splits(&mut self, expense: ExpenseId) -> Result<GroupId, LedgerError> {
        let record = self
            .expenses
            .get_mut(&expense)
            .filter(|r| r.state == ExpenseState::Active)
            .ok_or(NotFoundError::Expense(expense))?;

        let history = self.histories.entry(record.group).or_default();
        history.extend(record.splits.iter().map(ExpenseSplit::reversed));
        record.state = ExpenseState::Reversed;

        Ok(record.group)
    }

    fn read_group_history(&self, group: GroupId) -> Result<Cow<'_, [ExpenseSplit]>, LedgerError> {
        self.histories
            .get(&group)
            .map(|history| Cow::Borrowed(history.as_slice()))
            .ok_or_else(|| NotFoundError::Group(group).into())
    }

    fn active_group(&self, expense: ExpenseId) -> Option<GroupId> {
        self.expenses
            .get(&expense)
            .filter(|r| r.state == ExpenseState::Active)
            .map(|r| r.group)
    }

    fn groups(&self) -> Vec<GroupId> {
        self.histories.keys().copied().collect()
    }
}
