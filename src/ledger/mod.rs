//! Group balance ledger.
//!
//! The ledger records expenses into a [`LedgerStore`], derives per-user net
//! balances from each group's split history and proposes settlement transfers.
//! Also supports async stream of ledger commands.

use tokio_stream::{Stream, StreamExt};
use tracing::info;

use crate::balance::aggregate_balances;
use crate::error::{LedgerError, NotFoundError, ValidationError};
use crate::model::{
    ExpenseId, ExpenseSplit, GroupId, LedgerCommand, NetBalance, SettlementTransfer, SplitSpec,
    UserId,
};
use crate::settle::simplify_debts;
use crate::split::normalize_expense_split;
use crate::Money;

mod cache;
pub use cache::BalanceCache;

mod store;
pub use store::{LedgerStore, MemoryStore};

/// The balance ledger.
///
/// Owns a store and a per-group balance cache that is invalidated on every
/// write touching the group.
pub struct Ledger<S = MemoryStore> {
    store: S,
    cache: BalanceCache,
}

impl Ledger<MemoryStore> {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::new())
    }
}

/// Public API
impl<S: LedgerStore> Ledger<S> {
    pub fn with_store(store: S) -> Self {
        Self {
            store,
            cache: BalanceCache::default(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run the ledger with the given command stream
    pub async fn run(&mut self, mut stream: impl Stream<Item = LedgerCommand> + Unpin) {
        while let Some(command) = stream.next().await {
            // a rejected command must not stop the ledger; `apply` already logged it
            let _ = self.apply(command);
        }
    }

    /// Apply a single command on top of the current ledger state
    pub fn apply(&mut self, command: LedgerCommand) -> Result<(), LedgerError> {
        let name = command.name();
        let expense = command.expense();
        let result = match command {
            LedgerCommand::RecordExpense {
                group,
                expense,
                payer,
                total,
                split,
            } => self.record_expense(group, expense, payer, total, &split),
            LedgerCommand::EditExpense {
                group,
                expense,
                payer,
                total,
                split,
            } => self.edit_expense(group, expense, payer, total, &split),
            LedgerCommand::DeleteExpense { expense } => self.delete_expense(expense),
            LedgerCommand::RecordSettlement {
                group,
                expense,
                from,
                to,
                amount,
            } => self.record_settlement(group, expense, from, to, amount),
        };
        Self::log_result(name, expense, &result);
        result
    }

    /// Record a new expense: normalize the split and append it.
    pub fn record_expense(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        payer: UserId,
        total: Money,
        split: &SplitSpec,
    ) -> Result<(), LedgerError> {
        let deltas = normalize_expense_split(expense, payer, total, split)?;
        self.append_splits(group, expense, deltas)
    }

    /// Replace the split set of an active expense.
    ///
    /// Everything that can fail is checked before the old splits are
    /// reversed, so a rejected edit leaves the ledger untouched.
    pub fn edit_expense(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        payer: UserId,
        total: Money,
        split: &SplitSpec,
    ) -> Result<(), LedgerError> {
        let deltas = normalize_expense_split(expense, payer, total, split)?;

        match self.store.active_group(expense) {
            None => return Err(NotFoundError::Expense(expense).into()),
            Some(recorded) if recorded != group => {
                return Err(ValidationError::GroupMismatch(expense, recorded, group).into());
            }
            Some(_) => {}
        }

        self.reverse_splits(expense)?;
        self.append_splits(group, expense, deltas)
    }

    /// Reverse every split of an active expense.
    pub fn delete_expense(&mut self, expense: ExpenseId) -> Result<(), LedgerError> {
        self.reverse_splits(expense)
    }

    /// Record a payment from `from` to `to` as an exact expense paid by `from`.
    pub fn record_settlement(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        from: UserId,
        to: UserId,
        amount: Money,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(ValidationError::SelfSettlement(from).into());
        }
        let split = SplitSpec::Exact(vec![(to, amount)]);
        self.record_expense(group, expense, from, amount, &split)
    }

    /// Append already normalized deltas and invalidate the group's balances.
    pub fn append_splits(
        &mut self,
        group: GroupId,
        expense: ExpenseId,
        deltas: Vec<ExpenseSplit>,
    ) -> Result<(), LedgerError> {
        self.store.append_splits(group, expense, deltas)?;
        self.cache.invalidate(group);
        Ok(())
    }

    /// Reverse an expense's deltas and invalidate the group's balances.
    pub fn reverse_splits(&mut self, expense: ExpenseId) -> Result<(), LedgerError> {
        let group = self.store.reverse_splits(expense)?;
        self.cache.invalidate(group);
        Ok(())
    }

    /// Net balance of every user who ever took part in `group`, by user id.
    pub fn compute_group_balances(
        &mut self,
        group: GroupId,
    ) -> Result<Vec<NetBalance>, LedgerError> {
        if let Some(balances) = self.cache.get(group) {
            return Ok(balances.to_vec());
        }

        let history = self.store.read_group_history(group)?;
        let balances = aggregate_balances(group, history.iter())?;
        self.cache.insert(group, balances.clone());
        Ok(balances)
    }

    /// Transfers that would settle every balance of `group`.
    pub fn compute_settlements(
        &mut self,
        group: GroupId,
    ) -> Result<Vec<SettlementTransfer>, LedgerError> {
        let balances = self.compute_group_balances(group)?;
        Ok(simplify_debts(&balances)?)
    }

    /// Every group with recorded history, in ascending order.
    pub fn groups(&self) -> Vec<GroupId> {
        self.store.groups()
    }
}

/// Private API
impl<S: LedgerStore> Ledger<S> {
    /// Small helper to log `apply` results
    fn log_result(command: &str, expense: ExpenseId, result: &Result<(), LedgerError>) {
        match result {
            Ok(()) => {
                info!(expense = %expense, "{command} applied");
            }
            Err(e) => {
                info!(expense = %expense, reason = %e, "{command} skipped");
            }
        }
    }
}

impl Default for Ledger<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}
