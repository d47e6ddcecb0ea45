//! Core domain types for the balance ledger.

use crate::{Money, Percent};

/// User identifier.
pub type UserId = u32;

/// Group identifier.
pub type GroupId = u32;

/// Expense identifier, unique across groups.
pub type ExpenseId = u64;

/// A signed share of one expense attributed to one user.
///
/// Credits (what the user paid) are positive, debits (what the user consumed)
/// are negative. The splits of a single expense always sum to zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpenseSplit {
    pub expense_id: ExpenseId,
    pub user_id: UserId,
    pub signed_amount: Money,
}

impl ExpenseSplit {
    pub fn new(expense_id: ExpenseId, user_id: UserId, signed_amount: Money) -> Self {
        Self {
            expense_id,
            user_id,
            signed_amount,
        }
    }

    /// The exact negation of this split, used to reverse an expense.
    pub fn reversed(&self) -> Self {
        Self {
            signed_amount: -self.signed_amount,
            ..*self
        }
    }
}

/// A user's position within a group: positive is owed to the user,
/// negative is owed by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetBalance {
    pub user_id: UserId,
    pub group_id: GroupId,
    pub amount: Money,
}

/// A proposed payment from a debtor to a creditor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlementTransfer {
    pub from_user_id: UserId,
    pub to_user_id: UserId,
    pub amount: Money,
}

/// How an expense total is divided between its participants.
///
/// One kind per expense; participants are listed at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SplitSpec {
    /// Divide the total evenly.
    Equal(Vec<UserId>),
    /// Divide by percentage; percentages must add up to 100.
    Percentage(Vec<(UserId, Percent)>),
    /// Divide proportionally to a positive share count.
    Shares(Vec<(UserId, u32)>),
    /// Explicit amounts that must add up to the total.
    Exact(Vec<(UserId, Money)>),
}

impl SplitSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            SplitSpec::Equal(_) => "equal",
            SplitSpec::Percentage(_) => "percentage",
            SplitSpec::Shares(_) => "shares",
            SplitSpec::Exact(_) => "exact",
        }
    }

    pub fn participants(&self) -> Vec<UserId> {
        match self {
            SplitSpec::Equal(users) => users.clone(),
            SplitSpec::Percentage(entries) => entries.iter().map(|(u, _)| *u).collect(),
            SplitSpec::Shares(entries) => entries.iter().map(|(u, _)| *u).collect(),
            SplitSpec::Exact(entries) => entries.iter().map(|(u, _)| *u).collect(),
        }
    }
}

/// Lifecycle state of a recorded expense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseState {
    /// Splits are live in the group history and may be reversed.
    #[default]
    Active,
    /// Splits have been negated; the expense may be recorded again (edit).
    Reversed,
}

/// Record of an expense kept by a ledger store for reversal.
#[derive(Debug, Clone)]
pub struct ExpenseRecord {
    /// The group the expense belongs to; fixed for the expense's lifetime.
    pub group: GroupId,
    /// The deltas most recently appended for this expense.
    pub splits: Vec<ExpenseSplit>,
    pub state: ExpenseState,
}

impl ExpenseRecord {
    /// Create a new expense record in the `Active` state.
    pub fn new(group: GroupId, splits: Vec<ExpenseSplit>) -> Self {
        Self {
            group,
            splits,
            state: ExpenseState::Active,
        }
    }
}

/// A write against the ledger.
#[derive(Debug, Clone)]
pub enum LedgerCommand {
    /// Record a new expense paid by `payer`.
    RecordExpense {
        group: GroupId,
        expense: ExpenseId,
        payer: UserId,
        total: Money,
        split: SplitSpec,
    },
    /// Replace the full split set of an existing expense.
    EditExpense {
        group: GroupId,
        expense: ExpenseId,
        payer: UserId,
        total: Money,
        split: SplitSpec,
    },
    /// Reverse every split of an existing expense.
    DeleteExpense { expense: ExpenseId },
    /// Record a payment from `from` to `to`; it becomes an exact expense.
    RecordSettlement {
        group: GroupId,
        expense: ExpenseId,
        from: UserId,
        to: UserId,
        amount: Money,
    },
}

impl LedgerCommand {
    pub fn expense(&self) -> ExpenseId {
        match self {
            LedgerCommand::RecordExpense { expense, .. }
            | LedgerCommand::EditExpense { expense, .. }
            | LedgerCommand::DeleteExpense { expense }
            | LedgerCommand::RecordSettlement { expense, .. } => *expense,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LedgerCommand::RecordExpense { .. } => "expense",
            LedgerCommand::EditExpense { .. } => "edit",
            LedgerCommand::DeleteExpense { .. } => "delete",
            LedgerCommand::RecordSettlement { .. } => "settle",
        }
    }
}
