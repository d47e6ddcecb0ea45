pub mod balance;
pub mod config;
pub mod csv;
pub mod error;
pub mod ledger;
pub mod model;
pub mod money;
pub mod settle;
pub mod split;

pub use balance::aggregate_balances;
pub use error::{IntegrityError, LedgerError, NotFoundError, ValidationError};
pub use ledger::{Ledger, LedgerStore, MemoryStore};
pub use model::{
    ExpenseId, ExpenseSplit, GroupId, LedgerCommand, NetBalance, SettlementTransfer, SplitSpec,
    UserId,
};
pub use money::{Money, Percent};
pub use settle::simplify_debts;
pub use split::normalize_expense_split;
