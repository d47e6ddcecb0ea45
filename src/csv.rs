use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{
    ExpenseId, GroupId, LedgerCommand, NetBalance, SettlementTransfer, SplitSpec, UserId,
};
use crate::money::ParseDecimalError;
use crate::{Money, Percent};

/// Errors that can occur when reading or writing csv rows
#[derive(Debug, Error)]
pub enum CsvError {
    #[error("failed to open csv input: {0}")]
    Open(csv::Error),

    #[error("failed to write csv output: {0}")]
    Write(#[from] csv::Error),

    #[error("failed to flush csv output: {0}")]
    Flush(#[from] io::Error),

    #[error("line {line}: failed to parse row: {source}")]
    Parse { line: usize, source: csv::Error },

    #[error("line {line}: unrecognized command type '{command}'")]
    UnrecognizedType { line: usize, command: String },

    #[error("line {line}: unrecognized split kind '{split}'")]
    UnrecognizedSplit { line: usize, split: String },

    #[error("line {line}: {command} missing {field}")]
    MissingField {
        line: usize,
        command: &'static str,
        field: &'static str,
    },

    #[error("line {line}: invalid amount: {source}")]
    InvalidAmount {
        line: usize,
        source: ParseDecimalError,
    },

    #[error("line {line}: invalid participant '{entry}'")]
    InvalidParticipant { line: usize, entry: String },
}

#[derive(Debug, Deserialize)]
struct InputRow {
    r#type: String,
    group: Option<GroupId>,
    expense: ExpenseId,
    payer: Option<UserId>,
    amount: Option<String>,
    split: Option<String>,
    participants: Option<String>,
}

#[derive(Debug, Serialize)]
struct BalanceRow {
    group: GroupId,
    user: UserId,
    balance: String,
}

#[derive(Debug, Serialize)]
struct TransferRow {
    group: GroupId,
    from: UserId,
    to: UserId,
    amount: String,
}

/// Read ledger commands from a csv file
pub fn read_commands(
    path: impl AsRef<Path>,
) -> Result<impl Iterator<Item = Result<LedgerCommand, CsvError>>, CsvError> {
    let reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(CsvError::Open)?;

    Ok(reader
        .into_deserialize::<InputRow>()
        .enumerate()
        .map(|(idx, result)| {
            let line = idx + 2; // 1-indexed, skip header
            let row = result.map_err(|source| CsvError::Parse { line, source })?;
            parse_row(line, row)
        }))
}

fn parse_row(line: usize, row: InputRow) -> Result<LedgerCommand, CsvError> {
    let expense = row.expense;
    match row.r#type.as_str() {
        "expense" | "edit" => {
            let command = if row.r#type == "expense" { "expense" } else { "edit" };
            let group = require(line, command, "group", row.group)?;
            let payer = require(line, command, "payer", row.payer)?;
            let total = parse_amount(line, &require(line, command, "amount", row.amount)?)?;
            let split = require(line, command, "split", row.split)?;
            let participants = require(line, command, "participants", row.participants)?;
            let split = parse_split(line, &split, &participants)?;

            Ok(if command == "expense" {
                LedgerCommand::RecordExpense {
                    group,
                    expense,
                    payer,
                    total,
                    split,
                }
            } else {
                LedgerCommand::EditExpense {
                    group,
                    expense,
                    payer,
                    total,
                    split,
                }
            })
        }
        "delete" => Ok(LedgerCommand::DeleteExpense { expense }),
        "settle" => {
            let group = require(line, "settle", "group", row.group)?;
            let from = require(line, "settle", "payer", row.payer)?;
            let amount = parse_amount(line, &require(line, "settle", "amount", row.amount)?)?;
            let to = require(line, "settle", "participants", row.participants)?;
            let to = parse_field(line, &to)?;
            Ok(LedgerCommand::RecordSettlement {
                group,
                expense,
                from,
                to,
                amount,
            })
        }
        other => Err(CsvError::UnrecognizedType {
            line,
            command: other.to_string(),
        }),
    }
}

fn require<T>(
    line: usize,
    command: &'static str,
    field: &'static str,
    value: Option<T>,
) -> Result<T, CsvError> {
    value.ok_or(CsvError::MissingField {
        line,
        command,
        field,
    })
}

fn parse_amount(line: usize, value: &str) -> Result<Money, CsvError> {
    value
        .parse()
        .map_err(|source| CsvError::InvalidAmount { line, source })
}

fn parse_field<T: FromStr>(line: usize, value: &str) -> Result<T, CsvError> {
    value.trim().parse().map_err(|_| CsvError::InvalidParticipant {
        line,
        entry: value.to_string(),
    })
}

/// Split `user:value` participant entries separated by `;`.
fn parse_pairs<T: FromStr>(line: usize, participants: &str) -> Result<Vec<(UserId, T)>, CsvError> {
    entries(participants)
        .map(|entry| {
            let (user, value) = entry
                .split_once(':')
                .ok_or_else(|| CsvError::InvalidParticipant {
                    line,
                    entry: entry.to_string(),
                })?;
            let user = parse_field(line, user)?;
            let value = value.trim().parse().map_err(|_| CsvError::InvalidParticipant {
                line,
                entry: entry.to_string(),
            })?;
            Ok((user, value))
        })
        .collect()
}

fn entries(participants: &str) -> impl Iterator<Item = &str> {
    participants
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}

fn parse_split(line: usize, split: &str, participants: &str) -> Result<SplitSpec, CsvError> {
    match split {
        "equal" => Ok(SplitSpec::Equal(
            entries(participants)
                .map(|entry| parse_field(line, entry))
                .collect::<Result<_, _>>()?,
        )),
        "percentage" => Ok(SplitSpec::Percentage(parse_pairs::<Percent>(line, participants)?)),
        "shares" => Ok(SplitSpec::Shares(parse_pairs::<u32>(line, participants)?)),
        "exact" => Ok(SplitSpec::Exact(parse_pairs::<Money>(line, participants)?)),
        other => Err(CsvError::UnrecognizedSplit {
            line,
            split: other.to_string(),
        }),
    }
}

/// Write group balances in csv format
pub fn write_balances(
    out: impl io::Write,
    balances: impl IntoIterator<Item = NetBalance>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for balance in balances {
        writer.serialize(BalanceRow {
            group: balance.group_id,
            user: balance.user_id,
            balance: balance.amount.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}

/// Write settlement transfers in csv format
pub fn write_settlements(
    out: impl io::Write,
    transfers: impl IntoIterator<Item = (GroupId, SettlementTransfer)>,
) -> Result<(), CsvError> {
    let mut writer = csv::Writer::from_writer(out);

    for (group, transfer) in transfers {
        writer.serialize(TransferRow {
            group,
            from: transfer.from_user_id,
            to: transfer.to_user_id,
            amount: transfer.amount.to_string(),
        })?;
    }

    writer.flush()?;
    Ok(())
}
