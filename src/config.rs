//! Command line configuration.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

pub const USAGE: &str = "usage: evenly-ledger <commands.csv> [balances|settlements]";

/// Which derived view to print once every command has been applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Report {
    #[default]
    Balances,
    Settlements,
}

impl FromStr for Report {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "balances" => Ok(Report::Balances),
            "settlements" => Ok(Report::Settlements),
            other => Err(ConfigError::UnknownReport(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("usage: evenly-ledger <commands.csv> [balances|settlements]")]
    MissingInput,
    #[error("unknown report '{0}', expected 'balances' or 'settlements'")]
    UnknownReport(String),
    #[error("unexpected argument '{0}'")]
    UnexpectedArgument(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub report: Report,
}

impl Config {
    /// Build the configuration from arguments, program name excluded.
    pub fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, ConfigError> {
        let mut args = args.into_iter();
        let input = args.next().ok_or(ConfigError::MissingInput)?;
        let report = match args.next() {
            Some(report) => report.parse()?,
            None => Report::default(),
        };
        if let Some(extra) = args.next() {
            return Err(ConfigError::UnexpectedArgument(extra));
        }

        Ok(Self {
            input: PathBuf::from(input),
            report,
        })
    }

    /// Whether the input path carries a `.csv` extension.
    pub fn is_csv(&self) -> bool {
        self.input
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
    }
}
