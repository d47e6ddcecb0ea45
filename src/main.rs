use std::env;
use std::io;
use std::process::ExitCode;

use evenly_ledger::Ledger;
use evenly_ledger::config::{Config, ConfigError, Report, USAGE};
use evenly_ledger::csv::{read_commands, write_balances, write_settlements};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse().unwrap()))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e @ ConfigError::MissingInput) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    if !config.is_csv() {
        warn!(path = %config.input.display(), "input file seems to not be a csv file");
    }

    let commands = match read_commands(config.input.clone()) {
        Ok(commands) => commands,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut ledger = Ledger::new();
    let (command_sender, command_receiver) = tokio::sync::mpsc::channel(16);

    tokio::spawn(async move {
        for result in commands {
            match result {
                Ok(command) => {
                    if command_sender.send(command).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("{e}");
                }
            }
        }
    });

    ledger.run(ReceiverStream::new(command_receiver)).await;

    match report(&mut ledger, config.report) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Compute the requested view for every group and write it to stdout.
fn report(ledger: &mut Ledger, report: Report) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    match report {
        Report::Balances => {
            let mut balances = Vec::new();
            for group in ledger.groups() {
                balances.extend(ledger.compute_group_balances(group)?);
            }
            write_balances(stdout.lock(), balances)?;
        }
        Report::Settlements => {
            let mut transfers = Vec::new();
            for group in ledger.groups() {
                let settlements = ledger.compute_settlements(group)?;
                transfers.extend(settlements.into_iter().map(|t| (group, t)));
            }
            write_settlements(stdout.lock(), transfers)?;
        }
    }
    Ok(())
}
