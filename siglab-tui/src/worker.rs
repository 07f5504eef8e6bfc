//! Background worker thread — data loading and the pipeline run here.
//!
//! Communication with the TUI main thread is via `mpsc` channels. Each
//! `Load` builds a fresh provider from the config it carries, so a period
//! change only needs a new command.

use std::io;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use chrono::NaiveDate;

use siglab_runner::{provider_for, run_backtest, BacktestReport, SiglabConfig};

/// Commands sent from the TUI to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    Load {
        config: Box<SiglabConfig>,
        end: NaiveDate,
    },
    Shutdown,
}

/// Responses sent from the worker back to the TUI.
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    Loaded { report: Box<BacktestReport> },
    Failed { error: String },
}

/// Spawn the background worker thread.
pub fn spawn_worker(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("siglab-worker".into())
        .spawn(move || worker_loop(rx, tx))
}

fn worker_loop(rx: Receiver<WorkerCommand>, tx: Sender<WorkerResponse>) {
    loop {
        match rx.recv() {
            Ok(WorkerCommand::Shutdown) | Err(_) => break,
            Ok(WorkerCommand::Load { config, end }) => {
                let resp = load(&config, end);
                if tx.send(resp).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!("worker stopped");
}

fn load(config: &SiglabConfig, end: NaiveDate) -> WorkerResponse {
    let result = provider_for(&config.data)
        .map_err(|e| e.to_string())
        .and_then(|provider| run_backtest(config, provider.as_ref(), end).map_err(|e| e.to_string()));

    match result {
        Ok(report) => WorkerResponse::Loaded {
            report: Box::new(report),
        },
        Err(error) => {
            tracing::warn!(symbol = %config.data.symbol, %error, "load failed");
            WorkerResponse::Failed { error }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siglab_core::data::DataSource;
    use std::sync::mpsc;
    use std::time::Duration;

    fn synthetic_config() -> SiglabConfig {
        let mut config = SiglabConfig::default();
        config.data.source = DataSource::Synthetic;
        config.data.symbol = "SYN".into();
        config
    }

    #[test]
    fn load_round_trip_through_channels() {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let handle = spawn_worker(cmd_rx, resp_tx).unwrap();

        cmd_tx
            .send(WorkerCommand::Load {
                config: Box::new(synthetic_config()),
                end: NaiveDate::from_ymd_opt(2024, 6, 28).unwrap(),
            })
            .unwrap();

        match resp_rx.recv_timeout(Duration::from_secs(10)).unwrap() {
            WorkerResponse::Loaded { report } => {
                assert_eq!(report.symbol, "SYN");
                assert!(report.bar_count() > 100);
            }
            WorkerResponse::Failed { error } => panic!("unexpected failure: {error}"),
        }

        cmd_tx.send(WorkerCommand::Shutdown).unwrap();
        handle.join().unwrap();
    }

    #[test]
    fn missing_csv_is_reported_not_panicked() {
        let mut config = synthetic_config();
        config.data.source = DataSource::Csv;
        config.data.csv_path = Some("/nonexistent/closes.csv".into());

        let resp = load(&config, NaiveDate::from_ymd_opt(2024, 6, 28).unwrap());
        assert!(matches!(resp, WorkerResponse::Failed { .. }));
    }
}
