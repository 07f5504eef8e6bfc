//! Application state — single-owner, main-thread only.
//!
//! All dashboard state lives here. The worker thread communicates via
//! channels; nothing in this module blocks.

use std::sync::mpsc::{Receiver, Sender};

use chrono::NaiveDate;

use siglab_core::data::Period;
use siglab_runner::{BacktestReport, SiglabConfig};

use crate::worker::{WorkerCommand, WorkerResponse};

/// Status message severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warning,
    Error,
}

pub struct AppState {
    pub running: bool,
    pub loading: bool,
    pub config: SiglabConfig,
    pub report: Option<BacktestReport>,
    pub status_message: Option<(String, StatusLevel)>,
    /// Rows shown in the signal table.
    pub table_rows: usize,

    worker_tx: Sender<WorkerCommand>,
    pub worker_rx: Receiver<WorkerResponse>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl AppState {
    pub fn new(config: SiglabConfig, worker_tx: Sender<WorkerCommand>, worker_rx: Receiver<WorkerResponse>) -> Self {
        Self {
            running: true,
            loading: false,
            config,
            report: None,
            status_message: None,
            table_rows: 10,
            worker_tx,
            worker_rx,
            today: local_today,
        }
    }

    /// Override the end date sent with each load.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn period(&self) -> Period {
        self.config.data.period
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Info));
    }

    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Warning));
    }

    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.status_message = Some((msg.into(), StatusLevel::Error));
    }

    /// Ask the worker for a fresh run. Ignored while one is in flight.
    pub fn request_reload(&mut self) {
        if self.loading {
            return;
        }
        let cmd = WorkerCommand::Load {
            config: Box::new(self.config.clone()),
            end: (self.today)(),
        };
        if self.worker_tx.send(cmd).is_err() {
            self.set_error("worker thread is gone; restart the dashboard");
            return;
        }
        self.loading = true;
        self.set_status(format!("Loading {} ({})...", self.config.data.symbol, self.period()));
    }

    /// Step to the next lookback period and reload.
    pub fn cycle_period(&mut self) {
        if self.loading {
            self.set_warning("Load in progress; period unchanged");
            return;
        }
        self.config.data.period = self.period().next();
        self.request_reload();
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    pub fn handle_response(&mut self, resp: WorkerResponse) {
        self.loading = false;
        match resp {
            WorkerResponse::Loaded { report } => {
                let s = &report.summary;
                let msg = format!(
                    "Loaded {} bars of {} | {} trades | latest {}",
                    report.bar_count(),
                    report.symbol,
                    s.trade_count,
                    report.latest_signal().label()
                );
                if let Some(gap) = report.insufficient.first() {
                    self.set_warning(format!("{msg} | {gap}"));
                } else {
                    self.set_status(msg);
                }
                self.report = Some(*report);
            }
            WorkerResponse::Failed { error } => {
                self.set_error(format!("Load failed: {error}"));
            }
        }
    }

    /// Drain pending worker responses without blocking.
    pub fn poll_worker(&mut self) {
        while let Ok(resp) = self.worker_rx.try_recv() {
            self.handle_response(resp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
    }

    fn app() -> (AppState, Receiver<WorkerCommand>, Sender<WorkerResponse>) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (resp_tx, resp_rx) = mpsc::channel();
        let app = AppState::new(SiglabConfig::default(), cmd_tx, resp_rx).with_clock(fixed_today);
        (app, cmd_rx, resp_tx)
    }

    #[test]
    fn reload_sends_one_command_while_loading() {
        let (mut app, cmd_rx, _resp_tx) = app();
        app.request_reload();
        app.request_reload();
        assert!(app.loading);
        assert!(matches!(cmd_rx.try_recv(), Ok(WorkerCommand::Load { end, .. }) if end == fixed_today()));
        assert!(cmd_rx.try_recv().is_err());
    }

    #[test]
    fn cycle_period_advances_and_reloads() {
        let (mut app, cmd_rx, _resp_tx) = app();
        assert_eq!(app.period(), Period::SixMonths);
        app.cycle_period();
        assert_eq!(app.period(), Period::OneYear);
        match cmd_rx.try_recv() {
            Ok(WorkerCommand::Load { config, .. }) => assert_eq!(config.data.period, Period::OneYear),
            _ => panic!("expected a load command"),
        }
    }

    #[test]
    fn failure_lands_in_status_bar() {
        let (mut app, _cmd_rx, resp_tx) = app();
        app.request_reload();
        resp_tx
            .send(WorkerResponse::Failed {
                error: "network unreachable".into(),
            })
            .unwrap();
        app.poll_worker();
        assert!(!app.loading);
        let (msg, level) = app.status_message.clone().unwrap();
        assert_eq!(level, StatusLevel::Error);
        assert!(msg.contains("network unreachable"));
        assert!(app.report.is_none());
    }

    #[test]
    fn dead_worker_is_an_error_not_a_hang() {
        let (mut app, cmd_rx, _resp_tx) = app();
        drop(cmd_rx);
        app.request_reload();
        assert!(!app.loading);
        assert_eq!(app.status_message.as_ref().unwrap().1, StatusLevel::Error);
    }
}
