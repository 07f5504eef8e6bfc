//! Signal alerts — Telegram channel and the polling monitor.
//!
//! The monitor repeatedly loads the configured series, evaluates the latest
//! row's signal and forwards Buy/Sell to an `AlertChannel`. Hold is silent.
//! Failures are logged and retried after a shorter delay; the loop never
//! exits on an error, only on the stop flag or an exhausted cycle budget.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use siglab_core::data::DataProvider;
use siglab_core::{run_pipeline, PipelineError, PriceSeries, Signal, StrategyParams};

use crate::config::{AlertConfig, SiglabConfig};
use crate::data_loader::{load_series, LoadError};

const TELEGRAM_API: &str = "https://api.telegram.org";
const SLEEP_SLICE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum AlertError {
    #[error("telegram token and chat id must both be configured")]
    NotConfigured,

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("telegram API rejected the message ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("data error: {0}")]
    Data(#[from] LoadError),

    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Where alert text goes.
pub trait AlertChannel: Send + Sync {
    fn name(&self) -> &str;
    fn send(&self, text: &str) -> Result<(), AlertError>;
}

/// Telegram Bot API `sendMessage`.
pub struct TelegramChannel {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
    chat_id: String,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

impl TelegramChannel {
    pub fn new(token: impl Into<String>, chat_id: impl Into<String>) -> Result<Self, AlertError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| AlertError::Http(e.to_string()))?;
        Ok(Self {
            client,
            base_url: TELEGRAM_API.to_string(),
            token: token.into(),
            chat_id: chat_id.into(),
        })
    }

    pub fn from_config(config: &AlertConfig) -> Result<Self, AlertError> {
        match (&config.telegram_token, &config.telegram_chat_id) {
            (Some(token), Some(chat_id)) => Self::new(token.clone(), chat_id.clone()),
            _ => Err(AlertError::NotConfigured),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

impl AlertChannel for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn send(&self, text: &str) -> Result<(), AlertError> {
        let body = serde_json::json!({ "chat_id": self.chat_id, "text": text });
        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            // The URL embeds the token; keep it out of the error text.
            .map_err(|e| AlertError::Http(e.without_url().to_string()))?;

        let status = resp.status();
        let parsed: Option<TelegramResponse> = resp.json().ok();
        match parsed {
            Some(r) if status.is_success() && r.ok => Ok(()),
            other => Err(AlertError::Api {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| "no description".into()),
            }),
        }
    }
}

/// Fixed alert text per signal. Hold produces no alert.
pub fn alert_message(signal: Signal) -> Option<&'static str> {
    match signal {
        Signal::Buy => Some("BUY signal generated"),
        Signal::Sell => Some("SELL signal generated"),
        Signal::Hold => None,
    }
}

/// Run the pipeline and return the last row's signal.
pub fn latest_signal(series: &PriceSeries, params: &StrategyParams) -> Result<Signal, PipelineError> {
    Ok(run_pipeline(series, params)?.latest_signal())
}

/// What one monitor cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub symbol: String,
    pub date: NaiveDate,
    pub signal: Signal,
    /// Text sent, if the signal was actionable.
    pub sent: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorStats {
    pub cycles: usize,
    pub alerts_sent: usize,
    pub errors: usize,
}

/// Polling loop: load, evaluate, alert, sleep.
pub struct Monitor<'a> {
    config: &'a SiglabConfig,
    provider: &'a dyn DataProvider,
    channel: &'a dyn AlertChannel,
    interval: Duration,
    retry: Duration,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

impl<'a> Monitor<'a> {
    pub fn new(config: &'a SiglabConfig, provider: &'a dyn DataProvider, channel: &'a dyn AlertChannel) -> Self {
        Self {
            config,
            provider,
            channel,
            interval: Duration::from_secs(config.alert.interval_secs),
            retry: Duration::from_secs(config.alert.retry_secs),
            today: local_today,
        }
    }

    /// Override the sleep durations.
    pub fn with_delays(mut self, interval: Duration, retry: Duration) -> Self {
        self.interval = interval;
        self.retry = retry;
        self
    }

    /// Override the end date used for each fetch.
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// One cycle: load, evaluate, send if actionable.
    pub fn check_once(&self) -> Result<CheckOutcome, AlertError> {
        let data = &self.config.data;
        let loaded = load_series(self.provider, data.source, &data.symbol, data.period, (self.today)())?;
        let signal = latest_signal(&loaded.series, &self.config.strategy.params())?;
        let last = loaded.series.last_date();

        let sent = match alert_message(signal) {
            Some(message) => {
                let text = format!("{message} for {} on {last}", data.symbol);
                self.channel.send(&text)?;
                tracing::info!(symbol = %data.symbol, signal = signal.label(), channel = self.channel.name(), "alert sent");
                Some(text)
            }
            None => {
                tracing::debug!(symbol = %data.symbol, "latest signal is HOLD, nothing to send");
                None
            }
        };

        Ok(CheckOutcome {
            symbol: data.symbol.clone(),
            date: last,
            signal,
            sent,
        })
    }

    /// Loop until `stop` is set or `max_cycles` cycles have run.
    pub fn run(&self, stop: &AtomicBool, max_cycles: Option<usize>) -> MonitorStats {
        let mut stats = MonitorStats::default();
        tracing::info!(symbol = %self.config.data.symbol, interval = ?self.interval, "monitor started");

        while !stop.load(Ordering::Relaxed) {
            let delay = match self.check_once() {
                Ok(outcome) => {
                    if outcome.sent.is_some() {
                        stats.alerts_sent += 1;
                    }
                    self.interval
                }
                Err(e) => {
                    stats.errors += 1;
                    tracing::warn!(error = %e, retry = ?self.retry, "monitor cycle failed");
                    self.retry
                }
            };
            stats.cycles += 1;

            if max_cycles.is_some_and(|max| stats.cycles >= max) {
                break;
            }
            sleep_unless_stopped(delay, stop);
        }

        tracing::info!(cycles = stats.cycles, alerts = stats.alerts_sent, errors = stats.errors, "monitor stopped");
        stats
    }
}

/// Set `stop` when the process receives Ctrl-C.
///
/// The listener runs on its own thread with a single-threaded runtime, so the
/// blocking monitor loop sees the flag at its next sleep slice and returns its
/// stats instead of being killed mid-cycle.
pub fn stop_on_ctrl_c(stop: Arc<AtomicBool>) -> io::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
    std::thread::Builder::new()
        .name("siglab-ctrl-c".into())
        .spawn(move || match runtime.block_on(tokio::signal::ctrl_c()) {
            Ok(()) => {
                tracing::info!("shutdown signal received, stopping monitor");
                stop.store(true, Ordering::Relaxed);
            }
            Err(e) => tracing::warn!(error = %e, "failed to listen for Ctrl-C"),
        })?;
    Ok(())
}

/// Sleep for `total`, waking every slice to check `stop`.
fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let deadline = Instant::now() + total;
    while !stop.load(Ordering::Relaxed) {
        let now = Instant::now();
        if now >= deadline {
            break;
        }
        std::thread::sleep(SLEEP_SLICE.min(deadline - now));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use siglab_core::data::CsvProvider;
    use std::io::Write;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        sent: Mutex<Vec<String>>,
    }

    impl AlertChannel for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }
        fn send(&self, text: &str) -> Result<(), AlertError> {
            self.sent.lock().unwrap().push(text.to_string());
            Ok(())
        }
    }

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    fn csv(closes: &[f64]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "date,close").unwrap();
        for (i, c) in closes.iter().enumerate() {
            writeln!(file, "2024-01-{:02},{c}", i + 2).unwrap();
        }
        file
    }

    fn config() -> SiglabConfig {
        SiglabConfig::from_toml(
            "[data]\nsymbol = \"TEST\"\nperiod = \"1mo\"\nsource = \"csv\"\ncsv_path = \"unused.csv\"\n\
             [strategy]\nshort_window = 2\nlong_window = 3\nrsi_window = 2",
        )
        .unwrap()
    }

    #[test]
    fn messages_per_signal() {
        assert_eq!(alert_message(Signal::Buy), Some("BUY signal generated"));
        assert_eq!(alert_message(Signal::Sell), Some("SELL signal generated"));
        assert_eq!(alert_message(Signal::Hold), None);
    }

    #[test]
    fn sell_on_last_row_sends_one_alert() {
        let file = csv(&[10.0, 10.0, 12.0]);
        let provider = CsvProvider::new(file.path());
        let channel = Recorder::default();
        let config = config();
        let monitor = Monitor::new(&config, &provider, &channel).with_clock(fixed_today);

        let outcome = monitor.check_once().unwrap();
        assert_eq!(outcome.signal, Signal::Sell);
        let sent = channel.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0], "SELL signal generated for TEST on 2024-01-04");
    }

    #[test]
    fn hold_sends_nothing() {
        let file = csv(&[10.0, 10.0, 12.0, 9.0, 15.0]);
        let provider = CsvProvider::new(file.path());
        let channel = Recorder::default();
        let config = config();
        let monitor = Monitor::new(&config, &provider, &channel).with_clock(fixed_today);

        let stats = monitor.run(&AtomicBool::new(false), Some(1));
        assert_eq!(stats, MonitorStats { cycles: 1, alerts_sent: 0, errors: 0 });
        assert!(channel.sent.lock().unwrap().is_empty());
    }

    #[test]
    fn errors_are_counted_and_retried() {
        let provider = CsvProvider::new("/nonexistent/prices.csv");
        let channel = Recorder::default();
        let config = config();
        let monitor = Monitor::new(&config, &provider, &channel)
            .with_clock(fixed_today)
            .with_delays(Duration::from_millis(1), Duration::from_millis(1));

        let stats = monitor.run(&AtomicBool::new(false), Some(3));
        assert_eq!(stats.cycles, 3);
        assert_eq!(stats.errors, 3);
        assert_eq!(stats.alerts_sent, 0);
    }

    #[test]
    fn stop_flag_prevents_any_cycle() {
        let provider = CsvProvider::new("/nonexistent/prices.csv");
        let channel = Recorder::default();
        let config = config();
        let monitor = Monitor::new(&config, &provider, &channel);
        let stats = monitor.run(&AtomicBool::new(true), None);
        assert_eq!(stats.cycles, 0);
    }

    #[test]
    fn stop_raised_from_another_thread_ends_the_loop() {
        let file = csv(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0]);
        let provider = CsvProvider::new(file.path());
        let channel = Recorder::default();
        let config = config();
        let monitor = Monitor::new(&config, &provider, &channel)
            .with_delays(Duration::from_secs(60), Duration::from_secs(60))
            .with_clock(fixed_today);

        let stop = Arc::new(AtomicBool::new(false));
        let raiser = {
            let stop = Arc::clone(&stop);
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(200));
                stop.store(true, Ordering::Relaxed);
            })
        };

        let start = Instant::now();
        let stats = monitor.run(&stop, None);
        raiser.join().unwrap();

        assert_eq!(stats.cycles, 1);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn sliced_sleep_returns_early_when_stopped() {
        let stop = AtomicBool::new(true);
        let start = Instant::now();
        sleep_unless_stopped(Duration::from_secs(30), &stop);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn telegram_requires_both_credentials() {
        let mut alert = AlertConfig::default();
        alert.telegram_token = Some("t".into());
        assert!(matches!(TelegramChannel::from_config(&alert), Err(AlertError::NotConfigured)));
        alert.telegram_chat_id = Some("1".into());
        let channel = TelegramChannel::from_config(&alert).unwrap().with_base_url("http://localhost:9");
        assert_eq!(channel.endpoint(), "http://localhost:9/bott/sendMessage");
    }
}
