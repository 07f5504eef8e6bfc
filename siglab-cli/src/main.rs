//! Siglab CLI — fetch, backtest, export, alert and train commands.
//!
//! Commands:
//! - `fetch` — download closes and print the most recent rows
//! - `backtest` — run the pipeline, print a summary and save artifacts
//! - `sheet` — write the trailing window of the backtest to the sheet log
//! - `alert` — evaluate the latest bar once and send an alert if actionable
//! - `monitor` — repeat `alert` on the configured interval
//! - `train` — fit the next-move classifier and report test accuracy

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use siglab_core::data::{DataSource, Period};
use siglab_core::pipeline::indicator_frame;
use siglab_runner::alert::{stop_on_ctrl_c, AlertChannel, AlertError, Monitor, TelegramChannel};
use siglab_runner::data_loader::{load_series, provider_for};
use siglab_runner::export::{write_sheet, CsvSheetSink};
use siglab_runner::{init_tracing, run_backtest, save_artifacts, train_classifier, BacktestReport, SiglabConfig};

#[derive(Parser)]
#[command(name = "siglab", about = "Siglab CLI — MA/RSI signal pipeline and backtester")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Flags shared by every command. Each one overrides the config file.
#[derive(Args, Clone)]
struct DataArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker symbol (e.g., RELIANCE.NS).
    #[arg(long)]
    symbol: Option<String>,

    /// Lookback period: 1mo, 3mo, 6mo, 1y, 2y, 5y.
    #[arg(long)]
    period: Option<Period>,

    /// Data source: yahoo, csv, synthetic.
    #[arg(long)]
    source: Option<DataSource>,

    /// Read closes from this CSV file (implies --source csv).
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Use the seeded synthetic random walk (no network).
    #[arg(long, default_value_t = false)]
    synthetic: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Download closes and print the most recent rows.
    Fetch {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,
    },
    /// Run the full pipeline and print a summary.
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 10)]
        rows: usize,

        /// Artifact directory. Defaults to export.output_dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Skip writing artifacts.
        #[arg(long, default_value_t = false)]
        no_save: bool,
    },
    /// Write the trailing window of the backtest to the sheet log.
    Sheet {
        #[command(flatten)]
        data: DataArgs,

        /// Rows to keep. Defaults to export.sheet_rows.
        #[arg(long)]
        rows: Option<usize>,

        /// Sheet file. Defaults to export.sheet_path.
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Evaluate the latest bar once and alert on BUY/SELL.
    Alert {
        #[command(flatten)]
        data: DataArgs,

        /// Print the alert instead of sending it.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Run the alert check repeatedly on the configured interval.
    Monitor {
        #[command(flatten)]
        data: DataArgs,

        /// Stop after this many cycles (runs until interrupted otherwise).
        #[arg(long)]
        cycles: Option<usize>,

        /// Print alerts instead of sending them.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Train the next-move classifier and report test accuracy.
    Train {
        #[command(flatten)]
        data: DataArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Fetch { data, rows } => run_fetch(&data, rows),
        Commands::Backtest {
            data,
            rows,
            output_dir,
            no_save,
        } => run_backtest_cmd(&data, rows, output_dir, no_save),
        Commands::Sheet { data, rows, path } => run_sheet(&data, rows, path),
        Commands::Alert { data, dry_run } => run_alert(&data, dry_run),
        Commands::Monitor {
            data,
            cycles,
            dry_run,
        } => run_monitor(&data, cycles, dry_run),
        Commands::Train { data } => run_train(&data),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Config file (or defaults), then environment, then command-line flags.
fn resolve_config(args: &DataArgs) -> Result<SiglabConfig> {
    let mut config = match &args.config {
        Some(path) => SiglabConfig::from_file(path)?,
        None => SiglabConfig::default(),
    };
    config.apply_env_overrides(|key| std::env::var(key).ok());

    if let Some(symbol) = &args.symbol {
        config.data.symbol = symbol.clone();
    }
    if let Some(period) = args.period {
        config.data.period = period;
    }
    if let Some(source) = args.source {
        config.data.source = source;
    }
    if let Some(csv) = &args.csv {
        config.data.source = DataSource::Csv;
        config.data.csv_path = Some(csv.clone());
    }
    if args.synthetic {
        config.data.source = DataSource::Synthetic;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn backtest(config: &SiglabConfig) -> Result<BacktestReport> {
    let provider = provider_for(&config.data)?;
    let report = run_backtest(config, provider.as_ref(), today())
        .with_context(|| format!("backtest failed for {}", config.data.symbol))?;
    if report.source == DataSource::Synthetic {
        println!("WARNING: Results based on SYNTHETIC data");
    }
    Ok(report)
}

fn run_fetch(args: &DataArgs, rows: usize) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = provider_for(&config.data)?;
    let loaded = load_series(
        provider.as_ref(),
        config.data.source,
        &config.data.symbol,
        config.data.period,
        today(),
    )
    .with_context(|| format!("failed to fetch {}", config.data.symbol))?;

    let series = &loaded.series;
    println!(
        "{} — {} bars from {} to {} ({})",
        series.symbol(),
        series.len(),
        series.first_date(),
        series.last_date(),
        loaded.source.label()
    );
    println!("{:<12} {:>12}", "Date", "Close");
    println!("{}", "-".repeat(25));
    for bar in series.tail(rows).bars() {
        println!("{:<12} {:>12.2}", bar.date, bar.close);
    }
    Ok(())
}

fn run_backtest_cmd(args: &DataArgs, rows: usize, output_dir: Option<PathBuf>, no_save: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let report = backtest(&config)?;

    print_summary(&report);
    print_rows(&report, rows);

    if !no_save {
        let dir = output_dir.unwrap_or_else(|| config.export.output_dir.clone());
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_sheet(args: &DataArgs, rows: Option<usize>, path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(args)?;
    let report = backtest(&config)?;

    let rows = rows.unwrap_or(config.export.sheet_rows);
    let mut sink = CsvSheetSink::new(path.unwrap_or_else(|| config.export.sheet_path.clone()));
    write_sheet(&mut sink, &report.frame, &config.export.sheet_columns, rows)?;
    println!(
        "Wrote {} row(s) of {} to {}",
        rows.min(report.bar_count()),
        report.symbol,
        sink.path().display()
    );
    Ok(())
}

/// Prints alerts instead of sending them.
struct StdoutChannel;

impl AlertChannel for StdoutChannel {
    fn name(&self) -> &str {
        "stdout"
    }

    fn send(&self, text: &str) -> Result<(), AlertError> {
        println!("ALERT: {text}");
        Ok(())
    }
}

fn channel_for(config: &SiglabConfig, dry_run: bool) -> Result<Box<dyn AlertChannel>> {
    if dry_run {
        return Ok(Box::new(StdoutChannel));
    }
    let channel = TelegramChannel::from_config(&config.alert)
        .context("set alert.telegram_token / telegram_chat_id or SIGLAB_TELEGRAM_* (or pass --dry-run)")?;
    Ok(Box::new(channel))
}

fn run_alert(args: &DataArgs, dry_run: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = provider_for(&config.data)?;
    let channel = channel_for(&config, dry_run)?;

    let outcome = Monitor::new(&config, provider.as_ref(), channel.as_ref()).check_once()?;
    match outcome.sent {
        Some(text) => println!("Sent via {}: {text}", channel.name()),
        None => println!(
            "{} on {}: {} — no alert",
            outcome.symbol,
            outcome.date,
            outcome.signal.label()
        ),
    }
    Ok(())
}

fn run_monitor(args: &DataArgs, cycles: Option<usize>, dry_run: bool) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = provider_for(&config.data)?;
    let channel = channel_for(&config, dry_run)?;

    println!(
        "Monitoring {} every {}s via {} (Ctrl-C to stop)",
        config.data.symbol,
        config.alert.interval_secs,
        channel.name()
    );
    let stop = Arc::new(AtomicBool::new(false));
    stop_on_ctrl_c(Arc::clone(&stop)).context("failed to install Ctrl-C handler")?;
    let stats = Monitor::new(&config, provider.as_ref(), channel.as_ref()).run(&stop, cycles);
    println!(
        "Monitor finished: {} cycle(s), {} alert(s), {} error(s)",
        stats.cycles, stats.alerts_sent, stats.errors
    );
    Ok(())
}

fn run_train(args: &DataArgs) -> Result<()> {
    let config = resolve_config(args)?;
    let provider = provider_for(&config.data)?;
    let loaded = load_series(
        provider.as_ref(),
        config.data.source,
        &config.data.symbol,
        config.data.period,
        today(),
    )?;
    let frame = indicator_frame(&loaded.series, &config.strategy.params())?;
    let trained = train_classifier(&frame, &config.classifier)
        .context("training skipped (try a longer --period)")?;

    println!();
    println!("=== Classifier ===");
    println!("Symbol:         {}", config.data.symbol);
    println!("Trees:          {}", trained.model.n_trees());
    println!("Train / Test:   {} / {}", trained.train_size, trained.test_size);
    println!("Accuracy:       {:.2}%", trained.accuracy * 100.0);
    match trained.next_up_probability {
        Some(p) => println!("Next bar up:    {:.1}%", p * 100.0),
        None => println!("Next bar up:    n/a (latest bar has undefined features)"),
    }
    println!();
    Ok(())
}

fn print_summary(report: &BacktestReport) {
    let s = &report.summary;
    let p = &report.params;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", report.symbol);
    println!("Period:         {} to {}", report.start_date, report.end_date);
    println!("Bars:           {}", report.bar_count());
    println!(
        "Params:         MA {}/{}, RSI {} ({}/{})",
        p.indicators.short_window,
        p.indicators.long_window,
        p.indicators.rsi_window,
        p.signals.rsi_oversold,
        p.signals.rsi_overbought
    );
    println!("Run id:         {}", &report.run_id[..12]);
    println!();
    println!("--- Performance ---");
    println!("Trades:         {}", s.trade_count);
    if s.degenerate {
        println!("Win Rate:       n/a (no trades)");
    } else {
        println!("Win Rate:       {:.1}%", s.win_rate);
    }
    println!("Total PnL:      {:.2}", s.total_pnl);
    println!("Latest signal:  {}", report.latest_signal().label());
    for gap in &report.insufficient {
        println!("WARNING: {gap}");
    }
    println!();
}

fn print_rows(report: &BacktestReport, rows: usize) {
    let fmt = |v: Option<f64>| v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "-".into());
    println!(
        "{:<12} {:>10} {:>10} {:>10} {:>7} {:>6} {:>5} {:>10} {:>10}",
        "Date", "Close", "Short MA", "Long MA", "RSI", "Signal", "Pos", "Daily", "Cum PnL"
    );
    println!("{}", "-".repeat(89));
    for row in report.frame.tail(rows) {
        let ind = &row.signal.indicators;
        println!(
            "{:<12} {:>10.2} {:>10} {:>10} {:>7} {:>6} {:>5} {:>10} {:>10.2}",
            ind.date,
            ind.close,
            fmt(ind.short_ma),
            fmt(ind.long_ma),
            fmt(ind.rsi),
            row.signal.signal.label(),
            row.position,
            fmt(row.daily_pnl),
            row.cumulative_pnl
        );
    }
    println!();
}
