use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "siglab_core=info,siglab_runner=info,siglab_cli=info,siglab_tui=info,warn";

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("siglab_core=debug,siglab_runner=debug,siglab_cli=debug,warn")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    })
}

/// Install a compact stderr subscriber. `RUST_LOG` overrides the filter.
pub fn init_tracing(verbose: bool) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(fmt::layer().with_writer(io::stderr).with_target(true).compact())
        .try_init();
}

/// Install a subscriber that appends to `{dir}/siglab.log`.
///
/// Used by the terminal UI, which owns stdout and stderr while running.
pub fn init_file_tracing(dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join("siglab.log");
    let file: File = OpenOptions::new().create(true).append(true).open(&path)?;

    let _ = tracing_subscriber::registry()
        .with(env_filter(false))
        .with(fmt::layer().with_writer(Mutex::new(file)).with_ansi(false))
        .try_init();
    Ok(path)
}
