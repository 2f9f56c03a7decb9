//! scratchcard - command-line shell around the session store.
//!
//! Constructs the one `SessionStore` for the process, restores any cached
//! session, installs it as the ambient provider and runs a single command
//! against it.

mod commands;

use std::io;
use std::rc::Rc;

use anyhow::Result;
use scratchcard_core::{Config, SessionProvider, SessionStore};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::Command;

/// Prefix for the daily rolling log file in the cache directory
const LOG_FILE_PREFIX: &str = "scratchcard.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr and, when the cache directory is usable, to a daily
/// rolling file. The returned guard must live until exit to flush the file.
fn init_tracing(config: &Config) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = config.cache_dir().ok().and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix(LOG_FILE_PREFIX)
            .build(dir)
            .ok()
    });

    let (file_layer, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = Config::load()?;
    let _guard = init_tracing(&config);

    let command = match Command::parse(std::env::args().skip(1))? {
        Some(command) => command,
        None => {
            println!("{}", commands::USAGE);
            return Ok(());
        }
    };

    info!(backend = %config.storage, "scratchcard starting");

    let store = Rc::new(SessionStore::open(config.open_storage()?));
    store.subscribe(|snapshot| debug!(state = %snapshot.state(), "Session changed"));

    SessionProvider::new(store).provide(|| command.run(&config))
}
