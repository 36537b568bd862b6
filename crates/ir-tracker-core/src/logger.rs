//! Stderr logging for the tracker binaries and tests.
//!
//! Records from the `ir_tracker*` crates pass at the requested level, records
//! from other crates only at `warn` and above. Lines look like
//! `[  1.234s DEBUG ir_tracker::tracker] message`, with the time measured
//! from installation so per-frame logs can be lined up against sensor
//! timestamps.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, fmt::format::FmtSpan, util::SubscriberInitExt, EnvFilter};

const OWN_TARGET_PREFIX: &str = "ir_tracker";

struct TrackerLogger {
    own_level: LevelFilter,
    started: Instant,
}

impl TrackerLogger {
    fn threshold(&self, target: &str) -> LevelFilter {
        if target.starts_with(OWN_TARGET_PREFIX) {
            self.own_level
        } else {
            self.own_level.min(LevelFilter::Warn)
        }
    }
}

impl Log for TrackerLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.threshold(metadata.target())
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let secs = self.started.elapsed().as_secs_f64();
        let mut err = std::io::stderr().lock();
        let _ = match record.level() {
            Level::Error | Level::Warn => writeln!(
                err,
                "[{secs:8.3}s {:>5} {}] {} ({}:{})",
                record.level(),
                record.target(),
                record.args(),
                record.file().unwrap_or("?"),
                record.line().unwrap_or(0),
            ),
            _ => writeln!(
                err,
                "[{secs:8.3}s {:>5} {}] {}",
                record.level(),
                record.target(),
                record.args()
            ),
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<TrackerLogger> = OnceLock::new();

/// Install the stderr logger; `level` applies to the `ir_tracker*` crates.
///
/// Only the first call has an effect.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_some() {
        return Ok(());
    }
    let logger = LOGGER.get_or_init(|| TrackerLogger {
        own_level: level,
        started: Instant::now(),
    });
    log::set_logger(logger)?;
    log::set_max_level(level);
    Ok(())
}

/// Install a `tracing-subscriber` formatter driven by `RUST_LOG`
/// (default `ir_tracker=info`).
///
/// Span-close events report the time spent in blob detection, validation,
/// correspondence search and pose solving.
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,ir_tracker=info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().flatten_event(true).finish().try_init()
    } else {
        builder.with_timer(fmt::time::Uptime::default()).finish().try_init()
    };
}
