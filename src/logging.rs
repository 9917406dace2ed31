//! `log` sink for the browser console.
//!
//! Library code logs through the `log` facade. In the browser [`init`] routes
//! those records to `console.*` via `web-sys`; native hosts install their own
//! logger (for example `env_logger`) instead.

use std::fmt::Write;

use log::kv::{Error as KvError, Key, Value, VisitSource};
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;
use web_sys::console;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = JsValue::from_str(&format_record(record));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug => console::debug_1(&line),
            Level::Trace => console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Install the console logger at `Info` level.
pub fn init() {
    init_with_level(LevelFilter::Info);
}

/// Install the console logger at the given level.
///
/// A logger that is already installed (ours or the host's) is kept; only the
/// maximum level changes.
pub fn init_with_level(level: LevelFilter) {
    // Err only means another logger won the race
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

/// `[target] message key=value ...`
fn format_record(record: &Record<'_>) -> String {
    let mut line = format!("[{}] {}", record.target(), record.args());
    let mut writer = KeyValueWriter(&mut line);
    let _ = record.key_values().visit(&mut writer);
    line
}

struct KeyValueWriter<'a>(&'a mut String);

impl<'kvs> VisitSource<'kvs> for KeyValueWriter<'_> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), KvError> {
        let _ = write!(self.0, " {key}={value}");
        Ok(())
    }
}
