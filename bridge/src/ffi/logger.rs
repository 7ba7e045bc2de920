//! Forwards `log` records to Python's `logging` module.

use log::{Level, LevelFilter, Log, Metadata, Record};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyModule;

/// Logger for the `log` facade that hands records to `logging.getLogger(target)`.
pub struct PyLogger;

impl Log for PyLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = match record.level() {
            Level::Error => ERROR,
            Level::Warn => WARNING,
            Level::Info => INFO,
            Level::Debug | Level::Trace => DEBUG,
        };
        let message = record.args().to_string();
        let target = record.target().replace("::", ".");

        Python::with_gil(|py| {
            let result = PyModule::import_bound(py, "logging")
                .and_then(|logging| logging.call_method1("getLogger", (target,)))
                .and_then(|logger| logger.call_method1("log", (level, message)));
            if let Err(err) = result {
                err.print(py);
            }
        });
    }

    fn flush(&self) {}
}

/// Install the Python logger
///
/// # Arguments
///
/// * `level` - One of "ERROR", "WARNING", "INFO", "DEBUG", "TRACE"
///
/// # Returns
///
/// False if a logger was already installed (the level is still updated)
#[pyfunction]
#[pyo3(signature = (level="INFO"))]
pub fn init_logging(level: &str) -> PyResult<bool> {
    static LOGGER: PyLogger = PyLogger;

    let filter = parse_level(level)
        .ok_or_else(|| PyValueError::new_err(format!("Invalid log level: '{}'", level)))?;
    let installed = log::set_logger(&LOGGER).is_ok();
    log::set_max_level(filter);
    Ok(installed)
}

fn parse_level(level: &str) -> Option<LevelFilter> {
    match level.to_ascii_uppercase().as_str() {
        "OFF" => Some(LevelFilter::Off),
        "ERROR" => Some(LevelFilter::Error),
        "WARNING" | "WARN" => Some(LevelFilter::Warn),
        "INFO" => Some(LevelFilter::Info),
        "DEBUG" => Some(LevelFilter::Debug),
        "TRACE" => Some(LevelFilter::Trace),
        _ => None,
    }
}

// Python `logging` numeric levels
const ERROR: u32 = 40;
const WARNING: u32 = 30;
const INFO: u32 = 20;
const DEBUG: u32 = 10;
