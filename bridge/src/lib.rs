//! argv-bridge - Rust Engine
//!
//! Runs a native command-line entry point in-process, marshalling a foreign
//! runtime's string array into an `argc`/`argv` buffer for the call.
//!
//! # Architecture
//!
//! - **foreign**: Read-only views over caller-owned argument lists
//! - **argv**: The natively-owned `argc`/`argv` buffer
//! - **entry**: Entry point shapes (raw `main`, library symbol, re-entrant library call)
//! - **bridge**: The invoke operation and its invocation record
//! - **library**: Shared library loading
//! - **sink**: Injectable output sinks for re-entrant entry points
//!
//! # Critical Invariants
//!
//! 1. `argc` always equals the foreign list length, order preserved
//! 2. Every argument is copied; nothing aliases foreign memory
//! 3. The native buffer is released on every exit path
//! 4. Text crosses the boundary as UTF-8

// Module declarations
pub mod argv;
pub mod bridge;
pub mod config;
pub mod entry;
pub mod error;
pub mod foreign;
pub mod library;
pub mod sink;

// Re-exports for convenience
pub use argv::NativeArgv;
pub use bridge::{invoke, ArgvBridge, ExitStatus, Invocation};
pub use config::{BridgeConfig, NulPolicy};
pub use entry::{EntryPoint, LibraryEntry, NativeMain, RawMain, RunAsLibrary};
pub use error::BridgeError;
pub use foreign::{ForeignArgs, OsArgs};
pub use library::{LibraryMain, NativeLibrary};
pub use sink::{CaptureSink, LogSink};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn argv_bridge(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::bridge::PyArgvBridge>()?;
    m.add_function(wrap_pyfunction!(ffi::bridge::run_library, m)?)?;
    m.add_function(wrap_pyfunction!(ffi::logger::init_logging, m)?)?;
    Ok(())
}
