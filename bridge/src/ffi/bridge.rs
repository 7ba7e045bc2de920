//! PyO3 wrapper for ArgvBridge
//!
//! This module provides the Python interface to the Rust bridge.

use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList};

use super::types::{bridge_config_to_py, bridge_error_to_py, invocation_to_py, parse_bridge_config};
use crate::argv::NativeArgv;
use crate::bridge::{ArgvBridge as RustArgvBridge, Invocation};
use crate::entry::EntryPoint;
use crate::library::NativeLibrary;

/// Python wrapper for Rust ArgvBridge
///
/// # Example (from Python)
///
/// ```python
/// from argv_bridge import ArgvBridge
///
/// bridge = ArgvBridge({"nul_policy": "reject"})
/// status = bridge.run_library(
///     "./libpdftotext.so",
///     "pdftotext_main",
///     ["pdftotext", "input.pdf", "output.txt"],
/// )
/// print(f"pdftotext exited with {status}")
/// ```
#[pyclass(name = "ArgvBridge")]
pub struct PyArgvBridge {
    inner: RustArgvBridge,
}

#[pymethods]
impl PyArgvBridge {
    /// Create a bridge
    ///
    /// # Arguments
    ///
    /// * `config` - Optional dictionary with `nul_policy`, `catch_panics`
    ///   and `log_arguments`
    ///
    /// # Errors
    ///
    /// Raises ValueError if the configuration is invalid
    #[new]
    #[pyo3(signature = (config=None))]
    pub fn new(config: Option<&Bound<'_, PyDict>>) -> PyResult<Self> {
        let rust_config = match config {
            Some(config) => parse_bridge_config(config)?,
            None => Default::default(),
        };

        Ok(PyArgvBridge {
            inner: RustArgvBridge::new(rust_config),
        })
    }

    /// Current configuration as a dictionary
    #[getter]
    pub fn config(&self, py: Python<'_>) -> PyResult<Py<PyDict>> {
        bridge_config_to_py(py, self.inner.config())
    }

    /// Run a `main`-shaped symbol from a shared library
    ///
    /// # Arguments
    ///
    /// * `path` - Path of the shared library
    /// * `symbol` - Name of an `int (int argc, char **argv)` function
    /// * `args` - List of `str` or `bytes`; becomes `argv` verbatim
    ///
    /// # Returns
    ///
    /// The entry point's status, unchanged
    ///
    /// # Errors
    ///
    /// - OSError if the library or symbol cannot be loaded
    /// - ValueError if an argument cannot be encoded
    /// - MemoryError if the argument buffer cannot be allocated
    pub fn run_library(&self, path: &str, symbol: &str, args: &Bound<'_, PyList>) -> PyResult<i32> {
        Ok(self.invoke_library(path, symbol, args)?.status.code())
    }

    /// Same as `run_library`, returning the invocation record
    ///
    /// # Returns
    ///
    /// Dictionary with:
    /// - `id`: Invocation id (UUID string)
    /// - `argc`: Number of arguments passed
    /// - `status`: The entry point's status
    /// - `success`: Whether the status is zero
    pub fn run_library_report(
        &self,
        py: Python<'_>,
        path: &str,
        symbol: &str,
        args: &Bound<'_, PyList>,
    ) -> PyResult<Py<PyDict>> {
        let invocation = self.invoke_library(path, symbol, args)?;
        invocation_to_py(py, &invocation)
    }

    /// Marshal `args` and hand the native copies to a Python callable
    ///
    /// The callable receives a list of `bytes` (without terminators) and
    /// must return an integer status. Mostly useful for checking what a
    /// native entry point would observe.
    ///
    /// # Example (from Python)
    ///
    /// ```python
    /// status = bridge.run_callable(lambda argv: len(argv), ["a", "b"])
    /// assert status == 2
    /// ```
    pub fn run_callable(&self, entry: &Bound<'_, PyAny>, args: &Bound<'_, PyList>) -> PyResult<i32> {
        let mut callable = PyCallableEntry {
            callable: entry,
            error: None,
        };
        let invocation = self
            .inner
            .invoke(args, &mut callable)
            .map_err(bridge_error_to_py)?;

        match callable.error {
            Some(err) => Err(err),
            None => Ok(invocation.status.code()),
        }
    }
}

impl PyArgvBridge {
    fn invoke_library(
        &self,
        path: &str,
        symbol: &str,
        args: &Bound<'_, PyList>,
    ) -> PyResult<Invocation> {
        let library = NativeLibrary::load(path).map_err(bridge_error_to_py)?;
        // SAFETY: the caller names a symbol it asserts to be `main`-shaped;
        // there is no way to check a C signature at runtime.
        let mut entry = unsafe { library.main_symbol(symbol) }.map_err(bridge_error_to_py)?;
        self.inner.invoke(args, &mut entry).map_err(bridge_error_to_py)
    }
}

/// Run a `main`-shaped library symbol with the default configuration
#[pyfunction]
pub fn run_library(path: &str, symbol: &str, args: &Bound<'_, PyList>) -> PyResult<i32> {
    let bridge = PyArgvBridge {
        inner: RustArgvBridge::default(),
    };
    bridge.run_library(path, symbol, args)
}

/// Entry point backed by a Python callable
///
/// Python exceptions cannot cross `EntryPoint::run`, so the first one is
/// parked in `error` and re-raised once the native buffer is gone.
struct PyCallableEntry<'a, 'py> {
    callable: &'a Bound<'py, PyAny>,
    error: Option<PyErr>,
}

impl EntryPoint for PyCallableEntry<'_, '_> {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        let py = self.callable.py();
        let observed = PyList::new_bound(py, argv.iter().map(|arg| PyBytes::new_bound(py, arg.to_bytes())));

        match self
            .callable
            .call1((observed,))
            .and_then(|status| status.extract::<i32>())
        {
            Ok(status) => status,
            Err(err) => {
                self.error = Some(err);
                -1
            }
        }
    }
}
