//! Type conversion utilities for FFI boundary
//!
//! Converts between Rust types and PyO3-compatible types (PyDict, PyList, etc.)

use pyo3::exceptions::{
    PyMemoryError, PyOSError, PyOverflowError, PyRuntimeError, PyValueError,
};
use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyDict, PyList, PyString};

use crate::bridge::Invocation;
use crate::config::{BridgeConfig, NulPolicy};
use crate::error::BridgeError;
use crate::foreign::ForeignArgs;

// ========================================================================
// Python list as a foreign argument list
// ========================================================================

/// A Python `list` of `str` or `bytes`
///
/// `str` items are encoded as UTF-8 (a lone surrogate is an encoding
/// failure); `bytes` items are copied as-is. The GIL is held through the
/// `Bound` lifetime, so the list cannot change while it is being copied.
impl ForeignArgs for Bound<'_, PyList> {
    fn len(&self) -> usize {
        PyListMethods::len(self)
    }

    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        let item = self.get_item(index).map_err(|e| BridgeError::Encoding {
            index,
            reason: e.to_string(),
        })?;

        if let Ok(text) = item.downcast::<PyString>() {
            let view = text.to_cow().map_err(|e| BridgeError::Encoding {
                index,
                reason: e.to_string(),
            })?;
            return Ok(f(view.as_bytes()));
        }

        if let Ok(bytes) = item.downcast::<PyBytes>() {
            return Ok(f(bytes.as_bytes()));
        }

        let type_name = item
            .get_type()
            .name()
            .map(|name| name.to_string())
            .unwrap_or_else(|_| "<unknown>".to_string());
        Err(BridgeError::Encoding {
            index,
            reason: format!("expected str or bytes, got {}", type_name),
        })
    }
}

// ========================================================================
// PyDict Extraction Helpers
// ========================================================================

/// Extract a field with a default value if missing.
///
/// # Errors
/// Returns error only if type conversion fails (not if field is missing)
fn extract_with_default<T>(dict: &Bound<'_, PyDict>, key: &str, default: T) -> PyResult<T>
where
    for<'py> T: FromPyObject<'py>,
{
    match dict.get_item(key)? {
        Some(value) => value.extract(),
        None => Ok(default),
    }
}

const CONFIG_FIELDS: [&str; 3] = ["nul_policy", "catch_panics", "log_arguments"];

// ========================================================================
// Configuration Parsers
// ========================================================================

/// Convert Python dict to BridgeConfig
///
/// # Errors
///
/// Raises ValueError if:
/// - An unknown key is present
/// - `nul_policy` is not "reject" or "truncate"
/// - Type conversions fail
pub fn parse_bridge_config(py_config: &Bound<'_, PyDict>) -> PyResult<BridgeConfig> {
    for key in py_config.keys() {
        let key: String = key.extract()?;
        if !CONFIG_FIELDS.contains(&key.as_str()) {
            return Err(PyValueError::new_err(format!(
                "Unknown config field '{}'. Expected one of: {}",
                key,
                CONFIG_FIELDS.join(", ")
            )));
        }
    }

    let defaults = BridgeConfig::default();

    let nul_policy = match py_config.get_item("nul_policy")? {
        Some(value) => {
            let policy: String = value.extract()?;
            match policy.as_str() {
                "reject" | "Reject" => NulPolicy::Reject,
                "truncate" | "Truncate" => NulPolicy::Truncate,
                _ => {
                    return Err(PyValueError::new_err(format!(
                        "Invalid nul_policy: '{}'. Must be 'reject' or 'truncate'",
                        policy
                    )));
                }
            }
        }
        None => defaults.nul_policy,
    };

    Ok(BridgeConfig {
        nul_policy,
        catch_panics: extract_with_default(py_config, "catch_panics", defaults.catch_panics)?,
        log_arguments: extract_with_default(py_config, "log_arguments", defaults.log_arguments)?,
    })
}

/// Convert BridgeConfig to Python dict
pub fn bridge_config_to_py(py: Python<'_>, config: &BridgeConfig) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("nul_policy", config.nul_policy.as_str())?;
    dict.set_item("catch_panics", config.catch_panics)?;
    dict.set_item("log_arguments", config.log_arguments)?;
    Ok(dict.into())
}

/// Convert Invocation to Python dict
pub fn invocation_to_py(py: Python<'_>, invocation: &Invocation) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("id", invocation.id.to_string())?;
    dict.set_item("argc", invocation.argc)?;
    dict.set_item("status", invocation.status.code())?;
    dict.set_item("success", invocation.status.success())?;
    Ok(dict.into())
}

// ========================================================================
// Error mapping
// ========================================================================

/// Map a bridge error onto the closest built-in Python exception
pub fn bridge_error_to_py(err: BridgeError) -> PyErr {
    let message = err.to_string();
    match err {
        BridgeError::Allocation { .. } => PyMemoryError::new_err(message),
        BridgeError::Encoding { .. }
        | BridgeError::InteriorNul { .. }
        | BridgeError::InvalidConfig(_) => PyValueError::new_err(message),
        BridgeError::TooManyArguments { .. } => PyOverflowError::new_err(message),
        BridgeError::Library(_) => PyOSError::new_err(message),
        BridgeError::EntryPointPanicked { .. } => PyRuntimeError::new_err(message),
    }
}
