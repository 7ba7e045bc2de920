//! FFI Integration Tests for the Python binding
//!
//! Tests how Python lists, configs and callables cross into the bridge.

mod common;

#[cfg(feature = "pyo3")]
mod ffi_tests {
    use argv_bridge::ffi::bridge::PyArgvBridge;
    use argv_bridge::ffi::types::{bridge_error_to_py, parse_bridge_config};
    use argv_bridge::{ArgvBridge, BridgeError, NulPolicy};
    use pyo3::exceptions::{
        PyMemoryError, PyOSError, PyOverflowError, PyRuntimeError, PyValueError,
    };
    use pyo3::prelude::*;
    use pyo3::types::{PyDict, PyList};

    use super::common::{recording, take_observed};

    fn with_python<R>(f: impl for<'py> FnOnce(Python<'py>) -> R) -> R {
        pyo3::prepare_freethreaded_python();
        Python::with_gil(f)
    }

    fn py_list<'py>(py: Python<'py>, expr: &str) -> Bound<'py, PyList> {
        py.eval_bound(expr, None, None)
            .unwrap()
            .downcast_into::<PyList>()
            .unwrap()
    }

    #[test]
    fn test_str_encoded_as_utf8_and_bytes_passed_through() {
        with_python(|py| {
            let args = py_list(py, "['héllo', b'\\xff\\x01', '']");
            let invocation = ArgvBridge::default().invoke(&args, &mut recording()).unwrap();

            assert_eq!(invocation.argc, 3);
            let observed = take_observed().unwrap();
            assert_eq!(
                observed.args,
                vec![
                    "héllo\0".as_bytes().to_vec(),
                    vec![0xFF, 0x01, 0x00],
                    vec![0x00]
                ]
            );
        });
    }

    #[test]
    fn test_lone_surrogate_rejected_before_call() {
        with_python(|py| {
            take_observed();
            let args = py_list(py, "['ok', 'a\\udc80']");
            let err = ArgvBridge::default()
                .invoke(&args, &mut recording())
                .unwrap_err();

            assert!(matches!(err, BridgeError::Encoding { index: 1, .. }));
            assert!(take_observed().is_none());
        });
    }

    #[test]
    fn test_non_text_item_rejected_before_call() {
        with_python(|py| {
            take_observed();
            let args = py_list(py, "['ok', 3]");
            let err = ArgvBridge::default()
                .invoke(&args, &mut recording())
                .unwrap_err();

            match err {
                BridgeError::Encoding { index, reason } => {
                    assert_eq!(index, 1);
                    assert!(reason.contains("int"), "reason was {}", reason);
                }
                other => panic!("unexpected error: {:?}", other),
            }
            assert!(take_observed().is_none());
        });
    }

    #[test]
    fn test_parse_config_from_dict() {
        with_python(|py| {
            let dict = PyDict::new_bound(py);
            dict.set_item("nul_policy", "truncate").unwrap();
            dict.set_item("log_arguments", true).unwrap();

            let config = parse_bridge_config(&dict).unwrap();
            assert_eq!(config.nul_policy, NulPolicy::Truncate);
            assert!(config.catch_panics);
            assert!(config.log_arguments);
        });
    }

    #[test]
    fn test_parse_config_rejects_unknown_key_and_bad_policy() {
        with_python(|py| {
            let unknown = PyDict::new_bound(py);
            unknown.set_item("encoding", "latin-1").unwrap();
            let err = parse_bridge_config(&unknown).unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
            assert!(err.to_string().contains("encoding"));

            let bad_policy = PyDict::new_bound(py);
            bad_policy.set_item("nul_policy", "escape").unwrap();
            let err = parse_bridge_config(&bad_policy).unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));

            let bad_type = PyDict::new_bound(py);
            bad_type.set_item("catch_panics", "yes").unwrap();
            assert!(parse_bridge_config(&bad_type).is_err());
        });
    }

    #[test]
    fn test_errors_map_to_python_exceptions() {
        with_python(|py| {
            let is_memory = |err: BridgeError| bridge_error_to_py(err).is_instance_of::<PyMemoryError>(py);
            let is_value = |err: BridgeError| bridge_error_to_py(err).is_instance_of::<PyValueError>(py);
            let is_overflow = |err: BridgeError| bridge_error_to_py(err).is_instance_of::<PyOverflowError>(py);
            let is_os = |err: BridgeError| bridge_error_to_py(err).is_instance_of::<PyOSError>(py);
            let is_runtime = |err: BridgeError| bridge_error_to_py(err).is_instance_of::<PyRuntimeError>(py);

            assert!(is_memory(BridgeError::Allocation { index: Some(0), bytes: 8 }));
            assert!(is_value(BridgeError::Encoding { index: 0, reason: "bad".into() }));
            assert!(is_value(BridgeError::InteriorNul { index: 0, position: 1 }));
            assert!(is_value(BridgeError::InvalidConfig("bad".into())));
            assert!(is_overflow(BridgeError::TooManyArguments { count: 1 }));
            assert!(is_os(BridgeError::Library("missing".into())));
            assert!(is_runtime(BridgeError::EntryPointPanicked { message: "boom".into() }));
            assert!(!is_memory(BridgeError::Library("missing".into())));
        });
    }

    #[test]
    fn test_run_callable_sees_native_copies() {
        with_python(|py| {
            let bridge = PyArgvBridge::new(None).unwrap();
            let entry = py
                .eval_bound("lambda argv: 40 + len(argv) if argv == [b'a', b'\\xc3\\xa9'] else -9", None, None)
                .unwrap();
            let args = py_list(py, "['a', 'é']");

            assert_eq!(bridge.run_callable(&entry, &args).unwrap(), 42);
        });
    }

    #[test]
    fn test_run_callable_reraises_python_exception() {
        with_python(|py| {
            let bridge = PyArgvBridge::new(None).unwrap();
            let entry = py.eval_bound("lambda argv: int('x')", None, None).unwrap();
            let args = py_list(py, "['a']");

            let err = bridge.run_callable(&entry, &args).unwrap_err();
            assert!(err.is_instance_of::<PyValueError>(py));
        });
    }

    #[test]
    fn test_run_callable_non_integer_status_raises() {
        with_python(|py| {
            let bridge = PyArgvBridge::new(None).unwrap();
            let entry = py.eval_bound("lambda argv: 'done'", None, None).unwrap();
            let args = py_list(py, "[]");

            assert!(bridge.run_callable(&entry, &args).is_err());
        });
    }

    #[test]
    fn test_bridge_config_round_trip_and_missing_library() {
        with_python(|py| {
            let dict = PyDict::new_bound(py);
            dict.set_item("nul_policy", "truncate").unwrap();
            let bridge = PyArgvBridge::new(Some(&dict)).unwrap();

            let config = bridge.config(py).unwrap();
            let policy: String = config
                .bind(py)
                .get_item("nul_policy")
                .unwrap()
                .unwrap()
                .extract()
                .unwrap();
            assert_eq!(policy, "truncate");

            let args = py_list(py, "['a']");
            let err = bridge
                .run_library("/nonexistent/libpdftotext.so", "main", &args)
                .unwrap_err();
            assert!(err.is_instance_of::<PyOSError>(py));
        });
    }
}
