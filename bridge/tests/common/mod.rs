//! Shared native entry points for integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::ffi::{c_char, c_int, CStr};

use argv_bridge::NativeMain;

/// What a native `main` saw when it was called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observed {
    pub argc: c_int,
    pub table_is_null: bool,
    /// Each argument's bytes including the terminating NUL
    pub args: Vec<Vec<u8>>,
    /// Addresses of the argument buffers
    pub addresses: Vec<usize>,
    pub terminated: bool,
}

impl Observed {
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| String::from_utf8_lossy(&arg[..arg.len() - 1]).into_owned())
            .collect()
    }
}

thread_local! {
    static OBSERVED: RefCell<Option<Observed>> = const { RefCell::new(None) };
}

/// Records argc/argv and returns argc as its status
pub unsafe extern "C" fn recording_main(argc: c_int, argv: *mut *mut c_char) -> c_int {
    let mut args = Vec::new();
    let mut addresses = Vec::new();
    let mut terminated = false;

    if !argv.is_null() {
        for i in 0..argc as usize {
            let ptr = *argv.add(i);
            addresses.push(ptr as usize);
            args.push(CStr::from_ptr(ptr).to_bytes_with_nul().to_vec());
        }
        terminated = (*argv.add(argc as usize)).is_null();
    }

    let observed = Observed {
        argc,
        table_is_null: argv.is_null(),
        args,
        addresses,
        terminated,
    };
    OBSERVED.with(|cell| *cell.borrow_mut() = Some(observed));
    argc
}

/// Always reports failure with status 2
pub unsafe extern "C" fn failing_main(_argc: c_int, _argv: *mut *mut c_char) -> c_int {
    2
}

/// Overwrites the first byte of every argument, like `strtok` would
pub unsafe extern "C" fn scribbling_main(argc: c_int, argv: *mut *mut c_char) -> c_int {
    for i in 0..argc as usize {
        let ptr = *argv.add(i);
        if *ptr != 0 {
            *ptr = b'#' as c_char;
        }
    }
    0
}

pub fn recording() -> NativeMain {
    unsafe { NativeMain::new(recording_main) }
}

pub fn failing() -> NativeMain {
    unsafe { NativeMain::new(failing_main) }
}

pub fn scribbling() -> NativeMain {
    unsafe { NativeMain::new(scribbling_main) }
}

/// Take the last observation made on this thread
pub fn take_observed() -> Option<Observed> {
    OBSERVED.with(|cell| cell.borrow_mut().take())
}
