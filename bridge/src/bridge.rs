//! The invoke operation
//!
//! # Invocation Flow
//!
//! ```text
//! foreign args ──copy──► NativeArgv ──(argc, argv)──► entry point
//!                           │                             │
//!                           └──────── dropped ◄───────────┘ status
//! ```
//!
//! 1. Read the argument count from the foreign list
//! 2. Copy each argument into its own NUL-terminated native buffer
//! 3. Call the entry point once, synchronously
//! 4. Drop the native buffer (also on error and on panic)
//! 5. Hand the entry point's status back unchanged
//!
//! The bridge holds no state between calls, so a failed call cannot affect
//! the next one.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::argv::NativeArgv;
use crate::config::BridgeConfig;
use crate::entry::EntryPoint;
use crate::error::BridgeError;
use crate::foreign::ForeignArgs;

/// Status returned by an entry point, passed through verbatim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExitStatus(i32);

impl ExitStatus {
    pub fn new(code: i32) -> Self {
        Self(code)
    }

    pub fn code(&self) -> i32 {
        self.0
    }

    /// Zero, by the usual process convention
    pub fn success(&self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for i32 {
    fn from(status: ExitStatus) -> Self {
        status.0
    }
}

/// Record of one completed invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    /// Correlates the log lines of one call
    pub id: Uuid,
    pub argc: usize,
    pub status: ExitStatus,
}

impl Invocation {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Marshals foreign arguments into native memory and runs an entry point
///
/// # Example
/// ```
/// use std::ffi::{c_char, c_int};
/// use argv_bridge::{ArgvBridge, NativeMain};
///
/// unsafe extern "C" fn count_args(argc: c_int, _argv: *mut *mut c_char) -> c_int {
///     argc
/// }
///
/// let bridge = ArgvBridge::default();
/// let mut entry = unsafe { NativeMain::new(count_args) };
/// let invocation = bridge.invoke(&["extract", "input.pdf", "output.txt"], &mut entry).unwrap();
/// assert_eq!(invocation.status.code(), 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ArgvBridge {
    config: BridgeConfig,
}

impl ArgvBridge {
    pub fn new(config: BridgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Copy `args` into a native buffer and run `entry` with it
    ///
    /// # Returns
    ///
    /// The invocation record, whose status is whatever the entry point
    /// returned, success or not.
    ///
    /// # Errors
    ///
    /// - Marshalling errors (`Allocation`, `Encoding`, `InteriorNul`,
    ///   `TooManyArguments`): the entry point was never called
    /// - `EntryPointPanicked`: the entry point panicked and `catch_panics`
    ///   is enabled
    pub fn invoke<A, E>(&self, args: &A, entry: &mut E) -> Result<Invocation, BridgeError>
    where
        A: ForeignArgs + ?Sized,
        E: EntryPoint + ?Sized,
    {
        let id = Uuid::new_v4();

        let mut argv = NativeArgv::from_foreign(args, self.config.nul_policy).map_err(|e| {
            log::warn!("[{}] argument marshalling failed: {}", id, e);
            e
        })?;
        let argc = argv.len();

        log::debug!("[{}] invoking entry point with argc={}", id, argc);
        if self.config.log_arguments {
            for (index, arg) in argv.iter().enumerate() {
                log::trace!("[{}] argv[{}] = {:?}", id, index, arg);
            }
        }

        let code = if self.config.catch_panics {
            panic::catch_unwind(AssertUnwindSafe(|| entry.run(&mut argv))).map_err(|payload| {
                let message = panic_message(payload.as_ref());
                log::warn!("[{}] entry point panicked: {}", id, message);
                BridgeError::EntryPointPanicked { message }
            })?
        } else {
            entry.run(&mut argv)
        };
        drop(argv);

        log::debug!("[{}] entry point returned status {}", id, code);
        Ok(Invocation {
            id,
            argc,
            status: ExitStatus(code),
        })
    }
}

/// Invoke `entry` with `args` using the default configuration
pub fn invoke<A, E>(args: &A, entry: &mut E) -> Result<ExitStatus, BridgeError>
where
    A: ForeignArgs + ?Sized,
    E: EntryPoint + ?Sized,
{
    ArgvBridge::default()
        .invoke(args, entry)
        .map(|invocation| invocation.status)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
