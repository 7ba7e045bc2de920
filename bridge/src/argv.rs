//! The natively-owned argument buffer
//!
//! [`NativeArgv`] is the `argc`/`argv` pair a `main`-shaped entry point
//! expects:
//!
//! ```text
//! pointers ──► [ *arg0 | *arg1 | ... | *arg(n-1) | NULL ]
//!                  │       │
//!                  ▼       ▼
//!              "extract\0" "input.pdf\0" ...
//! ```
//!
//! Each argument is a fresh, NUL-terminated copy in its own allocation. The
//! pointer table always has `n + 1` slots, so an empty argument list still
//! hands the entry point a real (non-null) table whose only entry is the
//! terminator.
//!
//! All allocations go through `try_reserve_exact`, and everything acquired
//! so far is owned by locals or by the buffer itself. An early return drops
//! whatever was already copied; nothing has to be freed by hand.

use std::ffi::{c_char, c_int, CStr};
use std::fmt;
use std::mem;
use std::ptr;

use crate::config::NulPolicy;
use crate::error::BridgeError;
use crate::foreign::ForeignArgs;

/// Native `argc`/`argv` buffer, scoped to one invocation
pub struct NativeArgv {
    /// One NUL-terminated buffer per argument
    args: Vec<Box<[u8]>>,
    /// `args.len() + 1` pointers, the last one null
    pointers: Vec<*mut c_char>,
    argc: c_int,
}

impl NativeArgv {
    /// Copy every argument out of `foreign` into native memory
    ///
    /// # Errors
    ///
    /// - `TooManyArguments` if the count does not fit in `c_int`
    /// - `Allocation` if a reservation fails
    /// - `Encoding` / `InteriorNul` if an argument cannot become a C string
    ///
    /// On error every buffer copied so far has already been released.
    ///
    /// # Example
    /// ```
    /// use argv_bridge::{NativeArgv, NulPolicy};
    ///
    /// let argv = NativeArgv::from_foreign(&["extract", "input.pdf"], NulPolicy::Reject).unwrap();
    /// assert_eq!(argv.argc(), 2);
    /// assert_eq!(argv.get(1).unwrap().to_bytes(), b"input.pdf");
    /// ```
    pub fn from_foreign<A>(foreign: &A, policy: NulPolicy) -> Result<Self, BridgeError>
    where
        A: ForeignArgs + ?Sized,
    {
        let count = foreign.len();
        let argc =
            c_int::try_from(count).map_err(|_| BridgeError::TooManyArguments { count })?;

        let mut args: Vec<Box<[u8]>> = Vec::new();
        args.try_reserve_exact(count)
            .map_err(|_| table_allocation_error::<Box<[u8]>>(count))?;

        for index in 0..count {
            let buffer = foreign.with_arg(index, |bytes| copy_argument(index, bytes, policy))??;
            args.push(buffer);
        }

        let mut pointers: Vec<*mut c_char> = Vec::new();
        pointers
            .try_reserve_exact(count + 1)
            .map_err(|_| table_allocation_error::<*mut c_char>(count + 1))?;

        let mut argv = Self {
            args,
            pointers,
            argc,
        };
        argv.refresh_pointers();
        Ok(argv)
    }

    pub fn argc(&self) -> c_int {
        self.argc
    }

    pub fn len(&self) -> usize {
        self.args.len()
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Argument `index` up to its first NUL
    pub fn get(&self, index: usize) -> Option<&CStr> {
        self.args.get(index).map(|buffer| as_c_str(buffer))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &CStr> + '_ {
        self.args.iter().map(|buffer| as_c_str(buffer))
    }

    /// Raw bytes of argument `index`, terminating NUL included
    pub fn bytes_with_nul(&self, index: usize) -> Option<&[u8]> {
        self.args.get(index).map(|buffer| &buffer[..])
    }

    /// `(argc, argv)` for a native call
    ///
    /// The pointer table is rebuilt from exclusive borrows of the argument
    /// buffers, so the callee may write through it. The pointers stay valid
    /// until `self` is next borrowed.
    pub fn as_raw_parts(&mut self) -> (c_int, *mut *mut c_char) {
        self.refresh_pointers();
        (self.argc, self.pointers.as_mut_ptr())
    }

    // Capacity was reserved up front; this never reallocates.
    fn refresh_pointers(&mut self) {
        self.pointers.clear();
        self.pointers
            .extend(self.args.iter_mut().map(|buffer| buffer.as_mut_ptr().cast::<c_char>()));
        self.pointers.push(ptr::null_mut());
    }
}

impl fmt::Debug for NativeArgv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Copy one argument into a fresh `len + 1` byte buffer
fn copy_argument(index: usize, bytes: &[u8], policy: NulPolicy) -> Result<Box<[u8]>, BridgeError> {
    let bytes = match bytes.iter().position(|&b| b == 0) {
        None => bytes,
        Some(position) => match policy {
            NulPolicy::Reject => return Err(BridgeError::InteriorNul { index, position }),
            NulPolicy::Truncate => &bytes[..position],
        },
    };

    let size = bytes.len() + 1;
    let mut buffer: Vec<u8> = Vec::new();
    buffer.try_reserve_exact(size).map_err(|_| {
        log::warn!("failed to reserve {} bytes for argument {}", size, index);
        BridgeError::Allocation {
            index: Some(index),
            bytes: size,
        }
    })?;
    buffer.extend_from_slice(bytes);
    buffer.push(0);
    Ok(buffer.into_boxed_slice())
}

fn table_allocation_error<T>(slots: usize) -> BridgeError {
    let bytes = slots.saturating_mul(mem::size_of::<T>());
    log::warn!("failed to reserve {} bytes for the argument table", bytes);
    BridgeError::Allocation { index: None, bytes }
}

// A callee may have written a NUL anywhere; the final byte is always one.
fn as_c_str(buffer: &[u8]) -> &CStr {
    CStr::from_bytes_until_nul(buffer).unwrap_or_default()
}
