//! Entry point shapes the bridge can invoke
//!
//! Two kinds of callee are supported:
//!
//! - **Raw `main`**: `unsafe extern "C" fn(c_int, *mut *mut c_char) -> c_int`,
//!   either as a function pointer ([`NativeMain`]) or resolved from a shared
//!   library ([`LibraryMain`](crate::LibraryMain)).
//! - **Re-entrant library call**: [`RunAsLibrary`], which receives the
//!   arguments as C strings plus an output sink, and is expected to be safe
//!   to run any number of times in one process.

use std::ffi::{c_char, c_int, CStr};
use std::io::Write;

use crate::argv::NativeArgv;

/// The conventional `main(argc, argv)` signature
pub type RawMain = unsafe extern "C" fn(argc: c_int, argv: *mut *mut c_char) -> c_int;

/// Something that can be called with a native argument buffer
pub trait EntryPoint {
    /// Run once with `argv`, returning the callee's status untouched
    fn run(&mut self, argv: &mut NativeArgv) -> i32;
}

impl<E: EntryPoint + ?Sized> EntryPoint for &mut E {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        (**self).run(argv)
    }
}

impl<E: EntryPoint + ?Sized> EntryPoint for Box<E> {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        (**self).run(argv)
    }
}

/// A `main`-shaped function pointer
#[derive(Debug, Clone, Copy)]
pub struct NativeMain {
    func: RawMain,
}

impl NativeMain {
    /// Wrap a raw entry point
    ///
    /// # Safety
    ///
    /// `func` must read at most `argc` arguments plus the terminating null
    /// pointer and must not keep any of the pointers after it returns.
    pub unsafe fn new(func: RawMain) -> Self {
        Self { func }
    }
}

impl EntryPoint for NativeMain {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        let (argc, raw) = argv.as_raw_parts();
        // SAFETY: upheld by the contract of `NativeMain::new`; `raw` points
        // to `argc + 1` valid pointers owned by `argv`.
        unsafe { (self.func)(argc, raw) }
    }
}

/// A re-entrant `runAsLibrary(argv) -> status` entry point
///
/// Unlike a process `main`, an implementation must not rely on one-time
/// process initialisation and writes its output to `out` instead of a
/// global stream.
pub trait RunAsLibrary {
    fn run_as_library(&mut self, args: &[&CStr], out: &mut dyn Write) -> i32;
}

impl<F> RunAsLibrary for F
where
    F: FnMut(&[&CStr], &mut dyn Write) -> i32,
{
    fn run_as_library(&mut self, args: &[&CStr], out: &mut dyn Write) -> i32 {
        self(args, out)
    }
}

/// Adapts a [`RunAsLibrary`] and its output sink to [`EntryPoint`]
///
/// # Example
/// ```
/// use std::ffi::CStr;
/// use std::io::Write;
/// use argv_bridge::{ArgvBridge, LibraryEntry};
///
/// let echo = |args: &[&CStr], out: &mut dyn Write| {
///     for arg in args {
///         writeln!(out, "{}", arg.to_string_lossy()).unwrap();
///     }
///     0
/// };
/// let mut entry = LibraryEntry::new(echo, Vec::new());
/// ArgvBridge::default().invoke(&["a", "b"], &mut entry).unwrap();
/// assert_eq!(entry.sink(), b"a\nb\n");
/// ```
pub struct LibraryEntry<L, W> {
    library: L,
    sink: W,
}

impl<L: RunAsLibrary, W: Write> LibraryEntry<L, W> {
    pub fn new(library: L, sink: W) -> Self {
        Self { library, sink }
    }

    pub fn sink(&self) -> &W {
        &self.sink
    }

    pub fn into_parts(self) -> (L, W) {
        (self.library, self.sink)
    }
}

impl<L: RunAsLibrary, W: Write> EntryPoint for LibraryEntry<L, W> {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        let args: Vec<&CStr> = argv.iter().collect();
        let status = self.library.run_as_library(&args, &mut self.sink);
        if let Err(e) = self.sink.flush() {
            log::warn!("failed to flush entry point output: {}", e);
        }
        status
    }
}
