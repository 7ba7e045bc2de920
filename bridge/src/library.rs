//! Native library loading and entry point lookup.

use std::ffi::CString;
use std::path::Path;

use libloading::{Library, Symbol};

use crate::argv::NativeArgv;
use crate::entry::{EntryPoint, RawMain};
use crate::error::BridgeError;

/// A loaded shared library exposing one or more `main`-shaped symbols.
pub struct NativeLibrary {
    library: Library,
    /// Path to the library (for diagnostics)
    path: String,
}

impl NativeLibrary {
    /// Load a shared library from a path.
    ///
    /// Loading runs the library's initialisers, which is as trusted as
    /// running the library itself.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let path = path.as_ref();

        let library = unsafe { Library::new(path) }.map_err(|e| {
            BridgeError::Library(format!("Failed to load library '{}': {}", path.display(), e))
        })?;
        log::debug!("loaded native library {}", path.display());

        Ok(Self {
            library,
            path: path.display().to_string(),
        })
    }

    /// Load a library by base name (e.g. "pdftotext"), searching the
    /// current directory first and then the system paths.
    pub fn load_by_name(name: &str) -> Result<Self, BridgeError> {
        let lib_name = Self::platform_lib_name(name);

        if let Ok(lib) = Self::load(Path::new(".").join(&lib_name)) {
            return Ok(lib);
        }

        let library = unsafe { Library::new(&lib_name) }.map_err(|e| {
            BridgeError::Library(format!(
                "Failed to load library '{}' (tried '{}'): {}",
                name, lib_name, e
            ))
        })?;

        Ok(Self {
            library,
            path: lib_name,
        })
    }

    fn platform_lib_name(name: &str) -> String {
        #[cfg(target_os = "windows")]
        {
            format!("{}.dll", name)
        }
        #[cfg(target_os = "macos")]
        {
            format!("lib{}.dylib", name)
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos")))]
        {
            format!("lib{}.so", name)
        }
    }

    /// Resolve a `main`-shaped symbol.
    ///
    /// # Safety
    ///
    /// The symbol must have the [`RawMain`] signature and satisfy the
    /// contract of [`NativeMain::new`](crate::NativeMain::new).
    pub unsafe fn main_symbol(&self, name: &str) -> Result<LibraryMain<'_>, BridgeError> {
        let c_name = CString::new(name)
            .map_err(|_| BridgeError::Library(format!("Invalid symbol name: {:?}", name)))?;

        let symbol = self
            .library
            .get::<RawMain>(c_name.as_bytes_with_nul())
            .map_err(|e| {
                BridgeError::Library(format!(
                    "Symbol '{}' not found in '{}': {}",
                    name, self.path, e
                ))
            })?;

        Ok(LibraryMain {
            symbol,
            name: name.to_string(),
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

/// A `main`-shaped symbol borrowed from a [`NativeLibrary`]
pub struct LibraryMain<'lib> {
    symbol: Symbol<'lib, RawMain>,
    name: String,
}

impl LibraryMain<'_> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl EntryPoint for LibraryMain<'_> {
    fn run(&mut self, argv: &mut NativeArgv) -> i32 {
        let (argc, raw) = argv.as_raw_parts();
        // SAFETY: the signature was vouched for in `main_symbol`; the library
        // outlives `self`.
        unsafe { (*self.symbol)(argc, raw) }
    }
}
