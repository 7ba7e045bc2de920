//! Caller-owned argument lists
//!
//! The bridge never holds on to foreign text. It asks for one argument at a
//! time through [`ForeignArgs::with_arg`], and the borrowed bytes only live
//! for the duration of the closure that copies them.

use std::ffi::OsString;

use crate::error::BridgeError;

/// An ordered, read-only sequence of arguments owned by the caller
pub trait ForeignArgs {
    /// Number of arguments, known without touching their contents
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lend the UTF-8 bytes of argument `index` to `f`
    ///
    /// # Errors
    ///
    /// Returns `Encoding` if the argument has no UTF-8 representation.
    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R;
}

impl<S: AsRef<str>> ForeignArgs for [S] {
    fn len(&self) -> usize {
        <[S]>::len(self)
    }

    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        let arg = self.get(index).ok_or_else(|| BridgeError::Encoding {
            index,
            reason: "argument index out of range".to_string(),
        })?;
        Ok(f(arg.as_ref().as_bytes()))
    }
}

impl<S: AsRef<str>> ForeignArgs for Vec<S> {
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        self.as_slice().with_arg(index, f)
    }
}

impl<S: AsRef<str>, const N: usize> ForeignArgs for [S; N] {
    fn len(&self) -> usize {
        N
    }

    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        self.as_slice().with_arg(index, f)
    }
}

/// Process arguments as handed over by the operating system
///
/// On Unix the raw bytes are forwarded untouched. Elsewhere the arguments
/// must be valid Unicode.
#[derive(Debug, Clone, Copy)]
pub struct OsArgs<'a>(pub &'a [OsString]);

impl ForeignArgs for OsArgs<'_> {
    fn len(&self) -> usize {
        self.0.len()
    }

    fn with_arg<R, F>(&self, index: usize, f: F) -> Result<R, BridgeError>
    where
        F: FnOnce(&[u8]) -> R,
    {
        let arg = self.0.get(index).ok_or_else(|| BridgeError::Encoding {
            index,
            reason: "argument index out of range".to_string(),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::ffi::OsStrExt;
            Ok(f(arg.as_bytes()))
        }
        #[cfg(not(unix))]
        {
            let text = arg.to_str().ok_or_else(|| BridgeError::Encoding {
                index,
                reason: format!("{:?} is not valid Unicode", arg),
            })?;
            Ok(f(text.as_bytes()))
        }
    }
}
