// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in cursor-swap return `error::Result<T>`.  No panics
// in production paths; errors surface as user-facing dialogs (see
// `platform::win32::window::show_error_dialog`).

use std::path::PathBuf;

/// Every error that cursor-swap can produce.
#[derive(Debug)]
pub enum CursorError {
    /// A Win32 API call returned a failure code.
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A cursor resource could not be found or is not a cursor at all.
    ResourceMissing {
        /// File path or embedded asset name.
        resource: PathBuf,
        reason: &'static str,
    },

    /// A standard I/O error (temp file create, write, …).
    Io(std::io::Error),
}

impl CursorError {
    pub(crate) fn missing(resource: impl Into<PathBuf>, reason: &'static str) -> Self {
        Self::ResourceMissing {
            resource: resource.into(),
            reason,
        }
    }
}

impl std::fmt::Display for CursorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Win32 { function, code } => {
                write!(f, "{function} failed (error {code:#010x})")
            }
            Self::ResourceMissing { resource, reason } => {
                write!(f, "cursor resource {}: {reason}", resource.display())
            }
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CursorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Win32 { .. } | Self::ResourceMissing { .. } => None,
        }
    }
}

impl From<std::io::Error> for CursorError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

#[cfg(windows)]
impl CursorError {
    /// Wrap a windows-crate error, keeping the name of the failing call.
    pub(crate) fn win32(function: &'static str, e: &windows::core::Error) -> Self {
        Self::Win32 {
            function,
            code: e.code().0 as u32,
        }
    }
}

// Convert a windows-crate error (HRESULT) directly into a CursorError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for CursorError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, CursorError>;

// ── Tests ─────────────────────────────────────────────────────────────────────
