// ── Cursor sources ────────────────────────────────────────────────────────────
//
// Where replacement cursors come from: the animated cursor compiled into the
// binary, or a cursor file shipped with Windows.  `LoadCursorFromFileW` only
// takes a path, so the embedded asset is written to a temp file that lives
// exactly as long as the load.

use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use tempfile::TempPath;

use crate::error::{CursorError, Result};

use super::CursorKind;

// ── Built-in resources ────────────────────────────────────────────────────────

/// Embedded animated "working" cursor (8-frame spinner, 32×32).
pub(crate) const WORKING_ANI: &[u8] = include_bytes!("../../assets/working.ani");
const WORKING_ANI_NAME: &str = "working.ani";

const ERROR_CURSOR_PATH: &str = r"C:\Windows\Cursors\aero_unavail_l.cur";
const ARROW_CURSOR_PATH: &str = r"C:\Windows\Cursors\aero_arrow.cur";
const BUSY_CURSOR_PATH: &str = r"C:\Windows\Cursors\aero_busy.ani";

// ── CursorSource ──────────────────────────────────────────────────────────────

/// A cursor resource the OS can load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CursorSource {
    /// Bytes compiled into the binary.
    Embedded {
        name: &'static str,
        bytes: &'static [u8],
    },
    /// A `.cur` / `.ani` file on disk.
    File(PathBuf),
}

impl CursorSource {
    pub(crate) fn working() -> Self {
        Self::Embedded {
            name: WORKING_ANI_NAME,
            bytes: WORKING_ANI,
        }
    }

    /// Produce a path the OS loader can read.
    ///
    /// Embedded bytes are validated and written to a temp file that is
    /// deleted when the returned value is dropped, whether or not the load
    /// that follows succeeds.
    pub(crate) fn materialize(&self) -> Result<Materialized<'_>> {
        match self {
            Self::Embedded { name, bytes } => {
                validate_cursor_bytes(name, bytes)?;
                let suffix = Path::new(name)
                    .extension()
                    .map(|ext| format!(".{}", ext.to_string_lossy()))
                    .unwrap_or_default();
                let mut file = tempfile::Builder::new()
                    .prefix("cursor-swap-")
                    .suffix(&suffix)
                    .tempfile()?;
                file.write_all(bytes)?;
                file.flush()?;
                // Close our handle; the path still deletes itself on drop.
                Ok(Materialized::Temp(file.into_temp_path()))
            }
            Self::File(path) => {
                if !path.is_file() {
                    return Err(CursorError::missing(path, "file not found"));
                }
                Ok(Materialized::Borrowed(path))
            }
        }
    }
}

/// A cursor file ready for loading.  See [`CursorSource::materialize`].
#[derive(Debug)]
pub(crate) enum Materialized<'a> {
    Temp(TempPath),
    Borrowed(&'a Path),
}

impl Materialized<'_> {
    pub(crate) fn path(&self) -> &Path {
        match self {
            Self::Temp(p) => &**p,
            Self::Borrowed(p) => *p,
        }
    }
}

/// Cheap header check so a broken asset fails before any OS call.
///
/// Accepts RIFF `ACON` animated cursors and ICO/CUR images.
fn validate_cursor_bytes(name: &str, bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(CursorError::missing(name, "empty resource"));
    }
    let animated = bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"ACON";
    // ICONDIR: reserved 0, type 1 (icon) or 2 (cursor)
    let static_cursor = bytes.len() >= 6 && matches!(&bytes[..4], [0, 0, 1 | 2, 0]);
    if animated || static_cursor {
        Ok(())
    } else {
        Err(CursorError::missing(name, "not a cursor file"))
    }
}

// ── CursorSources ─────────────────────────────────────────────────────────────

/// The source used for each `CursorKind`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CursorSources {
    pub(crate) working: CursorSource,
    pub(crate) error: PathBuf,
    pub(crate) arrow: PathBuf,
    pub(crate) busy: PathBuf,
}

impl Default for CursorSources {
    fn default() -> Self {
        Self {
            working: CursorSource::working(),
            error: PathBuf::from(ERROR_CURSOR_PATH),
            arrow: PathBuf::from(ARROW_CURSOR_PATH),
            busy: PathBuf::from(BUSY_CURSOR_PATH),
        }
    }
}

impl CursorSources {
    pub(crate) fn source_for(&self, kind: CursorKind) -> CursorSource {
        match kind {
            CursorKind::Working => self.working.clone(),
            CursorKind::Error => CursorSource::File(self.error.clone()),
            CursorKind::Arrow => CursorSource::File(self.arrow.clone()),
            CursorKind::Busy => CursorSource::File(self.busy.clone()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
