// ── Win32 system cursors ──────────────────────────────────────────────────────
//
// The real `CursorApi`.  Inside `platform::win32` so `unsafe` is permitted per
// crate policy.
//
// Ownership rules the wrappers below encode:
//   • CopyIcon / LoadCursorFromFileW return a cursor we must DestroyCursor.
//   • LoadImageW(.., LR_SHARED) returns a shared system cursor that must NOT
//     be destroyed; it is only ever copied.
//   • SetSystemCursor destroys the cursor it is handed, so a successfully
//     installed `OwnedCursor` is forgotten rather than dropped.

#![allow(unsafe_code)]

use std::{os::windows::ffi::OsStrExt, path::Path};

use windows::{
    core::PCWSTR,
    Win32::UI::WindowsAndMessaging::{
        CopyIcon, DestroyCursor, LoadCursorFromFileW, LoadImageW, SetSystemCursor,
        SystemParametersInfoW, HCURSOR, HICON, IMAGE_CURSOR, LR_SHARED, SPIF_SENDCHANGE,
        SPI_SETCURSORS, SYSTEM_CURSOR_ID,
    },
};

use crate::{
    cursor::{CursorApi, CursorRole},
    error::{CursorError, Result},
};

// ── OwnedCursor ───────────────────────────────────────────────────────────────

/// RAII handle to a cursor this process created.
///
/// `DestroyCursor` is called on `Drop` unless ownership was handed to the
/// system with `into_system`.
pub(crate) struct OwnedCursor(HCURSOR);

impl OwnedCursor {
    /// Give up ownership without destroying the handle; the system now
    /// owns it.
    fn into_system(self) {
        std::mem::forget(self);
    }
}

impl Drop for OwnedCursor {
    fn drop(&mut self) {
        // SAFETY: self.0 came from CopyIcon or LoadCursorFromFileW, is not a
        // shared cursor, and has not been destroyed or installed since.
        unsafe {
            let _ = DestroyCursor(self.0);
        }
    }
}

// ── Win32Cursors ──────────────────────────────────────────────────────────────

/// System cursor calls from `user32`.
pub(crate) struct Win32Cursors;

impl CursorApi for Win32Cursors {
    type Cursor = OwnedCursor;

    fn copy_system(&mut self, role: CursorRole) -> Result<OwnedCursor> {
        // MAKEINTRESOURCE: the OCR_* id travels in the low word of the pointer.
        let name = PCWSTR(role.ocr_id() as usize as *const u16);

        // SAFETY: `name` is an integer resource id, which LoadImageW accepts in
        // place of a string when hinst is null.  LR_SHARED returns the system's
        // own copy; we never destroy it.
        let shared = unsafe { LoadImageW(None, name, IMAGE_CURSOR, 0, 0, LR_SHARED) }
            .map_err(|e| CursorError::win32("LoadImageW", &e))?;

        // SAFETY: `shared` is a valid cursor handle for the rest of the session.
        // CopyIcon on a cursor yields a new cursor (the CopyCursor macro).
        let copy = unsafe { CopyIcon(HICON(shared.0)) }
            .map_err(|e| CursorError::win32("CopyIcon", &e))?;

        Ok(OwnedCursor(HCURSOR(copy.0)))
    }

    fn load_from_file(&mut self, path: &Path) -> Result<OwnedCursor> {
        let wide: Vec<u16> = path
            .as_os_str()
            .encode_wide()
            .chain(std::iter::once(0))
            .collect();

        // SAFETY: `wide` is a valid null-terminated UTF-16 path that outlives
        // the call.
        let cursor = unsafe { LoadCursorFromFileW(PCWSTR(wide.as_ptr())) }
            .map_err(|e| CursorError::win32("LoadCursorFromFileW", &e))?;

        Ok(OwnedCursor(cursor))
    }

    fn install(&mut self, cursor: OwnedCursor, role: CursorRole) -> Result<()> {
        // SAFETY: cursor.0 is a live cursor we own.  On success the system
        // takes it over and destroys it; on failure it is still ours and the
        // early return drops (destroys) it.
        unsafe { SetSystemCursor(cursor.0, SYSTEM_CURSOR_ID(role.ocr_id())) }
            .map_err(|e| CursorError::win32("SetSystemCursor", &e))?;
        cursor.into_system();
        Ok(())
    }

    fn reload_scheme(&mut self) -> Result<()> {
        // SAFETY: SPI_SETCURSORS takes no buffer (uiParam 0, pvParam null).
        unsafe { SystemParametersInfoW(SPI_SETCURSORS, 0, None, SPIF_SENDCHANGE) }
            .map_err(|e| CursorError::win32("SystemParametersInfoW", &e))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_system_leaves_the_handle_alive() {
        let cursor = Win32Cursors
            .copy_system(CursorRole::Normal)
            .expect("copy arrow cursor");
        let handle = cursor.0;
        cursor.into_system();

        // Nothing destroyed it, so exactly one DestroyCursor succeeds.
        // SAFETY: handle came from CopyIcon and was forgotten, not destroyed.
        unsafe { DestroyCursor(handle) }.expect("handle still live");
    }
}
