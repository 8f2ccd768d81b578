// ── Platform abstraction layer ────────────────────────────────────────────────
//
// All OS-specific code lives below this module; the cursor state machine in
// `crate::cursor` only sees the `CursorApi` trait.  All Win32 FFI is confined
// to the `win32` sub-module and never leaks outward.

#[cfg(windows)]
pub mod win32;
