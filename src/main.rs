// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except `platform::win32` (Win32 FFI).
// Each unsafe block in that module MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]

// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Off Windows only the cursor core is compiled (and tested); nothing calls it.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod cursor;
mod error;
mod hotkey;
mod platform;

use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();

    #[cfg(windows)]
    {
        if let Err(e) = platform::win32::window::run() {
            // Startup failed before or during the message loop.
            // Show a modal error dialog, the only safe output path in a GUI app.
            tracing::error!(error = %e, "cursor-swap stopped");
            platform::win32::window::show_error_dialog(None, &e.to_string());
            std::process::exit(1);
        }
    }

    #[cfg(not(windows))]
    {
        tracing::error!("cursor-swap replaces Windows system cursors and only runs on Windows");
        std::process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `cursor_swap=info`).
fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("cursor_swap=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
