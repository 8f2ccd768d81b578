// ── Global hotkeys ────────────────────────────────────────────────────────────
//
// RegisterHotKey / UnregisterHotKey for the start and stop chords.  A chord
// another program already owns, or one that cannot be registered safely, is
// logged and skipped; the buttons keep working.

#![allow(unsafe_code)]

use tracing::{info, warn};
use windows::Win32::{
    Foundation::HWND,
    UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
    },
};

use crate::{
    app::Action,
    hotkey::{HotkeyChord, START_HOTKEY, STOP_HOTKEY},
};

// ── Hotkey IDs ────────────────────────────────────────────────────────────────

const HOTKEY_START: i32 = 1;
const HOTKEY_STOP: i32 = 2;

/// Map a `WM_HOTKEY` id to its action.
pub(crate) fn action_for(id: i32) -> Option<Action> {
    match id {
        HOTKEY_START => Some(Action::Start),
        HOTKEY_STOP => Some(Action::Stop),
        _ => None,
    }
}

// ── Registration ──────────────────────────────────────────────────────────────

/// Hotkeys registered to one window; unregistered on `Drop`.
pub(crate) struct Hotkeys {
    hwnd: HWND,
    ids: Vec<i32>,
}

impl Hotkeys {
    pub(crate) fn register(hwnd: HWND) -> Self {
        Self::register_chords(hwnd, &[(HOTKEY_START, START_HOTKEY), (HOTKEY_STOP, STOP_HOTKEY)])
    }

    fn register_chords(hwnd: HWND, chords: &[(i32, HotkeyChord)]) -> Self {
        let mut ids = Vec::with_capacity(chords.len());

        for &(id, chord) in chords {
            let Some((bits, vk)) = chord.registration() else {
                warn!(%chord, "hotkey needs a modifier and a letter or digit, skipping");
                continue;
            };
            // MOD_NOREPEAT: holding the chord down fires once.
            let modifiers = HOT_KEY_MODIFIERS(bits) | MOD_NOREPEAT;

            // SAFETY: hwnd is our live main window; WM_HOTKEY is posted to its
            // thread's queue.
            match unsafe { RegisterHotKey(hwnd, id, modifiers, vk) } {
                Ok(()) => {
                    info!(%chord, "hotkey registered");
                    ids.push(id);
                }
                Err(e) => warn!(%chord, error = %e, "hotkey unavailable"),
            }
        }

        Self { hwnd, ids }
    }
}

impl Drop for Hotkeys {
    fn drop(&mut self) {
        for &id in &self.ids {
            // SAFETY: id was registered on self.hwnd by `register`.
            unsafe {
                let _ = UnregisterHotKey(self.hwnd, id);
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
