// ── Hotkey chords ─────────────────────────────────────────────────────────────
//
// The two global chords and their `RegisterHotKey` encoding.  No `unsafe`:
// the Win32 calls live in `platform::win32::hotkeys`.

use std::fmt;

/// A modifier key in a global hotkey chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Modifier {
    Alt,
    Ctrl,
    Shift,
    Win,
}

impl Modifier {
    /// `MOD_*` flag for `RegisterHotKey`.
    fn flag(self) -> u32 {
        match self {
            Self::Alt => 0x0001,
            Self::Ctrl => 0x0002,
            Self::Shift => 0x0004,
            Self::Win => 0x0008,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Alt => "Alt",
            Self::Ctrl => "Ctrl",
            Self::Shift => "Shift",
            Self::Win => "Win",
        }
    }
}

/// A global hotkey: at least one modifier plus one letter or digit key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HotkeyChord {
    pub(crate) modifiers: &'static [Modifier],
    pub(crate) key: char,
}

/// Applies the working cursor.
pub(crate) const START_HOTKEY: HotkeyChord = HotkeyChord {
    modifiers: &[Modifier::Shift, Modifier::Alt],
    key: 'Z',
};

/// Restores the original cursors.
pub(crate) const STOP_HOTKEY: HotkeyChord = HotkeyChord {
    modifiers: &[Modifier::Shift, Modifier::Alt],
    key: 'X',
};

impl HotkeyChord {
    /// `(MOD_* flags, virtual-key code)` for `RegisterHotKey`, without
    /// `MOD_NOREPEAT`.
    ///
    /// `None` when the chord has no modifier (a bare key would be taken from
    /// every other program) or the key is not a letter or digit.
    pub(crate) fn registration(&self) -> Option<(u32, u32)> {
        let bits = self.modifiers.iter().fold(0, |bits, m| bits | m.flag());
        if bits == 0 {
            return None;
        }

        // VK_0..VK_9 and VK_A..VK_Z equal their upper-case ASCII codes.
        let key = self.key.to_ascii_uppercase();
        if !(key.is_ascii_uppercase() || key.is_ascii_digit()) {
            return None;
        }
        Some((bits, key as u32))
    }
}

impl fmt::Display for HotkeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in self.modifiers {
            write!(f, "{}+", m.as_str())?;
        }
        write!(f, "{}", self.key.to_ascii_uppercase())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
