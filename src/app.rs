// ── Application state ─────────────────────────────────────────────────────────
//
// A single `App` is created on startup and owned by `WindowState` for the
// lifetime of the main window.  All mutations happen on the UI thread; there
// is no global mutable state.

use crate::{
    cursor::{CursorApi, CursorKind, CursorSources, CursorToggle, Outcome},
    error::Result,
    hotkey::STOP_HOTKEY,
};

// ── Actions ───────────────────────────────────────────────────────────────────

/// Everything a button or hotkey can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    Start,
    Stop,
    Error,
    Arrow,
    Busy,
}

impl Action {
    /// Button order in the main window.
    pub(crate) const ALL: [Self; 5] = [Self::Start, Self::Stop, Self::Error, Self::Arrow, Self::Busy];

    /// Button caption.
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::Stop => "Stop",
            Self::Error => "Error",
            Self::Arrow => "Arrow",
            Self::Busy => "Busy",
        }
    }

    /// The replacement this action applies; `None` for `Stop`.
    fn kind(self) -> Option<CursorKind> {
        match self {
            Self::Start => Some(CursorKind::Working),
            Self::Error => Some(CursorKind::Error),
            Self::Arrow => Some(CursorKind::Arrow),
            Self::Busy => Some(CursorKind::Busy),
            Self::Stop => None,
        }
    }
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level application state.
pub(crate) struct App<A: CursorApi> {
    cursors: CursorToggle<A>,
}

impl<A: CursorApi> App<A> {
    pub(crate) fn new(api: A) -> Self {
        Self::with_sources(api, CursorSources::default())
    }

    pub(crate) fn with_sources(api: A, sources: CursorSources) -> Self {
        Self {
            cursors: CursorToggle::new(api, sources),
        }
    }

    /// Run one action.  Only replacing the cursor can fail; the toggle has
    /// already rolled back by the time an error comes out of here.
    pub(crate) fn dispatch(&mut self, action: Action) -> Result<Outcome> {
        match action.kind() {
            Some(kind) => self.cursors.apply(kind),
            None => Ok(self.cursors.restore()),
        }
    }

    /// Text for the status line under the buttons.
    pub(crate) fn status_text(&self) -> String {
        match self.cursors.active_kind() {
            Some(kind) => format!(
                "Cursor: {} (Stop or {} to restore)",
                kind.as_str(),
                STOP_HOTKEY
            ),
            None => "Cursor: system default".to_owned(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::fake::{FakeCursors, LedgerRef};

    fn app() -> (App<FakeCursors>, LedgerRef) {
        let (api, ledger) = FakeCursors::new();
        (App::new(api), ledger)
    }

    #[test]
    fn status_starts_at_system_default() {
        let (app, _) = app();
        assert_eq!(app.status_text(), "Cursor: system default");
    }

    #[test]
    fn start_then_stop() {
        let (mut app, ledger) = app();
        assert_eq!(app.dispatch(Action::Start).expect("start"), Outcome::Changed);
        assert_eq!(
            app.status_text(),
            "Cursor: working (Stop or Shift+Alt+X to restore)"
        );

        assert_eq!(app.dispatch(Action::Stop).expect("stop"), Outcome::Changed);
        assert_eq!(app.status_text(), "Cursor: system default");
        assert_eq!(ledger.borrow().live_count(), 0);
    }

    #[test]
    fn double_click_start_is_ignored() {
        let (mut app, _) = app();
        app.dispatch(Action::Start).expect("start");
        assert_eq!(app.dispatch(Action::Start).expect("again"), Outcome::Unchanged);
    }

    #[test]
    fn stop_without_start_is_ignored() {
        let (mut app, ledger) = app();
        assert_eq!(app.dispatch(Action::Stop).expect("stop"), Outcome::Unchanged);
        assert_eq!(ledger.borrow().calls, 0);
    }

    #[test]
    fn failed_action_leaves_default_status() {
        let (api, ledger) = FakeCursors::new();
        let sources = CursorSources {
            arrow: "/nowhere/aero_arrow.cur".into(),
            ..CursorSources::default()
        };
        let mut app = App::with_sources(api, sources);

        assert!(app.dispatch(Action::Arrow).is_err());
        assert_eq!(app.status_text(), "Cursor: system default");
        assert_eq!(ledger.borrow().live_count(), 0);
    }

    #[test]
    fn every_action_has_a_label() {
        let labels: Vec<_> = Action::ALL.iter().map(|a| a.label()).collect();
        assert_eq!(labels, ["Start", "Stop", "Error", "Arrow", "Busy"]);
    }
}
