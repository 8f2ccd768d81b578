// ── Cursor state toggle ───────────────────────────────────────────────────────
//
// Owns every OS cursor handle the process holds and the {Inactive, Active}
// state.  No `unsafe` here: the OS is reached through the `CursorApi` seam,
// implemented for real in `platform::win32::cursors` and faked in tests.
//
// Handle ownership:
//   • `CursorApi::Cursor` is an owned handle; dropping it releases the OS
//     handle.
//   • `CursorApi::install` consumes the handle.  SetSystemCursor destroys the
//     cursor it is given, so after a successful install nothing is left for us
//     to release, and a failed install releases it through `Drop`.

pub mod source;

#[cfg(test)]
pub(crate) mod fake;

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::Result;

pub(crate) use source::{CursorSource, CursorSources};

// ── Roles ─────────────────────────────────────────────────────────────────────

/// A system cursor slot that can be overridden individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum CursorRole {
    /// The standard arrow (`OCR_NORMAL`).
    Normal,
    /// The text-selection I-beam (`OCR_IBEAM`).
    IBeam,
}

impl CursorRole {
    /// The `OCR_*` identifier passed to `SetSystemCursor` / `LoadImageW`.
    pub(crate) fn ocr_id(self) -> u32 {
        match self {
            Self::Normal => 32512,
            Self::IBeam => 32513,
        }
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

/// Which replacement cursor is (or would be) applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CursorKind {
    /// The embedded animated "working" cursor.
    Working,
    /// The system "unavailable" cursor.
    Error,
    /// The system arrow, loaded from its cursor file.
    Arrow,
    /// The system busy animation.
    Busy,
}

impl CursorKind {
    /// Roles replaced when this kind is applied.
    pub(crate) fn roles(self) -> &'static [CursorRole] {
        match self {
            Self::Working | Self::Error => &[CursorRole::Normal, CursorRole::IBeam],
            Self::Arrow | Self::Busy => &[CursorRole::Normal],
        }
    }

    /// Lower-case name used in logs and the status line.
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Working => "working",
            Self::Error => "error",
            Self::Arrow => "arrow",
            Self::Busy => "busy",
        }
    }
}

// ── OS seam ───────────────────────────────────────────────────────────────────

/// The handful of OS cursor calls the toggle needs.
pub(crate) trait CursorApi {
    /// Owned cursor handle; dropping it releases the OS handle.
    type Cursor;

    /// Copy the cursor currently shown for `role`.
    fn copy_system(&mut self, role: CursorRole) -> Result<Self::Cursor>;

    /// Load a cursor (`.cur` or `.ani`) from a file on disk.
    fn load_from_file(&mut self, path: &Path) -> Result<Self::Cursor>;

    /// Make `cursor` the system cursor for `role`.
    ///
    /// Ownership passes to the OS on success; on failure the handle is
    /// released before returning.
    fn install(&mut self, cursor: Self::Cursor, role: CursorRole) -> Result<()>;

    /// Reload the user's cursor scheme from the system settings.
    fn reload_scheme(&mut self) -> Result<()>;
}

// ── Toggle ────────────────────────────────────────────────────────────────────

/// Result of a state transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    /// The state changed (Inactive → Active or Active → Inactive).
    Changed,
    /// The request did not apply in the current state; nothing was touched.
    Unchanged,
}

/// Saved originals for one applied replacement.
struct Swap<C> {
    kind: CursorKind,
    originals: Vec<(CursorRole, C)>,
}

enum ToggleState<C> {
    Inactive,
    Active(Swap<C>),
}

/// Replaces and restores the system cursors.
///
/// One instance per process; owned by the window state and driven from the
/// UI thread.  Dropping an active toggle restores the original cursors.
pub(crate) struct CursorToggle<A: CursorApi> {
    api: A,
    sources: CursorSources,
    state: ToggleState<A::Cursor>,
}

impl<A: CursorApi> CursorToggle<A> {
    pub(crate) fn new(api: A, sources: CursorSources) -> Self {
        Self {
            api,
            sources,
            state: ToggleState::Inactive,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, ToggleState::Active(_))
    }

    /// The kind currently applied, if any.
    pub(crate) fn active_kind(&self) -> Option<CursorKind> {
        match &self.state {
            ToggleState::Active(swap) => Some(swap.kind),
            ToggleState::Inactive => None,
        }
    }

    /// Roles whose original cursor is currently saved.
    #[cfg(test)]
    pub(crate) fn saved_roles(&self) -> Vec<CursorRole> {
        match &self.state {
            ToggleState::Active(swap) => swap.originals.iter().map(|(role, _)| *role).collect(),
            ToggleState::Inactive => Vec::new(),
        }
    }

    /// Apply one of the configured replacement cursors to its roles.
    pub(crate) fn apply(&mut self, kind: CursorKind) -> Result<Outcome> {
        let source = self.sources.source_for(kind);
        self.swap_in(kind, &source, kind.roles())
    }

    /// Replace the cursor for every role in `roles` with `source`.
    ///
    /// A no-op while another replacement is active.  Any failure rolls back
    /// whatever was already done and leaves the toggle inactive.
    pub(crate) fn swap_in(
        &mut self,
        kind: CursorKind,
        source: &CursorSource,
        roles: &[CursorRole],
    ) -> Result<Outcome> {
        if let ToggleState::Active(swap) = &self.state {
            debug!(
                active = swap.kind.as_str(),
                requested = kind.as_str(),
                "cursor already replaced, ignoring"
            );
            return Ok(Outcome::Unchanged);
        }

        // An early return drops everything collected so far, which releases it.
        let mut originals = Vec::with_capacity(roles.len());
        for &role in roles {
            originals.push((role, self.api.copy_system(role)?));
        }

        // One load per role: each installed cursor is consumed by the OS.
        let mut replacements = Vec::with_capacity(roles.len());
        {
            let file = source.materialize()?;
            for &role in roles {
                replacements.push((role, self.api.load_from_file(file.path())?));
            }
            // temp file removed here
        }

        let mut installed = Vec::with_capacity(roles.len());
        for (role, cursor) in replacements {
            if let Err(e) = self.api.install(cursor, role) {
                warn!(kind = kind.as_str(), ?role, error = %e, "install failed, rolling back");
                self.roll_back(originals, &installed);
                return Err(e);
            }
            installed.push(role);
        }

        info!(kind = kind.as_str(), ?roles, "system cursors replaced");
        self.state = ToggleState::Active(Swap { kind, originals });
        Ok(Outcome::Changed)
    }

    /// Put the saved cursors back.  Never fails; a no-op while inactive.
    pub(crate) fn restore(&mut self) -> Outcome {
        let ToggleState::Active(swap) = std::mem::replace(&mut self.state, ToggleState::Inactive)
        else {
            debug!("nothing to restore");
            return Outcome::Unchanged;
        };

        let mut clean = true;
        for (role, original) in swap.originals {
            if let Err(e) = self.api.install(original, role) {
                warn!(?role, error = %e, "could not reinstall original cursor");
                clean = false;
            }
        }
        if !clean {
            self.reload_scheme();
        }

        info!(kind = swap.kind.as_str(), "system cursors restored");
        Outcome::Changed
    }

    /// Undo a partial swap-in.  Roles already switched get their original
    /// back; the other originals are simply released.
    fn roll_back(&mut self, originals: Vec<(CursorRole, A::Cursor)>, installed: &[CursorRole]) {
        let mut clean = true;
        for (role, original) in originals {
            if !installed.contains(&role) {
                continue;
            }
            if let Err(e) = self.api.install(original, role) {
                warn!(?role, error = %e, "rollback could not reinstall original cursor");
                clean = false;
            }
        }
        if !clean {
            self.reload_scheme();
        }
    }

    fn reload_scheme(&mut self) {
        if let Err(e) = self.api.reload_scheme() {
            warn!(error = %e, "reloading the cursor scheme failed");
        }
    }
}

impl<A: CursorApi> Drop for CursorToggle<A> {
    fn drop(&mut self) {
        if self.is_active() {
            self.restore();
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
