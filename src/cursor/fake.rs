// ── In-memory cursor backend ──────────────────────────────────────────────────
//
// Stands in for Win32 in tests.  Every handle is tracked in a shared ledger so
// tests can assert that nothing leaks and nothing is released twice; failures
// can be injected per call.

use std::{
    cell::RefCell,
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    rc::Rc,
};

use crate::error::{CursorError, Result};

use super::{CursorApi, CursorRole};

/// What a cursor handle (or a role on screen) looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Image {
    /// The user's scheme cursor for a role.
    Scheme(CursorRole),
    /// Loaded from this file.
    File(PathBuf),
}

pub(crate) type LedgerRef = Rc<RefCell<Ledger>>;

#[derive(Debug)]
pub(crate) struct Ledger {
    next_id: u32,
    /// Handles currently owned by the code under test.
    live: BTreeSet<u32>,
    /// Handles released through `Drop`, in order.
    pub(crate) released: Vec<u32>,
    system: BTreeMap<CursorRole, Image>,
    /// Number of `CursorApi` calls made.
    pub(crate) calls: usize,
    pub(crate) loaded_paths: Vec<PathBuf>,
    pub(crate) scheme_reloads: usize,
    fail_copy: Vec<CursorRole>,
    fail_install: Vec<CursorRole>,
    fail_load_after: Option<usize>,
}

impl Ledger {
    fn new() -> Self {
        Self {
            next_id: 1,
            live: BTreeSet::new(),
            released: Vec::new(),
            system: default_scheme(),
            calls: 0,
            loaded_paths: Vec::new(),
            scheme_reloads: 0,
            fail_copy: Vec::new(),
            fail_install: Vec::new(),
            fail_load_after: None,
        }
    }

    pub(crate) fn live_count(&self) -> usize {
        self.live.len()
    }

    /// What the system currently shows for `role`.
    pub(crate) fn shows(&self, role: CursorRole) -> &Image {
        &self.system[&role]
    }

    /// Make the next `copy_system(role)` fail.
    pub(crate) fn fail_copy(&mut self, role: CursorRole) {
        self.fail_copy.push(role);
    }

    /// Make the next `install(_, role)` fail.
    pub(crate) fn fail_install(&mut self, role: CursorRole) {
        self.fail_install.push(role);
    }

    /// Let `n` more loads succeed, then fail the next one.
    pub(crate) fn fail_load_after(&mut self, n: usize) {
        self.fail_load_after = Some(n);
    }

    fn acquire(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        id
    }

    fn release(&mut self, id: u32) {
        assert!(self.live.remove(&id), "cursor {id} released twice or never owned");
        self.released.push(id);
    }

    fn hand_over(&mut self, id: u32, role: CursorRole, image: Image) {
        assert!(self.live.remove(&id), "cursor {id} installed after release");
        self.system.insert(role, image);
    }
}

/// Take the first pending failure for `role`, if any.
fn take_failure(pending: &mut Vec<CursorRole>, role: CursorRole) -> bool {
    match pending.iter().position(|r| *r == role) {
        Some(i) => {
            pending.remove(i);
            true
        }
        None => false,
    }
}

fn default_scheme() -> BTreeMap<CursorRole, Image> {
    [CursorRole::Normal, CursorRole::IBeam]
        .into_iter()
        .map(|role| (role, Image::Scheme(role)))
        .collect()
}

fn injected(function: &'static str) -> CursorError {
    // ERROR_INVALID_CURSOR_HANDLE
    CursorError::Win32 { function, code: 1402 }
}

/// Owned fake handle.  Dropping it records a release in the ledger.
#[derive(Debug)]
pub(crate) struct FakeCursor {
    id: u32,
    image: Image,
    ledger: Option<LedgerRef>,
}

impl Drop for FakeCursor {
    fn drop(&mut self) {
        if let Some(ledger) = self.ledger.take() {
            ledger.borrow_mut().release(self.id);
        }
    }
}

pub(crate) struct FakeCursors {
    ledger: LedgerRef,
}

impl FakeCursors {
    pub(crate) fn new() -> (Self, LedgerRef) {
        let ledger = Rc::new(RefCell::new(Ledger::new()));
        (
            Self {
                ledger: Rc::clone(&ledger),
            },
            ledger,
        )
    }

    fn cursor(&self, image: Image) -> FakeCursor {
        let id = self.ledger.borrow_mut().acquire();
        FakeCursor {
            id,
            image,
            ledger: Some(Rc::clone(&self.ledger)),
        }
    }
}

impl CursorApi for FakeCursors {
    type Cursor = FakeCursor;

    fn copy_system(&mut self, role: CursorRole) -> Result<FakeCursor> {
        let image = {
            let mut l = self.ledger.borrow_mut();
            l.calls += 1;
            if take_failure(&mut l.fail_copy, role) {
                return Err(injected("CopyIcon"));
            }
            l.system[&role].clone()
        };
        Ok(self.cursor(image))
    }

    fn load_from_file(&mut self, path: &Path) -> Result<FakeCursor> {
        {
            let mut l = self.ledger.borrow_mut();
            l.calls += 1;
            l.loaded_paths.push(path.to_path_buf());
            let pending = l.fail_load_after;
            match pending {
                Some(0) => {
                    l.fail_load_after = None;
                    return Err(injected("LoadCursorFromFileW"));
                }
                Some(n) => l.fail_load_after = Some(n - 1),
                None => {}
            }
        }
        assert!(path.exists(), "{} must exist while loading", path.display());
        Ok(self.cursor(Image::File(path.to_path_buf())))
    }

    fn install(&mut self, mut cursor: FakeCursor, role: CursorRole) -> Result<()> {
        let failed = {
            let mut l = self.ledger.borrow_mut();
            l.calls += 1;
            take_failure(&mut l.fail_install, role)
        };
        if failed {
            // `cursor` drops here and releases itself.
            return Err(injected("SetSystemCursor"));
        }
        cursor.ledger = None;
        let image = std::mem::replace(&mut cursor.image, Image::Scheme(role));
        self.ledger.borrow_mut().hand_over(cursor.id, role, image);
        Ok(())
    }

    fn reload_scheme(&mut self) -> Result<()> {
        let mut l = self.ledger.borrow_mut();
        l.calls += 1;
        l.scheme_reloads += 1;
        l.system = default_scheme();
        Ok(())
    }
}
