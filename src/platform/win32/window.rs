// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class.
//   • Create the top-level window with one push button per `Action` and a
//     status line.
//   • Own `WindowState` through GWLP_USERDATA for the window's lifetime.
//   • Run the Win32 message loop.
//   • Dispatch WM_COMMAND, WM_HOTKEY, WM_CLOSE, WM_DESTROY, WM_NCDESTROY.
//   • Expose a safe error-dialog helper for use by main().

#![allow(unsafe_code)]

use std::cell::{Cell, RefCell};

use tracing::{debug, error};
use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        Graphics::Gdi::{GetStockObject, COLOR_BTNFACE, DEFAULT_GUI_FONT, HBRUSH},
        System::LibraryLoader::GetModuleHandleW,
        UI::HiDpi::{
            GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
            DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
        },
        UI::WindowsAndMessaging::{
            CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
            GetWindowLongPtrW, GetMessageW, LoadCursorW, LoadIconW, MessageBoxW,
            PostQuitMessage, RegisterClassExW, SendMessageW, SetWindowLongPtrW, SetWindowTextW,
            ShowWindow, TranslateMessage, UpdateWindow, CREATESTRUCTW, CS_HREDRAW, CS_VREDRAW,
            CW_USEDEFAULT, GWLP_USERDATA, HMENU, IDC_ARROW, IDI_APPLICATION, MB_ICONERROR,
            MB_OK, MSG, SW_SHOW, WINDOW_EX_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_DESTROY,
            WM_HOTKEY, WM_NCCREATE, WM_NCDESTROY, WM_SETFONT, WNDCLASSEXW, WS_CAPTION,
            WS_CHILD, WS_MINIMIZEBOX, WS_OVERLAPPED, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE,
        },
    },
};

use super::{cursors::Win32Cursors, hotkeys::{self, Hotkeys}};
use crate::{
    app::{Action, App},
    error::{CursorError, Result},
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("CursorSwapMainWindow");

/// Title bar text.
const APP_TITLE: PCWSTR = w!("Cursor Swap");

// ── Layout (device-independent pixels, scaled by DPI) ─────────────────────────

const MARGIN: i32 = 12;
const BUTTON_WIDTH: i32 = 88;
const BUTTON_HEIGHT: i32 = 30;
const BUTTON_GAP: i32 = 8;
const STATUS_HEIGHT: i32 = 20;

/// The DPI the constants above are written for.
const BASE_DPI: u32 = 96;

/// Outer window size at 96 DPI; fits the button row plus the status line.
const DEFAULT_WIDTH: i32 = 520;
const DEFAULT_HEIGHT: i32 = 140;

// ── Control IDs ───────────────────────────────────────────────────────────────

/// Button `i` in `Action::ALL` gets id `IDC_BUTTON_FIRST + i`.
const IDC_BUTTON_FIRST: usize = 1001;
const IDC_STATUS: usize = 1100;

fn action_for_command(id: usize) -> Option<Action> {
    id.checked_sub(IDC_BUTTON_FIRST)
        .and_then(|i| Action::ALL.get(i).copied())
}

// ── WindowState ───────────────────────────────────────────────────────────────

/// Everything the window procedure needs, owned by the main window.
///
/// Only ever reached through a shared reference; mutation goes through the
/// cells so a message re-entering `wnd_proc` cannot alias `&mut`.
struct WindowState {
    hotkeys: RefCell<Option<Hotkeys>>,
    status: Cell<HWND>,
    app: RefCell<App<Win32Cursors>>,
}

impl WindowState {
    fn new(app: App<Win32Cursors>) -> Self {
        Self {
            hotkeys: RefCell::new(None),
            status: Cell::new(HWND::default()),
            app: RefCell::new(app),
        }
    }

    fn on_create(&self, hwnd: HWND) -> Result<()> {
        let status = create_controls(hwnd)?;
        self.status.set(status);
        *self.hotkeys.borrow_mut() = Some(Hotkeys::register(hwnd));
        self.refresh_status();
        Ok(())
    }

    /// Run `action` and update the status line.  Returns the text to report
    /// if it failed; the caller shows it once it no longer needs `self`.
    fn run_action(&self, action: Action) -> Option<String> {
        // The borrow ends with this statement.
        let result = match self.app.try_borrow_mut() {
            Ok(mut app) => app.dispatch(action),
            Err(_) => {
                debug!(?action, "action arrived while another was running, ignoring");
                return None;
            }
        };
        self.refresh_status();

        result.err().map(|e| {
            error!(?action, error = %e, "cursor action failed");
            format!("{} failed: {e}", action.label())
        })
    }

    fn refresh_status(&self) {
        let Ok(app) = self.app.try_borrow() else {
            return;
        };
        let text = wide(&app.status_text());
        drop(app);

        // SAFETY: status is our child STATIC control; text is a valid
        // null-terminated UTF-16 string that outlives the call.
        unsafe {
            let _ = SetWindowTextW(self.status.get(), PCWSTR(text.as_ptr()));
        }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the main window class, create the window, and drive the message
/// loop until the user closes the application.
pub(crate) fn run() -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    // SAFETY: called once, before any window is created on this thread.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime and never fails in practice.
    let hmodule = unsafe { GetModuleHandleW(None) }.map_err(CursorError::from)?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;
    let hwnd = create_window(hinstance, WindowState::new(App::new(Win32Cursors)))?;

    // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
    // ShowWindow returns the previous visibility state; UpdateWindow returns
    // a success BOOL; both are intentionally ignored here.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    #[cfg(debug_assertions)]
    debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "window visible"
    );

    message_loop()
}

/// Show a modal error dialog with the given message.
///
/// With an `owner` the dialog disables that window until it is dismissed.
/// `None` is only for startup failures, when there is no window left.
pub(crate) fn show_error_dialog(owner: Option<HWND>, message: &str) {
    let msg_wide = wide(message);

    // SAFETY: msg_wide is a valid null-terminated UTF-16 string that remains
    // allocated for the duration of the MessageBoxW call.  owner, if any, is
    // a live window on this thread; null means no owner.
    unsafe {
        let _ = MessageBoxW(
            owner.unwrap_or_default(),
            PCWSTR(msg_wide.as_ptr()),
            w!("Cursor Swap"),
            MB_OK | MB_ICONERROR,
        );
    }
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: LoadIconW with IDI_APPLICATION always succeeds; it loads the
    // built-in application icon resource.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }.map_err(CursorError::from)?;

    // SAFETY: LoadCursorW with IDC_ARROW always succeeds.  This is the shared
    // class cursor, unrelated to the system cursors we replace.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }.map_err(CursorError::from)?;

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        style: CS_HREDRAW | CS_VREDRAW,
        lpfnWndProc: Some(wnd_proc),
        cbClsExtra: 0,
        cbWndExtra: 0,
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        // System colour brushes are passed as (COLOR_* + 1).
        hbrBackground: HBRUSH((COLOR_BTNFACE.0 + 1) as usize as *mut _),
        lpszMenuName: PCWSTR::null(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
    };

    // SAFETY: wndclass is fully initialised with valid handles;
    // CLASS_NAME is a valid null-terminated UTF-16 string literal.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        return Err(last_error("RegisterClassExW"));
    }

    Ok(())
}

// ── Window creation ───────────────────────────────────────────────────────────

fn create_window(hinstance: HINSTANCE, state: WindowState) -> Result<HWND> {
    let dpi = dpi_of(None);
    let state = Box::into_raw(Box::new(state));

    // SAFETY: CLASS_NAME was just registered; hinstance is the exe's module.
    // `state` is handed to WM_NCCREATE via lpCreateParams and from then on is
    // owned by the window (freed in WM_NCDESTROY).  If creation fails before
    // WM_NCCREATE the box leaks, which only happens on the way to exit.
    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            APP_TITLE,
            WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX,
            CW_USEDEFAULT,
            CW_USEDEFAULT,
            scale(DEFAULT_WIDTH, dpi),
            scale(DEFAULT_HEIGHT, dpi),
            HWND::default(),
            HMENU::default(),
            hinstance,
            Some(state as *const _),
        )
    }
    .map_err(|e| CursorError::win32("CreateWindowExW", &e))?;

    Ok(hwnd)
}

/// Create the button row and the status line.  Returns the status control.
fn create_controls(hwnd: HWND) -> Result<HWND> {
    let dpi = dpi_of(Some(hwnd));
    let px = |v: i32| scale(v, dpi);

    // SAFETY: DEFAULT_GUI_FONT is a stock object; it is never deleted.
    let font = unsafe { GetStockObject(DEFAULT_GUI_FONT) };

    let mut x = MARGIN;
    for (i, action) in Action::ALL.iter().enumerate() {
        let label = wide(action.label());
        let id = IDC_BUTTON_FIRST + i;

        // SAFETY: hwnd is the parent being created; "BUTTON" is a system
        // class.  For child windows the HMENU slot carries the control id.
        let button = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                w!("BUTTON"),
                PCWSTR(label.as_ptr()),
                WS_CHILD | WS_VISIBLE | WS_TABSTOP,
                px(x),
                px(MARGIN),
                px(BUTTON_WIDTH),
                px(BUTTON_HEIGHT),
                hwnd,
                HMENU(id as *mut _),
                None,
                None,
            )
        }
        .map_err(|e| CursorError::win32("CreateWindowExW", &e))?;

        // SAFETY: button is a live child window; WM_SETFONT with a stock font.
        unsafe {
            let _ = SendMessageW(button, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        }
        x += BUTTON_WIDTH + BUTTON_GAP;
    }

    // SAFETY: as for the buttons above, with the system "STATIC" class.
    let status = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            w!("STATIC"),
            PCWSTR::null(),
            WS_CHILD | WS_VISIBLE,
            px(MARGIN),
            px(MARGIN + BUTTON_HEIGHT + BUTTON_GAP),
            px(x - BUTTON_GAP - MARGIN),
            px(STATUS_HEIGHT),
            hwnd,
            HMENU(IDC_STATUS as *mut _),
            None,
            None,
        )
    }
    .map_err(|e| CursorError::win32("CreateWindowExW", &e))?;

    // SAFETY: status is a live child window.
    unsafe {
        let _ = SendMessageW(status, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
    }

    Ok(status)
}

// ── DPI ───────────────────────────────────────────────────────────────────────

/// Scale a pixel value defined at 96 DPI to `dpi`.
fn scale(px: i32, dpi: u32) -> i32 {
    px * dpi as i32 / BASE_DPI as i32
}

/// DPI of `hwnd`, or of the primary monitor before the window exists.
fn dpi_of(hwnd: Option<HWND>) -> u32 {
    // SAFETY: neither call takes a pointer; hwnd, when given, is our live
    // main window.
    let dpi = unsafe {
        match hwnd {
            Some(hwnd) => GetDpiForWindow(hwnd),
            None => GetDpiForSystem(),
        }
    };
    if dpi == 0 {
        BASE_DPI
    } else {
        dpi
    }
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop() -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread (WM_HOTKEY included).
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            // GetMessageW returns -1 on error.
            -1 => return Err(last_error("GetMessageW")),
            // Returns 0 when WM_QUIT is retrieved: exit the loop cleanly.
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                let _ = TranslateMessage(&msg);
                let _ = DispatchMessageW(&msg);
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

/// Borrow the state stored in GWLP_USERDATA, if it has been set.
///
/// SAFETY: the caller must be inside `wnd_proc` for `hwnd`, between
/// WM_NCCREATE and WM_NCDESTROY, and must not keep the reference past the
/// current message.
unsafe fn window_state<'a>(hwnd: HWND) -> Option<&'a WindowState> {
    let ptr = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowState;
    ptr.as_ref()
}

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// Windows guarantees that hwnd, msg, wparam, and lparam are valid for the
// lifetime of this call; we must not store hwnd beyond the message handler.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // ── Lifecycle ─────────────────────────────────────────────────────────
        WM_NCCREATE => {
            // SAFETY: for WM_NCCREATE lparam points at a CREATESTRUCTW whose
            // lpCreateParams is the Box<WindowState> from create_window.
            let create = &*(lparam.0 as *const CREATESTRUCTW);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize);
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        WM_CREATE => {
            let Some(state) = window_state(hwnd) else {
                return LRESULT(-1);
            };
            match state.on_create(hwnd) {
                Ok(()) => LRESULT(0),
                Err(e) => {
                    error!(error = %e, "could not create controls");
                    // -1 makes CreateWindowExW fail and return the error.
                    LRESULT(-1)
                }
            }
        }

        WM_CLOSE => {
            // SAFETY: hwnd is the window being closed; DestroyWindow triggers
            // WM_DESTROY, which posts WM_QUIT via PostQuitMessage.
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }

        WM_DESTROY => {
            if let Some(state) = window_state(hwnd) {
                // Unregister while hwnd is still fully alive.
                state.hotkeys.borrow_mut().take();
            }
            PostQuitMessage(0);
            LRESULT(0)
        }

        WM_NCDESTROY => {
            // SAFETY: the pointer was produced by Box::into_raw in
            // create_window and is cleared here so it is freed exactly once.
            // Dropping the state restores the system cursors if still replaced.
            let ptr = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) as *mut WindowState;
            if !ptr.is_null() {
                drop(Box::from_raw(ptr));
            }
            DefWindowProcW(hwnd, msg, wparam, lparam)
        }

        // ── Commands ──────────────────────────────────────────────────────────
        WM_COMMAND => {
            // Low word of WPARAM is the control identifier.
            let cmd_id = wparam.0 & 0xFFFF;

            match (action_for_command(cmd_id), window_state(hwnd)) {
                (Some(action), Some(state)) => {
                    report_failure(hwnd, state.run_action(action));
                    LRESULT(0)
                }
                _ => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }

        WM_HOTKEY => {
            // WPARAM carries the id passed to RegisterHotKey.
            match (hotkeys::action_for(wparam.0 as i32), window_state(hwnd)) {
                (Some(action), Some(state)) => {
                    report_failure(hwnd, state.run_action(action));
                    LRESULT(0)
                }
                _ => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }

        // Default processing for all unhandled messages.
        // SAFETY: hwnd and message parameters are valid, provided by Windows.
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Show an action failure owned by the main window.
///
/// The dialog pumps messages, so the window may be destroyed (and its
/// `WindowState` freed) before it returns; callers must not touch the state
/// afterwards.
fn report_failure(hwnd: HWND, failure: Option<String>) {
    if let Some(message) = failure {
        show_error_dialog(Some(hwnd), &message);
    }
}

/// Null-terminated UTF-16 copy of `s`.
fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

/// Capture the current Win32 last-error code and wrap it in a `CursorError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> CursorError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    // It is always safe to call and never fails.
    let code = unsafe { GetLastError() };
    CursorError::Win32 {
        function,
        code: code.0,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::CursorSources;

    #[test]
    fn command_ids_map_to_buttons_in_order() {
        assert_eq!(action_for_command(IDC_BUTTON_FIRST), Some(Action::Start));
        assert_eq!(action_for_command(IDC_BUTTON_FIRST + 1), Some(Action::Stop));
        assert_eq!(action_for_command(IDC_BUTTON_FIRST + 4), Some(Action::Busy));
        assert_eq!(action_for_command(IDC_BUTTON_FIRST + 5), None);
        assert_eq!(action_for_command(IDC_STATUS), None);
        assert_eq!(action_for_command(0), None);
    }

    #[test]
    fn scale_follows_dpi() {
        assert_eq!(scale(BUTTON_WIDTH, BASE_DPI), BUTTON_WIDTH);
        assert_eq!(scale(BUTTON_HEIGHT, 192), 60);
        assert_eq!(scale(MARGIN, 144), 18);
    }

    #[test]
    fn failed_action_is_returned_not_shown() {
        let sources = CursorSources {
            error: "/definitely/not/here/aero_unavail_l.cur".into(),
            ..CursorSources::default()
        };
        let state = WindowState::new(App::with_sources(Win32Cursors, sources));

        // No dialog opens while the state is borrowed; the text comes back
        // for the window procedure to show.
        let failure = state.run_action(Action::Error).expect("missing cursor file");
        assert!(failure.starts_with("Error failed: "), "{failure}");
        assert_eq!(state.app.borrow().status_text(), "Cursor: system default");
        assert_eq!(state.run_action(Action::Stop), None);
    }

    #[test]
    fn wide_is_null_terminated() {
        assert_eq!(wide("Go"), vec![u16::from(b'G'), u16::from(b'o'), 0]);
    }
}
