// ── Font-size prompt ──────────────────────────────────────────────────────────
//
// Win32 has no stock "enter a number" dialog, so this is a small modal popup
// built from child controls: a label, a digits-only edit box, OK and Cancel.
// It runs its own message loop with the owner disabled, the same way system
// modal dialogs do.  Input is validated here; the caller only ever sees a
// `FontSize` that is at least 1.

#![allow(unsafe_code)]

use std::ffi::c_void;

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{GetLastError, ERROR_CLASS_ALREADY_EXISTS, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM},
        Graphics::Gdi::{GetStockObject, COLOR_BTNFACE, DEFAULT_GUI_FONT, HBRUSH},
        System::Diagnostics::Debug::MessageBeep,
        UI::{
            Input::KeyboardAndMouse::{EnableWindow, SetFocus},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
                GetMessageW, GetWindowLongPtrW, GetWindowRect, GetWindowTextLengthW,
                GetWindowTextW, IsDialogMessageW, LoadCursorW, PostQuitMessage,
                RegisterClassExW, SendMessageW, SetForegroundWindow, SetWindowLongPtrW,
                ShowWindow, TranslateMessage, BS_DEFPUSHBUTTON, BS_PUSHBUTTON,
                CREATESTRUCTW, CW_USEDEFAULT, ES_AUTOHSCROLL, ES_NUMBER, GWLP_USERDATA, HMENU,
                IDC_ARROW, IDCANCEL, IDOK, MB_ICONWARNING, MSG, SW_SHOW, WINDOW_EX_STYLE,
                WINDOW_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_NCCREATE, WM_SETFONT,
                WNDCLASSEXW, WS_CAPTION, WS_CHILD, WS_EX_CLIENTEDGE, WS_EX_DLGMODALFRAME,
                WS_POPUP, WS_SYSMENU, WS_TABSTOP, WS_VISIBLE,
            },
        },
    },
};

use super::{dpi, wide};
use crate::format::FontSize;

const CLASS_NAME: PCWSTR = w!("QuillFontSizePrompt");

const TITLE: &str = "Change Font Size";
const LABEL: &str = "Enter new font size:";

/// Client size at 96 DPI.
const WIDTH: i32 = 280;
const HEIGHT: i32 = 130;

/// `EM_SETSEL` for the plain edit control.
const EM_SETSEL: u32 = 0x00B1;

/// State shared between `prompt_font_size` and the prompt's WndProc.
struct PromptState {
    dpi: u32,
    initial: Option<FontSize>,
    edit: HWND,
    result: Option<FontSize>,
    done: bool,
}

/// Ask for a new point size.
///
/// `current` pre-fills the box.  Returns `None` if the user cancels.
pub(crate) fn prompt_font_size(
    owner: HWND,
    hinstance: HINSTANCE,
    current: Option<FontSize>,
) -> Option<FontSize> {
    if let Err(e) = register_class(hinstance) {
        tracing::error!(error = %e, "could not register the font-size prompt");
        return None;
    }

    let dpi = dpi::get_for_window(owner);
    let mut state = Box::new(PromptState {
        dpi,
        initial: current,
        edit: HWND::default(),
        result: None,
        done: false,
    });

    // Centre over the owner.
    let mut owner_rect = RECT::default();
    // SAFETY: owner is the live main window; owner_rect is writable.
    let _ = unsafe { GetWindowRect(owner, &mut owner_rect) };
    let (w, h) = (dpi::scale(WIDTH, dpi), dpi::scale(HEIGHT, dpi));
    let (x, y) = if owner_rect.right > owner_rect.left {
        (
            owner_rect.left + (owner_rect.right - owner_rect.left - w) / 2,
            owner_rect.top + (owner_rect.bottom - owner_rect.top - h) / 2,
        )
    } else {
        (CW_USEDEFAULT, CW_USEDEFAULT)
    };

    let title = wide(TITLE);
    // SAFETY: CLASS_NAME was registered above; the state pointer stays valid
    // until after DestroyWindow below because `state` outlives the window.
    let created = unsafe {
        CreateWindowExW(
            WS_EX_DLGMODALFRAME,
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_POPUP | WS_CAPTION | WS_SYSMENU,
            x,
            y,
            w,
            h,
            owner,
            HMENU::default(),
            hinstance,
            Some(&mut *state as *mut PromptState as *const c_void),
        )
    };
    let hwnd = match created {
        Ok(h) if h != HWND::default() => h,
        _ => {
            tracing::error!("could not create the font-size prompt");
            return None;
        }
    };

    // SAFETY: owner and hwnd are live windows on this thread.  Disabling the
    // owner makes the prompt modal; it is re-enabled before returning.
    unsafe {
        let _ = EnableWindow(owner, false);
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetFocus(state.edit);
    }

    let mut msg = MSG::default();
    while !state.done {
        // SAFETY: &mut msg is a valid MSG pointer; all windows on the thread.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        match ret.0 {
            -1 => break,
            0 => {
                // WM_QUIT: hand it back to the main loop.
                // SAFETY: re-posting the quit code is always valid.
                unsafe { PostQuitMessage(msg.wParam.0 as i32) };
                break;
            }
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // IsDialogMessageW gives the popup Tab, Enter and Esc handling.
                if !IsDialogMessageW(hwnd, &msg).as_bool() {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            },
        }
    }

    // SAFETY: the owner must be re-enabled before the prompt is destroyed so
    // that activation returns to it rather than to another application.
    unsafe {
        let _ = EnableWindow(owner, true);
        let _ = DestroyWindow(hwnd);
        let _ = SetForegroundWindow(owner);
    }

    state.result
}

fn register_class(hinstance: HINSTANCE) -> crate::error::Result<()> {
    // SAFETY: IDC_ARROW is a built-in cursor resource.
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(prompt_proc),
        hInstance: hinstance,
        hCursor: cursor,
        // System colour brushes are encoded as COLOR_* + 1.
        hbrBackground: HBRUSH((COLOR_BTNFACE.0 + 1) as usize as *mut c_void),
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };

    // SAFETY: wndclass is fully initialised; CLASS_NAME is a static string.
    let atom = unsafe { RegisterClassExW(&wndclass) };
    if atom == 0 {
        // SAFETY: reads thread-local state set by RegisterClassExW.
        let err = unsafe { GetLastError() };
        if err != ERROR_CLASS_ALREADY_EXISTS {
            return Err(crate::error::QuillError::Win32 {
                function: "RegisterClassExW (prompt)",
                code: err.0,
            });
        }
    }
    Ok(())
}

/// Create the label, edit box and buttons.
///
/// # Safety
/// `hwnd` must be the prompt window during `WM_CREATE`.
unsafe fn create_children(hwnd: HWND, state: &mut PromptState) {
    let current_dpi = state.dpi;
    let s = |px: i32| dpi::scale(px, current_dpi);
    let hinstance = HINSTANCE::default();
    let font = GetStockObject(DEFAULT_GUI_FONT);

    let child = |class: PCWSTR,
                 text: &str,
                 ex: WINDOW_EX_STYLE,
                 style: WINDOW_STYLE,
                 rect: (i32, i32, i32, i32),
                 id: i32| {
        let text_wide = wide(text);
        let h = CreateWindowExW(
            ex,
            class,
            PCWSTR(text_wide.as_ptr()),
            WS_CHILD | WS_VISIBLE | style,
            rect.0,
            rect.1,
            rect.2,
            rect.3,
            hwnd,
            HMENU(id as isize as *mut c_void),
            hinstance,
            None,
        )
        .unwrap_or_default();
        let _ = SendMessageW(h, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        h
    };

    child(
        w!("STATIC"),
        LABEL,
        WINDOW_EX_STYLE(0),
        WINDOW_STYLE(0),
        (s(12), s(12), s(240), s(18)),
        -1,
    );
    let initial = state.initial.map(|f| f.points().to_string()).unwrap_or_default();
    state.edit = child(
        w!("EDIT"),
        &initial,
        WS_EX_CLIENTEDGE,
        WS_TABSTOP | WINDOW_STYLE((ES_NUMBER | ES_AUTOHSCROLL) as u32),
        (s(12), s(34), s(240), s(22)),
        100,
    );
    let _ = SendMessageW(state.edit, EM_SETSEL, WPARAM(0), LPARAM(-1));
    child(
        w!("BUTTON"),
        "OK",
        WINDOW_EX_STYLE(0),
        WS_TABSTOP | WINDOW_STYLE(BS_DEFPUSHBUTTON as u32),
        (s(96), s(66), s(75), s(24)),
        IDOK.0,
    );
    child(
        w!("BUTTON"),
        "Cancel",
        WINDOW_EX_STYLE(0),
        WS_TABSTOP | WINDOW_STYLE(BS_PUSHBUTTON as u32),
        (s(177), s(66), s(75), s(24)),
        IDCANCEL.0,
    );
}

/// Read and validate the edit box.
///
/// # Safety
/// `edit` must be a live edit control.
unsafe fn read_size(edit: HWND) -> Option<FontSize> {
    let len = GetWindowTextLengthW(edit).max(0) as usize;
    let mut buf = vec![0u16; len + 1];
    let copied = GetWindowTextW(edit, &mut buf).max(0) as usize;
    FontSize::parse(&String::from_utf16_lossy(&buf[..copied.min(len)]))
}

// SAFETY: prompt_proc is registered as lpfnWndProc for CLASS_NAME.
// GWLP_USERDATA holds the PromptState pointer installed in WM_NCCREATE; the
// state outlives the window (see prompt_font_size).
unsafe extern "system" fn prompt_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let cs = &*(lparam.0 as *const CREATESTRUCTW);
        SetWindowLongPtrW(hwnd, GWLP_USERDATA, cs.lpCreateParams as isize);
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *mut PromptState;
    let Some(state) = state.as_mut() else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    match msg {
        WM_CREATE => {
            create_children(hwnd, state);
            LRESULT(0)
        }

        WM_COMMAND => {
            let id = (wparam.0 & 0xFFFF) as i32;
            if id == IDOK.0 {
                match read_size(state.edit) {
                    Some(size) => {
                        state.result = Some(size);
                        state.done = true;
                    }
                    None => {
                        // Rejected: keep the prompt open with the text selected.
                        let _ = MessageBeep(MB_ICONWARNING);
                        let _ = SendMessageW(state.edit, EM_SETSEL, WPARAM(0), LPARAM(-1));
                        let _ = SetFocus(state.edit);
                    }
                }
                LRESULT(0)
            } else if id == IDCANCEL.0 {
                state.done = true;
                LRESULT(0)
            } else {
                DefWindowProcW(hwnd, msg, wparam, lparam)
            }
        }

        // The caller destroys the window once the loop ends.
        WM_CLOSE => {
            state.done = true;
            LRESULT(0)
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
