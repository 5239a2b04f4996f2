// ── Common dialogs ─────────────────────────────────────────────────────────────
//
// Thin wrappers around the Win32 common-dialog and message-box APIs.  The
// picker functions return `Some(choice)` on user confirmation and `None` on
// cancel or error.
//
// This is inside `platform::win32` so `unsafe` is permitted per crate policy.

#![allow(unsafe_code)]

use std::path::PathBuf;

use windows::{
    core::{PCWSTR, PWSTR},
    Win32::{
        Foundation::{COLORREF, HWND},
        UI::{
            Controls::Dialogs::{
                ChooseColorW, GetOpenFileNameW, GetSaveFileNameW, CC_FULLOPEN, CC_RGBINIT,
                CHOOSECOLORW, OFN_FILEMUSTEXIST, OFN_HIDEREADONLY, OFN_OVERWRITEPROMPT,
                OFN_PATHMUSTEXIST, OPENFILENAMEW,
            },
            WindowsAndMessaging::{
                MessageBoxW, IDCANCEL, IDNO, IDYES, MB_ICONERROR, MB_ICONINFORMATION,
                MB_ICONWARNING, MB_OK, MB_YESNOCANCEL, MESSAGEBOX_RESULT, MESSAGEBOX_STYLE,
            },
        },
    },
};

use super::wide;
use crate::{app::APP_NAME, format::Rgb};

// ── Buffer size ───────────────────────────────────────────────────────────────

/// Maximum path length in `WCHAR`s, including the null terminator.
/// `MAX_PATH` (260) is too short for modern Windows paths; use 32 768 which
/// is the documented maximum for `\\?\` extended paths.
const PATH_BUF_LEN: usize = 32_768;

/// The filter string is null-separated pairs ending with a double null:
/// "Display\0*.ext\0Display2\0*.ext2\0\0"
const FILE_FILTER: &str = "Text files (*.txt)\0*.txt\0All files (*.*)\0*.*\0\0";

// ── Open dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Open File" dialog.
///
/// Returns the chosen path, or `None` if the user cancelled.
pub(crate) fn show_open_dialog(hwnd_owner: HWND) -> Option<PathBuf> {
    let mut buf = vec![0u16; PATH_BUF_LEN];
    let filter: Vec<u16> = FILE_FILTER.encode_utf16().collect();
    let title = wide("Open File");

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: hwnd_owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        lpstrTitle: PCWSTR(title.as_ptr()),
        Flags: OFN_FILEMUSTEXIST | OFN_PATHMUSTEXIST | OFN_HIDEREADONLY,
        ..Default::default()
    };

    // SAFETY: `ofn` is fully initialised; `buf`, `filter` and `title` outlive
    // this call.  GetOpenFileNameW reads and writes only within the buffers
    // we provided.  The function is called on the UI thread (required for
    // modal dialogs).
    let ok = unsafe { GetOpenFileNameW(&mut ofn) };

    if ok.as_bool() {
        Some(path_from_buf(&buf))
    } else {
        None
    }
}

// ── Save dialog ───────────────────────────────────────────────────────────────

/// Show the standard "Save As" dialog.
///
/// `default_name` pre-populates the filename field (pass an empty string or
/// the current filename).  Returns the chosen path, or `None` if cancelled.
pub(crate) fn show_save_dialog(hwnd_owner: HWND, default_name: &str) -> Option<PathBuf> {
    let mut buf: Vec<u16> = default_name
        .encode_utf16()
        .take(PATH_BUF_LEN - 1)
        .chain(std::iter::repeat(0))
        .take(PATH_BUF_LEN)
        .collect();
    let filter: Vec<u16> = FILE_FILTER.encode_utf16().collect();
    let title = wide("Save File As");

    let mut ofn = OPENFILENAMEW {
        lStructSize: std::mem::size_of::<OPENFILENAMEW>() as u32,
        hwndOwner: hwnd_owner,
        lpstrFilter: PCWSTR(filter.as_ptr()),
        lpstrFile: PWSTR(buf.as_mut_ptr()),
        nMaxFile: PATH_BUF_LEN as u32,
        lpstrTitle: PCWSTR(title.as_ptr()),
        Flags: OFN_OVERWRITEPROMPT | OFN_PATHMUSTEXIST,
        ..Default::default()
    };

    // SAFETY: same invariants as show_open_dialog above.
    let ok = unsafe { GetSaveFileNameW(&mut ofn) };

    if ok.as_bool() {
        Some(path_from_buf(&buf))
    } else {
        None
    }
}

// ── Colour dialog ─────────────────────────────────────────────────────────────

/// Show the system colour picker.
///
/// `initial` preselects a colour.  `custom` holds the sixteen custom-colour
/// slots as `COLORREF`s; edits the user makes to them are written back even
/// if the dialog is cancelled, matching the picker's own behaviour.
pub(crate) fn choose_color(
    hwnd_owner: HWND,
    initial: Option<Rgb>,
    custom: &mut [u32; 16],
) -> Option<Rgb> {
    let mut slots: [COLORREF; 16] = custom.map(COLORREF);

    let flags = if initial.is_some() { CC_FULLOPEN | CC_RGBINIT } else { CC_FULLOPEN };
    let mut cc = CHOOSECOLORW {
        lStructSize: std::mem::size_of::<CHOOSECOLORW>() as u32,
        hwndOwner: hwnd_owner,
        rgbResult: COLORREF(initial.map_or(0, Rgb::to_colorref)),
        lpCustColors: slots.as_mut_ptr(),
        Flags: flags,
        ..Default::default()
    };

    // SAFETY: `cc` is fully initialised and `slots` is the 16-entry array
    // ChooseColorW requires; both outlive the call.  UI thread only.
    let ok = unsafe { ChooseColorW(&mut cc) };

    *custom = slots.map(|c| c.0);
    if ok.as_bool() {
        Some(Rgb::from_colorref(cc.rgbResult.0))
    } else {
        None
    }
}

// ── Message boxes ─────────────────────────────────────────────────────────────

/// Answer to "Do you want to save changes?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveChoice {
    Save,
    Discard,
    Cancel,
}

/// Ask whether to save unsaved changes before they are discarded.
pub(crate) fn confirm_save(hwnd_owner: HWND, question: &str) -> SaveChoice {
    match message_box(hwnd_owner, APP_NAME, question, MB_YESNOCANCEL | MB_ICONWARNING) {
        IDYES => SaveChoice::Save,
        IDNO => SaveChoice::Discard,
        IDCANCEL => SaveChoice::Cancel,
        _ => SaveChoice::Cancel,
    }
}

/// Informational box with an OK button (About, Help).
pub(crate) fn show_info(hwnd_owner: HWND, title: &str, body: &str) {
    let _ = message_box(hwnd_owner, title, body, MB_OK | MB_ICONINFORMATION);
}

/// Error box with an OK button.
pub(crate) fn show_error(hwnd_owner: HWND, title: &str, body: &str) {
    let _ = message_box(hwnd_owner, title, body, MB_OK | MB_ICONERROR);
}

fn message_box(
    hwnd_owner: HWND,
    title: &str,
    body: &str,
    style: MESSAGEBOX_STYLE,
) -> MESSAGEBOX_RESULT {
    let title_wide = wide(title);
    let body_wide = wide(body);
    // SAFETY: both strings are valid null-terminated UTF-16 that remain
    // allocated for the duration of the MessageBoxW call.  hwnd_owner is
    // either a live window or null (no owner).
    unsafe {
        MessageBoxW(
            hwnd_owner,
            PCWSTR(body_wide.as_ptr()),
            PCWSTR(title_wide.as_ptr()),
            style,
        )
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Convert a null-terminated UTF-16 buffer to a `PathBuf`.
fn path_from_buf(buf: &[u16]) -> PathBuf {
    let len = buf.iter().position(|&c| c == 0).unwrap_or(buf.len());
    PathBuf::from(String::from_utf16_lossy(&buf[..len]))
}
