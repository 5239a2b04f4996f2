// ── Rich-edit message constants ───────────────────────────────────────────────
//
// Source of truth: Richedit.h / Winuser.h.
// Only the subset Quill sends is listed here.
// All EM_* values are sent via SendMessageW(hwnd_edit, EM_*, wparam, lparam).

#![allow(non_snake_case)] // FFI struct fields keep their C names

const WM_USER: u32 = 0x0400;

// ── Control class ─────────────────────────────────────────────────────────────

/// Library that registers `MSFTEDIT_CLASS`.
pub(super) const DLL_NAME: &str = "Msftedit.dll";
/// Rich Edit 4.1+ window class.
pub(super) const MSFTEDIT_CLASS: &str = "RICHEDIT50W";

// ── Control styles ────────────────────────────────────────────────────────────

pub(super) const ES_MULTILINE: u32 = 0x0004;
pub(super) const ES_AUTOVSCROLL: u32 = 0x0040;
pub(super) const ES_NOHIDESEL: u32 = 0x0100;
pub(super) const ES_WANTRETURN: u32 = 0x1000;

// ── Set-up ────────────────────────────────────────────────────────────────────

/// Set the text mode.  Only valid while the control is empty.
pub(super) const EM_SETTEXTMODE: u32 = WM_USER + 89;
pub(super) const TM_RICHTEXT: usize = 2;
pub(super) const TM_MULTILEVELUNDO: usize = 8;
pub(super) const TM_MULTICODEPAGE: usize = 32;

/// Raise the text limit.  LPARAM = max characters.
pub(super) const EM_EXLIMITTEXT: u32 = WM_USER + 53;
/// Effectively unlimited; the default is 32 767 characters.
pub(super) const TEXT_LIMIT: isize = 0x7FFF_FFFE;

/// Select which notifications are sent to the parent.
pub(super) const EM_SETEVENTMASK: u32 = WM_USER + 69;
/// Send `EN_CHANGE` after text edits.
pub(super) const ENM_CHANGE: isize = 0x0001;

/// Set the background colour.  WPARAM=0 (use LPARAM); LPARAM=COLORREF.
pub(super) const EM_SETBKGNDCOLOR: u32 = WM_USER + 67;

// ── Document content ──────────────────────────────────────────────────────────

/// Replace text.  WPARAM=&SETTEXTEX; LPARAM=null-terminated text.
pub(super) const EM_SETTEXTEX: u32 = WM_USER + 97;
/// Replace everything, drop formatting and the undo stack.
pub(super) const ST_DEFAULT: u32 = 0;

/// Copy text out.  WPARAM=&GETTEXTEX; LPARAM=buffer.
pub(super) const EM_GETTEXTEX: u32 = WM_USER + 94;
/// Paragraph breaks come back as a bare `\r`.
pub(super) const GT_DEFAULT: u32 = 0;

/// Text length.  WPARAM=&GETTEXTLENGTHEX.
pub(super) const EM_GETTEXTLENGTHEX: u32 = WM_USER + 95;
pub(super) const GTL_PRECISE: u32 = 2;
pub(super) const GTL_NUMCHARS: u32 = 8;

/// UTF-16 code page for the `*EX` text messages.
pub(super) const CP_UTF16: u32 = 1200;

/// Query the modification flag.
pub(super) const EM_GETMODIFY: u32 = 0x00B8;
/// Set or clear the modification flag.  WPARAM=BOOL.
pub(super) const EM_SETMODIFY: u32 = 0x00B9;

// ── Selection ─────────────────────────────────────────────────────────────────

/// Read the selection.  LPARAM=&mut CHARRANGE.
pub(super) const EM_EXGETSEL: u32 = WM_USER + 52;
/// Set the selection.  LPARAM=&CHARRANGE.
pub(super) const EM_EXSETSEL: u32 = WM_USER + 55;
/// Show (WPARAM=0) or hide (WPARAM=1) the selection highlight.
pub(super) const EM_HIDESELECTION: u32 = WM_USER + 63;

// ── Character formatting ──────────────────────────────────────────────────────

/// Read a character format.  WPARAM=SCF_*; LPARAM=&mut CHARFORMAT2W.
pub(super) const EM_GETCHARFORMAT: u32 = WM_USER + 58;
/// Merge a character format.  WPARAM=SCF_*; LPARAM=&CHARFORMAT2W.
pub(super) const EM_SETCHARFORMAT: u32 = WM_USER + 68;

/// The control's default format (used for new text in an empty document).
pub(super) const SCF_DEFAULT: usize = 0x0000;
/// The selection, or the insertion point when nothing is selected.
pub(super) const SCF_SELECTION: usize = 0x0001;

pub(super) const CFM_BOLD: u32 = 0x0000_0001;
pub(super) const CFM_ITALIC: u32 = 0x0000_0002;
pub(super) const CFM_UNDERLINE: u32 = 0x0000_0004;
pub(super) const CFM_FACE: u32 = 0x2000_0000;
pub(super) const CFM_COLOR: u32 = 0x4000_0000;
pub(super) const CFM_SIZE: u32 = 0x8000_0000;

pub(super) const CFE_BOLD: u32 = 0x0000_0001;
pub(super) const CFE_ITALIC: u32 = 0x0000_0002;
pub(super) const CFE_UNDERLINE: u32 = 0x0000_0004;
/// Text colour follows the system window-text colour.
pub(super) const CFE_AUTOCOLOR: u32 = 0x4000_0000;

/// Maximum face-name length, including the null terminator.
pub(super) const LF_FACESIZE: usize = 32;

// ── OLE / TOM ─────────────────────────────────────────────────────────────────

/// Retrieve `IRichEditOle`.  LPARAM=&mut *mut c_void (AddRef'd).
pub(super) const EM_GETOLEINTERFACE: u32 = WM_USER + 60;
/// `ITextDocument::Undo` argument: stop recording undo.
pub(super) const TOM_SUSPEND: i32 = -9_999_995;
/// `ITextDocument::Undo` argument: resume recording undo.
pub(super) const TOM_RESUME: i32 = -9_999_994;

// ── Edit operations ───────────────────────────────────────────────────────────

/// Undo the last action.
pub(super) const EM_UNDO: u32 = 0x00C7;
/// Redo the last undone action.
pub(super) const EM_REDO: u32 = WM_USER + 84;

// Standard Win32 clipboard messages; the control processes these natively.
/// Cut selection to clipboard.
pub(super) const WM_CUT: u32 = 0x0300;
/// Copy selection to clipboard.
pub(super) const WM_COPY: u32 = 0x0301;
/// Paste from clipboard.
pub(super) const WM_PASTE: u32 = 0x0302;

/// Suspend (WPARAM=0) or resume (WPARAM=1) repainting.
pub(super) const WM_SETREDRAW: u32 = 0x000B;

// ── Notifications — pub(crate) for WM_COMMAND dispatch in window.rs ───────────

/// Text changed (high word of WPARAM in `WM_COMMAND`).
pub(crate) const EN_CHANGE: u32 = 0x0300;

// ── Structures ────────────────────────────────────────────────────────────────

/// `CHARFORMAT2W`.
#[repr(C)]
#[derive(Clone, Copy)]
pub(super) struct CharFormat2W {
    pub(super) cbSize: u32,
    pub(super) dwMask: u32,
    pub(super) dwEffects: u32,
    pub(super) yHeight: i32,
    pub(super) yOffset: i32,
    pub(super) crTextColor: u32,
    pub(super) bCharSet: u8,
    pub(super) bPitchAndFamily: u8,
    pub(super) szFaceName: [u16; LF_FACESIZE],
    pub(super) wWeight: u16,
    pub(super) sSpacing: i16,
    pub(super) crBackColor: u32,
    pub(super) lcid: u32,
    pub(super) dwCookie: u32,
    pub(super) sStyle: i16,
    pub(super) wKerning: u16,
    pub(super) bUnderlineType: u8,
    pub(super) bAnimation: u8,
    pub(super) bRevAuthor: u8,
    pub(super) bUnderlineColor: u8,
}

impl CharFormat2W {
    /// A zeroed format with `cbSize` filled in and no attributes masked.
    pub(super) fn empty() -> Self {
        Self {
            cbSize: std::mem::size_of::<Self>() as u32,
            dwMask: 0,
            dwEffects: 0,
            yHeight: 0,
            yOffset: 0,
            crTextColor: 0,
            bCharSet: 0,
            bPitchAndFamily: 0,
            szFaceName: [0; LF_FACESIZE],
            wWeight: 0,
            sSpacing: 0,
            crBackColor: 0,
            lcid: 0,
            dwCookie: 0,
            sStyle: 0,
            wKerning: 0,
            bUnderlineType: 0,
            bAnimation: 0,
            bRevAuthor: 0,
            bUnderlineColor: 0,
        }
    }
}

/// `CHARRANGE`: character positions, `cpMax = -1` meaning end of text.
#[repr(C)]
#[derive(Clone, Copy, Default)]
pub(super) struct CharRange {
    pub(super) cpMin: i32,
    pub(super) cpMax: i32,
}

/// `SETTEXTEX`.
#[repr(C)]
pub(super) struct SetTextEx {
    pub(super) flags: u32,
    pub(super) codepage: u32,
}

/// `GETTEXTEX`.
#[repr(C)]
pub(super) struct GetTextEx {
    pub(super) cb: u32,
    pub(super) flags: u32,
    pub(super) codepage: u32,
    pub(super) lpDefaultChar: *const u8,
    pub(super) lpUsedDefChar: *mut i32,
}

/// `GETTEXTLENGTHEX`.
#[repr(C)]
pub(super) struct GetTextLengthEx {
    pub(super) flags: u32,
    pub(super) codepage: u32,
}
