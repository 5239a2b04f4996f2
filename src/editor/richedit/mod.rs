// ── Rich-edit child-window hosting ────────────────────────────────────────────
//
// This is one of exactly two modules where `unsafe` is permitted.
// Every `unsafe` block MUST carry a `// SAFETY:` comment.
//
// ── DLL ownership model ───────────────────────────────────────────────────────
//
// `RichEditDll` owns the single `LoadLibraryW` call for `Msftedit.dll`.  It
// is stored in `WindowState` and lives longer than the `RichEditView`.
// `RichEditView` holds only a child `HWND`; it does not own the DLL.
//
// Drop order inside `WindowState` (Rust drops fields in declaration order):
//   1. `app` (pure Rust, no HWNDs) — dropped first
//   2. `view` — stale HWND (Windows already destroyed it as part of
//      parent-window teardown); no-op drop
//   3. `dll` — `FreeLibrary` called here, after all windows are gone ✓
//
// ── Text positions ────────────────────────────────────────────────────────────
//
// Character positions are UTF-16 code units; a paragraph break counts as one
// character (`\r`).

#![allow(unsafe_code)]

pub mod messages;

use std::ffi::c_void;

use messages::{
    CharFormat2W, CharRange, GetTextEx, GetTextLengthEx, SetTextEx, CFE_AUTOCOLOR, CFE_BOLD,
    CFE_ITALIC, CFE_UNDERLINE, CFM_BOLD, CFM_COLOR, CFM_FACE, CFM_ITALIC, CFM_SIZE,
    CFM_UNDERLINE, CP_UTF16, DLL_NAME, EM_EXGETSEL, EM_EXLIMITTEXT, EM_EXSETSEL,
    EM_GETCHARFORMAT, EM_GETMODIFY, EM_GETOLEINTERFACE, EM_GETTEXTEX, EM_GETTEXTLENGTHEX,
    EM_HIDESELECTION, EM_REDO, EM_SETBKGNDCOLOR, EM_SETCHARFORMAT, EM_SETEVENTMASK,
    EM_SETMODIFY, EM_SETTEXTEX, EM_SETTEXTMODE, EM_UNDO, ENM_CHANGE, ES_AUTOVSCROLL,
    ES_MULTILINE, ES_NOHIDESEL, ES_WANTRETURN, GTL_NUMCHARS, GTL_PRECISE, GT_DEFAULT,
    LF_FACESIZE, MSFTEDIT_CLASS, SCF_DEFAULT, SCF_SELECTION, ST_DEFAULT, TEXT_LIMIT,
    TM_MULTICODEPAGE, TM_MULTILEVELUNDO, TM_RICHTEXT, TOM_RESUME, TOM_SUSPEND, WM_COPY,
    WM_CUT, WM_PASTE, WM_SETREDRAW,
};

use windows::{
    core::{Interface, PCWSTR},
    Win32::{
        Foundation::{GetLastError, HINSTANCE, HMODULE, HWND, LPARAM, WPARAM},
        Graphics::Gdi::InvalidateRect,
        System::LibraryLoader::{FreeLibrary, LoadLibraryW},
        UI::{
            Controls::RichEdit::{IRichEditOle, ITextDocument},
            Input::KeyboardAndMouse::SetFocus,
            WindowsAndMessaging::{
                CreateWindowExW, MoveWindow, SendMessageW, HMENU, WINDOW_EX_STYLE,
                WINDOW_STYLE, WS_CHILD, WS_CLIPSIBLINGS, WS_TABSTOP, WS_VISIBLE, WS_VSCROLL,
            },
        },
    },
};

use crate::{
    error::{QuillError, Result},
    format::{FontSize, FormatPatch, Rgb, SelectionFormat},
};

/// Child-window identifier of the editor inside the main window.
pub(crate) const EDITOR_CONTROL_ID: usize = 100;

// ── RichEditDll ───────────────────────────────────────────────────────────────

/// RAII handle to the loaded `Msftedit.dll`.
///
/// Loading the DLL registers the `"RICHEDIT50W"` window class.
/// `FreeLibrary` is called on `Drop`, which should happen after the
/// `RichEditView` child window has been destroyed.
pub(crate) struct RichEditDll(HMODULE);

impl RichEditDll {
    /// Load `Msftedit.dll` from the system directory.
    pub(crate) fn load() -> Result<Self> {
        let name: Vec<u16> = DLL_NAME.encode_utf16().chain(std::iter::once(0)).collect();
        // SAFETY: name is a valid null-terminated UTF-16 string.
        // Msftedit.dll is a KnownDLL, so it always resolves to System32.
        let dll = unsafe { LoadLibraryW(PCWSTR(name.as_ptr())) }.map_err(QuillError::from)?;
        Ok(Self(dll))
    }
}

impl Drop for RichEditDll {
    fn drop(&mut self) {
        // SAFETY: self.0 was returned by a successful LoadLibraryW and has not
        // been freed since.  The editor HWND is already destroyed (Windows
        // destroys child windows before WM_NCDESTROY reaches the parent, and
        // WindowState field order drops the view before the DLL).
        unsafe {
            let _ = FreeLibrary(self.0);
        }
    }
}

// ── RichEditView ──────────────────────────────────────────────────────────────

/// A hosted rich-edit child window.
///
/// Does **not** own the `Msftedit.dll` module handle; that is owned by
/// `RichEditDll` in `WindowState`.  The child `HWND` is destroyed
/// automatically by Windows when the parent is destroyed.
pub(crate) struct RichEditView {
    hwnd: HWND,
}

impl RichEditView {
    /// Create a multi-line rich-edit child window inside `hwnd_parent`.
    ///
    /// `_dll` proves that `Msftedit.dll` is loaded and the class registered.
    /// The window is created with zero size; the parent lays it out in
    /// `WM_SIZE`.
    pub(crate) fn create(
        hwnd_parent: HWND,
        hinstance: HINSTANCE,
        _dll: &RichEditDll,
    ) -> Result<Self> {
        let class_wide: Vec<u16> =
            MSFTEDIT_CLASS.encode_utf16().chain(std::iter::once(0)).collect();

        let style = WS_CHILD
            | WS_VISIBLE
            | WS_VSCROLL
            | WS_TABSTOP
            | WS_CLIPSIBLINGS
            | WINDOW_STYLE(ES_MULTILINE | ES_AUTOVSCROLL | ES_WANTRETURN | ES_NOHIDESEL);

        // SAFETY: class_wide is null-terminated UTF-16 for the class registered
        // by Msftedit.dll (_dll proves the DLL is loaded).  hwnd_parent and
        // hinstance are valid Win32 handles from WM_CREATE.  The control ID is
        // passed through the HMENU slot, as Win32 requires for child windows.
        let hwnd = unsafe {
            CreateWindowExW(
                WINDOW_EX_STYLE(0),
                PCWSTR(class_wide.as_ptr()),
                PCWSTR::null(),
                style,
                0, 0, 0, 0,
                hwnd_parent,
                HMENU(EDITOR_CONTROL_ID as *mut c_void),
                hinstance,
                None,
            )
        };

        let hwnd = match hwnd {
            Ok(h) if h != HWND::default() => h,
            _ => {
                // SAFETY: GetLastError reads thread-local state set by the just-
                // failed CreateWindowExW; no Win32 calls between them.
                let code = unsafe { GetLastError().0 };
                return Err(QuillError::Win32 { function: "CreateWindowExW (RichEdit)", code });
            }
        };

        // SAFETY: hwnd is a valid, still-empty rich-edit control, which is the
        // documented precondition for EM_SETTEXTMODE.  The other messages are
        // plain configuration with value arguments.
        unsafe {
            let _ = SendMessageW(
                hwnd,
                EM_SETTEXTMODE,
                WPARAM(TM_RICHTEXT | TM_MULTILEVELUNDO | TM_MULTICODEPAGE),
                LPARAM(0),
            );
            let _ = SendMessageW(hwnd, EM_EXLIMITTEXT, WPARAM(0), LPARAM(TEXT_LIMIT));
            let _ = SendMessageW(hwnd, EM_SETEVENTMASK, WPARAM(0), LPARAM(ENM_CHANGE));
        }

        Ok(Self { hwnd })
    }

    /// Position the control inside the parent's client area.
    pub(crate) fn move_to(&self, x: i32, y: i32, width: i32, height: i32) {
        // SAFETY: hwnd is a valid child window; MoveWindow with repaint.
        unsafe {
            let _ = MoveWindow(self.hwnd, x, y, width.max(0), height.max(0), true);
        }
    }

    /// Give the editor keyboard focus.
    pub(crate) fn focus(&self) {
        // SAFETY: hwnd is a valid window on this thread.
        unsafe {
            let _ = SetFocus(self.hwnd);
        }
    }

    // ── Document operations ───────────────────────────────────────────────────

    /// Replace all text, dropping formatting and the undo history.
    pub(crate) fn set_text(&self, text: &str) {
        let wide: Vec<u16> = text.encode_utf16().chain(std::iter::once(0)).collect();
        let st = SetTextEx { flags: ST_DEFAULT, codepage: CP_UTF16 };
        // SAFETY: hwnd valid; st and wide outlive the call; wide is
        // null-terminated UTF-16 as announced by codepage 1200.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_SETTEXTEX,
                WPARAM(&st as *const SetTextEx as usize),
                LPARAM(wide.as_ptr() as isize),
            );
        }
    }

    /// Empty the buffer (File ▸ New).
    pub(crate) fn clear(&self) {
        self.set_text("");
    }

    /// Number of character positions in the document.
    pub(crate) fn len_chars(&self) -> usize {
        let gtl = GetTextLengthEx { flags: GTL_NUMCHARS | GTL_PRECISE, codepage: CP_UTF16 };
        // SAFETY: hwnd valid; gtl outlives the call; read-only query.
        let n = unsafe {
            SendMessageW(
                self.hwnd,
                EM_GETTEXTLENGTHEX,
                WPARAM(&gtl as *const GetTextLengthEx as usize),
                LPARAM(0),
            )
            .0
        };
        usize::try_from(n).unwrap_or(0)
    }

    /// The whole document as plain text.  Paragraph breaks are `\r`.
    pub(crate) fn text(&self) -> String {
        let len = self.len_chars();
        let mut buf = vec![0u16; len + 1];
        let gt = GetTextEx {
            cb: ((len + 1) * 2) as u32,
            flags: GT_DEFAULT,
            codepage: CP_UTF16,
            lpDefaultChar: std::ptr::null(),
            lpUsedDefChar: std::ptr::null_mut(),
        };
        // SAFETY: buf holds len+1 UTF-16 units and gt.cb announces exactly
        // that many bytes, so the control never writes past the end.
        let copied = unsafe {
            SendMessageW(
                self.hwnd,
                EM_GETTEXTEX,
                WPARAM(&gt as *const GetTextEx as usize),
                LPARAM(buf.as_mut_ptr() as isize),
            )
            .0
        };
        buf.truncate(usize::try_from(copied).unwrap_or(0).min(len));
        String::from_utf16_lossy(&buf)
    }

    /// `true` when the buffer changed since the last `set_modified(false)`.
    pub(crate) fn is_modified(&self) -> bool {
        // SAFETY: hwnd valid; read-only query.
        unsafe { SendMessageW(self.hwnd, EM_GETMODIFY, WPARAM(0), LPARAM(0)).0 != 0 }
    }

    /// Set or clear the modification flag.
    pub(crate) fn set_modified(&self, modified: bool) {
        // SAFETY: hwnd valid; EM_SETMODIFY takes a BOOL by value.
        unsafe {
            let _ = SendMessageW(self.hwnd, EM_SETMODIFY, WPARAM(usize::from(modified)), LPARAM(0));
        }
    }

    // ── Edit operations ───────────────────────────────────────────────────────

    /// Undo the last action.
    pub(crate) fn undo(&self) {
        // SAFETY: hwnd valid; EM_UNDO takes no parameters.
        unsafe { let _ = SendMessageW(self.hwnd, EM_UNDO, WPARAM(0), LPARAM(0)); }
    }

    /// Redo the last undone action.
    pub(crate) fn redo(&self) {
        // SAFETY: hwnd valid; EM_REDO takes no parameters.
        unsafe { let _ = SendMessageW(self.hwnd, EM_REDO, WPARAM(0), LPARAM(0)); }
    }

    /// Cut the current selection to the clipboard.
    pub(crate) fn cut(&self) {
        // SAFETY: hwnd valid; WM_CUT is processed natively by the control.
        unsafe { let _ = SendMessageW(self.hwnd, WM_CUT, WPARAM(0), LPARAM(0)); }
    }

    /// Copy the current selection to the clipboard.
    pub(crate) fn copy_to_clipboard(&self) {
        // SAFETY: hwnd valid; WM_COPY is processed natively by the control.
        unsafe { let _ = SendMessageW(self.hwnd, WM_COPY, WPARAM(0), LPARAM(0)); }
    }

    /// Paste from the clipboard at the caret position.
    pub(crate) fn paste(&self) {
        // SAFETY: hwnd valid; WM_PASTE is processed natively by the control.
        unsafe { let _ = SendMessageW(self.hwnd, WM_PASTE, WPARAM(0), LPARAM(0)); }
    }

    // ── Selection ─────────────────────────────────────────────────────────────

    fn selection(&self) -> CharRange {
        let mut cr = CharRange::default();
        // SAFETY: hwnd valid; cr is a writable CHARRANGE that outlives the call.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_EXGETSEL,
                WPARAM(0),
                LPARAM(&mut cr as *mut CharRange as isize),
            );
        }
        cr
    }

    fn set_selection(&self, cr: CharRange) {
        // SAFETY: hwnd valid; cr outlives the call; out-of-range positions
        // are clamped by the control.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_EXSETSEL,
                WPARAM(0),
                LPARAM(&cr as *const CharRange as isize),
            );
        }
    }

    // ── Character formatting ──────────────────────────────────────────────────

    fn get_format(&self, scope: usize) -> CharFormat2W {
        let mut cf = CharFormat2W::empty();
        // SAFETY: hwnd valid; cf is a CHARFORMAT2W with cbSize set, which
        // tells the control how many bytes it may write.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_GETCHARFORMAT,
                WPARAM(scope),
                LPARAM(&mut cf as *mut CharFormat2W as isize),
            );
        }
        cf
    }

    fn set_format(&self, scope: usize, cf: &CharFormat2W) {
        // SAFETY: hwnd valid; cf is a fully initialised CHARFORMAT2W whose
        // dwMask names the members to apply.
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_SETCHARFORMAT,
                WPARAM(scope),
                LPARAM(cf as *const CharFormat2W as isize),
            );
        }
    }

    /// Character format of the selection, or of the insertion point when
    /// nothing is selected.  Attributes that vary across the selection are
    /// `None`.
    pub(crate) fn selection_format(&self) -> SelectionFormat {
        let cf = self.get_format(SCF_SELECTION);
        let flag = |mask: u32, effect: u32| {
            (cf.dwMask & mask != 0).then_some(cf.dwEffects & effect != 0)
        };
        let color = (cf.dwMask & CFM_COLOR != 0 && cf.dwEffects & CFE_AUTOCOLOR == 0)
            .then(|| Rgb::from_colorref(cf.crTextColor));
        SelectionFormat {
            bold: flag(CFM_BOLD, CFE_BOLD),
            italic: flag(CFM_ITALIC, CFE_ITALIC),
            underline: flag(CFM_UNDERLINE, CFE_UNDERLINE),
            size: if cf.dwMask & CFM_SIZE != 0 { FontSize::from_twips(cf.yHeight) } else { None },
            color,
        }
    }

    /// Merge `patch` onto the selection (or the insertion point).
    pub(crate) fn merge_format(&self, patch: &FormatPatch) {
        if patch.is_empty() {
            return;
        }
        let mut cf = CharFormat2W::empty();
        let mut set_effect = |on: Option<bool>, mask: u32, effect: u32| {
            if let Some(on) = on {
                cf.dwMask |= mask;
                if on {
                    cf.dwEffects |= effect;
                }
            }
        };
        set_effect(patch.bold, CFM_BOLD, CFE_BOLD);
        set_effect(patch.italic, CFM_ITALIC, CFE_ITALIC);
        set_effect(patch.underline, CFM_UNDERLINE, CFE_UNDERLINE);
        if let Some(size) = patch.size {
            cf.dwMask |= CFM_SIZE;
            cf.yHeight = size.to_twips();
        }
        if let Some(color) = patch.color {
            // CFE_AUTOCOLOR stays clear so the explicit colour is used.
            cf.dwMask |= CFM_COLOR;
            cf.crTextColor = color.to_colorref();
        }
        self.set_format(SCF_SELECTION, &cf);
    }

    /// Set the face and size used for text in an empty document.
    pub(crate) fn set_default_font(&self, face: &str, size: FontSize) {
        let mut cf = CharFormat2W::empty();
        cf.dwMask = CFM_FACE | CFM_SIZE;
        cf.yHeight = size.to_twips();
        for (dst, src) in cf.szFaceName.iter_mut().zip(face.encode_utf16().take(LF_FACESIZE - 1)) {
            *dst = src;
        }
        self.set_format(SCF_DEFAULT, &cf);
    }

    /// Set the colour used for text that carries no explicit colour.
    pub(crate) fn set_default_color(&self, color: Rgb) {
        let mut cf = CharFormat2W::empty();
        cf.dwMask = CFM_COLOR;
        cf.crTextColor = color.to_colorref();
        self.set_format(SCF_DEFAULT, &cf);
        if self.len_chars() == 0 {
            // An empty document types with the insertion-point format.
            self.set_format(SCF_SELECTION, &cf);
        }
    }

    /// Set the editor background.
    pub(crate) fn set_background(&self, color: Rgb) {
        // SAFETY: hwnd valid; WPARAM=0 means "use the COLORREF in LPARAM".
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_SETBKGNDCOLOR,
                WPARAM(0),
                LPARAM(color.to_colorref() as isize),
            );
        }
    }

    /// Recolour every run drawn in `from` to `to`, leaving other colours
    /// alone.  Selection, modify flag and undo history are preserved.
    ///
    /// Ranges with a uniform colour are handled with one query; mixed ranges
    /// are split in half until they are uniform.
    pub(crate) fn recolor_runs(&self, from: Rgb, to: Rgb) {
        let len = i32::try_from(self.len_chars()).unwrap_or(i32::MAX);
        if len == 0 {
            return;
        }

        let saved_sel = self.selection();
        let was_modified = self.is_modified();
        let _undo = UndoSuspension::begin(self);
        self.set_redraw(false);
        // SAFETY: hwnd valid; hide the selection highlight while it moves.
        unsafe { let _ = SendMessageW(self.hwnd, EM_HIDESELECTION, WPARAM(1), LPARAM(0)); }

        let mut target = CharFormat2W::empty();
        target.dwMask = CFM_COLOR;
        target.crTextColor = to.to_colorref();

        let mut pending = vec![(0, len)];
        while let Some((start, end)) = pending.pop() {
            self.set_selection(CharRange { cpMin: start, cpMax: end });
            let cf = self.get_format(SCF_SELECTION);
            let uniform = cf.dwMask & CFM_COLOR != 0;
            if uniform {
                let explicit = cf.dwEffects & CFE_AUTOCOLOR == 0;
                if explicit && Rgb::from_colorref(cf.crTextColor) == from {
                    self.set_format(SCF_SELECTION, &target);
                }
            } else if end - start > 1 {
                let mid = start + (end - start) / 2;
                pending.push((mid, end));
                pending.push((start, mid));
            }
        }

        self.set_selection(saved_sel);
        // SAFETY: hwnd valid; restore the selection highlight.
        unsafe { let _ = SendMessageW(self.hwnd, EM_HIDESELECTION, WPARAM(0), LPARAM(0)); }
        self.set_redraw(true);
        self.set_modified(was_modified);
    }

    fn set_redraw(&self, enabled: bool) {
        // SAFETY: hwnd valid; WM_SETREDRAW takes a BOOL by value.
        unsafe {
            let _ = SendMessageW(self.hwnd, WM_SETREDRAW, WPARAM(usize::from(enabled)), LPARAM(0));
            if enabled {
                let _ = InvalidateRect(self.hwnd, None, true);
            }
        }
    }

    /// The control's Text Object Model document, if it exposes one.
    fn text_document(&self) -> Option<ITextDocument> {
        let mut raw: *mut c_void = std::ptr::null_mut();
        // SAFETY: hwnd valid; raw is a writable pointer slot that receives an
        // AddRef'd IRichEditOle pointer (or stays null on failure).
        unsafe {
            let _ = SendMessageW(
                self.hwnd,
                EM_GETOLEINTERFACE,
                WPARAM(0),
                LPARAM(&mut raw as *mut *mut c_void as isize),
            );
        }
        if raw.is_null() {
            return None;
        }
        // SAFETY: raw is a live IRichEditOle whose reference we now own;
        // from_raw takes over that reference and releases it on drop.
        let ole = unsafe { IRichEditOle::from_raw(raw) };
        ole.cast::<ITextDocument>().ok()
    }
}

// ── Undo suspension ───────────────────────────────────────────────────────────

/// Stops the control from recording undo steps until dropped.
struct UndoSuspension(Option<ITextDocument>);

impl UndoSuspension {
    fn begin(view: &RichEditView) -> Self {
        let doc = view.text_document();
        if let Some(doc) = &doc {
            // SAFETY: doc is a live ITextDocument of the control on this thread.
            if let Err(e) = unsafe { doc.Undo(TOM_SUSPEND) } {
                tracing::debug!(error = %e, "could not suspend undo");
            }
        }
        Self(doc)
    }
}

impl Drop for UndoSuspension {
    fn drop(&mut self) {
        if let Some(doc) = &self.0 {
            // SAFETY: same document as in `begin`; resuming is always valid.
            let _ = unsafe { doc.Undo(TOM_RESUME) };
        }
    }
}
