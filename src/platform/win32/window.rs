// ── Main window ───────────────────────────────────────────────────────────────
//
// Responsibilities in this file (unsafe confined here):
//   • Register the main window class.
//   • Create the top-level window, its menu bar and accelerator table.
//   • Run the Win32 message loop.
//   • Own `WindowState` (app + editor + settings) through GWLP_USERDATA.
//   • Dispatch `Command`s from WM_COMMAND to the editor and dialogs.
//   • Expose a safe error-dialog helper for use by main().
//
// Window layout: the rich-edit child fills the client area minus a one-pixel
// frame painted in the palette's border colour.

#![allow(unsafe_code)]

use std::{
    cell::{Cell, RefCell},
    ffi::c_void,
};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{
            GetLastError, BOOL, COLORREF, HINSTANCE, HWND, LPARAM, LRESULT, RECT, WPARAM,
        },
        Graphics::{
            Dwm::{DwmSetWindowAttribute, DWMWA_USE_IMMERSIVE_DARK_MODE},
            Gdi::{
                BeginPaint, CreateSolidBrush, DeleteObject, EndPaint, FillRect, InvalidateRect,
                HBRUSH, HGDIOBJ, PAINTSTRUCT,
            },
        },
        System::LibraryLoader::GetModuleHandleW,
        UI::WindowsAndMessaging::{
            AppendMenuW, CreateAcceleratorTableW, CreateMenu, CreatePopupMenu, CreateWindowExW,
            DefWindowProcW, DestroyAcceleratorTable, DestroyWindow, DispatchMessageW,
            GetClientRect, GetMessageW, GetWindowLongPtrW, GetWindowPlacement, LoadCursorW,
            LoadIconW, PostMessageW, PostQuitMessage, RegisterClassExW, SetMenu,
            SetWindowLongPtrW, SetWindowPos, SetWindowTextW, ShowWindow, TranslateAcceleratorW,
            TranslateMessage, UpdateWindow, ACCEL, CREATESTRUCTW, FCONTROL, FVIRTKEY,
            GWLP_USERDATA, HACCEL, HMENU, IDC_ARROW, IDI_APPLICATION, MF_POPUP, MF_SEPARATOR,
            MF_STRING, MSG, SWP_NOACTIVATE, SWP_NOZORDER, SW_SHOW, WINDOWPLACEMENT,
            WINDOW_EX_STYLE, WM_CLOSE, WM_COMMAND, WM_CREATE, WM_DESTROY, WM_DPICHANGED,
            WM_ERASEBKGND, WM_NCDESTROY, WM_PAINT, WM_SETFOCUS, WM_SIZE, WNDCLASSEXW,
            WS_CLIPCHILDREN, WS_OVERLAPPEDWINDOW,
        },
    },
};

use super::{
    dialogs::{self, SaveChoice},
    dpi, prompt, wide,
};
use crate::{
    app::{App, SaveOutcome, ABOUT_TEXT, APP_NAME, HELP_TEXT},
    commands::{Command, MenuEntry, CTRL_ACCELERATORS, MENU_BAR},
    editor::richedit::{messages::EN_CHANGE, RichEditDll, RichEditView, EDITOR_CONTROL_ID},
    error::{QuillError, Result},
    format::{FontSize, FormatPatch, Toggle},
    settings::{self, Settings, WindowPlacement},
    theme::{self, Palette},
};

// ── Window identity ───────────────────────────────────────────────────────────

/// Atom name used to register (and later find) the main window class.
const CLASS_NAME: PCWSTR = w!("QuillMainWindow");

/// Width of the themed frame around the editor, in pixels.
const BORDER: i32 = 1;

// ── Window state ──────────────────────────────────────────────────────────────

/// Document and preferences.  Lives in a `RefCell` because the rich-edit
/// control and modal dialogs call back into the WndProc while a handler is
/// still running; borrows are kept short and never span such a call.
struct Model {
    app: App,
    settings: Settings,
}

/// Everything the WndProc needs, owned by the window via `GWLP_USERDATA`.
///
/// Allocated in `WM_CREATE`, freed in `WM_NCDESTROY`.  Handlers only ever see
/// `&WindowState`; mutation goes through `model` and `border_brush`.  Field
/// order is drop order: the view must go before the DLL that registered its
/// class.
struct WindowState {
    model: RefCell<Model>,
    view: RichEditView,
    _dll: RichEditDll,
    hinstance: HINSTANCE,
    border_brush: Cell<HBRUSH>,
}

impl WindowState {
    /// Run `f` on the model, or return `None` when a handler further up the
    /// stack already holds it.
    fn with_model<R>(&self, f: impl FnOnce(&mut Model) -> R) -> Option<R> {
        with_exclusive(&self.model, f)
    }
}

impl Drop for WindowState {
    fn drop(&mut self) {
        let brush = self.border_brush.get();
        if !brush.is_invalid() {
            // SAFETY: the brush was created by CreateSolidBrush and is not
            // selected into any DC (FillRect does not select it).
            unsafe {
                let _ = DeleteObject(HGDIOBJ(brush.0));
            }
        }
    }
}

/// Mutably borrow `cell` for the duration of `f`, skipping re-entrant calls
/// instead of panicking.
fn with_exclusive<T, R>(cell: &RefCell<T>, f: impl FnOnce(&mut T) -> R) -> Option<R> {
    match cell.try_borrow_mut() {
        Ok(mut value) => Some(f(&mut value)),
        Err(_) => {
            tracing::trace!("state busy; re-entrant update skipped");
            None
        }
    }
}

/// Passed through `CreateWindowExW`'s `lpParam`.  `WM_CREATE` moves the
/// settings out and, on failure, leaves the reason in `error`.
struct CreateParams {
    settings: Settings,
    error: Option<QuillError>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Register the main window class, create the window, and drive the message
/// loop until the user closes the application.
///
/// Records a startup timestamp and logs elapsed time (debug builds only) once
/// the window is first shown on screen.
pub(crate) fn run(settings: Settings) -> Result<()> {
    #[cfg(debug_assertions)]
    let t0 = std::time::Instant::now();

    dpi::init();

    // SAFETY: GetModuleHandleW(None) returns the .exe's own HMODULE, which is
    // always valid for the process lifetime.
    let hmodule = unsafe { GetModuleHandleW(None) }?;
    let hinstance = HINSTANCE(hmodule.0);

    register_class(hinstance)?;

    let placement = if settings.window.is_usable() {
        settings.window
    } else {
        WindowPlacement::default()
    };
    let placement = dpi::scale_placement(placement, dpi::get_system_dpi());

    let mut params = CreateParams { settings, error: None };
    let hwnd = create_window(hinstance, placement, &mut params)?;
    let accel = build_accelerators()?;

    // SAFETY: hwnd was just returned by CreateWindowExW and is valid.
    unsafe {
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = UpdateWindow(hwnd);
    }

    #[cfg(debug_assertions)]
    tracing::debug!(
        elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
        "window visible"
    );

    let result = message_loop(hwnd, accel);

    // SAFETY: accel came from CreateAcceleratorTableW and is no longer used.
    unsafe {
        let _ = DestroyAcceleratorTable(accel);
    }
    result
}

/// Show a modal error dialog with the given message.
///
/// Used by `main()` when `run()` returns an error; there is no owner window.
pub(crate) fn show_error_dialog(message: &str) {
    dialogs::show_error(
        HWND::default(),
        &format!("{APP_NAME} \u{2014} Fatal Error"),
        message,
    );
}

// ── Window class registration ─────────────────────────────────────────────────

fn register_class(hinstance: HINSTANCE) -> Result<()> {
    // SAFETY: IDI_APPLICATION and IDC_ARROW are built-in resources that
    // exist on all Windows versions.
    let icon = unsafe { LoadIconW(None, IDI_APPLICATION) }?;
    let cursor = unsafe { LoadCursorW(None, IDC_ARROW) }?;

    let wndclass = WNDCLASSEXW {
        cbSize: std::mem::size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(wnd_proc),
        hInstance: hinstance,
        hIcon: icon,
        hCursor: cursor,
        // WM_PAINT fills the frame; no class brush.
        hbrBackground: HBRUSH::default(),
        lpszClassName: CLASS_NAME,
        hIconSm: icon,
        ..Default::default()
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

fn create_window(
    hinstance: HINSTANCE,
    placement: WindowPlacement,
    params: &mut CreateParams,
) -> Result<HWND> {
    let title = wide(APP_NAME);

    // SAFETY: CLASS_NAME was just registered.  `params` outlives the call;
    // WM_CREATE reads it synchronously and keeps no reference to it.
    let created = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            CLASS_NAME,
            PCWSTR(title.as_ptr()),
            WS_OVERLAPPEDWINDOW | WS_CLIPCHILDREN,
            placement.x,
            placement.y,
            placement.width,
            placement.height,
            HWND::default(),
            HMENU::default(),
            hinstance,
            Some(params as *mut CreateParams as *const c_void),
        )
    };

    let hwnd = match created {
        Ok(h) if h != HWND::default() => h,
        _ => {
            let fallback = last_error("CreateWindowExW");
            return Err(params.error.take().unwrap_or(fallback));
        }
    };

    let menu = build_menu()?;
    // SAFETY: hwnd and menu are valid handles; the window owns the menu from
    // here on and destroys it with itself.
    unsafe { SetMenu(hwnd, menu) }?;

    Ok(hwnd)
}

impl WindowState {
    /// Build the editor and apply the persisted font and theme.
    fn create(hwnd: HWND, hinstance: HINSTANCE, settings: Settings) -> Result<Box<Self>> {
        let dll = RichEditDll::load()?;
        let view = RichEditView::create(hwnd, hinstance, &dll)?;
        let app = App::new(settings.dark_mode);

        let size = FontSize::new(settings.font_size)
            .or_else(|| FontSize::new(Settings::default().font_size));
        if let Some(size) = size {
            view.set_default_font(&settings.font_face, size);
        }

        Ok(Box::new(Self {
            model: RefCell::new(Model { app, settings }),
            view,
            _dll: dll,
            hinstance,
            border_brush: Cell::new(HBRUSH::default()),
        }))
    }
}

// ── Menu construction ─────────────────────────────────────────────────────────

fn build_menu() -> Result<HMENU> {
    // SAFETY: CreateMenu / CreatePopupMenu have no preconditions; labels are
    // null-terminated UTF-16 that outlive each AppendMenuW call (the menu
    // copies the text).
    unsafe {
        let bar = CreateMenu()?;
        for menu in &MENU_BAR {
            let popup = CreatePopupMenu()?;
            for entry in menu.entries {
                match entry {
                    MenuEntry::Item(cmd) => {
                        let label = wide(cmd.label());
                        AppendMenuW(
                            popup,
                            MF_STRING,
                            usize::from(cmd.id()),
                            PCWSTR(label.as_ptr()),
                        )?;
                    }
                    MenuEntry::Separator => {
                        AppendMenuW(popup, MF_SEPARATOR, 0, PCWSTR::null())?;
                    }
                }
            }
            // The uIDNewItem parameter for MF_POPUP is the child HMENU.
            let title = wide(menu.title);
            AppendMenuW(bar, MF_POPUP, popup.0 as usize, PCWSTR(title.as_ptr()))?;
        }
        Ok(bar)
    }
}

fn build_accelerators() -> Result<HACCEL> {
    let table: Vec<ACCEL> = CTRL_ACCELERATORS
        .iter()
        .map(|&(key, cmd)| ACCEL {
            fVirt: FVIRTKEY | FCONTROL,
            key: u16::from(key),
            cmd: cmd.id(),
        })
        .collect();
    // SAFETY: table is a valid ACCEL slice; the system copies it.
    let accel = unsafe { CreateAcceleratorTableW(&table) }?;
    Ok(accel)
}

// ── Message loop ──────────────────────────────────────────────────────────────

fn message_loop(hwnd: HWND, accel: HACCEL) -> Result<()> {
    let mut msg = MSG::default();

    loop {
        // SAFETY: &mut msg is a valid MSG pointer; HWND::default() retrieves
        // messages for all windows on this thread; 0,0 filter accepts all.
        let ret = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };

        match ret.0 {
            -1 => return Err(last_error("GetMessageW")),
            0 => break,
            _ => unsafe {
                // SAFETY: msg was populated by a successful GetMessageW call.
                // Accelerators are translated first so Ctrl+S reaches the
                // main window even while the editor has focus.
                if TranslateAcceleratorW(hwnd, accel, &msg) == 0 {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            },
        }
    }

    Ok(())
}

// ── Window procedure ──────────────────────────────────────────────────────────

// SAFETY: wnd_proc is registered as lpfnWndProc in WNDCLASSEXW.
// GWLP_USERDATA holds either 0 or a pointer produced by Box::into_raw in
// WM_CREATE, which stays valid until WM_NCDESTROY reclaims it.  Only shared
// references are formed from it, so the nested calls that re-enter this
// procedure (EN_CHANGE from the control, dialogs' message loops) alias
// soundly; mutable state sits behind RefCell / Cell.
unsafe extern "system" fn wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_CREATE {
        return on_create(hwnd, lparam);
    }
    if msg == WM_NCDESTROY {
        let raw = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) as *mut WindowState;
        if !raw.is_null() {
            drop(Box::from_raw(raw));
        }
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    }

    let raw = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowState;
    let Some(state) = raw.as_ref() else {
        return DefWindowProcW(hwnd, msg, wparam, lparam);
    };

    match msg {
        // ── Lifecycle ─────────────────────────────────────────────────────────
        WM_CLOSE => {
            // `state` is freed inside DestroyWindow (WM_NCDESTROY) and must
            // not be touched afterwards.
            if confirm_discard(hwnd, state) {
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }

        WM_DESTROY => {
            persist_settings(hwnd, state);
            PostQuitMessage(0);
            LRESULT(0)
        }

        // ── Layout & painting ─────────────────────────────────────────────────
        WM_SIZE => {
            let width = (lparam.0 & 0xFFFF) as i32;
            let height = ((lparam.0 >> 16) & 0xFFFF) as i32;
            state
                .view
                .move_to(BORDER, BORDER, width - 2 * BORDER, height - 2 * BORDER);
            LRESULT(0)
        }

        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            let hdc = BeginPaint(hwnd, &mut ps);
            let mut rc = RECT::default();
            if GetClientRect(hwnd, &mut rc).is_ok() {
                // WS_CLIPCHILDREN keeps this out of the editor's area.
                FillRect(hdc, &rc, state.border_brush.get());
            }
            let _ = EndPaint(hwnd, &ps);
            LRESULT(0)
        }

        WM_ERASEBKGND => LRESULT(1),

        WM_SETFOCUS => {
            state.view.focus();
            LRESULT(0)
        }

        WM_DPICHANGED => {
            // lparam points at the suggested window rectangle for the new DPI.
            if let Some(rc) = (lparam.0 as *const RECT).as_ref() {
                let _ = SetWindowPos(
                    hwnd,
                    HWND::default(),
                    rc.left,
                    rc.top,
                    rc.right - rc.left,
                    rc.bottom - rc.top,
                    SWP_NOZORDER | SWP_NOACTIVATE,
                );
            }
            LRESULT(0)
        }

        // ── Commands ──────────────────────────────────────────────────────────
        WM_COMMAND => {
            let id = (wparam.0 & 0xFFFF) as u16;
            let code = ((wparam.0 >> 16) & 0xFFFF) as u32;

            if usize::from(id) == EDITOR_CONTROL_ID {
                // Sent synchronously from inside paste, undo, set_text and
                // friends; a busy model skips it and the command that caused
                // it syncs afterwards.
                if code == EN_CHANGE {
                    sync_dirty(hwnd, state);
                }
                return LRESULT(0);
            }

            match Command::from_id(id) {
                Some(cmd) => {
                    handle_command(hwnd, state, cmd);
                    LRESULT(0)
                }
                None => DefWindowProcW(hwnd, msg, wparam, lparam),
            }
        }

        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

/// Build `WindowState` and hand it to the window.  Returning -1 makes
/// `CreateWindowExW` fail; the reason is left in `CreateParams::error`.
///
/// # Safety
/// Must only be called for `WM_CREATE` with the `lparam` Windows supplied.
unsafe fn on_create(hwnd: HWND, lparam: LPARAM) -> LRESULT {
    let cs = &*(lparam.0 as *const CREATESTRUCTW);
    let Some(params) = (cs.lpCreateParams as *mut CreateParams).as_mut() else {
        return LRESULT(-1);
    };

    let settings = std::mem::take(&mut params.settings);
    let palette = theme::palette(settings.dark_mode);
    match WindowState::create(hwnd, cs.hInstance, settings) {
        Ok(state) => {
            apply_palette(hwnd, &state, None, palette);
            update_title(hwnd, &state);
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);
            LRESULT(0)
        }
        Err(e) => {
            tracing::error!(error = %e, "could not create the editor");
            params.error = Some(e);
            LRESULT(-1)
        }
    }
}

// ── Command dispatch ──────────────────────────────────────────────────────────

fn handle_command(hwnd: HWND, state: &WindowState, cmd: Command) {
    tracing::debug!(?cmd, "command");

    match cmd {
        // ── File ──────────────────────────────────────────────────────────────
        Command::New => {
            if confirm_discard(hwnd, state) {
                state.view.clear();
                state.with_model(|m| m.app.new_file());
                mark_clean(hwnd, state);
            }
        }
        Command::Open => open(hwnd, state),
        Command::Save => {
            save(hwnd, state);
        }
        Command::SaveAs => {
            save_as(hwnd, state);
        }
        Command::Exit => {
            // Posted so WM_CLOSE runs after this handler has returned.
            // SAFETY: hwnd is the live main window.
            unsafe {
                let _ = PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0));
            }
        }

        // ── Edit ──────────────────────────────────────────────────────────────
        Command::Undo => state.view.undo(),
        Command::Redo => state.view.redo(),
        Command::Cut => state.view.cut(),
        Command::Copy => state.view.copy_to_clipboard(),
        Command::Paste => state.view.paste(),

        // ── Format ────────────────────────────────────────────────────────────
        Command::Bold => toggle(hwnd, state, Toggle::Bold),
        Command::Italic => toggle(hwnd, state, Toggle::Italic),
        Command::Underline => toggle(hwnd, state, Toggle::Underline),
        Command::FontSize => change_font_size(hwnd, state),
        Command::TextColor => change_text_color(hwnd, state),

        // ── View ──────────────────────────────────────────────────────────────
        Command::ToggleDarkMode => {
            let toggled = state.with_model(|m| {
                let previous = m.app.palette();
                (previous, m.app.toggle_dark_mode())
            });
            if let Some((previous, next)) = toggled {
                apply_palette(hwnd, state, Some(previous), next);
            }
        }

        // ── About / Help ──────────────────────────────────────────────────────
        Command::About => dialogs::show_info(hwnd, "About", ABOUT_TEXT),
        Command::HelpContents => dialogs::show_info(hwnd, "Help", HELP_TEXT),
    }

    if cmd.is_edit_passthrough() {
        sync_dirty(hwnd, state);
    } else {
        state.view.focus();
    }
}

fn toggle(hwnd: HWND, state: &WindowState, attr: Toggle) {
    let patch = state.view.selection_format().toggled(attr);
    state.view.merge_format(&patch);
    sync_dirty(hwnd, state);
}

fn change_font_size(hwnd: HWND, state: &WindowState) {
    let current = state.view.selection_format().size;
    if let Some(size) = prompt::prompt_font_size(hwnd, state.hinstance, current) {
        tracing::debug!(points = size.points(), "font size changed");
        state.view.merge_format(&FormatPatch::size(size));
        sync_dirty(hwnd, state);
    }
}

fn change_text_color(hwnd: HWND, state: &WindowState) {
    let Some((fallback, mut custom)) =
        state.with_model(|m| (m.app.palette().text, m.settings.custom_colors))
    else {
        return;
    };
    let initial = state.view.selection_format().color.unwrap_or(fallback);

    let picked = dialogs::choose_color(hwnd, Some(initial), &mut custom);
    state.with_model(|m| m.settings.custom_colors = custom);

    if let Some(color) = picked {
        tracing::debug!(%color, "text colour changed");
        state.view.merge_format(&FormatPatch::color(color));
        sync_dirty(hwnd, state);
    }
}

// ── File operations ───────────────────────────────────────────────────────────

fn open(hwnd: HWND, state: &WindowState) {
    if !confirm_discard(hwnd, state) {
        return;
    }
    let Some(path) = dialogs::show_open_dialog(hwnd) else {
        return;
    };
    let shown = path.display().to_string();
    match state.with_model(|m| m.app.open(path)) {
        Some(Ok(text)) => {
            state.view.set_text(&text);
            mark_clean(hwnd, state);
        }
        Some(Err(e)) => tracing::warn!(path = %shown, error = %e, "could not open file"),
        None => {}
    }
}

/// File ▸ Save.  Returns `true` once the document is on disk.
fn save(hwnd: HWND, state: &WindowState) -> bool {
    let text = state.view.text();
    match state.with_model(|m| m.app.save(&text)) {
        Some(Ok(SaveOutcome::Saved)) => {
            mark_clean(hwnd, state);
            true
        }
        Some(Ok(SaveOutcome::NeedsPath)) => save_as(hwnd, state),
        Some(Err(e)) => {
            report_save_error(hwnd, state, &e);
            false
        }
        None => false,
    }
}

/// File ▸ Save As.  Returns `true` once the document is on disk.
fn save_as(hwnd: HWND, state: &WindowState) -> bool {
    let default_name = state
        .with_model(|m| m.app.doc.path.is_some().then(|| m.app.doc.display_name()))
        .flatten()
        .unwrap_or_default();
    let Some(path) = dialogs::show_save_dialog(hwnd, &default_name) else {
        return false;
    };

    let text = state.view.text();
    match state.with_model(|m| m.app.save_as(path, &text)) {
        Some(Ok(())) => {
            mark_clean(hwnd, state);
            true
        }
        Some(Err(e)) => {
            // The new name is kept, so the title changes either way.
            update_title(hwnd, state);
            report_save_error(hwnd, state, &e);
            false
        }
        None => false,
    }
}

fn report_save_error(hwnd: HWND, state: &WindowState, err: &QuillError) {
    let name = state
        .with_model(|m| m.app.doc.display_name())
        .unwrap_or_default();
    tracing::error!(file = %name, error = %err, "save failed");
    dialogs::show_error(hwnd, APP_NAME, &format!("Could not save {name}.\n\n{err}"));
}

/// Ask to save unsaved changes.  `false` means the user cancelled (or the
/// save failed) and the pending action must not run.
fn confirm_discard(hwnd: HWND, state: &WindowState) -> bool {
    let question = match state.with_model(|m| m.app.doc.dirty.then(|| m.app.unsaved_prompt())) {
        Some(Some(q)) => q,
        Some(None) => return true,
        None => return false,
    };
    match dialogs::confirm_save(hwnd, &question) {
        SaveChoice::Save => save(hwnd, state),
        SaveChoice::Discard => true,
        SaveChoice::Cancel => false,
    }
}

/// After new, open or a successful write: buffer and disk agree.
fn mark_clean(hwnd: HWND, state: &WindowState) {
    state.view.set_modified(false);
    state.with_model(|m| m.app.set_dirty(false));
    update_title(hwnd, state);
}

/// Mirror the control's modify flag into the document.
fn sync_dirty(hwnd: HWND, state: &WindowState) {
    let modified = state.view.is_modified();
    if state.with_model(|m| m.app.set_dirty(modified)) == Some(true) {
        update_title(hwnd, state);
    }
}

fn update_title(hwnd: HWND, state: &WindowState) {
    let Some(title) = state.with_model(|m| m.app.window_title()) else {
        return;
    };
    let title = wide(&title);
    // SAFETY: hwnd is the main window; title is null-terminated UTF-16.
    unsafe {
        let _ = SetWindowTextW(hwnd, PCWSTR(title.as_ptr()));
    }
}

// ── Theme ─────────────────────────────────────────────────────────────────────

/// Push `next` to the editor, the frame and the title bar.
fn apply_palette(hwnd: HWND, state: &WindowState, previous: Option<&Palette>, next: &Palette) {
    theme::apply_theme(&state.view, previous, next);

    // SAFETY: hwnd is the main window.  The old brush is no longer referenced
    // once replaced, so deleting it is sound.  DwmSetWindowAttribute reads a
    // BOOL from a pointer that outlives the call.
    unsafe {
        let brush = CreateSolidBrush(COLORREF(next.border.to_colorref()));
        if !brush.is_invalid() {
            let old = state.border_brush.replace(brush);
            if !old.is_invalid() {
                let _ = DeleteObject(HGDIOBJ(old.0));
            }
        }

        let dark = BOOL::from(next.dark_title_bar);
        if let Err(e) = DwmSetWindowAttribute(
            hwnd,
            DWMWA_USE_IMMERSIVE_DARK_MODE,
            &dark as *const BOOL as *const c_void,
            std::mem::size_of::<BOOL>() as u32,
        ) {
            tracing::debug!(error = %e, "dark title bar not supported");
        }

        let _ = InvalidateRect(hwnd, None, true);
    }

    tracing::debug!(palette = next.name, "palette applied");
}

// ── Settings ──────────────────────────────────────────────────────────────────

fn persist_settings(hwnd: HWND, state: &WindowState) {
    let mut wp = WINDOWPLACEMENT {
        length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
        ..Default::default()
    };
    // SAFETY: hwnd is still valid during WM_DESTROY; wp has length set.
    let placement = unsafe { GetWindowPlacement(hwnd, &mut wp) }
        .ok()
        .map(|()| {
            let rc = wp.rcNormalPosition;
            let physical = WindowPlacement {
                x: rc.left,
                y: rc.top,
                width: rc.right - rc.left,
                height: rc.bottom - rc.top,
            };
            dpi::unscale_placement(physical, dpi::get_for_window(hwnd))
        })
        .filter(WindowPlacement::is_usable);

    state.with_model(|m| {
        if let Some(placement) = placement {
            m.settings.window = placement;
        }
        m.settings.dark_mode = m.app.dark_mode();
        settings::save(&m.settings);
    });
}

// ── Error helpers ─────────────────────────────────────────────────────────────

/// Capture the current Win32 last-error code and wrap it in a `QuillError`.
///
/// Call immediately after a Win32 function that signals failure; `GetLastError`
/// reads thread-local state that can be overwritten by any subsequent API call.
fn last_error(function: &'static str) -> QuillError {
    // SAFETY: GetLastError reads thread-local state set by the last Win32 call.
    let code = unsafe { GetLastError() };
    QuillError::Win32 {
        function,
        code: code.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exclusive_borrow_runs_the_closure() {
        let cell = RefCell::new(1);
        let bumped = with_exclusive(&cell, |v| {
            *v += 1;
            *v
        });
        assert_eq!(bumped, Some(2));
        assert_eq!(*cell.borrow(), 2);
    }

    #[test]
    fn nested_borrow_is_skipped_not_aliased() {
        // Mirrors EN_CHANGE arriving while a command handler holds the model.
        let cell = RefCell::new(Vec::new());
        let outer = with_exclusive(&cell, |v| {
            v.push("outer");
            with_exclusive(&cell, |inner| inner.push("inner"))
        });
        assert_eq!(outer, Some(None));
        assert_eq!(*cell.borrow(), vec!["outer"]);
    }

    #[test]
    fn borrow_is_released_between_calls() {
        let cell = RefCell::new(0);
        assert!(with_exclusive(&cell, |v| *v = 5).is_some());
        assert!(with_exclusive(&cell, |v| *v = 6).is_some());
        assert_eq!(*cell.borrow(), 6);
    }
}
