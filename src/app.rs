// ── Application lifecycle & top-level state ────────────────────────────────────
//
// A single `App` is created on startup and owned by `WindowState` for the
// lifetime of the main window.  All mutations happen on the UI thread — there
// is no global mutable state.  The text itself lives in the rich-edit
// control; `App` owns everything about the document that the control does
// not: where it lives on disk, how it is encoded there, and whether it has
// unsaved changes.

use std::path::{Path, PathBuf};

use crate::{
    document::{self, EolMode, Encoding},
    error::Result,
    theme::{self, Palette},
};

/// Application name shown in the title bar and dialogs.
pub(crate) const APP_NAME: &str = "Text Editor";

/// Body of the About box.
pub(crate) const ABOUT_TEXT: &str =
    "Simple Text Editor\n\nVersion 1.0\n\nDeveloped By Sahampath";

/// Body of Help ▸ Contents.
pub(crate) const HELP_TEXT: &str =
    "This is a simple text editor.\nYou can open, edit, and save text files.";

// ── DocumentState ─────────────────────────────────────────────────────────────

/// Per-document state for the currently open file.
#[derive(Debug)]
pub(crate) struct DocumentState {
    /// Absolute path to the file on disk, or `None` for an untitled buffer.
    pub(crate) path: Option<PathBuf>,
    /// The encoding used to read (and that will be used to write) the file.
    pub(crate) encoding: Encoding,
    /// The EOL convention detected in the file.
    pub(crate) eol: EolMode,
    /// `true` when the buffer contains changes not yet saved to disk.
    pub(crate) dirty: bool,
}

impl DocumentState {
    /// A fresh, untitled document with Windows defaults.
    fn new_untitled() -> Self {
        Self {
            path: None,
            encoding: Encoding::Utf8,
            eol: EolMode::Crlf,
            dirty: false,
        }
    }

    /// The bare filename component, or `"Untitled"` if no path is set.
    pub(crate) fn display_name(&self) -> String {
        self.path
            .as_deref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled".to_owned())
    }
}

/// Result of File ▸ Save.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum SaveOutcome {
    /// The file was written.
    Saved,
    /// The document has no path yet; the caller must run Save As.
    NeedsPath,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Top-level application state.
///
/// Passed by mutable reference through WndProc handlers so that all
/// application logic sees a single, explicit state root rather than a
/// collection of disconnected globals.
pub(crate) struct App {
    /// State of the currently open document.
    pub(crate) doc: DocumentState,
    /// Which palette is applied to the window.
    dark_mode: bool,
}

impl App {
    /// Create a fresh `App` with an untitled, empty document.
    pub(crate) fn new(dark_mode: bool) -> Self {
        Self {
            doc: DocumentState::new_untitled(),
            dark_mode,
        }
    }

    /// Compute the title string for the main window.
    ///
    /// | State | Title |
    /// |---|---|
    /// | No path, clean | `"Text Editor"` |
    /// | Path set, clean | `"filename — Text Editor"` |
    /// | Path set, dirty | `"*filename — Text Editor"` |
    /// | No path, dirty | `"*Untitled — Text Editor"` |
    pub(crate) fn window_title(&self) -> String {
        if self.doc.path.is_none() && !self.doc.dirty {
            return APP_NAME.to_owned();
        }
        let dirty = if self.doc.dirty { "*" } else { "" };
        format!("{dirty}{} \u{2014} {APP_NAME}", self.doc.display_name())
    }

    /// Question asked before discarding unsaved changes.
    pub(crate) fn unsaved_prompt(&self) -> String {
        format!("Do you want to save changes to {}?", self.doc.display_name())
    }

    /// Record whether the buffer differs from disk.  Returns `true` when the
    /// flag changed, i.e. the title needs refreshing.
    pub(crate) fn set_dirty(&mut self, dirty: bool) -> bool {
        let changed = self.doc.dirty != dirty;
        self.doc.dirty = dirty;
        changed
    }

    // ── File new / open ───────────────────────────────────────────────────────

    /// Forget the current file association.  The caller clears the control.
    pub(crate) fn new_file(&mut self) {
        self.doc = DocumentState::new_untitled();
    }

    /// Read `path` and make it the current document.
    ///
    /// Returns the text to load into the control (`\n` line breaks).  On a
    /// read or decode error the current document is left untouched.
    pub(crate) fn open(&mut self, path: PathBuf) -> Result<String> {
        let bytes = std::fs::read(&path)?;
        self.open_file(path, &bytes)
    }

    /// Update document state from bytes already read from `path`.
    pub(crate) fn open_file(&mut self, path: PathBuf, bytes: &[u8]) -> Result<String> {
        let decoded = document::decode(bytes)?;
        tracing::info!(
            path = %path.display(),
            encoding = decoded.encoding.as_str(),
            eol = decoded.eol.as_str(),
            "opened file"
        );
        self.doc = DocumentState {
            path: Some(path),
            encoding: decoded.encoding,
            eol: decoded.eol,
            dirty: false,
        };
        Ok(decoded.text)
    }

    // ── File save ─────────────────────────────────────────────────────────────

    /// Write `text` to the current path.
    ///
    /// On success clears `doc.dirty`.  The caller is responsible for
    /// resetting the control's modify flag.
    pub(crate) fn save(&mut self, text: &str) -> Result<SaveOutcome> {
        let Some(path) = self.doc.path.as_deref() else {
            return Ok(SaveOutcome::NeedsPath);
        };
        write_document(path, text, self.doc.encoding, self.doc.eol)?;
        self.doc.dirty = false;
        Ok(SaveOutcome::Saved)
    }

    /// Associate the document with `path`, then save.
    ///
    /// The association is kept even if the write fails.
    pub(crate) fn save_as(&mut self, path: PathBuf, text: &str) -> Result<()> {
        self.doc.path = Some(path);
        self.save(text).map(|_| ())
    }

    // ── Theme ─────────────────────────────────────────────────────────────────

    pub(crate) fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    pub(crate) fn palette(&self) -> &'static Palette {
        theme::palette(self.dark_mode)
    }

    /// Flip the theme flag.  Returns the palette to apply.
    pub(crate) fn toggle_dark_mode(&mut self) -> &'static Palette {
        self.dark_mode = !self.dark_mode;
        tracing::debug!(dark_mode = self.dark_mode, "theme toggled");
        self.palette()
    }
}

fn write_document(path: &Path, text: &str, encoding: Encoding, eol: EolMode) -> Result<()> {
    let bytes = document::encode(text, encoding, eol);
    std::fs::write(path, &bytes)?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "saved file");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuillError;

    #[test]
    fn title_clean_untitled() {
        assert_eq!(App::new(true).window_title(), "Text Editor");
    }

    #[test]
    fn title_clean_with_path() {
        let mut app = App::new(true);
        app.doc.path = Some(PathBuf::from("notes").join("todo.txt"));
        assert_eq!(app.window_title(), "todo.txt \u{2014} Text Editor");
    }

    #[test]
    fn title_dirty_with_path() {
        let mut app = App::new(true);
        app.doc.path = Some(PathBuf::from("notes").join("todo.txt"));
        app.doc.dirty = true;
        assert_eq!(app.window_title(), "*todo.txt \u{2014} Text Editor");
    }

    #[test]
    fn title_dirty_untitled() {
        let mut app = App::new(true);
        app.doc.dirty = true;
        assert_eq!(app.window_title(), "*Untitled \u{2014} Text Editor");
    }

    #[test]
    fn set_dirty_reports_changes_only() {
        let mut app = App::new(false);
        assert!(app.set_dirty(true));
        assert!(!app.set_dirty(true));
        assert!(app.set_dirty(false));
    }

    #[test]
    fn unsaved_prompt_names_the_file() {
        let mut app = App::new(false);
        assert_eq!(app.unsaved_prompt(), "Do you want to save changes to Untitled?");
        app.doc.path = Some(PathBuf::from("a.txt"));
        assert_eq!(app.unsaved_prompt(), "Do you want to save changes to a.txt?");
    }

    #[test]
    fn new_file_clears_the_association() {
        let mut app = App::new(false);
        app.open_file(PathBuf::from("x.txt"), b"a\nb\n").expect("open");
        app.doc.dirty = true;
        app.new_file();
        assert!(app.doc.path.is_none());
        assert!(!app.doc.dirty);
        assert_eq!(app.doc.encoding, Encoding::Utf8);
        assert_eq!(app.doc.eol, EolMode::Crlf);
    }

    #[test]
    fn open_sets_path_and_returns_lf_text() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("in.txt");
        std::fs::write(&path, b"first\r\nsecond").expect("write");

        let mut app = App::new(false);
        let text = app.open(path.clone()).expect("open");
        assert_eq!(text, "first\nsecond");
        assert_eq!(app.doc.path.as_deref(), Some(path.as_path()));
        assert_eq!(app.doc.eol, EolMode::Crlf);
        assert!(!app.doc.dirty);
    }

    #[test]
    fn failed_open_leaves_document_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut app = App::new(false);
        app.doc.path = Some(PathBuf::from("keep.txt"));
        app.doc.dirty = true;

        assert!(app.open(dir.path().join("missing.txt")).is_err());
        assert_eq!(app.doc.path.as_deref(), Some(Path::new("keep.txt")));
        assert!(app.doc.dirty);
    }

    #[test]
    fn malformed_file_is_refused_and_document_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bad = dir.path().join("bad.txt");
        std::fs::write(&bad, b"\xEF\xBB\xBFcaf\xE9").expect("write");

        let mut app = App::new(false);
        app.doc.path = Some(PathBuf::from("keep.txt"));
        app.doc.dirty = true;

        let err = app.open(bad.clone()).expect_err("malformed");
        assert!(matches!(err, QuillError::Malformed { .. }));
        assert_eq!(app.doc.path.as_deref(), Some(Path::new("keep.txt")));
        assert!(app.doc.dirty);
        // The file on disk is untouched.
        assert_eq!(std::fs::read(&bad).expect("read"), b"\xEF\xBB\xBFcaf\xE9");
    }

    #[test]
    fn about_text_credits_the_author() {
        assert!(ABOUT_TEXT.starts_with("Simple Text Editor\n\nVersion 1.0"));
        assert!(ABOUT_TEXT.ends_with("\n\nDeveloped By Sahampath"));
    }

    #[test]
    fn save_without_path_needs_save_as() {
        let mut app = App::new(false);
        app.doc.dirty = true;
        assert_eq!(app.save("text").expect("save"), SaveOutcome::NeedsPath);
        assert!(app.doc.dirty);
    }

    #[test]
    fn save_then_reopen_is_byte_identical() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("doc.txt");
        let on_disk: &[u8] = b"\xEF\xBB\xBFline one\nline two\n\ncaf\xC3\xA9";
        std::fs::write(&path, on_disk).expect("write");

        let mut app = App::new(false);
        let text = app.open(path.clone()).expect("open");
        // The control hands text back with CR paragraph marks.
        let from_control = text.replace('\n', "\r");
        app.doc.dirty = true;
        assert_eq!(app.save(&from_control).expect("save"), SaveOutcome::Saved);
        assert!(!app.doc.dirty);

        assert_eq!(std::fs::read(&path).expect("read"), on_disk);
        let mut again = App::new(false);
        assert_eq!(again.open(path).expect("reopen"), text);
    }

    #[test]
    fn new_edit_save_as_writes_exactly_the_edit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("fresh.txt");

        let mut app = App::new(true);
        app.new_file();
        app.doc.dirty = true;
        app.save_as(path.clone(), "hello").expect("save as");

        assert_eq!(std::fs::read(&path).expect("read"), b"hello");
        assert_eq!(app.doc.path.as_deref(), Some(path.as_path()));
        assert!(!app.doc.dirty);
    }

    #[test]
    fn untitled_documents_save_with_crlf() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lines.txt");
        let mut app = App::new(true);
        app.save_as(path.clone(), "a\nb").expect("save as");
        assert_eq!(std::fs::read(&path).expect("read"), b"a\r\nb");
    }

    #[test]
    fn failed_save_as_keeps_path_and_dirty_flag() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("no-such-dir").join("f.txt");
        let mut app = App::new(true);
        app.doc.dirty = true;
        assert!(app.save_as(path.clone(), "x").is_err());
        assert_eq!(app.doc.path.as_deref(), Some(path.as_path()));
        assert!(app.doc.dirty);
    }

    #[test]
    fn toggling_dark_mode_twice_restores_the_palette() {
        let mut app = App::new(true);
        let before = app.palette();
        let once = app.toggle_dark_mode();
        assert_ne!(once, before);
        assert!(!app.dark_mode());
        let twice = app.toggle_dark_mode();
        assert_eq!(twice, before);
        assert!(app.dark_mode());
    }
}
