// ── Settings persistence ──────────────────────────────────────────────────────
//
// Reads and writes `%APPDATA%\Quill\settings.json`.
// No `unsafe` — pure safe Rust + serde_json.

use std::{fs, path::Path, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

// ── On-disk types ─────────────────────────────────────────────────────────────

/// Root of the JSON settings file.
///
/// Every field but `version` has a default so files written by older builds
/// (or edited by hand) still load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Settings {
    pub(crate) version: u32,
    #[serde(default = "default_dark_mode")]
    pub(crate) dark_mode: bool,
    #[serde(default = "default_font_face")]
    pub(crate) font_face: String,
    /// Point size of the editor's default font.
    #[serde(default = "default_font_size")]
    pub(crate) font_size: u32,
    #[serde(default)]
    pub(crate) window: WindowPlacement,
    /// The sixteen custom-colour slots of the colour picker, as `COLORREF`s.
    #[serde(default = "default_custom_colors")]
    pub(crate) custom_colors: [u32; 16],
}

/// Outer window rectangle (normal, non-maximised position) in 96-DPI pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct WindowPlacement {
    pub(crate) x: i32,
    pub(crate) y: i32,
    pub(crate) width: i32,
    pub(crate) height: i32,
}

impl Default for WindowPlacement {
    /// 800×600 at (100, 100), in 96-DPI pixels.
    fn default() -> Self {
        Self { x: 100, y: 100, width: 800, height: 600 }
    }
}

impl WindowPlacement {
    /// Reject rectangles too small to show the menu bar and some text.
    pub(crate) fn is_usable(&self) -> bool {
        self.width >= 200 && self.height >= 150
    }
}

fn default_dark_mode() -> bool {
    true
}

fn default_font_face() -> String {
    "Arial".to_owned()
}

fn default_font_size() -> u32 {
    12
}

fn default_custom_colors() -> [u32; 16] {
    // White: the picker's own initial custom colours.
    [0x00FF_FFFF; 16]
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            dark_mode: default_dark_mode(),
            font_face: default_font_face(),
            font_size: default_font_size(),
            window: WindowPlacement::default(),
            custom_colors: default_custom_colors(),
        }
    }
}

// ── Format version ────────────────────────────────────────────────────────────

const SETTINGS_VERSION: u32 = 1;

// ── Path ──────────────────────────────────────────────────────────────────────

/// Return the path to the settings file: `%APPDATA%\Quill\settings.json`.
///
/// Returns `None` if the `APPDATA` environment variable is not set.
pub(crate) fn settings_path() -> Option<PathBuf> {
    let appdata = std::env::var_os("APPDATA")?;
    let mut p = PathBuf::from(appdata);
    p.push("Quill");
    p.push("settings.json");
    Some(p)
}

// ── Save ──────────────────────────────────────────────────────────────────────

/// Write `settings` to `path`, creating the parent directory if needed.
pub(crate) fn save_to(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_vec_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}

/// Write `settings` to the standard location.  Failures are logged and
/// otherwise ignored; losing a preference is not worth interrupting shutdown.
pub(crate) fn save(settings: &Settings) {
    let Some(path) = settings_path() else {
        tracing::warn!("APPDATA not set; settings not saved");
        return;
    };
    match save_to(&path, settings) {
        Ok(()) => tracing::debug!(path = %path.display(), "settings saved"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "could not save settings"),
    }
}

// ── Load ──────────────────────────────────────────────────────────────────────

/// Read and parse the settings file at `path`.
///
/// An unrecognised version number is treated like a missing file.
pub(crate) fn load_from(path: &Path) -> Result<Option<Settings>> {
    let data = match fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let settings: Settings = serde_json::from_slice(&data)?;
    if settings.version != SETTINGS_VERSION {
        tracing::debug!(version = settings.version, "ignoring settings from another version");
        return Ok(None);
    }
    Ok(Some(settings))
}

/// Load settings from the standard location, falling back to defaults on any
/// error.
pub(crate) fn load() -> Settings {
    let Some(path) = settings_path() else {
        return Settings::default();
    };
    match load_from(&path) {
        Ok(Some(s)) => s,
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "settings unreadable; using defaults");
            Settings::default()
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_editor() {
        let s = Settings::default();
        assert!(s.dark_mode);
        assert_eq!(s.font_face, "Arial");
        assert_eq!(s.font_size, 12);
        assert_eq!(s.window, WindowPlacement { x: 100, y: 100, width: 800, height: 600 });
    }

    #[test]
    fn roundtrip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::default();
        s.dark_mode = false;
        s.font_size = 18;
        s.custom_colors[3] = 0x0012_3456;
        s.window.width = 1024;

        save_to(&path, &s).expect("save");
        let loaded = load_from(&path).expect("load").expect("present");
        assert_eq!(loaded, s);
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let loaded = load_from(&dir.path().join("absent.json")).expect("load");
        assert!(loaded.is_none());
    }

    /// Files with only a version fall back to defaults field by field.
    #[test]
    fn absent_fields_take_defaults() {
        let s: Settings = serde_json::from_str(r#"{"version":1}"#).expect("deserialize");
        assert_eq!(s, Settings::default());
    }

    #[test]
    fn partial_file_keeps_present_fields() {
        let s: Settings =
            serde_json::from_str(r#"{"version":1,"dark_mode":false,"font_size":9}"#)
                .expect("deserialize");
        assert!(!s.dark_mode);
        assert_eq!(s.font_size, 9);
        assert_eq!(s.font_face, "Arial");
    }

    #[test]
    fn wrong_version_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"version":99}"#).expect("write");
        assert!(load_from(&path).expect("load").is_none());
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{not json").expect("write");
        assert!(load_from(&path).is_err());
    }

    #[test]
    fn tiny_windows_are_not_usable() {
        assert!(WindowPlacement::default().is_usable());
        assert!(!WindowPlacement { x: 0, y: 0, width: 10, height: 10 }.is_usable());
    }
}
