// ── Safety policy ────────────────────────────────────────────────────────────
// Unsafe code is forbidden everywhere except:
//   • `platform::win32`  – Win32 / WinAPI FFI
//   • `editor::richedit` – rich-edit child-window hosting
// Each unsafe block in those modules MUST carry a `// SAFETY:` comment.
#![deny(unsafe_code)]
// Release builds run as a GUI application (no console window).
// Debug builds keep the console so that log output is visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]
// The model modules build everywhere so their tests run on any host; only the
// Windows front end uses them.
#![cfg_attr(not(windows), allow(dead_code))]

mod app;
mod commands;
mod document;
mod error;
mod format;
mod logging;
mod settings;
mod theme;

#[cfg(windows)]
mod editor;
#[cfg(windows)]
mod platform;

#[cfg(windows)]
fn main() {
    logging::init();
    let settings = settings::load();

    if let Err(e) = platform::win32::window::run(settings) {
        // Startup failed before or during the message loop.
        // No console in release builds; a message box is the only visible output.
        tracing::error!(error = %e, "fatal");
        platform::win32::window::show_error_dialog(&e.to_string());
        std::process::exit(1);
    }
}

#[cfg(not(windows))]
fn main() {
    logging::init();
    tracing::error!("{} requires Windows", app::APP_NAME);
    std::process::exit(1);
}
