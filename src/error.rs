// ── Central error type ────────────────────────────────────────────────────────
//
// All fallible operations in Quill return `error::Result<T>`.  No panics
// in production paths; start-up errors surface as a fatal dialog and file
// errors are logged (and, for saves, shown to the user).

use thiserror::Error;

/// Every error that Quill can produce.
#[derive(Debug, Error)]
pub enum QuillError {
    /// A Win32 API call returned a failure code.
    #[error("{function} failed (error {code:#010x})")]
    Win32 {
        /// The name of the failing function, for display purposes.
        function: &'static str,
        /// The raw Win32 error code (`GetLastError()` value) or HRESULT.
        code: u32,
    },

    /// A standard I/O error (file open, read, write, …).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// File bytes do not match the encoding announced by their byte-order
    /// mark.  Opening is refused so a later save cannot rewrite them.
    #[error("file is not valid {encoding}")]
    Malformed {
        /// Display name of the announced encoding.
        encoding: &'static str,
    },

    /// The settings file could not be serialised or parsed.
    #[error("settings error: {0}")]
    Settings(#[from] serde_json::Error),
}

// Convert a windows-crate error (HRESULT) directly into a QuillError so that
// `?` can be used on `windows::core::Result<T>` throughout the platform module.
#[cfg(windows)]
impl From<windows::core::Error> for QuillError {
    fn from(e: windows::core::Error) -> Self {
        // HRESULT.0 is i32; reinterpret bits as u32 for display purposes.
        // Win32 errors appear as 0x8007xxxx HRESULTs.
        Self::Win32 {
            function: "windows",
            code: e.code().0 as u32,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, QuillError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win32_error_display_includes_function_and_hex_code() {
        let e = QuillError::Win32 { function: "CreateWindowExW", code: 0x57 };
        assert_eq!(e.to_string(), "CreateWindowExW failed (error 0x00000057)");
    }

    #[test]
    fn malformed_display_names_the_encoding() {
        let e = QuillError::Malformed { encoding: "UTF-16 LE" };
        assert_eq!(e.to_string(), "file is not valid UTF-16 LE");
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let e: QuillError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(e.to_string().starts_with("I/O error"));
        assert!(e.source().is_some());
    }
}
