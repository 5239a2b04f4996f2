//! Logging setup.
//!
//! Two outputs:
//! - `%APPDATA%\Quill\logs\quill.log`, so failures are recorded even in
//!   release builds, which run without a console;
//! - stderr, visible in debug builds started from a terminal.
//!
//! Filter priority (both outputs):
//! 1. `QUILL_LOG`
//! 2. `RUST_LOG`
//! 3. `warn` globally, `info` for quill
//!
//! The file is written synchronously; Quill logs a handful of lines per file
//! operation and keeps to the UI thread.

use std::{
    env,
    ffi::OsString,
    path::{Path, PathBuf},
};

use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

const DEFAULT_FILTER: &str = "warn,quill=info";

const LOG_FILE_PREFIX: &str = "quill";
const LOG_FILE_SUFFIX: &str = "log";

/// Install the global subscriber.  Safe to call more than once; later calls
/// are no-ops.
pub(crate) fn init() {
    let quill_log = env::var("QUILL_LOG").ok();
    let rust_log = env::var("RUST_LOG").ok();

    // No log directory (or an unwritable one) leaves stderr only.
    let file_layer = log_dir(env::var_os("APPDATA"))
        .and_then(|dir| file_appender(&dir).ok())
        .map(|appender| {
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(false)
                .with_filter(create_filter(quill_log.clone(), rust_log.clone()))
        });

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(create_filter(quill_log, rust_log));

    let _ = Registry::default()
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
}

/// `<appdata>\Quill\logs`, or `None` without an application-data root.
fn log_dir(appdata: Option<OsString>) -> Option<PathBuf> {
    let mut dir = PathBuf::from(appdata?);
    dir.push("Quill");
    dir.push("logs");
    Some(dir)
}

/// Appender for `quill.log` in `dir`, creating the directory if needed.
fn file_appender(dir: &Path) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(dir)
}

/// Pick the first usable directive string; an unparsable one falls through
/// to the next.
fn create_filter(quill_log: Option<String>, rust_log: Option<String>) -> EnvFilter {
    [quill_log, rust_log]
        .into_iter()
        .flatten()
        .filter(|directives| !directives.trim().is_empty())
        .find_map(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::filter::LevelFilter;

    use super::*;

    #[test]
    fn default_filter_when_nothing_set() {
        assert_eq!(create_filter(None, None).max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn quill_log_wins_over_rust_log() {
        let f = create_filter(Some("debug".into()), Some("error".into()));
        assert_eq!(f.max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn rust_log_used_when_quill_log_absent_or_blank() {
        let f = create_filter(None, Some("trace".into()));
        assert_eq!(f.max_level_hint(), Some(LevelFilter::TRACE));
        let f = create_filter(Some("  ".into()), Some("error".into()));
        assert_eq!(f.max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn log_dir_lives_under_appdata() {
        let dir = log_dir(Some(OsString::from("root"))).expect("dir");
        assert_eq!(dir, Path::new("root").join("Quill").join("logs"));
        assert_eq!(log_dir(None), None);
    }

    #[test]
    fn file_appender_creates_quill_log() {
        use std::io::Write as _;

        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = tmp.path().join("logs");
        let mut appender = file_appender(&dir).expect("appender");
        appender.write_all(b"save failed\n").expect("write");
        appender.flush().expect("flush");

        let written = std::fs::read_to_string(dir.join("quill.log")).expect("read");
        assert_eq!(written, "save failed\n");
    }

    #[test]
    fn init_twice_does_not_panic() {
        init();
        init();
    }
}
