/// Quill build script.
///
/// Quill's window is Windows-only, but the document, format, theme and
/// settings modules are plain Rust and are tested on every host.  Other
/// targets therefore build a binary that only reports that the editor is
/// unavailable; say so at build time instead of failing the build.
fn main() {
    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os != "windows" {
        println!(
            "cargo:warning=Quill's editor window only runs on Windows \
             (CARGO_CFG_TARGET_OS = {target_os:?}); building the model and tests only"
        );
    }

    // Only re-run the build script when it changes.
    println!("cargo:rerun-if-changed=build.rs");
}
