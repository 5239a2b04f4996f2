// ── Editor component abstraction ──────────────────────────────────────────────
//
// Exposes a safe Rust API over the system rich-edit control.  Callers
// interact with `RichEditView` (defined in `richedit::`) through its public
// methods; they never touch Win32 handles directly.

pub mod richedit;
