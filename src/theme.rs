// ── Dual light/dark colour theme ───────────────────────────────────────────────
//
// Two hard-coded palettes.  Every toggle re-applies a whole palette to the
// editor; nothing is patched incrementally.  Call `palette(dark)` to pick one
// and `apply_theme` (Windows) to push it into the rich-edit control.  The
// window frame and title bar are themed by `platform::win32::window`.

use crate::format::Rgb;

// ── Colour macro ──────────────────────────────────────────────────────────────

/// Build an `Rgb` from 0xRR, 0xGG, 0xBB components.
macro_rules! rgb {
    ($r:expr, $g:expr, $b:expr) => {
        Rgb::new($r, $g, $b)
    };
}

// ── Colour palette ────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Palette {
    pub(crate) name: &'static str,
    /// Editor and window background.
    pub(crate) background: Rgb,
    /// Default text colour.
    pub(crate) text: Rgb,
    /// One-pixel frame drawn around the editor.
    pub(crate) border: Rgb,
    /// Ask DWM for the immersive dark title bar.
    pub(crate) dark_title_bar: bool,
}

/// White page, black text.
pub(crate) const LIGHT: Palette = Palette {
    name: "light",
    background: rgb!(0xFF, 0xFF, 0xFF),
    text: rgb!(0x00, 0x00, 0x00),
    border: rgb!(0xCC, 0xCC, 0xCC),
    dark_title_bar: false,
};

/// Charcoal page, white text.
pub(crate) const DARK: Palette = Palette {
    name: "dark",
    background: rgb!(0x2B, 0x2B, 0x2B),
    text: rgb!(0xFF, 0xFF, 0xFF),
    border: rgb!(0x44, 0x44, 0x44),
    dark_title_bar: true,
};

/// The palette for the given theme flag.
pub(crate) fn palette(dark: bool) -> &'static Palette {
    if dark {
        &DARK
    } else {
        &LIGHT
    }
}

// ── Application ───────────────────────────────────────────────────────────────

/// Apply `next` to the editor surface.
///
/// Sequence:
/// 1. Background colour.
/// 2. Default character colour for newly typed text.
/// 3. Runs still drawn in `previous.text` (the old theme's default) are
///    recoloured to `next.text`; runs the user coloured explicitly keep
///    their colour.  Not recorded in the undo history.
#[cfg(windows)]
pub(crate) fn apply_theme(
    view: &crate::editor::richedit::RichEditView,
    previous: Option<&Palette>,
    next: &Palette,
) {
    view.set_background(next.background);
    view.set_default_color(next.text);
    if let Some(prev) = previous {
        if prev.text != next.text {
            view.recolor_runs(prev.text, next.text);
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palettes_match_their_flag() {
        assert_eq!(palette(true).name, "dark");
        assert_eq!(palette(false).name, "light");
        assert!(palette(true).dark_title_bar);
        assert!(!palette(false).dark_title_bar);
    }

    #[test]
    fn dark_palette_colours() {
        assert_eq!(DARK.background.to_string(), "#2b2b2b");
        assert_eq!(DARK.text.to_string(), "#ffffff");
        assert_eq!(DARK.border.to_string(), "#444444");
    }

    #[test]
    fn light_palette_colours() {
        assert_eq!(LIGHT.background.to_string(), "#ffffff");
        assert_eq!(LIGHT.text.to_string(), "#000000");
        assert_eq!(LIGHT.border.to_string(), "#cccccc");
    }

    #[test]
    fn text_contrasts_with_background() {
        for p in [&LIGHT, &DARK] {
            assert_ne!(p.text, p.background, "{} palette", p.name);
        }
    }

    #[test]
    fn flipping_the_flag_swaps_palettes() {
        for dark in [false, true] {
            let flipped = !dark;
            assert_ne!(palette(flipped), palette(dark));
            assert_eq!(palette(!flipped), palette(dark));
        }
    }
}
