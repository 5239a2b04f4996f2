// ── Character formatting model ────────────────────────────────────────────────
//
// Pure Rust mirror of the rich-edit control's per-run character attributes.
// The control owns the real formatting; Quill reads the selection's format
// into a `SelectionFormat`, decides what to change, and hands a `FormatPatch`
// back for the control to merge.  No Win32 imports.

use std::fmt;

// ── Colour ────────────────────────────────────────────────────────────────────

/// An opaque sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Convert to a Win32 `COLORREF` (`0x00BBGGRR`).
    pub(crate) const fn to_colorref(self) -> u32 {
        ((self.b as u32) << 16) | ((self.g as u32) << 8) | (self.r as u32)
    }

    /// Convert from a Win32 `COLORREF`; the high byte is ignored.
    pub(crate) const fn from_colorref(c: u32) -> Self {
        Self {
            r: (c & 0xFF) as u8,
            g: ((c >> 8) & 0xFF) as u8,
            b: ((c >> 16) & 0xFF) as u8,
        }
    }
}

/// Lower-case `#rrggbb`.
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

// ── Font size ─────────────────────────────────────────────────────────────────

/// A point size entered by the user.  At least 1; no upper bound is enforced
/// here (the control clamps to what it can render).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct FontSize(u32);

impl FontSize {
    pub(crate) const MIN: u32 = 1;

    pub(crate) fn new(points: u32) -> Option<Self> {
        (points >= Self::MIN).then_some(Self(points))
    }

    /// Parse prompt input: surrounding whitespace is ignored, anything other
    /// than a positive decimal integer is rejected.
    pub(crate) fn parse(input: &str) -> Option<Self> {
        input.trim().parse::<u32>().ok().and_then(Self::new)
    }

    pub(crate) fn points(self) -> u32 {
        self.0
    }

    /// Size in twips (1/20 pt), as the control expects it.  Saturates.
    pub(crate) fn to_twips(self) -> i32 {
        i32::try_from(u64::from(self.0) * 20).unwrap_or(i32::MAX)
    }

    /// Inverse of `to_twips`, rounding to the nearest point.
    pub(crate) fn from_twips(twips: i32) -> Option<Self> {
        let points = (i64::from(twips) + 10) / 20;
        u32::try_from(points).ok().and_then(Self::new)
    }
}

// ── Selection format ──────────────────────────────────────────────────────────

/// The character format of the current selection (or insertion point).
///
/// Every attribute is `None` when it differs across the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectionFormat {
    pub(crate) bold: Option<bool>,
    pub(crate) italic: Option<bool>,
    pub(crate) underline: Option<bool>,
    pub(crate) size: Option<FontSize>,
    pub(crate) color: Option<Rgb>,
}

/// A boolean attribute flipped by the Format menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Toggle {
    Bold,
    Italic,
    Underline,
}

impl SelectionFormat {
    fn get(&self, attr: Toggle) -> Option<bool> {
        match attr {
            Toggle::Bold => self.bold,
            Toggle::Italic => self.italic,
            Toggle::Underline => self.underline,
        }
    }

    /// The patch that flips `attr` for this selection.
    ///
    /// A mixed selection counts as "off", so the whole selection is switched
    /// on.
    pub(crate) fn toggled(&self, attr: Toggle) -> FormatPatch {
        let on = !self.get(attr).unwrap_or(false);
        let mut patch = FormatPatch::default();
        match attr {
            Toggle::Bold => patch.bold = Some(on),
            Toggle::Italic => patch.italic = Some(on),
            Toggle::Underline => patch.underline = Some(on),
        }
        patch
    }
}

// ── Patch ─────────────────────────────────────────────────────────────────────

/// A partial character format.  Only the `Some` attributes are merged onto
/// the selection; everything else is left as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct FormatPatch {
    pub(crate) bold: Option<bool>,
    pub(crate) italic: Option<bool>,
    pub(crate) underline: Option<bool>,
    pub(crate) size: Option<FontSize>,
    pub(crate) color: Option<Rgb>,
}

impl FormatPatch {
    pub(crate) fn size(size: FontSize) -> Self {
        Self { size: Some(size), ..Self::default() }
    }

    pub(crate) fn color(color: Rgb) -> Self {
        Self { color: Some(color), ..Self::default() }
    }

    pub(crate) fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    /// What the control does on a selection-wide merge.
    fn merge(sel: &SelectionFormat, patch: &FormatPatch) -> SelectionFormat {
        SelectionFormat {
            bold: patch.bold.or(sel.bold),
            italic: patch.italic.or(sel.italic),
            underline: patch.underline.or(sel.underline),
            size: patch.size.or(sel.size),
            color: patch.color.or(sel.color),
        }
    }

    fn plain() -> SelectionFormat {
        SelectionFormat {
            bold: Some(false),
            italic: Some(false),
            underline: Some(false),
            size: FontSize::new(12),
            color: Some(Rgb::new(0, 0, 0)),
        }
    }

    #[test]
    fn toggling_twice_restores_every_attribute() {
        for attr in [Toggle::Bold, Toggle::Italic, Toggle::Underline] {
            let start = plain();
            let once = merge(&start, &start.toggled(attr));
            assert_ne!(once, start, "{attr:?} should change the format");
            let twice = merge(&once, &once.toggled(attr));
            assert_eq!(twice, start, "{attr:?} twice should restore");
        }
    }

    #[test]
    fn toggle_only_touches_its_attribute() {
        let patch = plain().toggled(Toggle::Italic);
        assert_eq!(patch.italic, Some(true));
        assert_eq!(patch.bold, None);
        assert_eq!(patch.underline, None);
        assert_eq!(patch.size, None);
        assert_eq!(patch.color, None);
    }

    #[test]
    fn mixed_selection_toggles_on() {
        let sel = SelectionFormat { bold: None, ..plain() };
        assert_eq!(sel.toggled(Toggle::Bold).bold, Some(true));
    }

    #[test]
    fn bold_selection_toggles_off() {
        let sel = SelectionFormat { bold: Some(true), ..plain() };
        assert_eq!(sel.toggled(Toggle::Bold).bold, Some(false));
    }

    #[test]
    fn font_size_parse_accepts_positive_integers() {
        assert_eq!(FontSize::parse("12").map(FontSize::points), Some(12));
        assert_eq!(FontSize::parse("  1 ").map(FontSize::points), Some(1));
        assert_eq!(FontSize::parse("4000").map(FontSize::points), Some(4000));
    }

    #[test]
    fn font_size_parse_rejects_everything_else() {
        for bad in ["", "0", "-3", "12.5", "abc", "1e3"] {
            assert_eq!(FontSize::parse(bad), None, "{bad:?}");
        }
    }

    #[test]
    fn font_size_twips_saturate() {
        assert_eq!(FontSize::new(12).map(FontSize::to_twips), Some(240));
        assert_eq!(FontSize::new(u32::MAX).map(FontSize::to_twips), Some(i32::MAX));
        assert_eq!(FontSize::from_twips(240), FontSize::new(12));
        assert_eq!(FontSize::from_twips(0), None);
    }

    #[test]
    fn colorref_is_bgr() {
        let c = Rgb::new(0x12, 0x34, 0x56);
        assert_eq!(c.to_colorref(), 0x0056_3412);
        assert_eq!(Rgb::from_colorref(0xFF56_3412), c);
    }

    #[test]
    fn color_displays_as_hex_name() {
        assert_eq!(Rgb::new(0x2b, 0x2b, 0x2b).to_string(), "#2b2b2b");
        assert_eq!(Rgb::new(255, 0, 16).to_string(), "#ff0010");
    }

    #[test]
    fn single_attribute_patches() {
        let size = FontSize::new(20).map(FormatPatch::size).unwrap_or_default();
        assert_eq!(size.size.map(FontSize::points), Some(20));
        assert!(size.bold.is_none());
        assert!(!FormatPatch::color(Rgb::new(1, 2, 3)).is_empty());
        assert!(FormatPatch::default().is_empty());
    }
}
