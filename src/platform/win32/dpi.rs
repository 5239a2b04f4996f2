#![allow(unsafe_code)]

use windows::Win32::{
    Foundation::HWND,
    UI::HiDpi::{
        GetDpiForSystem, GetDpiForWindow, SetProcessDpiAwarenessContext,
        DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    },
};

use crate::settings::WindowPlacement;

pub(crate) const BASE_DPI: u32 = 96;

/// Scale a pixel value defined at 96 DPI to `dpi`.
pub(crate) fn scale(px: i32, dpi: u32) -> i32 {
    px * dpi as i32 / BASE_DPI as i32
}

/// Inverse of `scale`: physical pixels at `dpi` back to 96-DPI pixels.
pub(crate) fn unscale(px: i32, dpi: u32) -> i32 {
    px * BASE_DPI as i32 / dpi.max(1) as i32
}

/// Scale a stored (96-DPI) placement to physical pixels.
pub(crate) fn scale_placement(p: WindowPlacement, dpi: u32) -> WindowPlacement {
    WindowPlacement {
        x: scale(p.x, dpi),
        y: scale(p.y, dpi),
        width: scale(p.width, dpi),
        height: scale(p.height, dpi),
    }
}

/// Convert a physical placement to the 96-DPI form that is persisted.
pub(crate) fn unscale_placement(p: WindowPlacement, dpi: u32) -> WindowPlacement {
    WindowPlacement {
        x: unscale(p.x, dpi),
        y: unscale(p.y, dpi),
        width: unscale(p.width, dpi),
        height: unscale(p.height, dpi),
    }
}

/// Opt into Per-Monitor v2 DPI awareness.
/// MUST be called before any window is created on the calling thread.
pub(crate) fn init() {
    // SAFETY: Must precede all window creation; single call at process start.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}

/// Return the DPI for `hwnd`. Falls back to BASE_DPI (96) on failure.
pub(crate) fn get_for_window(hwnd: HWND) -> u32 {
    // SAFETY: hwnd is a valid window handle provided by the caller.
    let v = unsafe { GetDpiForWindow(hwnd) };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

/// Return the primary-monitor system DPI. Used before window creation.
pub(crate) fn get_system_dpi() -> u32 {
    // SAFETY: GetDpiForSystem takes no parameters and always succeeds on Win10+.
    let v = unsafe { GetDpiForSystem() };
    if v == 0 {
        BASE_DPI
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scale_and_unscale_are_inverse_at_common_dpis() {
        for dpi in [96, 120, 144, 192] {
            assert_eq!(unscale(scale(800, dpi), dpi), 800);
        }
        assert_eq!(scale(800, 144), 1200);
    }

    #[test]
    fn placement_scaling() {
        let p = WindowPlacement::default();
        let big = scale_placement(p, 192);
        assert_eq!(big, WindowPlacement { x: 200, y: 200, width: 1600, height: 1200 });
        assert_eq!(unscale_placement(big, 192), p);
    }
}
