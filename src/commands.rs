// ── Menu commands ─────────────────────────────────────────────────────────────
//
// Every user-visible action, its `WM_COMMAND` identifier, and the layout of
// the six-menu bar.  Pure data; `platform::win32::window` builds the Win32
// menu and accelerator table from these tables and dispatches on `Command`.

/// A menu-bar action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Command {
    New,
    Open,
    Save,
    SaveAs,
    Exit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    Bold,
    Italic,
    Underline,
    FontSize,
    TextColor,
    ToggleDarkMode,
    About,
    HelpContents,
}

impl Command {
    pub(crate) const ALL: [Command; 18] = [
        Self::New,
        Self::Open,
        Self::Save,
        Self::SaveAs,
        Self::Exit,
        Self::Undo,
        Self::Redo,
        Self::Cut,
        Self::Copy,
        Self::Paste,
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::FontSize,
        Self::TextColor,
        Self::ToggleDarkMode,
        Self::About,
        Self::HelpContents,
    ];

    /// The `WM_COMMAND` identifier.  Grouped by menu in thousands.
    pub(crate) fn id(self) -> u16 {
        match self {
            Self::New => 1001,
            Self::Open => 1002,
            Self::Save => 1003,
            Self::SaveAs => 1004,
            Self::Exit => 1005,
            Self::Undo => 2001,
            Self::Redo => 2002,
            Self::Cut => 2003,
            Self::Copy => 2004,
            Self::Paste => 2005,
            Self::Bold => 3001,
            Self::Italic => 3002,
            Self::Underline => 3003,
            Self::FontSize => 3004,
            Self::TextColor => 3005,
            Self::ToggleDarkMode => 4001,
            Self::About => 5001,
            Self::HelpContents => 6001,
        }
    }

    pub(crate) fn from_id(id: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    /// Menu item text, with `&` mnemonic and tab-separated shortcut.
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::New => "&New\tCtrl+N",
            Self::Open => "&Open\u{2026}\tCtrl+O",
            Self::Save => "&Save\tCtrl+S",
            Self::SaveAs => "Save &As\u{2026}",
            Self::Exit => "E&xit\tAlt+F4",
            Self::Undo => "&Undo\tCtrl+Z",
            Self::Redo => "&Redo\tCtrl+Y",
            Self::Cut => "Cu&t\tCtrl+X",
            Self::Copy => "&Copy\tCtrl+C",
            Self::Paste => "&Paste\tCtrl+V",
            Self::Bold => "&Bold\tCtrl+B",
            Self::Italic => "&Italic\tCtrl+I",
            Self::Underline => "&Underline\tCtrl+U",
            Self::FontSize => "Change Font &Size\u{2026}",
            Self::TextColor => "Text &Color\u{2026}",
            Self::ToggleDarkMode => "Toggle &Dark Mode",
            Self::About => "&About Editor",
            Self::HelpContents => "&Contents",
        }
    }

    /// Commands that only forward to the rich-edit control and therefore
    /// need no application state.
    pub(crate) fn is_edit_passthrough(self) -> bool {
        matches!(
            self,
            Self::Undo | Self::Redo | Self::Cut | Self::Copy | Self::Paste
        )
    }
}

// ── Menu layout ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MenuEntry {
    Item(Command),
    Separator,
}

#[derive(Debug)]
pub(crate) struct Menu {
    pub(crate) title: &'static str,
    pub(crate) entries: &'static [MenuEntry],
}

use MenuEntry::{Item, Separator};

/// The menu bar, left to right.
pub(crate) const MENU_BAR: [Menu; 6] = [
    Menu {
        title: "&File",
        entries: &[
            Item(Command::New),
            Item(Command::Open),
            Item(Command::Save),
            Item(Command::SaveAs),
            Separator,
            Item(Command::Exit),
        ],
    },
    Menu {
        title: "&Edit",
        entries: &[
            Item(Command::Undo),
            Item(Command::Redo),
            Separator,
            Item(Command::Cut),
            Item(Command::Copy),
            Item(Command::Paste),
        ],
    },
    Menu {
        title: "F&ormat",
        entries: &[
            Item(Command::Bold),
            Item(Command::Italic),
            Item(Command::Underline),
            Separator,
            Item(Command::FontSize),
            Item(Command::TextColor),
        ],
    },
    Menu {
        title: "&View",
        entries: &[Item(Command::ToggleDarkMode)],
    },
    Menu {
        title: "&About",
        entries: &[Item(Command::About)],
    },
    Menu {
        title: "&Help",
        entries: &[Item(Command::HelpContents)],
    },
];

// ── Accelerators ──────────────────────────────────────────────────────────────

/// Ctrl+<key> shortcuts handled by the window's accelerator table.  Undo,
/// redo and the clipboard keys are left to the rich-edit control.
pub(crate) const CTRL_ACCELERATORS: [(u8, Command); 6] = [
    (b'N', Command::New),
    (b'O', Command::Open),
    (b'S', Command::Save),
    (b'B', Command::Bold),
    (b'I', Command::Italic),
    (b'U', Command::Underline),
];

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> impl Iterator<Item = Command> {
        MENU_BAR.iter().flat_map(|m| m.entries.iter()).filter_map(|e| match e {
            Item(c) => Some(*c),
            Separator => None,
        })
    }

    #[test]
    fn six_menus_in_order() {
        let titles: Vec<String> = MENU_BAR.iter().map(|m| m.title.replace('&', "")).collect();
        assert_eq!(titles, ["File", "Edit", "Format", "View", "About", "Help"]);
    }

    #[test]
    fn ids_round_trip_and_are_unique() {
        for c in Command::ALL {
            assert_eq!(Command::from_id(c.id()), Some(c));
        }
        let mut ids: Vec<u16> = Command::ALL.iter().map(|c| c.id()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Command::ALL.len());
        assert_eq!(Command::from_id(0), None);
    }

    #[test]
    fn every_command_appears_exactly_once_in_the_menu_bar() {
        let listed: Vec<Command> = items().collect();
        assert_eq!(listed.len(), Command::ALL.len());
        for c in Command::ALL {
            assert_eq!(listed.iter().filter(|&&x| x == c).count(), 1, "{c:?}");
        }
    }

    #[test]
    fn file_menu_layout() {
        assert_eq!(
            MENU_BAR[0].entries,
            &[
                Item(Command::New),
                Item(Command::Open),
                Item(Command::Save),
                Item(Command::SaveAs),
                Separator,
                Item(Command::Exit),
            ]
        );
    }

    #[test]
    fn accelerators_match_label_shortcuts() {
        for (key, cmd) in CTRL_ACCELERATORS {
            let shortcut = format!("\tCtrl+{}", key as char);
            assert!(cmd.label().ends_with(&shortcut), "{cmd:?} label {:?}", cmd.label());
        }
    }

    #[test]
    fn passthrough_commands_are_the_edit_menu_items() {
        let edit: Vec<Command> = MENU_BAR[1]
            .entries
            .iter()
            .filter_map(|e| match e {
                Item(c) => Some(*c),
                Separator => None,
            })
            .collect();
        for c in Command::ALL {
            assert_eq!(c.is_edit_passthrough(), edit.contains(&c), "{c:?}");
        }
    }
}
