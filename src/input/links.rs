// Binding link tables
//
// Fixed tables of the actions a binding can be attached to. Joypad links are
// repeated per controller; shortcut links are global. The names double as
// configuration keys and as command descriptors for the input dispatcher.

/// Number of controllers with their own binding table
pub const NUM_JOYPADS: usize = 10;

/// Number of bindable actions per controller
pub const NUM_JOYPAD_LINKS: usize = 24;

/// Number of global shortcut actions
pub const NUM_SHORTCUTS: usize = 56;

/// Per-controller action names, in binding table order
pub const JOYPAD_LINKS: [&str; NUM_JOYPAD_LINKS] = [
    "Up", "Down", "Left", "Right", "Start", "Select", "A", "B", "X", "Y", "L", "R",
    "Turbo A", "Turbo B", "Turbo X", "Turbo Y", "Turbo L", "Turbo R",
    "Sticky A", "Sticky B", "Sticky X", "Sticky Y", "Sticky L", "Sticky R",
];

/// Global shortcut names, in binding table order
pub const SHORTCUT_LINKS: [&str; NUM_SHORTCUTS] = [
    "QuickLoad000",
    "QuickLoad001",
    "QuickLoad002",
    "QuickLoad003",
    "QuickLoad004",
    "QuickLoad005",
    "QuickLoad006",
    "QuickLoad007",
    "QuickLoad008",
    "QuickLoad009",
    "QuickSave000",
    "QuickSave001",
    "QuickSave002",
    "QuickSave003",
    "QuickSave004",
    "QuickSave005",
    "QuickSave006",
    "QuickSave007",
    "QuickSave008",
    "QuickSave009",
    "SoundChannel0",
    "SoundChannel1",
    "SoundChannel2",
    "SoundChannel3",
    "SoundChannel4",
    "SoundChannel5",
    "SoundChannel6",
    "SoundChannel7",
    "SoundChannelsOn",
    "ToggleBG0",
    "ToggleBG1",
    "ToggleBG2",
    "ToggleBG3",
    "ToggleSprites",
    "Screenshot",
    "SaveSPC",
    "BeginRecordingMovie",
    "EndRecordingMovie",
    "SeekToFrame",
    "FrameAdvance",
    "Fullscreen",
    "OpenROM",
    "SaveStateCurrent",
    "LoadStateCurrent",
    "IncrementSaveSlot",
    "DecrementLoadSlot",
    "IncrementSlot",
    "DecrementSlot",
    "Pause",
    "SwapControllers",
    "Rewind",
    "GrabMouse",
    "FastForward",
    "Reset",
    "SoftReset",
    "Quit",
];

/// An emulator shortcut, identified by its position in `SHORTCUT_LINKS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Shortcut(usize);

impl Shortcut {
    /// Look up a shortcut by its table index
    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_SHORTCUTS).then_some(Shortcut(index))
    }

    /// Look up a shortcut by name
    pub fn from_name(name: &str) -> Option<Self> {
        SHORTCUT_LINKS
            .iter()
            .position(|link| *link == name)
            .map(Shortcut)
    }

    pub fn index(self) -> usize {
        self.0
    }

    pub fn name(self) -> &'static str {
        SHORTCUT_LINKS[self.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_link_names_are_unique() {
        let joypad: HashSet<_> = JOYPAD_LINKS.iter().collect();
        assert_eq!(joypad.len(), NUM_JOYPAD_LINKS);

        let shortcuts: HashSet<_> = SHORTCUT_LINKS.iter().collect();
        assert_eq!(shortcuts.len(), NUM_SHORTCUTS);
    }

    #[test]
    fn test_shortcut_lookup() {
        let shortcut = Shortcut::from_name("QuickSave003").unwrap();
        assert_eq!(shortcut.index(), 13);
        assert_eq!(shortcut.name(), "QuickSave003");
        assert!(Shortcut::from_name("Up").is_none());
        assert!(Shortcut::from_index(NUM_SHORTCUTS).is_none());
    }
}
