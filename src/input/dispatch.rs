// Input dispatch
//
// Command descriptors resolved from strings, the `InputDispatch` registry
// interface the settings store rebinds against, and `ControlMap`, the
// registry the frontend uses to turn input events into commands.

use super::binding::Binding;
use super::links::Shortcut;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Highest controller number a joypad command may address
pub const MAX_JOYPAD_COMMAND: u8 = 8;

/// Console controller buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoypadButton {
    Up,
    Down,
    Left,
    Right,
    Start,
    Select,
    A,
    B,
    X,
    Y,
    L,
    R,
}

impl JoypadButton {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "Up" => JoypadButton::Up,
            "Down" => JoypadButton::Down,
            "Left" => JoypadButton::Left,
            "Right" => JoypadButton::Right,
            "Start" => JoypadButton::Start,
            "Select" => JoypadButton::Select,
            "A" => JoypadButton::A,
            "B" => JoypadButton::B,
            "X" => JoypadButton::X,
            "Y" => JoypadButton::Y,
            "L" => JoypadButton::L,
            "R" => JoypadButton::R,
            _ => return None,
        })
    }
}

/// How a joypad button command behaves while held
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ButtonMode {
    Normal,
    /// Auto-fire while held
    Turbo,
    /// Toggle on press
    Sticky,
}

/// Devices driven by pointer motion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerDevice {
    Mouse(u8),
    Superscope,
    Justifier(u8),
}

/// Buttons on pointing peripherals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeripheralButton {
    MouseLeft(u8),
    MouseRight(u8),
    SuperscopeFire,
    SuperscopeCursor,
    SuperscopeTurbo,
    SuperscopePause,
    SuperscopeAimOffscreen,
    JustifierTrigger(u8),
    JustifierStart(u8),
    JustifierAimOffscreenTrigger(u8),
}

/// An action the input dispatcher can trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Controller button; `pad` counts from 1
    Joypad {
        pad: u8,
        button: JoypadButton,
        mode: ButtonMode,
    },
    /// Emulator shortcut
    Shortcut(Shortcut),
    /// Pointer motion fed to each listed device
    Pointer(Vec<PointerDevice>),
    /// Peripheral button
    Peripheral(PeripheralButton),
    /// Several commands triggered together
    Multi(Vec<Command>),
}

/// Error returned for unknown command descriptors
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandParseError(String);

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown command: {}", self.0)
    }
}

impl std::error::Error for CommandParseError {}

/// Parse the numeric suffix of a device name such as `Mouse1`
fn device_number(name: &str, prefix: &str, max: u8) -> Option<u8> {
    name.strip_prefix(prefix)?
        .parse::<u8>()
        .ok()
        .filter(|n| (1..=max).contains(n))
}

fn parse_pointer_device(name: &str) -> Option<PointerDevice> {
    if name == "Superscope" {
        Some(PointerDevice::Superscope)
    } else if let Some(n) = device_number(name, "Mouse", 2) {
        Some(PointerDevice::Mouse(n))
    } else {
        device_number(name, "Justifier", 2).map(PointerDevice::Justifier)
    }
}

fn parse_peripheral(s: &str) -> Option<PeripheralButton> {
    let (device, action) = s.split_once(' ')?;
    if device == "Superscope" {
        return Some(match action {
            "Fire" => PeripheralButton::SuperscopeFire,
            "Cursor" => PeripheralButton::SuperscopeCursor,
            "ToggleTurbo" => PeripheralButton::SuperscopeTurbo,
            "Pause" => PeripheralButton::SuperscopePause,
            "AimOffscreen" => PeripheralButton::SuperscopeAimOffscreen,
            _ => return None,
        });
    }
    if let Some(n) = device_number(device, "Mouse", 2) {
        return match action {
            "L" => Some(PeripheralButton::MouseLeft(n)),
            "R" => Some(PeripheralButton::MouseRight(n)),
            _ => None,
        };
    }
    let n = device_number(device, "Justifier", 2)?;
    match action {
        "Trigger" => Some(PeripheralButton::JustifierTrigger(n)),
        "Start" => Some(PeripheralButton::JustifierStart(n)),
        "AimOffscreen Trigger" => Some(PeripheralButton::JustifierAimOffscreenTrigger(n)),
        _ => None,
    }
}

fn parse_joypad(s: &str) -> Option<Command> {
    let rest = s.strip_prefix("Joypad")?;
    let (pad, action) = rest.split_once(' ')?;
    let pad = pad
        .parse::<u8>()
        .ok()
        .filter(|p| (1..=MAX_JOYPAD_COMMAND).contains(p))?;
    let (mode, name) = if let Some(name) = action.strip_prefix("Turbo ") {
        (ButtonMode::Turbo, name)
    } else if let Some(name) = action.strip_prefix("Sticky ") {
        (ButtonMode::Sticky, name)
    } else {
        (ButtonMode::Normal, action)
    };
    Some(Command::Joypad {
        pad,
        button: JoypadButton::from_name(name)?,
        mode,
    })
}

impl FromStr for Command {
    type Err = CommandParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || CommandParseError(s.to_string());

        if let Some(inner) = s.strip_prefix('{').and_then(|r| r.strip_suffix('}')) {
            let commands = inner
                .split(',')
                .map(str::parse)
                .collect::<Result<Vec<Command>, _>>()?;
            return if commands.is_empty() {
                Err(err())
            } else {
                Ok(Command::Multi(commands))
            };
        }

        if let Some(devices) = s.strip_prefix("Pointer ") {
            let devices = devices
                .split('+')
                .map(|d| parse_pointer_device(d.trim()))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(err)?;
            return Ok(Command::Pointer(devices));
        }

        if let Some(command) = parse_joypad(s) {
            return Ok(command);
        }

        if let Some(button) = parse_peripheral(s) {
            return Ok(Command::Peripheral(button));
        }

        Shortcut::from_name(s).map(Command::Shortcut).ok_or_else(err)
    }
}

/// Resolve a command descriptor, `None` if it names no known action
pub fn command_for(descriptor: &str) -> Option<Command> {
    descriptor.parse().ok()
}

/// Registry that maps physical inputs to commands
pub trait InputDispatch {
    /// Drop every registered mapping
    fn unmap_all(&mut self);

    /// Map a button-like input; returns false if the binding was not accepted
    fn map_button(&mut self, binding: Binding, command: Command, poll: bool) -> bool;

    /// Map a pointer input; returns false if the binding was not accepted
    fn map_pointer(&mut self, binding: Binding, command: Command, poll: bool) -> bool;
}

/// A registered mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub command: Command,
    /// Whether the input must be polled rather than event driven
    pub poll: bool,
}

/// In-memory input dispatch registry
#[derive(Debug, Default)]
pub struct ControlMap {
    buttons: HashMap<Binding, Mapping>,
    pointers: HashMap<Binding, Mapping>,
}

impl ControlMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Command mapped to a button-like input
    pub fn button(&self, binding: &Binding) -> Option<&Command> {
        self.buttons.get(binding).map(|m| &m.command)
    }

    /// Command mapped to a pointer input
    pub fn pointer(&self, binding: &Binding) -> Option<&Command> {
        self.pointers.get(binding).map(|m| &m.command)
    }

    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    pub fn pointer_count(&self) -> usize {
        self.pointers.len()
    }
}

impl InputDispatch for ControlMap {
    fn unmap_all(&mut self) {
        self.buttons.clear();
        self.pointers.clear();
    }

    fn map_button(&mut self, binding: Binding, command: Command, poll: bool) -> bool {
        if binding.is_none() || binding == Binding::MousePointer {
            return false;
        }
        if let Some(previous) = self.buttons.get(&binding) {
            log::debug!(
                "Binding '{}' remapped from {:?} to {:?}",
                binding,
                previous.command,
                command
            );
        }
        self.buttons.insert(binding, Mapping { command, poll });
        true
    }

    fn map_pointer(&mut self, binding: Binding, command: Command, poll: bool) -> bool {
        if binding != Binding::MousePointer {
            return false;
        }
        self.pointers.insert(binding, Mapping { command, poll });
        true
    }
}
