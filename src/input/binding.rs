// Input bindings
//
// A binding names one physical input: a key with modifiers, a joystick button
// or axis direction, or a mouse button/pointer. Bindings are stored in the
// configuration file in a canonical string form that round-trips through
// `Display` and `FromStr`.

use serde::de::{self, Deserialize, DeserializeOwned, Deserializer, IntoDeserializer};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use winit::keyboard::KeyCode;

/// Keyboard modifier state attached to a key binding
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Convert from winit modifier state
    pub fn from_state(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

/// Direction of an axis binding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Positive,
    Negative,
}

/// A single physical input bound to an action
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Unset
    #[default]
    None,
    /// Keyboard key with modifiers
    Key { key: KeyCode, modifiers: Modifiers },
    /// Joystick button
    JoystickButton { pad: u8, button: gilrs::Button },
    /// Joystick axis pushed past `threshold` percent in `direction`
    JoystickAxis {
        pad: u8,
        axis: gilrs::Axis,
        direction: AxisDirection,
        threshold: u8,
    },
    /// Mouse button (0: left, 1: middle, 2: right)
    MouseButton(u8),
    /// Mouse motion
    MousePointer,
}

impl Binding {
    /// Key binding without modifiers
    pub fn key(key: KeyCode) -> Self {
        Binding::Key {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Check whether the binding is unset
    pub fn is_none(&self) -> bool {
        matches!(self, Binding::None)
    }
}

/// Error returned when a binding string cannot be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingParseError(String);

impl fmt::Display for BindingParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid binding: {}", self.0)
    }
}

impl std::error::Error for BindingParseError {}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::None => Ok(()),
            Binding::Key { key, modifiers } => {
                write!(f, "Keyboard ")?;
                if modifiers.shift {
                    write!(f, "Shift+")?;
                }
                if modifiers.ctrl {
                    write!(f, "Ctrl+")?;
                }
                if modifiers.alt {
                    write!(f, "Alt+")?;
                }
                write!(f, "{}", keycode_to_string(*key))
            }
            Binding::JoystickButton { pad, button } => {
                write!(f, "Joystick {} Button {}", pad, gilrs_button_to_string(*button))
            }
            Binding::JoystickAxis {
                pad,
                axis,
                direction,
                threshold,
            } => {
                let sign = match direction {
                    AxisDirection::Positive => '+',
                    AxisDirection::Negative => '-',
                };
                write!(
                    f,
                    "Joystick {} Axis {} {} T{}%",
                    pad,
                    gilrs_axis_to_string(*axis),
                    sign,
                    threshold
                )
            }
            Binding::MouseButton(n) => write!(f, "Mouse Button {}", n),
            Binding::MousePointer => write!(f, "Mouse Pointer"),
        }
    }
}

impl FromStr for Binding {
    type Err = BindingParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Binding::None);
        }
        let err = || BindingParseError(s.to_string());

        if let Some(rest) = s.strip_prefix("Keyboard ") {
            let mut modifiers = Modifiers::NONE;
            let mut name = rest.trim();
            loop {
                if let Some(r) = name.strip_prefix("Shift+") {
                    modifiers.shift = true;
                    name = r;
                } else if let Some(r) = name.strip_prefix("Ctrl+") {
                    modifiers.ctrl = true;
                    name = r;
                } else if let Some(r) = name.strip_prefix("Alt+") {
                    modifiers.alt = true;
                    name = r;
                } else {
                    break;
                }
            }
            let key = string_to_keycode(name).ok_or_else(err)?;
            return Ok(Binding::Key { key, modifiers });
        }

        if let Some(rest) = s.strip_prefix("Joystick ") {
            let parts: Vec<&str> = rest.split_whitespace().collect();
            let pad: u8 = parts.first().and_then(|p| p.parse().ok()).ok_or_else(err)?;
            return match parts.get(1..) {
                Some(["Button", name]) => Ok(Binding::JoystickButton {
                    pad,
                    button: string_to_gilrs_button(name).ok_or_else(err)?,
                }),
                Some(["Axis", name, sign, threshold]) => {
                    let direction = match *sign {
                        "+" => AxisDirection::Positive,
                        "-" => AxisDirection::Negative,
                        _ => return Err(err()),
                    };
                    let threshold = threshold
                        .strip_prefix('T')
                        .and_then(|t| t.strip_suffix('%'))
                        .and_then(|t| t.parse::<u8>().ok())
                        .ok_or_else(err)?;
                    Ok(Binding::JoystickAxis {
                        pad,
                        axis: string_to_gilrs_axis(name).ok_or_else(err)?,
                        direction,
                        threshold,
                    })
                }
                _ => Err(err()),
            };
        }

        if s == "Mouse Pointer" {
            return Ok(Binding::MousePointer);
        }

        if let Some(n) = s.strip_prefix("Mouse Button ") {
            return n.trim().parse().map(Binding::MouseButton).map_err(|_| err());
        }

        Err(err())
    }
}

impl Serialize for Binding {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Binding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// Look up an input enum by the variant name its serde form uses
///
/// The writers below use `Debug`, which prints the same names for the unit
/// variants of `KeyCode`, `Button` and `Axis`.
fn from_variant_name<T: DeserializeOwned>(name: &str) -> Option<T> {
    let deserializer: de::value::StrDeserializer<'_, de::value::Error> = name.into_deserializer();
    T::deserialize(deserializer).ok()
}

/// Convert KeyCode to string representation
fn keycode_to_string(key: KeyCode) -> String {
    format!("{:?}", key)
}

/// Convert string to KeyCode
fn string_to_keycode(s: &str) -> Option<KeyCode> {
    from_variant_name(s)
}

fn gilrs_button_to_string(button: gilrs::Button) -> String {
    format!("{:?}", button)
}

fn string_to_gilrs_button(s: &str) -> Option<gilrs::Button> {
    from_variant_name(s)
}

fn gilrs_axis_to_string(axis: gilrs::Axis) -> String {
    format!("{:?}", axis)
}

fn string_to_gilrs_axis(s: &str) -> Option<gilrs::Axis> {
    from_variant_name(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keycode_conversion() {
        assert_eq!(keycode_to_string(KeyCode::KeyX), "KeyX");
        assert_eq!(string_to_keycode("KeyX"), Some(KeyCode::KeyX));
        assert_eq!(string_to_keycode("InvalidKey"), None);
    }

    #[test]
    fn test_gilrs_conversion() {
        assert_eq!(gilrs_button_to_string(gilrs::Button::East), "East");
        assert_eq!(string_to_gilrs_button("East"), Some(gilrs::Button::East));
        assert_eq!(string_to_gilrs_button("Nope"), None);
        assert_eq!(string_to_gilrs_axis("LeftStickX"), Some(gilrs::Axis::LeftStickX));
        assert_eq!(string_to_gilrs_button("Unknown"), Some(gilrs::Button::Unknown));
    }

    /// Every `KeyCode` variant name
    const ALL_KEY_NAMES: &str = "
        Backquote Backslash BracketLeft BracketRight Comma
        Digit0 Digit1 Digit2 Digit3 Digit4 Digit5 Digit6 Digit7 Digit8 Digit9
        Equal IntlBackslash IntlRo IntlYen
        KeyA KeyB KeyC KeyD KeyE KeyF KeyG KeyH KeyI KeyJ KeyK KeyL KeyM
        KeyN KeyO KeyP KeyQ KeyR KeyS KeyT KeyU KeyV KeyW KeyX KeyY KeyZ
        Minus Period Quote Semicolon Slash
        AltLeft AltRight Backspace CapsLock ContextMenu ControlLeft ControlRight
        Enter SuperLeft SuperRight ShiftLeft ShiftRight Space Tab
        Convert KanaMode Lang1 Lang2 Lang3 Lang4 Lang5 NonConvert
        Delete End Help Home Insert PageDown PageUp
        ArrowDown ArrowLeft ArrowRight ArrowUp NumLock
        Numpad0 Numpad1 Numpad2 Numpad3 Numpad4 Numpad5 Numpad6 Numpad7 Numpad8 Numpad9
        NumpadAdd NumpadBackspace NumpadClear NumpadClearEntry NumpadComma
        NumpadDecimal NumpadDivide NumpadEnter NumpadEqual NumpadHash
        NumpadMemoryAdd NumpadMemoryClear NumpadMemoryRecall NumpadMemoryStore
        NumpadMemorySubtract NumpadMultiply NumpadParenLeft NumpadParenRight
        NumpadStar NumpadSubtract
        Escape Fn FnLock PrintScreen ScrollLock Pause
        BrowserBack BrowserFavorites BrowserForward BrowserHome BrowserRefresh
        BrowserSearch BrowserStop Eject LaunchApp1 LaunchApp2 LaunchMail
        MediaPlayPause MediaSelect MediaStop MediaTrackNext MediaTrackPrevious
        Power Sleep AudioVolumeDown AudioVolumeMute AudioVolumeUp WakeUp
        Meta Hyper Turbo Abort Resume Suspend Again Copy Cut Find Open Paste
        Props Select Undo Hiragana Katakana
        F1 F2 F3 F4 F5 F6 F7 F8 F9 F10 F11 F12 F13 F14 F15 F16 F17 F18
        F19 F20 F21 F22 F23 F24 F25 F26 F27 F28 F29 F30 F31 F32 F33 F34 F35
    ";

    #[test]
    fn test_every_key_survives_write_and_read() {
        let mut count = 0;
        for name in ALL_KEY_NAMES.split_whitespace() {
            let key = string_to_keycode(name).unwrap_or_else(|| panic!("{} not parsed", name));
            let binding = Binding::Key {
                key,
                modifiers: Modifiers {
                    shift: false,
                    ctrl: true,
                    alt: false,
                },
            };
            let text = binding.to_string();
            assert_eq!(text, format!("Keyboard Ctrl+{}", name));
            assert_eq!(text.parse::<Binding>().unwrap(), binding);
            count += 1;
        }
        assert_eq!(count, 194);
    }

    #[test]
    fn test_every_pad_input_survives_write_and_read() {
        let buttons = "South East North West C Z LeftTrigger LeftTrigger2 RightTrigger \
                       RightTrigger2 Select Start Mode LeftThumb RightThumb DPadUp DPadDown \
                       DPadLeft DPadRight Unknown";
        for name in buttons.split_whitespace() {
            let button = string_to_gilrs_button(name).unwrap();
            let binding = Binding::JoystickButton { pad: 3, button };
            assert_eq!(binding.to_string().parse::<Binding>().unwrap(), binding);
        }

        let axes = "LeftStickX LeftStickY LeftZ RightStickX RightStickY RightZ DPadX DPadY Unknown";
        for name in axes.split_whitespace() {
            let binding = Binding::JoystickAxis {
                pad: 0,
                axis: string_to_gilrs_axis(name).unwrap(),
                direction: AxisDirection::Positive,
                threshold: u8::MAX,
            };
            assert_eq!(binding.to_string().parse::<Binding>().unwrap(), binding);
        }
    }

    #[test]
    fn test_empty_string_is_unset() {
        assert_eq!("".parse::<Binding>().unwrap(), Binding::None);
        assert_eq!("   ".parse::<Binding>().unwrap(), Binding::None);
        assert_eq!(Binding::None.to_string(), "");
    }

    #[test]
    fn test_keyboard_binding_string() {
        let binding = Binding::Key {
            key: KeyCode::KeyS,
            modifiers: Modifiers {
                shift: true,
                ctrl: false,
                alt: true,
            },
        };
        assert_eq!(binding.to_string(), "Keyboard Shift+Alt+KeyS");
        assert_eq!("Keyboard Shift+Alt+KeyS".parse::<Binding>().unwrap(), binding);
        assert_eq!(
            "Keyboard F1".parse::<Binding>().unwrap(),
            Binding::key(KeyCode::F1)
        );
    }

    #[test]
    fn test_joystick_binding_strings() {
        let button: Binding = "Joystick 1 Button South".parse().unwrap();
        assert_eq!(
            button,
            Binding::JoystickButton {
                pad: 1,
                button: gilrs::Button::South
            }
        );

        let axis: Binding = "Joystick 0 Axis LeftStickY - T50%".parse().unwrap();
        assert_eq!(
            axis,
            Binding::JoystickAxis {
                pad: 0,
                axis: gilrs::Axis::LeftStickY,
                direction: AxisDirection::Negative,
                threshold: 50
            }
        );
        assert_eq!(axis.to_string(), "Joystick 0 Axis LeftStickY - T50%");
    }

    #[test]
    fn test_mouse_binding_strings() {
        assert_eq!(
            "Mouse Button 2".parse::<Binding>().unwrap(),
            Binding::MouseButton(2)
        );
        assert_eq!(
            "Mouse Pointer".parse::<Binding>().unwrap(),
            Binding::MousePointer
        );
    }

    #[test]
    fn test_invalid_binding_strings() {
        assert!("Keyboard NotAKey".parse::<Binding>().is_err());
        assert!("Joystick x Button South".parse::<Binding>().is_err());
        assert!("Joystick 0 Axis LeftStickX + T300%".parse::<Binding>().is_err());
        assert!("Joystick 0 Axis LeftStickX * T50%".parse::<Binding>().is_err());
        assert!("Gamepad 0".parse::<Binding>().is_err());
    }

    #[test]
    fn test_serde_string_form() {
        let value = toml::Value::String("Keyboard KeyZ".to_string());
        let binding: Binding = value.try_into().unwrap();
        assert_eq!(binding, Binding::key(KeyCode::KeyZ));
    }
}
