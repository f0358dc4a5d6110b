// Input module - Bindings, commands and controller ports
//
// This module provides:
// - Binding values and their canonical string form
// - The fixed joypad and shortcut link tables
// - Command descriptors and the input dispatch registry
// - Controller port assignment

pub mod binding;
pub mod dispatch;
pub mod links;
pub mod ports;

pub use binding::{AxisDirection, Binding, BindingParseError, Modifiers};
pub use dispatch::{
    command_for, ButtonMode, Command, CommandParseError, ControlMap, InputDispatch, JoypadButton,
    Mapping, PeripheralButton, PointerDevice,
};
pub use links::{
    Shortcut, JOYPAD_LINKS, NUM_JOYPADS, NUM_JOYPAD_LINKS, NUM_SHORTCUTS, SHORTCUT_LINKS,
};
pub use ports::{ControllerPorts, ControllerRegistry, ControllerType, PortAssignment, NUM_PORTS};
