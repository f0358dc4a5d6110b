// Controller ports
//
// What is plugged into each of the console's two controller ports, and the
// registry interface the emulation core exposes for reading and changing it.

/// Number of console controller ports
pub const NUM_PORTS: usize = 2;

/// Device attached to a controller port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControllerType {
    None,
    Joypad,
    Mouse,
    SuperScope,
    Multitap,
    Justifier,
}

impl ControllerType {
    /// Name used in the configuration file
    pub fn name(self) -> &'static str {
        match self {
            ControllerType::None => "none",
            ControllerType::Joypad => "joypad",
            ControllerType::Mouse => "mouse",
            ControllerType::SuperScope => "superscope",
            ControllerType::Multitap => "multitap",
            ControllerType::Justifier => "justifier",
        }
    }

    /// Recognize a configuration value by the device name it contains
    ///
    /// Unrecognized values yield `None` and leave the port setting alone.
    pub fn from_config(value: &str) -> Option<Self> {
        let value = value.to_ascii_lowercase();
        [
            ControllerType::Joypad,
            ControllerType::Multitap,
            ControllerType::SuperScope,
            ControllerType::Mouse,
            ControllerType::Justifier,
            ControllerType::None,
        ]
        .into_iter()
        .find(|kind| value.contains(kind.name()))
    }
}

/// Controller type and device ids assigned to a port
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortAssignment {
    pub kind: ControllerType,
    /// Device ids; -1 marks an unused slot
    pub ids: [i8; 4],
}

impl PortAssignment {
    /// Standard assignment for a device plugged into `port`
    pub fn for_port(kind: ControllerType, port: usize) -> Self {
        let p = port as i8;
        let ids = match kind {
            ControllerType::None => [-1; 4],
            ControllerType::Joypad | ControllerType::Mouse | ControllerType::Justifier => {
                [p, -1, -1, -1]
            }
            ControllerType::Multitap => [p, p + 1, p + 2, p + 3],
            ControllerType::SuperScope => [0, -1, -1, -1],
        };
        Self { kind, ids }
    }
}

/// Controller assignment registry owned by the emulation core
pub trait ControllerRegistry {
    fn controller(&self, port: usize) -> PortAssignment;
    fn set_controller(&mut self, port: usize, assignment: PortAssignment);
}

/// Plain controller assignment table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerPorts {
    ports: [PortAssignment; NUM_PORTS],
}

impl ControllerPorts {
    pub fn new() -> Self {
        Self {
            ports: [
                PortAssignment::for_port(ControllerType::Joypad, 0),
                PortAssignment::for_port(ControllerType::Joypad, 1),
            ],
        }
    }
}

impl Default for ControllerPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl ControllerRegistry for ControllerPorts {
    fn controller(&self, port: usize) -> PortAssignment {
        self.ports
            .get(port)
            .copied()
            .unwrap_or(PortAssignment::for_port(ControllerType::None, port))
    }

    fn set_controller(&mut self, port: usize, assignment: PortAssignment) {
        if let Some(slot) = self.ports.get_mut(port) {
            *slot = assignment;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_matches_substrings() {
        assert_eq!(ControllerType::from_config("joypad"), Some(ControllerType::Joypad));
        assert_eq!(
            ControllerType::from_config("Multitap (5 players)"),
            Some(ControllerType::Multitap)
        );
        assert_eq!(ControllerType::from_config("none"), Some(ControllerType::None));
        assert_eq!(ControllerType::from_config("keyboard"), None);
    }

    #[test]
    fn test_port_assignment_ids() {
        assert_eq!(
            PortAssignment::for_port(ControllerType::Multitap, 1).ids,
            [1, 2, 3, 4]
        );
        assert_eq!(
            PortAssignment::for_port(ControllerType::Joypad, 1).ids,
            [1, -1, -1, -1]
        );
    }

    #[test]
    fn test_registry_ignores_out_of_range_ports() {
        let mut ports = ControllerPorts::new();
        ports.set_controller(5, PortAssignment::for_port(ControllerType::Mouse, 5));
        assert_eq!(ports.controller(0).kind, ControllerType::Joypad);
        assert_eq!(ports.controller(5).kind, ControllerType::None);
    }
}
