//! Embedded assets shipped with the binary.

/// Python program run on the server so inbound ports have listeners.
///
/// Uses single quotes only: it is passed inside a double-quoted
/// `python3 -c` argument.
pub const LISTENER_SCRIPT: &str = include_str!("../../assets/listen_inbound_ports.py");
