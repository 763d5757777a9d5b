//! Attribute table of the flower care sensor
//!
//! The device exposes its data through a handful of fixed attribute handles.
//! This module names them, together with the control payload and the
//! firmware threshold that decides whether that payload must be written.

use std::fmt;

/// A BLE attribute handle in the device's attribute table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(pub u16);

impl fmt::Display for Handle {
    /// Renders as `0x38`, the form `gatttool -a` expects
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

/// Mode control (write)
pub const MODE_CONTROL: Handle = Handle(0x33);

/// Live sensor data (read)
pub const SENSOR_DATA: Handle = Handle(0x35);

/// Battery level and firmware version (read)
pub const FIRMWARE: Handle = Handle(0x38);

/// Control payloads written to [`MODE_CONTROL`]
pub mod commands {
    /// Switches the sensor data characteristic to live values.
    /// Required on newer firmware, otherwise reads return stale data.
    pub const ENABLE_REALTIME: [u8; 2] = [0xA0, 0x1F];
}

/// First firmware version that needs [`commands::ENABLE_REALTIME`]
pub const REALTIME_FIRMWARE_THRESHOLD: &str = "2.6.6";

/// Whether a device reporting `version` needs the realtime enable write
/// before its sensor data can be read.
///
/// The comparison is lexicographic on the raw string, not semantic:
/// `"2.10.0"` sorts before `"2.6.6"` and is treated as old firmware.
/// An empty version (firmware never read) never qualifies.
pub fn requires_realtime_enable(version: &str) -> bool {
    version >= REALTIME_FIRMWARE_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_display() {
        assert_eq!(MODE_CONTROL.to_string(), "0x33");
        assert_eq!(SENSOR_DATA.to_string(), "0x35");
        assert_eq!(FIRMWARE.to_string(), "0x38");
        assert_eq!(Handle(0x3).to_string(), "0x03");
    }

    #[test]
    fn threshold_is_lexicographic() {
        assert!(requires_realtime_enable("2.6.6"));
        assert!(requires_realtime_enable("2.7.0"));
        assert!(requires_realtime_enable("3.1.8"));
        assert!(!requires_realtime_enable("2.6.2"));
        assert!(!requires_realtime_enable(""));
        // "2.10.0" < "2.6.6" as strings
        assert!(!requires_realtime_enable("2.10.0"));
    }
}
