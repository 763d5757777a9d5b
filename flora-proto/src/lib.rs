//! Flower care sensor protocol - attribute handles and response decoding
//!
//! The device answers attribute reads with fixed-layout byte records. The
//! layouts are described by [`layout`] and decoded into [`FirmwareInfo`] and
//! [`SensorReading`]. Nothing in this crate performs I/O.

pub mod ble;

pub use ble::Handle;

/// Response shorter than its layout requires
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed {what} response: expected at least {expected} bytes, got {actual}")]
    MalformedResponse {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A field at a fixed offset of a response record.
/// Multi-byte fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    /// One past the last byte of the field
    pub const fn end(&self) -> usize {
        self.offset + self.width
    }

    // Callers check the record length against the layout before reading
    // fields, so indexing below stays in bounds.

    fn u8(&self, data: &[u8]) -> u8 {
        data[self.offset]
    }

    fn u16_le(&self, data: &[u8]) -> u16 {
        u16::from_le_bytes([data[self.offset], data[self.offset + 1]])
    }

    fn i16_le(&self, data: &[u8]) -> i16 {
        i16::from_le_bytes([data[self.offset], data[self.offset + 1]])
    }
}

/// Byte layouts of the records returned by the device
pub mod layout {
    /// Record read from [`crate::ble::FIRMWARE`]
    ///
    /// ```text
    /// BB ?? VV VV VV ...
    /// ```
    pub mod firmware {
        use crate::Field;

        /// Battery percentage, u8
        pub const BATTERY: Field = Field::new(0, 1);
        /// Separator byte, ignored
        pub const RESERVED: Field = Field::new(1, 1);
        /// Version text runs from here to the end of the record
        pub const VERSION_OFFSET: usize = 2;
        /// Battery, separator and at least one version byte
        pub const MIN_LEN: usize = 3;
    }

    /// Record read from [`crate::ble::SENSOR_DATA`]
    ///
    /// ```text
    /// TT TT ?? LL LL ?? ?? MM CC CC
    /// ```
    pub mod sensors {
        use crate::Field;

        /// Temperature in tenths of a degree, i16
        pub const TEMPERATURE: Field = Field::new(0, 2);
        /// Light in lux, u16
        pub const LIGHT: Field = Field::new(3, 2);
        /// Moisture percentage, u8
        pub const MOISTURE: Field = Field::new(7, 1);
        /// Conductivity in µS/cm, u16
        pub const CONDUCTIVITY: Field = Field::new(8, 2);
        pub const LEN: usize = CONDUCTIVITY.end();
    }
}

fn check_len(what: &'static str, data: &[u8], expected: usize) -> Result<(), DecodeError> {
    if data.len() < expected {
        return Err(DecodeError::MalformedResponse {
            what,
            expected,
            actual: data.len(),
        });
    }
    Ok(())
}

/// Firmware version and battery level
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize)]
pub struct FirmwareInfo {
    pub version: String,
    pub battery: u8,
}

impl FirmwareInfo {
    pub fn new(version: impl Into<String>, battery: u8) -> Self {
        Self {
            version: version.into(),
            battery,
        }
    }

    /// Decode a firmware record. Version bytes that are not UTF-8 are
    /// replaced, everything else is passed through untrimmed.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        use layout::firmware::*;

        check_len("firmware", data, MIN_LEN)?;
        Ok(Self {
            version: String::from_utf8_lossy(&data[VERSION_OFFSET..]).into_owned(),
            battery: BATTERY.u8(data),
        })
    }

    /// Whether this firmware needs the realtime enable write before
    /// sensor reads, see [`ble::requires_realtime_enable`].
    pub fn requires_realtime_enable(&self) -> bool {
        ble::requires_realtime_enable(&self.version)
    }
}

/// One set of live measurements
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SensorReading {
    /// Degrees Celsius, one decimal of precision
    pub temperature: f64,
    /// Percent
    pub moisture: u8,
    /// Lux
    pub light: u16,
    /// µS/cm
    pub conductivity: u16,
}

impl SensorReading {
    /// Decode a sensor record. Bytes past [`layout::sensors::LEN`] are
    /// ignored; values are not range checked.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        use layout::sensors::*;

        check_len("sensor", data, LEN)?;
        Ok(Self {
            temperature: f64::from(TEMPERATURE.i16_le(data)) / 10.0,
            moisture: MOISTURE.u8(data),
            light: LIGHT.u16_le(data),
            conductivity: CONDUCTIVITY.u16_le(data),
        })
    }
}
