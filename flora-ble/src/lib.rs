//! Flora BLE transport
//!
//! Talks to flower care sensors through the platform Bluetooth stack via
//! btleplug, without external tools.
//!
//! # Example
//!
//! ```ignore
//! use flora_ble::ble::BtleTransport;
//! use flora_device::{Device, Miflora};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let transport = BtleTransport::new()?;
//!     let mut flora = Miflora::new(transport, Device::new("C4:7C:8D:6A:3E:11", "hci0"));
//!
//!     flora.read_firmware()?;
//!     let reading = flora.read_sensors()?;
//!     println!("{} lux", reading.light);
//!
//!     Ok(())
//! }
//! ```

pub mod ble;

pub use ble::BtleTransport;
