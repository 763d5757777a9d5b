//! Flower care sensor protocol core
//!
//! Reads firmware, battery and live measurements from a flower care
//! sensor through any [`Transport`].
//!
//! Firmware `2.6.6` and later only return live sensor values after
//! [`ble::commands::ENABLE_REALTIME`] has been written to the mode control
//! handle. Which path is taken depends on the firmware version cached in
//! [`DeviceState`] by the last [`read_firmware`]; with no cached version
//! the enable write is skipped.
//!
//! # Example
//!
//! ```no_run
//! use flora_device::{Device, Miflora, gatttool::GattTool};
//!
//! fn main() -> Result<(), flora_device::Error> {
//!     let device = Device::new("C4:7C:8D:6A:3E:11", "hci0");
//!     let mut flora = Miflora::new(GattTool::default(), device);
//!
//!     let firmware = flora.read_firmware()?;
//!     println!("firmware {} battery {}%", firmware.version, firmware.battery);
//!
//!     let reading = flora.read_sensors()?;
//!     println!("{:.1} °C, {}% moisture", reading.temperature, reading.moisture);
//!     Ok(())
//! }
//! ```

pub mod gatttool;
mod state;
mod transport;

pub use flora_proto::{DecodeError, FirmwareInfo, Handle, SensorReading, ble};
pub use state::{Device, DeviceState};
pub use transport::{Transport, TransportError};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    MalformedResponse(#[from] DecodeError),
}

/// Read battery level and firmware version, and cache them in `state`
///
/// The cached value replaces any earlier one and is left untouched when
/// the read or the decode fails.
pub fn read_firmware<T: Transport + ?Sized>(
    transport: &mut T,
    device: &Device,
    state: &mut DeviceState,
) -> Result<FirmwareInfo, Error> {
    let data = transport.read_attribute(device, ble::FIRMWARE)?;
    log::debug!("{}: read {} firmware bytes", device.address(), data.len());

    let firmware = FirmwareInfo::from_bytes(&data)?;
    log::info!(
        "{}: firmware {} battery {}%",
        device.address(),
        firmware.version,
        firmware.battery
    );

    state.set_firmware(firmware.clone());
    Ok(firmware)
}

/// Switch the sensor data handle to live values
pub fn enable_realtime<T: Transport + ?Sized>(transport: &mut T, device: &Device) -> Result<(), Error> {
    log::info!("{}: enabling realtime sensor data", device.address());
    transport.write_attribute(device, ble::MODE_CONTROL, &ble::commands::ENABLE_REALTIME)?;
    Ok(())
}

/// Read live measurements
///
/// Writes the realtime enable command first when the cached firmware
/// version requires it. If that write fails the sensor data is not read.
pub fn read_sensors<T: Transport + ?Sized>(
    transport: &mut T,
    device: &Device,
    state: &DeviceState,
) -> Result<SensorReading, Error> {
    if ble::requires_realtime_enable(state.cached_version()) {
        enable_realtime(transport, device)?;
    }

    let data = transport.read_attribute(device, ble::SENSOR_DATA)?;
    log::debug!("{}: read {} sensor bytes", device.address(), data.len());

    Ok(SensorReading::from_bytes(&data)?)
}

/// A device, its cached state and the transport used to reach it
///
/// Operations take `&mut self`; share one across threads only behind a lock.
#[derive(Debug)]
pub struct Miflora<T> {
    transport: T,
    device: Device,
    state: DeviceState,
}

impl<T: Transport> Miflora<T> {
    pub fn new(transport: T, device: Device) -> Self {
        Self::with_state(transport, device, DeviceState::new())
    }

    pub fn with_state(transport: T, device: Device, state: DeviceState) -> Self {
        Self {
            transport,
            device,
            state,
        }
    }

    pub fn read_firmware(&mut self) -> Result<FirmwareInfo, Error> {
        read_firmware(&mut self.transport, &self.device, &mut self.state)
    }

    pub fn read_sensors(&mut self) -> Result<SensorReading, Error> {
        read_sensors(&mut self.transport, &self.device, &self.state)
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn state(&self) -> &DeviceState {
        &self.state
    }

    pub fn into_parts(self) -> (T, Device, DeviceState) {
        (self.transport, self.device, self.state)
    }
}
