//! btleplug backed attribute transport
//!
//! btleplug addresses characteristics by UUID rather than by attribute
//! handle, so the fixed handles of the sensor are mapped onto the
//! characteristics of its data service.

use btleplug::api::{Central, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType};
use btleplug::platform::{Adapter, Manager, Peripheral};
use std::time::{Duration, Instant};
use uuid::Uuid;

use flora_device::{Device, Handle, Transport, TransportError, ble};

/// Mode control characteristic, attribute handle 0x33
pub const MODE_CONTROL_UUID: Uuid = Uuid::from_u128(0x00001a00_0000_1000_8000_00805f9b34fb);

/// Sensor data characteristic, attribute handle 0x35
pub const SENSOR_DATA_UUID: Uuid = Uuid::from_u128(0x00001a01_0000_1000_8000_00805f9b34fb);

/// Firmware and battery characteristic, attribute handle 0x38
pub const FIRMWARE_UUID: Uuid = Uuid::from_u128(0x00001a02_0000_1000_8000_00805f9b34fb);

pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Characteristic UUID behind an attribute handle
pub fn characteristic_uuid(handle: Handle) -> Option<Uuid> {
    match handle {
        ble::MODE_CONTROL => Some(MODE_CONTROL_UUID),
        ble::SENSOR_DATA => Some(SENSOR_DATA_UUID),
        ble::FIRMWARE => Some(FIRMWARE_UUID),
        _ => None,
    }
}

fn backend(e: btleplug::Error) -> TransportError {
    TransportError::Backend(Box::new(e))
}

/// Blocking [`Transport`] over btleplug
///
/// Owns a single threaded tokio runtime and drives every call to
/// completion on it. The peripheral is looked up and connected on first
/// use and the connection is kept for later calls.
pub struct BtleTransport {
    runtime: tokio::runtime::Runtime,
    lookup_timeout: Duration,
    connected: Option<Connection>,
}

struct Connection {
    device: Device,
    peripheral: Peripheral,
}

impl BtleTransport {
    pub fn new() -> Result<Self, TransportError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| TransportError::Backend(Box::new(e)))?;

        Ok(Self {
            runtime,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            connected: None,
        })
    }

    /// How long to scan for the device's address before giving up
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Drop the current connection, if any
    pub fn disconnect(&mut self) {
        if let Some(conn) = self.connected.take() {
            if let Err(e) = self.runtime.block_on(conn.peripheral.disconnect()) {
                log::warn!("{}: failed to disconnect: {e}", conn.device.address());
            }
        }
    }

    fn characteristic(
        &mut self,
        device: &Device,
        handle: Handle,
    ) -> Result<(Peripheral, Characteristic), TransportError> {
        let uuid = characteristic_uuid(handle).ok_or(TransportError::UnknownHandle(handle))?;

        if self.connected.as_ref().is_some_and(|c| c.device != *device) {
            self.disconnect();
        }

        let Self {
            runtime,
            lookup_timeout,
            connected,
        } = self;

        runtime.block_on(async {
            let peripheral = match connected.as_ref() {
                Some(conn) => conn.peripheral.clone(),
                None => {
                    let peripheral = connect(device, *lookup_timeout).await?;
                    *connected = Some(Connection {
                        device: device.clone(),
                        peripheral: peripheral.clone(),
                    });
                    peripheral
                }
            };

            if !peripheral.is_connected().await.map_err(backend)? {
                log::debug!("{}: reconnecting", device.address());
                peripheral.connect().await.map_err(backend)?;
                peripheral.discover_services().await.map_err(backend)?;
            }

            let characteristic = peripheral
                .characteristics()
                .into_iter()
                .find(|c| c.uuid == uuid)
                .ok_or_else(|| TransportError::CharacteristicNotFound(uuid.to_string()))?;

            Ok::<_, TransportError>((peripheral, characteristic))
        })
    }
}

impl Drop for BtleTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}

impl Transport for BtleTransport {
    fn read_attribute(&mut self, device: &Device, handle: Handle) -> Result<Vec<u8>, TransportError> {
        let (peripheral, characteristic) = self.characteristic(device, handle)?;
        log::debug!("{}: read {handle} ({})", device.address(), characteristic.uuid);

        self.runtime
            .block_on(peripheral.read(&characteristic))
            .map_err(backend)
    }

    fn write_attribute(
        &mut self,
        device: &Device,
        handle: Handle,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let (peripheral, characteristic) = self.characteristic(device, handle)?;
        log::debug!("{}: write {handle} ({})", device.address(), characteristic.uuid);

        self.runtime
            .block_on(peripheral.write(&characteristic, payload, WriteType::WithResponse))
            .map_err(backend)
    }
}

/// Find the local adapter named by `id`, or the first one if `id` is empty
///
/// On Linux `adapter_info` reads like `hci0 (usb:v1D6Bp0246d0537)`.
pub async fn get_adapter(id: &str) -> Result<Adapter, TransportError> {
    let manager = Manager::new().await.map_err(backend)?;
    let adapters = manager.adapters().await.map_err(backend)?;

    for adapter in adapters {
        if id.is_empty() {
            return Ok(adapter);
        }
        let info = adapter.adapter_info().await.map_err(backend)?;
        if info.starts_with(id) {
            return Ok(adapter);
        }
    }

    Err(TransportError::AdapterNotFound(id.to_string()))
}

/// Scan until a peripheral with the device's address shows up
async fn find_peripheral(
    adapter: &Adapter,
    device: &Device,
    timeout: Duration,
) -> Result<Peripheral, TransportError> {
    adapter.start_scan(ScanFilter::default()).await.map_err(backend)?;

    let deadline = Instant::now() + timeout;
    let found = loop {
        let peripherals = adapter.peripherals().await.map_err(backend)?;
        if let Some(p) = peripherals
            .into_iter()
            .find(|p| p.address().to_string().eq_ignore_ascii_case(device.address()))
        {
            break Some(p);
        }
        if Instant::now() >= deadline {
            break None;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    };

    if let Err(e) = adapter.stop_scan().await {
        log::warn!("failed to stop scan: {e}");
    }

    found.ok_or_else(|| TransportError::DeviceNotFound(device.address().to_string()))
}

async fn connect(device: &Device, timeout: Duration) -> Result<Peripheral, TransportError> {
    let adapter = get_adapter(device.adapter()).await?;
    let peripheral = find_peripheral(&adapter, device, timeout).await?;

    log::debug!("{}: connecting", device.address());
    peripheral.connect().await.map_err(backend)?;
    peripheral.discover_services().await.map_err(backend)?;
    Ok(peripheral)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handle_mapping() {
        assert_eq!(characteristic_uuid(ble::MODE_CONTROL), Some(MODE_CONTROL_UUID));
        assert_eq!(characteristic_uuid(ble::SENSOR_DATA), Some(SENSOR_DATA_UUID));
        assert_eq!(characteristic_uuid(ble::FIRMWARE), Some(FIRMWARE_UUID));
        assert_eq!(characteristic_uuid(Handle(0x10)), None);
    }

    #[test]
    fn uuid_text() {
        assert_eq!(
            SENSOR_DATA_UUID.to_string(),
            "00001a01-0000-1000-8000-00805f9b34fb"
        );
    }

    #[test]
    fn unknown_handle_fails_before_touching_the_radio() {
        let mut transport = BtleTransport::new().unwrap();
        let device = Device::new("C4:7C:8D:6A:3E:11", "hci0");
        assert!(matches!(
            transport.read_attribute(&device, Handle(0x10)),
            Err(TransportError::UnknownHandle(Handle(0x10)))
        ));
    }
}
