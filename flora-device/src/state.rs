//! Device identity and cached firmware state

use flora_proto::FirmwareInfo;

/// One physical sensor: its address and the local adapter to reach it through
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Device {
    address: String,
    adapter: String,
}

impl Device {
    pub fn new(address: impl Into<String>, adapter: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            adapter: adapter.into(),
        }
    }

    /// Hardware address, e.g. `C4:7C:8D:6A:3E:11`
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Local adapter identifier, e.g. `hci0`
    pub fn adapter(&self) -> &str {
        &self.adapter
    }
}

/// What the protocol core remembers about a device between calls
///
/// `firmware` is `None` until the first successful firmware read and is
/// only ever replaced by a later one. It is never invalidated, so a firmware
/// upgrade on the device goes unnoticed until firmware is read again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    firmware: Option<FirmwareInfo>,
}

impl DeviceState {
    pub fn new() -> Self {
        Self::default()
    }

    /// State with a known firmware, as if it had been read from the device
    pub fn with_firmware(firmware: FirmwareInfo) -> Self {
        Self {
            firmware: Some(firmware),
        }
    }

    pub fn firmware(&self) -> Option<&FirmwareInfo> {
        self.firmware.as_ref()
    }

    /// Last known firmware version, `""` if firmware was never read
    pub fn cached_version(&self) -> &str {
        self.firmware.as_ref().map_or("", |f| f.version.as_str())
    }

    pub(crate) fn set_firmware(&mut self, firmware: FirmwareInfo) {
        self.firmware = Some(firmware);
    }
}
