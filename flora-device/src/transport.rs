//! Attribute transport capability
//!
//! The protocol core never talks to a radio itself. It reads and writes
//! attribute handles through a [`Transport`], which `gatttool`, `btleplug`
//! or a scripted fake in tests can implement.

use flora_proto::Handle;

use crate::Device;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}: {stderr}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error("invalid hex in response: {0}")]
    Hex(#[from] data_encoding::DecodeError),
    #[error("bluetooth adapter not found: {0}")]
    AdapterNotFound(String),
    #[error("device not found: {0}")]
    DeviceNotFound(String),
    #[error("no characteristic known for handle {0}")]
    UnknownHandle(Handle),
    #[error("characteristic not found: {0}")]
    CharacteristicNotFound(String),
    #[error(transparent)]
    Backend(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// Read and write access to a device's attribute handles
///
/// Every call blocks until the device answered or the transport gave up.
/// Timeouts are the implementation's business.
pub trait Transport {
    /// Read the raw value stored at `handle`
    fn read_attribute(&mut self, device: &Device, handle: Handle) -> Result<Vec<u8>, TransportError>;

    /// Write `payload` to `handle`. Returns only once the device
    /// acknowledged the write.
    fn write_attribute(
        &mut self,
        device: &Device,
        handle: Handle,
        payload: &[u8],
    ) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_attribute(&mut self, device: &Device, handle: Handle) -> Result<Vec<u8>, TransportError> {
        (**self).read_attribute(device, handle)
    }

    fn write_attribute(
        &mut self,
        device: &Device,
        handle: Handle,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        (**self).write_attribute(device, handle, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_attribute(&mut self, device: &Device, handle: Handle) -> Result<Vec<u8>, TransportError> {
        (**self).read_attribute(device, handle)
    }

    fn write_attribute(
        &mut self,
        device: &Device,
        handle: Handle,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        (**self).write_attribute(device, handle, payload)
    }
}
