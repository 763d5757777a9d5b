//! Transport that shells out to BlueZ's `gatttool`
//!
//! ```text
//! $ gatttool -b C4:7C:8D:6A:3E:11 --char-read -a 0x38 -i hci0
//! Characteristic value/descriptor: 64 10 32 2e 36 2e 32
//! $ gatttool -b C4:7C:8D:6A:3E:11 --char-write-req -a 0x33 -n A01F -i hci0
//! Characteristic value was written successfully
//! ```

use std::process::Command;

use flora_proto::Handle;

use crate::{Device, Transport, TransportError};

const READ_PREFIX: &str = "Characteristic value/descriptor: ";
const WRITE_ACK: &str = "successfully";

pub const DEFAULT_PROGRAM: &str = "gatttool";

#[derive(Debug, Clone)]
pub struct GattTool {
    program: String,
}

impl Default for GattTool {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl GattTool {
    /// `program` is looked up on `PATH` unless it is a path
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run the tool and return its stdout
    fn run(&self, args: &[&str]) -> Result<String, TransportError> {
        log::debug!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| TransportError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(TransportError::ExitStatus {
                program: self.program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Transport for GattTool {
    fn read_attribute(&mut self, device: &Device, handle: Handle) -> Result<Vec<u8>, TransportError> {
        let handle = handle.to_string();
        let stdout = self.run(&[
            "-b",
            device.address(),
            "--char-read",
            "-a",
            &handle,
            "-i",
            device.adapter(),
        ])?;
        parse_read_output(&stdout)
    }

    fn write_attribute(
        &mut self,
        device: &Device,
        handle: Handle,
        payload: &[u8],
    ) -> Result<(), TransportError> {
        let handle = handle.to_string();
        let value = data_encoding::HEXUPPER.encode(payload);
        let stdout = self.run(&[
            "-b",
            device.address(),
            "--char-write-req",
            "-a",
            &handle,
            "-n",
            &value,
            "-i",
            device.adapter(),
        ])?;
        check_write_output(&stdout)
    }
}

/// Extract the value bytes from `--char-read` output
pub fn parse_read_output(stdout: &str) -> Result<Vec<u8>, TransportError> {
    let hex = stdout
        .strip_prefix(READ_PREFIX)
        .ok_or_else(|| TransportError::UnexpectedResponse(stdout.trim().to_string()))?;

    let hex: String = hex.chars().filter(|c| *c != ' ' && *c != '\n').collect();
    Ok(data_encoding::HEXLOWER_PERMISSIVE.decode(hex.as_bytes())?)
}

/// Confirm `--char-write-req` output acknowledges the write
pub fn check_write_output(stdout: &str) -> Result<(), TransportError> {
    if !stdout.contains(WRITE_ACK) {
        return Err(TransportError::UnexpectedResponse(stdout.trim().to_string()));
    }
    Ok(())
}
