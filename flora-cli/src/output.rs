use std::fmt::Write as _;

use flora_device::{FirmwareInfo, SensorReading};

/// What a command read from the device
#[derive(Debug, Default, serde::Serialize)]
pub struct Report {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firmware: Option<FirmwareInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sensors: Option<SensorReading>,
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        if let Some(fw) = &self.firmware {
            let _ = writeln!(out, "firmware:     {}", fw.version);
            let _ = writeln!(out, "battery:      {}%", fw.battery);
        }
        if let Some(s) = &self.sensors {
            let _ = writeln!(out, "temperature:  {:.1} °C", s.temperature);
            let _ = writeln!(out, "moisture:     {}%", s.moisture);
            let _ = writeln!(out, "light:        {} lux", s.light);
            let _ = writeln!(out, "conductivity: {} µS/cm", s.conductivity);
        }
        out
    }
}
