//! Settings from FLORA_HOME/config.json and the command line

use std::path::{Path, PathBuf};
use std::time::Duration;

use flora_device::Device;

pub const CONFIG_FILE: &str = "config.json";
pub const DEFAULT_ADAPTER: &str = "hci0";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Shell out to BlueZ gatttool
    #[default]
    Gatttool,
    /// Talk to the Bluetooth stack directly
    Btle,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no device given, pass --device or set \"device\" in config.json")]
    MissingDevice,
}

/// FLORA_HOME, or ~/.flora
pub fn flora_home() -> Option<PathBuf> {
    std::env::var("FLORA_HOME")
        .map(PathBuf::from)
        .ok()
        .or_else(|| dirs::home_dir().map(|h| h.join(".flora")))
}

/// Contents of config.json, every field optional
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub device: Option<String>,
    pub adapter: Option<String>,
    pub transport: Option<TransportKind>,
    pub gatttool: Option<String>,
    pub lookup_timeout_secs: Option<u64>,
}

impl FileConfig {
    /// Load `home/config.json`. A missing file yields the empty config.
    pub fn load(home: &Path) -> Result<Self, ConfigError> {
        let path = home.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        log::debug!("loaded {}", path.display());
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
    }
}

/// Values given on the command line, they win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub device: Option<String>,
    pub adapter: Option<String>,
    pub transport: Option<TransportKind>,
    pub gatttool: Option<String>,
    pub lookup_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub device: Device,
    pub transport: TransportKind,
    pub gatttool: String,
    pub lookup_timeout: Duration,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let address = overrides
            .device
            .or(file.device)
            .ok_or(ConfigError::MissingDevice)?;
        let adapter = overrides
            .adapter
            .or(file.adapter)
            .unwrap_or_else(|| DEFAULT_ADAPTER.to_string());

        Ok(Self {
            device: Device::new(address, adapter),
            transport: overrides.transport.or(file.transport).unwrap_or_default(),
            gatttool: overrides
                .gatttool
                .or(file.gatttool)
                .unwrap_or_else(|| flora_device::gatttool::DEFAULT_PROGRAM.to_string()),
            lookup_timeout: Duration::from_secs(
                overrides
                    .lookup_timeout_secs
                    .or(file.lookup_timeout_secs)
                    .unwrap_or(DEFAULT_LOOKUP_TIMEOUT_SECS),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_home(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("flora-config-{name}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn defaults() {
        let overrides = Overrides {
            device: Some("C4:7C:8D:6A:3E:11".to_string()),
            ..Default::default()
        };
        let settings = Settings::resolve(FileConfig::default(), overrides).unwrap();
        assert_eq!(settings.device, Device::new("C4:7C:8D:6A:3E:11", "hci0"));
        assert_eq!(settings.transport, TransportKind::Gatttool);
        assert_eq!(settings.gatttool, "gatttool");
        assert_eq!(settings.lookup_timeout, Duration::from_secs(10));
    }

    #[test]
    fn command_line_wins() {
        let file = FileConfig {
            device: Some("C4:7C:8D:00:00:01".to_string()),
            adapter: Some("hci1".to_string()),
            transport: Some(TransportKind::Btle),
            gatttool: None,
            lookup_timeout_secs: Some(30),
        };
        let overrides = Overrides {
            device: Some("C4:7C:8D:00:00:02".to_string()),
            lookup_timeout_secs: Some(5),
            ..Default::default()
        };
        let settings = Settings::resolve(file, overrides).unwrap();
        assert_eq!(settings.device, Device::new("C4:7C:8D:00:00:02", "hci1"));
        assert_eq!(settings.transport, TransportKind::Btle);
        assert_eq!(settings.lookup_timeout, Duration::from_secs(5));
    }

    #[test]
    fn missing_device() {
        assert!(matches!(
            Settings::resolve(FileConfig::default(), Overrides::default()),
            Err(ConfigError::MissingDevice)
        ));
    }

    #[test]
    fn load_missing_file() {
        let home = temp_home("missing");
        assert_eq!(FileConfig::load(&home).unwrap(), FileConfig::default());
    }

    #[test]
    fn load_file() {
        let home = temp_home("load");
        std::fs::write(
            home.join(CONFIG_FILE),
            r#"{ "device": "C4:7C:8D:6A:3E:11", "transport": "btle", "lookup_timeout_secs": 20 }"#,
        )
        .unwrap();

        let file = FileConfig::load(&home).unwrap();
        assert_eq!(file.device.as_deref(), Some("C4:7C:8D:6A:3E:11"));
        assert_eq!(file.transport, Some(TransportKind::Btle));
        assert_eq!(file.lookup_timeout_secs, Some(20));
        assert_eq!(file.adapter, None);
    }

    #[test]
    fn load_invalid_file() {
        let home = temp_home("invalid");
        std::fs::write(home.join(CONFIG_FILE), r#"{ "colour": "green" }"#).unwrap();
        assert!(matches!(FileConfig::load(&home), Err(ConfigError::Parse { .. })));
    }
}
