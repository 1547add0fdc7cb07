//! Configuration for the wavetap daemons.
//!
//! Operational knobs (pipe path, listen address, batch size, sample source)
//! come from an optional JSON file with environment overrides on top. Pin
//! assignment and protocol timing are compile-time constants in `hw` and
//! `adc`: the converter is soldered to fixed lines, so a config entry for
//! them would only invite mismatches.

use std::env;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pipe;
use crate::server;

/// Path checked when WAVETAP_CONFIG is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/wavetap/config.json";

const DEFAULT_PORT: u16 = 8081;

/// Top-level configuration shared by both daemons.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub pipe: PipeConfig,
    pub server: ServerConfig,
}

/// Which sample source the acquisition daemon runs.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub sine: SineConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// The converter on the GPIO header.
    #[default]
    Gpio,
    /// The built-in sine synthesizer.
    Sine,
}

/// Parameters for the sine synthesizer.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SineConfig {
    /// Signal frequency in Hz.
    pub frequency: f64,
    /// Nominal sample rate in Hz used to advance the phase.
    pub sample_rate: f64,
    /// Half the peak-to-peak swing, in counts.
    pub amplitude: u16,
}

impl Default for SineConfig {
    fn default() -> Self {
        Self {
            frequency: 50_000.0,
            sample_rate: 100_000_000.0,
            amplitude: 512,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipeConfig {
    pub path: PathBuf,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(pipe::DEFAULT_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: SocketAddr,
    pub batch_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            batch_bytes: server::DEFAULT_BATCH_BYTES,
        }
    }
}

impl Config {
    /// Load configuration from the default locations.
    ///
    /// WAVETAP_CONFIG names an explicit file (an error if unreadable);
    /// otherwise the system path is used when present, else defaults.
    /// Environment overrides apply in every case.
    pub fn load() -> Result<Self> {
        let mut config = match env::var("WAVETAP_CONFIG") {
            Ok(path) => Self::load_from(Path::new(&path))?,
            Err(_) => {
                let system = Path::new(DEFAULT_CONFIG_PATH);
                if system.exists() {
                    Self::load_from(system)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|err| Error::Config(format!("read {}: {err}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|err| Error::Config(format!("parse {}: {err}", path.display())))
    }

    // Overrides for the knobs an operator flips without editing the file.
    fn apply_env(&mut self) -> Result<()> {
        if let Ok(path) = env::var("WAVETAP_PIPE") {
            self.pipe.path = PathBuf::from(path);
        }
        if let Ok(listen) = env::var("WAVETAP_LISTEN") {
            self.server.listen = listen
                .parse()
                .map_err(|_| Error::Config(format!("bad WAVETAP_LISTEN: {listen}")))?;
        }
        if let Ok(batch) = env::var("WAVETAP_BATCH_BYTES") {
            self.server.batch_bytes = batch
                .parse()
                .map_err(|_| Error::Config(format!("bad WAVETAP_BATCH_BYTES: {batch}")))?;
        }
        if let Ok(kind) = env::var("WAVETAP_SOURCE") {
            self.source.kind = match kind.as_str() {
                "gpio" => SourceKind::Gpio,
                "sine" => SourceKind::Sine,
                other => {
                    return Err(Error::Config(format!("bad WAVETAP_SOURCE: {other}")));
                }
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "WAVETAP_CONFIG",
            "WAVETAP_PIPE",
            "WAVETAP_LISTEN",
            "WAVETAP_BATCH_BYTES",
            "WAVETAP_SOURCE",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_defaults_match_the_wire_constants() {
        let config = Config::default();
        assert_eq!(config.pipe.path, PathBuf::from("/tmp/adc_data_pipe"));
        assert_eq!(config.server.listen.port(), 8081);
        assert_eq!(config.server.batch_bytes, 4000);
        assert_eq!(config.source.kind, SourceKind::Gpio);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let parsed: Config =
            serde_json::from_str(r#"{"server": {"listen": "127.0.0.1:9000"}}"#).unwrap();
        assert_eq!(parsed.server.listen.port(), 9000);
        assert_eq!(parsed.server.batch_bytes, 4000);
        assert_eq!(parsed.pipe.path, PathBuf::from("/tmp/adc_data_pipe"));
    }

    #[test]
    fn test_source_kind_is_lowercase_in_json() {
        let parsed: Config = serde_json::from_str(r#"{"source": {"kind": "sine"}}"#).unwrap();
        assert_eq!(parsed.source.kind, SourceKind::Sine);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        env::set_var("WAVETAP_PIPE", "/run/wavetap/pipe");
        env::set_var("WAVETAP_LISTEN", "127.0.0.1:9001");
        env::set_var("WAVETAP_BATCH_BYTES", "8000");
        env::set_var("WAVETAP_SOURCE", "sine");

        let config = Config::load().unwrap();
        assert_eq!(config.pipe.path, PathBuf::from("/run/wavetap/pipe"));
        assert_eq!(config.server.listen.port(), 9001);
        assert_eq!(config.server.batch_bytes, 8000);
        assert_eq!(config.source.kind, SourceKind::Sine);

        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_env_value_is_an_error() {
        clear_env();
        env::set_var("WAVETAP_SOURCE", "noise");
        assert!(matches!(Config::load(), Err(Error::Config(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_file_loads_and_env_wins() {
        clear_env();
        let path = env::temp_dir().join(format!("wavetap-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"server": {"batch_bytes": 2000}}"#).unwrap();
        env::set_var("WAVETAP_CONFIG", &path);
        env::set_var("WAVETAP_BATCH_BYTES", "6000");

        let config = Config::load().unwrap();
        assert_eq!(config.server.batch_bytes, 6000);

        clear_env();
        std::fs::remove_file(&path).unwrap();
    }
}
