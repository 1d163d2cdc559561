use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Role of a party in a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Garbler,
    Evaluator,
}

impl FromStr for Party {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "garbler" | "alice" => Ok(Party::Garbler),
            "evaluator" | "bob" => Ok(Party::Evaluator),
            _ => bail!("unknown party {s}, expected garbler or evaluator"),
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Party::Garbler => f.write_str("garbler"),
            Party::Evaluator => f.write_str("evaluator"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtMode {
    #[default]
    Enabled,
    /// Both labels of every evaluator input travel in the bundle. Not secure.
    Disabled,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingProperties {
    /// The minimum logging level, must be either of <https://docs.rs/tracing/latest/tracing/struct.Level.html#implementations>
    pub level: String,
    /// A `tracing_subscriber::EnvFilter` directive, takes precedence over `level`
    pub filter: Option<String>,
}

impl Default for LoggingProperties {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            filter: None,
        }
    }
}

/// Settings of one party, shared by every run it takes part in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolConfig {
    pub party: Party,
    pub oblivious_transfer: OtMode,
    /// Garbler asks the evaluator to send the output back
    pub share_output: bool,
    /// Read timeout on the connection, no timeout when unset or 0
    pub timeout_secs: Option<u64>,
    /// Address the evaluator listens on and the garbler connects to
    pub address: String,
    pub log: LoggingProperties,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            party: Party::Garbler,
            oblivious_transfer: OtMode::Enabled,
            share_output: true,
            timeout_secs: Some(30),
            address: "127.0.0.1:5000".to_string(),
            log: LoggingProperties::default(),
        }
    }
}

impl ProtocolConfig {
    pub fn new(party: Party) -> Self {
        Self {
            party,
            ..Default::default()
        }
    }

    #[inline]
    pub fn ot_enabled(&self) -> bool {
        self.oblivious_transfer == OtMode::Enabled
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|&s| s > 0).map(Duration::from_secs)
    }
}

/// Parse a yaml configuration file into a struct
pub fn parse_config_file<T: DeserializeOwned>(location: &str) -> Result<T> {
    let file = std::fs::File::open(location)?;
    let config: T = serde_yaml::from_reader(file)?;
    Ok(config)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let location = "./config/config.yaml";
        let config: Result<ProtocolConfig> = parse_config_file(location);
        assert!(
            config.is_ok(),
            "Could not open file or read the file's values."
        );
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: ProtocolConfig = serde_yaml::from_str(
            "party: evaluator\noblivious_transfer: disabled\nlog:\n  level: debug\n",
        )
        .unwrap();
        assert_eq!(config.party, Party::Evaluator);
        assert!(!config.ot_enabled());
        assert!(config.share_output);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.log.filter, None);
    }

    #[test]
    fn test_zero_timeout_disables_it() {
        let mut config = ProtocolConfig::new(Party::Garbler);
        config.timeout_secs = Some(0);
        assert_eq!(config.timeout(), None);
        config.timeout_secs = None;
        assert_eq!(config.timeout(), None);
        config.timeout_secs = Some(5);
        assert_eq!(config.timeout(), Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_party_from_str() {
        assert_eq!("Garbler".parse::<Party>().unwrap(), Party::Garbler);
        assert_eq!("bob".parse::<Party>().unwrap(), Party::Evaluator);
        assert!("carol".parse::<Party>().is_err());
    }
}
