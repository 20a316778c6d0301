// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::auth::VerifierConfig;
use crate::constants::DEFAULT_CLOCK_SKEW_SECS;

pub mod certs;

pub use certs::{parse_host_alias, CertsConfig};

fn default_clock_skew() -> u64 {
    DEFAULT_CLOCK_SKEW_SECS
}

/// Verifier configuration, loaded from YAML and/or command-line flags.
///
/// Empty allow-lists mean "allow any" for that dimension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub allowed_subjects: Vec<String>,
    #[serde(default)]
    pub allowed_algorithms: Vec<String>,
    /// Tolerance for `iat`/`exp` checks in seconds (default: 60)
    #[serde(default = "default_clock_skew")]
    pub clock_skew_secs: u64,
    #[serde(default)]
    pub certs: CertsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allowed_subjects: Vec::new(),
            allowed_algorithms: Vec::new(),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS,
            certs: CertsConfig::default(),
        }
    }
}

/// Values given on the command line, layered over the file configuration.
///
/// Lists extend the file's lists; scalars replace the file's values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub allowed_subjects: Vec<String>,
    pub allowed_algorithms: Vec<String>,
    pub host_aliases: Vec<(String, String)>,
    pub clock_skew_secs: Option<u64>,
    pub certs_timeout_secs: Option<u64>,
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                )
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty document is a valid, all-defaults configuration
        if substituted.trim().is_empty() {
            return Ok(Config::default());
        }

        serde_yaml::from_str(&substituted).map_err(|e| e.to_string())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        self.allowed_subjects.extend(overrides.allowed_subjects);
        self.allowed_algorithms.extend(overrides.allowed_algorithms);
        self.certs.host_aliases.extend(overrides.host_aliases);

        if let Some(skew) = overrides.clock_skew_secs {
            self.clock_skew_secs = skew;
        }
        if let Some(timeout) = overrides.certs_timeout_secs {
            self.certs.timeout_secs = timeout;
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.allowed_subjects.iter().any(|s| s.is_empty()) {
            return Err("allowed_subjects cannot contain an empty subject".to_string());
        }

        if self.allowed_algorithms.iter().any(|a| a.is_empty()) {
            return Err("allowed_algorithms cannot contain an empty algorithm".to_string());
        }

        if self.clock_skew_secs > i64::MAX as u64 {
            return Err(format!(
                "clock_skew_secs {} is out of range",
                self.clock_skew_secs
            ));
        }

        if self.certs.timeout_secs == 0 {
            return Err("certs.timeout_secs must be greater than 0".to_string());
        }

        for (from, to) in &self.certs.host_aliases {
            if from.is_empty() || to.is_empty() {
                return Err(format!(
                    "certs.host_aliases entry '{}' -> '{}' has an empty host name",
                    from, to
                ));
            }
        }

        Ok(())
    }

    /// Build the immutable verifier settings
    pub fn verifier_config(&self) -> VerifierConfig {
        VerifierConfig {
            allowed_subjects: self.allowed_subjects.iter().cloned().collect(),
            allowed_algorithms: self.allowed_algorithms.iter().cloned().collect(),
            clock_skew_secs: i64::try_from(self.clock_skew_secs).unwrap_or(i64::MAX),
        }
    }
}
