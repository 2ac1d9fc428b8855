// Configuration for the bridge
//
// The configuration is a JSON document. Every value has a default, so an
// empty object is a valid configuration.

use std::fs;
use std::path::Path;
use std::time::Duration;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::bridge::dispatcher::FailureMarker;
use crate::bridge::registry::RegistrationPolicy;
use crate::logging::LoggingConfig;

/// Bridge settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Delay between two poll cycles of a site adapter, in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Position jump in microseconds above which a `seeked` signal is sent
    #[serde(default = "default_seek_threshold_us")]
    pub seek_threshold_us: u64,

    /// Reply to failed inbound commands ("false" or "null")
    #[serde(default)]
    pub failure_marker: FailureMarker,

    /// What to do when an object registers for an occupied type ("replace" or "reject")
    #[serde(default)]
    pub registration_policy: RegistrationPolicy,

    /// Whether warnings and debug output are also delivered to the host
    #[serde(default = "default_forward_diagnostics")]
    pub forward_diagnostics: bool,

    /// Logging settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_seek_threshold_us() -> u64 {
    2_000_000
}

fn default_forward_diagnostics() -> bool {
    true
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            poll_interval_ms: default_poll_interval_ms(),
            seek_threshold_us: default_seek_threshold_us(),
            failure_marker: FailureMarker::default(),
            registration_policy: RegistrationPolicy::default(),
            forward_diagnostics: default_forward_diagnostics(),
            logging: None,
        }
    }
}

impl BridgeConfig {
    /// Load the configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read config file {}: {}", path.as_ref().display(), e))?;
        Self::from_json(&content)
    }

    /// Load the configuration from a JSON string
    ///
    /// The bridge settings may sit at the top level or in a "bridge" section.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let document: serde_json::Value =
            serde_json::from_str(json).map_err(|e| format!("Failed to parse config: {}", e))?;
        let section = get_section(&document, "bridge").unwrap_or(&document);
        let mut config: BridgeConfig = serde_json::from_value(section.clone())
            .map_err(|e| format!("Invalid bridge config: {}", e))?;

        if config.logging.is_none() {
            if let Some(logging) = document.get("logging") {
                config.logging = Some(
                    serde_json::from_value(logging.clone())
                        .map_err(|e| format!("Invalid logging config: {}", e))?,
                );
            }
        }
        Ok(config)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Look up a configuration section
///
/// Sections are searched under "sections" first and then at the top level.
///
/// # Example
/// ```rust
/// use serde_json::json;
/// use webmusic::config::get_section;
///
/// let config = json!({ "sections": { "bridge": { "poll_interval_ms": 250 } } });
/// assert_eq!(get_section(&config, "bridge").unwrap()["poll_interval_ms"], 250);
///
/// let flat = json!({ "bridge": { "poll_interval_ms": 100 } });
/// assert_eq!(get_section(&flat, "bridge").unwrap()["poll_interval_ms"], 100);
/// ```
pub fn get_section<'a>(config: &'a serde_json::Value, name: &str) -> Option<&'a serde_json::Value> {
    if let Some(section) = config.get("sections").and_then(|sections| sections.get(name)) {
        debug!("Found {} configuration in sections", name);
        return Some(section);
    }

    if let Some(section) = config.get(name) {
        debug!("Found {} configuration at top level", name);
        return Some(section);
    }

    debug!("No {} configuration found", name);
    None
}
