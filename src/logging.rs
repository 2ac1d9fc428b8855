use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use env_logger::{Builder, Target, WriteStyle};
use log::{info, LevelFilter};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

/// Logging subsystems of the bridge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LoggingSubsystem {
    /// Demo binary and tools
    Main,
    /// Bridge facade, registry and transport
    Bridge,
    /// Envelope encoding and decoding
    Codec,
    /// Inbound command dispatch
    Dispatch,
    /// Player, playlist and tracklist objects
    Objects,
    /// Site adapters
    Adapters,
    /// Poll tasks
    Scheduler,
    /// Configuration loading
    Config,
    /// Third-party dependencies
    #[strum(serialize = "deps", serialize = "dependencies")]
    Dependencies,
}

impl LoggingSubsystem {
    /// Module prefixes covered by this subsystem
    pub fn module_prefixes(&self) -> &'static [&'static str] {
        match self {
            LoggingSubsystem::Main => &["webmusic", "webmusic_envelope"],
            LoggingSubsystem::Bridge => &[
                "webmusic::bridge::registry",
                "webmusic::bridge::transport",
                "webmusic::bridge::tracker",
                "webmusic::bridge::host",
            ],
            LoggingSubsystem::Codec => &["webmusic::bridge::codec", "webmusic::bridge::envelope"],
            LoggingSubsystem::Dispatch => &["webmusic::bridge::dispatcher", "webmusic::bridge::operations"],
            LoggingSubsystem::Objects => &["webmusic::objects"],
            LoggingSubsystem::Adapters => &["webmusic::adapters"],
            LoggingSubsystem::Scheduler => &["webmusic::helpers::scheduler"],
            LoggingSubsystem::Config => &["webmusic::config"],
            LoggingSubsystem::Dependencies => &["serde", "crossbeam"],
        }
    }

    /// Get all available subsystems
    pub fn all() -> Vec<LoggingSubsystem> {
        LoggingSubsystem::iter().collect()
    }
}

/// Logging configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Global log level (off, error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Target for log output (stdout, stderr)
    #[serde(default = "default_target")]
    pub target: String,

    /// Whether to include timestamps
    #[serde(default = "default_timestamps")]
    pub timestamps: bool,

    /// Whether to use colored output
    #[serde(default = "default_colors")]
    pub colors: bool,

    /// Subsystem-specific log levels; unknown names are used as module paths
    #[serde(default)]
    pub subsystems: HashMap<String, String>,

    /// Whether to include module paths in log output
    #[serde(default)]
    pub include_module_path: bool,

    /// Whether to include line numbers in log output
    #[serde(default)]
    pub include_line_numbers: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_target() -> String {
    "stderr".to_string()
}

fn default_timestamps() -> bool {
    true
}

fn default_colors() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            target: default_target(),
            timestamps: default_timestamps(),
            colors: default_colors(),
            subsystems: HashMap::new(),
            include_module_path: false,
            include_line_numbers: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path.as_ref())
            .map_err(|e| format!("Failed to read logging config file: {}", e))?;
        Self::from_json(&content)
    }

    /// Load logging configuration from JSON string
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse logging config JSON: {}", e))
    }

    /// Convert string log level to LevelFilter
    fn parse_log_level(level: &str) -> LevelFilter {
        LevelFilter::from_str(level).unwrap_or_else(|_| {
            eprintln!("Warning: Unknown log level '{}', defaulting to 'info'", level);
            LevelFilter::Info
        })
    }

    /// Module filters as (module, level) pairs, subsystems expanded
    pub fn module_filters(&self) -> Vec<(String, LevelFilter)> {
        let mut filters = Vec::new();
        let mut names: Vec<&String> = self.subsystems.keys().collect();
        names.sort();

        for name in names {
            let level = Self::parse_log_level(&self.subsystems[name]);
            match LoggingSubsystem::from_str(name) {
                Ok(subsystem) => {
                    for prefix in subsystem.module_prefixes() {
                        filters.push((prefix.to_string(), level));
                    }
                }
                Err(_) => filters.push((name.clone(), level)),
            }
        }
        filters
    }

    /// The filter in `RUST_LOG` syntax, for display
    pub fn build_filter_string(&self) -> String {
        let mut parts = vec![self.level.to_lowercase()];
        for (module, level) in self.module_filters() {
            parts.push(format!("{}={}", module, level.to_string().to_lowercase()));
        }
        parts.join(",")
    }

    /// Initialize the logger with this configuration
    ///
    /// `RUST_LOG` is applied on top of the configured levels.
    pub fn initialize_logger(&self) -> Result<(), String> {
        let mut builder = Builder::new();
        builder.filter(None, Self::parse_log_level(&self.level));
        for (module, level) in self.module_filters() {
            builder.filter(Some(module.as_str()), level);
        }
        builder.parse_env("RUST_LOG");

        builder.write_style(if self.colors { WriteStyle::Auto } else { WriteStyle::Never });

        match self.target.to_lowercase().as_str() {
            "stdout" => builder.target(Target::Stdout),
            "stderr" => builder.target(Target::Stderr),
            other => return Err(format!("Unknown logging target: {}", other)),
        };

        let include_module_path = self.include_module_path;
        let include_line_numbers = self.include_line_numbers;
        let timestamps = self.timestamps;

        builder.format(move |buf, record| {
            let mut output = String::new();

            if timestamps {
                output.push_str(&format!("[{}] ", chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f")));
            }

            output.push_str(&format!("[{}] ", record.level()));

            if include_module_path {
                if let Some(module) = record.module_path() {
                    output.push_str(&format!("[{}] ", module));
                }
            }

            if include_line_numbers {
                if let (Some(file), Some(line)) = (record.file(), record.line()) {
                    output.push_str(&format!("[{}:{}] ", file, line));
                }
            }

            output.push_str(&format!("{}", record.args()));

            writeln!(buf, "{}", output)
        });

        builder
            .try_init()
            .map_err(|e| format!("Failed to initialize logger: {}", e))?;

        info!("Logging initialized with filter: {}", self.build_filter_string());
        Ok(())
    }
}

/// Initialize logging, optionally forcing debug level
pub fn initialize_logging(config: Option<&LoggingConfig>, debug: bool) -> Result<(), String> {
    let mut config = config.cloned().unwrap_or_default();
    if debug {
        config.level = "debug".to_string();
    }
    config.initialize_logger()
}
