// Configuration management for the route classifier
// Supports CLI arguments, config file (TOML), and environment variables

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

use crate::classifier::ClassifierConfig;
use crate::error::AppResult;
use crate::routes::VcnTable;

/// NOC route classifier - turn RouterOS terse dumps into interfaces, routes and partners
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "noc-route-classifier")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Web server port
    #[arg(short, long, env = "NRC_PORT")]
    pub port: Option<u16>,

    /// Bind address
    #[arg(long, env = "NRC_BIND")]
    pub bind: Option<String>,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(short, long, env = "NRC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Path to configuration file
    #[arg(short, long, env = "NRC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Classify this dump file ("-" for stdin), print JSON and exit
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Management address of the device the dump was captured from
    #[arg(long, default_value = "0.0.0.0", env = "NRC_SOURCE_IP")]
    pub source_ip: String,

    /// Log dropped records at warn level
    #[arg(long, env = "NRC_LOG_DROPPED")]
    pub log_dropped: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Configuration file structure (TOML format)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Classifier settings
    #[serde(default)]
    pub classifier: ClassifierSection,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Web server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bind address (default: 127.0.0.1)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ClassifierSection {
    /// Log dropped records at warn level instead of debug
    #[serde(default)]
    pub log_dropped: bool,

    /// Operator-specific VCN prefixes and comment aliases
    #[serde(default)]
    pub vcn: VcnTable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default value functions
fn default_port() -> u16 {
    8080
}
fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: default_port(),
            bind_address: default_bind_address(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
        }
    }
}

/// Merged configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub log_level: Level,
    pub classifier: ClassifierConfig,
    pub input: Option<PathBuf>,
    pub source_ip: String,
    pub pretty: bool,
    /// Config file that was loaded, if any
    pub loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration from all sources (CLI args, config file, defaults)
    /// Priority: CLI args > Environment variables > Config file > Defaults
    pub fn load() -> anyhow::Result<Self> {
        let cli_args = CliArgs::parse();

        let (config_file, loaded_from) = match &cli_args.config {
            Some(config_path) => (read_config_file(config_path)?, Some(config_path.clone())),
            None => {
                // Try loading from default locations
                let default_paths = [
                    PathBuf::from("config.toml"),
                    PathBuf::from("noc-route-classifier.toml"),
                ];

                match default_paths.into_iter().find(|p| p.exists()) {
                    Some(path) => (read_config_file(&path)?, Some(path)),
                    None => (ConfigFile::default(), None),
                }
            }
        };

        let mut config = Self::merge(cli_args, config_file)?;
        config.loaded_from = loaded_from;
        Ok(config)
    }

    /// Merge CLI args over a config file
    pub fn merge(cli_args: CliArgs, config_file: ConfigFile) -> anyhow::Result<Self> {
        let port = cli_args.port.unwrap_or(config_file.server.port);
        let bind_address = cli_args.bind.unwrap_or(config_file.server.bind_address);

        let log_level = parse_log_level(
            cli_args
                .log_level
                .as_deref()
                .unwrap_or(&config_file.logging.level),
        )?;

        config_file.classifier.vcn.validate()?;

        Ok(Config {
            port,
            bind_address,
            log_level,
            classifier: ClassifierConfig {
                vcn_table: config_file.classifier.vcn,
                log_dropped: cli_args.log_dropped || config_file.classifier.log_dropped,
            },
            input: cli_args.input,
            source_ip: cli_args.source_ip,
            pretty: cli_args.pretty,
            loaded_from: None,
        })
    }
}

fn read_config_file(path: &Path) -> AppResult<ConfigFile> {
    let config_content = std::fs::read_to_string(path)?;
    parse_config_file(&config_content)
}

fn parse_config_file(content: &str) -> AppResult<ConfigFile> {
    Ok(toml::from_str::<ConfigFile>(content)?)
}

fn parse_log_level(level_str: &str) -> anyhow::Result<Level> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        _ => Err(anyhow::anyhow!("Invalid log level: {}", level_str)),
    }
}
