//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{
    path::{Path, PathBuf},
    str::FromStr,
};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const DEFAULT_SITE_TITLE: &str = "Quaderno";
const DEFAULT_SITE_DESCRIPTION: &str = "A personal blog";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_CONTENT_DIR: &str = "content/posts";
const DEFAULT_OUTPUT_DIR: &str = "public";
const DEFAULT_PER_PAGE: u32 = 9;

/// Command-line arguments for the quaderno binary.
#[derive(Debug, Parser)]
#[command(name = "quaderno", version, about = "Quaderno static blog engine")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "QUADERNO_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build the site into the output directory.
    Build(BuildArgs),
    /// Print the heading outline of a markdown file as JSON.
    Outline(OutlineArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildArgs {
    #[command(flatten)]
    pub overrides: BuildOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct BuildOverrides {
    /// Override the content directory.
    #[arg(long = "content-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub content_dir: Option<PathBuf>,

    /// Override the output directory.
    #[arg(long = "output-dir", value_name = "PATH", value_hint = ValueHint::DirPath)]
    pub output_dir: Option<PathBuf>,

    /// Override the number of posts per listing page.
    #[arg(long = "per-page", value_name = "COUNT")]
    pub per_page: Option<u32>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct OutlineArgs {
    /// Markdown file to scan.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid log level `{value}`")]
    InvalidLogLevel { value: String },
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub site: SiteSettings,
    pub content: ContentSettings,
    pub output: OutputSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteSettings {
    pub title: String,
    pub description: String,
    pub base_url: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_SITE_TITLE.to_string(),
            description: DEFAULT_SITE_DESCRIPTION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub dir: PathBuf,
    pub per_page: u32,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_CONTENT_DIR),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel {
                value: value.to_string(),
            }),
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => LevelFilter::TRACE,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Error => LevelFilter::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl Settings {
    /// Apply build-command CLI flags on top of file/env configuration.
    pub fn apply_build_overrides(&mut self, overrides: &BuildOverrides) -> Result<(), ConfigError> {
        if let Some(dir) = &overrides.content_dir {
            self.content.dir = dir.clone();
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.dir = dir.clone();
        }
        if let Some(per_page) = overrides.per_page {
            self.content.per_page = per_page;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.parse()?;
        }
        if let Some(json) = overrides.log_json {
            self.logging.format = if json {
                LogFormat::Json
            } else {
                LogFormat::Compact
            };
        }
        Ok(())
    }
}

/// Parse CLI arguments and load the layered settings they point at.
pub fn load_with_cli() -> Result<(CliArgs, Settings), ConfigError> {
    let cli = CliArgs::parse();
    let settings = load(cli.config_file.as_deref())?;
    Ok((cli, settings))
}

/// Load settings from defaults, an optional TOML file, and the
/// `QUADERNO_`-prefixed environment.
pub fn load(config_file: Option<&Path>) -> Result<Settings, ConfigError> {
    let builder = Config::builder();
    let builder = match config_file {
        Some(path) => builder.add_source(File::from(path)),
        None => builder.add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false)),
    };
    let raw = builder
        .add_source(Environment::with_prefix("QUADERNO").separator("__"))
        .build()?;

    Ok(raw.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_section() {
        let settings = Settings::default();
        assert_eq!(settings.site.title, "Quaderno");
        assert_eq!(settings.content.dir, PathBuf::from("content/posts"));
        assert_eq!(settings.content.per_page, 9);
        assert_eq!(settings.output.dir, PathBuf::from("public"));
        assert_eq!(settings.logging.level, LogLevel::Info);
        assert_eq!(settings.logging.format, LogFormat::Compact);
    }

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!("DEBUG".parse::<LogLevel>().expect("level"), LogLevel::Debug);
        assert!(matches!(
            "verbose".parse::<LogLevel>(),
            Err(ConfigError::InvalidLogLevel { .. })
        ));
    }

    #[test]
    fn build_overrides_replace_configured_values() {
        let mut settings = Settings::default();
        let overrides = BuildOverrides {
            content_dir: Some(PathBuf::from("notes")),
            output_dir: Some(PathBuf::from("dist")),
            per_page: Some(5),
            log_level: Some("warn".to_string()),
            log_json: Some(true),
        };

        settings
            .apply_build_overrides(&overrides)
            .expect("overrides");
        assert_eq!(settings.content.dir, PathBuf::from("notes"));
        assert_eq!(settings.output.dir, PathBuf::from("dist"));
        assert_eq!(settings.content.per_page, 5);
        assert_eq!(settings.logging.level, LogLevel::Warn);
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn settings_deserialize_from_toml_fragment() {
        let raw = Config::builder()
            .add_source(config::File::from_str(
                "[site]\ntitle = \"Notes\"\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n",
                config::FileFormat::Toml,
            ))
            .build()
            .expect("config");
        let settings: Settings = raw.try_deserialize().expect("settings");

        assert_eq!(settings.site.title, "Notes");
        assert_eq!(settings.logging.level, LogLevel::Debug);
        assert_eq!(settings.logging.format, LogFormat::Json);
        assert_eq!(settings.content.per_page, 9);
    }
}
