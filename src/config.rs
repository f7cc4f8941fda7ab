use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure for ciview.
///
/// Lets users pin the project, token and tunables instead of repeating
/// them on every invocation. Files are discovered in the current
/// directory, then in the user config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Provider connection and fetch tunables
    #[serde(default)]
    pub circleci: CircleConfig,

    /// Output preferences
    #[serde(default)]
    pub output: OutputConfig,

    /// Watch-mode behavior
    #[serde(default)]
    pub watch: WatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CircleConfig {
    /// API token
    pub token: Option<String>,

    /// Provider base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Project slug (e.g. 'gh/org/repo')
    pub project_slug: Option<String>,

    /// Maximum pipeline pages fetched per collection pass. Caps API load;
    /// raise it for projects with many short-lived branches.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Concurrent per-branch workflow fetches per batch
    #[serde(default = "default_fan_out_batch")]
    pub fan_out_batch: usize,

    /// Reporting window for insights queries
    #[serde(default = "default_reporting_window")]
    pub reporting_window: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Default output format
    #[serde(default)]
    pub format: OutputFormat,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Summary,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WatchConfig {
    /// Seconds between collection passes while entities stay active
    #[serde(default = "default_watch_interval")]
    pub interval_secs: u64,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            token: None,
            base_url: default_base_url(),
            project_slug: None,
            max_pages: default_max_pages(),
            fan_out_batch: default_fan_out_batch(),
            reporting_window: default_reporting_window(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Summary,
            pretty: false,
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval(),
        }
    }
}

fn default_base_url() -> String {
    "https://circleci.com".to_string()
}

fn default_max_pages() -> usize {
    5
}

fn default_fan_out_batch() -> usize {
    6
}

fn default_reporting_window() -> String {
    "last-90-days".to_string()
}

fn default_watch_interval() -> u64 {
    10
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches in this order:
    /// 1. Specified path
    /// 2. ./ciview.toml, ./ciview.json, ./ciview.yaml, ./ciview.yml
    /// 3. <user config dir>/ciview/ciview.toml
    ///
    /// Returns default configuration if no file is found.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        for candidate in Self::candidates() {
            if candidate.exists() {
                return Self::load_from_path(&candidate);
            }
        }

        Ok(Self::default())
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates: Vec<PathBuf> = ["ciview.toml", "ciview.json", "ciview.yaml", "ciview.yml"]
            .iter()
            .map(PathBuf::from)
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("ciview").join("ciview.toml"));
        }

        candidates
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn defaults_are_sane() {
        let config = Config::default();
        assert_eq!(config.circleci.base_url, "https://circleci.com");
        assert_eq!(config.circleci.max_pages, 5);
        assert_eq!(config.circleci.fan_out_batch, 6);
        assert_eq!(config.circleci.reporting_window, "last-90-days");
        assert_eq!(config.watch.interval_secs, 10);
        assert_eq!(config.output.format, OutputFormat::Summary);
        assert!(!config.output.pretty);
    }

    #[test]
    fn loads_toml_config() {
        let mut temp_file = NamedTempFile::with_suffix(".toml").unwrap();
        let toml_content = r#"
[circleci]
token = "cci-test-token"
project-slug = "gh/acme/app"
max-pages = 2
fan-out-batch = 3

[output]
format = "json"
pretty = true

[watch]
interval-secs = 30
"#;
        write!(temp_file, "{toml_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.circleci.token, Some("cci-test-token".to_string()));
        assert_eq!(config.circleci.project_slug, Some("gh/acme/app".to_string()));
        assert_eq!(config.circleci.max_pages, 2);
        assert_eq!(config.circleci.fan_out_batch, 3);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.pretty);
        assert_eq!(config.watch.interval_secs, 30);
    }

    #[test]
    fn loads_json_config() {
        let mut temp_file = NamedTempFile::with_suffix(".json").unwrap();
        let json_content = r#"{
  "circleci": {
    "token": "cci-json-token",
    "base-url": "https://circleci.example.com"
  }
}"#;
        write!(temp_file, "{json_content}").unwrap();

        let config = Config::load_from_path(temp_file.path()).unwrap();
        assert_eq!(config.circleci.token, Some("cci-json-token".to_string()));
        assert_eq!(config.circleci.base_url, "https://circleci.example.com");
        // Unspecified sections fall back to defaults
        assert_eq!(config.circleci.max_pages, 5);
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        assert!(Config::load(Some(Path::new("nonexistent-ciview.toml"))).is_err());
    }

    #[test]
    fn no_config_anywhere_falls_back_to_defaults() {
        // Run from a directory with no candidate files
        let temp_dir = tempfile::tempdir().unwrap();
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(&temp_dir).unwrap();

        let config = Config::load(None).unwrap();

        std::env::set_current_dir(original_dir).unwrap();
        assert_eq!(config.circleci.base_url, "https://circleci.com");
    }
}
