// Configuration loading and parsing (config/hoopgraph.toml).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::record::DEFAULT_MULTI_TEAM_SUFFIX;

/// Name of the single configuration file under `config/` and `defaults/`.
pub const CONFIG_FILE: &str = "hoopgraph.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// hoopgraph.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub defaults: RequestDefaults,
    #[serde(default)]
    pub awards: AwardConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory scanned for `NBA_<year>_per_game_stats.csv` files when
    /// `import` is run without explicit paths.
    pub csv_dir: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: "data".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Team-field suffix marking a multi-team season aggregate.
    pub multi_team_suffix: String,
    /// Upper bound for one chart build, store calls included.
    pub request_timeout_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            multi_team_suffix: DEFAULT_MULTI_TEAM_SUFFIX.into(),
            request_timeout_secs: 30,
        }
    }
}

/// Selectors filled in when a chart request omits them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RequestDefaults {
    pub line_x_axis: String,
    pub line_y_axis: String,
    pub histogram_stat: String,
    pub histogram_bin_count: usize,
    pub scatter_x_stat: String,
    pub scatter_y_stat: String,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            line_x_axis: "age".into(),
            line_y_axis: "points".into(),
            histogram_stat: "points".into(),
            histogram_bin_count: 20,
            scatter_x_stat: "steals".into(),
            scatter_y_stat: "blocks".into(),
        }
    }
}

/// Award-family place cutoffs. Keys are family prefixes (`MVP`, `NBA`, ...);
/// values replace the built-in cutoff for that family.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AwardConfig {
    #[serde(default)]
    pub cutoffs: BTreeMap<String, u32>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/hoopgraph.toml` relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy defaults.
/// Prefer `load_config()` which handles default initialization automatically.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let config: Config = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(&config)?;
    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     run from the project root or ensure defaults/ is present",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Convenience wrapper: loads config relative to the current working directory.
/// Ensures default config files are copied before loading.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validation(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.trim().is_empty() {
        return Err(validation("database.path", "must not be empty"));
    }

    if config.pipeline.multi_team_suffix.trim().is_empty() {
        return Err(validation("pipeline.multi_team_suffix", "must not be empty"));
    }

    if config.pipeline.request_timeout_secs == 0 {
        return Err(validation("pipeline.request_timeout_secs", "must be greater than 0"));
    }

    if config.defaults.histogram_bin_count == 0 {
        return Err(validation("defaults.histogram_bin_count", "must be greater than 0"));
    }

    let d = &config.defaults;
    let selectors: &[(&str, &str)] = &[
        ("defaults.line_x_axis", d.line_x_axis.as_str()),
        ("defaults.line_y_axis", d.line_y_axis.as_str()),
        ("defaults.histogram_stat", d.histogram_stat.as_str()),
        ("defaults.scatter_x_stat", d.scatter_x_stat.as_str()),
        ("defaults.scatter_y_stat", d.scatter_y_stat.as_str()),
    ];
    for (name, value) in selectors {
        if value.trim().is_empty() {
            return Err(validation(name, "must not be empty"));
        }
    }

    for (family, cutoff) in &config.awards.cutoffs {
        if *cutoff == 0 {
            return Err(validation(
                &format!("awards.cutoffs.{family}"),
                "must be greater than 0",
            ));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, where `defaults/` lives.
    fn project_root() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
    }

    /// Fresh temp dir holding `config/hoopgraph.toml` with `contents`.
    fn temp_config(name: &str, contents: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(name);
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        fs::write(tmp.join("config").join(CONFIG_FILE), contents).unwrap();
        tmp
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE))
            .expect("defaults/hoopgraph.toml should exist")
    }

    #[test]
    fn load_valid_config_from_defaults() {
        let tmp = temp_config("hoopgraph_config_defaults", &default_text());
        let config = load_config_from(&tmp).expect("should load default config");

        assert_eq!(config.database.path, "hoopgraph.db");
        assert_eq!(config.data.csv_dir, "data");
        assert_eq!(config.pipeline.multi_team_suffix, "TM");
        assert_eq!(config.pipeline.request_timeout_secs, 30);
        assert_eq!(config.defaults, RequestDefaults::default());
        assert_eq!(config.awards.cutoffs.get("NBA"), Some(&3));
        assert_eq!(config.awards.cutoffs.get("DEF"), Some(&2));
        assert_eq!(config.awards.cutoffs.get("MVP"), Some(&5));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn optional_sections_fall_back_to_builtins() {
        let tmp = temp_config(
            "hoopgraph_config_minimal",
            "[database]\npath = \"stats.db\"\n",
        );
        let config = load_config_from(&tmp).expect("minimal config should load");
        assert_eq!(config.database.path, "stats.db");
        assert_eq!(config.pipeline.multi_team_suffix, "TM");
        assert_eq!(config.defaults.histogram_bin_count, 20);
        assert!(config.awards.cutoffs.is_empty());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_bin_count() {
        let text = default_text().replace("histogram_bin_count = 20", "histogram_bin_count = 0");
        let tmp = temp_config("hoopgraph_config_zero_bins", &text);

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "defaults.histogram_bin_count");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_award_cutoff() {
        let text = default_text().replace("DEF = 2", "DEF = 0");
        let tmp = temp_config("hoopgraph_config_zero_cutoff", &text);

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => {
                assert_eq!(field, "awards.cutoffs.DEF");
            }
            other => panic!("expected ValidationError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_empty_multi_team_suffix() {
        let text = default_text().replace("multi_team_suffix = \"TM\"", "multi_team_suffix = \"\"");
        let tmp = temp_config("hoopgraph_config_empty_suffix", &text);

        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ValidationError { ref field, .. } if field == "pipeline.multi_team_suffix"
        ));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = std::env::temp_dir().join("hoopgraph_config_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();

        let err = load_config_from(&tmp).unwrap_err();
        match &err {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE)),
            other => panic!("expected FileNotFound, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = temp_config("hoopgraph_config_invalid", "this is not valid [[[ toml");
        let err = load_config_from(&tmp).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_and_skips_examples() {
        let tmp = std::env::temp_dir().join("hoopgraph_config_ensure");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE), default_text()).unwrap();
        fs::write(defaults_dir.join("local.toml.example"), "# example\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config").join(CONFIG_FILE).exists());
        assert!(!tmp.join("config/local.toml.example").exists());

        // Second run leaves the existing file alone.
        fs::write(tmp.join("config").join(CONFIG_FILE), "# custom\n").unwrap();
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("hoopgraph_config_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        let err = ensure_config_files(&tmp).unwrap_err();
        match &err {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("neither defaults/ nor config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
