//! Tool configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Output format for reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Top-level gradebook configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradebookConfig {
    /// Directory that JSON reports are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Report format used when `--format` is not given.
    #[serde(default = "default_format")]
    pub default_format: OutputFormat,
    /// Decimal places when printing percentages.
    #[serde(default = "default_decimal_places")]
    pub decimal_places: usize,
    /// Minimum change in percentage points that `compare` reports.
    #[serde(default = "default_change_threshold")]
    pub change_threshold: f64,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./gradebook-reports")
}
fn default_format() -> OutputFormat {
    OutputFormat::Text
}
fn default_decimal_places() -> usize {
    2
}
fn default_change_threshold() -> f64 {
    0.5
}

impl Default for GradebookConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            default_format: default_format(),
            decimal_places: default_decimal_places(),
            change_threshold: default_change_threshold(),
        }
    }
}

/// Expand `${VAR_NAME}` references in a string.
///
/// Unset variables expand to the empty string. Expanded values are copied
/// through as-is, so a value containing `${...}` is not expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `gradebook.toml` in the current directory
/// 2. `~/.config/gradebook/config.toml`
///
/// `GRADEBOOK_OUTPUT_DIR` overrides `output_dir`.
pub fn load_config() -> Result<GradebookConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<GradebookConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("gradebook.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config(&path)?
        }
        None => GradebookConfig::default(),
    };

    if let Ok(dir) = std::env::var("GRADEBOOK_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    let resolved = resolve_env_vars(&config.output_dir.to_string_lossy());
    config.output_dir = PathBuf::from(resolved);

    Ok(config)
}

fn parse_config(path: &Path) -> Result<GradebookConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = toml::from_str::<GradebookConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    if !config.change_threshold.is_finite() || config.change_threshold < 0.0 {
        anyhow::bail!(
            "invalid change_threshold {} in {}",
            config.change_threshold,
            path.display()
        );
    }
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("gradebook"))
}
