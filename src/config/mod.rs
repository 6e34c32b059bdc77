//! Tool configuration.
//!
//! Layers, lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. Project file (`./ccltc.yaml`, or the path given with `--config`)
//! 3. Environment variables (`CCLTC_SOURCE_DIR`, `CCLTC_AUTO_CONFLICTS`, ...)
//! 4. Command-line flags
//!
//! Keys are normalized to lowercase kebab case, so `source_dir`,
//! `SOURCE-DIR` and `source-dir` are the same key. Nested YAML mappings
//! flatten to dotted keys.
//!
//! The implementation profile is a separate document, see [`profile`].

pub mod profile;

use crate::error::{CclError, Result};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILENAME: &str = "ccltc.yaml";

const ENV_PREFIX: &str = "CCLTC_";

pub const DEFAULT_SOURCE_DIR: &str = "tests";
pub const DEFAULT_OUTPUT_DIR: &str = "generated_tests";

/// One layer of flattened, normalized key/value pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigLayer {
    pub values: HashMap<String, String>,
}

impl ConfigLayer {
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(normalize_key(key), value.into());
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(&normalize_key(key)).map(String::as_str)
    }

    /// Merge another layer on top of this one (higher precedence wins).
    pub fn merge_from(&mut self, other: &Self) {
        for (key, value) in &other.values {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Merge layers in precedence order (lowest to highest).
    #[must_use]
    pub fn merge_layers(layers: &[Self]) -> Self {
        let mut merged = Self::default();
        for layer in layers {
            merged.merge_from(layer);
        }
        merged
    }

    /// # Errors
    ///
    /// Returns `Yaml` if the text does not parse.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let value: serde_yaml::Value = serde_yaml::from_str(text)?;
        let mut flat = HashMap::new();
        flatten_yaml(&value, "", &mut flat);

        let mut layer = Self::default();
        for (key, value) in flat {
            layer.set(&key, value);
        }
        Ok(layer)
    }

    /// Build a layer from a YAML file. A missing file is an empty layer.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Build a layer from `CCLTC_*` variables in `vars`.
    #[must_use]
    pub fn from_env_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut layer = Self::default();
        for (key, value) in vars {
            if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
                layer.set(stripped, value);
            }
        }
        layer
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_vars(env::vars())
    }
}

/// Values given on the command line, if any.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub source_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub metadata: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub auto_conflicts: Option<bool>,
    pub validate_metadata: Option<bool>,
}

impl CliOverrides {
    #[must_use]
    pub fn as_layer(&self) -> ConfigLayer {
        let mut layer = ConfigLayer::default();
        let paths = [
            ("source-dir", &self.source_dir),
            ("output-dir", &self.output_dir),
            ("metadata", &self.metadata),
            ("profile", &self.profile),
        ];
        for (key, path) in paths
            .into_iter()
            .filter_map(|(key, path)| path.as_ref().map(|path| (key, path)))
        {
            layer.set(key, path.to_string_lossy());
        }
        if let Some(enabled) = self.auto_conflicts {
            layer.set("auto-conflicts", enabled.to_string());
        }
        if let Some(enabled) = self.validate_metadata {
            layer.set("validate-metadata", enabled.to_string());
        }
        layer
    }
}

/// Resolved tool settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    pub metadata: Option<PathBuf>,
    pub profile: Option<PathBuf>,
    pub auto_conflicts: bool,
    pub validate_metadata: bool,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            metadata: None,
            profile: None,
            auto_conflicts: true,
            validate_metadata: false,
        }
    }
}

impl ToolConfig {
    /// Resolve settings from a merged layer.
    ///
    /// # Errors
    ///
    /// Returns `Config` if a boolean key holds something other than a
    /// recognizable boolean.
    pub fn from_layer(layer: &ConfigLayer) -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            source_dir: path_value(layer, "source-dir").unwrap_or(defaults.source_dir),
            output_dir: path_value(layer, "output-dir").unwrap_or(defaults.output_dir),
            metadata: path_value(layer, "metadata"),
            profile: path_value(layer, "profile"),
            auto_conflicts: bool_value(layer, "auto-conflicts")?
                .unwrap_or(defaults.auto_conflicts),
            validate_metadata: bool_value(layer, "validate-metadata")?
                .unwrap_or(defaults.validate_metadata),
        })
    }
}

/// Load the tool configuration with the documented precedence.
///
/// An explicit `config_path` must exist; the implicit `./ccltc.yaml` may not.
///
/// # Errors
///
/// Returns `Config` if the explicit file is missing or a value is invalid,
/// or a read/parse error from the file.
pub fn load_config(config_path: Option<&Path>, cli: &CliOverrides) -> Result<ToolConfig> {
    let file_layer = match config_path {
        Some(path) if !path.exists() => {
            return Err(CclError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Some(path) => ConfigLayer::from_yaml(path)?,
        None => ConfigLayer::from_yaml(Path::new(DEFAULT_CONFIG_FILENAME))?,
    };

    let merged = ConfigLayer::merge_layers(&[file_layer, ConfigLayer::from_env(), cli.as_layer()]);
    ToolConfig::from_layer(&merged)
}

fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase().replace('_', "-")
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn path_value(layer: &ConfigLayer, key: &str) -> Option<PathBuf> {
    layer
        .get(key)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn bool_value(layer: &ConfigLayer, key: &str) -> Result<Option<bool>> {
    layer
        .get(key)
        .map(|raw| {
            parse_bool(raw).ok_or_else(|| {
                CclError::Config(format!("invalid boolean for '{key}': '{raw}'"))
            })
        })
        .transpose()
}

fn flatten_yaml(value: &serde_yaml::Value, prefix: &str, out: &mut HashMap<String, String>) {
    match value {
        serde_yaml::Value::Mapping(map) => {
            for (key, value) in map {
                let Some(key_str) = key.as_str() else {
                    continue;
                };
                let next_prefix = if prefix.is_empty() {
                    key_str.to_string()
                } else {
                    format!("{prefix}.{key_str}")
                };
                flatten_yaml(value, &next_prefix, out);
            }
        }
        serde_yaml::Value::Sequence(values) => {
            let joined = values
                .iter()
                .filter_map(yaml_scalar_to_string)
                .collect::<Vec<_>>()
                .join(",");
            out.insert(prefix.to_string(), joined);
        }
        _ => {
            if let Some(value) = yaml_scalar_to_string(value) {
                out.insert(prefix.to_string(), value);
            }
        }
    }
}

fn yaml_scalar_to_string(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Bool(v) => Some(v.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Null
        | serde_yaml::Value::Sequence(_)
        | serde_yaml::Value::Mapping(_) => None,
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(&tagged.value),
    }
}
