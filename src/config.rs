//! Configuration management for the type generator
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (typegen.toml)
//! - Environment variables (TYPEGEN__*)
//!
//! ## Example config file (typegen.toml):
//! ```toml
//! [generation]
//! package = "contracts"
//! properties_optional_by_default = false
//! acronyms = ["ID", "URL", "API"]
//!
//! [render]
//! keyword_escape = "raw"
//! accessors = true
//! extra_derives = ["Default"]
//!
//! [render.types]
//! datetime = "String"
//!
//! [output]
//! directory = "src/generated"
//! ```

use std::path::PathBuf;

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

use crate::codegen::RenderProfile;

/// Main configuration for the generator
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TypegenConfig {
    /// Schema compilation settings
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Rust rendering settings
    #[serde(default)]
    pub render: RenderProfile,

    /// Where generated files go
    #[serde(default)]
    pub output: OutputConfig,
}

/// Settings that change the compiled type model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Package every compiled type is declared in
    pub package: String,

    /// Whether a property without an `optional`/`required` marker is optional
    pub properties_optional_by_default: bool,

    /// Words kept upper-case in type names (e.g., ID, URL, UUID, API)
    pub acronyms: Vec<String>,

    /// Name array item types after the singular of the array's name
    pub singularize_array_items: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            package: "generated".to_string(),
            properties_optional_by_default: true,
            acronyms: ["ID", "URL", "UUID", "API", "HTTP", "JSON", "XML", "SQL", "URI", "UI", "IO"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            singularize_array_items: true,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory generated files are written to
    #[serde(default = "default_output_directory")]
    pub directory: PathBuf,

    /// File name override (defaults to `<package>.rs`)
    #[serde(default)]
    pub file_name: Option<String>,
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            file_name: None,
        }
    }
}

impl TypegenConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(None)
    }

    /// Load configuration, layering an explicit file over the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for location in ["typegen.toml", ".typegen.toml", "config/typegen.toml"] {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        if let Some(xdg_config) = user_config_file() {
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // TYPEGEN__GENERATION__PACKAGE=contracts
        builder = builder.add_source(
            Environment::with_prefix("TYPEGEN")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path, content)
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> std::io::Result<String> {
        toml::to_string_pretty(self).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }

    /// Output file name for the configured package
    pub fn output_file_name(&self) -> String {
        self.output
            .file_name
            .clone()
            .unwrap_or_else(|| format!("{}.rs", self.generation.package))
    }
}

/// Per-user config file (`~/.config/jsonschema-typegen/typegen.toml` on Linux)
pub fn user_config_file() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.github", "jsonschema-typegen", "jsonschema-typegen")
        .map(|dirs| dirs.config_dir().join("typegen.toml"))
}
