//! Configuration management for mdprep.
//!
//! Parses `mdprep.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Expansion
//!
//! - `links.base_url` supports `${VAR}` and `${VAR:-default}`
//! - `templates.dir` supports a leading `~` plus `$VAR` and `${VAR}`, and is
//!   resolved relative to the config file's directory

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override link base URL.
    pub base_url: Option<String>,
    /// Override image embed handling.
    pub image_mode: Option<ImageModeSetting>,
    /// Override user template directory.
    pub templates_dir: Option<PathBuf>,
    /// Override default template name.
    pub default_template: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdprep.toml";

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pass switches.
    pub preprocess: PreprocessConfig,
    /// Wikilink output.
    pub links: LinksConfig,
    /// Embed handling.
    pub embeds: EmbedsConfig,
    /// Template settings (paths are relative strings from TOML).
    templates: TemplatesConfigRaw,

    /// Resolved template configuration (set after loading).
    #[serde(skip)]
    pub templates_resolved: TemplatesConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Which preprocessing passes run.
#[derive(Debug, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PreprocessConfig {
    pub preserve_frontmatter: bool,
    pub extract_metadata: bool,
    pub convert_email_blocks: bool,
    pub convert_embeds: bool,
    pub convert_wikilinks: bool,
    pub convert_callouts: bool,
    pub filter_links: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            preserve_frontmatter: true,
            extract_metadata: true,
            convert_email_blocks: true,
            convert_embeds: true,
            convert_wikilinks: true,
            convert_callouts: true,
            filter_links: true,
        }
    }
}

/// How wikilink targets are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkFormatSetting {
    /// Append `links.extension` to targets.
    #[default]
    Md,
    /// Leave targets without an extension.
    None,
}

/// Wikilink configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub format: LinkFormatSetting,
    /// Extension appended in `md` format. Empty or starting with `.`.
    pub extension: String,
    /// Prefix for relative link targets.
    pub base_url: Option<String>,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            format: LinkFormatSetting::Md,
            extension: ".md".to_owned(),
            base_url: None,
        }
    }
}

/// What image embeds become.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageModeSetting {
    /// Replace with deferred markers resolved later.
    #[default]
    Deferred,
    /// Emit image syntax directly.
    Inline,
}

/// Embed configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmbedsConfig {
    pub image_mode: ImageModeSetting,
}

/// Raw template configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TemplatesConfigRaw {
    dir: Option<String>,
    default: Option<String>,
}

/// Resolved template configuration.
#[derive(Debug)]
pub struct TemplatesConfig {
    /// Directory scanned for user templates.
    pub dir: Option<PathBuf>,
    /// Template used when none is named.
    pub default: String,
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            default: "default".to_owned(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Variable or home directory expansion failed.
    #[error("Expansion error in {field}: {message}")]
    Expand {
        /// Config field path (e.g., "`templates.dir`").
        field: String,
        /// Error message (e.g., "${`TEMPLATES`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdprep.toml` in the current directory and parents,
    /// falling back to defaults.
    ///
    /// CLI settings are applied after loading and path resolution.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, or if reading,
    /// parsing, expansion or validation fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = std::env::current_dir()
            .ok()
            .and_then(|cwd| discover_config(&cwd))
        {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(base_url) = &settings.base_url {
            self.links.base_url = Some(base_url.clone());
        }
        if let Some(image_mode) = settings.image_mode {
            self.embeds.image_mode = image_mode;
        }
        if let Some(dir) = &settings.templates_dir {
            self.templates_resolved.dir = Some(dir.clone());
        }
        if let Some(default) = &settings.default_template {
            self.templates_resolved.default.clone_from(default);
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        config.expand_values()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let extension = &self.links.extension;
        if !extension.is_empty() && !extension.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "links.extension must be empty or start with '.', got '{extension}'"
            )));
        }
        if let Some(base_url) = &self.links.base_url {
            require_non_empty(base_url, "links.base_url")?;
        }
        require_non_empty(&self.templates_resolved.default, "templates.default")?;
        Ok(())
    }

    /// Expand variables in string values before path resolution.
    fn expand_values(&mut self) -> Result<(), ConfigError> {
        if let Some(base_url) = &self.links.base_url {
            self.links.base_url = Some(expand::expand_env(base_url, "links.base_url")?);
        }
        if let Some(dir) = &self.templates.dir {
            self.templates.dir = Some(expand::expand_path(dir, "templates.dir")?);
        }
        Ok(())
    }

    /// Resolve the template directory against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.templates_resolved = TemplatesConfig {
            dir: self.templates.dir.as_deref().map(|dir| config_dir.join(dir)),
            default: self
                .templates
                .default
                .clone()
                .unwrap_or_else(|| TemplatesConfig::default().default),
        };
    }
}

/// Search for the config file in `start` and its parents.
fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILENAME);
        if candidate.exists() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write_config(dir: &Path, content: &str) -> PathBuf {
        let path = dir.join(CONFIG_FILENAME);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(msg.contains(s), "Expected error to contain '{s}', got: {msg}");
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.preprocess.preserve_frontmatter);
        assert!(config.preprocess.convert_callouts);
        assert_eq!(config.links.format, LinkFormatSetting::Md);
        assert_eq!(config.links.extension, ".md");
        assert_eq!(config.links.base_url, None);
        assert_eq!(config.embeds.image_mode, ImageModeSetting::Deferred);
        assert_eq!(config.templates_resolved.default, "default");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[preprocess]
preserve_frontmatter = false
convert_email_blocks = false

[links]
format = "none"
extension = ""
base_url = "https://notes.example.com"

[embeds]
image_mode = "inline"

[templates]
default = "article"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert!(!config.preprocess.preserve_frontmatter);
        assert!(!config.preprocess.convert_email_blocks);
        assert!(config.preprocess.convert_wikilinks);
        assert_eq!(config.links.format, LinkFormatSetting::None);
        assert_eq!(config.links.base_url.as_deref(), Some("https://notes.example.com"));
        assert_eq!(config.embeds.image_mode, ImageModeSetting::Inline);
        assert_eq!(config.templates_resolved.default, "article");
        assert_eq!(config.templates_resolved.dir, None);
    }

    #[test]
    fn test_unknown_link_format_is_parse_error() {
        let result: Result<Config, _> = toml::from_str("[links]\nformat = \"html\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_relative_templates_dir() {
        let mut config: Config = toml::from_str("[templates]\ndir = \"typst\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.templates_resolved.dir, Some(PathBuf::from("/project/typst")));
    }

    #[test]
    fn test_resolve_absolute_templates_dir() {
        let mut config: Config = toml::from_str("[templates]\ndir = \"/opt/typst\"\n").unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.templates_resolved.dir, Some(PathBuf::from("/opt/typst")));
    }

    #[test]
    fn test_validate_extension_without_dot() {
        let mut config = Config::default();
        config.links.extension = "md".to_owned();
        assert_validation_error(&config, &["links.extension", "'md'"]);
    }

    #[test]
    fn test_validate_empty_base_url() {
        let mut config = Config::default();
        config.links.base_url = Some(String::new());
        assert_validation_error(&config, &["links.base_url", "empty"]);
    }

    #[test]
    fn test_validate_empty_default_template() {
        let mut config = Config::default();
        config.templates_resolved.default = " ".to_owned();
        assert_validation_error(&config, &["templates.default"]);
    }

    #[test]
    fn test_load_explicit_path() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            "[templates]\ndir = \"templates\"\ndefault = \"report\"\n",
        );

        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.config_path, Some(path));
        assert_eq!(config.templates_resolved.dir, Some(dir.path().join("templates")));
        assert_eq!(config.templates_resolved.default, "report");
    }

    #[test]
    fn test_load_missing_explicit_path() {
        let result = Config::load(Some(Path::new("/nonexistent/mdprep.toml")), None);
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "[links\n");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "[links]\nextension = \"txt\"\n");
        assert!(matches!(
            Config::load(Some(&path), None),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_discover_in_parent() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "");
        let nested = dir.path().join("notes/daily");
        std::fs::create_dir_all(&nested).unwrap();

        assert_eq!(discover_config(&nested), Some(path));
    }

    #[test]
    fn test_discover_none() {
        let dir = TempDir::new().unwrap();
        let found = discover_config(dir.path());
        assert!(found.is_none_or(|p| !p.starts_with(dir.path())));
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default();
        config.apply_cli_settings(&CliSettings {
            base_url: Some("https://wiki.local".to_owned()),
            image_mode: Some(ImageModeSetting::Inline),
            templates_dir: Some(PathBuf::from("/custom")),
            default_template: Some("letter".to_owned()),
        });

        assert_eq!(config.links.base_url.as_deref(), Some("https://wiki.local"));
        assert_eq!(config.embeds.image_mode, ImageModeSetting::Inline);
        assert_eq!(config.templates_resolved.dir, Some(PathBuf::from("/custom")));
        assert_eq!(config.templates_resolved.default, "letter");
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_config(dir.path(), "[links]\nbase_url = \"https://a.example\"\n");
        let config = Config::load(Some(&path), Some(&CliSettings::default())).unwrap();
        assert_eq!(config.links.base_url.as_deref(), Some("https://a.example"));
    }

    #[test]
    fn test_load_expands_base_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MDPREP_LOAD_HOST_TEST");
        }
        let dir = TempDir::new().unwrap();
        let path = write_config(
            dir.path(),
            "[links]\nbase_url = \"https://${MDPREP_LOAD_HOST_TEST:-fallback.example}\"\n",
        );
        let config = Config::load(Some(&path), None).unwrap();
        assert_eq!(config.links.base_url.as_deref(), Some("https://fallback.example"));
    }
}
