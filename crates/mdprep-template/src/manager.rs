//! Template registry and rendering entry points.
//!
//! [`TemplateManager`] resolves a template name to its text (built-in or a
//! `*.typ` file in the user template directory), validates it, and renders it
//! with a [`SubstitutionContext`]. File reads go through an injectable
//! callback so that the manager can be used without a real file system.

use std::io;
use std::path::{Path, PathBuf};

use crate::builtin::{builtin_content, builtin_templates};
use crate::context::SubstitutionContext;
use crate::error::TemplateError;
use crate::substitute::substitute_with_defaults;
use crate::template::{Template, TemplateSidecar, TemplateSource};
use crate::validate::{
    TemplateValidationResult, TemplateValidator, called_functions, defined_functions,
};
use crate::variables::count_variables;

/// Type alias for the file reading callback function.
pub type ReadFileFn = dyn Fn(&Path) -> io::Result<String> + Send + Sync;

/// Extension of template files.
const TEMPLATE_EXTENSION: &str = "typ";

/// Extension of template metadata sidecars.
const SIDECAR_EXTENSION: &str = "yaml";

/// Configuration for [`TemplateManager`].
#[derive(Default)]
pub struct TemplateManagerConfig {
    /// Directory scanned for user templates.
    pub user_dir: Option<PathBuf>,
    /// Callback to read files.
    ///
    /// Default: `std::fs::read_to_string`
    pub read_file: Option<Box<ReadFileFn>>,
    /// Fixed date for the `date` default (`YYYY-MM-DD`). Default: today.
    pub today: Option<String>,
}

impl TemplateManagerConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_user_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.user_dir = Some(dir.into());
        self
    }

    /// Set the file reading callback.
    #[must_use]
    pub fn with_read_file<F>(mut self, read_file: F) -> Self
    where
        F: Fn(&Path) -> io::Result<String> + Send + Sync + 'static,
    {
        self.read_file = Some(Box::new(read_file));
        self
    }

    #[must_use]
    pub fn with_today(mut self, date: impl Into<String>) -> Self {
        self.today = Some(date.into());
        self
    }
}

/// Default file reading function.
fn default_read_file(path: &Path) -> io::Result<String> {
    std::fs::read_to_string(path)
}

/// Summary of an available template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateInfo {
    pub name: String,
    pub source: TemplateSource,
    pub description: Option<String>,
    /// A user template hides the built-in template of the same name.
    pub shadows_builtin: bool,
}

/// Structural summary of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateAnalysis {
    pub name: String,
    pub source: TemplateSource,
    /// Placeholders with occurrence counts, in order of first appearance.
    pub variables: Vec<(String, usize)>,
    /// Functions called as `#name(`.
    pub functions: Vec<String>,
    /// Functions defined with `#let name(`.
    pub defined_functions: Vec<String>,
    pub line_count: usize,
    pub has_body: bool,
    pub validation: TemplateValidationResult,
}

/// Health of one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateHealth {
    pub name: String,
    pub source: TemplateSource,
    /// Validation outcome, or the load error message.
    pub status: Result<TemplateValidationResult, String>,
}

impl TemplateHealth {
    pub fn is_healthy(&self) -> bool {
        self.status
            .as_ref()
            .is_ok_and(TemplateValidationResult::is_valid)
    }
}

/// Result of validating every available template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    pub templates: Vec<TemplateHealth>,
}

impl HealthReport {
    /// Every template loaded and validated without errors.
    pub fn is_healthy(&self) -> bool {
        self.templates.iter().all(TemplateHealth::is_healthy)
    }

    pub fn unhealthy(&self) -> impl Iterator<Item = &TemplateHealth> {
        self.templates.iter().filter(|t| !t.is_healthy())
    }
}

/// Resolves, validates and renders templates.
pub struct TemplateManager {
    config: TemplateManagerConfig,
    validator: TemplateValidator,
    builtins: Vec<Template>,
    user_templates: Vec<Template>,
}

impl TemplateManager {
    /// Create a manager and discover user templates.
    pub fn new(config: TemplateManagerConfig) -> Self {
        let mut manager = Self {
            config,
            validator: TemplateValidator::new(),
            builtins: builtin_templates(),
            user_templates: Vec::new(),
        };
        manager.refresh();
        manager
    }

    /// Replace the validator (e.g. to accept extra function names).
    #[must_use]
    pub fn with_validator(mut self, validator: TemplateValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Re-scan the user template directory. Returns the number of user
    /// templates found.
    pub fn refresh(&mut self) -> usize {
        self.user_templates = match &self.config.user_dir {
            Some(dir) => self.discover(dir),
            None => Vec::new(),
        };
        tracing::info!(
            builtin = self.builtins.len(),
            user = self.user_templates.len(),
            "Discovered templates"
        );
        self.user_templates.len()
    }

    fn discover(&self, dir: &Path) -> Vec<Template> {
        let pattern = format!(
            "{}/*.{TEMPLATE_EXTENSION}",
            glob::Pattern::escape(&dir.to_string_lossy())
        );

        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(error) => {
                tracing::warn!(dir = %dir.display(), %error, "Invalid template directory pattern");
                return Vec::new();
            }
        };

        let mut templates: Vec<Template> = paths
            .filter_map(|entry| match entry {
                Ok(path) if path.is_file() => Some(self.file_template(path)),
                Ok(_) => None,
                Err(error) => {
                    tracing::warn!(%error, "Skipping unreadable template path");
                    None
                }
            })
            .collect();
        templates.sort_by(|a, b| a.name.cmp(&b.name));
        templates
    }

    /// Build a template for a `.typ` file, reading its sidecar if present.
    fn file_template(&self, path: PathBuf) -> Template {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let sidecar = self.load_sidecar(&path.with_extension(SIDECAR_EXTENSION));

        Template {
            name,
            source: TemplateSource::File(path),
            variables: sidecar.variables,
            metadata: sidecar.metadata,
        }
    }

    fn load_sidecar(&self, path: &Path) -> TemplateSidecar {
        let yaml = match self.read(path) {
            Ok(yaml) => yaml,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return TemplateSidecar::default();
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "Failed to read template metadata");
                return TemplateSidecar::default();
            }
        };

        TemplateSidecar::parse(&yaml).unwrap_or_else(|error| {
            tracing::warn!(path = %path.display(), %error, "Invalid template metadata, ignoring");
            TemplateSidecar::default()
        })
    }

    fn read(&self, path: &Path) -> io::Result<String> {
        match &self.config.read_file {
            Some(read_file) => read_file(path),
            None => default_read_file(path),
        }
    }

    /// Available templates: built-ins first (unless shadowed), then user
    /// templates by name.
    pub fn list_templates(&self) -> Vec<TemplateInfo> {
        let is_user = |name: &str| self.user_templates.iter().any(|t| t.name == name);
        let is_builtin = |name: &str| self.builtins.iter().any(|t| t.name == name);

        self.builtins
            .iter()
            .filter(|t| !is_user(&t.name))
            .chain(&self.user_templates)
            .map(|t| TemplateInfo {
                name: t.name.clone(),
                source: t.source.clone(),
                description: t.metadata.description.clone(),
                shadows_builtin: matches!(t.source, TemplateSource::File(_)) && is_builtin(&t.name),
            })
            .collect()
    }

    /// Find a template by name. A name ending in `.typ` is treated as a path.
    pub fn resolve(&self, name: &str) -> Result<Template, TemplateError> {
        if let Some(template) = self
            .user_templates
            .iter()
            .chain(&self.builtins)
            .find(|t| t.name == name)
        {
            return Ok(template.clone());
        }

        let path = Path::new(name);
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(TEMPLATE_EXTENSION))
        {
            return Ok(self.file_template(path.to_path_buf()));
        }

        Err(TemplateError::NotFound(name.to_owned()))
    }

    /// Read the template text.
    pub fn load_content(&self, template: &Template) -> Result<String, TemplateError> {
        match &template.source {
            TemplateSource::BuiltIn(id) => builtin_content(id)
                .map(str::to_owned)
                .ok_or_else(|| TemplateError::NotFound((*id).to_owned())),
            TemplateSource::File(path) => self
                .read(path)
                .map_err(|error| TemplateError::from_io(path.clone(), error)),
        }
    }

    /// Validate a template, and the context against its required variables
    /// when one is given.
    pub fn validate_template(
        &self,
        name: &str,
        context: Option<&SubstitutionContext>,
    ) -> Result<TemplateValidationResult, TemplateError> {
        let template = self.resolve(name)?;
        let content = self.load_content(&template)?;
        Ok(self.validate_loaded(&template, &content, context))
    }

    fn validate_loaded(
        &self,
        template: &Template,
        content: &str,
        context: Option<&SubstitutionContext>,
    ) -> TemplateValidationResult {
        let mut result = self.validator.validate(content);
        if let Some(context) = context {
            self.validator
                .validate_context(&mut result, context, &template.required_variables());
        }
        result
    }

    /// Validate and render a template.
    ///
    /// Returns [`TemplateError::Invalid`] when validation reports errors.
    /// Missing values fall back to the template's declared defaults, then to
    /// the built-in defaults.
    pub fn process_template(
        &self,
        name: &str,
        context: &SubstitutionContext,
    ) -> Result<String, TemplateError> {
        let template = self.resolve(name)?;
        let content = self.load_content(&template)?;

        let result = self.validate_loaded(&template, &content, Some(context));
        for warning in &result.warnings {
            tracing::debug!(template = %template.name, warning, "Template warning");
        }
        if !result.is_valid() {
            return Err(TemplateError::Invalid {
                name: template.name,
                errors: result.errors,
            });
        }

        let rendered = match &self.config.today {
            Some(today) => substitute_with_defaults(
                &content,
                &context.clone().with_today(today.clone()),
                &template.declared_defaults(),
            ),
            None => substitute_with_defaults(&content, context, &template.declared_defaults()),
        };
        Ok(rendered)
    }

    /// Describe a template's placeholders, functions and validity.
    pub fn analyze_template(&self, name: &str) -> Result<TemplateAnalysis, TemplateError> {
        let template = self.resolve(name)?;
        let content = self.load_content(&template)?;
        let variables = count_variables(&content);

        Ok(TemplateAnalysis {
            has_body: variables.iter().any(|(name, _)| name == "body"),
            functions: called_functions(&content),
            defined_functions: defined_functions(&content),
            line_count: content.lines().count(),
            validation: self.validator.validate(&content),
            variables,
            name: template.name,
            source: template.source,
        })
    }

    /// Load and validate every available template.
    pub fn health_check(&self) -> HealthReport {
        let templates = self
            .list_templates()
            .into_iter()
            .map(|info| {
                let status = self
                    .resolve(&info.name)
                    .and_then(|template| self.load_content(&template))
                    .map(|content| self.validator.validate(&content))
                    .map_err(|error| error.to_string());
                TemplateHealth {
                    name: info.name,
                    source: info.source,
                    status,
                }
            })
            .collect();

        HealthReport { templates }
    }
}
