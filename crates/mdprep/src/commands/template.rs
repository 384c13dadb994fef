//! `mdprep template` command implementations.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use mdprep_config::{CliSettings, Config};
use mdprep_preprocess::{PreprocessingResult, Preprocessor};
use mdprep_template::{
    SubstitutionContext, TemplateAnalysis, TemplateManager, TemplateValidationResult,
};

use crate::error::CliError;
use crate::options::{preprocess_options, template_manager};
use crate::output::Output;

/// Arguments shared by the template subcommands.
#[derive(Args)]
pub(crate) struct TemplateArgs {
    #[command(subcommand)]
    command: TemplateCommand,

    /// Path to configuration file (default: auto-discover mdprep.toml).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Directory with user templates (overrides config).
    #[arg(long, global = true, env = "MDPREP_TEMPLATES_DIR")]
    templates_dir: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum TemplateCommand {
    /// List built-in and user templates.
    List,
    /// Check a template for errors.
    Validate {
        /// Template name or path to a `.typ` file.
        name: String,
    },
    /// Show a template's placeholders and functions.
    Analyze {
        /// Template name or path to a `.typ` file.
        name: String,
    },
    /// Validate every available template.
    Health,
    /// Render a markdown file with a template.
    Render(RenderArgs),
}

/// Arguments for the render subcommand.
#[derive(Args)]
struct RenderArgs {
    /// Template name or path (default: `templates.default` from config).
    name: Option<String>,

    /// Markdown file used as the document body.
    #[arg(short, long)]
    body: PathBuf,

    /// Template variable as KEY=VALUE (repeatable).
    #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
    vars: Vec<(String, String)>,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl TemplateArgs {
    /// Execute the template command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration or a template cannot be loaded, or
    /// if validation fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let cli_settings = CliSettings {
            templates_dir: self.templates_dir.clone(),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let manager = template_manager(&config);

        match &self.command {
            TemplateCommand::List => {
                list(&output, &manager);
                Ok(())
            }
            TemplateCommand::Validate { name } => validate(&output, &manager, name),
            TemplateCommand::Analyze { name } => {
                let analysis = manager.analyze_template(name)?;
                print_analysis(&output, &analysis);
                Ok(())
            }
            TemplateCommand::Health => health(&output, &manager),
            TemplateCommand::Render(args) => args.execute(&output, &config, &manager),
        }
    }
}

impl RenderArgs {
    fn execute(
        &self,
        output: &Output,
        config: &Config,
        manager: &TemplateManager,
    ) -> Result<(), CliError> {
        let raw = std::fs::read_to_string(&self.body).map_err(|source| CliError::ReadFile {
            path: self.body.clone(),
            source,
        })?;
        let options = preprocess_options(config).with_preserve_frontmatter(false);
        let document = Preprocessor::new(options).process(&raw);
        for warning in &document.warnings {
            output.warning(&format!("{}: {warning}", self.body.display()));
        }
        for error in &document.errors {
            output.error(&format!("{}: {error}", self.body.display()));
        }

        let context = render_context(&document, &self.vars);
        let name = self
            .name
            .as_deref()
            .unwrap_or(&config.templates_resolved.default);
        let rendered = manager.process_template(name, &context)?;

        match &self.output {
            Some(path) => {
                std::fs::write(path, rendered).map_err(|source| CliError::WriteFile {
                    path: path.clone(),
                    source,
                })?;
                output.success(&format!("Rendered {name} -> {}", path.display()));
            }
            None => output.emit(&rendered)?,
        }
        Ok(())
    }
}

/// Build the substitution context for a preprocessed document.
///
/// Document metadata seeds `title`, `author`, `date` and `tags`; explicit
/// `--var` values win.
fn render_context(document: &PreprocessingResult, vars: &[(String, String)]) -> SubstitutionContext {
    let mut context = SubstitutionContext::new();
    if let Some(title) = &document.metadata.title {
        context.insert("title", title.clone());
    }
    if let Some(frontmatter) = &document.metadata.frontmatter {
        for key in ["author", "date"] {
            if let Some(value) = frontmatter.get(key).and_then(|v| v.to_display_string()) {
                context.insert(key, value);
            }
        }
    }
    if !document.metadata.tags.is_empty() {
        context.insert("tags", document.metadata.tags.join(", "));
    }
    for (key, value) in vars {
        context.insert(key.clone(), value.clone());
    }
    context.insert_raw("body", document.content.clone());
    context
}

/// Parse a `KEY=VALUE` argument.
fn parse_var(arg: &str) -> Result<(String, String), String> {
    let (key, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{arg}'"))?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return Err(format!("invalid variable name '{key}'"));
    }
    Ok((key.to_owned(), value.to_owned()))
}

fn list(output: &Output, manager: &TemplateManager) {
    output.highlight("Available templates:");
    for info in manager.list_templates() {
        let mut line = format!("  {:<12} ({})", info.name, info.source);
        if let Some(description) = &info.description {
            line.push_str(&format!(" - {description}"));
        }
        output.info(&line);
        if info.shadows_builtin {
            output.detail("               overrides the built-in template");
        }
    }
}

fn validate(output: &Output, manager: &TemplateManager, name: &str) -> Result<(), CliError> {
    let result = manager.validate_template(name, None)?;
    print_validation(output, &result);
    if result.is_valid() {
        output.success(&format!("Template '{name}' is valid"));
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "Template '{name}' has {} error(s)",
            result.errors.len()
        )))
    }
}

fn print_validation(output: &Output, result: &TemplateValidationResult) {
    for error in &result.errors {
        output.error(&format!("  error: {error}"));
    }
    for warning in &result.warnings {
        output.warning(&format!("  warning: {warning}"));
    }
}

fn print_analysis(output: &Output, analysis: &TemplateAnalysis) {
    output.highlight(&format!("{} ({})", analysis.name, analysis.source));
    output.info(&format!("Lines: {}", analysis.line_count));
    output.info(&format!(
        "Body placeholder: {}",
        if analysis.has_body { "yes" } else { "no" }
    ));

    output.info(&format!("\nVariables ({}):", analysis.variables.len()));
    for (name, count) in &analysis.variables {
        output.info(&format!("  ${name}$ x{count}"));
    }

    output.info(&format!("\nFunctions called ({}):", analysis.functions.len()));
    if !analysis.functions.is_empty() {
        output.info(&format!("  {}", analysis.functions.join(", ")));
    }
    if !analysis.defined_functions.is_empty() {
        output.info(&format!(
            "Functions defined: {}",
            analysis.defined_functions.join(", ")
        ));
    }

    output.info("");
    print_validation(output, &analysis.validation);
    if analysis.validation.is_valid() {
        output.success("Valid");
    } else {
        output.error("Invalid");
    }
}

fn health(output: &Output, manager: &TemplateManager) -> Result<(), CliError> {
    let report = manager.health_check();
    for template in &report.templates {
        match &template.status {
            Ok(result) if result.is_valid() => output.success(&format!(
                "  ok    {} ({}), {} warning(s)",
                template.name,
                template.source,
                result.warnings.len()
            )),
            Ok(result) => {
                output.error(&format!("  FAIL  {} ({})", template.name, template.source));
                print_validation(output, result);
            }
            Err(message) => output.error(&format!(
                "  FAIL  {} ({}): {message}",
                template.name, template.source
            )),
        }
    }

    if report.is_healthy() {
        Ok(())
    } else {
        Err(CliError::Validation(format!(
            "{} template(s) failed the health check",
            report.unhealthy().count()
        )))
    }
}

#[cfg(test)]
mod tests {
    use mdprep_preprocess::PreprocessOptions;
    use mdprep_template::{ContextValue, TemplateManagerConfig};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_var() {
        assert_eq!(
            parse_var("title=A = B").unwrap(),
            ("title".to_owned(), "A = B".to_owned())
        );
        assert_eq!(
            parse_var("empty=").unwrap(),
            ("empty".to_owned(), String::new())
        );
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("bad-name=x").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_render_context_from_document() {
        let document = Preprocessor::new(PreprocessOptions::default().with_preserve_frontmatter(false))
            .process("---\ntitle: Plan\nauthor: Ann\ntags: [q3]\n---\nBody text #draft\n");

        let context = render_context(&document, &[("author".to_owned(), "Bob".to_owned())]);

        assert_eq!(context.get("title"), Some(&ContextValue::Text("Plan".to_owned())));
        assert_eq!(context.get("author"), Some(&ContextValue::Text("Bob".to_owned())));
        assert_eq!(
            context.get("tags"),
            Some(&ContextValue::Text("q3, draft".to_owned()))
        );
        assert!(matches!(context.get("body"), Some(ContextValue::Raw(body)) if body.contains("Body text")));
    }

    #[test]
    fn test_render_with_builtin() {
        let document = Preprocessor::new(PreprocessOptions::default()).process("# Notes\n\nHello.\n");
        let context = render_context(&document, &[]);
        let manager = TemplateManager::new(TemplateManagerConfig::new().with_today("2024-01-02"));

        let rendered = manager.process_template("default", &context).unwrap();
        assert!(rendered.contains("[Notes]"));
        assert!(rendered.contains("Hello."));
        assert!(rendered.contains("2024-01-02"));
    }
}
