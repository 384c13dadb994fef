//! `mdprep convert` command implementation.

use std::path::{Path, PathBuf};

use clap::Args;
use mdprep_config::{CliSettings, Config, ImageModeSetting};
use mdprep_preprocess::{PreprocessOptions, PreprocessingResult, Preprocessor};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::CliError;
use crate::options::preprocess_options;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Markdown files to preprocess.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output file, or output directory when several files are given
    /// (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Title that wins over the frontmatter title.
    #[arg(long, conflicts_with = "title_from_filename")]
    title: Option<String>,

    /// Use each file name (without extension) as its title.
    #[arg(long)]
    title_from_filename: bool,

    /// Drop the frontmatter block from the output.
    #[arg(long)]
    strip_frontmatter: bool,

    /// Print content, metadata, warnings and errors as JSON.
    #[arg(long)]
    json: bool,

    /// Base URL for converted wikilinks (overrides config).
    #[arg(long, env = "MDPREP_BASE_URL")]
    base_url: Option<String>,

    /// Emit image syntax instead of deferred embed markers.
    #[arg(long)]
    inline_images: bool,

    /// Path to configuration file (default: auto-discover mdprep.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

/// One converted file.
#[derive(Serialize)]
struct Document {
    path: PathBuf,
    #[serde(flatten)]
    result: PreprocessingResult,
}

impl ConvertArgs {
    /// Execute the convert command.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read or written, or if any
    /// document recorded processing errors.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            base_url: self.base_url.clone(),
            image_mode: self.inline_images.then_some(ImageModeSetting::Inline),
            ..Default::default()
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let mut options = preprocess_options(&config);
        if self.strip_frontmatter {
            options = options.with_preserve_frontmatter(false);
        }

        let documents = self
            .files
            .par_iter()
            .map(|path| self.convert_file(path, &options))
            .collect::<Result<Vec<_>, _>>()?;

        for document in &documents {
            report_diagnostics(&output, document);
        }

        self.write_documents(&output, &documents)?;

        let failed = documents.iter().filter(|d| d.result.has_errors()).count();
        if failed > 0 {
            return Err(CliError::Validation(format!(
                "{failed} document(s) had processing errors"
            )));
        }
        if documents.len() > 1 {
            output.success(&format!("Converted {} files", documents.len()));
        }
        Ok(())
    }

    fn convert_file(&self, path: &Path, options: &PreprocessOptions) -> Result<Document, CliError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;

        let mut options = options.clone();
        if let Some(title) = self.title_for(path) {
            options = options.with_title_override(title);
        }

        tracing::info!(path = %path.display(), "Converting");
        let result = Preprocessor::new(options).process(&raw);
        Ok(Document {
            path: path.to_path_buf(),
            result,
        })
    }

    fn title_for(&self, path: &Path) -> Option<String> {
        if let Some(title) = &self.title {
            return Some(title.clone());
        }
        if self.title_from_filename {
            return path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned());
        }
        None
    }

    fn render(&self, document: &Document) -> Result<String, CliError> {
        if self.json {
            Ok(serde_json::to_string_pretty(document)?)
        } else {
            Ok(document.result.content.clone())
        }
    }

    fn write_documents(&self, output: &Output, documents: &[Document]) -> Result<(), CliError> {
        let Some(target) = &self.output else {
            if self.json && documents.len() > 1 {
                output.emit(&serde_json::to_string_pretty(documents)?)?;
                return Ok(());
            }
            for document in documents {
                output.emit(&self.render(document)?)?;
            }
            return Ok(());
        };

        if let [document] = documents {
            return write_file(target, &self.render(document)?);
        }

        std::fs::create_dir_all(target).map_err(|source| CliError::WriteFile {
            path: target.clone(),
            source,
        })?;
        for document in documents {
            let path = output_path(target, &document.path, self.json);
            write_file(&path, &self.render(document)?)?;
            output.detail(&format!("  -> {}", path.display()));
        }
        Ok(())
    }
}

/// Path inside `dir` for a converted input file.
fn output_path(dir: &Path, input: &Path, json: bool) -> PathBuf {
    let name = input.file_name().unwrap_or(input.as_os_str());
    let path = dir.join(name);
    if json { path.with_extension("json") } else { path }
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    std::fs::write(path, content).map_err(|source| CliError::WriteFile {
        path: path.to_path_buf(),
        source,
    })
}

fn report_diagnostics(output: &Output, document: &Document) {
    let path = document.path.display();
    for warning in &document.result.warnings {
        output.warning(&format!("{path}: {warning}"));
    }
    for error in &document.result.errors {
        output.error(&format!("{path}: {error}"));
    }
}
