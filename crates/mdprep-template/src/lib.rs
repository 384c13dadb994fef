//! Typesetting templates for preprocessed documents.
//!
//! A template is markup text with `$name$` placeholders. This crate provides:
//!
//! - Escaping of values for the markup language ([`escape_markup`])
//! - Placeholder discovery ([`extract_variables`], [`count_variables`])
//! - Substitution with per-variable defaults ([`substitute`])
//! - Structural validation ([`TemplateValidator`])
//! - A registry of built-in and user templates ([`TemplateManager`])
//!
//! # Example
//!
//! ```
//! use mdprep_template::{SubstitutionContext, TemplateManager, TemplateManagerConfig};
//!
//! let manager = TemplateManager::new(TemplateManagerConfig::new());
//! let context = SubstitutionContext::new()
//!     .with("title", "Quarterly #3")
//!     .with_raw("body", "= Summary\nAll good.");
//!
//! let rendered = manager.process_template("default", &context).unwrap();
//! assert!(rendered.contains(r"Quarterly \#3"));
//! assert!(rendered.contains("= Summary"));
//! ```

mod builtin;
mod context;
mod error;
mod escape;
mod manager;
mod substitute;
mod template;
mod validate;
mod variables;

pub use context::{ContextValue, SubstitutionContext};
pub use error::TemplateError;
pub use escape::{escape_markup, unescape_markup};
pub use manager::{
    HealthReport, ReadFileFn, TemplateAnalysis, TemplateHealth, TemplateInfo, TemplateManager,
    TemplateManagerConfig,
};
pub use substitute::substitute;
pub use template::{Template, TemplateMetadata, TemplateSource, VariableSpec, VariableType};
pub use validate::{TemplateValidationResult, TemplateValidator};
pub use variables::{count_variables, extract_variables};
