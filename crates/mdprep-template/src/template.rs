//! Template model and sidecar metadata.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// Where a template's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    /// Shipped with the binary, identified by name.
    BuiltIn(&'static str),
    /// A user template file.
    File(PathBuf),
}

impl fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(_) => f.write_str("built-in"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Declared type of a template variable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    #[default]
    String,
    Number,
    Boolean,
}

/// A variable declared by a template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VariableSpec {
    #[serde(rename = "type")]
    pub kind: VariableType,
    #[serde(rename = "default", deserialize_with = "deserialize_scalar")]
    pub default_value: Option<String>,
    pub description: Option<String>,
    pub required: bool,
}

impl VariableSpec {
    pub(crate) fn new(kind: VariableType, default_value: Option<&str>, description: &str) -> Self {
        Self {
            kind,
            default_value: default_value.map(str::to_owned),
            description: Some(description.to_owned()),
            required: false,
        }
    }

    #[must_use]
    pub(crate) fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Descriptive template metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TemplateMetadata {
    pub author: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Compiler versions the template is known to work with.
    pub compatibility: Vec<String>,
}

/// A resolvable template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub source: TemplateSource,
    pub variables: BTreeMap<String, VariableSpec>,
    pub metadata: TemplateMetadata,
}

impl Template {
    /// Names of variables declared as required.
    pub fn required_variables(&self) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|(_, spec)| spec.required)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Declared default values by variable name.
    pub fn declared_defaults(&self) -> BTreeMap<String, String> {
        self.variables
            .iter()
            .filter_map(|(name, spec)| Some((name.clone(), spec.default_value.clone()?)))
            .collect()
    }
}

/// Contents of a `<stem>.yaml` file next to a user template.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct TemplateSidecar {
    #[serde(flatten)]
    pub metadata: TemplateMetadata,
    pub variables: BTreeMap<String, VariableSpec>,
}

impl TemplateSidecar {
    pub(crate) fn parse(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}

/// Accept a string, number or boolean and keep its text.
fn deserialize_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_yaml::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_yaml::Value::String(s)) => Some(s),
        Some(serde_yaml::Value::Number(n)) => Some(n.to_string()),
        Some(serde_yaml::Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
