//! YAML frontmatter extraction and merging.
//!
//! Frontmatter is parsed with `serde_yaml`; if that fails, a line-oriented
//! `key: value` scanner takes over so that at least flat fields survive.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{FrontmatterError, PassError};
use crate::options::PreprocessOptions;
use crate::result::PreprocessingResult;

/// Parsed frontmatter fields.
pub type FrontmatterMap = BTreeMap<String, FrontmatterValue>;

/// A frontmatter value.
///
/// YAML values outside this closed set (tagged values) are stringified.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FrontmatterValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<FrontmatterValue>),
    Map(BTreeMap<String, FrontmatterValue>),
}

impl FrontmatterValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Render a scalar as display text. Lists are comma-joined; maps and
    /// nulls yield `None`.
    pub fn to_display_string(&self) -> Option<String> {
        match self {
            Self::Null | Self::Map(_) => None,
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(format_number(*n)),
            Self::String(s) => Some(s.clone()),
            Self::List(items) => Some(
                items
                    .iter()
                    .filter_map(Self::to_display_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
        }
    }
}

impl From<Value> for FrontmatterValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Self::String(n.to_string()), Self::Number),
            Value::String(s) => Self::String(s),
            Value::Sequence(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Mapping(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| (yaml_to_string(&k), Self::from(v)))
                    .collect(),
            ),
            tagged @ Value::Tagged(_) => Self::String(yaml_to_string(&tagged)),
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn yaml_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}

/// Split a document into its frontmatter YAML and the remaining body.
///
/// Returns `None` unless the text starts with a `---` line and a closing
/// `---` line follows.
pub(crate) fn split_frontmatter(text: &str) -> Option<(&str, &str)> {
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse frontmatter YAML into a mapping.
pub(crate) fn parse_yaml(yaml: &str) -> Result<FrontmatterMap, FrontmatterError> {
    let value: Value = serde_yaml::from_str(yaml).map_err(FrontmatterError::Yaml)?;
    match FrontmatterValue::from(value) {
        FrontmatterValue::Map(map) => Ok(map),
        FrontmatterValue::Null => Ok(FrontmatterMap::new()),
        _ => Err(FrontmatterError::NotAMapping),
    }
}

/// Line-oriented fallback for frontmatter that is not valid YAML.
///
/// Reads top-level `key: value` lines only and strips matching surrounding
/// quotes from values. Indented lines and list items are ignored.
pub(crate) fn fallback_parse(yaml: &str) -> FrontmatterMap {
    let mut map = FrontmatterMap::new();

    for line in yaml.lines() {
        if line.starts_with([' ', '\t', '-', '#']) || line.trim().is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        map.insert(
            key.to_owned(),
            FrontmatterValue::String(strip_quotes(value.trim()).to_owned()),
        );
    }

    map
}

/// Remove one pair of matching surrounding quotes.
pub(crate) fn strip_quotes(value: &str) -> &str {
    for quote in ['"', '\''] {
        if value.len() >= 2
            && let Some(inner) = value
                .strip_prefix(quote)
                .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

/// Parse YAML, falling back to the line scanner on failure.
///
/// The `Err` side carries the YAML error message when the fallback was used.
pub(crate) fn parse_with_fallback(yaml: &str) -> (FrontmatterMap, Option<String>) {
    match parse_yaml(yaml) {
        Ok(map) => (map, None),
        Err(e) => (fallback_parse(yaml), Some(e.to_string())),
    }
}

/// Tags declared in the `tags` or `tag` field.
///
/// Arrays contribute each stringified element; strings are split on commas
/// and whitespace. A leading `#` is dropped and empty entries are skipped.
pub(crate) fn frontmatter_tags(map: &FrontmatterMap) -> Vec<String> {
    let mut tags = Vec::new();

    for key in ["tags", "tag"] {
        let Some(value) = map.get(key) else {
            continue;
        };
        let raw: Vec<String> = match value {
            FrontmatterValue::List(items) => items
                .iter()
                .filter_map(FrontmatterValue::to_display_string)
                .collect(),
            FrontmatterValue::String(s) => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .map(str::to_owned)
                .collect(),
            other => other.to_display_string().into_iter().collect(),
        };
        tags.extend(
            raw.iter()
                .map(|t| t.trim().trim_start_matches('#'))
                .filter(|t| !t.is_empty())
                .map(str::to_owned),
        );
    }

    tags
}

/// Frontmatter pass: mine metadata and decide what block stays in the content.
pub(crate) fn process_frontmatter(
    content: &str,
    options: &PreprocessOptions,
    result: &mut PreprocessingResult,
) -> Result<String, PassError> {
    let title_override = options
        .title_override
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some((yaml, body)) = split_frontmatter(content) else {
        return match title_override {
            Some(title) => {
                result.metadata.title = Some(title.to_owned());
                Ok(format!("{}{content}", synthesize_block(title)?))
            }
            None => Ok(content.to_owned()),
        };
    };

    let (map, fallback_error) = parse_with_fallback(yaml);
    if let Some(error) = fallback_error {
        tracing::warn!(%error, "Frontmatter is not valid YAML, using fallback parser");
        result.warn(format!(
            "Frontmatter could not be parsed as YAML ({error}); used fallback parser"
        ));
    }

    for tag in frontmatter_tags(&map) {
        result.metadata.add_tag(tag);
    }

    if let Some(title) = map.get("title").and_then(FrontmatterValue::as_str) {
        let title = title.trim();
        if !title.is_empty() {
            result.metadata.title = Some(title.to_owned());
        }
    }
    if let Some(title) = title_override {
        result.metadata.title = Some(title.to_owned());
    }
    result.metadata.frontmatter = Some(map);

    let block = match (options.preserve_frontmatter, title_override) {
        (true, Some(title)) => format!("---\n{}---\n", set_title_line(yaml, title)?),
        (true, None) => format!("---\n{yaml}---\n"),
        (false, Some(title)) => synthesize_block(title)?,
        (false, None) => String::new(),
    };

    Ok(format!("{block}{body}"))
}

/// Minimal frontmatter block carrying only a title.
fn synthesize_block(title: &str) -> Result<String, PassError> {
    Ok(format!("---\ntitle: {}\n---\n", yaml_scalar(title)?))
}

fn yaml_scalar(value: &str) -> Result<String, PassError> {
    Ok(serde_yaml::to_string(value)?.trim_end().to_owned())
}

/// Replace the top-level `title:` entry (and its continuation lines), or
/// insert one as the first key. Other lines keep their text and order.
fn set_title_line(yaml: &str, title: &str) -> Result<String, PassError> {
    let title_line = format!("title: {}\n", yaml_scalar(title)?);
    let mut output = String::with_capacity(yaml.len() + title_line.len());
    let mut replaced = false;
    let mut skipping_continuation = false;

    for line in yaml.split_inclusive('\n') {
        if skipping_continuation {
            if line.starts_with([' ', '\t']) {
                continue;
            }
            skipping_continuation = false;
        }
        if !replaced && line.starts_with("title:") {
            output.push_str(&title_line);
            replaced = true;
            skipping_continuation = true;
            continue;
        }
        output.push_str(line);
    }

    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
    if !replaced {
        output.insert_str(0, &title_line);
    }
    Ok(output)
}
