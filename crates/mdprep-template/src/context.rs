//! Values supplied for template placeholders.

use std::collections::BTreeMap;

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextValue {
    /// Plain text, escaped on substitution.
    Text(String),
    /// Pre-rendered markup, substituted verbatim.
    Raw(String),
}

impl ContextValue {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(s) | Self::Raw(s) => s,
        }
    }
}

/// Name to value mapping used when rendering a template.
///
/// Names without a value fall back to [`SubstitutionContext::default_value`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionContext {
    values: BTreeMap<String, ContextValue>,
    today: Option<String>,
}

impl SubstitutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a plain-text value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .insert(name.into(), ContextValue::Text(value.into()));
    }

    /// Bind pre-rendered markup that must not be escaped.
    pub fn insert_raw(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), ContextValue::Raw(value.into()));
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    #[must_use]
    pub fn with_raw(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_raw(name, value);
        self
    }

    /// Fix the date used for the `date` default (`YYYY-MM-DD`).
    #[must_use]
    pub fn with_today(mut self, date: impl Into<String>) -> Self {
        self.today = Some(date.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ContextValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Built-in fallback for a placeholder with no bound value.
    pub fn default_value(&self, name: &str) -> String {
        match name {
            "date" => self
                .today
                .clone()
                .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
            "font" => "New Computer Modern".to_owned(),
            "fontSize" => "11pt".to_owned(),
            "pageSize" => "a4".to_owned(),
            "margins" => "2.5cm".to_owned(),
            _ => String::new(),
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SubstitutionContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (name, value) in iter {
            context.insert(name, value);
        }
        context
    }
}
