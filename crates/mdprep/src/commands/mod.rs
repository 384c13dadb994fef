//! CLI command implementations.

pub(crate) mod convert;
pub(crate) mod template;

pub(crate) use convert::ConvertArgs;
pub(crate) use template::TemplateArgs;
