//! Mapping from loaded configuration to library options.

use mdprep_config::{Config, ImageModeSetting, LinkFormatSetting};
use mdprep_preprocess::{ImageMode, LinkFormat, LinkOptions, PreprocessOptions};
use mdprep_template::{TemplateManager, TemplateManagerConfig};

/// Preprocessor options from the `[preprocess]`, `[links]` and `[embeds]` sections.
pub(crate) fn preprocess_options(config: &Config) -> PreprocessOptions {
    let passes = &config.preprocess;
    let links = LinkOptions {
        format: match config.links.format {
            LinkFormatSetting::Md => LinkFormat::Markdown,
            LinkFormatSetting::None => LinkFormat::NoExtension,
        },
        extension: config.links.extension.clone(),
        base_url: config.links.base_url.clone(),
    };
    let image_mode = match config.embeds.image_mode {
        ImageModeSetting::Deferred => ImageMode::Deferred,
        ImageModeSetting::Inline => ImageMode::Inline,
    };

    PreprocessOptions::new()
        .with_preserve_frontmatter(passes.preserve_frontmatter)
        .with_extract_metadata(passes.extract_metadata)
        .with_email_blocks(passes.convert_email_blocks)
        .with_link_filter(passes.filter_links)
        .with_embeds(passes.convert_embeds)
        .with_wikilinks(passes.convert_wikilinks)
        .with_callouts(passes.convert_callouts)
        .with_links(links)
        .with_image_mode(image_mode)
}

/// Template manager over the configured user template directory.
pub(crate) fn template_manager(config: &Config) -> TemplateManager {
    let mut manager_config = TemplateManagerConfig::new();
    if let Some(dir) = &config.templates_resolved.dir {
        manager_config = manager_config.with_user_dir(dir);
    }
    TemplateManager::new(manager_config)
}
