//! Embed (`![[file|options]]`) conversion.
//!
//! Images and PDFs need file access to render, so they are replaced by
//! deferred markers and queued in the metadata for an external resolver.
//! Other media become plain links.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::LinkError;
use crate::fence::rewrite_outside_code;
use crate::options::ImageMode;
use crate::paths::{base_name, extension, file_name, sanitize_path};
use crate::result::{EmbedDescriptor, PreprocessingResult};

static EMBED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[\[([^\[\]|]*)(?:\|([^\[\]]*))?\]\]").unwrap());

static SIZE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)(?:x(\d+))?$").unwrap());

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "svg", "webp", "tiff", "tif", "ico", "avif", "heic",
];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogv", "mov", "mkv", "avi"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a", "flac"];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "md", "txt", "doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf",
];

const IMAGE_MARKER_PREFIX: &str = "IMAGE_EMBED_MARKER";
const PDF_MARKER_PREFIX: &str = "TYPST_PDF_EMBED_MARKER";

/// File type of an embed target, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbedKind {
    Image,
    Video,
    Audio,
    Document,
    Pdf,
    Unknown,
}

impl EmbedKind {
    /// Classify a path by its (case-insensitive) extension.
    ///
    /// A `#fragment` suffix such as `#page=2` is ignored.
    ///
    /// ```
    /// use mdprep_preprocess::EmbedKind;
    ///
    /// assert_eq!(EmbedKind::from_path("img/Photo.JPG"), EmbedKind::Image);
    /// assert_eq!(EmbedKind::from_path("paper.pdf#page=2"), EmbedKind::Pdf);
    /// assert_eq!(EmbedKind::from_path("archive.zip"), EmbedKind::Unknown);
    /// ```
    pub fn from_path(path: &str) -> Self {
        let Some(ext) = extension(strip_fragment(path)) else {
            return Self::Unknown;
        };
        let ext = ext.as_str();

        if IMAGE_EXTENSIONS.contains(&ext) {
            Self::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Self::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            Self::Audio
        } else if DOCUMENT_EXTENSIONS.contains(&ext) {
            Self::Document
        } else if ext == "pdf" {
            Self::Pdf
        } else {
            Self::Unknown
        }
    }
}

fn strip_fragment(path: &str) -> &str {
    path.split_once('#').map_or(path, |(file, _)| file)
}

/// Embed pass. Per-match failures are recorded as warnings and the matched
/// text is kept.
pub(crate) fn convert_embeds(
    content: &str,
    image_mode: ImageMode,
    result: &mut PreprocessingResult,
) -> String {
    rewrite_outside_code(content, |chunk| {
        EMBED_RE
            .replace_all(chunk, |caps: &Captures| {
                let whole = &caps[0];
                match convert_embed(caps, image_mode, result) {
                    Ok(replacement) => replacement,
                    Err(error) => {
                        result.warn(error.to_string());
                        whole.to_owned()
                    }
                }
            })
            .into_owned()
    })
}

fn convert_embed(
    caps: &Captures,
    image_mode: ImageMode,
    result: &mut PreprocessingResult,
) -> Result<String, LinkError> {
    let path = caps[1].trim();
    if path.is_empty() {
        return Err(LinkError::EmptyEmbed(caps[0].to_owned()));
    }
    let options = caps
        .get(2)
        .map(|m| m.as_str().trim())
        .filter(|o| !o.is_empty());

    let kind = EmbedKind::from_path(path);
    tracing::trace!(path, ?kind, "Converting embed");

    let replacement = match kind {
        EmbedKind::Image if image_mode == ImageMode::Inline => inline_image(path, options),
        EmbedKind::Image => {
            let descriptor = deferred(IMAGE_MARKER_PREFIX, path, options, result);
            result.warn(format!("Image embed queued for deferred processing: {path}"));
            let marker = descriptor.marker.clone();
            result.metadata.image_embeds.push(descriptor);
            marker
        }
        EmbedKind::Pdf => {
            let descriptor = deferred(PDF_MARKER_PREFIX, path, options, result);
            result.warn(format!("PDF embed queued for deferred processing: {path}"));
            let marker = descriptor.marker.clone();
            result.metadata.pdf_embeds.push(descriptor);
            marker
        }
        EmbedKind::Video => {
            result.warn(format!(
                "Video embeds are not supported, converted to a link: {path}"
            ));
            media_link("🎥", path)
        }
        EmbedKind::Audio => {
            result.warn(format!(
                "Audio embeds are not supported, converted to a link: {path}"
            ));
            media_link("🎵", path)
        }
        EmbedKind::Document => media_link("📄", path),
        EmbedKind::Unknown => {
            result.warn(format!("Unknown file type for embed: {path}"));
            format!("[{path}]({path})")
        }
    };

    Ok(replacement)
}

/// Build the descriptor for a deferred embed.
fn deferred(
    prefix: &str,
    path: &str,
    options: Option<&str>,
    result: &mut PreprocessingResult,
) -> EmbedDescriptor {
    if path.contains(':') {
        result.warn(format!(
            "Embed path contains ':' so its marker fields are ambiguous: {path}"
        ));
    }

    let base = base_name(strip_fragment(path));
    EmbedDescriptor {
        original_path: path.to_owned(),
        sanitized_path: sanitize_path(path),
        file_name: file_name(strip_fragment(path)).to_owned(),
        base_name: base.to_owned(),
        options: options.map(str::to_owned),
        marker: format!("{prefix}:{path}:{base}:{}", options.unwrap_or_default()),
    }
}

fn media_link(icon: &str, path: &str) -> String {
    format!(
        "[{icon} {}]({})",
        file_name(strip_fragment(path)),
        sanitize_path(path)
    )
}

/// Legacy image output: `<img>` when a size is given, markdown image otherwise.
fn inline_image(path: &str, options: Option<&str>) -> String {
    let src = sanitize_path(path);
    let base = base_name(path);

    match options {
        Some(opts) => match SIZE_RE.captures(opts) {
            Some(size) => {
                let height = size
                    .get(2)
                    .map(|h| format!(" height=\"{}\"", h.as_str()))
                    .unwrap_or_default();
                format!(
                    "<img src=\"{src}\" alt=\"{base}\" width=\"{}\"{height}>",
                    &size[1]
                )
            }
            None => format!("![{opts}]({src})"),
        },
        None => format!("![{base}]({src})"),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn convert(content: &str, mode: ImageMode) -> (String, PreprocessingResult) {
        let mut result = PreprocessingResult::default();
        let output = convert_embeds(content, mode, &mut result);
        (output, result)
    }

    #[test]
    fn test_image_becomes_deferred_marker() {
        let (output, result) = convert("See ![[assets/My Chart.png|300]] here", ImageMode::Deferred);

        assert_eq!(output, "See IMAGE_EMBED_MARKER:assets/My Chart.png:My Chart:300 here");
        assert_eq!(result.metadata.image_embeds.len(), 1);
        let embed = &result.metadata.image_embeds[0];
        assert_eq!(embed.original_path, "assets/My Chart.png");
        assert_eq!(embed.sanitized_path, "assets/My%20Chart.png");
        assert_eq!(embed.file_name, "My Chart.png");
        assert_eq!(embed.base_name, "My Chart");
        assert_eq!(embed.options.as_deref(), Some("300"));
        assert!(output.contains(&embed.marker));
        assert_eq!(
            result.warnings,
            vec!["Image embed queued for deferred processing: assets/My Chart.png"]
        );
    }

    #[test]
    fn test_pdf_becomes_deferred_marker() {
        let (output, result) = convert("![[docs/paper.pdf]]", ImageMode::Deferred);
        assert_eq!(output, "TYPST_PDF_EMBED_MARKER:docs/paper.pdf:paper:");
        assert_eq!(result.metadata.pdf_embeds.len(), 1);
        assert!(result.metadata.image_embeds.is_empty());
    }

    #[test]
    fn test_marker_colon_warning() {
        let (_, result) = convert("![[C:/img/a.png]]", ImageMode::Deferred);
        assert!(result.warnings.iter().any(|w| w.contains("ambiguous")));
    }

    #[test]
    fn test_video_and_audio_become_links() {
        let (output, result) = convert("![[clips/intro clip.mp4]]\n![[song.MP3]]", ImageMode::Deferred);
        assert_eq!(
            output,
            "[🎥 intro clip.mp4](clips/intro%20clip.mp4)\n[🎵 song.MP3](song.MP3)"
        );
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_document_link_has_no_warning() {
        let (output, result) = convert("![[notes/Plan.docx]]", ImageMode::Deferred);
        assert_eq!(output, "[📄 Plan.docx](notes/Plan.docx)");
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unknown_type_warns() {
        let (output, result) = convert("![[data.xyz]]", ImageMode::Deferred);
        assert_eq!(output, "[data.xyz](data.xyz)");
        assert_eq!(result.warnings, vec!["Unknown file type for embed: data.xyz"]);
    }

    #[test]
    fn test_empty_embed_passes_through() {
        let (output, result) = convert("x ![[ |300]] y", ImageMode::Deferred);
        assert_eq!(output, "x ![[ |300]] y");
        assert_eq!(result.warnings, vec!["Empty embed path: ![[ |300]]"]);
    }

    #[test]
    fn test_inline_image_mode() {
        let (output, _) = convert(
            "![[a.png|300]] ![[b.png|200x100]] ![[c d.png|A chart]] ![[e.png]]",
            ImageMode::Inline,
        );
        assert_eq!(
            output,
            "<img src=\"a.png\" alt=\"a\" width=\"300\"> \
             <img src=\"b.png\" alt=\"b\" width=\"200\" height=\"100\"> \
             ![A chart](c%20d.png) ![e](e.png)"
        );
    }

    #[test]
    fn test_embeds_inside_fences_are_untouched() {
        let input = "```\n![[a.png]]\n```\n";
        let (output, result) = convert(input, ImageMode::Deferred);
        assert_eq!(output, input);
        assert!(result.metadata.image_embeds.is_empty());
    }
}
