//! Removal of noise links left behind by mail clients and "Open:" aliases.

use std::sync::LazyLock;

use regex::Regex;

/// URL schemes of mail-client deep links.
const MAIL_SCHEMES: &str = "message|mailspring|airmail|readdle-spark|spark|x-apple-mail|thunderlink|cbthunderlink|outlook|ms-outlook";

static OPEN_WIKILINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!?\[\[[^\[\]|\n]*\|\s*Open:[^\[\]\n]*\]\]").unwrap());

static OPEN_LINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\s*Open:[^\]\n]*\]\([^)\n]*\)").unwrap());

static MAIL_LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)\[[^\]\n]*\]\(\s*<?(?:{MAIL_SCHEMES}):[^)\n]*\)")).unwrap()
});

static MAIL_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)<?\b(?:{MAIL_SCHEMES})://[^\s>)\]]*>?")).unwrap()
});

/// Strip "Open:" alias links and mail-client deep links from text.
///
/// Trailing whitespace is trimmed only on lines where a link was removed;
/// every other line is copied unchanged.
///
/// # Examples
///
/// ```
/// use mdprep_preprocess::filter_noise_links;
///
/// let text = "Reply [Open: Mail](message://%3c123%3e) soon";
/// assert_eq!(filter_noise_links(text), "Reply  soon");
/// ```
pub fn filter_noise_links(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let filtered = filter_line(body);
        if filtered == body {
            output.push_str(line);
        } else {
            output.push_str(filtered.trim_end_matches([' ', '\t']));
            output.push_str(&line[body.len()..]);
        }
    }
    output
}

fn filter_line(line: &str) -> String {
    let filtered = OPEN_WIKILINK_RE.replace_all(line, "");
    let filtered = OPEN_LINK_RE.replace_all(&filtered, "");
    let filtered = MAIL_LINK_RE.replace_all(&filtered, "");
    MAIL_URL_RE.replace_all(&filtered, "").into_owned()
}
