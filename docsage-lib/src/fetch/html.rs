//! HTML to text conversion.
//!
//! Pages are parsed with `htmd` (html5ever underneath), so quoted attributes,
//! comments and every named or numeric character reference are handled the
//! way a browser would. The result is lightweight Markdown: headings and
//! links keep their markers, block elements are separated by blank lines.

use htmd::HtmlToMarkdown;

use crate::{Error, Result};

/// Elements whose contents are never visible text
const SKIPPED_TAGS: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Extract the visible text of an HTML document.
pub fn extract_text(html: &str) -> Result<String> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(SKIPPED_TAGS.to_vec())
        .build();

    let text = converter
        .convert(html)
        .map_err(|e| Error::Fetch(format!("cannot convert HTML: {e}")))?;
    Ok(text.trim().to_string())
}
