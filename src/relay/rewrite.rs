//! Content rewriting: `https://` references become `http://`.
//!
//! # Responsibilities
//! - Rewrite quoted HTML/CSS references (`href=`, `src=`, `url(`)
//! - Rewrite any remaining literal `https://`
//! - Pass non-text (non-UTF-8) chunks through untouched
//!
//! # Design Decisions
//! - Stateless and per-chunk: a pattern split across a chunk boundary is
//!   not detected. Known limitation inherited from the relay's byte-chunk
//!   model, not something this module can fix on its own.
//! - Single-quoted attributes are normalized to double quotes.

use std::borrow::Cow;

use regex::Regex;

/// Fixed rule set applied to every chunk in both relay directions.
pub struct ContentRewriter {
    href: Regex,
    src: Regex,
    css_url: Regex,
}

impl ContentRewriter {
    pub fn new() -> Self {
        Self {
            href: Regex::new(r#"href=["']https://"#).expect("hard-coded pattern"),
            src: Regex::new(r#"src=["']https://"#).expect("hard-coded pattern"),
            css_url: Regex::new(r#"url\(["']?https://"#).expect("hard-coded pattern"),
        }
    }

    /// Apply the rule set to one chunk.
    ///
    /// Returns the input unchanged when it is not valid UTF-8 or contains
    /// no `https://` marker. Applying the rewriter twice yields the same
    /// bytes as applying it once.
    pub fn apply<'a>(&self, chunk: &'a [u8]) -> Cow<'a, [u8]> {
        let Ok(text) = std::str::from_utf8(chunk) else {
            return Cow::Borrowed(chunk);
        };
        if !text.contains("https://") {
            return Cow::Borrowed(chunk);
        }

        let text = self.href.replace_all(text, "href=\"http://");
        let text = self.src.replace_all(&text, "src=\"http://");
        let text = self.css_url.replace_all(&text, "url(\"http://");
        let text = text.replace("https://", "http://");
        Cow::Owned(text.into_bytes())
    }
}

impl Default for ContentRewriter {
    fn default() -> Self {
        Self::new()
    }
}
