//! Markdown to sanitized HTML.

use pulldown_cmark::{Options, Parser, html};

/// Renders item markdown into HTML that is safe to embed in a page.
pub trait MarkdownRenderer: Send + Sync {
    fn render(&self, source: &str) -> String;
}

/// CommonMark rendering followed by ammonia sanitization.
///
/// Scripts, event handler attributes and other active content never survive.
pub struct SanitizedMarkdown {
    options: Options,
    cleaner: ammonia::Builder<'static>,
}

impl SanitizedMarkdown {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_SMART_PUNCTUATION);

        let mut cleaner = ammonia::Builder::default();
        cleaner
            .strip_comments(true)
            .link_rel(Some("nofollow noopener noreferrer"));

        Self { options, cleaner }
    }
}

impl Default for SanitizedMarkdown {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer for SanitizedMarkdown {
    fn render(&self, source: &str) -> String {
        let parser = Parser::new_ext(source, self.options);
        let mut raw = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut raw, parser);
        self.cleaner.clean(&raw).to_string()
    }
}
