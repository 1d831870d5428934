//! Markdown to HTML conversion using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

/// Render a markdown text span to HTML.
///
/// Plain CommonMark plus tables and strikethrough. Never fails; malformed
/// input degrades to whatever the parser makes of it.
pub fn render_markdown(markdown: &str) -> String {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, Parser::new_ext(markdown, opts));
    out
}
