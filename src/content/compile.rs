//! Single-document compilation: sections → markdown → layout.

use super::markdown::render_markdown;
use super::section::Section;
use super::template::{Bindings, render};
use anyhow::{Context, Result};
use std::{fs, path::Path};

/// One compiled artifact.
///
/// Metadata fields are empty strings when the source has no such section.
/// `description`, `thumbnail` and `published_at` are not used by the layout;
/// the builder binds them into post summaries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledDocument {
    pub title: String,
    pub meta_description: String,
    pub description: String,
    pub thumbnail: String,
    pub published_at: String,
    /// Final HTML: the layout with title, meta description and content bound.
    pub compiled_content: String,
}

impl CompiledDocument {
    /// Write `compiled_content` to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(path, &self.compiled_content)
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

/// Compile `source` against a composed `layout`.
///
/// Total over any input: missing sections become empty values and a
/// missing content section skips markdown rendering entirely.
pub fn compile(source: &str, layout: &str, render_md: bool) -> CompiledDocument {
    let field = |section: Section| section.extract(source).unwrap_or_default().to_owned();

    let content = match Section::Content.extract(source) {
        Some(body) if render_md => render_markdown(body),
        Some(body) => body.to_owned(),
        None => String::new(),
    };

    let title = field(Section::Title);
    let meta_description = field(Section::MetaDescription);

    let bindings = Bindings::new()
        .bind("title", &title)
        .bind("meta_description", &meta_description)
        .bind("content", &content);
    let compiled_content = render(layout, &bindings);

    CompiledDocument {
        title,
        meta_description,
        description: field(Section::Description),
        thumbnail: field(Section::Thumbnail),
        published_at: field(Section::PublishedAt),
        compiled_content,
    }
}
