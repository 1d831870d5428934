//! Site building orchestration.
//!
//! Compiles the whole content directory into the cache.
//!
//! # Architecture
//!
//! ```text
//! build_site()
//!     │
//!     ├── Templates::load()      all required files, or fail before any write
//!     │
//!     ├── error pages            page:error:400 / 404 / 500
//!     │
//!     ├── posts (rayon)          post:<slug>, in sorted listing order
//!     │
//!     └── paginate()             post.tpl summaries → page.tpl → page:<n>
//! ```

mod pagination;
mod reload;
mod templates;

use pagination::paginate;
pub use reload::Rebuilder;
use templates::Templates;

use crate::{
    cache::{CacheKey, CacheStore},
    config::SiteConfig,
    content::{
        CompiledDocument, compile,
        template::{Bindings, render},
    },
    log,
    utils::{
        fs::sorted_files,
        slug::{post_link, strip_extension},
    },
};
use anyhow::{Context, Result};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};
use thiserror::Error;

/// Subdirectory of the content directory holding post sources.
const POSTS_DIR: &str = "posts";

// ============================================================================
// Errors
// ============================================================================

/// Conditions that stop a build before anything is cached.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("content directory `{}` is missing templates: {}", .dir.display(), .missing.join(", "))]
    MissingTemplates { dir: PathBuf, missing: Vec<String> },

    #[error("content directory `{}` is missing error pages: {}", .dir.display(), .missing.join(", "))]
    MissingErrorPages { dir: PathBuf, missing: Vec<String> },

    #[error("cannot list posts in `{}`", .0.display())]
    ListPosts(PathBuf, #[source] std::io::Error),
}

// ============================================================================
// Options & Report
// ============================================================================

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Content directory with templates and `posts/`.
    pub content: PathBuf,
    /// Posts per index page.
    pub per_page: usize,
    /// Render the content section as markdown.
    pub markdown: bool,
    /// Also write every compiled document under this directory.
    pub preview: Option<PathBuf>,
}

impl BuildOptions {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            content: config.build.content.clone(),
            per_page: config.build.per_page,
            markdown: config.build.markdown,
            preview: None,
        }
    }

    pub fn with_preview(mut self, preview: Option<PathBuf>) -> Self {
        self.preview = preview;
        self
    }
}

/// What a successful build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub posts: usize,
    pub pages: usize,
    /// Post files that could not be read.
    pub skipped: usize,
    pub elapsed: Duration,
}

// ============================================================================
// Sources
// ============================================================================

/// One file of the posts directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    /// File name with extension.
    pub name: String,
    /// File name without extension.
    pub slug: String,
}

impl SourceFile {
    fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let slug = strip_extension(&name).to_owned();
        Self { path, name, slug }
    }
}

/// A compiled artifact and where it goes.
enum Artifact<'a> {
    Error(u16),
    Post(&'a str),
    Page(usize),
}

impl Artifact<'_> {
    fn key(&self) -> CacheKey {
        match self {
            Self::Error(code) => CacheKey::error(*code),
            Self::Post(slug) => CacheKey::post(slug),
            Self::Page(n) => CacheKey::page(*n),
        }
    }

    /// Preview file relative to the preview directory.
    fn preview_file(&self) -> PathBuf {
        match self {
            Self::Error(code) => PathBuf::from(format!("errors/{code}.html")),
            Self::Post(slug) => PathBuf::from(format!("{slug}.html")),
            Self::Page(n) => PathBuf::from(format!("page/{n}.html")),
        }
    }
}

// ============================================================================
// Build
// ============================================================================

/// Compile the content directory into `store`.
///
/// Fails with [`BuildError`] before writing anything if a required file is
/// missing. Every run rewrites all keys; stale `post:` keys of deleted posts
/// are left in place.
pub fn build_site(options: &BuildOptions, store: &dyn CacheStore) -> Result<BuildReport> {
    let started = Instant::now();
    let templates = Templates::load(&options.content)?;

    let posts_dir = options.content.join(POSTS_DIR);
    let sources = read_sources(&posts_dir)?;
    let skipped = sources.iter().filter(|(_, text)| text.is_none()).count();
    let sources: Vec<_> = sources
        .into_iter()
        .filter_map(|(file, text)| text.map(|text| (file, text)))
        .collect();

    let emit = |artifact: Artifact, doc: &CompiledDocument| -> Result<()> {
        if let Some(dir) = &options.preview {
            doc.write_to(&dir.join(artifact.preview_file()))?;
        }
        store.set(&artifact.key(), doc.compiled_content.clone());
        Ok(())
    };

    for (code, source) in &templates.errors {
        let doc = compile(source, &templates.layout, options.markdown);
        emit(Artifact::Error(*code), &doc)?;
    }

    // Compile in parallel; `collect` keeps listing order.
    let compiled: Vec<CompiledDocument> = sources
        .par_iter()
        .map(|(file, text)| {
            log!("build"; "compile {}", file.name);
            compile(text, &templates.layout, options.markdown)
        })
        .collect();

    for ((file, _), doc) in sources.iter().zip(&compiled) {
        emit(Artifact::Post(&file.slug), doc)?;
    }

    let spans = paginate(compiled.len(), options.per_page);
    for span in &spans {
        let summaries: String = sources[span.posts.clone()]
            .iter()
            .zip(&compiled[span.posts.clone()])
            .map(|((file, _), doc)| post_summary(&templates.post, doc, &file.slug))
            .collect();

        let more = span.more_link();
        let page_source = render(
            &templates.page,
            &Bindings::new().bind("posts", &summaries).bind("more", &more),
        );
        let doc = compile(&page_source, &templates.layout, options.markdown);
        emit(Artifact::Page(span.index), &doc)?;
    }

    let report = BuildReport {
        posts: compiled.len(),
        pages: spans.len(),
        skipped,
        elapsed: started.elapsed(),
    };
    log!(
        "build";
        "{} posts, {} pages in {:.1?}",
        report.posts,
        report.pages,
        report.elapsed
    );
    Ok(report)
}

/// List and read the post sources, in file name order.
///
/// Unreadable files are kept with `None` text so they can be reported.
fn read_sources(posts_dir: &Path) -> Result<Vec<(SourceFile, Option<String>)>> {
    let paths =
        sorted_files(posts_dir).map_err(|err| BuildError::ListPosts(posts_dir.to_path_buf(), err))?;

    if paths.is_empty() {
        log!("warn"; "no posts in {}", posts_dir.display());
    }

    Ok(paths
        .into_iter()
        .map(|path| {
            let file = SourceFile::new(path);
            let text = fs::read_to_string(&file.path)
                .with_context(|| format!("Failed to read {}", file.path.display()));
            let text = match text {
                Ok(text) => Some(text),
                Err(err) => {
                    log!("error"; "{:#}", err);
                    None
                }
            };
            (file, text)
        })
        .collect())
}

/// Render one post summary for an index page.
fn post_summary(template: &str, doc: &CompiledDocument, slug: &str) -> String {
    let link = post_link(slug);
    let bindings = Bindings::new()
        .bind("title", &doc.title)
        .bind("thumbnail", &doc.thumbnail)
        .bind("description", &doc.description)
        .bind("published_at", &doc.published_at)
        .bind("link", &link);
    render(template, &bindings)
}
