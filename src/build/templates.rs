//! Required template files of a content directory.
//!
//! ```text
//! content/
//! ├── layout.tpl        {{ include header }} {{ include content_top }} {{ include footer }}
//! ├── header.tpl
//! ├── content_top.tpl
//! ├── footer.tpl
//! ├── post.tpl          one post summary on an index page
//! ├── page.tpl          one index page, {{ posts }} and {{ more }}
//! ├── errors/
//! │   ├── 400.tpl
//! │   ├── 404.tpl
//! │   └── 500.tpl
//! └── posts/
//! ```

use super::BuildError;
use crate::cache::ERROR_CODES;
use crate::content::template::{Bindings, render};
use crate::utils::fs::read_optional;
use std::path::Path;

const LAYOUT: &str = "layout.tpl";
const HEADER: &str = "header.tpl";
const CONTENT_TOP: &str = "content_top.tpl";
const FOOTER: &str = "footer.tpl";
const POST: &str = "post.tpl";
const PAGE: &str = "page.tpl";

/// Templates loaded for one build, layout includes already resolved.
#[derive(Debug, Clone)]
pub struct Templates {
    /// `layout.tpl` with header, content top and footer included.
    pub layout: String,
    /// Post summary snippet.
    pub post: String,
    /// Index page source.
    pub page: String,
    /// Error page sources, in [`ERROR_CODES`] order.
    pub errors: Vec<(u16, String)>,
}

impl Templates {
    /// Load every required file under `dir`.
    ///
    /// Nothing is returned unless all files are readable. Layout-family
    /// files are checked before error pages.
    pub fn load(dir: &Path) -> Result<Self, BuildError> {
        let read = |name: &str, missing: &mut Vec<String>| {
            read_optional(&dir.join(name)).unwrap_or_else(|| {
                missing.push(name.to_owned());
                String::new()
            })
        };

        let mut missing = Vec::new();
        let layout = read(LAYOUT, &mut missing);
        let header = read(HEADER, &mut missing);
        let content_top = read(CONTENT_TOP, &mut missing);
        let footer = read(FOOTER, &mut missing);
        let post = read(POST, &mut missing);
        let page = read(PAGE, &mut missing);

        if !missing.is_empty() {
            return Err(BuildError::MissingTemplates {
                dir: dir.to_path_buf(),
                missing,
            });
        }

        let errors: Vec<_> = ERROR_CODES
            .iter()
            .map(|&code| (code, read(&error_file(code), &mut missing)))
            .collect();

        if !missing.is_empty() {
            return Err(BuildError::MissingErrorPages {
                dir: dir.to_path_buf(),
                missing,
            });
        }

        Ok(Self {
            layout: compose_layout(&layout, &header, &content_top, &footer),
            post,
            page,
            errors,
        })
    }
}

/// Relative path of the error page source for `code`.
fn error_file(code: u16) -> String {
    format!("errors/{code}.tpl")
}

/// Resolve the include markers of `layout`, once.
pub fn compose_layout(layout: &str, header: &str, content_top: &str, footer: &str) -> String {
    let bindings = Bindings::new()
        .include("header", header)
        .include("content_top", content_top)
        .include("footer", footer);
    render(layout, &bindings)
}
