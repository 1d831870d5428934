//! `[build]` section configuration.
//!
//! Contains content paths and compilation settings.

use super::defaults;
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// `[build]` section in blogd.toml - content compilation settings.
///
/// # Example
/// ```toml
/// [build]
/// content = "content"      # templates, errors/ and posts/
/// public = "public"        # static files (css, js, images, fonts)
/// per_page = 10            # posts per index page
/// markdown = true          # render the content section as markdown
/// reload_query = "reload"  # `?reload` on any request rebuilds the cache
/// ```
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
    /// Content directory.
    #[serde(default = "defaults::build::content")]
    #[educe(Default = defaults::build::content())]
    pub content: PathBuf,

    /// Static file root for asset requests.
    #[serde(default = "defaults::build::public")]
    #[educe(Default = defaults::build::public())]
    pub public: PathBuf,

    /// Posts per index page.
    #[serde(default = "defaults::build::per_page")]
    #[educe(Default = defaults::build::per_page())]
    pub per_page: usize,

    /// Render the content section of sources as markdown.
    #[serde(default = "defaults::r#true")]
    #[educe(Default = true)]
    pub markdown: bool,

    /// Query key that triggers a rebuild when present on a request.
    #[serde(default = "defaults::build::reload_query")]
    #[educe(Default = defaults::build::reload_query())]
    pub reload_query: String,
}
