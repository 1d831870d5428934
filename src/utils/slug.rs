//! File name to slug conversion.
//!
//! A post's slug is its file name without the extension. It is both the
//! `post:<slug>` cache key and the request path `/<slug>`.

/// Extension separator.
const DOT: char = '.';

/// Path separator considered when locating the extension.
const SEP: char = '/';

/// Strip the extension from `name`.
///
/// The extension starts at the last `.`, but only when that dot comes after
/// the last `/`; otherwise `name` has no extension and is returned as is.
///
/// # Examples
///
/// | Input              | Output         |
/// |--------------------|----------------|
/// | `hello.md`         | `hello`        |
/// | `archive.tar.gz`   | `archive.tar`  |
/// | `dir.d/readme`     | `dir.d/readme` |
/// | `no-extension`     | `no-extension` |
pub fn strip_extension(name: &str) -> &str {
    let Some(dot) = name.rfind(DOT) else {
        return name;
    };
    match name.rfind(SEP) {
        Some(sep) if sep > dot => name,
        _ => &name[..dot],
    }
}

/// Request link for a post slug.
#[inline]
pub fn post_link(slug: &str) -> String {
    format!("/{slug}")
}
