//! Named section extraction.
//!
//! A source file marks its parts with a start and an end marker:
//!
//! ```text
//! @section_title
//!     Hello, world
//! @endsection
//! ```
//!
//! The first `@endsection` after a start marker always closes it, so nested
//! or unterminated markers produce the shortest span rather than the
//! intended one. Repeated sections are not merged: only the first counts.

/// Prefix of every start marker, followed directly by the section name.
const START_PREFIX: &str = "@section_";

/// End marker shared by all sections.
const END_MARKER: &str = "@endsection";

/// Sections a post or page source may define.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Title,
    MetaDescription,
    Description,
    Thumbnail,
    Content,
    PublishedAt,
}

impl Section {
    /// Every known section.
    #[cfg(test)]
    pub const ALL: [Section; 6] = [
        Self::Title,
        Self::MetaDescription,
        Self::Description,
        Self::Thumbnail,
        Self::Content,
        Self::PublishedAt,
    ];

    /// Name as written after `@section_`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::MetaDescription => "meta_description",
            Self::Description => "description",
            Self::Thumbnail => "thumbnail",
            Self::Content => "content",
            Self::PublishedAt => "published_at",
        }
    }

    /// Extract this section from `source`.
    #[inline]
    pub fn extract(self, source: &str) -> Option<&str> {
        extract_section(self.name(), source)
    }
}

/// Extract the body of section `name` from `source`.
///
/// Whitespace between the markers and the body is dropped. Returns `None`
/// when the start marker is missing or has no `@endsection` after it.
pub fn extract_section<'a>(name: &str, source: &'a str) -> Option<&'a str> {
    let marker = format!("{START_PREFIX}{name}");
    let start = source.find(&marker)? + marker.len();
    let rest = &source[start..];
    let end = rest.find(END_MARKER)?;

    Some(rest[..end].trim_matches(|c: char| c.is_ascii_whitespace()))
}
