//! Cache key namespace.
//!
//! | Key                  | Value                         |
//! |----------------------|-------------------------------|
//! | `page:<n>`           | index page `n` (1-based)      |
//! | `page:error:<code>`  | error page for status `code`  |
//! | `post:<slug>`        | compiled post                 |

use std::fmt;

/// Status codes that have an error page.
pub const ERROR_CODES: [u16; 3] = [400, 404, 500];

/// A key in the flat cache namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key of index page `n`.
    pub fn page(n: usize) -> Self {
        Self(format!("page:{n}"))
    }

    /// Key of the error page for `code`.
    pub fn error(code: u16) -> Self {
        Self(format!("page:error:{code}"))
    }

    /// Key of the post with `slug`.
    pub fn post(slug: &str) -> Self {
        Self(format!("post:{slug}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
