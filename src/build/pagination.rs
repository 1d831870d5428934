//! Index page boundaries.
//!
//! Posts are split in listing order into pages of `per_page` posts. A page
//! closes when it is full or when the last post has been added, so only the
//! final page can be short. Indices start at 1 and have no gaps.

use std::ops::Range;

/// One index page: which posts it holds and which page follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpan {
    /// 1-based page index.
    pub index: usize,
    /// Positions of the page's posts in the sorted listing.
    pub posts: Range<usize>,
    /// Index of the following page, `None` for the final page.
    pub next: Option<usize>,
}

impl PageSpan {
    /// HTML bound to `{{ more }}`: a link to the next page, or nothing.
    pub fn more_link(&self) -> String {
        match self.next {
            Some(next) => format!("<a href='/page/{next}'>More</a>"),
            None => String::new(),
        }
    }
}

/// Split `total` posts into pages of `per_page`.
///
/// A `per_page` of zero is treated as one.
pub fn paginate(total: usize, per_page: usize) -> Vec<PageSpan> {
    let per_page = per_page.max(1);
    let count = total.div_ceil(per_page);

    (0..count)
        .map(|i| PageSpan {
            index: i + 1,
            posts: i * per_page..((i + 1) * per_page).min(total),
            next: (i + 1 < count).then_some(i + 2),
        })
        .collect()
}
