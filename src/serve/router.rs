//! Ordered route table.
//!
//! Routes are tried top to bottom and the first match wins:
//!
//! | Route           | Matches                                | Handler   |
//! |-----------------|----------------------------------------|-----------|
//! | index           | exactly `/`                            | `page:1`  |
//! | static          | path ending in a known asset extension | public/   |
//! | page            | `/page/<digits>`                       | `page:<n>`|
//! | content         | `/<anything>`                          | `post:..` |

/// Extensions served from the public directory.
pub const STATIC_EXTENSIONS: [&str; 11] = [
    "gif", "jpg", "jpeg", "png", "htm", "html", "js", "css", "woff", "woff2", "ttf",
];

/// What a matched route asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handler<'a> {
    /// First index page.
    Index,
    /// File under the public directory; `path` keeps its leading `/`.
    Static { path: &'a str, ext: &'a str },
    /// Index page `n`.
    Page(usize),
    /// A page number too large to ever exist.
    NotFound,
    /// Post with the given slug.
    Content(&'a str),
}

struct Route {
    name: &'static str,
    matcher: fn(&str) -> Option<Handler<'_>>,
}

const ROUTES: [Route; 4] = [
    Route { name: "index", matcher: index },
    Route { name: "static", matcher: static_file },
    Route { name: "page", matcher: page },
    Route { name: "content", matcher: content },
];

/// Resolve a decoded request path to its handler.
pub fn route(path: &str) -> Option<Handler<'_>> {
    ROUTES.iter().find_map(|route| (route.matcher)(path))
}

/// Name of the route that handles `path`, for logging.
pub fn route_name(path: &str) -> Option<&'static str> {
    ROUTES
        .iter()
        .find(|route| (route.matcher)(path).is_some())
        .map(|route| route.name)
}

fn index(path: &str) -> Option<Handler<'_>> {
    (path == "/").then_some(Handler::Index)
}

fn static_file(path: &str) -> Option<Handler<'_>> {
    let name = path.rsplit('/').next()?;
    let (_, ext) = name.rsplit_once('.')?;
    STATIC_EXTENSIONS
        .contains(&ext)
        .then_some(Handler::Static { path, ext })
}

fn page(path: &str) -> Option<Handler<'_>> {
    let digits = path.strip_prefix("/page/")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse().map_or(Handler::NotFound, Handler::Page))
}

fn content(path: &str) -> Option<Handler<'_>> {
    path.strip_prefix('/').map(Handler::Content)
}
