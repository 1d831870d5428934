//! HTTP response builder.
//!
//! A [`Response`] is assembled once from a status, a content-type hint and a
//! body, then handed to `tiny_http` without further mutation.

use std::{
    fs::File,
    io::{Cursor, Read},
};
use tiny_http::{Header, StatusCode};

/// Value of the `Server` header.
const SERVER_NAME: &str = "blogd";

/// Content type of every error response.
const HTML_MIME: &str = "text/html; charset=UTF-8";

/// Extension (or logical tag) to MIME type.
const MIME_TYPES: [(&str, &str); 11] = [
    ("gif", "image/gif"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("htm", HTML_MIME),
    ("html", HTML_MIME),
    ("js", "application/javascript"),
    ("css", "text/css; charset=UTF-8"),
    ("woff", "font/woff"),
    ("woff2", "font/woff2"),
    ("ttf", "font/ttf"),
];

/// Headers sent with every response, in order.
const FIXED_HEADERS: [(&str, &str); 7] = [
    ("Connection", "close"),
    ("Cache-Control", "no-store, must-revalidate"),
    ("Pragma", "no-cache"),
    ("Expires", "0"),
    ("X-Content-Type-Options", "nosniff"),
    ("X-Frame-Options", "SAMEORIGIN"),
    ("X-XSS-Protection", "1; mode=block"),
];

/// Resolve a content-type hint to its MIME type.
pub fn mime_type(hint: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(ext, _)| *ext == hint)
        .map(|(_, mime)| *mime)
}

/// The only statuses the server ever answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    InternalError,
}

impl Status {
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::InternalError => 500,
        }
    }

    #[cfg(test)]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::InternalError => "Internal Server Error",
        }
    }

    pub const fn is_error(self) -> bool {
        !matches!(self, Self::Ok)
    }
}

pub(super) enum Body {
    Bytes(Vec<u8>),
    Stream { file: File, len: u64 },
}

pub struct Response {
    pub(super) status: Status,
    pub(super) headers: Vec<(&'static str, String)>,
    pub(super) body: Body,
}

impl Response {
    /// Buffered response.
    ///
    /// An unknown `hint` turns the response into a 400; error statuses are
    /// always `text/html`.
    pub fn cached(body: impl Into<Vec<u8>>, hint: &str, status: Status) -> Self {
        let body = body.into();
        let (status, mime) = resolve(hint, status);
        let headers = Self::headers(Some(body.len()), mime);
        Self { status, headers, body: Body::Bytes(body) }
    }

    /// Streamed 200 response for a static file of `len` bytes.
    pub fn stream(file: File, len: u64, hint: &str) -> Self {
        let (status, mime) = resolve(hint, Status::Ok);
        let headers = Self::headers(None, mime);
        Self { status, headers, body: Body::Stream { file, len } }
    }

    fn headers(content_length: Option<usize>, mime: &str) -> Vec<(&'static str, String)> {
        let mut headers = Vec::with_capacity(FIXED_HEADERS.len() + 3);
        headers.push(("Server", SERVER_NAME.to_owned()));
        headers.extend(FIXED_HEADERS.iter().map(|(name, value)| (*name, (*value).to_owned())));
        if let Some(len) = content_length {
            headers.push(("Content-Length", len.to_string()));
        }
        headers.push(("Content-Type", mime.to_owned()));
        headers
    }

    pub const fn status(&self) -> Status {
        self.status
    }

    /// First header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Status line and headers, terminated by the blank line.
    #[cfg(test)]
    pub fn head(&self) -> String {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status.code(), self.status.reason());
        for (name, value) in &self.headers {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");
        head
    }

    /// Convert into a `tiny_http` response.
    ///
    /// `tiny_http` computes the body length itself, so `Content-Length` is
    /// passed as the data length instead of a header.
    pub fn into_tiny(self) -> tiny_http::Response<Box<dyn Read + Send>> {
        let headers = self
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("Content-Length"))
            .filter_map(|(name, value)| Header::from_bytes(name.as_bytes(), value.as_bytes()).ok())
            .collect();

        let (reader, len): (Box<dyn Read + Send>, Option<usize>) = match self.body {
            Body::Bytes(bytes) => {
                let len = bytes.len();
                (Box::new(Cursor::new(bytes)), Some(len))
            }
            Body::Stream { file, len } => (Box::new(file), usize::try_from(len).ok()),
        };

        tiny_http::Response::new(StatusCode(self.status.code()), headers, reader, len, None)
    }
}

fn resolve(hint: &str, status: Status) -> (Status, &'static str) {
    match mime_type(hint) {
        Some(mime) if !status.is_error() => (status, mime),
        Some(_) => (status, HTML_MIME),
        None => (Status::BadRequest, HTML_MIME),
    }
}
