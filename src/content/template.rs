//! Literal `{{ token }}` substitution.
//!
//! There are no expressions, loops or nesting. A placeholder is the exact
//! text `{{ name }}` with one space on each side of the name. Rendering is
//! one left-to-right pass over the template, so substituted values are
//! never scanned again and may safely contain `{{ ... }}` themselves.

/// Opening delimiter of a placeholder.
const OPEN: &str = "{{ ";

/// Closing delimiter of a placeholder.
const CLOSE: &str = " }}";

/// Token → value pairs for one render call.
///
/// Kept as a small ordered list: templates bind a handful of tokens and the
/// first binding of a token wins.
#[derive(Debug, Default, Clone)]
pub struct Bindings<'a> {
    entries: Vec<(String, &'a str)>,
}

impl<'a> Bindings<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `token` (without braces) to `value`.
    pub fn bind(mut self, token: &str, value: &'a str) -> Self {
        self.entries.push((placeholder(token), value));
        self
    }

    /// Bind the layout include marker `{{ include <name> }}`.
    pub fn include(self, name: &str, value: &'a str) -> Self {
        self.bind(&format!("include {name}"), value)
    }

    /// Value bound to the placeholder starting at the front of `text`.
    fn lookup(&self, text: &str) -> Option<(&str, &'a str)> {
        self.entries
            .iter()
            .find(|(placeholder, _)| text.starts_with(placeholder.as_str()))
            .map(|(placeholder, value)| (placeholder.as_str(), *value))
    }
}

/// Full placeholder text for `token`.
#[inline]
pub fn placeholder(token: &str) -> String {
    format!("{OPEN}{token}{CLOSE}")
}

/// Substitute every bound placeholder in `template`.
///
/// Unbound placeholders are copied through unchanged.
pub fn render(template: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find(OPEN) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        match bindings.lookup(rest) {
            Some((placeholder, value)) => {
                out.push_str(value);
                rest = &rest[placeholder.len()..];
            }
            None => {
                // Not ours: emit one brace and keep scanning right after it.
                out.push('{');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
