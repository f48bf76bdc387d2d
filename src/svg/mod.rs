mod attributes;
pub mod highlight;

use std::fmt;

pub use attributes::AttributeMap;

/// Opening root tag sent as the assistant prefix in forced-SVG mode.
pub const ROOT_PREFIX: &str =
    r#"<svg viewBox="0 0 1024 1024" fill="none" xmlns="http://www.w3.org/2000/svg">"#;
pub const ROOT_CLOSE: &str = "</svg>";
pub const DEFAULT_VIEWBOX: &str = "0 0 1024 1024";
pub const DEFAULT_ASPECT: &str = "xMidYMid meet";

const ROOT_OPEN: &str = "<svg";

const SHAPE_ELEMENTS: &[&str] = &[
    "rect", "circle", "path", "line", "polygon", "polyline", "ellipse", "text", "g", "defs",
];

/// Whether the content looks like SVG: a root tag anywhere, or one of the
/// common shape elements as a complete tag name.
#[must_use]
pub fn is_svg_bearing(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains(ROOT_OPEN) || count_elements(&lower, SHAPE_ELEMENTS) > 0
}

/// Number of element tags opened so far, root included.
#[must_use]
pub fn element_count(content: &str) -> usize {
    let lower = content.to_ascii_lowercase();
    count_elements(&lower, &["svg"]) + count_elements(&lower, SHAPE_ELEMENTS)
}

/// The span from the first `<svg` to the last `</svg>`, if both exist.
#[must_use]
pub fn extract(content: &str) -> Option<&str> {
    let lower = content.to_ascii_lowercase();
    let start = lower.find(ROOT_OPEN)?;
    let close = lower.rfind(ROOT_CLOSE)?;
    (close > start).then(|| &content[start..close + ROOT_CLOSE.len()])
}

/// Builds a renderable fragment from message content.
///
/// A complete `<svg>…</svg>` span is always normalized. Without one, the
/// content is only shown while `streaming`, starting at the root tag if any.
/// Content that does not look like SVG yields `None`.
#[must_use]
pub fn normalize(content: &str, streaming: bool) -> Option<SvgFragment> {
    if !is_svg_bearing(content) {
        return None;
    }
    if let Some(span) = extract(content) {
        return Some(SvgFragment::parse(span, true));
    }
    if !streaming {
        return None;
    }

    let start = content.to_ascii_lowercase().find(ROOT_OPEN).unwrap_or(0);
    Some(SvgFragment::parse(&content[start..], false))
}

/// Completes content that was produced as a continuation of `root_prefix`:
/// the root tag is put back in front when missing, and the closing tag that
/// was consumed as the stop sequence is appended.
#[must_use]
pub fn close_fragment(content: &str, root_prefix: &str) -> String {
    if !is_svg_bearing(content) {
        return content.to_string();
    }

    let mut closed = if content.to_ascii_lowercase().contains(ROOT_OPEN) {
        content.to_string()
    } else {
        format!("{root_prefix}{content}")
    };

    if extract(&closed).is_none() {
        closed.push_str(ROOT_CLOSE);
    }
    closed
}

/// Derived view of SVG content, rebuilt on every render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SvgFragment {
    pub attributes: AttributeMap,
    /// Everything after the root tag, or the whole input when the root tag
    /// could not be rewritten.
    pub body: String,
    /// A closing `</svg>` has been seen.
    pub complete: bool,
    /// The root tag was recognised and rebuilt from `attributes`.
    pub normalized: bool,
    self_closing: bool,
}

impl SvgFragment {
    fn parse(text: &str, complete: bool) -> Self {
        let Some((inner, body)) = split_root_tag(text) else {
            return Self {
                attributes: AttributeMap::new(),
                body: text.to_string(),
                complete,
                normalized: false,
                self_closing: false,
            };
        };

        let trimmed = inner.trim_end();
        let self_closing = trimmed.ends_with('/');
        let inner = trimmed.strip_suffix('/').unwrap_or(trimmed);

        let mut attributes = AttributeMap::parse(inner);
        attributes.remove("width");
        attributes.remove("height");
        attributes.ensure("viewBox", DEFAULT_VIEWBOX);
        attributes.ensure("preserveAspectRatio", DEFAULT_ASPECT);

        Self {
            attributes,
            body: body.to_string(),
            complete,
            normalized: true,
            self_closing,
        }
    }

    #[must_use]
    pub fn view_box(&self) -> Option<&str> {
        self.attributes.get("viewBox")
    }

    #[must_use]
    pub fn to_markup(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SvgFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.normalized {
            let close = if self.self_closing { "/>" } else { ">" };
            write!(f, "<svg{}{close}", self.attributes)?;
        }
        f.write_str(&self.body)
    }
}

/// Splits `<svg …>rest` into the attribute source and the rest. `None` when
/// the text does not start with a root tag or its `>` has not arrived.
///
/// The tag ends at the first `>` that is not inside a quoted value. A quote
/// only counts when its closing partner comes before any `<`, since markup
/// cannot appear inside an attribute value; stray apostrophes are plain text.
fn split_root_tag(text: &str) -> Option<(&str, &str)> {
    let head = text.get(..ROOT_OPEN.len())?;
    if !head.eq_ignore_ascii_case(ROOT_OPEN) {
        return None;
    }

    let after = &text[ROOT_OPEN.len()..];
    let bytes = after.as_bytes();
    let mut pos = 0;
    while pos < bytes.len() {
        match bytes[pos] {
            b'>' => return Some((&after[..pos], &after[pos + 1..])),
            quote @ (b'"' | b'\'') => {
                if let Some(len) = quoted_len(&bytes[pos + 1..], quote) {
                    pos += len + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    None
}

/// Length of a quoted value up to its closing `quote`, if that quote comes
/// before the next `<`.
fn quoted_len(rest: &[u8], quote: u8) -> Option<usize> {
    let end = rest.iter().position(|&b| b == quote || b == b'<')?;
    (rest[end] == quote).then_some(end)
}

fn count_elements(lower: &str, names: &[&str]) -> usize {
    let bytes = lower.as_bytes();
    lower
        .match_indices('<')
        .filter(|(i, _)| {
            let rest = &bytes[i + 1..];
            names.iter().any(|name| {
                rest.starts_with(name.as_bytes())
                    && rest
                        .get(name.len())
                        .is_some_and(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
            })
        })
        .count()
}
