//! Names shared with the PHP runtime, and small text utilities.

/// Elements without a closing tag.
pub const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "param", "source",
    "track", "wbr",
];

/// Attributes rendered by presence rather than by value.
pub const BOOL_ATTRS: &[&str] = &["readonly", "disabled", "multiple", "checked"];

/// Arguments of every generated render function.
pub const RENDER_ARGS: &[&str] = &[
    "$data = []",
    "$noDataOutput = false",
    "$parentCtx = []",
    "$tagName = \"div\"",
    "$slots = []",
];

/// Prefix of generated temporary names.
pub const ID_PREFIX: &str = "sanssrId";

/// Prefix for namespace segments that collide with PHP keywords.
pub const RESERVED_NS_PREFIX: &str = "sanssrNS";

/// Check if a tag has no closing tag.
pub fn is_void_tag(tag: &str) -> bool {
    VOID_TAGS.contains(&tag)
}

/// Check if an attribute is a boolean attribute.
pub fn is_bool_attr(name: &str) -> bool {
    BOOL_ATTRS.contains(&name)
}

/// Escape text for HTML output, the same way the runtime does.
pub fn escape_html(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for c in source.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Convert a dash-, dot-, underscore- or space-separated name to camelCase.
pub fn camelize(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = false;

    for c in s.chars() {
        if matches!(c, '-' | '.' | '_' | ' ') {
            capitalize_next = !result.is_empty();
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else if result.is_empty() {
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }

    result
}
