//! File path to PHP namespace mapping.
//!
//! A file's namespace is the namespace prefix followed by its path relative
//! to the project root, one segment per directory, with the file extension
//! dropped. Each segment is camel-cased and sanitized into a valid PHP label;
//! segments that are PHP keywords get a fixed prefix.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::helpers::{camelize, RESERVED_NS_PREFIX};

/// PHP keywords, see <https://www.php.net/manual/en/reserved.keywords.php>.
static PHP_KEYWORD: Lazy<Option<Regex>> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:(a(bstract|nd|rray|s))|(c(a(llable|se|tch)|l(ass|one)|on(st|tinue)))|(d(e(clare|fault)|ie|o))|(e(cho|lse(if)?|mpty|nd(declare|for(each)?|if|switch|while)|val|x(it|tends)))|(f(inal|or(each)?|unction))|(g(lobal|oto))|(i(f|mplements|n(clude(_once)?|st(anceof|eadof)|terface)|sset))|(n(amespace|ew))|(p(r(i(nt|vate)|otected)|ublic))|(re(quire(_once)?|turn))|(s(tatic|witch))|(t(hrow|r(ait|y)))|(u(nset|se))|(__halt_compiler|break|list|(x)?or|var|while))$",
    )
    .ok()
});

/// Extensions removed from file names.
const SOURCE_EXTENSIONS: &[&str] = &["ts", "js", "san"];

/// Check if `name` is a PHP keyword, case-insensitively.
pub fn is_reserved_in_php(name: &str) -> bool {
    PHP_KEYWORD.as_ref().is_some_and(|re| re.is_match(name))
}

/// Turn one path segment into a namespace label.
pub fn normalize_namespace_slug(slug: &str) -> String {
    sanitize_label(&camelize(slug))
}

/// Replace characters PHP rejects in a label and prefix keywords.
fn sanitize_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    for (i, c) in name.chars().enumerate() {
        let valid = if i == 0 {
            c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
        } else {
            c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
        };
        label.push(if valid { c } else { '_' });
    }
    if label.is_empty() {
        label.push('_');
    }
    if is_reserved_in_php(&label) {
        format!("{}{}", RESERVED_NS_PREFIX, label)
    } else {
        label
    }
}

/// Clean up a namespace written by the user, keeping its labels' spelling.
pub fn normalize_namespace(ns: &str) -> String {
    ns.trim_matches('\\')
        .split('\\')
        .filter(|s| !s.is_empty())
        .map(sanitize_label)
        .collect::<Vec<_>>()
        .join("\\")
}

/// Namespace of `file` relative to `root`, without prefix.
pub fn relative_namespace(root: &Utf8Path, file: &Utf8Path) -> String {
    let file = strip_source_extension(file);
    relative_path(root, &file)
        .iter()
        .map(|s| normalize_namespace_slug(s))
        .collect::<Vec<_>>()
        .join("\\")
}

/// Full namespace of `file`: `prefix` joined with its relative namespace.
pub fn get_namespace(prefix: &str, root: &Utf8Path, file: &Utf8Path) -> String {
    let prefix = prefix.trim_matches('\\');
    let relative = relative_namespace(root, file);
    match (prefix.is_empty(), relative.is_empty()) {
        (true, _) => relative,
        (false, true) => prefix.to_string(),
        (false, false) => format!("{}\\{}", prefix, relative),
    }
}

/// Resolve `specifier` against the directory of `current`, lexically.
pub fn resolve_from(current: &Utf8Path, specifier: &str) -> Utf8PathBuf {
    let dir = current.parent().unwrap_or(Utf8Path::new(""));
    normalize_path(&dir.join(specifier))
}

fn strip_source_extension(file: &Utf8Path) -> Utf8PathBuf {
    match file.extension() {
        Some(ext) if SOURCE_EXTENSIONS.contains(&ext) => file.with_extension(""),
        _ => file.to_owned(),
    }
}

/// Collapse `.` and `..` without touching the file system.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}

/// Segments leading from `root` to `path`, `..` where `path` leaves `root`.
fn relative_path(root: &Utf8Path, path: &Utf8Path) -> Vec<String> {
    let root = normalize_path(root);
    let path = normalize_path(path);
    let root_parts: Vec<_> = root.components().collect();
    let path_parts: Vec<_> = path.components().collect();
    let common = root_parts
        .iter()
        .zip(&path_parts)
        .take_while(|(a, b)| a == b)
        .count();

    std::iter::repeat("..".to_string())
        .take(root_parts.len() - common)
        .chain(path_parts[common..].iter().map(|c| c.as_str().to_string()))
        .collect()
}
