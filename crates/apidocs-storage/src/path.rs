//! Page path helpers.
//!
//! Page and directory paths are slash-separated, relative to the content
//! root, and carry no file extension. The root directory is `""`.

/// Index page file name inside every directory.
pub const INDEX_FILE: &str = "index.md";

/// Readme file name, never treated as a page.
pub const README_FILE: &str = "README.md";

/// Page file extension.
pub const PAGE_EXTENSION: &str = "md";

/// Directory containing `path` (`""` for top-level entries).
#[must_use]
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Last segment of `path`.
#[must_use]
pub fn base_name(path: &str) -> &str {
    path.rsplit_once('/').map_or(path, |(_, name)| name)
}

/// Join a directory and an entry name.
#[must_use]
pub fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_owned()
    } else {
        format!("{dir}/{name}")
    }
}

/// Child reference stored in an index page's `children` list.
#[must_use]
pub fn child_reference(path: &str) -> String {
    format!("/{}", base_name(path))
}

/// Relative file path of the page at `path`.
#[must_use]
pub fn page_file(path: &str) -> String {
    format!("{path}.{PAGE_EXTENSION}")
}

/// Relative file path of the index page for `dir`.
#[must_use]
pub fn index_file(dir: &str) -> String {
    join(dir, INDEX_FILE)
}

/// Whether a file name is reserved (index or readme) rather than a page.
#[must_use]
pub fn is_reserved(file_name: &str) -> bool {
    file_name.eq_ignore_ascii_case(INDEX_FILE) || file_name.eq_ignore_ascii_case(README_FILE)
}

/// Whether `path` is safe to resolve under the content root.
///
/// Rejects parent (`..`) and current (`.`) segments, empty segments and
/// absolute paths.
#[must_use]
pub fn is_valid(path: &str) -> bool {
    path.is_empty()
        || path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..")
}
