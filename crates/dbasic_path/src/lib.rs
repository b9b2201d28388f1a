//! dbasic_path: Path helpers for locating `INCLUDE` files.
//!
//! Include names are written in program text with either separator, so
//! everything here works on strings and accepts `/` and `\` alike.

/// Convert backslashes to forward slashes.
pub fn normalize_slashes(path: &str) -> String {
    path.replace('\\', "/")
}

/// Combine two path segments.
pub fn combine_paths(base: &str, relative: &str) -> String {
    if is_rooted(relative) {
        return relative.to_string();
    }
    if base.is_empty() {
        return relative.to_string();
    }
    let base = ensure_trailing_directory_separator(base);
    format!("{}{}", base, relative)
}

/// Check if a path is rooted (absolute).
pub fn is_rooted(path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let bytes = path.as_bytes();
    // Unix absolute path
    if bytes[0] == b'/' || bytes[0] == b'\\' {
        return true;
    }
    // Windows absolute path (e.g., C:\)
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && is_directory_separator(bytes[2] as char)
}

/// Get the directory path (everything up to and including the last separator).
pub fn get_directory_path(path: &str) -> String {
    let normalized = normalize_slashes(path);
    if let Some(last_slash) = normalized.rfind('/') {
        normalized[..=last_slash].to_string()
    } else {
        String::new()
    }
}

/// Ensure a path ends with a directory separator.
pub fn ensure_trailing_directory_separator(path: &str) -> String {
    if path.ends_with('/') || path.ends_with('\\') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// The paths tried, in order, when opening `name` against `search_dirs`.
///
/// Names and directories may use either separator; candidates always use
/// `/`. A rooted name is only tried as written. A relative name is tried
/// as written (relative to the working directory) and then under each
/// search directory in turn.
pub fn search_candidates<S: AsRef<str>>(name: &str, search_dirs: &[S]) -> Vec<String> {
    let name = normalize_slashes(name);
    if is_rooted(&name) {
        return vec![name];
    }
    let mut candidates: Vec<String> = search_dirs
        .iter()
        .map(|dir| dir.as_ref())
        .filter(|dir| !dir.is_empty())
        .map(|dir| combine_paths(&normalize_slashes(dir), &name))
        .collect();
    candidates.insert(0, name);
    candidates
}

/// Check if a character is a directory separator.
#[inline]
pub fn is_directory_separator(ch: char) -> bool {
    ch == '/' || ch == '\\'
}
