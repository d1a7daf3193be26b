//! File and speaker name helpers

use std::path::Path;

/// Make a name safe for whitespace-delimited formats
///
/// Whitespace runs become a single `_`; anything other than alphanumerics,
/// `_` and `-` is dropped. Applying it twice gives the same result as once.
pub fn sanitize(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// File name without directories or extension (`a/b/c.wav` → `c`)
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
