//! Filesystem-safe names for files written into the store and download dir.

/// Longest name accepted by Linux filesystems (NAME_MAX), in bytes.
const NAME_MAX: usize = 255;

/// Turns an arbitrary candidate into a single safe path component.
///
/// Separators, NUL, whitespace and control characters become `_` (runs are
/// collapsed), leading/trailing dots and underscores are stripped so the
/// result can never be hidden or climb out of its directory, and the result
/// is cut to `NAME_MAX` bytes on a char boundary.
pub fn sanitize_filename_for_linux(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        let unsafe_char = matches!(c, '\0' | '/' | '\\') || c.is_control() || c.is_whitespace();
        if unsafe_char {
            if !out.ends_with('_') {
                out.push('_');
            }
        } else {
            out.push(c);
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_');
    let mut end = trimmed.len().min(NAME_MAX);
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_become_underscores() {
        assert_eq!(sanitize_filename_for_linux("a/b\\c.dic"), "a_b_c.dic");
    }

    #[test]
    fn strips_hidden_and_parent_prefixes() {
        assert_eq!(sanitize_filename_for_linux("..  nl.dic .."), "nl.dic");
        assert_eq!(sanitize_filename_for_linux(".hidden"), "hidden");
    }

    #[test]
    fn collapses_runs() {
        assert_eq!(sanitize_filename_for_linux("nl \t\x00 words.db"), "nl_words.db");
    }

    #[test]
    fn truncates_on_char_boundary() {
        let long = "é".repeat(200);
        let out = sanitize_filename_for_linux(&long);
        assert!(out.len() <= NAME_MAX);
        assert!(out.chars().all(|c| c == 'é'));
    }
}
