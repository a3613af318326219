//! Last path segment of a payload URI.

/// Returns the final non-empty path segment of `uri`, if any.
///
/// Works for `http(s)://` as well as `file://` payloads. Query strings and
/// fragments are ignored. `None` for unparseable URIs, bare hosts, and
/// the `.`/`..` pseudo-segments.
pub fn filename_from_url_path(uri: &str) -> Option<String> {
    let parsed = url::Url::parse(uri).ok()?;
    let last = parsed
        .path_segments()?
        .filter(|segment| !segment.is_empty())
        .last()?;
    match last {
        "." | ".." => None,
        name => Some(name.to_string()),
    }
}
