//! File path to content-type classification
//!
//! Matching is substring containment against an ordered extension table, so
//! `cat.png.bak` is still `image/png`. The first entry found wins.

use tracing::warn;

/// Returned when no known extension is found
pub const UNKNOWN_CONTENT_TYPE: &str = "unknown";

/// Known extensions in match order
const EXTENSION_TABLE: &[(&str, &str)] = &[
    // data formats
    (".json", "application/json"),
    // image formats
    (".png", "image/png"),
    (".bmp", "image/bmp"),
    (".gif", "image/gif"),
    (".jpeg", "image/jpeg"),
    (".jpg", "image/jpeg"),
    (".webp", "image/webp"),
    // video formats
    (".avi", "video/x-msvideo"),
    (".webm", "video/webm"),
    (".mp4", "video/mp4"),
];

/// Classify a path by extension, returning `"unknown"` when nothing matches.
///
/// Logs a warning for empty or unrecognized paths; never fails.
pub fn path_to_mime_type(path: &str) -> &'static str {
    if path.is_empty() {
        warn!(path = "EMPTY_FILE_PATH", "UNSUPPORTED_FILE_TYPE: empty file path");
        return UNKNOWN_CONTENT_TYPE;
    }

    match known_mime_type(path) {
        Some(mime) => mime,
        None => {
            warn!(path = %path, "UNSUPPORTED_FILE_TYPE: file is not a supported format");
            UNKNOWN_CONTENT_TYPE
        },
    }
}

/// Classify without logging; `None` when the extension is unknown
pub fn known_mime_type(path: &str) -> Option<&'static str> {
    EXTENSION_TABLE
        .iter()
        .find(|(ext, _)| path.contains(ext))
        .map(|(_, mime)| *mime)
}
