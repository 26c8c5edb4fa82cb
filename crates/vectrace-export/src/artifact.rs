//! Downloadable artifacts built from finished markup.

use std::sync::Arc;

/// File extension of exported documents.
pub const SVG_EXTENSION: &str = "svg";

/// MIME type of exported documents.
pub const SVG_MIME_TYPE: &str = "image/svg+xml";

/// Stem used when the source name has nothing usable left.
const FALLBACK_STEM: &str = "vectorized-image";

/// Derive a download file name from the source image name.
///
/// The final extension is replaced with `.svg`. A dot inside a directory
/// component is not treated as an extension separator, and an empty stem
/// falls back to `vectorized-image`.
///
/// # Examples
///
/// ```
/// use vectrace_export::suggested_file_name;
///
/// assert_eq!(suggested_file_name("logo.png"), "logo.svg");
/// assert_eq!(suggested_file_name("archive.tar.gz"), "archive.tar.svg");
/// assert_eq!(suggested_file_name(""), "vectorized-image.svg");
/// ```
#[must_use]
pub fn suggested_file_name(source_name: &str) -> String {
    let file = source_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(source_name);
    let stem = match file.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        Some(_) => "",
        None => file,
    };
    let stem = if stem.trim().is_empty() {
        FALLBACK_STEM
    } else {
        stem
    };
    format!("{stem}.{SVG_EXTENSION}")
}

/// A finished document ready to be handed to the user.
///
/// Building an artifact never changes the session it came from; the
/// markup is shared, not copied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Suggested download name, e.g. `logo.svg`.
    pub file_name: String,
    /// Always [`SVG_MIME_TYPE`].
    pub mime_type: &'static str,
    /// The SVG document.
    pub markup: Arc<str>,
}

impl ExportArtifact {
    /// Package `markup` traced from the image named `source_name`.
    #[must_use]
    pub fn new(source_name: &str, markup: Arc<str>) -> Self {
        Self {
            file_name: suggested_file_name(source_name),
            mime_type: SVG_MIME_TYPE,
            markup,
        }
    }

    /// Markup as UTF-8 bytes, for writing to disk.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.markup.as_bytes()
    }
}
