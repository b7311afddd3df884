//! Image reference resolution.
//!
//! Stored image references are full paths (either separator), bare
//! filenames, or sentinel strings meaning "no image". The resolver turns
//! them into retrieval URLs under an explicitly configured base.

use serde::{Deserialize, Serialize};

/// Stored values that mean "no image". Matched case-sensitively.
pub const NO_IMAGE_SENTINELS: [&str; 2] = ["null", "None"];

/// Builds image retrieval URLs from stored references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageResolver {
    base_url: String,
}

impl ImageResolver {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a stored reference to `<base_url>/<filename>`.
    ///
    /// Returns `None` for a missing reference, an empty string, a sentinel,
    /// or a path with no trailing filename.
    pub fn resolve(&self, path: Option<&str>) -> Option<String> {
        let name = stored_file_name(path)?;
        Some(format!("{}/{}", self.base_url, name))
    }

    /// Resolve into an `ImageRef` ready for rendering.
    pub fn image_ref(&self, path: Option<&str>) -> ImageRef {
        ImageRef {
            url: self.resolve(path),
            file_name: stored_file_name(path).map(str::to_string),
            load_failed: false,
        }
    }
}

/// Trailing component of a path, split on `/` or `\`.
pub fn file_name(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// True when a stored reference carries no image.
pub fn is_absent(path: Option<&str>) -> bool {
    stored_file_name(path).is_none()
}

fn stored_file_name(path: Option<&str>) -> Option<&str> {
    let path = path?;
    if path.is_empty() || NO_IMAGE_SENTINELS.contains(&path) {
        return None;
    }
    let name = file_name(path);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// A resolved image slot in a view model.
///
/// `load_failed` is set by the rendering layer when fetching the URL fails;
/// the slot then renders as a "failed to load" placeholder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub url: Option<String>,
    /// Bare filename, shown next to the image.
    pub file_name: Option<String>,
    #[serde(default)]
    pub load_failed: bool,
}

/// What the rendering layer should show for an image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageState<'a> {
    Absent,
    Ready(&'a str),
    Failed,
}

impl ImageRef {
    pub fn is_present(&self) -> bool {
        self.url.is_some()
    }

    /// Record a fetch failure for this image only.
    pub fn mark_failed(&mut self) {
        if self.url.is_some() {
            self.load_failed = true;
        }
    }

    pub fn state(&self) -> ImageState<'_> {
        match (&self.url, self.load_failed) {
            (None, _) => ImageState::Absent,
            (Some(_), true) => ImageState::Failed,
            (Some(url), false) => ImageState::Ready(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ImageResolver {
        ImageResolver::new("http://localhost:5000/api/images")
    }

    #[test]
    fn resolves_either_separator_to_same_url() {
        let r = resolver();
        let forward = r.resolve(Some("uploads/img/q1.png"));
        let backward = r.resolve(Some("uploads\\img\\q1.png"));
        assert_eq!(forward, backward);
        assert_eq!(
            forward.as_deref(),
            Some("http://localhost:5000/api/images/q1.png")
        );
    }

    #[test]
    fn bare_filename_resolves() {
        assert_eq!(
            resolver().resolve(Some("diagram.jpg")).as_deref(),
            Some("http://localhost:5000/api/images/diagram.jpg")
        );
    }

    #[test]
    fn sentinels_and_empty_resolve_to_none() {
        let r = resolver();
        assert_eq!(r.resolve(None), None);
        assert_eq!(r.resolve(Some("")), None);
        assert_eq!(r.resolve(Some("None")), None);
        assert_eq!(r.resolve(Some("null")), None);
        assert_eq!(r.resolve(Some("uploads/img/")), None);
    }

    #[test]
    fn sentinels_are_case_sensitive() {
        assert!(resolver().resolve(Some("NONE")).is_some());
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let r = ImageResolver::new("https://cdn.example.com/images/");
        assert_eq!(
            r.resolve(Some("a/b.png")).as_deref(),
            Some("https://cdn.example.com/images/b.png")
        );
    }

    #[test]
    fn mark_failed_only_affects_present_images() {
        let r = resolver();
        let mut present = r.image_ref(Some("x/q.png"));
        let mut absent = r.image_ref(Some("None"));
        present.mark_failed();
        absent.mark_failed();
        assert_eq!(present.state(), ImageState::Failed);
        assert_eq!(absent.state(), ImageState::Absent);
        assert_eq!(present.file_name.as_deref(), Some("q.png"));
    }
}
