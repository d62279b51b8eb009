use std::path::PathBuf;

use walkdir::WalkDir;

use crate::background::{MediaKind, MediaSource};
use crate::foundation::error::ScenecastResult;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "webp"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "webm"];

/// Media source backed by a local asset directory.
///
/// Matches a file when its stem contains any of the scene keywords
/// (case-insensitive). Entries are visited in sorted order so the same
/// library and keywords always resolve to the same file.
pub struct LocalLibrary {
    root: PathBuf,
}

impl LocalLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl MediaSource for LocalLibrary {
    fn lookup(&self, keywords: &[String], kind: MediaKind) -> ScenecastResult<Option<PathBuf>> {
        let extensions = match kind {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        };
        let needles: Vec<String> = keywords.iter().map(|k| k.to_ascii_lowercase()).collect();

        for entry in WalkDir::new(&self.root)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let ext_matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| extensions.contains(&e.to_ascii_lowercase().as_str()));
            if !ext_matches {
                continue;
            }
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            if needles.iter().any(|n| stem.contains(n.as_str())) {
                return Ok(Some(path.to_path_buf()));
            }
        }
        Ok(None)
    }
}

/// Media source with nothing in it; every scene gets the color fallback.
pub struct NoMedia;

impl MediaSource for NoMedia {
    fn lookup(&self, _keywords: &[String], _kind: MediaKind) -> ScenecastResult<Option<PathBuf>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(words: &[&str]) -> Vec<String> {
        words.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn matches_keyword_in_stem_for_requested_kind() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("mountain_sunrise.png"), b"x").unwrap();
        std::fs::write(dir.path().join("mountain_flight.mp4"), b"x").unwrap();

        let lib = LocalLibrary::new(dir.path());
        let hit = lib.lookup(&kw(&["mountain"]), MediaKind::Image).unwrap();
        assert_eq!(
            hit.unwrap().file_name().unwrap().to_str().unwrap(),
            "mountain_sunrise.png"
        );

        let hit = lib.lookup(&kw(&["mountain"]), MediaKind::Video).unwrap();
        assert_eq!(
            hit.unwrap().file_name().unwrap().to_str().unwrap(),
            "mountain_flight.mp4"
        );
    }

    #[test]
    fn no_match_returns_none_not_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ocean.png"), b"x").unwrap();

        let lib = LocalLibrary::new(dir.path());
        assert!(
            lib.lookup(&kw(&["desert"]), MediaKind::Image)
                .unwrap()
                .is_none()
        );
        // Missing root behaves like an empty library.
        let lib = LocalLibrary::new(dir.path().join("nope"));
        assert!(
            lib.lookup(&kw(&["desert"]), MediaKind::Image)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn lookup_is_deterministic_across_calls() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b_city.png"), b"x").unwrap();
        std::fs::write(dir.path().join("a_city.png"), b"x").unwrap();

        let lib = LocalLibrary::new(dir.path());
        let first = lib.lookup(&kw(&["city"]), MediaKind::Image).unwrap();
        let second = lib.lookup(&kw(&["city"]), MediaKind::Image).unwrap();
        assert_eq!(first, second);
        assert_eq!(
            first.unwrap().file_name().unwrap().to_str().unwrap(),
            "a_city.png"
        );
    }

    #[test]
    fn no_media_always_misses() {
        assert!(
            NoMedia
                .lookup(&kw(&["anything"]), MediaKind::Image)
                .unwrap()
                .is_none()
        );
    }
}
