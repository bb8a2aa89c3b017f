/// File filtering for image discovery.
///
/// Only regular files whose extension is one of [`IMAGE_EXTENSIONS`] are
/// handed to the worker pool. The extension check is case-insensitive, so
/// `SCAN.PNG` and `scan.png` are treated the same way. Optional glob patterns
/// can exclude files that would otherwise qualify:
///
/// ```rust,ignore
/// let ignore = vec!["**/thumb_*".to_string()];
/// assert!(should_include_file(Path::new("scans/page1.jpg"), &ignore));
/// assert!(!should_include_file(Path::new("scans/thumb_page1.jpg"), &ignore));
/// ```
use glob::Pattern;
use std::path::Path;

/// Extensions accepted as OCR input
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Checks if a file has one of the supported image extensions
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|image_ext| image_ext.eq_ignore_ascii_case(ext))
        })
}

/// Checks if a file should be ignored based on ignore patterns
pub fn should_ignore(path: &Path, ignore_patterns: &[String]) -> bool {
    let path_str = path.to_string_lossy();
    let normalized_path = path_str.replace('\\', "/");

    ignore_patterns.iter().any(|pattern| match Pattern::new(pattern) {
        Ok(p) => p.matches(&normalized_path),
        Err(_) => false,
    })
}

/// Determines if a file should be queued for OCR
pub fn should_include_file(path: &Path, ignore_patterns: &[String]) -> bool {
    is_image_file(path) && !should_ignore(path, ignore_patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("scan.png")));
        assert!(is_image_file(Path::new("scan.jpg")));
        assert!(is_image_file(Path::new("scan.jpeg")));
        assert!(is_image_file(Path::new("SCAN.PNG"))); // Test case insensitivity
        assert!(is_image_file(Path::new("dir/photo.JpEg")));

        assert!(!is_image_file(Path::new("scan.gif")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("png"))); // No extension
        assert!(!is_image_file(Path::new("archive.png.zip")));
    }

    #[test]
    fn test_should_ignore() {
        let ignore_patterns = vec![
            "**/thumb_*".to_string(),
            "drafts/*.png".to_string(),
            "[invalid".to_string(),
        ];

        assert!(should_ignore(Path::new("scans/thumb_1.png"), &ignore_patterns));
        assert!(should_ignore(Path::new("drafts/page.png"), &ignore_patterns));

        assert!(!should_ignore(Path::new("scans/page_1.png"), &ignore_patterns));
        assert!(!should_ignore(Path::new("drafts/page.jpg"), &ignore_patterns));
        assert!(!should_ignore(Path::new("scans/page.png"), &[]));
    }

    #[test]
    fn test_should_include_file() {
        let ignore_patterns = vec!["**/thumb_*".to_string()];

        assert!(should_include_file(
            Path::new("scans/page.png"),
            &ignore_patterns
        ));
        assert!(!should_include_file(
            Path::new("scans/thumb_page.png"),
            &ignore_patterns
        ));
        assert!(!should_include_file(
            Path::new("scans/page.tiff"),
            &ignore_patterns
        ));
    }
}
