use anyhow::Result;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Default video file extensions to scan for
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi", "mov", "mxf", "flv", "wmv"];

/// Check if a path has one of the recognized video extensions (case-insensitive)
pub fn is_video_file(path: &Path, extensions: &[String]) -> bool {
    if let Some(ext) = path.extension() {
        if let Some(ext_str) = ext.to_str() {
            let lower = ext_str.to_lowercase();
            return extensions.iter().any(|e| e == &lower);
        }
    }
    false
}

/// Scan a directory recursively for video files and invoke a callback for each file found
pub fn scan_streaming<F>(root: &Path, extensions: &[String], mut on_file: F) -> Result<()>
where
    F: FnMut(PathBuf),
{
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && is_video_file(path, extensions) {
            on_file(path.to_path_buf());
        }
    }

    Ok(())
}

/// Scan a directory recursively for video files
pub fn scan(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    scan_streaming(root, extensions, |path| files.push(path))?;
    Ok(files)
}

/// Mirror `path`'s position under `root_in` into `root_out`, swapping the
/// extension. `relocate("/in", "/out", "/in/clips/a.mov", "mp4")` is
/// `/out/clips/a.mp4`. A path outside `root_in` falls back to its bare file
/// name under `root_out`.
pub fn relocate(root_in: &Path, root_out: &Path, path: &Path, new_extension: &str) -> PathBuf {
    let relative = path
        .strip_prefix(root_in)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| PathBuf::from(path.file_name().unwrap_or_default()));
    root_out.join(relative).with_extension(new_extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_extensions() -> Vec<String> {
        VIDEO_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_is_video_file() {
        let exts = default_extensions();
        assert!(is_video_file(Path::new("test.mp4"), &exts));
        assert!(is_video_file(Path::new("test.MP4"), &exts));
        assert!(is_video_file(Path::new("test.mkv"), &exts));
        assert!(is_video_file(Path::new("clip.MoV"), &exts));

        assert!(!is_video_file(Path::new("test.txt"), &exts));
        assert!(!is_video_file(Path::new("test.webm"), &exts));
        assert!(!is_video_file(Path::new("test"), &exts));
    }

    #[test]
    fn test_is_video_file_custom_extensions() {
        let exts = vec!["webm".to_string()];
        assert!(is_video_file(Path::new("test.webm"), &exts));
        assert!(!is_video_file(Path::new("test.mp4"), &exts));
    }

    #[test]
    fn test_relocate_mirrors_subdirectories() {
        let out = relocate(
            Path::new("/videos/in"),
            Path::new("/videos/out"),
            Path::new("/videos/in/clips/a.mov"),
            "mp4",
        );
        assert_eq!(out, PathBuf::from("/videos/out/clips/a.mp4"));
    }

    #[test]
    fn test_relocate_top_level_file() {
        let out = relocate(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/in/a.mkv"),
            "mp4",
        );
        assert_eq!(out, PathBuf::from("/out/a.mp4"));
    }

    #[test]
    fn test_relocate_foreign_path_uses_file_name() {
        let out = relocate(
            Path::new("/in"),
            Path::new("/out"),
            Path::new("/elsewhere/b.avi"),
            "mp4",
        );
        assert_eq!(out, PathBuf::from("/out/b.mp4"));
    }

    #[test]
    fn test_scan_finds_nested_videos() {
        use std::fs;
        use tempfile::TempDir;

        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("nested/deep")).unwrap();
        fs::write(root.join("a.mp4"), b"x").unwrap();
        fs::write(root.join("nested/b.MKV"), b"x").unwrap();
        fs::write(root.join("nested/deep/c.mov"), b"x").unwrap();
        fs::write(root.join("nested/notes.txt"), b"x").unwrap();

        let found = scan(root, &default_extensions()).unwrap();
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|p| p.is_file()));
    }
}
