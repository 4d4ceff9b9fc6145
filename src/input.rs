use crate::constants::{SourceFormat, FALLBACK_MIME_TYPE, MAX_FILE_SIZE};
use crate::error::{ConvertError, Result};
use crate::session::SourceImage;
use glob::glob;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expands one command-line input into file paths.
///
/// * an existing file is returned as-is, whatever its extension, so that
///   the ingest filter decides what is accepted
/// * a directory is walked (recursively if asked), skipping hidden entries
///   and keeping only files with a supported image extension
/// * anything else is tried as a glob pattern
pub fn collect_image_files(input: &str, recursive: bool) -> Result<Vec<PathBuf>> {
    let input_path = Path::new(input);
    let mut image_files = Vec::new();

    if input_path.is_file() {
        image_files.push(input_path.to_path_buf());
    } else if input_path.is_dir() {
        let mut walker = WalkDir::new(input_path).sort_by_file_name();
        if !recursive {
            walker = walker.max_depth(1);
        }

        for entry in walker
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() && is_image_file(path) {
                image_files.push(path.to_path_buf());
            }
        }
    } else {
        let pattern =
            glob(input).map_err(|_| ConvertError::NoImageFilesFound(input.to_string()))?;
        for entry in pattern.flatten() {
            if entry.is_file() && is_image_file(&entry) {
                image_files.push(entry);
            }
        }
    }

    Ok(image_files)
}

/// Collects every input in order, dropping repeated paths
pub fn collect_inputs(inputs: &[String], recursive: bool) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();
    for input in inputs {
        for path in collect_image_files(input, recursive)? {
            if !files.contains(&path) {
                files.push(path);
            }
        }
    }
    Ok(files)
}

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(SourceFormat::from_extension)
        .is_some()
}

/// MIME type advertised for a path, judged by its extension like a browser
/// file picker would
pub fn mime_type_for(path: &Path) -> &'static str {
    path.extension()
        .and_then(|s| s.to_str())
        .and_then(SourceFormat::from_extension)
        .map(|format| format.mime_type())
        .unwrap_or(FALLBACK_MIME_TYPE)
}

/// Reads a file into a `SourceImage`.
///
/// # Security
/// - Checks the file size before reading to bound memory use
pub fn load_source_image(path: &Path) -> Result<SourceImage> {
    if !path.is_file() {
        return Err(ConvertError::FileNotFound(path.to_path_buf()));
    }

    let file_size = fs::metadata(path)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(ConvertError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| ConvertError::FileNotFound(path.to_path_buf()))?;

    Ok(SourceImage::new(name, fs::read(path)?, mime_type_for(path)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file(Path::new("test.jpg")));
        assert!(is_image_file(Path::new("test.JPEG")));
        assert!(is_image_file(Path::new("test.png")));
        assert!(is_image_file(Path::new("test.webp")));
        assert!(is_image_file(Path::new("test.bmp")));
        assert!(is_image_file(Path::new("test.gif")));

        assert!(!is_image_file(Path::new("test.tiff")));
        assert!(!is_image_file(Path::new("test.txt")));
        assert!(!is_image_file(Path::new("test")));
    }

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(mime_type_for(Path::new("a.txt")), FALLBACK_MIME_TYPE);
        assert_eq!(mime_type_for(Path::new("noext")), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn test_collect_single_file_keeps_any_extension() {
        let temp_dir = TempDir::new().unwrap();
        let notes = temp_dir.path().join("notes.txt");
        File::create(&notes).unwrap().write_all(b"hello").unwrap();

        let files = collect_image_files(&notes.to_string_lossy(), false).unwrap();
        assert_eq!(files, vec![notes]);
    }

    #[test]
    fn test_collect_directory_filters_and_sorts() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("b.png")).unwrap();
        File::create(temp_dir.path().join("a.jpg")).unwrap();
        File::create(temp_dir.path().join("notes.txt")).unwrap();
        File::create(temp_dir.path().join(".hidden.png")).unwrap();

        let files = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png"]);
    }

    #[test]
    fn test_collect_directory_recursive() {
        let temp_dir = TempDir::new().unwrap();
        let subdir = temp_dir.path().join("subdir");
        fs::create_dir(&subdir).unwrap();
        File::create(temp_dir.path().join("top.jpg")).unwrap();
        File::create(subdir.join("nested.png")).unwrap();

        let shallow = collect_image_files(&temp_dir.path().to_string_lossy(), false).unwrap();
        assert_eq!(shallow.len(), 1);

        let deep = collect_image_files(&temp_dir.path().to_string_lossy(), true).unwrap();
        assert_eq!(deep.len(), 2);
    }

    #[test]
    fn test_collect_glob_pattern() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("test1.jpg")).unwrap();
        File::create(temp_dir.path().join("test2.png")).unwrap();
        File::create(temp_dir.path().join("other.txt")).unwrap();

        let pattern = format!("{}/*.jpg", temp_dir.path().to_string_lossy());
        let files = collect_image_files(&pattern, false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_collect_inputs_deduplicates() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("a.png");
        File::create(&file).unwrap();

        let input = file.to_string_lossy().into_owned();
        let files = collect_inputs(&[input.clone(), input], false).unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_load_source_image() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("pic.webp");
        File::create(&path).unwrap().write_all(b"RIFF").unwrap();

        let source = load_source_image(&path).unwrap();
        assert_eq!(source.name, "pic.webp");
        assert_eq!(source.mime_type, "image/webp");
        assert_eq!(source.bytes, b"RIFF");
    }

    #[test]
    fn test_load_source_image_not_found() {
        let result = load_source_image(Path::new("/nonexistent/file.jpg"));
        assert!(matches!(result, Err(ConvertError::FileNotFound(_))));
    }
}
