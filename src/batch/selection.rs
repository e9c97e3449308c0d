//! File selection - turn user paths into image files ready for upload

use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::error::InputError;

/// A user-provided image
#[derive(Debug, Clone)]
pub struct SelectedFile {
    /// Where the file was read from (empty for in-memory files)
    pub path: PathBuf,
    /// Display name sent as the multipart file name
    pub name: String,
    /// MIME type, always `image/*` for selected files
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    /// In-memory file, mostly useful for tests and embedding
    pub fn from_bytes(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            path: PathBuf::new(),
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// File name without extension, used for derived artifacts
    pub fn stem(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| "image".to_string())
    }
}

pub fn is_image_mime(mime: &str) -> bool {
    mime.starts_with("image/")
}

/// MIME type from the extension, falling back to sniffing the content
pub fn detect_mime(path: &Path, content: &[u8]) -> Option<String> {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .or_else(|| infer::get(content).map(|kind| kind.mime_type().to_string()))
}

/// Expand directories (recursively, sorted by name) and keep input order
fn expand(paths: &[PathBuf]) -> Result<Vec<PathBuf>, InputError> {
    let mut files = Vec::new();
    for path in paths {
        let meta = std::fs::metadata(path).map_err(|source| InputError::Io {
            path: path.clone(),
            source,
        })?;
        if meta.is_dir() {
            files.extend(
                WalkDir::new(path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .map(|e| e.into_path()),
            );
        } else {
            files.push(path.clone());
        }
    }
    Ok(files)
}

/// Read every image among `paths`.
///
/// Non-image files are skipped silently; an empty result is an error.
pub async fn select_files(paths: &[PathBuf]) -> Result<Vec<SelectedFile>, InputError> {
    if paths.is_empty() {
        return Err(InputError::NoFiles);
    }

    let mut selected = Vec::new();
    for path in expand(paths)? {
        // Skip reading files whose extension already says they are not images
        if let Some(guess) = mime_guess::from_path(&path).first() {
            if !is_image_mime(guess.essence_str()) {
                debug!("Skipping non-image {}", path.display());
                continue;
            }
        }

        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|source| InputError::Io {
                path: path.clone(),
                source,
            })?;

        match detect_mime(&path, &bytes) {
            Some(mime) if is_image_mime(&mime) => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                selected.push(SelectedFile {
                    path,
                    name,
                    mime,
                    bytes,
                });
            }
            _ => debug!("Skipping non-image {}", path.display()),
        }
    }

    if selected.is_empty() {
        return Err(InputError::NoImages);
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_detect_mime() {
        assert_eq!(
            detect_mime(Path::new("daun.JPG"), b"").as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            detect_mime(Path::new("no_extension"), PNG_HEADER).as_deref(),
            Some("image/png")
        );
        assert_eq!(detect_mime(Path::new("no_extension"), b"hello"), None);
    }

    #[test]
    fn test_stem() {
        let file = SelectedFile::from_bytes("kebun.tomat.png", "image/png", vec![]);
        assert_eq!(file.stem(), "kebun.tomat");
    }

    #[tokio::test]
    async fn test_select_filters_non_images_and_keeps_order() {
        let dir = tempdir().unwrap();
        let b = dir.path().join("b.jpg");
        let a = dir.path().join("a.png");
        let notes = dir.path().join("notes.txt");
        let raw = dir.path().join("camera_dump");
        tokio::fs::write(&b, b"jpeg").await.unwrap();
        tokio::fs::write(&a, PNG_HEADER).await.unwrap();
        tokio::fs::write(&notes, b"not an image").await.unwrap();
        tokio::fs::write(&raw, PNG_HEADER).await.unwrap();

        let files = select_files(&[b.clone(), notes, a.clone(), raw])
            .await
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.jpg", "a.png", "camera_dump"]);
        assert_eq!(files[0].mime, "image/jpeg");
        assert_eq!(files[2].mime, "image/png");
    }

    #[tokio::test]
    async fn test_select_expands_directories_sorted() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("kebun");
        tokio::fs::create_dir_all(&sub).await.unwrap();
        tokio::fs::write(sub.join("z.jpg"), b"z").await.unwrap();
        tokio::fs::write(sub.join("m.webp"), b"m").await.unwrap();

        let files = select_files(&[dir.path().to_path_buf()]).await.unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["m.webp", "z.jpg"]);
    }

    #[tokio::test]
    async fn test_select_rejects_empty_and_imageless_input() {
        assert!(matches!(select_files(&[]).await, Err(InputError::NoFiles)));

        let dir = tempdir().unwrap();
        let notes = dir.path().join("notes.txt");
        tokio::fs::write(&notes, b"text").await.unwrap();
        assert!(matches!(
            select_files(&[notes]).await,
            Err(InputError::NoImages)
        ));

        let missing = dir.path().join("missing.jpg");
        assert!(matches!(
            select_files(&[missing]).await,
            Err(InputError::Io { .. })
        ));
    }
}
