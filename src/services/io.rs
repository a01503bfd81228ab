//! Image file I/O operations
//!
//! Separates filesystem concerns from pipeline business logic.

use crate::error::{PipelineError, Result};
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// Raster extensions the batch scheduler picks up (case-insensitive)
const SUPPORTED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Service for image file input/output operations
pub struct ImageIoService;

impl ImageIoService {
    /// Decode an image from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Image` when the bytes are not a decodable
    /// image.
    pub fn load_from_bytes(bytes: &[u8]) -> Result<DynamicImage> {
        image::load_from_memory(bytes)
            .map_err(|e| PipelineError::decode_error("failed to decode image from bytes", e))
    }

    /// Write fully encoded output bytes to `path`, creating parent
    /// directories as needed.
    ///
    /// The buffer is complete before the write starts; on a write failure the
    /// partial file is removed so the output tree stays
    /// fully-written-or-absent per file.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Io` on directory creation or write failures.
    pub fn write_output<P: AsRef<Path>>(path: P, encoded: &[u8]) -> Result<()> {
        let path_ref = path.as_ref();

        if let Some(parent) = path_ref.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| PipelineError::file_io_error("create output directory", parent, e))?;
        }

        if let Err(e) = std::fs::write(path_ref, encoded) {
            let _ = std::fs::remove_file(path_ref);
            return Err(PipelineError::file_io_error(
                "write output image",
                path_ref,
                e,
            ));
        }

        log::debug!("wrote {} bytes to {}", encoded.len(), path_ref.display());
        Ok(())
    }

    /// Check whether a path carries a supported raster-image extension.
    pub fn is_supported_extension<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| {
                let lowered = ext.to_lowercase();
                SUPPORTED_EXTENSIONS.contains(&lowered.as_str())
            })
    }

    /// Mirror `input`'s path relative to `input_root` onto `output_root`.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Processing` when `input` is not located under
    /// `input_root`.
    pub fn mirror_into(input: &Path, input_root: &Path, output_root: &Path) -> Result<PathBuf> {
        let relative = input.strip_prefix(input_root).map_err(|_| {
            PipelineError::processing(format!(
                "input '{}' is not under root '{}'",
                input.display(),
                input_root.display()
            ))
        })?;
        Ok(output_root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_extensions_case_insensitive() {
        assert!(ImageIoService::is_supported_extension("a.jpg"));
        assert!(ImageIoService::is_supported_extension("a.JPEG"));
        assert!(ImageIoService::is_supported_extension("dir/b.Png"));
        assert!(ImageIoService::is_supported_extension("c.WEBP"));

        assert!(!ImageIoService::is_supported_extension("a.gif"));
        assert!(!ImageIoService::is_supported_extension("a.txt"));
        assert!(!ImageIoService::is_supported_extension("noextension"));
        assert!(!ImageIoService::is_supported_extension("a.jpg.bak"));
    }

    #[test]
    fn test_mirror_into_preserves_subdirectories() {
        let out = ImageIoService::mirror_into(
            Path::new("/in/sub/dir/photo.jpg"),
            Path::new("/in"),
            Path::new("/out"),
        )
        .unwrap();
        assert_eq!(out, PathBuf::from("/out/sub/dir/photo.jpg"));
    }

    #[test]
    fn test_mirror_into_rejects_foreign_paths() {
        let err = ImageIoService::mirror_into(
            Path::new("/elsewhere/photo.jpg"),
            Path::new("/in"),
            Path::new("/out"),
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::Processing(_)));
    }

    #[test]
    fn test_load_from_bytes_rejects_garbage() {
        let err = ImageIoService::load_from_bytes(&[0u8; 16]).unwrap_err();
        assert!(matches!(err, PipelineError::Image(_)));
    }

    #[test]
    fn test_write_output_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/deep/out.png");
        ImageIoService::write_output(&target, b"data").unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"data");
    }
}
