//! Image attachments for chat messages.

use crate::error::{CalcError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// An image validated and encoded for upload.
#[derive(Clone)]
pub struct ImageAttachment {
    /// Source file.
    pub path: PathBuf,
    /// Sniffed format.
    pub format: ImageFormat,
    /// Pixel dimensions.
    pub dimensions: (u32, u32),
    /// Size of the file in bytes.
    pub size: u64,
    /// Base64 payload without any prefix.
    pub base64: String,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("path", &self.path)
            .field("format", &self.format)
            .field("dimensions", &self.dimensions)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

impl ImageAttachment {
    /// Load an image file, rejecting anything over `max_bytes` or not an image.
    pub fn from_path(path: &Path, max_bytes: u64) -> Result<Self> {
        let size = std::fs::metadata(path)?.len();
        if size > max_bytes {
            return Err(CalcError::ImageTooLarge {
                size,
                limit: max_bytes,
            });
        }

        let bytes = std::fs::read(path)?;
        let format = image::guess_format(&bytes).map_err(|_| CalcError::unsupported_image(path))?;
        let dimensions = ImageReader::with_format(Cursor::new(&bytes), format)
            .into_dimensions()
            .map_err(|_| CalcError::unsupported_image(path))?;

        tracing::info!(
            "Attached {} ({:?}, {}x{}, {} bytes)",
            path.display(),
            format,
            dimensions.0,
            dimensions.1,
            size
        );

        Ok(Self {
            path: path.to_path_buf(),
            format,
            dimensions,
            size,
            base64: STANDARD.encode(&bytes),
        })
    }

    /// MIME type of the sniffed format.
    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// File name for display.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("dot.png");
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([200, 10, 10]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn png_is_accepted_and_encoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path());
        let attachment = ImageAttachment::from_path(&path, 1024 * 1024).unwrap();

        assert_eq!(attachment.format, ImageFormat::Png);
        assert_eq!(attachment.dimensions, (3, 2));
        assert_eq!(attachment.mime_type(), "image/png");
        assert!(attachment.base64.starts_with("iVBOR"));
        assert_eq!(attachment.file_name(), "dot.png");
    }

    #[test]
    fn text_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "definitely not an image").unwrap();
        let err = ImageAttachment::from_path(file.path(), 1024).unwrap_err();
        assert!(matches!(err, CalcError::UnsupportedImage { .. }));
    }

    #[test]
    fn oversize_file_is_rejected_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_png(dir.path());
        let err = ImageAttachment::from_path(&path, 4).unwrap_err();
        assert!(matches!(err, CalcError::ImageTooLarge { limit: 4, .. }));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ImageAttachment::from_path(Path::new("/no/such/file.png"), 1024).unwrap_err();
        assert!(matches!(err, CalcError::Io(_)));
    }
}
