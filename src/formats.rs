//! Content-based image type detection.
//!
//! Only the leading magic bytes are inspected, so a PNG saved as `photo.jpg`
//! is still accepted and a text file named `logo.png` is not.

use image::{ImageFormat, ImageReader};
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Image types the compression service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn from_image_format(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(ImageKind::Jpeg),
            ImageFormat::Png => Some(ImageKind::Png),
            _ => None,
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageKind::Jpeg => "JPEG",
            ImageKind::Png => "PNG",
        };
        write!(f, "{}", name)
    }
}

/// What the file header says about a regular file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detected {
    Supported(ImageKind),
    /// Recognised image format the service does not handle (GIF, WebP, ...).
    Unsupported(ImageFormat),
    NotAnImage,
}

/// Reads the header of `path` and reports its image type.
pub fn detect_image_kind(path: &Path) -> io::Result<Detected> {
    // ImageReader::open would seed the format from the extension
    let file = BufReader::new(File::open(path)?);
    let reader = ImageReader::new(file).with_guessed_format()?;
    Ok(match reader.format() {
        Some(format) => match ImageKind::from_image_format(format) {
            Some(kind) => Detected::Supported(kind),
            None => Detected::Unsupported(format),
        },
        None => Detected::NotAnImage,
    })
}

/// Same as [`detect_image_kind`] for bytes already in memory.
pub fn detect_image_kind_from_bytes(bytes: &[u8]) -> Detected {
    match image::guess_format(bytes) {
        Ok(format) => match ImageKind::from_image_format(format) {
            Some(kind) => Detected::Supported(kind),
            None => Detected::Unsupported(format),
        },
        Err(_) => Detected::NotAnImage,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_detects_png_by_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("picture.jpg");
        fs::write(&path, PNG_HEADER).unwrap();

        let detected = detect_image_kind(&path).unwrap();
        assert_eq!(detected, Detected::Supported(ImageKind::Png));
    }

    #[test]
    fn test_detects_jpeg_without_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("picture");
        fs::write(&path, JPEG_HEADER).unwrap();

        let detected = detect_image_kind(&path).unwrap();
        assert_eq!(detected, Detected::Supported(ImageKind::Jpeg));
    }

    #[test]
    fn test_rejects_text_with_image_extension() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("logo.png");
        fs::write(&path, b"definitely not a png").unwrap();

        assert_eq!(detect_image_kind(&path).unwrap(), Detected::NotAnImage);
    }

    #[test]
    fn test_gif_is_recognised_but_unsupported() {
        assert_eq!(
            detect_image_kind_from_bytes(b"GIF89a\x01\x00\x01\x00"),
            Detected::Unsupported(ImageFormat::Gif)
        );
    }

    #[test]
    fn test_empty_file_is_not_an_image() {
        assert_eq!(detect_image_kind_from_bytes(&[]), Detected::NotAnImage);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(detect_image_kind(Path::new("/nonexistent/file.png")).is_err());
    }

    #[test]
    fn test_image_kind_display() {
        assert_eq!(ImageKind::Jpeg.to_string(), "JPEG");
        assert_eq!(ImageKind::Png.to_string(), "PNG");
    }
}
