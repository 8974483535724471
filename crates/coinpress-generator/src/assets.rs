//! Image asset verification.
//!
//! Report images are fetched or generated into `imgs/YYYY/MM/DD/`. A failed
//! download tends to leave an HTML error page behind, so each file is checked
//! for a minimum size and a recognised image signature.

use std::{
    fmt, fs,
    io::Read,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info, warn};

/// Asset verification errors.
#[derive(Debug, Error)]
pub enum AssetError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The directory to verify does not exist.
    #[error("directory does not exist: {0}")]
    MissingDir(PathBuf),
}

/// Result type for asset operations.
pub type Result<T> = std::result::Result<T, AssetError>;

/// Files smaller than this are almost certainly error pages.
pub const DEFAULT_MIN_SIZE: u64 = 1024;

/// Image formats accepted by the verifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of a file.
    #[must_use]
    pub fn sniff(header: &[u8]) -> Option<Self> {
        match header {
            [0xFF, 0xD8, 0xFF, ..] => Some(Self::Jpeg),
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(Self::Png),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(Self::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(Self::Webp),
            _ => None,
        }
    }

    /// Lowercase format name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verification outcome for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStatus {
    /// A recognised image of acceptable size.
    Ok { format: ImageFormat, size: u64 },

    /// Smaller than the minimum size.
    TooSmall { size: u64 },

    /// No recognised image signature.
    NotAnImage { size: u64 },
}

impl AssetStatus {
    /// Whether the file passed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }
}

/// A verified file.
#[derive(Debug, Clone)]
pub struct AssetReport {
    pub file_name: String,
    pub status: AssetStatus,
}

impl fmt::Display for AssetReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            AssetStatus::Ok { format, size } => write!(
                f,
                "{}: OK ({format}, {:.1} KB)",
                self.file_name,
                *size as f64 / 1024.0
            ),
            AssetStatus::TooSmall { size } => write!(
                f,
                "{}: Too small ({size} bytes). Likely an error page.",
                self.file_name
            ),
            AssetStatus::NotAnImage { .. } => {
                write!(f, "{}: Not a valid image.", self.file_name)
            }
        }
    }
}

/// Result of verifying a directory.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    pub dir: PathBuf,
    pub assets: Vec<AssetReport>,
}

impl VerifyReport {
    /// Whether every file passed.
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.assets.iter().all(|a| a.status.is_ok())
    }

    /// Files that failed verification.
    pub fn failures(&self) -> impl Iterator<Item = &AssetReport> {
        self.assets.iter().filter(|a| !a.status.is_ok())
    }
}

/// Verifies the image files in a directory.
#[derive(Debug)]
pub struct AssetVerifier {
    min_size: u64,
}

impl Default for AssetVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetVerifier {
    /// Create a verifier with the default minimum size.
    #[must_use]
    pub fn new() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
        }
    }

    /// Set the minimum accepted file size in bytes.
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.min_size = min_size;
        self
    }

    /// Verify every regular file directly inside `dir`, sorted by name.
    pub fn verify(&self, dir: &Path) -> Result<VerifyReport> {
        info!(dir = %dir.display(), "verifying images");

        if !dir.is_dir() {
            return Err(AssetError::MissingDir(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                files.push(entry.path());
            }
        }
        files.sort();

        let mut assets = Vec::with_capacity(files.len());
        for path in files {
            let status = self.check_file(&path)?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if status.is_ok() {
                debug!(file = %file_name, ?status, "image ok");
            } else {
                warn!(file = %file_name, ?status, "image failed verification");
            }
            assets.push(AssetReport { file_name, status });
        }

        let report = VerifyReport {
            dir: dir.to_path_buf(),
            assets,
        };
        info!(
            files = report.assets.len(),
            failed = report.failures().count(),
            "image verification complete"
        );
        Ok(report)
    }

    /// Check one file.
    pub fn check_file(&self, path: &Path) -> Result<AssetStatus> {
        let size = fs::metadata(path)?.len();
        if size < self.min_size {
            return Ok(AssetStatus::TooSmall { size });
        }

        let mut header = [0u8; 12];
        let mut file = fs::File::open(path)?;
        let mut read = 0;
        while read < header.len() {
            match file.read(&mut header[read..])? {
                0 => break,
                n => read += n,
            }
        }

        Ok(match ImageFormat::sniff(&header[..read]) {
            Some(format) => AssetStatus::Ok { format, size },
            None => AssetStatus::NotAnImage { size },
        })
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn write_padded(dir: &Path, name: &str, header: &[u8], len: usize) {
        let mut bytes = header.to_vec();
        bytes.resize(len, 0);
        fs::write(dir.join(name), bytes).unwrap();
    }

    #[test]
    fn test_sniff_formats() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"GIF87a"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\x10\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"RIFF\x10\0\0\0WAVE"), None);
        assert_eq!(ImageFormat::sniff(b"<!DOCTYPE html>"), None);
        assert_eq!(ImageFormat::sniff(&[]), None);
    }

    #[test]
    fn test_verify_directory() {
        let dir = TempDir::new().unwrap();
        write_padded(dir.path(), "a_chart.png", PNG, 4096);
        write_padded(dir.path(), "b_error.jpg", b"<html>404</html>", 200);
        write_padded(dir.path(), "c_page.jpg", b"<!DOCTYPE html>", 2048);
        fs::create_dir(dir.path().join("nested")).unwrap();

        let report = AssetVerifier::new().verify(dir.path()).unwrap();

        assert_eq!(report.assets.len(), 3);
        assert!(!report.all_ok());
        assert_eq!(
            report.assets[0].status,
            AssetStatus::Ok {
                format: ImageFormat::Png,
                size: 4096
            }
        );
        assert_eq!(report.assets[1].status, AssetStatus::TooSmall { size: 200 });
        assert_eq!(report.assets[2].status, AssetStatus::NotAnImage { size: 2048 });
        assert_eq!(report.failures().count(), 2);
    }

    #[test]
    fn test_all_ok() {
        let dir = TempDir::new().unwrap();
        write_padded(dir.path(), "whale_exit.jpg", &[0xFF, 0xD8, 0xFF, 0xE1], 1024);

        let report = AssetVerifier::new().verify(dir.path()).unwrap();
        assert!(report.all_ok());
        assert_eq!(report.assets[0].to_string(), "whale_exit.jpg: OK (jpeg, 1.0 KB)");
    }

    #[test]
    fn test_min_size_override() {
        let dir = TempDir::new().unwrap();
        write_padded(dir.path(), "tiny.gif", b"GIF89a", 64);

        assert!(!AssetVerifier::new().verify(dir.path()).unwrap().all_ok());
        assert!(
            AssetVerifier::new()
                .with_min_size(16)
                .verify(dir.path())
                .unwrap()
                .all_ok()
        );
    }

    #[test]
    fn test_missing_directory() {
        let dir = TempDir::new().unwrap();
        let result = AssetVerifier::new().verify(&dir.path().join("imgs/2026/01/26"));
        assert!(matches!(result, Err(AssetError::MissingDir(_))));
    }
}
