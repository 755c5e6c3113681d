//! PDF header detection.
//!
//! Documents are checked before they are handed to the parser so that a
//! request pointing at a non-PDF file fails with a clear error instead of a
//! parser-specific one.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Readers tolerate leading garbage before the header, within this window.
const HEADER_SEARCH_WINDOW: usize = 1024;

/// Version found in a PDF header, e.g. `1.7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfVersion {
    pub major: u8,
    pub minor: u8,
}

impl std::fmt::Display for PdfVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Read the start of a file and check for a PDF header.
pub fn check_file<P: AsRef<Path>>(path: P) -> Result<PdfVersion> {
    let file = File::open(path)?;
    let mut head = Vec::with_capacity(HEADER_SEARCH_WINDOW);
    file.take(HEADER_SEARCH_WINDOW as u64).read_to_end(&mut head)?;
    check_bytes(&head)
}

/// Check that `data` carries a `%PDF-x.y` header within the search window.
pub fn check_bytes(data: &[u8]) -> Result<PdfVersion> {
    let window = &data[..data.len().min(HEADER_SEARCH_WINDOW)];
    let start = window
        .windows(PDF_MAGIC.len())
        .position(|w| w == PDF_MAGIC)
        .ok_or(Error::UnknownFormat)?;

    let version = window
        .get(start + PDF_MAGIC.len()..start + PDF_MAGIC.len() + VERSION_LEN)
        .ok_or(Error::UnknownFormat)?;

    match version {
        [major @ b'0'..=b'9', b'.', minor @ b'0'..=b'9'] => Ok(PdfVersion {
            major: major - b'0',
            minor: minor - b'0',
        }),
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).into_owned(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_detect_valid_pdf() {
        let version = check_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap();
        assert_eq!(version, PdfVersion { major: 1, minor: 7 });
        assert_eq!(version.to_string(), "1.7");
    }

    #[test]
    fn test_detect_with_leading_garbage() {
        let version = check_bytes(b"\x00\x00junk%PDF-2.0\n").unwrap();
        assert_eq!(version.to_string(), "2.0");
    }

    #[test]
    fn test_detect_invalid_format() {
        assert!(matches!(
            check_bytes(b"<!DOCTYPE html>"),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(check_bytes(b""), Err(Error::UnknownFormat)));
        assert!(matches!(check_bytes(b"%PDF-1"), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_detect_bad_version() {
        assert!(matches!(
            check_bytes(b"%PDF-x.y\n"),
            Err(Error::UnsupportedVersion(v)) if v == "x.y"
        ));
    }

    #[test]
    fn test_check_short_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF").unwrap();
        assert!(matches!(check_file(file.path()), Err(Error::UnknownFormat)));
        assert!(matches!(check_bytes(b"%PDF"), Err(Error::UnknownFormat)));
    }
}
