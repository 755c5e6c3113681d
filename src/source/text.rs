//! Byte-level text decoding helpers.

/// Decode a PDF string without font information.
///
/// Handles UTF-16BE (with BOM), then UTF-8, then falls back to Latin-1,
/// which matches PDFDocEncoding for the printable range.
pub fn decode_pdf_string(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }

    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Whether a character belongs to a script written without word spaces.
///
/// Chinese and Japanese do not separate words; Korean does, so Hangul is
/// not included.
pub fn is_spaceless_script_char(c: char) -> bool {
    matches!(c as u32,
        0x4E00..=0x9FFF        // CJK Unified Ideographs
        | 0x3400..=0x4DBF      // Extension A
        | 0x20000..=0x2EBEF    // Extensions B-F
        | 0x3040..=0x309F      // Hiragana
        | 0x30A0..=0x30FF      // Katakana
        | 0x3000..=0x303F      // CJK punctuation
        | 0xFF00..=0xFFEF      // Halfwidth and fullwidth forms
    )
}
