//! Container format detection.
use chromres_core::RES_MAGIC;

/// Which container format a source file uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResFormat {
    V3,
    V6,
}

/// Detect the format of `bytes`, preferring the magic bytes over the file extension, but
/// falling back to the extension when the magic bytes are inconclusive (a v6 bundle is just a
/// zip file and is otherwise indistinguishable from any other archive until its entries are
/// inspected).
pub fn detect_format(bytes: &[u8], file_name: &str) -> Option<ResFormat> {
    if bytes.len() >= RES_MAGIC.len() && bytes[..RES_MAGIC.len()] == RES_MAGIC {
        return Some(ResFormat::V3);
    }
    if bytes.len() >= 4 && &bytes[0..2] == b"PK" {
        return Some(ResFormat::V6);
    }
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".res") {
        Some(ResFormat::V3)
    } else if lower.ends_with(".zip") {
        Some(ResFormat::V6)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_v3_by_magic() {
        let mut bytes = RES_MAGIC.to_vec();
        bytes.extend(vec![0u8; 32]);
        assert_eq!(detect_format(&bytes, "anything"), Some(ResFormat::V3));
    }

    #[test]
    fn detects_v6_by_zip_signature() {
        let bytes = [0x50, 0x4B, 0x03, 0x04];
        assert_eq!(detect_format(&bytes, "anything"), Some(ResFormat::V6));
    }

    #[test]
    fn falls_back_to_extension() {
        assert_eq!(detect_format(&[], "run.res"), Some(ResFormat::V3));
        assert_eq!(detect_format(&[], "run.zip"), Some(ResFormat::V6));
        assert_eq!(detect_format(&[], "run.dat"), None);
    }
}
