//! Loading the RESv6 outer archive and repairing its malformed inner archives (C6).
use std::collections::HashMap;
use std::io::{Cursor, Read};

use byteorder::{ByteOrder, LittleEndian};

use chromres_core::bytes::ByteReader;
use chromres_core::errors::ResError;
use chromres_core::{V6_BAD_LOCAL_HEADER_MAGIC, V6_EOCD_LEN, V6_EOCD_MAGIC, V6_STREAM_HEADER_LEN, V6_STREAM_TRAILER_LEN};

/// Every entry of the outer archive, keyed by its archive path, as raw bytes.
pub fn read_outer_archive(bytes: &[u8]) -> Result<HashMap<String, Vec<u8>>, ResError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut out = HashMap::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        out.insert(name, data);
    }
    Ok(out)
}

/// Does this entry look like one of the malformed inner archives?
pub fn looks_like_bad_inner_archive(bytes: &[u8]) -> bool {
    bytes.len() >= V6_BAD_LOCAL_HEADER_MAGIC.len() && bytes[..V6_BAD_LOCAL_HEADER_MAGIC.len()] == V6_BAD_LOCAL_HEADER_MAGIC
}

/// Truncate `bytes` so it ends exactly at the end of its last end-of-central-directory record,
/// discarding the trailing NUL padding that makes the entry unreadable as-is.
pub fn repair_inner_archive(bytes: &[u8]) -> Result<Vec<u8>, ResError> {
    let reader = ByteReader::new(bytes);
    let eocd_pos = reader
        .rfind(&V6_EOCD_MAGIC)
        .ok_or_else(|| ResError::MalformedBlock {
            kind: "inner-zip".to_string(),
            address: 0,
            msg: "no end-of-central-directory marker found while repairing inner archive"
                .to_string(),
        })?;
    let end = eocd_pos + V6_EOCD_LEN;
    if end > bytes.len() {
        return Err(ResError::TruncatedInput {
            at: eocd_pos,
            needed: V6_EOCD_LEN,
            len: bytes.len(),
        });
    }
    Ok(bytes[..end].to_vec())
}

/// Does `bytes` parse as a zip archive at all? Used to decide whether an outer-archive entry is
/// itself a nested archive worth exploding, as opposed to a plain data/XML stream.
pub fn is_zip_archive(bytes: &[u8]) -> bool {
    zip::ZipArchive::new(Cursor::new(bytes.to_vec())).is_ok()
}

/// Open an (already repaired) inner archive and return every entry's bytes keyed by name.
pub fn read_inner_archive(bytes: &[u8]) -> Result<HashMap<String, Vec<u8>>, ResError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec()))?;
    let mut out = HashMap::with_capacity(archive.len());
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let name = file.name().to_string();
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        out.insert(name, data);
    }
    Ok(out)
}

/// Decode a `CoordinateData.Volumes`/`CoordinateData.Amplitudes` stream: little-endian f32
/// samples, bracketed by a fixed header and trailer.
pub fn decode_float_stream(bytes: &[u8]) -> Result<Vec<f32>, ResError> {
    if bytes.len() < V6_STREAM_HEADER_LEN + V6_STREAM_TRAILER_LEN {
        return Err(ResError::TruncatedInput {
            at: 0,
            needed: V6_STREAM_HEADER_LEN + V6_STREAM_TRAILER_LEN,
            len: bytes.len(),
        });
    }
    let body = &bytes[V6_STREAM_HEADER_LEN..bytes.len() - V6_STREAM_TRAILER_LEN];
    if body.len() % 4 != 0 {
        return Err(ResError::MalformedBlock {
            kind: "float-stream".to_string(),
            address: V6_STREAM_HEADER_LEN,
            msg: format!("body length {} is not a multiple of 4", body.len()),
        });
    }
    Ok(body.chunks_exact(4).map(LittleEndian::read_f32).collect())
}

/// Decode a `DataType` entry: plain text, CR/LF trimmed.
pub fn decode_data_type_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .trim_matches(|c| c == '\r' || c == '\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_a_well_formed_zip_without_repair() {
        // An empty but structurally valid zip (just the end-of-central-directory record).
        let empty_zip: &[u8] = &[
            0x50, 0x4B, 0x05, 0x06, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        ];
        assert!(is_zip_archive(empty_zip));
        assert!(!is_zip_archive(b"not a zip at all"));
    }

    #[test]
    fn detects_bad_inner_archive_signature() {
        let mut bytes = V6_BAD_LOCAL_HEADER_MAGIC.to_vec();
        bytes.extend(vec![0u8; 10]);
        assert!(looks_like_bad_inner_archive(&bytes));
        assert!(!looks_like_bad_inner_archive(&[0x50, 0x4B, 0x03, 0x04]));
    }

    #[test]
    fn repairs_by_truncating_after_last_eocd() {
        let mut bytes = V6_BAD_LOCAL_HEADER_MAGIC.to_vec();
        bytes.extend(vec![0xAAu8; 20]);
        bytes.extend(V6_EOCD_MAGIC);
        bytes.extend(vec![0u8; 14]); // pad EOCD record to its 22-byte fixed length.
        let eocd_end = bytes.len();
        bytes.extend(vec![0u8; 100]); // trailing NUL padding.

        let repaired = repair_inner_archive(&bytes).unwrap();
        assert_eq!(repaired.len(), eocd_end);
    }

    #[test]
    fn decodes_float_stream_with_header_and_trailer() {
        let mut bytes = vec![0u8; V6_STREAM_HEADER_LEN];
        bytes.extend(1.5f32.to_le_bytes());
        bytes.extend(2.5f32.to_le_bytes());
        bytes.extend(vec![0u8; V6_STREAM_TRAILER_LEN]);

        let samples = decode_float_stream(&bytes).unwrap();
        assert_eq!(samples, vec![1.5, 2.5]);
    }

    #[test]
    fn data_type_text_is_trimmed() {
        assert_eq!(decode_data_type_text(b"Pressure\r\n"), "Pressure");
    }
}
