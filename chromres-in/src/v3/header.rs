//! Parsing of the RESv3 block directory (C3).
use chromres_core::bytes::ByteReader;
use chromres_core::codepage::decode_fixed_text;
use chromres_core::errors::ResError;
use chromres_core::{
    MagicId, MAGIC_LOGBOOK_SENTINEL, RES_MAGIC, V3_DIRECTORY_END_OFFSET, V3_DIRECTORY_START,
    V3_ENTRY_LEN, V3_ENTRY_STRUCT_LEN, V3_LABEL_LEN, V3_USER_NAME_LEN, V3_USER_NAME_OFFSET,
    V3_VERSION_STRING,
};

/// One parsed directory entry, before dispatch to a specific block decoder.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub magic_id: MagicId,
    pub run_name: String,
    pub data_name: String,
    pub block_size: i32,
    pub offset_to_next: i32,
    pub address: i32,
    pub offset_to_data: i32,
}

impl DirectoryEntry {
    /// Absolute byte offset at which this block's data starts.
    pub fn data_start(&self) -> usize {
        (self.address + self.offset_to_data).max(0) as usize
    }

    /// Absolute byte offset one past this block's data.
    pub fn data_end(&self) -> usize {
        (self.address + self.block_size).max(0) as usize
    }
}

/// Split a decoded directory label into `(run_name, data_name)` per the source format's
/// `"<run>:<prefix>_<display>"` convention; labels without a colon have no run name.
fn split_label(label: &str) -> (String, String) {
    match label.split_once(':') {
        Some((run, rest)) => {
            let data_name = match rest.split_once('_') {
                Some((_, after)) => after.to_string(),
                None => rest.to_string(),
            };
            (run.to_string(), data_name)
        }
        None => (String::new(), label.to_string()),
    }
}

/// Check whether `buf` looks like a supported RESv3 file.
///
/// This never aborts parsing on its own: it logs which sub-check (if any) failed and returns a
/// boolean, mirroring the source format's non-fatal `input_check` diagnostic.
pub fn is_supported(buf: &ByteReader) -> bool {
    let magic_ok = match buf.slice(0, RES_MAGIC.len()) {
        Ok(bytes) => bytes == RES_MAGIC,
        Err(_) => {
            log::debug!("input_check: file shorter than the RESv3 magic header");
            false
        }
    };
    if !magic_ok {
        log::warn!("input_check: RESv3 magic header mismatch");
    }

    // The version string sits at relative offset 8 within the [16, 36) window, i.e. absolute
    // offset 24, and exactly fills the rest of that window (24 + 12 == 36).
    let version_ok = match buf.slice(24, V3_VERSION_STRING.len()) {
        Ok(bytes) => String::from_utf8_lossy(bytes) == V3_VERSION_STRING,
        Err(_) => false,
    };
    if !version_ok {
        log::warn!("input_check: RESv3 version string mismatch");
    }

    let size_ok = match buf.i32_le(16) {
        Ok(declared) => declared >= 0 && declared as usize == buf.len(),
        Err(_) => false,
    };
    if !size_ok {
        log::warn!("input_check: RESv3 declared file size does not match actual file size");
    }

    magic_ok && version_ok && size_ok
}

/// Read the stored user name from the file header (bytes 118..158).
pub fn get_user(buf: &ByteReader) -> Result<String, ResError> {
    let bytes = buf.slice(V3_USER_NAME_OFFSET, V3_USER_NAME_LEN)?;
    decode_fixed_text(bytes)
}

/// Walk the block directory, returning every entry in discovery order.
pub fn parse_directory(buf: &ByteReader) -> Result<Vec<DirectoryEntry>, ResError> {
    let sentinel_pos = buf
        .find(&MAGIC_LOGBOOK_SENTINEL, V3_DIRECTORY_START)
        .ok_or_else(|| ResError::UnsupportedFormat {
            msg: "could not locate the LogBook_id sentinel that terminates the block directory"
                .to_string(),
        })?;
    let directory_end = sentinel_pos + V3_DIRECTORY_END_OFFSET;

    let mut entries = Vec::new();
    let mut pos = V3_DIRECTORY_START;
    while pos + V3_ENTRY_STRUCT_LEN <= directory_end {
        let raw = buf.slice(pos, V3_ENTRY_STRUCT_LEN)?;

        let mut magic_id: MagicId = [0; 8];
        magic_id.copy_from_slice(&raw[0..8]);

        let label_bytes = &raw[8..8 + V3_LABEL_LEN];
        let label = decode_fixed_text(label_bytes)?;
        let (run_name, data_name) = split_label(&label);

        let block_size = ByteReader::new(&raw[304..308]).i32_le(0)?;
        let offset_to_next = ByteReader::new(&raw[308..312]).i32_le(0)?;
        let address = ByteReader::new(&raw[312..316]).i32_le(0)?;
        let offset_to_data = ByteReader::new(&raw[316..320]).i32_le(0)?;

        entries.push(DirectoryEntry {
            magic_id,
            run_name,
            data_name,
            block_size,
            offset_to_next,
            address,
            offset_to_data,
        });

        pos += V3_ENTRY_LEN;
    }

    Ok(entries)
}
