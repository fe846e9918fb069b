//! RESv3 (monolithic binary) container support.
pub mod blocks;
pub mod header;
pub mod injection;

use chromres_core::bytes::ByteReader;
use chromres_core::channel::ChannelSet;
use chromres_core::errors::ResError;
use chromres_core::LoadSettings;

/// Channel name the canonical run name is read from, once loading has finished.
const RUN_NAME_CHANNEL: &str = "Logbook";

/// Parse a whole RESv3 buffer into a channel set and the resolved run/injection metadata.
pub struct V3LoadResult {
    pub channels: ChannelSet,
    pub run_name: String,
    pub injection_points: Vec<f64>,
    pub inj_sel: usize,
    pub inject_vol: f64,
    pub user: String,
}

pub fn load(bytes: &[u8], settings: &LoadSettings) -> Result<V3LoadResult, ResError> {
    let buf = ByteReader::new(bytes);

    if !header::is_supported(&buf) {
        return Err(ResError::UnsupportedFormat {
            msg: "file does not look like a RESv3 (UNICORN 3.10) result file".to_string(),
        });
    }

    let user = header::get_user(&buf)?;
    let entries = header::parse_directory(&buf)?;

    let injection_points = injection::discover_injection_points(&buf, &entries)?;
    let (inj_sel, inject_vol) =
        injection::resolve_inj_sel(&injection_points, settings.get_inj_sel());

    let mut channels = ChannelSet::new();
    for entry in &entries {
        if let Some(channel) =
            blocks::decode_channel(&buf, entry, inject_vol, settings.get_reduce())?
        {
            channels.insert(channel);
        }
    }
    let run_name = channels
        .get(RUN_NAME_CHANNEL)
        .map(|c| c.run_name.clone())
        .unwrap_or_default();

    Ok(V3LoadResult {
        channels,
        run_name,
        injection_points,
        inj_sel,
        inject_vol,
        user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chromres_core::{RES_MAGIC, V3_DIRECTORY_START, V3_ENTRY_LEN, V3_VERSION_STRING};

    fn directory_entry(magic: chromres_core::MagicId, label: &str, address: i32, block_size: i32) -> Vec<u8> {
        let mut v = vec![0u8; V3_ENTRY_LEN];
        v[0..8].copy_from_slice(&magic);
        let label_bytes = label.as_bytes();
        v[8..8 + label_bytes.len()].copy_from_slice(label_bytes);
        v[304..308].copy_from_slice(&block_size.to_le_bytes());
        v[312..316].copy_from_slice(&address.to_le_bytes());
        v[316..320].copy_from_slice(&0i32.to_le_bytes());
        v
    }

    /// Build a minimal but structurally valid RESv3 buffer with a single Logbook annotation
    /// block, for exercising `load()` end to end.
    fn minimal_v3_file() -> Vec<u8> {
        const LOGBOOK_ADDRESS: i32 = 2000;
        let mut buf = vec![0u8; LOGBOOK_ADDRESS as usize + 180];

        buf[0..16].copy_from_slice(&RES_MAGIC);
        buf[24..24 + V3_VERSION_STRING.len()].copy_from_slice(V3_VERSION_STRING.as_bytes());

        buf[V3_DIRECTORY_START..V3_DIRECTORY_START + V3_ENTRY_LEN].copy_from_slice(
            &directory_entry(chromres_core::MAGIC_LOGBOOK_A, "Run 1:UV_Logbook", LOGBOOK_ADDRESS, 180),
        );
        let sentinel_pos = V3_DIRECTORY_START + V3_ENTRY_LEN;
        buf[sentinel_pos..sentinel_pos + V3_ENTRY_LEN]
            .copy_from_slice(&directory_entry(chromres_core::MAGIC_LOGBOOK_SENTINEL, "", 0, 0));

        // One annotation record at the logbook block's address: volume 0.0, empty label.
        let record_start = LOGBOOK_ADDRESS as usize;
        buf[record_start + 8..record_start + 16].copy_from_slice(&0.0f64.to_le_bytes());

        let size = buf.len() as i32;
        buf[16..20].copy_from_slice(&size.to_le_bytes());
        buf
    }

    #[test]
    fn run_name_is_read_from_the_logbook_channel() {
        let bytes = minimal_v3_file();
        let result = load(&bytes, &LoadSettings::default()).unwrap();
        assert_eq!(result.run_name, "Run 1");
        assert!(result.channels.get("Logbook").is_some());
    }
}
