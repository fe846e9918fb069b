//! Decoding of RESv3 block bodies once the directory has identified their kind and bounds (C4).
use byteorder::{ByteOrder, LittleEndian};

use chromres_core::bytes::ByteReader;
use chromres_core::channel::{AnnotationPoint, Channel, ChannelData, CurvePoint, V3DirectoryInfo};
use chromres_core::codepage::{decode_fixed_text, decode_text};
use chromres_core::errors::ResError;
use chromres_core::round4;
use chromres_core::{
    MAGIC_CNOTES, MAGIC_FRACTIONS_A, MAGIC_FRACTIONS_B, MAGIC_INJECT_A, MAGIC_INJECT_B,
    MAGIC_LOGBOOK_A, MAGIC_LOGBOOK_B, MAGIC_METHODS, MAGIC_SENSDATA_A, MAGIC_SENSDATA_B,
    V3_ANNOTATION_RECORD_LEN, V3_ANNOTATION_STRUCT_LEN, V3_SENSOR_RECORD_LEN, V3_UNIT_LEN,
    V3_UNIT_OFFSET,
};

use super::header::DirectoryEntry;

/// What kind of payload a directory entry's magic id identifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Text,
    Annotation,
    Sensor,
    Unknown,
}

pub fn classify(entry: &DirectoryEntry) -> BlockKind {
    match entry.magic_id {
        m if m == MAGIC_CNOTES || m == MAGIC_METHODS => BlockKind::Text,
        m if m == MAGIC_LOGBOOK_A
            || m == MAGIC_LOGBOOK_B
            || m == MAGIC_INJECT_A
            || m == MAGIC_INJECT_B
            || m == MAGIC_FRACTIONS_A
            || m == MAGIC_FRACTIONS_B =>
        {
            BlockKind::Annotation
        }
        m if m == MAGIC_SENSDATA_A || m == MAGIC_SENSDATA_B => BlockKind::Sensor,
        _ => BlockKind::Unknown,
    }
}

pub fn is_injection(entry: &DirectoryEntry) -> bool {
    entry.magic_id == MAGIC_INJECT_A || entry.magic_id == MAGIC_INJECT_B
}

/// Divisor applied to a sensor curve's raw amplitude, chosen by channel name.
fn amplitude_divisor(data_name: &str) -> f64 {
    if data_name.contains("UV") || data_name == "Cond" || data_name == "Flow" {
        1000.0
    } else if data_name.contains("Pressure") {
        100.0
    } else {
        10.0
    }
}

/// Decode an annotation-series block (logbook / inject / fraction entries).
///
/// `inject_vol` is applied to every record's raw volume before rebasing; pass `0.0` to read raw
/// volumes (as the injection resolver does during discovery).
pub fn decode_annotation_block(
    buf: &ByteReader,
    entry: &DirectoryEntry,
    inject_vol: f64,
) -> Result<Vec<AnnotationPoint>, ResError> {
    let start = entry.data_start();
    let end = entry.data_end();
    if end < start {
        return Err(ResError::MalformedBlock {
            kind: "annotation".to_string(),
            address: entry.address.max(0) as usize,
            msg: "block end precedes block start".to_string(),
        });
    }
    let len = end - start;
    if len % V3_ANNOTATION_RECORD_LEN != 0 {
        return Err(ResError::MalformedBlock {
            kind: "annotation".to_string(),
            address: entry.address.max(0) as usize,
            msg: format!(
                "block length {} is not a multiple of the {}-byte record stride",
                len, V3_ANNOTATION_RECORD_LEN
            ),
        });
    }

    let mut points = Vec::with_capacity(len / V3_ANNOTATION_RECORD_LEN);
    let mut pos = start;
    while pos + V3_ANNOTATION_STRUCT_LEN <= end {
        let record = buf.slice(pos, V3_ANNOTATION_STRUCT_LEN)?;
        let raw_volume = LittleEndian::read_f64(&record[8..16]);
        let label = decode_fixed_text(&record[16..V3_ANNOTATION_STRUCT_LEN])?;
        points.push(AnnotationPoint {
            volume: round4(raw_volume - inject_vol),
            label,
        });
        pos += V3_ANNOTATION_RECORD_LEN;
    }
    Ok(points)
}

/// Decode a text-metadata block (CNOTES / METHODS).
pub fn decode_text_block(buf: &ByteReader, entry: &DirectoryEntry) -> Result<String, ResError> {
    let start = entry.data_start();
    let declared_end = entry.data_end();
    let declared = buf.slice(start, declared_end.saturating_sub(start))?;

    let last_newline = declared
        .iter()
        .rposition(|&b| b == b'\n')
        .ok_or_else(|| ResError::MalformedBlock {
            kind: "text".to_string(),
            address: entry.address.max(0) as usize,
            msg: "no newline found within the declared block range".to_string(),
        })?;

    let text = decode_text(&declared[..=last_newline])?;
    if !text.contains('\r') {
        Ok(text.replace('\n', "\r\n"))
    } else {
        Ok(text)
    }
}

/// Decode a sensor-curve block (SENSDATA), applying scaling, unit normalization and decimation.
pub fn decode_sensor_block(
    buf: &ByteReader,
    entry: &DirectoryEntry,
    inject_vol: f64,
    reduce: usize,
) -> Result<(String, Vec<CurvePoint>), ResError> {
    let unit_bytes = buf.slice((entry.address.max(0) as usize) + V3_UNIT_OFFSET, V3_UNIT_LEN)?;
    let mut unit = decode_fixed_text(unit_bytes)?;
    unit = unit.trim().to_string();
    if unit == "C" {
        unit = "\u{b0}C".to_string();
    }

    let start = entry.data_start();
    let end = entry.data_end();
    if end < start {
        return Err(ResError::MalformedBlock {
            kind: "sensor".to_string(),
            address: entry.address.max(0) as usize,
            msg: "block end precedes block start".to_string(),
        });
    }
    let len = end - start;
    if len % V3_SENSOR_RECORD_LEN != 0 {
        return Err(ResError::MalformedBlock {
            kind: "sensor".to_string(),
            address: entry.address.max(0) as usize,
            msg: format!(
                "block length {} is not a multiple of the {}-byte record stride",
                len, V3_SENSOR_RECORD_LEN
            ),
        });
    }

    let divisor = amplitude_divisor(&entry.data_name);
    let mut samples = Vec::new();
    let mut pos = start;
    let mut index = 0usize;
    while pos + V3_SENSOR_RECORD_LEN <= end {
        if reduce == 0 || index % reduce == 0 {
            let record = buf.slice(pos, V3_SENSOR_RECORD_LEN)?;
            let v_raw = LittleEndian::read_i32(&record[0..4]);
            let a_raw = LittleEndian::read_i32(&record[4..8]);
            samples.push(CurvePoint {
                volume: round4(v_raw as f64 / 100.0 - inject_vol),
                amplitude: a_raw as f64 / divisor,
            });
        }
        pos += V3_SENSOR_RECORD_LEN;
        index += 1;
    }
    Ok((unit, samples))
}

/// Build the `Channel` for a directory entry, or `None` if the block is empty or of an unknown
/// kind (including the directory-terminating sentinel).
pub fn decode_channel(
    buf: &ByteReader,
    entry: &DirectoryEntry,
    inject_vol: f64,
    reduce: usize,
) -> Result<Option<Channel>, ResError> {
    if entry.block_size == 0 {
        return Ok(None);
    }
    let data = match classify(entry) {
        BlockKind::Text => ChannelData::Meta {
            text: decode_text_block(buf, entry)?,
        },
        BlockKind::Annotation => ChannelData::Annotation {
            points: decode_annotation_block(buf, entry, inject_vol)?,
        },
        BlockKind::Sensor => {
            let (unit, samples) = decode_sensor_block(buf, entry, inject_vol, reduce)?;
            ChannelData::Curve { unit, samples }
        }
        BlockKind::Unknown => return Ok(None),
    };
    let channel = Channel::new(entry.run_name.clone(), entry.data_name.clone(), data).with_v3_info(
        V3DirectoryInfo {
            magic_id: entry.magic_id,
            block_size: entry.block_size,
            offset_to_next: entry.offset_to_next,
            address: entry.address,
            offset_to_data: entry.offset_to_data,
        },
    );
    Ok(Some(channel))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(magic_id: chromres_core::MagicId, data_name: &str, address: i32, offset_to_data: i32, block_size: i32) -> DirectoryEntry {
        DirectoryEntry {
            magic_id,
            run_name: "Run 1".to_string(),
            data_name: data_name.to_string(),
            block_size,
            offset_to_next: 0,
            address,
            offset_to_data,
        }
    }

    #[test]
    fn divisors_follow_channel_name() {
        assert_eq!(amplitude_divisor("UV1_280"), 1000.0);
        assert_eq!(amplitude_divisor("Cond"), 1000.0);
        assert_eq!(amplitude_divisor("Flow"), 1000.0);
        assert_eq!(amplitude_divisor("Pressure"), 100.0);
        assert_eq!(amplitude_divisor("Temp"), 10.0);
    }

    #[test]
    fn decodes_a_sensor_curve_with_scaling() {
        let mut buf = vec![0u8; 1024];
        // unit field at address + 207.
        buf[207..207 + 1].copy_from_slice(b"m");
        // two 8-byte samples at offset_to_data (0) relative to address 0.
        buf[0..4].copy_from_slice(&500i32.to_le_bytes());
        buf[4..8].copy_from_slice(&12345i32.to_le_bytes());
        buf[8..12].copy_from_slice(&600i32.to_le_bytes());
        buf[12..16].copy_from_slice(&22345i32.to_le_bytes());

        let e = entry(chromres_core::MAGIC_SENSDATA_A, "UV1_280", 0, 0, 16);
        let reader = ByteReader::new(&buf);
        let (unit, samples) = decode_sensor_block(&reader, &e, 5.0, 1).unwrap();
        assert_eq!(unit, "m");
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].volume, round4(5.00 - 5.0));
        assert_eq!(samples[0].amplitude, 12.345);
        assert_eq!(samples[1].amplitude, 22.345);
    }

    #[test]
    fn sensor_reduce_keeps_every_nth_sample() {
        let mut buf = vec![0u8; 64];
        for i in 0..4i32 {
            let off = (i as usize) * 8;
            buf[off..off + 4].copy_from_slice(&(i * 100).to_le_bytes());
            buf[off + 4..off + 8].copy_from_slice(&(i * 1000).to_le_bytes());
        }
        let e = entry(chromres_core::MAGIC_SENSDATA_A, "Temp", 0, 0, 32);
        let reader = ByteReader::new(&buf);
        let (_unit, samples) = decode_sensor_block(&reader, &e, 0.0, 2).unwrap();
        assert_eq!(samples.len(), 2);
    }

    #[test]
    fn unit_c_is_rewritten_to_degree_c() {
        let mut buf = vec![0u8; 256];
        buf[207] = b'C';
        let e = entry(chromres_core::MAGIC_SENSDATA_A, "Temp", 0, 0, 0);
        let reader = ByteReader::new(&buf);
        let (unit, _samples) = decode_sensor_block(&reader, &e, 0.0, 1).unwrap();
        assert_eq!(unit, "\u{b0}C");
    }

    #[test]
    fn text_block_rewrites_bare_newlines() {
        let mut buf = b"line one\nline two\n".to_vec();
        buf.extend(vec![0u8; 16]);
        let e = entry(chromres_core::MAGIC_CNOTES, "Notes", 0, 0, 19);
        let reader = ByteReader::new(&buf);
        let text = decode_text_block(&reader, &e).unwrap();
        assert_eq!(text, "line one\r\nline two\r\n");
    }

    #[test]
    fn text_block_without_newline_is_malformed() {
        let buf = b"no newline here".to_vec();
        let e = entry(chromres_core::MAGIC_CNOTES, "Notes", 0, 0, buf.len() as i32);
        let reader = ByteReader::new(&buf);
        assert!(decode_text_block(&reader, &e).is_err());
    }

    #[test]
    fn zero_size_block_yields_no_channel() {
        let buf = vec![0u8; 16];
        let e = entry(chromres_core::MAGIC_CNOTES, "Notes", 0, 0, 0);
        let reader = ByteReader::new(&buf);
        assert!(decode_channel(&reader, &e, 0.0, 1).unwrap().is_none());
    }

    #[test]
    fn decoded_channel_carries_its_directory_fields() {
        let mut buf = b"line one\n".to_vec();
        buf.extend(vec![0u8; 16]);
        let e = entry(chromres_core::MAGIC_CNOTES, "Notes", 0, 0, 9);
        let reader = ByteReader::new(&buf);
        let channel = decode_channel(&reader, &e, 0.0, 1).unwrap().unwrap();
        let info = channel.v3_info.unwrap();
        assert_eq!(info.magic_id, chromres_core::MAGIC_CNOTES);
        assert_eq!(info.block_size, 9);
        assert_eq!(info.address, 0);
    }
}
