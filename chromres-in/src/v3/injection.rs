//! Injection-point discovery and `inj_sel` resolution (C5).
use chromres_core::bytes::ByteReader;
use chromres_core::errors::ResError;

use super::blocks::{decode_annotation_block, is_injection};
use super::header::DirectoryEntry;

/// Enumerate every injection marker in raw-volume order, always starting with `0.0`.
///
/// This always decodes with `inject_vol = 0.0` regardless of any Document state, so there is no
/// window in which an unresolved injection volume could leak into the discovery pass. Only the
/// *first* record of each INJECT block is consulted -- an inject block with more than one record
/// only ever contributes its first volume to `injection_points`.
pub fn discover_injection_points(
    buf: &ByteReader,
    entries: &[DirectoryEntry],
) -> Result<Vec<f64>, ResError> {
    let mut points = vec![0.0];
    for entry in entries.iter().filter(|e| is_injection(e)) {
        if entry.block_size == 0 {
            continue;
        }
        let raw_points = decode_annotation_block(buf, entry, 0.0)?;
        if let Some(first) = raw_points.first() {
            if first.volume != 0.0 {
                points.push(first.volume);
            }
        }
    }
    Ok(points)
}

/// Resolve `inj_sel` against the discovered injection points, falling back to the last entry
/// (and logging a warning) if the selector is out of range.
///
/// Returns `(effective_index, inject_vol)`.
pub fn resolve_inj_sel(injection_points: &[f64], inj_sel: isize) -> (usize, f64) {
    debug_assert!(!injection_points.is_empty());
    let len = injection_points.len() as isize;
    let requested = if inj_sel < 0 { len + inj_sel } else { inj_sel };

    if requested < 0 || requested >= len {
        log::warn!(
            "{}",
            ResError::InjectionOutOfRange {
                requested: inj_sel,
                available: injection_points.len(),
            }
        );
        let last = injection_points.len() - 1;
        (last, injection_points[last])
    } else {
        let idx = requested as usize;
        (idx, injection_points[idx])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_injection_markers_yields_single_zero() {
        let buf = vec![0u8; 16];
        let reader = ByteReader::new(&buf);
        let points = discover_injection_points(&reader, &[]).unwrap();
        assert_eq!(points, vec![0.0]);
    }

    #[test]
    fn only_the_first_record_of_each_inject_block_is_used() {
        // Two 180-byte records in one INJECT block; only the first record's volume should be
        // picked up, even though the second record also has a non-zero volume.
        let record_bytes = |volume: f64| {
            let mut r = vec![0u8; 180];
            r[8..16].copy_from_slice(&volume.to_le_bytes());
            r
        };
        let mut buf = record_bytes(5.0);
        buf.extend(record_bytes(99.0));

        let entry = DirectoryEntry {
            magic_id: chromres_core::MAGIC_INJECT_A,
            run_name: String::new(),
            data_name: "Injection".to_string(),
            block_size: 360,
            offset_to_next: 0,
            address: 0,
            offset_to_data: 0,
        };
        let reader = ByteReader::new(&buf);
        let points = discover_injection_points(&reader, std::slice::from_ref(&entry)).unwrap();
        assert_eq!(points, vec![0.0, 5.0]);
    }

    #[test]
    fn negative_one_selects_the_last_point() {
        let points = vec![0.0, 5.0, 10.0];
        let (idx, inject_vol) = resolve_inj_sel(&points, -1);
        assert_eq!(idx, 2);
        assert_eq!(inject_vol, 10.0);
    }

    #[test]
    fn out_of_range_falls_back_to_last() {
        let points = vec![0.0, 5.0];
        let (idx, inject_vol) = resolve_inj_sel(&points, 99);
        assert_eq!(idx, 1);
        assert_eq!(inject_vol, 5.0);
    }

    #[test]
    fn in_range_index_is_used_directly() {
        let points = vec![0.0, 5.0, 10.0];
        let (idx, inject_vol) = resolve_inj_sel(&points, 1);
        assert_eq!(idx, 1);
        assert_eq!(inject_vol, 5.0);
    }
}
