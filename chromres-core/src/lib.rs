//! This library is the foundation for the `chromres-in` crate. It holds the shared data model
//! (channels, errors, settings) and the binary-format constants both container formats are
//! parsed against. It can be built either with serialization support, or in a slightly more
//! lightweight manner without it (see features).
#![allow(clippy::derive_partial_eq_without_eq)]

#[cfg(any(feature = "to_json", feature = "serde"))]
extern crate serde;
#[cfg(feature = "to_json")]
extern crate serde_json;

pub mod bytes;
pub mod channel;
pub mod codepage;
pub mod errors;
pub mod rounding;
pub mod settings;

pub use channel::{AnnotationPoint, Channel, ChannelData, ChannelSet, CurvePoint, V3DirectoryInfo};
pub use errors::ResError;
pub use rounding::round4;
pub use settings::LoadSettings;

/// Byte offset at which the RESv3 block directory begins.
pub const V3_DIRECTORY_START: usize = 686;
/// Byte width of a directory entry.
pub const V3_ENTRY_LEN: usize = 344;
/// Byte width of the structured portion of a directory entry (the remainder is padding).
pub const V3_ENTRY_STRUCT_LEN: usize = 320;
/// Number of bytes past the `LogBook_id` sentinel occurrence at which the directory ends.
pub const V3_DIRECTORY_END_OFFSET: usize = 342;

/// Width of the full text label field within a directory entry.
pub const V3_LABEL_LEN: usize = 296;

/// Width of an annotation-series record (logbook / inject / fraction entries).
pub const V3_ANNOTATION_RECORD_LEN: usize = 180;
/// Width of the structured portion of an annotation-series record.
pub const V3_ANNOTATION_STRUCT_LEN: usize = 174;
/// Width of a sensor-curve sample record (two little-endian i32s).
pub const V3_SENSOR_RECORD_LEN: usize = 8;
/// Byte offset, relative to a block's address, at which its unit string starts.
pub const V3_UNIT_OFFSET: usize = 207;
/// Width of the unit string field.
pub const V3_UNIT_LEN: usize = 15;

/// Width of the stored user-name field in the file header.
pub const V3_USER_NAME_LEN: usize = 40;
/// Byte offset of the stored user-name field in the file header.
pub const V3_USER_NAME_OFFSET: usize = 118;

/// 16-byte RESv3 file-header magic.
pub const RES_MAGIC: [u8; 16] = [
    0x11, 0x47, 0x11, 0x47, 0x18, 0x00, 0x00, 0x00, 0xB0, 0x02, 0x00, 0x00, 0x20, 0x6C, 0x03, 0x00,
];

/// Expected version string within the first 36 bytes of a RESv3 file.
pub const V3_VERSION_STRING: &str = "UNICORN 3.10";

/// 8-byte magic id identifying a directory entry's block kind.
pub type MagicId = [u8; 8];

pub const MAGIC_CNOTES: MagicId = [0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03, 0x22];
pub const MAGIC_METHODS: MagicId = [0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x01, 0x02];
pub const MAGIC_LOGBOOK_A: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x48, 0x04];
pub const MAGIC_LOGBOOK_B: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x49, 0x04];
pub const MAGIC_SENSDATA_A: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x01, 0x14];
pub const MAGIC_SENSDATA_B: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x02, 0x14];
pub const MAGIC_FRACTIONS_A: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x44, 0x04];
pub const MAGIC_FRACTIONS_B: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x45, 0x04];
pub const MAGIC_INJECT_A: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x46, 0x04];
pub const MAGIC_INJECT_B: MagicId = [0x00, 0x00, 0x01, 0x00, 0x04, 0x00, 0x47, 0x04];
/// Sentinel magic id; used only to locate the end of the directory, never materialized as a
/// channel.
pub const MAGIC_LOGBOOK_SENTINEL: MagicId = [0x00, 0x00, 0x01, 0x00, 0x02, 0x00, 0x01, 0x13];

/// Local-file-header magic used by a malformed inner zip archive (RESv6 only): a correct
/// signature followed by a non-standard general-purpose flag byte.
pub const V6_BAD_LOCAL_HEADER_MAGIC: [u8; 9] =
    [0x50, 0x4B, 0x03, 0x04, 0x2D, 0x00, 0x00, 0x00, 0x08];
/// End-of-central-directory marker; the repaired inner archive ends 22 bytes past its last
/// occurrence.
pub const V6_EOCD_MAGIC: [u8; 8] = [0x50, 0x4B, 0x05, 0x06, 0x00, 0x00, 0x00, 0x00];
/// Length of the end-of-central-directory record (fixed fields, no comment).
pub const V6_EOCD_LEN: usize = 22;
/// Number of header bytes to skip before the float samples in a RESv6 data stream entry.
pub const V6_STREAM_HEADER_LEN: usize = 47;
/// Number of trailing padding bytes to exclude from a RESv6 data stream entry.
pub const V6_STREAM_TRAILER_LEN: usize = 48;
