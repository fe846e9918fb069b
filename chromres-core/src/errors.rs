//! Error types shared by the core data model and the parsing crate.
use thiserror::Error;

/// All ways in which decoding a RES file can fail.
///
/// `InjectionOutOfRange` is the only variant that is ever recovered from automatically (the
/// loader falls back to the last known injection point and logs a warning); every other variant
/// aborts the current `load` call.
#[derive(Debug, Error)]
pub enum ResError {
    /// Magic bytes, version string or declared file size did not match what was expected.
    #[error("unsupported file format: {msg}")]
    UnsupportedFormat { msg: String },

    /// A fixed-width read ran past the end of the buffer or of a declared block.
    #[error("truncated input: tried to read {needed} bytes at offset {at}, buffer has {len}")]
    TruncatedInput {
        at: usize,
        needed: usize,
        len: usize,
    },

    /// A block's internal structure did not match the layout its magic id promised.
    #[error("malformed block {kind} at address {address}: {msg}")]
    MalformedBlock {
        kind: String,
        address: usize,
        msg: String,
    },

    /// The code-page decoder produced an invalid sequence.
    #[error("could not decode text: {msg}")]
    DecodeError { msg: String },

    /// `inj_sel` pointed past the end of `injection_points`.
    ///
    /// This is always recovered from (the caller falls back to the last injection point); the
    /// variant exists so the recovery can also be reported as a normal [`Result`] to callers
    /// who want to detect it directly rather than grep the log.
    #[error("injection selector {requested} is out of range (have {available} injection points); falling back to the last one")]
    InjectionOutOfRange { requested: isize, available: usize },

    /// Wrapped I/O error, e.g. while reading the source file from disk.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapped outer/inner zip archive error (RESv6 only).
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),

    /// Wrapped XML parsing error (RESv6 only).
    #[error(transparent)]
    Xml(#[from] quick_xml::Error),

    /// Wrapped XML attribute parsing error (RESv6 only).
    #[error(transparent)]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    #[cfg(feature = "to_json")]
    /// Serialisation/Deserialisation error.
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
}
