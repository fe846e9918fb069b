//! This library parses UNICORN chromatography RES result files, in both the monolithic RESv3
//! (UNICORN 3.10) layout and the zip/XML RESv6 bundle layout, into a single unified channel
//! model.
//!
//! Construct a [`Document`] with [`Document::open`] (or [`Document::from_bytes`] if the caller
//! already has the file in memory), call [`Document::load`], then iterate its channels.
pub mod document;
pub mod format;
pub mod v3;
pub mod v6;

pub use chromres_core::channel::{
    AnnotationPoint, Channel, ChannelData, ChannelSet, CurvePoint, V3DirectoryInfo,
};
pub use chromres_core::errors::ResError;
pub use chromres_core::settings::LoadSettings;
pub use document::Document;
pub use format::ResFormat;
