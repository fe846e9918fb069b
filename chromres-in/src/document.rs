//! The `Document` lifecycle state machine (C10) and top-level export surface (C9).
use std::fs;
use std::path::Path;

use chromres_core::channel::{Channel, ChannelSet};
use chromres_core::errors::ResError;
use chromres_core::LoadSettings;

use crate::format::{detect_format, ResFormat};
use crate::v3;
use crate::v6;

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Unloaded,
    HeaderParsed,
    InjectionsResolved,
    Loaded,
}

/// A decoded UNICORN chromatography result file.
///
/// Construct with [`Document::open`], then call [`Document::load`]; every accessor below is
/// only meaningful once `load` has returned `Ok(())`. `load` is idempotent -- calling it again
/// on an already-loaded Document is a no-op.
pub struct Document {
    file_name: String,
    settings: LoadSettings,
    raw: Vec<u8>,
    state: State,
    format: Option<ResFormat>,
    channels: ChannelSet,
    run_name: String,
    injection_points: Vec<f64>,
    inj_sel: usize,
    inject_vol: f64,
    user: Option<String>,
}

impl Document {
    /// Read `file_name` into memory and prepare a Document for loading. Does not parse
    /// anything yet.
    pub fn open<P: AsRef<Path>>(file_name: P, settings: LoadSettings) -> Result<Self, ResError> {
        let path = file_name.as_ref();
        let raw = fs::read(path)?;
        Ok(Document {
            file_name: path.to_string_lossy().to_string(),
            settings,
            raw,
            state: State::Unloaded,
            format: None,
            channels: ChannelSet::new(),
            run_name: String::new(),
            injection_points: vec![0.0],
            inj_sel: 0,
            inject_vol: 0.0,
            user: None,
        })
    }

    /// Build a Document directly from bytes already in memory, e.g. for tests or for callers
    /// who have their own I/O layer.
    pub fn from_bytes(file_name: String, raw: Vec<u8>, settings: LoadSettings) -> Self {
        Document {
            file_name,
            settings,
            raw,
            state: State::Unloaded,
            format: None,
            channels: ChannelSet::new(),
            run_name: String::new(),
            injection_points: vec![0.0],
            inj_sel: 0,
            inject_vol: 0.0,
            user: None,
        }
    }

    /// Parse the source file and populate the channel set. Idempotent: a second call on an
    /// already-loaded Document returns immediately.
    pub fn load(&mut self) -> Result<(), ResError> {
        if self.state == State::Loaded {
            return Ok(());
        }

        let format = detect_format(&self.raw, &self.file_name).ok_or_else(|| {
            ResError::UnsupportedFormat {
                msg: format!(
                    "could not determine the RES container format of '{}'",
                    self.file_name
                ),
            }
        })?;
        self.format = Some(format);

        match format {
            ResFormat::V3 => self.load_v3()?,
            ResFormat::V6 => self.load_v6()?,
        }

        self.state = State::Loaded;
        Ok(())
    }

    fn load_v3(&mut self) -> Result<(), ResError> {
        // `v3::load` itself walks header -> injection resolution -> block decode in order; the
        // state transitions below are recorded around it since that function doesn't carry
        // Document state of its own.
        self.state = State::HeaderParsed;
        let result = v3::load(&self.raw, &self.settings)?;
        self.state = State::InjectionsResolved;

        self.user = Some(result.user);
        self.channels = result.channels;
        self.run_name = result.run_name;
        self.injection_points = result.injection_points;
        self.inj_sel = result.inj_sel;
        self.inject_vol = result.inject_vol;
        Ok(())
    }

    fn load_v6(&mut self) -> Result<(), ResError> {
        // RESv6 carries no separate header/injection phase (Data Model invariant 9): the
        // archive and its XML are parsed and linked in one pass.
        self.state = State::HeaderParsed;
        self.injection_points = vec![0.0];
        self.inj_sel = 0;
        self.inject_vol = 0.0;
        self.state = State::InjectionsResolved;

        let result = v6::load(&self.raw)?;
        self.channels = result.channels;
        self.run_name = String::new();
        Ok(())
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn run_name(&self) -> &str {
        &self.run_name
    }

    pub fn injection_points(&self) -> &[f64] {
        &self.injection_points
    }

    /// Index into [`Document::injection_points`] selected as the rebasing origin.
    pub fn inj_sel(&self) -> usize {
        self.inj_sel
    }

    pub fn inject_vol(&self) -> f64 {
        self.inject_vol
    }

    pub fn reduce(&self) -> usize {
        self.settings.get_reduce()
    }

    /// The stored instrument user name (RESv3 only; always `None` for RESv6).
    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    pub fn get_channel(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.names()
    }

    pub fn is_loaded(&self) -> bool {
        self.state == State::Loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn document_is_send_and_sync_once_loaded() {
        assert_send_sync::<Document>();
    }

    #[test]
    fn load_is_idempotent_on_an_unsupported_buffer() {
        let mut doc = Document::from_bytes("x.res".to_string(), vec![0u8; 4], LoadSettings::default());
        assert!(doc.load().is_err());
        assert!(!doc.is_loaded());
    }
}
