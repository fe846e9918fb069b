//! The unified channel model shared by both container formats.
use indexmap::IndexMap;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One (volume, label) event, e.g. a logbook entry, a fraction mark or an injection mark.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct AnnotationPoint {
    pub volume: f64,
    pub label: String,
}

/// One (volume, amplitude) sample of a sensor curve.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct CurvePoint {
    pub volume: f64,
    pub amplitude: f64,
}

/// The payload of a channel, tagged by kind.
///
/// This replaces the duck-typed per-channel attribute dictionary used by the original tooling:
/// every channel is exactly one of these three shapes, never a grab-bag of optional fields.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum ChannelData {
    /// A stored text blob (method description, run notes).
    Meta { text: String },
    /// A sparse (volume, label) event stream.
    Annotation { points: Vec<AnnotationPoint> },
    /// A dense (volume, amplitude) sample stream with a physical unit.
    Curve { unit: String, samples: Vec<CurvePoint> },
}

impl ChannelData {
    /// The `data_type` tag as consumers of the original tool would recognise it.
    pub fn data_type(&self) -> &'static str {
        match self {
            ChannelData::Meta { .. } => "meta",
            ChannelData::Annotation { .. } => "annotation",
            ChannelData::Curve { .. } => "curve",
        }
    }
}

/// The raw RESv3 directory fields a channel was decoded from, kept around for debugging and for
/// re-reading the block straight out of the source buffer. `None` for channels that came from a
/// RESv6 bundle, which has no block directory of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct V3DirectoryInfo {
    pub magic_id: [u8; 8],
    pub block_size: i32,
    pub offset_to_next: i32,
    pub address: i32,
    pub offset_to_data: i32,
}

/// A named channel plus the bookkeeping fields every channel carries regardless of its kind.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct Channel {
    /// The run name this channel was recorded under; may be empty.
    pub run_name: String,
    /// The display name used to look the channel up (e.g. `"UV 1_280"`).
    pub data_name: String,
    pub data: ChannelData,
    /// RESv3 block directory fields, for debugging and re-reading; `None` for RESv6 channels.
    pub v3_info: Option<V3DirectoryInfo>,
}

impl Channel {
    pub fn new(run_name: String, data_name: String, data: ChannelData) -> Self {
        Channel {
            run_name,
            data_name,
            data,
            v3_info: None,
        }
    }

    pub fn with_v3_info(mut self, info: V3DirectoryInfo) -> Self {
        self.v3_info = Some(info);
        self
    }

    pub fn data_type(&self) -> &'static str {
        self.data.data_type()
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            ChannelData::Meta { text } => Some(text),
            _ => None,
        }
    }

    pub fn as_annotation(&self) -> Option<&[AnnotationPoint]> {
        match &self.data {
            ChannelData::Annotation { points } => Some(points),
            _ => None,
        }
    }

    pub fn as_curve(&self) -> Option<(&str, &[CurvePoint])> {
        match &self.data {
            ChannelData::Curve { unit, samples } => Some((unit, samples)),
            _ => None,
        }
    }
}

/// An insertion-ordered collection of channels keyed by `data_name`.
///
/// Later directory entries for an already-seen name update the existing record in place rather
/// than appending a duplicate, so discovery order is preserved even when the source file
/// republishes a channel.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub struct ChannelSet {
    channels: IndexMap<String, Channel>,
}

impl ChannelSet {
    pub fn new() -> Self {
        ChannelSet {
            channels: IndexMap::new(),
        }
    }

    /// Insert or update a channel by its `data_name`. Returns the previous entry, if any.
    pub fn insert(&mut self, channel: Channel) -> Option<Channel> {
        self.channels.insert(channel.data_name.clone(), channel)
    }

    pub fn get(&self, name: &str) -> Option<&Channel> {
        self.channels.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Channel> {
        self.channels.shift_remove(name)
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Channel> {
        self.channels.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(|s| s.as_str())
    }
}

impl<'a> IntoIterator for &'a ChannelSet {
    type Item = (&'a String, &'a Channel);
    type IntoIter = indexmap::map::Iter<'a, String, Channel>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_is_preserved() {
        let mut set = ChannelSet::new();
        set.insert(Channel::new(
            String::new(),
            "B".into(),
            ChannelData::Meta { text: String::new() },
        ));
        set.insert(Channel::new(
            String::new(),
            "A".into(),
            ChannelData::Meta { text: String::new() },
        ));
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[test]
    fn duplicate_name_updates_in_place() {
        let mut set = ChannelSet::new();
        set.insert(Channel::new(
            String::new(),
            "A".into(),
            ChannelData::Meta { text: "first".into() },
        ));
        set.insert(Channel::new(
            String::new(),
            "B".into(),
            ChannelData::Meta { text: String::new() },
        ));
        set.insert(Channel::new(
            String::new(),
            "A".into(),
            ChannelData::Meta { text: "second".into() },
        ));
        assert_eq!(set.len(), 2);
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(set.get("A").unwrap().as_text(), Some("second"));
    }
}
