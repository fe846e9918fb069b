//! RESv6 (zip bundle + XML) container support.
pub mod bundle;
pub mod xml;
pub mod xml_tree;

use std::collections::HashMap;

use chromres_core::channel::ChannelSet;
use chromres_core::errors::ResError;

const RUN_DESCRIPTION_ENTRY: &str = "Chrom.1.Xml";
const MANIFEST_ENTRY: &str = "Manifest.xml";

pub struct V6LoadResult {
    pub channels: ChannelSet,
}

pub fn load(bytes: &[u8]) -> Result<V6LoadResult, ResError> {
    let outer = bundle::read_outer_archive(bytes)?;

    let xml_bytes = outer
        .get(RUN_DESCRIPTION_ENTRY)
        .ok_or_else(|| ResError::UnsupportedFormat {
            msg: format!("outer archive has no {} entry", RUN_DESCRIPTION_ENTRY),
        })?;

    // Manifest.xml lists every entry the archive considers a "document" rather than chromatogram
    // data (reports, plots, ...): for each direct child of the manifest root, the filename is
    // that child's own first child's text -- schema-agnostic, the same positional lookup the
    // original tooling used rather than a named `File`/`FileName` element.
    let mut manifest_entries: Vec<String> = Vec::new();
    if let Some(manifest_bytes) = outer.get(MANIFEST_ENTRY) {
        let document = xml_tree::parse(manifest_bytes)?;
        if let Some(manifest_root) = document.children.first() {
            for entry_el in &manifest_root.children {
                if let Some(name_el) = entry_el.children.first() {
                    if !name_el.text.is_empty() {
                        manifest_entries.push(name_el.text.clone());
                    }
                }
            }
        }
    }

    // Every outer-archive entry is a candidate nested archive, not just the ones that show the
    // known-bad signature: repair first when that signature is present, then try to open
    // whatever results as a zip. Entries that are plain data/XML streams simply fail to open and
    // are left out of `inner_streams`, the same way the original tooling's `is_zipfile` check
    // silently skips them.
    let mut inner_streams: HashMap<String, HashMap<String, Vec<u8>>> = HashMap::new();
    for (name, entry_bytes) in &outer {
        if name == RUN_DESCRIPTION_ENTRY || name == MANIFEST_ENTRY {
            continue;
        }
        if manifest_entries.iter().any(|m| m == name) {
            continue;
        }
        let candidate = if bundle::looks_like_bad_inner_archive(entry_bytes) {
            bundle::repair_inner_archive(entry_bytes)?
        } else {
            entry_bytes.clone()
        };
        if bundle::is_zip_archive(&candidate) {
            let entries = bundle::read_inner_archive(&candidate)?;
            inner_streams.insert(name.clone(), entries);
        }
    }

    let channels = xml::link_channels(xml_bytes, &inner_streams)?;

    let mut set = ChannelSet::new();
    for channel in channels {
        set.insert(channel);
    }

    Ok(V6LoadResult { channels: set })
}
