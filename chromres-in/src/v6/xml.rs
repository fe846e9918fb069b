//! Binding the run-description XML to the decoded binary streams (C7).
use std::collections::HashMap;

use chromres_core::channel::{AnnotationPoint, Channel, ChannelData, CurvePoint};
use chromres_core::errors::ResError;

use super::bundle::decode_float_stream;
use super::xml_tree::{parse, XmlElement};

/// A curve as described by the XML, before it has been paired with its binary samples.
struct CurveDescriptor {
    name: String,
    unit: String,
    internal_filename: Option<String>,
}

struct EventCurveDescriptor {
    name: String,
    is_original_data: bool,
    events: Vec<AnnotationPoint>,
}

fn curve_descriptor(curve: &XmlElement) -> CurveDescriptor {
    let name = curve
        .child("Name")
        .map(|n| n.text.clone())
        .unwrap_or_default();
    let unit = curve
        .child("AmplitudeUnit")
        .map(|n| n.text.clone())
        .unwrap_or_default();
    let internal_filename = curve
        .child("CurvePoints")
        .and_then(|cp| cp.children.first())
        .and_then(|point_set| point_set.children.get(1))
        .map(|node| node.text.clone());
    CurveDescriptor {
        name,
        unit,
        internal_filename,
    }
}

fn event_curve_descriptor(ec: &XmlElement) -> EventCurveDescriptor {
    let name = ec
        .child("Name")
        .map(|n| n.text.clone())
        .unwrap_or_default();
    let is_original_data = ec
        .child("IsOriginalData")
        .map(|n| n.text.trim().eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let events = ec
        .find_all("Events")
        .into_iter()
        .flat_map(|events_el| events_el.find_all("Event"))
        .filter_map(|event| {
            let volume: f64 = event.child("EventVolume")?.text.trim().parse().ok()?;
            let label = event
                .child("EventText")
                .map(|n| n.text.clone())
                .unwrap_or_default();
            Some(AnnotationPoint { volume, label })
        })
        .collect();
    EventCurveDescriptor {
        name,
        is_original_data,
        events,
    }
}

/// Rewrite names the original distinguishes from their v3 counterparts.
fn rewrite_curve_name(name: &str) -> String {
    if name == "UV cell path length" {
        "xUV cell path length".to_string()
    } else {
        name.to_string()
    }
}

fn rewrite_event_curve_name(name: &str) -> String {
    if name == "Fraction" {
        "Fractions".to_string()
    } else {
        name.to_string()
    }
}

/// Parse `xml_bytes` (the outer archive's `Chrom.1.Xml` entry) and materialize every curve and
/// original-data event curve it describes, resolving curve binary data through `inner_streams`
/// (a map from internal filename to that inner archive's decoded entries).
pub fn link_channels(
    xml_bytes: &[u8],
    inner_streams: &HashMap<String, HashMap<String, Vec<u8>>>,
) -> Result<Vec<Channel>, ResError> {
    let root = parse(xml_bytes)?;
    let mut channels = Vec::new();

    if let Some(curves_el) = root.find_all("Curves").into_iter().next() {
        for curve_el in curves_el.find_all("Curve") {
            let desc = curve_descriptor(curve_el);
            let Some(filename) = desc.internal_filename else {
                continue;
            };
            let Some(streams) = inner_streams.get(&filename) else {
                // Orphaned reference: the source tooling silently skips these too.
                continue;
            };
            let (Some(volumes_bytes), Some(amplitudes_bytes)) = (
                streams.get("CoordinateData.Volumes"),
                streams.get("CoordinateData.Amplitudes"),
            ) else {
                continue;
            };
            let volumes = decode_float_stream(volumes_bytes)?;
            let amplitudes = decode_float_stream(amplitudes_bytes)?;
            let samples = volumes
                .into_iter()
                .zip(amplitudes)
                .map(|(v, a)| CurvePoint {
                    volume: v as f64,
                    amplitude: a as f64,
                })
                .collect();
            channels.push(Channel::new(
                String::new(),
                rewrite_curve_name(&desc.name),
                ChannelData::Curve {
                    unit: desc.unit,
                    samples,
                },
            ));
        }
    }

    if let Some(event_curves_el) = root.find_all("EventCurves").into_iter().next() {
        for ec_el in event_curves_el.find_all("EventCurve") {
            let desc = event_curve_descriptor(ec_el);
            if !desc.is_original_data {
                continue;
            }
            channels.push(Channel::new(
                String::new(),
                rewrite_event_curve_name(&desc.name),
                ChannelData::Annotation { points: desc.events },
            ));
        }
    }

    Ok(channels)
}
