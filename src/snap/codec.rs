//! Snapshot wire format — typed state blobs embedded in trigger names.
//!
//! A stored snapshot renames its trigger to `"<ident> || <json>"`. The blob
//! is a map from track name to the captured fields; every field is optional
//! so a snapshot carries exactly what its flags asked for. Track names key
//! the map (not indices) so a reordered set still recalls onto the right
//! tracks.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Separator between the identifier and the blob in a stored name.
pub const SNAPSHOT_MARKER: &str = "||";

/// Snapshot errors. Decode failures are expected in the wild (hand-edited
/// names) and reported, never propagated into dispatch.
#[derive(Debug)]
pub enum SnapError {
    Encode(String),
    Decode(String),
}

impl fmt::Display for SnapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapError::Encode(e) => write!(f, "snapshot encode error: {e}"),
            SnapError::Decode(e) => write!(f, "snapshot decode error: {e}"),
        }
    }
}

impl std::error::Error for SnapError {}

/// Captured play state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayState {
    Stopped,
    Slot(usize),
}

/// Volume, pan, and send levels. Each part is present only when its flag
/// was captured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MixSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sends: Vec<f64>,
}

impl MixSnapshot {
    pub fn is_empty(&self) -> bool {
        self.volume.is_none() && self.pan.is_none() && self.sends.is_empty()
    }
}

/// Switch-like mixer state, captured by the extended mix flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixExtras {
    pub mute: bool,
    pub solo: bool,
    /// Crossfade assignment as its enumerated index.
    pub crossfade: usize,
}

/// One device: on/off and the parameter values in index order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    pub active: bool,
    pub params: Vec<f64>,
}

/// Everything captured for one track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mix: Option<MixSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<MixExtras>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub play: Option<PlayState>,
    /// Device states keyed by 1-based dotted path (`"1"`, `"2.1.3"`),
    /// the same notation device selectors use.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub devices: BTreeMap<String, DeviceSnapshot>,
}

/// The whole snapshot: per-track records plus the recall ramp length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetSnapshot {
    pub tracks: BTreeMap<String, TrackSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ramp: Option<u32>,
}

impl SetSnapshot {
    /// Number of captured scalar values, the quantity the store ceiling
    /// counts.
    pub fn value_count(&self) -> usize {
        self.tracks
            .values()
            .map(|t| {
                let mix = t.mix.as_ref().map_or(0, |m| {
                    m.volume.is_some() as usize + m.pan.is_some() as usize + m.sends.len()
                });
                let extras = if t.extras.is_some() { 3 } else { 0 };
                let play = t.play.is_some() as usize;
                let devices: usize = t.devices.values().map(|d| 1 + d.params.len()).sum();
                mix + extras + play + devices
            })
            .sum()
    }
}

/// Serialize a snapshot into the display name that stores it.
pub fn encode(ident: &str, snapshot: &SetSnapshot) -> Result<String, SnapError> {
    let blob =
        serde_json::to_string(snapshot).map_err(|e| SnapError::Encode(e.to_string()))?;
    Ok(format!("{ident} {SNAPSHOT_MARKER} {blob}"))
}

/// True when the text after a trigger's identifier is a stored snapshot.
pub fn is_snapshot_body(rest: &str) -> bool {
    rest.trim_start().starts_with(SNAPSHOT_MARKER)
}

/// Parse the text after the identifier back into a snapshot.
pub fn decode(rest: &str) -> Result<SetSnapshot, SnapError> {
    let body = rest
        .trim_start()
        .strip_prefix(SNAPSHOT_MARKER)
        .ok_or_else(|| SnapError::Decode("missing marker".to_string()))?;
    serde_json::from_str(body.trim()).map_err(|e| SnapError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SetSnapshot {
        let mut tracks = BTreeMap::new();
        tracks.insert(
            "Drums".to_string(),
            TrackSnapshot {
                mix: Some(MixSnapshot {
                    volume: Some(0.85),
                    pan: Some(-0.25),
                    sends: vec![0.0, 0.4],
                }),
                extras: Some(MixExtras {
                    mute: false,
                    solo: true,
                    crossfade: 0,
                }),
                play: Some(PlayState::Slot(3)),
                devices: BTreeMap::from([(
                    "1".to_string(),
                    DeviceSnapshot {
                        active: true,
                        params: vec![0.1, 0.2, 0.3],
                    },
                )]),
            },
        );
        tracks.insert(
            "Bass".to_string(),
            TrackSnapshot {
                play: Some(PlayState::Stopped),
                ..TrackSnapshot::default()
            },
        );
        SetSnapshot {
            tracks,
            ramp: Some(16),
        }
    }

    #[test]
    fn round_trips_through_a_name() {
        let snap = sample();
        let name = encode("[KIT A]", &snap).unwrap();
        assert!(name.starts_with("[KIT A] || "));
        let back = decode(&name["[KIT A]".len()..]).unwrap();
        assert_eq!(back, snap);
    }

    #[test]
    fn value_count_tallies_every_scalar() {
        // Drums: vol+pan (2) + sends (2) + extras (3) + play (1)
        // + device active (1) + params (3); Bass: play (1).
        assert_eq!(sample().value_count(), 13);
    }

    #[test]
    fn marker_detection_ignores_leading_space() {
        assert!(is_snapshot_body("  || {}"));
        assert!(!is_snapshot_body("VOL 100"));
        assert!(!is_snapshot_body(""));
    }

    #[test]
    fn mangled_blobs_fail_to_decode() {
        assert!(decode("|| {not json").is_err());
        assert!(decode("no marker").is_err());
    }

    #[test]
    fn absent_fields_stay_absent() {
        let snap = SetSnapshot {
            tracks: BTreeMap::from([("A".to_string(), TrackSnapshot::default())]),
            ramp: None,
        };
        let name = encode("[S]", &snap).unwrap();
        assert!(!name.contains("ramp"));
        assert!(!name.contains("mix"));
        let back = decode(&name["[S]".len()..]).unwrap();
        assert_eq!(back.tracks["A"], TrackSnapshot::default());
    }
}
