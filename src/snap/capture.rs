//! Snapshot store and recall — capturing live state into a trigger name and
//! playing it back, immediately, ramped, or macro-morphed.

use std::collections::BTreeMap;

use log::{debug, error, info, warn};

use crate::engine::config::Config;
use crate::engine::sched::TickQueue;
use crate::host::{Chain, CrossfadeAssign, Device, LiveSet, Param, Track, TrackKind, TriggerRef};
use crate::target::{device_at_mut, find_track_by_name};

use super::codec::{
    encode, DeviceSnapshot, MixExtras, MixSnapshot, PlayState, SetSnapshot, TrackSnapshot,
};
use super::smooth::{read_param, write_param, ParamPath, Smoother};

/// A queued display-name restore, due after a failed store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRestore {
    pub trigger: TriggerRef,
    pub name: String,
}

/// What a store captures. Parsed from the flag tokens after `SNAP`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapScope {
    pub volume_pan: bool,
    pub sends: bool,
    pub extras: bool,
    pub play: bool,
    pub devices: bool,
    pub ramp: Option<u32>,
}

/// Parse store flags. No scope flag at all means mix plus play state.
pub fn parse_flags(args: &str, default_ramp: u32) -> SnapScope {
    let mut scope = SnapScope::default();
    let mut any = false;
    let mut tokens = args.split_whitespace();
    while let Some(token) = tokens.next() {
        match token {
            "MIX" => {
                scope.volume_pan = true;
                scope.sends = true;
                any = true;
            }
            "MIXS" => {
                scope.sends = true;
                any = true;
            }
            "MIX-" => {
                scope.volume_pan = true;
                any = true;
            }
            "MIX+" => {
                scope.volume_pan = true;
                scope.sends = true;
                scope.extras = true;
                any = true;
            }
            "PLAY" => {
                scope.play = true;
                any = true;
            }
            "DEV" => {
                scope.devices = true;
                any = true;
            }
            "ALL" => {
                scope.volume_pan = true;
                scope.sends = true;
                scope.extras = true;
                scope.play = true;
                scope.devices = true;
                any = true;
            }
            "RAMP" => {
                scope.ramp =
                    Some(tokens.next().and_then(|t| t.parse().ok()).unwrap_or(default_ramp));
            }
            other => debug!("ignoring unknown snapshot flag {other}"),
        }
    }
    if !any {
        scope.volume_pan = true;
        scope.sends = true;
        scope.play = true;
    }
    scope
}

/// Capture the targets and write the snapshot into the trigger's name.
///
/// Oversized captures abort: the trigger briefly shows a failure notice and
/// its previous name comes back after a delay. Nothing partial is ever
/// persisted.
pub fn store(
    set: &mut dyn LiveSet,
    targets: &[usize],
    flags_text: &str,
    ident: &str,
    trigger: Option<TriggerRef>,
    config: &Config,
    restores: &mut TickQueue<PendingRestore>,
) {
    let Some(trigger) = trigger else {
        warn!("snapshot store from {ident} needs a name-bearing trigger");
        return;
    };
    let Some(previous) = set.trigger_name(trigger) else {
        warn!("snapshot store from {ident}: trigger name is not readable");
        return;
    };

    let scope = parse_flags(flags_text, config.snapshot_ramp_ticks);
    let mut snapshot = SetSnapshot {
        ramp: scope.ramp,
        ..SetSnapshot::default()
    };
    for &index in targets {
        let Some(track) = set.track(index) else { continue };
        let key = snapshot_key(track, index);
        snapshot
            .tracks
            .insert(key, capture_track(track, &scope, config));
    }

    let count = snapshot.value_count();
    if count > config.snapshot_param_limit {
        error!(
            "snapshot {ident} aborted: {count} values exceed the configured limit of {}",
            config.snapshot_param_limit
        );
        // The failure notice must not itself route anywhere if fired.
        set.set_trigger_name(trigger, &format!("{ident} capture failed"));
        restores.push(
            config.snapshot_restore_delay,
            PendingRestore {
                trigger,
                name: previous,
            },
        );
        return;
    }

    match encode(ident, &snapshot) {
        Ok(name) => {
            set.set_trigger_name(trigger, &name);
            info!(
                "stored snapshot {ident}: {count} values across {} tracks",
                snapshot.tracks.len()
            );
        }
        Err(e) => error!("snapshot {ident} not stored: {e}"),
    }
}

/// Play a decoded snapshot back into the set.
///
/// When the recalling trigger sits on the configured morph track, the
/// snapshot loads the morph set instead of being applied; otherwise values
/// land immediately, or ramp when the snapshot carries a ramp length.
pub fn recall(
    set: &mut dyn LiveSet,
    snapshot: &SetSnapshot,
    recall_track: Option<usize>,
    config: &Config,
    smoother: &mut Smoother,
) {
    let morphing = recall_track
        .and_then(|ix| set.track(ix))
        .is_some_and(|t| t.name().eq_ignore_ascii_case(&config.morph_track_name));
    if morphing {
        smoother.clear_morph();
    } else {
        // Explicit cancellation: a recall replaces whatever was in flight.
        smoother.clear();
    }

    let ramp = snapshot.ramp.filter(|t| *t > 0);
    for (name, record) in &snapshot.tracks {
        let Some(index) = find_track_by_name(&*set, name) else {
            debug!("snapshot track {name:?} is gone, skipping");
            continue;
        };
        recall_track_record(set, index, record, ramp, morphing, smoother);
    }
    if morphing {
        info!("morph set loaded: {} parameters", smoother.morph_len());
    }
}

fn recall_track_record(
    set: &mut dyn LiveSet,
    index: usize,
    record: &TrackSnapshot,
    ramp: Option<u32>,
    morphing: bool,
    smoother: &mut Smoother,
) {
    if let Some(mix) = &record.mix {
        if let Some(volume) = mix.volume {
            land(set, smoother, ramp, morphing, ParamPath::Volume(index), volume, false);
        }
        if let Some(pan) = mix.pan {
            land(set, smoother, ramp, morphing, ParamPath::Pan(index), pan, false);
        }
        for (s, level) in mix.sends.iter().enumerate() {
            land(set, smoother, ramp, morphing, ParamPath::Send(index, s), *level, false);
        }
    }

    // Switch-like state and play state never ramp and never morph.
    if !morphing {
        if let Some(extras) = &record.extras {
            if let Some(track) = set.track_mut(index) {
                track.set_muted(extras.mute);
                track.set_soloed(extras.solo);
                track.set_crossfade(CrossfadeAssign::from_index(extras.crossfade));
            }
        }
        if let Some(play) = &record.play {
            if let Some(track) = set.track_mut(index) {
                match play {
                    PlayState::Stopped => track.stop_clips(),
                    PlayState::Slot(slot) => track.fire_slot(*slot),
                }
            }
        }
    }

    for (key, device) in &record.devices {
        let Some(path) = parse_device_key(key) else {
            debug!("snapshot device key {key:?} is malformed, skipping");
            continue;
        };
        recall_device(set, index, &path, device, ramp, morphing, smoother);
    }
}

fn recall_device(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    record: &DeviceSnapshot,
    ramp: Option<u32>,
    morphing: bool,
    smoother: &mut Smoother,
) {
    // Existence and quantized-ness are read up front; values are landed
    // through ParamPath so ramps re-resolve on every tick.
    let quantized: Vec<bool> = {
        let Some(track_ref) = set.track(track) else { return };
        let Some(device) = crate::target::device_at(track_ref, path) else {
            debug!("snapshot device at {path:?} is gone, skipping");
            return;
        };
        (0..record.params.len().min(device.param_count()))
            .map(|i| device.param(i).is_some_and(|p| p.is_quantized()))
            .collect()
    };

    if !morphing {
        if let Some(track_ref) = set.track_mut(track) {
            if let Some(device) = device_at_mut(track_ref, path) {
                device.set_active(record.active);
            }
        }
    }

    for (i, &q) in quantized.iter().enumerate() {
        let path = ParamPath::DeviceParam {
            track,
            device: path.to_vec(),
            param: i,
        };
        land(set, smoother, ramp, morphing, path, record.params[i], q);
    }
}

/// Land one value: store a morph pair, install a ramp, or write directly.
/// Quantized parameters always snap.
fn land(
    set: &mut dyn LiveSet,
    smoother: &mut Smoother,
    ramp: Option<u32>,
    morphing: bool,
    path: ParamPath,
    target: f64,
    quantized: bool,
) {
    if morphing {
        if let Some(current) = read_param(&*set, &path) {
            smoother.store_morph(path, current, target, quantized);
        }
        return;
    }
    match ramp {
        Some(ticks) if !quantized => {
            if let Some(current) = read_param(&*set, &path) {
                smoother.ramp(path, current, target, ticks);
            }
        }
        _ => write_param(set, &path, target),
    }
}

/// Track key in the blob: the display name, or the synthesized name the
/// quoted-target resolver also answers to.
fn snapshot_key(track: &dyn Track, index: usize) -> String {
    if track.name().is_empty() {
        match track.kind() {
            TrackKind::Midi => format!("{}-MIDI", index + 1),
            _ => format!("{}-AUDIO", index + 1),
        }
    } else {
        track.name().to_string()
    }
}

fn capture_track(track: &dyn Track, scope: &SnapScope, config: &Config) -> TrackSnapshot {
    let mut record = TrackSnapshot::default();
    if scope.volume_pan || scope.sends {
        let mut mix = MixSnapshot::default();
        if scope.volume_pan {
            mix.volume = Some(track.volume());
            mix.pan = Some(track.pan());
        }
        if scope.sends {
            mix.sends = (0..track.send_count()).filter_map(|s| track.send(s)).collect();
        }
        if !mix.is_empty() {
            record.mix = Some(mix);
        }
    }
    if scope.extras {
        record.extras = Some(MixExtras {
            mute: track.is_muted(),
            solo: track.is_soloed(),
            crossfade: track.crossfade().index(),
        });
    }
    if scope.play && track.slot_count() > 0 {
        record.play = Some(match track.playing_slot() {
            Some(slot) => PlayState::Slot(slot),
            None => PlayState::Stopped,
        });
    }
    if scope.devices {
        record.devices = capture_devices(track, config.snapshot_include_nested);
    }
    record
}

fn capture_devices(track: &dyn Track, nested: bool) -> BTreeMap<String, DeviceSnapshot> {
    let mut out = BTreeMap::new();
    for i in 0..track.device_count() {
        if let Some(device) = track.device(i) {
            capture_device(device, (i + 1).to_string(), nested, &mut out);
        }
    }
    out
}

fn capture_device(
    device: &dyn Device,
    key: String,
    nested: bool,
    out: &mut BTreeMap<String, DeviceSnapshot>,
) {
    out.insert(
        key.clone(),
        DeviceSnapshot {
            active: device.is_active(),
            params: (0..device.param_count())
                .filter_map(|i| device.param(i).map(|p| p.value()))
                .collect(),
        },
    );
    if !nested {
        return;
    }
    for c in 0..device.chain_count() {
        let Some(chain) = device.chain(c) else { continue };
        for d in 0..chain.device_count() {
            if let Some(child) = chain.device(d) {
                capture_device(child, format!("{key}.{}.{}", c + 1, d + 1), nested, out);
            }
        }
    }
}

fn parse_device_key(key: &str) -> Option<Vec<usize>> {
    let path: Option<Vec<usize>> = key
        .split('.')
        .map(|p| p.parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1))
        .collect();
    path.filter(|p| p.len() % 2 == 1)
}
