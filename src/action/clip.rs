//! Clip actions — a selector picks the slot, then a sub-action edits the clip.
//!
//! `CLIP PLAY` works on the playing (else selected-scene) slot, `CLIP3 STOP`
//! on slot 3, `CLIP"Intro" WARP OFF` on the first slot whose clip carries the
//! name. Audio-only edits skip MIDI clips with a debug line, and the grid
//! actions skip audio ones the same way.

use std::collections::HashMap;

use log::{debug, error};

use crate::host::{Clip, LiveSet, Track};
use crate::parse::{resolve, resolve_toggle, Domain};
use crate::target::resolve_clip;

use super::global::GQ_VALUES;
use super::{split_selector, split_word, ActionCtx, ClipHandler};

const SEMI_RANGE: f64 = 48.0;

pub fn table() -> HashMap<&'static str, ClipHandler> {
    let mut t: HashMap<&'static str, ClipHandler> = HashMap::new();
    t.insert("PLAY", play);
    t.insert("STOP", stop);
    t.insert("LOOP", looping);
    t.insert("START", start);
    t.insert("END", end);
    t.insert("QNTZ", qntz);
    t.insert("WARP", warp);
    t.insert("GAIN", gain);
    t.insert("SEMI", semi);
    t.insert("MUTE", mute);
    t.insert("NAME", name);
    t.insert("ENVINS", envins);
    t.insert("ENVCLR", envclr);
    t
}

/// Resolve the slot selector and hand off to the named sub-action.
pub fn dispatch(
    set: &mut dyn LiveSet,
    track: usize,
    text: &str,
    ctx: &mut ActionCtx,
    table: &HashMap<&'static str, ClipHandler>,
) {
    let (selector, rest) = split_selector(text);
    let (sub, args) = split_word(rest);
    if sub.is_empty() {
        error!("{}: CLIP needs a sub-action, dropped", ctx.ident);
        return;
    }
    let Some(&handler) = table.get(sub) else {
        error!("{}: unknown clip action {sub:?}, dropped", ctx.ident);
        return;
    };
    let selected = set.selected_scene();
    let slot = match set.track(track) {
        Some(t) => resolve_clip(selector, t, selected),
        None => None,
    };
    let Some(slot) = slot else {
        debug!("{}: no clip for selector {selector:?} on track {track}", ctx.ident);
        return;
    };
    handler(set, track, slot, ctx, args);
}

fn play(set: &mut dyn LiveSet, track: usize, slot: usize, _ctx: &mut ActionCtx, _args: &str) {
    if let Some(t) = set.track_mut(track) {
        t.fire_slot(slot);
    }
}

/// Session playback is per track, so stopping any clip stops the track.
fn stop(set: &mut dyn LiveSet, track: usize, _slot: usize, _ctx: &mut ActionCtx, _args: &str) {
    if let Some(t) = set.track_mut(track) {
        t.stop_clips();
    }
}

/// `LOOP` toggles, `LOOP ON`/`OFF` set, `LOOP 8` sets the length in beats,
/// `LOOP *2` and `LOOP /2` scale it.
fn looping(set: &mut dyn LiveSet, track: usize, slot: usize, _ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    let args = args.trim();
    if let Some(factor) = args.strip_prefix('*') {
        if let Ok(f) = factor.parse::<f64>() {
            if f > 0.0 {
                let len = clip.loop_end() - clip.loop_start();
                clip.set_loop_end(clip.loop_start() + len * f);
            }
        }
        return;
    }
    if let Some(divisor) = args.strip_prefix('/') {
        if let Ok(d) = divisor.parse::<f64>() {
            if d > 0.0 {
                let len = clip.loop_end() - clip.loop_start();
                clip.set_loop_end(clip.loop_start() + len / d);
            }
        }
        return;
    }
    if let Ok(beats) = args.parse::<f64>() {
        if beats > 0.0 {
            clip.set_loop_end(clip.loop_start() + beats);
        }
        return;
    }
    let next = resolve_toggle(args, clip.looping());
    clip.set_looping(next);
}

fn start(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    let domain = Domain::direct(0.0, clip.length(), Some(0.0));
    if let Some(next) = resolve(args, clip.loop_start(), &domain, None, ctx.rng) {
        clip.set_loop_start(next);
    }
}

fn end(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    let domain = Domain::direct(0.0, clip.length(), Some(clip.length()));
    if let Some(next) = resolve(args, clip.loop_end(), &domain, None, ctx.rng) {
        clip.set_loop_end(next);
    }
}

/// Quantize MIDI notes to a grid named or indexed like global quantize.
fn qntz(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    if clip.is_audio() {
        debug!("{}: QNTZ skips audio clips", ctx.ident);
        return;
    }
    let domain = Domain::index(GQ_VALUES.len(), false);
    let Some(grid) = resolve(args, 0.0, &domain, Some(&GQ_VALUES), ctx.rng) else {
        return;
    };
    if grid >= 1.0 {
        clip.quantize(grid as u8);
    }
}

fn warp(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    if !clip.is_audio() {
        debug!("{}: WARP skips MIDI clips", ctx.ident);
        return;
    }
    let next = resolve_toggle(args, clip.warping());
    clip.set_warping(next);
}

fn gain(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    if !clip.is_audio() {
        debug!("{}: GAIN skips MIDI clips", ctx.ident);
        return;
    }
    let domain = Domain::midi(0.0, 1.0, Some(0.5));
    if let Some(next) = resolve(args, clip.gain(), &domain, None, ctx.rng) {
        clip.set_gain(next);
    }
}

fn semi(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(clip) = clip_mut(set, track, slot) else { return };
    if !clip.is_audio() {
        debug!("{}: SEMI skips MIDI clips", ctx.ident);
        return;
    }
    let domain = Domain::direct(-SEMI_RANGE, SEMI_RANGE, Some(0.0));
    if let Some(next) = resolve(args, clip.pitch_coarse() as f64, &domain, None, ctx.rng) {
        clip.set_pitch_coarse(next.round() as i32);
    }
}

fn mute(set: &mut dyn LiveSet, track: usize, slot: usize, _ctx: &mut ActionCtx, args: &str) {
    if let Some(clip) = clip_mut(set, track, slot) {
        let next = resolve_toggle(args, clip.is_muted());
        clip.set_muted(next);
    }
}

fn name(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let new_name = match args.trim().strip_prefix('"') {
        Some(rest) => match rest.find('"') {
            Some(close) => &rest[..close],
            None => rest,
        },
        None => args.trim(),
    };
    if new_name.is_empty() {
        debug!("{}: CLIP NAME needs a name", ctx.ident);
        return;
    }
    if let Some(clip) = clip_mut(set, track, slot) {
        clip.set_name(new_name);
    }
}

/// `ENVINS <device> <param>`, both 1-based on the owning track.
fn envins(set: &mut dyn LiveSet, track: usize, slot: usize, ctx: &mut ActionCtx, args: &str) {
    let (device, param) = split_word(args);
    let parsed = device
        .parse::<usize>()
        .ok()
        .zip(param.parse::<usize>().ok())
        .filter(|(d, p)| *d >= 1 && *p >= 1);
    let Some((device, param)) = parsed else {
        debug!("{}: ENVINS needs a device and a parameter", ctx.ident);
        return;
    };
    if let Some(clip) = clip_mut(set, track, slot) {
        clip.insert_envelope(device - 1, param - 1);
    }
}

fn envclr(set: &mut dyn LiveSet, track: usize, slot: usize, _ctx: &mut ActionCtx, _args: &str) {
    if let Some(clip) = clip_mut(set, track, slot) {
        clip.clear_envelopes();
    }
}

fn clip_mut(set: &mut dyn LiveSet, track: usize, slot: usize) -> Option<&mut dyn Clip> {
    set.track_mut(track)?.clip_mut(slot)
}
