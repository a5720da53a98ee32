//! Looper actions — transport written through the device's State parameter.
//!
//! The target is the first Looper on the track, racks included. Transport
//! names map to the State parameter's steps, so `LOOPER REC` on a track
//! without a looper is a logged no-op rather than an error.

use std::collections::HashMap;

use log::{debug, error};

use crate::host::{Device, LiveSet, Param};
use crate::parse::{resolve, resolve_toggle, Domain};
use crate::target::{device_at_mut, find_by_class};

use super::{split_word, ActionCtx, DeviceHandler};

/// Transport states in the order the State parameter steps through them.
pub const LOOPER_STATES: [&str; 4] = ["STOP", "REC", "PLAY", "OVER"];

const STATE_PARAM: &str = "State";
const REVERSE_PARAM: &str = "Reverse";
const SPEED_PARAM: &str = "Speed";

pub fn table() -> HashMap<&'static str, DeviceHandler> {
    let mut t: HashMap<&'static str, DeviceHandler> = HashMap::new();
    t.insert("ON", on);
    t.insert("OFF", off);
    t.insert("STOP", stop);
    t.insert("REC", rec);
    t.insert("PLAY", play);
    t.insert("OVER", over);
    t.insert("REV", rev);
    t.insert("SPEED", speed);
    t
}

/// Find the track's looper and run the sub-action. Bare `LOOPER` toggles
/// the device's activity.
pub fn dispatch(
    set: &mut dyn LiveSet,
    track: usize,
    args: &str,
    ctx: &mut ActionCtx,
    table: &HashMap<&'static str, DeviceHandler>,
) {
    let path = match set.track(track) {
        Some(t) => find_by_class(t, "Looper"),
        None => None,
    };
    let Some(path) = path else {
        debug!("{}: track {track} has no looper", ctx.ident);
        return;
    };
    let (sub, rest) = split_word(args);
    if sub.is_empty() {
        toggle(set, track, &path, ctx, "");
        return;
    }
    let Some(&handler) = table.get(sub) else {
        error!("{}: unknown looper action {sub:?}, dropped", ctx.ident);
        return;
    };
    handler(set, track, &path, ctx, rest);
}

fn toggle(set: &mut dyn LiveSet, track: usize, path: &[usize], _ctx: &mut ActionCtx, args: &str) {
    if let Some(device) = looper(set, track, path) {
        let next = resolve_toggle(args, device.is_active());
        device.set_active(next);
    }
}

fn on(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    toggle(set, track, path, ctx, "ON");
}

fn off(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    toggle(set, track, path, ctx, "OFF");
}

fn stop(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    set_state(set, track, path, ctx, "STOP");
}

fn rec(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    set_state(set, track, path, ctx, "REC");
}

fn play(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    set_state(set, track, path, ctx, "PLAY");
}

fn over(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    set_state(set, track, path, ctx, "OVER");
}

fn set_state(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, state: &str) {
    let Some(step) = LOOPER_STATES.iter().position(|s| *s == state) else { return };
    let Some(device) = looper(set, track, path) else { return };
    let Some(param) = param_named(device, STATE_PARAM) else {
        debug!("{}: looper exposes no {STATE_PARAM} parameter", ctx.ident);
        return;
    };
    param.set_value(step as f64);
}

fn rev(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, args: &str) {
    let Some(device) = looper(set, track, path) else { return };
    let Some(param) = param_named(device, REVERSE_PARAM) else {
        debug!("{}: looper exposes no {REVERSE_PARAM} parameter", ctx.ident);
        return;
    };
    let next = resolve_toggle(args, param.value() >= 0.5);
    param.set_value(if next { 1.0 } else { 0.0 });
}

/// Speed takes literal semitones over the parameter's own range.
fn speed(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, args: &str) {
    let Some(device) = looper(set, track, path) else { return };
    let Some(param) = param_named(device, SPEED_PARAM) else {
        debug!("{}: looper exposes no {SPEED_PARAM} parameter", ctx.ident);
        return;
    };
    let domain = Domain::direct(param.min(), param.max(), Some(param.default_value()));
    if let Some(next) = resolve(args, param.value(), &domain, None, ctx.rng) {
        param.set_value(next);
    }
}

fn param_named<'a>(device: &'a mut dyn Device, name: &str) -> Option<&'a mut dyn Param> {
    let index =
        (0..device.param_count()).find(|&i| device.param(i).is_some_and(|p| p.name() == name))?;
    device.param_mut(index)
}

fn looper<'a>(
    set: &'a mut dyn LiveSet,
    track: usize,
    path: &[usize],
) -> Option<&'a mut dyn Device> {
    device_at_mut(set.track_mut(track)?, path)
}
