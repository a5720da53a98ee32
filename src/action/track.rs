//! Track actions — mixer, arming, monitoring, clip-slot launch.
//!
//! Every handler here is fanned out once per resolved target; a target that
//! fails (missing send, unarmable track) logs and leaves the rest alone.

use std::collections::HashMap;

use log::debug;
use rand::Rng;

use crate::host::{CrossfadeAssign, LiveSet, MonitorState, Track};
use crate::parse::{resolve, resolve_toggle, Domain};

use super::{split_word, ActionCtx, TrackHandler};

/// Monitor states in host order, the value list `MON` accepts.
pub const MON_VALUES: [&str; 3] = ["IN", "AUTO", "OFF"];

/// Crossfade assignments in host order.
pub const XFADE_VALUES: [&str; 3] = ["A", "OFF", "B"];

const VOLUME_DEFAULT: f64 = 0.85;

pub fn table() -> HashMap<&'static str, TrackHandler> {
    let mut t: HashMap<&'static str, TrackHandler> = HashMap::new();
    t.insert("VOL", vol);
    t.insert("PAN", pan);
    t.insert("SEND", send);
    t.insert("MUTE", mute);
    t.insert("SOLO", solo);
    t.insert("ARM", arm);
    t.insert("MON", mon);
    t.insert("XFADE", xfade);
    t.insert("SEL", sel);
    t.insert("FOLD", fold);
    t.insert("PLAY", play);
    t.insert("STOP", stop);
    t.insert("NAME", name);
    t
}

fn vol(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(track) = set.track_mut(target) else { return };
    let domain = Domain::midi(0.0, 1.0, Some(VOLUME_DEFAULT));
    if let Some(next) = resolve(args, track.volume(), &domain, None, ctx.rng) {
        track.set_volume(next);
    }
}

fn pan(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(track) = set.track_mut(target) else { return };
    let domain = Domain::midi(-1.0, 1.0, Some(0.0));
    if let Some(next) = resolve(args, track.pan(), &domain, None, ctx.rng) {
        track.set_pan(next);
    }
}

/// `SEND A 90`, `SEND 2 <5`. Letters address sends in return order.
fn send(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let (selector, token) = split_word(args);
    let Some(index) = send_index(selector) else {
        debug!("{}: SEND selector {selector:?} is invalid", ctx.ident);
        return;
    };
    let Some(track) = set.track_mut(target) else { return };
    let Some(current) = track.send(index) else {
        debug!("{}: track {target} has no send {selector}", ctx.ident);
        return;
    };
    let domain = Domain::midi(0.0, 1.0, Some(0.0));
    if let Some(next) = resolve(token, current, &domain, None, ctx.rng) {
        track.set_send(index, next);
    }
}

fn send_index(selector: &str) -> Option<usize> {
    let selector = selector.trim();
    if selector.len() == 1 {
        let c = selector.chars().next()?;
        if c.is_ascii_alphabetic() {
            return Some((c.to_ascii_uppercase() as u8 - b'A') as usize);
        }
    }
    selector.parse::<usize>().ok().filter(|n| *n >= 1).map(|n| n - 1)
}

fn mute(set: &mut dyn LiveSet, target: usize, _ctx: &mut ActionCtx, args: &str) {
    if let Some(track) = set.track_mut(target) {
        let next = resolve_toggle(args, track.is_muted());
        track.set_muted(next);
    }
}

fn solo(set: &mut dyn LiveSet, target: usize, _ctx: &mut ActionCtx, args: &str) {
    if let Some(track) = set.track_mut(target) {
        let next = resolve_toggle(args, track.is_soloed());
        track.set_soloed(next);
    }
}

fn arm(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(track) = set.track_mut(target) else { return };
    if !track.can_arm() {
        debug!("{}: track {target} cannot arm", ctx.ident);
        return;
    }
    let next = resolve_toggle(args, track.is_armed());
    track.set_armed(next);
}

fn mon(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(track) = set.track_mut(target) else { return };
    let token = if args.trim().is_empty() { ">" } else { args };
    let domain = Domain::index(MON_VALUES.len(), true);
    let current = track.monitor().index() as f64;
    if let Some(next) = resolve(token, current, &domain, Some(&MON_VALUES), ctx.rng) {
        track.set_monitor(MonitorState::from_index(next as usize));
    }
}

fn xfade(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let Some(track) = set.track_mut(target) else { return };
    let token = if args.trim().is_empty() { ">" } else { args };
    let domain = Domain::index(XFADE_VALUES.len(), true);
    let current = track.crossfade().index() as f64;
    if let Some(next) = resolve(token, current, &domain, Some(&XFADE_VALUES), ctx.rng) {
        track.set_crossfade(CrossfadeAssign::from_index(next as usize));
    }
}

/// With a multi-track target the last selection wins, in fan-out order.
fn sel(set: &mut dyn LiveSet, target: usize, _ctx: &mut ActionCtx, _args: &str) {
    set.select_track(target);
}

fn fold(set: &mut dyn LiveSet, target: usize, _ctx: &mut ActionCtx, args: &str) {
    if let Some(track) = set.track_mut(target) {
        let next = resolve_toggle(args, track.is_folded());
        track.set_folded(next);
    }
}

/// Launch a slot: empty = the selected scene's slot, `3` = slot 3, `RND`,
/// `<`/`>` relative to the playing slot.
fn play(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let selected = set.selected_scene();
    let Some(track) = set.track_mut(target) else { return };
    let slots = track.slot_count();
    if slots == 0 {
        return;
    }
    let args = args.trim();
    let slot = if args.is_empty() {
        selected
    } else if args.eq_ignore_ascii_case("RND") {
        ctx.rng.gen_range(0..slots)
    } else if let Some(rest) = args.strip_prefix('>') {
        relative_slot(track.playing_slot().unwrap_or(selected), rest, 1, slots)
    } else if let Some(rest) = args.strip_prefix('<') {
        relative_slot(track.playing_slot().unwrap_or(selected), rest, -1, slots)
    } else {
        match args.parse::<usize>() {
            Ok(n) if n >= 1 && n <= slots => n - 1,
            _ => {
                debug!("{}: PLAY slot {args:?} is invalid", ctx.ident);
                return;
            }
        }
    };
    track.fire_slot(slot);
}

fn relative_slot(base: usize, magnitude: &str, sign: i64, slots: usize) -> usize {
    let magnitude = magnitude.trim().parse::<i64>().unwrap_or(1).max(0);
    let target = base as i64 + sign * magnitude;
    target.clamp(0, slots as i64 - 1) as usize
}

fn stop(set: &mut dyn LiveSet, target: usize, _ctx: &mut ActionCtx, _args: &str) {
    if let Some(track) = set.track_mut(target) {
        track.stop_clips();
    }
}

fn name(set: &mut dyn LiveSet, target: usize, ctx: &mut ActionCtx, args: &str) {
    let new_name = match args.trim().strip_prefix('"') {
        Some(rest) => match rest.find('"') {
            Some(close) => &rest[..close],
            None => rest,
        },
        None => args.trim(),
    };
    if new_name.is_empty() {
        debug!("{}: NAME needs a name", ctx.ident);
        return;
    }
    if let Some(track) = set.track_mut(target) {
        track.set_name(new_name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TestCtx;
    use crate::host::{SimClip, SimSet};
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn vol_takes_controller_values() {
        let mut set = SimSet::new(2, 0, 4);
        let mut tc = TestCtx::new();
        vol(&mut set, 0, &mut tc.ctx(), "100");
        assert_approx_eq!(set.tracks[0].volume, 100.0 / 127.0, 1e-9);
        vol(&mut set, 0, &mut tc.ctx(), "RESET");
        assert_approx_eq!(set.tracks[0].volume, 0.85, 1e-9);
    }

    #[test]
    fn pan_spans_both_sides() {
        let mut set = SimSet::new(1, 0, 4);
        let mut tc = TestCtx::new();
        pan(&mut set, 0, &mut tc.ctx(), "0");
        assert_approx_eq!(set.tracks[0].pan, -1.0, 1e-9);
        pan(&mut set, 0, &mut tc.ctx(), "64");
        assert!(set.tracks[0].pan.abs() < 0.02);
    }

    #[test]
    fn send_by_letter_and_number() {
        let mut set = SimSet::new(1, 2, 4);
        let mut tc = TestCtx::new();
        send(&mut set, 0, &mut tc.ctx(), "B 127");
        assert_approx_eq!(set.tracks[0].sends[1], 1.0, 1e-9);
        send(&mut set, 0, &mut tc.ctx(), "1 64");
        assert!(set.tracks[0].sends[0] > 0.0);
    }

    #[test]
    fn missing_send_is_a_logged_no_op() {
        let mut set = SimSet::new(1, 1, 4);
        let mut tc = TestCtx::new();
        send(&mut set, 0, &mut tc.ctx(), "F 100");
        assert_approx_eq!(set.tracks[0].sends[0], 0.0, 1e-9);
    }

    #[test]
    fn arm_respects_armability() {
        let mut set = SimSet::new(1, 0, 4);
        let mut tc = TestCtx::new();
        arm(&mut set, 0, &mut tc.ctx(), "ON");
        assert!(set.tracks[0].armed);
        let master = set.master_index();
        arm(&mut set, master, &mut tc.ctx(), "ON");
        assert!(!set.tracks[master].armed);
    }

    #[test]
    fn mon_cycles_and_accepts_names() {
        let mut set = SimSet::new(1, 0, 4);
        let mut tc = TestCtx::new();
        mon(&mut set, 0, &mut tc.ctx(), "IN");
        assert_eq!(set.tracks[0].monitor, crate::host::MonitorState::In);
        mon(&mut set, 0, &mut tc.ctx(), "");
        assert_eq!(set.tracks[0].monitor, crate::host::MonitorState::Auto);
        mon(&mut set, 0, &mut tc.ctx(), "");
        assert_eq!(set.tracks[0].monitor, crate::host::MonitorState::Off);
        mon(&mut set, 0, &mut tc.ctx(), "");
        assert_eq!(set.tracks[0].monitor, crate::host::MonitorState::In);
    }

    #[test]
    fn xfade_assigns_by_name() {
        let mut set = SimSet::new(1, 0, 4);
        let mut tc = TestCtx::new();
        xfade(&mut set, 0, &mut tc.ctx(), "B");
        assert_eq!(set.tracks[0].crossfade, CrossfadeAssign::B);
        xfade(&mut set, 0, &mut tc.ctx(), "OFF");
        assert_eq!(set.tracks[0].crossfade, CrossfadeAssign::Off);
    }

    #[test]
    fn play_locators() {
        let mut set = SimSet::new(1, 0, 8);
        let mut tc = TestCtx::new();
        set.put_clip(0, 2, SimClip::named("A"));
        set.put_clip(0, 3, SimClip::named("B"));
        play(&mut set, 0, &mut tc.ctx(), "3");
        assert_eq!(set.tracks[0].playing, Some(2));
        play(&mut set, 0, &mut tc.ctx(), ">");
        assert_eq!(set.tracks[0].playing, Some(3));
        stop(&mut set, 0, &mut tc.ctx(), "");
        assert_eq!(set.tracks[0].playing, None);
        set.selected_scene = 2;
        play(&mut set, 0, &mut tc.ctx(), "");
        assert_eq!(set.tracks[0].playing, Some(2));
    }

    #[test]
    fn name_sets_quoted_and_bare() {
        let mut set = SimSet::new(1, 0, 4);
        let mut tc = TestCtx::new();
        name(&mut set, 0, &mut tc.ctx(), "\"DRUM BUS\"");
        assert_eq!(set.tracks[0].name, "DRUM BUS");
        name(&mut set, 0, &mut tc.ctx(), "KICKS");
        assert_eq!(set.tracks[0].name, "KICKS");
    }
}
