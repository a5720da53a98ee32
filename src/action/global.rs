//! Global actions — transport, tempo, quantization, scenes, cue points.

use std::collections::HashMap;

use log::debug;

use crate::host::{CuePoint, LiveSet};
use crate::parse::{resolve, resolve_toggle, Domain};
use crate::snap::ParamPath;
use crate::target::resolve_scene;

use super::{split_word, ActionCtx, GlobalHandler};

/// Clip-trigger quantization pages, in host order.
pub const GQ_VALUES: [&str; 14] = [
    "NONE", "8B", "4B", "2B", "1B", "1/2", "1/2T", "1/4", "1/4T", "1/8", "1/8T", "1/16",
    "1/16T", "1/32",
];

/// MIDI record quantization pages, in host order.
pub const RQ_VALUES: [&str; 9] = [
    "NONE", "1/4", "1/8", "1/8T", "1/8+T", "1/16", "1/16T", "1/16+T", "1/32",
];

const TEMPO_MIN: f64 = 20.0;
const TEMPO_MAX: f64 = 999.0;

pub fn table() -> HashMap<&'static str, GlobalHandler> {
    let mut t: HashMap<&'static str, GlobalHandler> = HashMap::new();
    t.insert("SETPLAY", set_play);
    t.insert("SETSTOP", set_stop);
    t.insert("SETCONT", set_cont);
    t.insert("STOPALL", stop_all);
    t.insert("REC", rec);
    t.insert("SREC", srec);
    t.insert("OVER", over);
    t.insert("MET", met);
    t.insert("UNDO", undo);
    t.insert("REDO", redo);
    t.insert("B2A", b2a);
    t.insert("TAP", tap);
    t.insert("BPM", bpm);
    t.insert("GRV", grv);
    t.insert("GQ", gq);
    t.insert("RQ", rq);
    t.insert("SCENE", scene_fire);
    t.insert("SCNSEL", scene_select);
    t.insert("JUMP", jump);
    t.insert("LOOP", arrangement_loop);
    t.insert("LOC", loc);
    t.insert("XFADER", xfader);
    t
}

fn set_play(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.start_playback();
}

fn set_stop(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.stop_playback();
}

fn set_cont(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.continue_playback();
}

fn stop_all(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.stop_all_clips();
}

fn rec(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let next = resolve_toggle(args, set.record_mode());
    set.set_record_mode(next);
}

fn srec(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let next = resolve_toggle(args, set.session_record());
    set.set_session_record(next);
}

fn over(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let next = resolve_toggle(args, set.overdub());
    set.set_overdub(next);
}

fn met(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let next = resolve_toggle(args, set.metronome());
    set.set_metronome(next);
}

fn undo(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.undo();
}

fn redo(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.redo();
}

fn b2a(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.back_to_arranger();
}

fn tap(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, _args: &str) {
    set.tap_tempo();
}

/// `BPM 126`, `BPM <2`, `BPM RND110-130`, `BPM RAMP 16 126`.
fn bpm(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    let (word, rest) = split_word(args);
    let domain = Domain::direct(TEMPO_MIN, TEMPO_MAX, None);
    if word == "RAMP" {
        let (ticks_tok, target_tok) = split_word(rest);
        let Some(ticks) = ticks_tok.parse::<u32>().ok().filter(|t| *t > 0) else {
            debug!("BPM RAMP needs a tick count, got {rest:?}");
            return;
        };
        let current = set.tempo();
        let Some(target) = resolve(target_tok, current, &domain, None, ctx.rng) else {
            debug!("BPM RAMP target {target_tok:?} did not resolve");
            return;
        };
        ctx.smoother.ramp(ParamPath::Tempo, current, target, ticks);
        return;
    }
    if let Some(next) = resolve(args, set.tempo(), &domain, None, ctx.rng) {
        set.set_tempo(next);
    }
}

fn grv(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    let domain = Domain::midi(0.0, 1.0, Some(0.0));
    if let Some(next) = resolve(args, set.groove_amount(), &domain, None, ctx.rng) {
        set.set_groove_amount(next);
    }
}

fn gq(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    let token = if args.trim().is_empty() { ">" } else { args };
    let domain = Domain::index(GQ_VALUES.len(), true);
    let current = set.clip_quantization() as f64;
    if let Some(next) = resolve(token, current, &domain, Some(&GQ_VALUES), ctx.rng) {
        set.set_clip_quantization(next as usize);
    }
}

fn rq(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    let token = if args.trim().is_empty() { ">" } else { args };
    let domain = Domain::index(RQ_VALUES.len(), true);
    let current = set.record_quantization() as f64;
    if let Some(next) = resolve(token, current, &domain, Some(&RQ_VALUES), ctx.rng) {
        set.set_record_quantization(next as usize);
    }
}

fn scene_fire(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    if let Some(index) = resolve_scene(args, &*set, ctx.rng) {
        set.fire_scene(index);
    }
}

fn scene_select(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    if let Some(index) = resolve_scene(args, &*set, ctx.rng) {
        set.select_scene(index);
    }
}

/// Move the arrangement playhead by a signed number of beats.
fn jump(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    match args.trim().parse::<f64>() {
        Ok(beats) if beats.is_finite() => set.jump_by(beats),
        _ => debug!("JUMP needs a beat offset, got {args:?}"),
    }
}

/// Arrangement loop: on/off/toggle, a literal length, or `*N` / `/N`.
fn arrangement_loop(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let args = args.trim();
    if let Some(factor) = args.strip_prefix('*') {
        if let Ok(f) = factor.parse::<f64>() {
            if f > 0.0 {
                set.set_loop_length(set.loop_length() * f);
            }
        }
        return;
    }
    if let Some(divisor) = args.strip_prefix('/') {
        if let Ok(d) = divisor.parse::<f64>() {
            if d > 0.0 {
                set.set_loop_length(set.loop_length() / d);
            }
        }
        return;
    }
    if let Ok(beats) = args.parse::<f64>() {
        if beats > 0.0 {
            set.set_loop_length(beats);
        }
        return;
    }
    let next = resolve_toggle(args, set.loop_on());
    set.set_loop_on(next);
}

/// Cue-point jumps: `LOC 2`, `LOC "Chorus"`, `LOC >`, `LOC <2`.
fn loc(set: &mut dyn LiveSet, _ctx: &mut ActionCtx, args: &str) {
    let args = args.trim();
    if args.is_empty() {
        debug!("LOC needs a locator");
        return;
    }
    if let Some(rest) = args.strip_prefix('>') {
        step_cue(set, rest, true);
        return;
    }
    if let Some(rest) = args.strip_prefix('<') {
        step_cue(set, rest, false);
        return;
    }
    if let Some(name) = args.strip_prefix('"') {
        let Some(close) = name.find('"') else { return };
        let name = &name[..close];
        for i in 0..set.cue_count() {
            if set.cue(i).is_some_and(|c| c.name().eq_ignore_ascii_case(name)) {
                set.jump_to_cue(i);
                return;
            }
        }
        debug!("no cue point named {name:?}");
        return;
    }
    if let Some(n) = args.parse::<usize>().ok().filter(|n| *n >= 1) {
        if n - 1 < set.cue_count() {
            set.jump_to_cue(n - 1);
        }
    }
}

/// Jump `steps` cue points forward or back from the current time.
fn step_cue(set: &mut dyn LiveSet, magnitude: &str, forward: bool) {
    let steps = if magnitude.trim().is_empty() {
        1
    } else {
        match magnitude.trim().parse::<usize>() {
            Ok(n) if n >= 1 => n,
            _ => return,
        }
    };
    for _ in 0..steps {
        let now = set.current_time();
        let mut best: Option<(usize, f64)> = None;
        for i in 0..set.cue_count() {
            let Some(time) = set.cue(i).map(|c| c.time()) else { continue };
            let candidate = if forward { time > now } else { time < now };
            if !candidate {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, t)) => {
                    if forward {
                        time < t
                    } else {
                        time > t
                    }
                }
            };
            if better {
                best = Some((i, time));
            }
        }
        match best {
            Some((i, _)) => set.jump_to_cue(i),
            None => return,
        }
    }
}

fn xfader(set: &mut dyn LiveSet, ctx: &mut ActionCtx, args: &str) {
    let domain = Domain::midi(-1.0, 1.0, Some(0.0));
    if let Some(next) = resolve(args, set.crossfader(), &domain, None, ctx.rng) {
        set.set_crossfader(next);
    }
}
