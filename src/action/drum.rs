//! Drum-rack actions — pad mute and solo, addressed by position or name.
//!
//! Pads are the rack's note-carrying chains, numbered from 1 in chain order.
//! `DR3 MUTE` works one pad, `DR MUTE OFF` sweeps all of them, and the
//! blanket `UNMUTE`/`UNSOLO` clear a whole kit at once.

use std::collections::HashMap;

use log::{debug, error};

use crate::host::{Chain, Device, LiveSet};
use crate::parse::resolve_toggle;
use crate::target::{device_at_mut, find_drum_rack};

use super::{split_selector, split_word, ActionCtx, DrumHandler};

pub fn table() -> HashMap<&'static str, DrumHandler> {
    let mut t: HashMap<&'static str, DrumHandler> = HashMap::new();
    t.insert("MUTE", mute);
    t.insert("SOLO", solo);
    t.insert("UNMUTE", unmute);
    t.insert("UNSOLO", unsolo);
    t
}

/// Find the track's drum rack, resolve the pad selector, run the sub-action.
pub fn dispatch(
    set: &mut dyn LiveSet,
    track: usize,
    text: &str,
    ctx: &mut ActionCtx,
    table: &HashMap<&'static str, DrumHandler>,
) {
    let path = match set.track(track) {
        Some(t) => find_drum_rack(t),
        None => None,
    };
    let Some(path) = path else {
        debug!("{}: track {track} has no drum rack", ctx.ident);
        return;
    };
    let (selector, rest) = split_selector(text);
    let (sub, args) = split_word(rest);
    if sub.is_empty() {
        error!("{}: DR needs a sub-action, dropped", ctx.ident);
        return;
    }
    let Some(&handler) = table.get(sub) else {
        error!("{}: unknown drum action {sub:?}, dropped", ctx.ident);
        return;
    };
    let pad = match set.track(track).and_then(|t| crate::target::device_at(t, &path)) {
        Some(rack) => match resolve_pad(rack, selector) {
            Ok(pad) => pad,
            Err(()) => {
                debug!("{}: no pad for selector {selector:?}", ctx.ident);
                return;
            }
        },
        None => return,
    };
    handler(set, track, &path, pad, ctx, args);
}

/// `Ok(None)` means every pad; a selector that matches nothing is `Err`.
fn resolve_pad(rack: &dyn Device, selector: &str) -> Result<Option<usize>, ()> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Ok(None);
    }
    if let Some(name) = selector.strip_prefix('"') {
        let name = name.strip_suffix('"').unwrap_or(name);
        return pads(rack)
            .into_iter()
            .find(|&c| rack.chain(c).is_some_and(|ch| ch.name().eq_ignore_ascii_case(name)))
            .map(Some)
            .ok_or(());
    }
    let n = selector.parse::<usize>().map_err(|_| ())?;
    pads(rack).get(n.checked_sub(1).ok_or(())?).copied().map(Some).ok_or(())
}

/// Chain indices that carry a note, in chain order.
fn pads(rack: &dyn Device) -> Vec<usize> {
    (0..rack.chain_count())
        .filter(|&c| rack.chain(c).and_then(|ch| ch.note()).is_some())
        .collect()
}

fn mute(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    pad: Option<usize>,
    _ctx: &mut ActionCtx,
    args: &str,
) {
    each_pad(set, track, path, pad, &mut |ch| {
        let next = resolve_toggle(args, ch.is_muted());
        ch.set_muted(next);
    });
}

fn solo(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    pad: Option<usize>,
    _ctx: &mut ActionCtx,
    args: &str,
) {
    each_pad(set, track, path, pad, &mut |ch| {
        let next = resolve_toggle(args, ch.is_soloed());
        ch.set_soloed(next);
    });
}

fn unmute(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    pad: Option<usize>,
    _ctx: &mut ActionCtx,
    _args: &str,
) {
    each_pad(set, track, path, pad, &mut |ch| ch.set_muted(false));
}

fn unsolo(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    pad: Option<usize>,
    _ctx: &mut ActionCtx,
    _args: &str,
) {
    each_pad(set, track, path, pad, &mut |ch| ch.set_soloed(false));
}

fn each_pad(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    pad: Option<usize>,
    edit: &mut dyn FnMut(&mut dyn Chain),
) {
    let Some(track) = set.track_mut(track) else { return };
    let Some(rack) = device_at_mut(track, path) else { return };
    let targets = match pad {
        Some(c) => vec![c],
        None => pads(rack),
    };
    for c in targets {
        if let Some(chain) = rack.chain_mut(c) {
            edit(chain);
        }
    }
}
