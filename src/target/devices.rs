//! Device resolution — selectors and rack-chain paths.
//!
//! A device lives at a path on its track: `[d]` for a top-level device, or
//! `[d, c, d, ...]` alternating device and chain indices when the selector
//! walks into racks (`DEV2.1.3` = second device, first chain, third device).
//! Paths are resolved fresh at every use; a stale path simply stops
//! resolving.

use crate::host::{Chain, Device, Track};

/// Walk a path to a device, immutably.
pub fn device_at<'a>(track: &'a dyn Track, path: &[usize]) -> Option<&'a dyn Device> {
    let (&first, rest) = path.split_first()?;
    let mut device = track.device(first)?;
    let mut rest = rest;
    while !rest.is_empty() {
        let chain_ix = rest[0];
        let dev_ix = *rest.get(1)?;
        let chain: &dyn Chain = device.chain(chain_ix)?;
        device = chain.device(dev_ix)?;
        rest = &rest[2..];
    }
    Some(device)
}

/// Walk a path to a device, mutably.
pub fn device_at_mut<'a>(track: &'a mut dyn Track, path: &[usize]) -> Option<&'a mut dyn Device> {
    let (&first, rest) = path.split_first()?;
    let mut device = track.device_mut(first)?;
    let mut rest = rest;
    while !rest.is_empty() {
        let chain_ix = rest[0];
        let dev_ix = *rest.get(1)?;
        let chain = device.chain_mut(chain_ix)?;
        device = chain.device_mut(dev_ix)?;
        rest = &rest[2..];
    }
    Some(device)
}

/// Resolve the selector text following `DEV` into a concrete path.
///
/// Empty = first device; `SEL` = the track's selected device; `"Name"` =
/// top-level name lookup; `2` or `2.1.3` = 1-based dotted indices.
pub fn resolve_device(selector: &str, track: &dyn Track) -> Option<Vec<usize>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return if track.device_count() > 0 { Some(vec![0]) } else { None };
    }
    if selector.eq_ignore_ascii_case("SEL") {
        return track.selected_device().map(|i| vec![i]);
    }
    if let Some(name) = quoted(selector) {
        for i in 0..track.device_count() {
            if track.device(i)?.name().eq_ignore_ascii_case(name) {
                return Some(vec![i]);
            }
        }
        return None;
    }
    let mut path = Vec::new();
    for piece in selector.split('.') {
        let n = piece.trim().parse::<usize>().ok().filter(|n| *n >= 1)? - 1;
        path.push(n);
    }
    // Dotted steps alternate device.chain.device..., so a valid path is odd.
    if path.len() % 2 == 0 {
        return None;
    }
    device_at(track, &path).map(|_| path)
}

/// Depth-first scan over a track's devices, descending into rack chains.
/// Returns the path of the first device satisfying `pred`.
pub fn scan_devices(track: &dyn Track, pred: &dyn Fn(&dyn Device) -> bool) -> Option<Vec<usize>> {
    for i in 0..track.device_count() {
        let device = track.device(i)?;
        if let Some(path) = scan_one(device, pred) {
            let mut full = vec![i];
            full.extend(path);
            return Some(full);
        }
    }
    None
}

fn scan_one(device: &dyn Device, pred: &dyn Fn(&dyn Device) -> bool) -> Option<Vec<usize>> {
    if pred(device) {
        return Some(Vec::new());
    }
    for c in 0..device.chain_count() {
        let chain = device.chain(c)?;
        for d in 0..chain.device_count() {
            if let Some(path) = scan_one(chain.device(d)?, pred) {
                let mut full = vec![c, d];
                full.extend(path);
                return Some(full);
            }
        }
    }
    None
}

/// First device on the track with the given host class name.
pub fn find_by_class(track: &dyn Track, class: &str) -> Option<Vec<usize>> {
    scan_devices(track, &|d: &dyn Device| d.class_name().eq_ignore_ascii_case(class))
}

/// First device with drum pads (chains carrying a note).
pub fn find_drum_rack(track: &dyn Track) -> Option<Vec<usize>> {
    scan_devices(track, &|d: &dyn Device| {
        (0..d.chain_count()).any(|c| d.chain(c).and_then(|ch| ch.note()).is_some())
    })
}

fn quoted(selector: &str) -> Option<&str> {
    let rest = selector.strip_prefix('"')?;
    let close = rest.find('"')?;
    Some(&rest[..close])
}
