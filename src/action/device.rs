//! Device actions — activity switch, parameter writes, chain and macro access.
//!
//! `DEV` alone toggles the first device, `DEV2.1.3 SET P4 RND` walks into a
//! rack. Parameter indices count from `P1` and skip the on/off switch, which
//! only the activity actions touch.

use std::collections::HashMap;

use log::{debug, error};
use rand::Rng;

use crate::host::{Device, LiveSet, Param, Track};
use crate::parse::{resolve, resolve_toggle, Domain};
use crate::target::{device_at_mut, resolve_device};

use super::{split_selector, split_word, ActionCtx, DeviceHandler};

pub fn table() -> HashMap<&'static str, DeviceHandler> {
    let mut t: HashMap<&'static str, DeviceHandler> = HashMap::new();
    t.insert("ON", on);
    t.insert("OFF", off);
    t.insert("SET", set_param);
    t.insert("RND", randomize);
    t.insert("RESET", reset);
    t.insert("SEL", select);
    t.insert("CSEL", chain_select);
    t.insert("P1", p1);
    t.insert("P2", p2);
    t.insert("P3", p3);
    t.insert("P4", p4);
    t.insert("P5", p5);
    t.insert("P6", p6);
    t.insert("P7", p7);
    t.insert("P8", p8);
    t
}

/// Resolve the device selector, then run the sub-action. No sub-action means
/// toggle the device's activity.
pub fn dispatch(
    set: &mut dyn LiveSet,
    track: usize,
    text: &str,
    ctx: &mut ActionCtx,
    table: &HashMap<&'static str, DeviceHandler>,
) {
    let (selector, rest) = split_selector(text);
    let path = match set.track(track) {
        Some(t) => resolve_device(selector, t),
        None => None,
    };
    let Some(path) = path else {
        debug!("{}: no device for selector {selector:?} on track {track}", ctx.ident);
        return;
    };
    let (sub, args) = split_word(rest);
    if sub.is_empty() {
        toggle(set, track, &path, ctx, "");
        return;
    }
    let Some(&handler) = table.get(sub) else {
        error!("{}: unknown device action {sub:?}, dropped", ctx.ident);
        return;
    };
    handler(set, track, &path, ctx, args);
}

fn toggle(set: &mut dyn LiveSet, track: usize, path: &[usize], _ctx: &mut ActionCtx, args: &str) {
    if let Some(device) = device(set, track, path) {
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

/// `SET P4 RND`, `SET "Frequency" >5`. Continuous parameters scale 0-127
/// input over their range; quantized ones take step values directly.
fn set_param(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, args: &str) {
    let (selector, token) = split_selector(args.trim());
    let Some(device) = device(set, track, path) else { return };
    let Some(index) = param_index(device, selector) else {
        debug!("{}: no parameter {selector:?} on {}", ctx.ident, device.name());
        return;
    };
    write_param(device, index, token, ctx);
}

fn param_index(device: &dyn Device, selector: &str) -> Option<usize> {
    if let Some(name) = selector.strip_prefix('"') {
        let name = name.strip_suffix('"').unwrap_or(name);
        return (0..device.param_count())
            .find(|&i| device.param(i).is_some_and(|p| p.name().eq_ignore_ascii_case(name)));
    }
    let number = selector.strip_prefix(['P', 'p']).unwrap_or(selector);
    let n = number.parse::<usize>().ok()?;
    (n >= 1 && n <= device.param_count()).then(|| n - 1)
}

fn write_param(device: &mut dyn Device, index: usize, token: &str, ctx: &mut ActionCtx) {
    let Some(param) = device.param_mut(index) else { return };
    let default = Some(param.default_value());
    let domain = if param.is_quantized() {
        Domain::direct(param.min(), param.max(), default)
    } else {
        Domain::midi(param.min(), param.max(), default)
    };
    if let Some(next) = resolve(token, param.value(), &domain, None, ctx.rng) {
        param.set_value(next);
    }
}

/// Randomize every continuous parameter. Quantized ones keep their value so
/// a randomize pass never flips modes or switches.
fn randomize(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, _args: &str) {
    let Some(device) = device(set, track, path) else { return };
    for i in 0..device.param_count() {
        let Some(param) = device.param_mut(i) else { continue };
        if param.is_quantized() {
            continue;
        }
        let value = ctx.rng.gen_range(param.min()..=param.max());
        param.set_value(value);
    }
}

/// Return every continuous parameter to its default.
fn reset(set: &mut dyn LiveSet, track: usize, path: &[usize], _ctx: &mut ActionCtx, _args: &str) {
    let Some(device) = device(set, track, path) else { return };
    for i in 0..device.param_count() {
        let Some(param) = device.param_mut(i) else { continue };
        if param.is_quantized() {
            continue;
        }
        let default = param.default_value();
        param.set_value(default);
    }
}

/// Selection is a top-level notion, so a nested path selects its rack.
fn select(set: &mut dyn LiveSet, track: usize, path: &[usize], _ctx: &mut ActionCtx, _args: &str) {
    if let Some(t) = set.track_mut(track) {
        t.select_device(path[0]);
    }
}

fn chain_select(set: &mut dyn LiveSet, track: usize, path: &[usize], ctx: &mut ActionCtx, args: &str) {
    let Some(device) = device(set, track, path) else { return };
    let chains = device.chain_count();
    if chains == 0 {
        debug!("{}: {} has no chains", ctx.ident, device.name());
        return;
    }
    let domain = Domain::index(chains, true);
    let current = device.selected_chain() as f64;
    if let Some(next) = resolve(args, current, &domain, None, ctx.rng) {
        device.select_chain(next as usize);
    }
}

fn macro_param(
    set: &mut dyn LiveSet,
    track: usize,
    path: &[usize],
    ctx: &mut ActionCtx,
    index: usize,
    args: &str,
) {
    let Some(device) = device(set, track, path) else { return };
    if index >= device.param_count() {
        debug!("{}: {} has no parameter {}", ctx.ident, device.name(), index + 1);
        return;
    }
    write_param(device, index, args, ctx);
}

fn p1(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 0, a);
}
fn p2(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 1, a);
}
fn p3(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 2, a);
}
fn p4(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 3, a);
}
fn p5(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 4, a);
}
fn p6(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 5, a);
}
fn p7(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 6, a);
}
fn p8(s: &mut dyn LiveSet, t: usize, p: &[usize], c: &mut ActionCtx, a: &str) {
    macro_param(s, t, p, c, 7, a);
}

fn device<'a>(
    set: &'a mut dyn LiveSet,
    track: usize,
    path: &[usize],
) -> Option<&'a mut dyn Device> {
    device_at_mut(set.track_mut(track)?, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TestCtx;
    use crate::host::{SimDevice, SimSet};
    use assert_approx_eq::assert_approx_eq;

    fn set() -> SimSet {
        let mut s = SimSet::new(2, 0, 4);
        s.add_device(0, SimDevice::with_macros("Bass Rack"));
        let echo = SimDevice::new(
            "Echo",
            "AudioEffectDevice",
            vec![crate::host::SimParam::continuous("Dry/Wet", 0.0, 1.0, 0.3)],
        );
        s.add_device(0, echo);
        s
    }

    fn run(s: &mut SimSet, tc: &mut TestCtx, track: usize, text: &str) {
        let table = table();
        dispatch(s, track, text, &mut tc.ctx(), &table);
    }

    #[test]
    fn bare_dev_toggles_the_first_device() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "");
        assert!(!s.tracks[0].devices[0].active);
        run(&mut s, &mut tc, 0, " ON");
        assert!(s.tracks[0].devices[0].active);
    }

    #[test]
    fn numbered_selector_picks_the_device() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "2 OFF");
        assert!(!s.tracks[0].devices[1].active);
        assert!(s.tracks[0].devices[0].active);
    }

    #[test]
    fn set_by_macro_number_scales_controller_input() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "1 SET P1 127");
        let p = &s.tracks[0].devices[0].params[0];
        assert_approx_eq!(p.value, p.max, 1e-9);
    }

    #[test]
    fn set_by_quoted_name() {
        let mut s = set();
        let mut tc = TestCtx::new();
        let name = format!("\"{}\"", s.tracks[0].devices[0].params[2].name);
        run(&mut s, &mut tc, 0, &format!("1 SET {name} 64"));
        assert!(s.tracks[0].devices[0].params[2].value > 0.0);
    }

    #[test]
    fn macro_shortcuts_write_their_slot() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "1 P3 127");
        let p = &s.tracks[0].devices[0].params[2];
        assert_approx_eq!(p.value, p.max, 1e-9);
    }

    #[test]
    fn randomize_leaves_quantized_params_alone() {
        let mut s = set();
        s.tracks[0].devices[1].params.push(crate::host::SimParam::stepped("Mode", 4));
        let before = s.tracks[0].devices[1].params.last().unwrap().value;
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "2 RND");
        assert_approx_eq!(s.tracks[0].devices[1].params.last().unwrap().value, before, 1e-9);
    }

    #[test]
    fn reset_returns_continuous_params_to_default() {
        let mut s = set();
        s.tracks[0].devices[0].params[0].value = 0.9;
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "1 RESET");
        let p = &s.tracks[0].devices[0].params[0];
        assert_approx_eq!(p.value, p.default, 1e-9);
    }

    #[test]
    fn sel_appoints_the_rack() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "2 SEL");
        assert_eq!(s.tracks[0].selected_device, Some(1));
    }

    #[test]
    fn unknown_sub_action_is_dropped() {
        let mut s = set();
        let mut tc = TestCtx::new();
        run(&mut s, &mut tc, 0, "1 WOBBLE 42");
        assert!(s.tracks[0].devices[0].active);
    }
}
