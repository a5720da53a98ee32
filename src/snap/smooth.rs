//! Parameter smoothing — tick-driven ramps and macro-blended morphs.
//!
//! Continuous parameters recalled with a ramp move by a fixed per-tick
//! delta until they arrive or the tick budget runs out. Ramps are keyed by
//! parameter address: installing a second ramp on the same address
//! overwrites the first, and cancellation is an explicit [`Smoother::clear`]
//! before installing replacements. A morph set holds (from, to) pairs
//! instead and is driven entirely by an external macro value.

use std::collections::HashMap;

use log::debug;

use crate::host::{Device, LiveSet, Param, Track};
use crate::target::{device_at, device_at_mut};

/// Address of one scalar host parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamPath {
    Tempo,
    Crossfader,
    Volume(usize),
    Pan(usize),
    Send(usize, usize),
    DeviceParam {
        track: usize,
        device: Vec<usize>,
        param: usize,
    },
}

/// Read a parameter through the capability surface. `None` when the entity
/// has vanished.
pub fn read_param(set: &dyn LiveSet, path: &ParamPath) -> Option<f64> {
    match path {
        ParamPath::Tempo => Some(set.tempo()),
        ParamPath::Crossfader => Some(set.crossfader()),
        ParamPath::Volume(t) => set.track(*t).map(|t| t.volume()),
        ParamPath::Pan(t) => set.track(*t).map(|t| t.pan()),
        ParamPath::Send(t, s) => set.track(*t).and_then(|t| t.send(*s)),
        ParamPath::DeviceParam { track, device, param } => {
            let track = set.track(*track)?;
            device_at(track, device)?.param(*param).map(|p| p.value())
        }
    }
}

/// Write a parameter. Vanished entities are quietly skipped.
pub fn write_param(set: &mut dyn LiveSet, path: &ParamPath, value: f64) {
    match path {
        ParamPath::Tempo => set.set_tempo(value),
        ParamPath::Crossfader => set.set_crossfader(value),
        ParamPath::Volume(t) => {
            if let Some(track) = set.track_mut(*t) {
                track.set_volume(value);
            }
        }
        ParamPath::Pan(t) => {
            if let Some(track) = set.track_mut(*t) {
                track.set_pan(value);
            }
        }
        ParamPath::Send(t, s) => {
            if let Some(track) = set.track_mut(*t) {
                track.set_send(*s, value);
            }
        }
        ParamPath::DeviceParam { track, device, param } => {
            if let Some(track) = set.track_mut(*track) {
                if let Some(device) = device_at_mut(track, device) {
                    if let Some(p) = device.param_mut(*param) {
                        p.set_value(value);
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct Ramp {
    target: f64,
    delta: f64,
    ticks_left: u32,
}

#[derive(Debug, Clone, Copy)]
struct MorphPair {
    from: f64,
    to: f64,
    quantized: bool,
}

/// All in-flight ramps plus the current morph set.
#[derive(Debug, Default)]
pub struct Smoother {
    ramps: HashMap<ParamPath, Ramp>,
    morph: HashMap<ParamPath, MorphPair>,
}

impl Smoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a ramp from `current` toward `target` over `ticks` ticks.
    pub fn ramp(&mut self, path: ParamPath, current: f64, target: f64, ticks: u32) {
        let ticks = ticks.max(1);
        let delta = (target - current) / f64::from(ticks);
        self.ramps.insert(
            path,
            Ramp {
                target,
                delta,
                ticks_left: ticks,
            },
        );
    }

    /// Drop every pending ramp.
    pub fn clear(&mut self) {
        self.ramps.clear();
    }

    pub fn pending(&self) -> usize {
        self.ramps.len()
    }

    /// Advance all ramps by one tick, writing through to the set.
    pub fn tick(&mut self, set: &mut dyn LiveSet) {
        let mut done = Vec::new();
        for (path, ramp) in self.ramps.iter_mut() {
            let Some(current) = read_param(set, path) else {
                debug!("dropping ramp on vanished parameter {path:?}");
                done.push(path.clone());
                continue;
            };
            ramp.ticks_left -= 1;
            let next = if ramp.ticks_left == 0 {
                ramp.target
            } else if ramp.delta >= 0.0 {
                (current + ramp.delta).min(ramp.target)
            } else {
                (current + ramp.delta).max(ramp.target)
            };
            write_param(set, path, next);
            if ramp.ticks_left == 0 || (next - ramp.target).abs() < f64::EPSILON {
                done.push(path.clone());
            }
        }
        for path in done {
            self.ramps.remove(&path);
        }
    }

    /// Replace the morph set with a fresh one.
    pub fn clear_morph(&mut self) {
        self.morph.clear();
    }

    /// Remember a (from, to) pair for macro-driven blending.
    pub fn store_morph(&mut self, path: ParamPath, from: f64, to: f64, quantized: bool) {
        self.morph.insert(path, MorphPair { from, to, quantized });
    }

    pub fn morph_len(&self) -> usize {
        self.morph.len()
    }

    /// Blend every morph pair by a 0-127 macro value. Quantized parameters
    /// snap at the midpoint instead of interpolating.
    pub fn apply_morph(&self, set: &mut dyn LiveSet, amount: u8) {
        let t = f64::from(amount.min(127)) / 127.0;
        for (path, pair) in &self.morph {
            let value = if pair.quantized {
                if t >= 0.5 {
                    pair.to
                } else {
                    pair.from
                }
            } else {
                pair.from + (pair.to - pair.from) * t
            };
            write_param(set, path, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimSet;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn ramp_arrives_in_equal_steps() {
        let mut set = SimSet::new(1, 0, 2);
        set.tracks[0].volume = 0.0;
        let mut smoother = Smoother::new();
        smoother.ramp(ParamPath::Volume(0), 0.0, 0.8, 4);
        for _ in 0..3 {
            smoother.tick(&mut set);
        }
        assert_approx_eq!(set.tracks[0].volume, 0.6, 1e-9);
        smoother.tick(&mut set);
        assert_approx_eq!(set.tracks[0].volume, 0.8, 1e-9);
        assert_eq!(smoother.pending(), 0);
    }

    #[test]
    fn later_ramp_overwrites_the_earlier_one() {
        let mut set = SimSet::new(1, 0, 2);
        set.tracks[0].volume = 0.0;
        let mut smoother = Smoother::new();
        smoother.ramp(ParamPath::Volume(0), 0.0, 1.0, 100);
        smoother.ramp(ParamPath::Volume(0), 0.0, 0.2, 2);
        assert_eq!(smoother.pending(), 1);
        smoother.tick(&mut set);
        smoother.tick(&mut set);
        assert_approx_eq!(set.tracks[0].volume, 0.2, 1e-9);
    }

    #[test]
    fn clear_cancels_pending_ramps() {
        let mut set = SimSet::new(1, 0, 2);
        let before = set.tracks[0].volume;
        let mut smoother = Smoother::new();
        smoother.ramp(ParamPath::Volume(0), before, 0.1, 10);
        smoother.clear();
        smoother.tick(&mut set);
        assert_approx_eq!(set.tracks[0].volume, before, 1e-9);
    }

    #[test]
    fn tempo_rides_the_same_machinery() {
        let mut set = SimSet::new(1, 0, 2);
        set.tempo = 120.0;
        let mut smoother = Smoother::new();
        smoother.ramp(ParamPath::Tempo, 120.0, 128.0, 8);
        for _ in 0..8 {
            smoother.tick(&mut set);
        }
        assert_approx_eq!(set.tempo, 128.0, 1e-9);
    }

    #[test]
    fn vanished_parameter_drops_its_ramp() {
        let mut set = SimSet::new(2, 0, 2);
        let mut smoother = Smoother::new();
        smoother.ramp(ParamPath::Send(0, 4), 0.0, 1.0, 4);
        smoother.tick(&mut set);
        assert_eq!(smoother.pending(), 0);
    }

    #[test]
    fn morph_blends_continuous_and_snaps_quantized() {
        let mut set = SimSet::new(1, 0, 2);
        let mut smoother = Smoother::new();
        smoother.store_morph(ParamPath::Volume(0), 0.0, 1.0, false);
        smoother.store_morph(ParamPath::Pan(0), -1.0, 1.0, true);
        smoother.apply_morph(&mut set, 32);
        assert_approx_eq!(set.tracks[0].volume, 32.0 / 127.0, 1e-9);
        assert_approx_eq!(set.tracks[0].pan, -1.0, 1e-9);
        smoother.apply_morph(&mut set, 127);
        assert_approx_eq!(set.tracks[0].volume, 1.0, 1e-9);
        assert_approx_eq!(set.tracks[0].pan, 1.0, 1e-9);
    }
}
