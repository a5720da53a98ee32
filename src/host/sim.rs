//! In-memory live set — the reference host used by tests and the console demo.
//!
//! Every field is plain data behind the capability traits, so tests can
//! assemble a set, fire triggers at it, and assert on the resulting state.

use super::{
    Chain, Clip, CrossfadeAssign, CuePoint, Device, LiveSet, MonitorState, Param, Scene, Track,
    TrackKind, TriggerRef,
};

/// Simulated device parameter.
#[derive(Debug, Clone)]
pub struct SimParam {
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub default: f64,
    pub quantized: bool,
}

impl SimParam {
    /// Continuous parameter over `[min, max]`, starting at its default.
    pub fn continuous(name: &str, min: f64, max: f64, default: f64) -> SimParam {
        SimParam {
            name: name.to_string(),
            value: default,
            min,
            max,
            default,
            quantized: false,
        }
    }

    /// Quantized parameter stepping over `0..=steps-1`.
    pub fn stepped(name: &str, steps: usize) -> SimParam {
        SimParam {
            name: name.to_string(),
            value: 0.0,
            min: 0.0,
            max: steps.saturating_sub(1) as f64,
            default: 0.0,
            quantized: true,
        }
    }
}

impl Param for SimParam {
    fn name(&self) -> &str {
        &self.name
    }
    fn value(&self) -> f64 {
        self.value
    }
    fn set_value(&mut self, value: f64) {
        self.value = value.clamp(self.min, self.max);
    }
    fn min(&self) -> f64 {
        self.min
    }
    fn max(&self) -> f64 {
        self.max
    }
    fn default_value(&self) -> f64 {
        self.default
    }
    fn is_quantized(&self) -> bool {
        self.quantized
    }
}

/// Simulated rack chain (or drum pad, when `note` is set).
#[derive(Debug, Clone, Default)]
pub struct SimChain {
    pub name: String,
    pub note: Option<u8>,
    pub muted: bool,
    pub soloed: bool,
    pub devices: Vec<SimDevice>,
}

impl SimChain {
    pub fn named(name: &str) -> SimChain {
        SimChain {
            name: name.to_string(),
            ..SimChain::default()
        }
    }

    /// A drum pad responding to `note`.
    pub fn pad(name: &str, note: u8) -> SimChain {
        SimChain {
            name: name.to_string(),
            note: Some(note),
            ..SimChain::default()
        }
    }
}

impl Chain for SimChain {
    fn name(&self) -> &str {
        &self.name
    }
    fn note(&self) -> Option<u8> {
        self.note
    }
    fn is_muted(&self) -> bool {
        self.muted
    }
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
    fn is_soloed(&self) -> bool {
        self.soloed
    }
    fn set_soloed(&mut self, soloed: bool) {
        self.soloed = soloed;
    }
    fn device_count(&self) -> usize {
        self.devices.len()
    }
    fn device(&self, index: usize) -> Option<&dyn Device> {
        self.devices.get(index).map(|d| d as &dyn Device)
    }
    fn device_mut(&mut self, index: usize) -> Option<&mut dyn Device> {
        self.devices.get_mut(index).map(|d| d as &mut dyn Device)
    }
}

/// Simulated device.
#[derive(Debug, Clone)]
pub struct SimDevice {
    pub name: String,
    pub class_name: String,
    pub active: bool,
    pub params: Vec<SimParam>,
    pub chains: Vec<SimChain>,
    pub selected_chain: usize,
}

impl SimDevice {
    pub fn new(name: &str, class_name: &str, params: Vec<SimParam>) -> SimDevice {
        SimDevice {
            name: name.to_string(),
            class_name: class_name.to_string(),
            active: true,
            params,
            chains: Vec::new(),
            selected_chain: 0,
        }
    }

    /// A generic synth-like device with eight macro parameters.
    pub fn with_macros(name: &str) -> SimDevice {
        let params = (1..=8)
            .map(|i| SimParam::continuous(&format!("Macro {i}"), 0.0, 127.0, 0.0))
            .collect();
        SimDevice::new(name, "InstrumentGroupDevice", params)
    }

    /// A looper device with the transport-state parameter the engine expects.
    pub fn looper() -> SimDevice {
        let state = SimParam::stepped("State", 4);
        let reverse = SimParam::stepped("Reverse", 2);
        let speed = SimParam::continuous("Speed", -24.0, 24.0, 0.0);
        SimDevice::new("Looper", "Looper", vec![state, reverse, speed])
    }

    /// A drum rack with one pad per `(name, note)` pair.
    pub fn drum_rack(pads: &[(&str, u8)]) -> SimDevice {
        let mut dev = SimDevice::new("Drums", "DrumGroupDevice", Vec::new());
        dev.chains = pads.iter().map(|(n, note)| SimChain::pad(n, *note)).collect();
        dev
    }
}

impl Device for SimDevice {
    fn name(&self) -> &str {
        &self.name
    }
    fn class_name(&self) -> &str {
        &self.class_name
    }
    fn is_active(&self) -> bool {
        self.active
    }
    fn set_active(&mut self, active: bool) {
        self.active = active;
    }
    fn param_count(&self) -> usize {
        self.params.len()
    }
    fn param(&self, index: usize) -> Option<&dyn Param> {
        self.params.get(index).map(|p| p as &dyn Param)
    }
    fn param_mut(&mut self, index: usize) -> Option<&mut dyn Param> {
        self.params.get_mut(index).map(|p| p as &mut dyn Param)
    }
    fn chain_count(&self) -> usize {
        self.chains.len()
    }
    fn chain(&self, index: usize) -> Option<&dyn Chain> {
        self.chains.get(index).map(|c| c as &dyn Chain)
    }
    fn chain_mut(&mut self, index: usize) -> Option<&mut dyn Chain> {
        self.chains.get_mut(index).map(|c| c as &mut dyn Chain)
    }
    fn selected_chain(&self) -> usize {
        self.selected_chain
    }
    fn select_chain(&mut self, index: usize) {
        if index < self.chains.len() {
            self.selected_chain = index;
        }
    }
}

/// Simulated session clip.
#[derive(Debug, Clone)]
pub struct SimClip {
    pub name: String,
    pub audio: bool,
    pub muted: bool,
    pub length: f64,
    pub looping: bool,
    pub loop_start: f64,
    pub loop_end: f64,
    pub warping: bool,
    pub gain: f64,
    pub pitch_coarse: i32,
    pub quantized_to: Option<u8>,
    pub envelopes: Vec<(usize, usize)>,
}

impl SimClip {
    pub fn named(name: &str) -> SimClip {
        SimClip {
            name: name.to_string(),
            audio: false,
            muted: false,
            length: 4.0,
            looping: true,
            loop_start: 0.0,
            loop_end: 4.0,
            warping: false,
            gain: 0.5,
            pitch_coarse: 0,
            quantized_to: None,
            envelopes: Vec::new(),
        }
    }

    pub fn audio(name: &str) -> SimClip {
        SimClip {
            audio: true,
            warping: true,
            ..SimClip::named(name)
        }
    }
}

impl Clip for SimClip {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
    fn is_audio(&self) -> bool {
        self.audio
    }
    fn is_muted(&self) -> bool {
        self.muted
    }
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
    fn length(&self) -> f64 {
        self.length
    }
    fn looping(&self) -> bool {
        self.looping
    }
    fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }
    fn loop_start(&self) -> f64 {
        self.loop_start
    }
    fn set_loop_start(&mut self, beats: f64) {
        self.loop_start = beats.max(0.0);
    }
    fn loop_end(&self) -> f64 {
        self.loop_end
    }
    fn set_loop_end(&mut self, beats: f64) {
        self.loop_end = beats.max(0.0);
    }
    fn warping(&self) -> bool {
        self.warping
    }
    fn set_warping(&mut self, warping: bool) {
        if self.audio {
            self.warping = warping;
        }
    }
    fn gain(&self) -> f64 {
        self.gain
    }
    fn set_gain(&mut self, gain: f64) {
        if self.audio {
            self.gain = gain.clamp(0.0, 1.0);
        }
    }
    fn pitch_coarse(&self) -> i32 {
        self.pitch_coarse
    }
    fn set_pitch_coarse(&mut self, semitones: i32) {
        if self.audio {
            self.pitch_coarse = semitones.clamp(-48, 48);
        }
    }
    fn quantize(&mut self, grid: u8) {
        if !self.audio {
            self.quantized_to = Some(grid);
        }
    }
    fn insert_envelope(&mut self, device: usize, param: usize) {
        if !self.envelopes.contains(&(device, param)) {
            self.envelopes.push((device, param));
        }
    }
    fn clear_envelopes(&mut self) {
        self.envelopes.clear();
    }
}

/// Simulated track.
#[derive(Debug, Clone)]
pub struct SimTrack {
    pub name: String,
    pub kind: TrackKind,
    pub volume: f64,
    pub pan: f64,
    pub sends: Vec<f64>,
    pub muted: bool,
    pub soloed: bool,
    pub armed: bool,
    pub monitor: MonitorState,
    pub crossfade: CrossfadeAssign,
    pub folded: bool,
    pub slots: Vec<Option<SimClip>>,
    pub playing: Option<usize>,
    pub devices: Vec<SimDevice>,
    pub selected_device: Option<usize>,
}

impl SimTrack {
    pub fn new(name: &str, kind: TrackKind, slots: usize, sends: usize) -> SimTrack {
        SimTrack {
            name: name.to_string(),
            kind,
            volume: 0.85,
            pan: 0.0,
            sends: vec![0.0; sends],
            muted: false,
            soloed: false,
            armed: false,
            monitor: MonitorState::Auto,
            crossfade: CrossfadeAssign::Off,
            folded: false,
            slots: vec![None; slots],
            playing: None,
            devices: Vec::new(),
            selected_device: None,
        }
    }
}

impl Track for SimTrack {
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }
    fn kind(&self) -> TrackKind {
        self.kind
    }
    fn volume(&self) -> f64 {
        self.volume
    }
    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }
    fn pan(&self) -> f64 {
        self.pan
    }
    fn set_pan(&mut self, pan: f64) {
        self.pan = pan.clamp(-1.0, 1.0);
    }
    fn send_count(&self) -> usize {
        self.sends.len()
    }
    fn send(&self, index: usize) -> Option<f64> {
        self.sends.get(index).copied()
    }
    fn set_send(&mut self, index: usize, level: f64) -> bool {
        match self.sends.get_mut(index) {
            Some(s) => {
                *s = level.clamp(0.0, 1.0);
                true
            }
            None => false,
        }
    }
    fn is_muted(&self) -> bool {
        self.muted
    }
    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }
    fn is_soloed(&self) -> bool {
        self.soloed
    }
    fn set_soloed(&mut self, soloed: bool) {
        self.soloed = soloed;
    }
    fn can_arm(&self) -> bool {
        matches!(self.kind, TrackKind::Audio | TrackKind::Midi)
    }
    fn is_armed(&self) -> bool {
        self.armed
    }
    fn set_armed(&mut self, armed: bool) {
        if self.can_arm() {
            self.armed = armed;
        }
    }
    fn monitor(&self) -> MonitorState {
        self.monitor
    }
    fn set_monitor(&mut self, state: MonitorState) {
        self.monitor = state;
    }
    fn crossfade(&self) -> CrossfadeAssign {
        self.crossfade
    }
    fn set_crossfade(&mut self, assign: CrossfadeAssign) {
        self.crossfade = assign;
    }
    fn is_folded(&self) -> bool {
        self.folded
    }
    fn set_folded(&mut self, folded: bool) {
        if self.kind == TrackKind::Group {
            self.folded = folded;
        }
    }
    fn slot_count(&self) -> usize {
        self.slots.len()
    }
    fn clip(&self, slot: usize) -> Option<&dyn Clip> {
        self.slots.get(slot).and_then(|s| s.as_ref()).map(|c| c as &dyn Clip)
    }
    fn clip_mut(&mut self, slot: usize) -> Option<&mut dyn Clip> {
        self.slots
            .get_mut(slot)
            .and_then(|s| s.as_mut())
            .map(|c| c as &mut dyn Clip)
    }
    fn playing_slot(&self) -> Option<usize> {
        self.playing
    }
    fn fire_slot(&mut self, slot: usize) {
        if slot >= self.slots.len() {
            return;
        }
        self.playing = if self.slots[slot].is_some() { Some(slot) } else { None };
    }
    fn stop_clips(&mut self) {
        self.playing = None;
    }
    fn device_count(&self) -> usize {
        self.devices.len()
    }
    fn device(&self, index: usize) -> Option<&dyn Device> {
        self.devices.get(index).map(|d| d as &dyn Device)
    }
    fn device_mut(&mut self, index: usize) -> Option<&mut dyn Device> {
        self.devices.get_mut(index).map(|d| d as &mut dyn Device)
    }
    fn selected_device(&self) -> Option<usize> {
        self.selected_device
    }
    fn select_device(&mut self, index: usize) {
        if index < self.devices.len() {
            self.selected_device = Some(index);
        }
    }
}

/// Simulated scene.
#[derive(Debug, Clone)]
pub struct SimScene {
    pub name: String,
}

impl Scene for SimScene {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Simulated cue point.
#[derive(Debug, Clone)]
pub struct SimCue {
    pub name: String,
    pub time: f64,
}

impl CuePoint for SimCue {
    fn name(&self) -> &str {
        &self.name
    }
    fn time(&self) -> f64 {
        self.time
    }
}

/// The simulated set. Tracks are stored in combined order already:
/// regular tracks, then returns, then the master.
#[derive(Debug, Clone)]
pub struct SimSet {
    pub tracks: Vec<SimTrack>,
    pub regular: usize,
    pub returns: usize,
    pub scenes: Vec<SimScene>,
    pub cues: Vec<SimCue>,
    pub selected_track: usize,
    pub selected_scene: usize,
    pub playing: bool,
    pub tempo: f64,
    pub groove: f64,
    pub metronome: bool,
    pub record: bool,
    pub session_record: bool,
    pub overdub: bool,
    pub time: f64,
    pub loop_on: bool,
    pub loop_length: f64,
    pub clip_q: usize,
    pub rec_q: usize,
    pub crossfader: f64,
    pub undo_count: usize,
    pub redo_count: usize,
    pub taps: usize,
    pub arranger_returns: usize,
}

impl SimSet {
    /// A set with `regular` unnamed audio tracks, `returns` return tracks,
    /// a master, and `scenes` empty slot rows per track.
    pub fn new(regular: usize, returns: usize, scenes: usize) -> SimSet {
        let mut tracks = Vec::with_capacity(regular + returns + 1);
        for _ in 0..regular {
            tracks.push(SimTrack::new("", TrackKind::Audio, scenes, returns));
        }
        for i in 0..returns {
            let name = format!("{} Return", (b'A' + i as u8) as char);
            tracks.push(SimTrack::new(&name, TrackKind::Return, 0, 0));
        }
        tracks.push(SimTrack::new("Master", TrackKind::Master, 0, 0));
        let scene_list = (0..scenes)
            .map(|i| SimScene {
                name: format!("Scene {}", i + 1),
            })
            .collect();
        SimSet {
            tracks,
            regular,
            returns,
            scenes: scene_list,
            cues: Vec::new(),
            selected_track: 0,
            selected_scene: 0,
            playing: false,
            tempo: 120.0,
            groove: 0.0,
            metronome: false,
            record: false,
            session_record: false,
            overdub: false,
            time: 0.0,
            loop_on: false,
            loop_length: 8.0,
            clip_q: 4,
            rec_q: 0,
            crossfader: 0.0,
            undo_count: 0,
            redo_count: 0,
            taps: 0,
            arranger_returns: 0,
        }
    }

    /// Place a clip in a slot, growing nothing; out-of-range requests are dropped.
    pub fn put_clip(&mut self, track: usize, slot: usize, clip: SimClip) {
        if let Some(t) = self.tracks.get_mut(track) {
            if let Some(s) = t.slots.get_mut(slot) {
                *s = Some(clip);
            }
        }
    }

    pub fn add_device(&mut self, track: usize, device: SimDevice) {
        if let Some(t) = self.tracks.get_mut(track) {
            t.devices.push(device);
        }
    }

    pub fn add_cue(&mut self, name: &str, time: f64) {
        self.cues.push(SimCue {
            name: name.to_string(),
            time,
        });
    }

    /// Direct access for assertions.
    pub fn sim_track(&self, index: usize) -> &SimTrack {
        &self.tracks[index]
    }
}

impl LiveSet for SimSet {
    fn track_count(&self) -> usize {
        self.tracks.len()
    }
    fn regular_track_count(&self) -> usize {
        self.regular
    }
    fn return_track_count(&self) -> usize {
        self.returns
    }
    fn track(&self, index: usize) -> Option<&dyn Track> {
        self.tracks.get(index).map(|t| t as &dyn Track)
    }
    fn track_mut(&mut self, index: usize) -> Option<&mut dyn Track> {
        self.tracks.get_mut(index).map(|t| t as &mut dyn Track)
    }
    fn selected_track(&self) -> usize {
        self.selected_track
    }
    fn select_track(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.selected_track = index;
        }
    }
    fn scene_count(&self) -> usize {
        self.scenes.len()
    }
    fn scene(&self, index: usize) -> Option<&dyn Scene> {
        self.scenes.get(index).map(|s| s as &dyn Scene)
    }
    fn selected_scene(&self) -> usize {
        self.selected_scene
    }
    fn select_scene(&mut self, index: usize) {
        if index < self.scenes.len() {
            self.selected_scene = index;
        }
    }
    fn fire_scene(&mut self, index: usize) {
        if index >= self.scenes.len() {
            return;
        }
        for t in &mut self.tracks {
            if t.slot_count() > 0 {
                t.fire_slot(index);
            }
        }
    }
    fn stop_all_clips(&mut self) {
        for t in &mut self.tracks {
            t.playing = None;
        }
    }
    fn is_playing(&self) -> bool {
        self.playing
    }
    fn start_playback(&mut self) {
        self.playing = true;
        self.time = 0.0;
    }
    fn stop_playback(&mut self) {
        self.playing = false;
    }
    fn continue_playback(&mut self) {
        self.playing = true;
    }
    fn tempo(&self) -> f64 {
        self.tempo
    }
    fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm.clamp(20.0, 999.0);
    }
    fn tap_tempo(&mut self) {
        self.taps += 1;
    }
    fn groove_amount(&self) -> f64 {
        self.groove
    }
    fn set_groove_amount(&mut self, amount: f64) {
        self.groove = amount.clamp(0.0, 1.0);
    }
    fn metronome(&self) -> bool {
        self.metronome
    }
    fn set_metronome(&mut self, on: bool) {
        self.metronome = on;
    }
    fn record_mode(&self) -> bool {
        self.record
    }
    fn set_record_mode(&mut self, on: bool) {
        self.record = on;
    }
    fn session_record(&self) -> bool {
        self.session_record
    }
    fn set_session_record(&mut self, on: bool) {
        self.session_record = on;
    }
    fn overdub(&self) -> bool {
        self.overdub
    }
    fn set_overdub(&mut self, on: bool) {
        self.overdub = on;
    }
    fn back_to_arranger(&mut self) {
        self.arranger_returns += 1;
    }
    fn undo(&mut self) {
        self.undo_count += 1;
    }
    fn redo(&mut self) {
        self.redo_count += 1;
    }
    fn current_time(&self) -> f64 {
        self.time
    }
    fn jump_by(&mut self, beats: f64) {
        self.time = (self.time + beats).max(0.0);
    }
    fn loop_on(&self) -> bool {
        self.loop_on
    }
    fn set_loop_on(&mut self, on: bool) {
        self.loop_on = on;
    }
    fn loop_length(&self) -> f64 {
        self.loop_length
    }
    fn set_loop_length(&mut self, beats: f64) {
        if beats > 0.0 {
            self.loop_length = beats;
        }
    }
    fn clip_quantization(&self) -> usize {
        self.clip_q
    }
    fn set_clip_quantization(&mut self, index: usize) {
        self.clip_q = index;
    }
    fn record_quantization(&self) -> usize {
        self.rec_q
    }
    fn set_record_quantization(&mut self, index: usize) {
        self.rec_q = index;
    }
    fn crossfader(&self) -> f64 {
        self.crossfader
    }
    fn set_crossfader(&mut self, position: f64) {
        self.crossfader = position.clamp(-1.0, 1.0);
    }
    fn cue_count(&self) -> usize {
        self.cues.len()
    }
    fn cue(&self, index: usize) -> Option<&dyn CuePoint> {
        self.cues.get(index).map(|c| c as &dyn CuePoint)
    }
    fn jump_to_cue(&mut self, index: usize) {
        if let Some(c) = self.cues.get(index) {
            self.time = c.time;
        }
    }
    fn trigger_name(&self, trigger: TriggerRef) -> Option<String> {
        match trigger {
            TriggerRef::Clip { track, slot } => self
                .tracks
                .get(track)
                .and_then(|t| t.clip(slot))
                .map(|c| c.name().to_string()),
            TriggerRef::Cue(index) => self.cues.get(index).map(|c| c.name.clone()),
            TriggerRef::Control { .. } => None,
        }
    }
    fn set_trigger_name(&mut self, trigger: TriggerRef, name: &str) -> bool {
        match trigger {
            TriggerRef::Clip { track, slot } => {
                match self.tracks.get_mut(track).and_then(|t| t.clip_mut(slot)) {
                    Some(c) => {
                        c.set_name(name);
                        true
                    }
                    None => false,
                }
            }
            TriggerRef::Cue(index) => match self.cues.get_mut(index) {
                Some(c) => {
                    c.name = name.to_string();
                    true
                }
                None => false,
            },
            TriggerRef::Control { .. } => false,
        }
    }
}
