//! Host capability surface — the traits through which the engine sees the live set.
//!
//! The engine never owns host entities. Everything is addressed by index into
//! the host's current state and re-resolved at use time through these traits,
//! so a vanished entity yields `None` and the operation quietly becomes a
//! no-op. Tracks live in one combined index space: regular tracks first, then
//! returns, master last.

pub mod sim;

pub use sim::{SimChain, SimClip, SimDevice, SimParam, SimSet, SimTrack};

/// Identity of a fired trigger, as reported by the host.
///
/// `Control` carries an opaque host-assigned id; its display name is not
/// readable back through the set, so the host passes it alongside the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerRef {
    /// A session clip, by combined track index and slot row.
    Clip { track: usize, slot: usize },
    /// An arrangement cue point, by index.
    Cue(usize),
    /// A bound hardware control.
    Control { id: u64 },
}

/// What kind of track an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Audio,
    Midi,
    Group,
    Return,
    Master,
}

/// Input monitoring state of an armable track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    In,
    Auto,
    Off,
}

impl MonitorState {
    /// Position in the host's enumerated order (In, Auto, Off).
    pub fn index(self) -> usize {
        match self {
            MonitorState::In => 0,
            MonitorState::Auto => 1,
            MonitorState::Off => 2,
        }
    }

    pub fn from_index(index: usize) -> MonitorState {
        match index {
            0 => MonitorState::In,
            1 => MonitorState::Auto,
            _ => MonitorState::Off,
        }
    }
}

/// Crossfader assignment of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossfadeAssign {
    A,
    Off,
    B,
}

impl CrossfadeAssign {
    /// Position in the host's enumerated order (A, Off, B).
    pub fn index(self) -> usize {
        match self {
            CrossfadeAssign::A => 0,
            CrossfadeAssign::Off => 1,
            CrossfadeAssign::B => 2,
        }
    }

    pub fn from_index(index: usize) -> CrossfadeAssign {
        match index {
            0 => CrossfadeAssign::A,
            2 => CrossfadeAssign::B,
            _ => CrossfadeAssign::Off,
        }
    }
}

/// A single automatable device parameter.
pub trait Param {
    fn name(&self) -> &str;
    fn value(&self) -> f64;
    fn set_value(&mut self, value: f64);
    fn min(&self) -> f64;
    fn max(&self) -> f64;
    /// Factory default, the target of a reset.
    fn default_value(&self) -> f64;
    /// Quantized parameters step through discrete values and are never ramped.
    fn is_quantized(&self) -> bool;
}

/// A chain inside a rack device. Drum-rack pads are chains with a note.
pub trait Chain {
    fn name(&self) -> &str;
    /// MIDI note this chain responds to, if it is a drum pad.
    fn note(&self) -> Option<u8>;
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    fn is_soloed(&self) -> bool;
    fn set_soloed(&mut self, soloed: bool);
    fn device_count(&self) -> usize;
    fn device(&self, index: usize) -> Option<&dyn Device>;
    fn device_mut(&mut self, index: usize) -> Option<&mut dyn Device>;
}

/// A device in a track's chain, possibly a rack containing nested chains.
pub trait Device {
    fn name(&self) -> &str;
    /// Host class name, e.g. `"Looper"`. Used for class-based lookups.
    fn class_name(&self) -> &str;
    fn is_active(&self) -> bool;
    fn set_active(&mut self, active: bool);
    /// Number of automatable parameters, excluding the on/off switch.
    fn param_count(&self) -> usize;
    fn param(&self, index: usize) -> Option<&dyn Param>;
    fn param_mut(&mut self, index: usize) -> Option<&mut dyn Param>;
    fn chain_count(&self) -> usize;
    fn chain(&self, index: usize) -> Option<&dyn Chain>;
    fn chain_mut(&mut self, index: usize) -> Option<&mut dyn Chain>;
    fn selected_chain(&self) -> usize;
    fn select_chain(&mut self, index: usize);
}

/// A clip sitting in a session slot.
///
/// Playback transitions go through the owning track (`fire_slot`,
/// `stop_clips`); the clip itself only exposes properties.
pub trait Clip {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);
    fn is_audio(&self) -> bool;
    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    /// Clip length in beats.
    fn length(&self) -> f64;
    fn looping(&self) -> bool;
    fn set_looping(&mut self, looping: bool);
    fn loop_start(&self) -> f64;
    fn set_loop_start(&mut self, beats: f64);
    fn loop_end(&self) -> f64;
    fn set_loop_end(&mut self, beats: f64);
    /// Audio clips only; no-op on MIDI clips.
    fn warping(&self) -> bool;
    fn set_warping(&mut self, warping: bool);
    fn gain(&self) -> f64;
    fn set_gain(&mut self, gain: f64);
    fn pitch_coarse(&self) -> i32;
    fn set_pitch_coarse(&mut self, semitones: i32);
    /// Quantize note starts to the given grid division.
    fn quantize(&mut self, grid: u8);
    fn insert_envelope(&mut self, device: usize, param: usize);
    fn clear_envelopes(&mut self);
}

/// One track in the combined index space.
pub trait Track {
    fn name(&self) -> &str;
    fn set_name(&mut self, name: &str);
    fn kind(&self) -> TrackKind;

    /// Mixer volume, 0.0..=1.0.
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    /// Stereo pan, -1.0..=1.0.
    fn pan(&self) -> f64;
    fn set_pan(&mut self, pan: f64);
    fn send_count(&self) -> usize;
    fn send(&self, index: usize) -> Option<f64>;
    /// Returns false when the send index does not exist.
    fn set_send(&mut self, index: usize, level: f64) -> bool;

    fn is_muted(&self) -> bool;
    fn set_muted(&mut self, muted: bool);
    fn is_soloed(&self) -> bool;
    fn set_soloed(&mut self, soloed: bool);
    fn can_arm(&self) -> bool;
    fn is_armed(&self) -> bool;
    fn set_armed(&mut self, armed: bool);
    fn monitor(&self) -> MonitorState;
    fn set_monitor(&mut self, state: MonitorState);
    fn crossfade(&self) -> CrossfadeAssign;
    fn set_crossfade(&mut self, assign: CrossfadeAssign);
    fn is_folded(&self) -> bool;
    fn set_folded(&mut self, folded: bool);

    /// Session slot rows on this track; zero on the master.
    fn slot_count(&self) -> usize;
    /// `None` for an empty or out-of-range slot.
    fn clip(&self, slot: usize) -> Option<&dyn Clip>;
    fn clip_mut(&mut self, slot: usize) -> Option<&mut dyn Clip>;
    fn playing_slot(&self) -> Option<usize>;
    /// Launch the clip in `slot`; empty slots stop the track.
    fn fire_slot(&mut self, slot: usize);
    fn stop_clips(&mut self);

    fn device_count(&self) -> usize;
    fn device(&self, index: usize) -> Option<&dyn Device>;
    fn device_mut(&mut self, index: usize) -> Option<&mut dyn Device>;
    fn selected_device(&self) -> Option<usize>;
    fn select_device(&mut self, index: usize);
}

/// A session scene (one slot row across all tracks).
pub trait Scene {
    fn name(&self) -> &str;
}

/// An arrangement cue point.
pub trait CuePoint {
    fn name(&self) -> &str;
    /// Arrangement position in beats.
    fn time(&self) -> f64;
}

/// The whole live set, as the engine is allowed to see it.
pub trait LiveSet {
    /// Combined track count: regular + returns + master.
    fn track_count(&self) -> usize;
    fn regular_track_count(&self) -> usize;
    fn return_track_count(&self) -> usize;
    fn track(&self, index: usize) -> Option<&dyn Track>;
    fn track_mut(&mut self, index: usize) -> Option<&mut dyn Track>;
    /// Combined index of the master track (always last).
    fn master_index(&self) -> usize {
        self.track_count().saturating_sub(1)
    }
    fn selected_track(&self) -> usize;
    fn select_track(&mut self, index: usize);

    fn scene_count(&self) -> usize;
    fn scene(&self, index: usize) -> Option<&dyn Scene>;
    fn selected_scene(&self) -> usize;
    fn select_scene(&mut self, index: usize);
    fn fire_scene(&mut self, index: usize);
    fn stop_all_clips(&mut self);

    fn is_playing(&self) -> bool;
    fn start_playback(&mut self);
    fn stop_playback(&mut self);
    fn continue_playback(&mut self);
    fn tempo(&self) -> f64;
    fn set_tempo(&mut self, bpm: f64);
    fn tap_tempo(&mut self);
    /// Groove amount, 0.0..=1.0.
    fn groove_amount(&self) -> f64;
    fn set_groove_amount(&mut self, amount: f64);
    fn metronome(&self) -> bool;
    fn set_metronome(&mut self, on: bool);
    fn record_mode(&self) -> bool;
    fn set_record_mode(&mut self, on: bool);
    fn session_record(&self) -> bool;
    fn set_session_record(&mut self, on: bool);
    fn overdub(&self) -> bool;
    fn set_overdub(&mut self, on: bool);
    fn back_to_arranger(&mut self);
    fn undo(&mut self);
    fn redo(&mut self);

    /// Arrangement playhead in beats.
    fn current_time(&self) -> f64;
    fn jump_by(&mut self, beats: f64);
    fn loop_on(&self) -> bool;
    fn set_loop_on(&mut self, on: bool);
    fn loop_length(&self) -> f64;
    fn set_loop_length(&mut self, beats: f64);

    /// Index into the host's clip-trigger quantization list.
    fn clip_quantization(&self) -> usize;
    fn set_clip_quantization(&mut self, index: usize);
    /// Index into the host's MIDI record quantization list.
    fn record_quantization(&self) -> usize;
    fn set_record_quantization(&mut self, index: usize);

    /// Master crossfader, -1.0..=1.0.
    fn crossfader(&self) -> f64;
    fn set_crossfader(&mut self, position: f64);

    fn cue_count(&self) -> usize;
    fn cue(&self, index: usize) -> Option<&dyn CuePoint>;
    fn jump_to_cue(&mut self, index: usize);

    /// Display name of a trigger, when the host stores one (clips, cues).
    fn trigger_name(&self, trigger: TriggerRef) -> Option<String>;
    /// Returns false when the trigger has no writable name.
    fn set_trigger_name(&mut self, trigger: TriggerRef, name: &str) -> bool;
    /// Combined index of the track hosting a clip trigger.
    fn trigger_track(&self, trigger: TriggerRef) -> Option<usize> {
        match trigger {
            TriggerRef::Clip { track, .. } => Some(track),
            _ => None,
        }
    }
}
