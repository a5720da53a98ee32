//! End-to-end trigger pipeline tests — name text in, host state out.
//!
//! Everything runs through the public engine surface against the simulated
//! set: parsing, target resolution, sequencing, and dispatch together, the
//! way a host would drive them.

use assert_approx_eq::assert_approx_eq;

use stagehand::engine::config::Config;
use stagehand::engine::Engine;
use stagehand::host::{LiveSet, SimClip, SimDevice, SimSet, Track};

/// Helper: an engine on default config (fixed seed, no startup list).
fn engine() -> Engine {
    Engine::new(Config::default())
}

/// Helper: a set with a macro rack on track 1, a drum rack on track 2,
/// and a looper on track 3.
fn demo_set() -> SimSet {
    let mut set = SimSet::new(8, 2, 8);
    set.add_device(0, SimDevice::with_macros("Lead Rack"));
    set.add_device(
        1,
        SimDevice::drum_rack(&[("Kick", 36), ("Snare", 38), ("Hat", 42)]),
    );
    set.add_device(2, SimDevice::looper());
    set
}

/// Helper: park a named clip in a slot and mark it playing.
fn playing_clip(set: &mut SimSet, track: usize, slot: usize, name: &str) {
    set.put_clip(track, slot, SimClip::named(name));
    set.tracks[track].playing = Some(slot);
}

// =============================================================================
// Test 1: A ranged spec fans one action out across several tracks
// =============================================================================

#[test]
fn ranged_volume_reaches_every_track_in_the_span() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[ABC] 1-4/VOL 100");

    for i in 0..4 {
        assert_approx_eq!(set.tracks[i].volume, 100.0 / 127.0);
    }
    assert_approx_eq!(set.tracks[4].volume, 0.85);
}

// =============================================================================
// Test 2: Names without a bracketed identifier never act
// =============================================================================

#[test]
fn unbracketed_or_lopsided_names_do_nothing() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "BPM 999");
    engine.fire_name(&mut set, "[HALF BPM 999");
    engine.fire_name(&mut set, "] BPM 999 [");

    assert_approx_eq!(set.tempo, 120.0);
}

// =============================================================================
// Test 3: A clip's play state picks the on or the off list
// =============================================================================

#[test]
fn clip_firing_honours_on_and_off_lists() {
    let mut set = demo_set();
    let mut engine = engine();
    playing_clip(&mut set, 0, 0, "[A] MUTE ON : MUTE OFF");

    engine.fire_clip(&mut set, 0, 0);
    assert!(set.tracks[0].muted, "playing clip runs the on list");

    set.tracks[0].playing = None;
    engine.fire_clip(&mut set, 0, 0);
    assert!(!set.tracks[0].muted, "stopped clip runs the off list");
}

// =============================================================================
// Test 4: A play sequence walks its list one action per firing, wrapping
// =============================================================================

#[test]
fn play_sequence_steps_and_wraps_across_firings() {
    let mut set = demo_set();
    let mut engine = engine();
    playing_clip(&mut set, 0, 0, "[S] (PSEQ) BPM 100 ; BPM 110 ; BPM 120");

    let mut seen = Vec::new();
    for _ in 0..5 {
        engine.fire_clip(&mut set, 0, 0);
        seen.push(set.tempo);
    }
    assert_eq!(seen, vec![100.0, 110.0, 120.0, 100.0, 110.0]);
}

// =============================================================================
// Test 5: A loop sequence arms on fire and follows the loop counter
// =============================================================================

#[test]
fn loop_sequence_is_driven_by_loop_crossings() {
    let mut set = demo_set();
    let mut engine = engine();
    playing_clip(&mut set, 0, 0, "[L] (LSEQ) BPM 91 ; BPM 92 ; BPM 93");

    engine.fire_clip(&mut set, 0, 0);
    assert_approx_eq!(set.tempo, 120.0);

    engine.on_clip_loop(&mut set, 0, 0, 0);
    assert_approx_eq!(set.tempo, 91.0);
    engine.on_clip_loop(&mut set, 0, 0, 1);
    assert_approx_eq!(set.tempo, 92.0);
    engine.on_clip_loop(&mut set, 0, 0, 4);
    assert_approx_eq!(set.tempo, 92.0);
}

// =============================================================================
// Test 6: Bound controls fire the on list on press, the off list on release
// =============================================================================

#[test]
fn control_press_and_release_run_their_own_lists() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_control(&mut set, 7, "[PAD] SETPLAY : SETSTOP", true);
    assert!(set.playing);

    engine.fire_control(&mut set, 7, "[PAD] SETPLAY : SETSTOP", false);
    assert!(!set.playing);
}

// =============================================================================
// Test 7: A bad argument leaves its value alone and the list keeps going
// =============================================================================

#[test]
fn conversion_failure_never_stalls_the_rest_of_the_list() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[GO] VOL XYZ ; BPM 105");

    assert_approx_eq!(set.tracks[0].volume, 0.85);
    assert_approx_eq!(set.tempo, 105.0);
}

// =============================================================================
// Test 8: An unresolvable target skips its command, siblings still land
// =============================================================================

#[test]
fn empty_target_resolution_skips_only_that_command() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[GO] 20/MUTE ON ; MET ON");

    assert!(set.tracks.iter().all(|t| !t.muted));
    assert!(set.metronome);
}

// =============================================================================
// Test 9: Device parameters are addressable by index and by quoted name
// =============================================================================

#[test]
fn device_parameters_set_by_index_and_name() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[D] DEV SET P3 64");
    engine.fire_name(&mut set, "[D] DEV SET \"Macro 5\" 127");

    let rack = &set.tracks[0].devices[0];
    assert_approx_eq!(rack.params[2].value, 64.0);
    assert_approx_eq!(rack.params[4].value, 127.0);
}

// =============================================================================
// Test 10: Drum pads answer to positions, names, and the bare sweep
// =============================================================================

#[test]
fn drum_pads_resolve_by_position_name_or_all() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[K] 2/DR3 MUTE ON");
    assert!(set.tracks[1].devices[0].chains[2].muted, "pad 3 is the hat");
    assert!(!set.tracks[1].devices[0].chains[0].muted);

    engine.fire_name(&mut set, "[K] 2/DR\"Snare\" SOLO ON");
    assert!(set.tracks[1].devices[0].chains[1].soloed);

    engine.fire_name(&mut set, "[K] 2/DR MUTE ON");
    assert!(set.tracks[1].devices[0].chains.iter().all(|c| c.muted));
}

// =============================================================================
// Test 11: Looper transport writes the looper's state parameter
// =============================================================================

#[test]
fn looper_actions_drive_the_state_parameter() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[LP] 3/LOOPER REC");
    let looper = &set.tracks[2].devices[0];
    let state = looper.params.iter().find(|p| p.name == "State").unwrap();
    assert_approx_eq!(state.value, 1.0);

    engine.fire_name(&mut set, "[LP] 3/LOOPER PLAY");
    let looper = &set.tracks[2].devices[0];
    let state = looper.params.iter().find(|p| p.name == "State").unwrap();
    assert_approx_eq!(state.value, 2.0);
}

// =============================================================================
// Test 12: Inline variable definitions persist and substitute on later fires
// =============================================================================

#[test]
fn variables_defined_in_one_firing_serve_the_next() {
    let mut set = demo_set();
    let mut engine = engine();

    engine.fire_name(&mut set, "[DEF] $DRUMS = 2");
    engine.fire_name(&mut set, "[USE] $DRUMS/MUTE ON");

    assert!(set.tracks[1].muted);
    assert!(!set.tracks[0].muted);
}

// =============================================================================
// Test 13: Registered user actions win over nothing else claiming the name
// =============================================================================

#[test]
fn user_registered_actions_are_dispatchable() {
    let mut set = demo_set();
    let mut engine = engine();
    engine.surfaces_mut().register_user(
        "BLACKOUT",
        Box::new(|set, _ctx, _args| {
            for i in 0..set.track_count() {
                if let Some(t) = set.track_mut(i) {
                    t.set_muted(true);
                }
            }
        }),
    );

    engine.fire_name(&mut set, "[X] BLACKOUT");

    assert!(set.tracks.iter().all(|t| t.muted));
}

// =============================================================================
// Test 14: PSEQ RESET rewinds every stored sequence position
// =============================================================================

#[test]
fn sequence_reset_rewinds_progress() {
    let mut set = demo_set();
    let mut engine = engine();
    playing_clip(&mut set, 0, 0, "[S] (PSEQ) BPM 100 ; BPM 110 ; BPM 120");

    engine.fire_clip(&mut set, 0, 0);
    engine.fire_clip(&mut set, 0, 0);
    engine.fire_name(&mut set, "[R] PSEQ RESET");
    engine.fire_clip(&mut set, 0, 0);

    assert_approx_eq!(set.tempo, 100.0);
}

// =============================================================================
// Test 15: The configured startup list runs once against the set
// =============================================================================

#[test]
fn startup_actions_run_from_config() {
    let mut set = demo_set();
    let mut config = Config::default();
    config.startup_actions = "BPM 93 ; MET ON".to_string();
    let mut engine = Engine::new(config);

    engine.run_startup(&mut set);

    assert_approx_eq!(set.tempo, 93.0);
    assert!(set.metronome);
}
