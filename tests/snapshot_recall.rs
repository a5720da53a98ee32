//! Snapshot store and recall, end to end — state captured into a trigger
//! name, changed underneath, and brought back immediately, ramped over
//! ticks, or blended through the morph track.

use assert_approx_eq::assert_approx_eq;

use stagehand::engine::config::Config;
use stagehand::engine::Engine;
use stagehand::host::{SimClip, SimDevice, SimSet};

/// Helper: a set with a macro rack on track 1 and a spare track field.
fn demo_set() -> SimSet {
    let mut set = SimSet::new(8, 2, 8);
    set.add_device(0, SimDevice::with_macros("Lead Rack"));
    set
}

/// Helper: park a named clip in a slot and mark it playing, so firing it
/// picks the on list (stores) or recalls (once the name holds a snapshot).
fn playing_clip(set: &mut SimSet, track: usize, slot: usize, name: &str) {
    set.put_clip(track, slot, SimClip::named(name));
    set.tracks[track].playing = Some(slot);
}

fn clip_name(set: &SimSet, track: usize, slot: usize) -> String {
    set.tracks[track].slots[slot].as_ref().unwrap().name.clone()
}

// =============================================================================
// Test 1: Store writes the name, recall brings the mix back
// =============================================================================

#[test]
fn store_then_recall_round_trips_the_mix() {
    let mut set = demo_set();
    let mut engine = Engine::new(Config::default());
    set.tracks[0].volume = 0.25;
    set.tracks[0].sends[0] = 0.4;
    playing_clip(&mut set, 0, 0, "[A] SNAP");

    engine.fire_clip(&mut set, 0, 0);
    let stored = clip_name(&set, 0, 0);
    assert!(stored.starts_with("[A] ||"), "stored name was {stored:?}");

    set.tracks[0].volume = 0.9;
    set.tracks[0].sends[0] = 0.0;
    engine.fire_clip(&mut set, 0, 0);

    assert_approx_eq!(set.tracks[0].volume, 0.25);
    assert_approx_eq!(set.tracks[0].sends[0], 0.4);
}

// =============================================================================
// Test 2: The store captures exactly the command's targets
// =============================================================================

#[test]
fn ranged_store_captures_only_the_named_tracks() {
    let mut set = demo_set();
    let mut engine = Engine::new(Config::default());
    set.tracks[0].volume = 0.3;
    set.tracks[1].volume = 0.4;
    set.tracks[4].volume = 0.5;
    playing_clip(&mut set, 4, 0, "[M] 1-2/SNAP");

    engine.fire_clip(&mut set, 4, 0);
    set.tracks[0].volume = 0.9;
    set.tracks[1].volume = 0.9;
    set.tracks[4].volume = 0.9;
    engine.fire_clip(&mut set, 4, 0);

    assert_approx_eq!(set.tracks[0].volume, 0.3);
    assert_approx_eq!(set.tracks[1].volume, 0.4);
    // The clip's own track sat outside the 1-2 range.
    assert_approx_eq!(set.tracks[4].volume, 0.9);
}

// =============================================================================
// Test 3: A RAMP flag spreads the recall over engine ticks
// =============================================================================

#[test]
fn ramped_recall_walks_to_the_target() {
    let mut set = demo_set();
    let mut engine = Engine::new(Config::default());
    playing_clip(&mut set, 0, 0, "[R] SNAP RAMP 4");

    engine.fire_clip(&mut set, 0, 0);
    set.tracks[0].volume = 0.05;
    engine.fire_clip(&mut set, 0, 0);
    // Nothing lands before a tick.
    assert_approx_eq!(set.tracks[0].volume, 0.05);

    engine.on_tick(&mut set);
    assert_approx_eq!(set.tracks[0].volume, 0.25);

    for _ in 0..3 {
        engine.on_tick(&mut set);
    }
    assert_approx_eq!(set.tracks[0].volume, 0.85);
}

// =============================================================================
// Test 4: An oversized capture aborts and the old name comes back
// =============================================================================

#[test]
fn oversized_capture_aborts_and_reverts_the_name() {
    let mut set = demo_set();
    let mut config = Config::default();
    config.snapshot_param_limit = 0;
    config.snapshot_restore_delay = 2;
    let mut engine = Engine::new(config);
    playing_clip(&mut set, 0, 0, "[B] SNAP");

    engine.fire_clip(&mut set, 0, 0);
    assert_eq!(clip_name(&set, 0, 0), "[B] capture failed");

    engine.on_tick(&mut set);
    assert_eq!(clip_name(&set, 0, 0), "[B] capture failed");
    engine.on_tick(&mut set);
    assert_eq!(clip_name(&set, 0, 0), "[B] SNAP");
}

// =============================================================================
// Test 5: Recalling from the morph track loads a blend instead of applying
// =============================================================================

#[test]
fn morph_track_blends_between_two_snapshots() {
    let mut set = demo_set();
    set.tracks[3].name = "MORPH".to_string();
    let mut engine = Engine::new(Config::default());

    set.tracks[0].volume = 0.2;
    playing_clip(&mut set, 0, 0, "[A] SNAP");
    engine.fire_clip(&mut set, 0, 0);

    set.tracks[0].volume = 0.8;
    playing_clip(&mut set, 0, 1, "[B] SNAP");
    engine.fire_clip(&mut set, 0, 1);
    let snap_b = clip_name(&set, 0, 1);

    // Re-apply A so the blend starts from its values.
    set.tracks[0].playing = Some(0);
    engine.fire_clip(&mut set, 0, 0);
    assert_approx_eq!(set.tracks[0].volume, 0.2);

    // The same stored name on the morph track loads pairs instead.
    playing_clip(&mut set, 3, 0, &snap_b);
    engine.fire_clip(&mut set, 3, 0);
    // Loading must not apply anything yet.
    assert_approx_eq!(set.tracks[0].volume, 0.2);

    engine.set_morph(&mut set, 0);
    assert_approx_eq!(set.tracks[0].volume, 0.2);
    engine.set_morph(&mut set, 127);
    assert_approx_eq!(set.tracks[0].volume, 0.8);
    engine.set_morph(&mut set, 64);
    assert_approx_eq!(set.tracks[0].volume, 0.2 + 0.6 * (64.0 / 127.0));
}

// =============================================================================
// Test 6: The DEV flag narrows the capture to device parameters
// =============================================================================

#[test]
fn dev_scope_captures_parameters_and_leaves_the_mix_alone() {
    let mut set = demo_set();
    let mut engine = Engine::new(Config::default());
    set.tracks[0].devices[0].params[0].value = 100.0;
    playing_clip(&mut set, 0, 0, "[D] SNAP DEV");

    engine.fire_clip(&mut set, 0, 0);
    set.tracks[0].devices[0].params[0].value = 3.0;
    set.tracks[0].volume = 0.3;
    engine.fire_clip(&mut set, 0, 0);

    assert_approx_eq!(set.tracks[0].devices[0].params[0].value, 100.0);
    // The mix sits outside the DEV scope.
    assert_approx_eq!(set.tracks[0].volume, 0.3);
}

// =============================================================================
// Test 7: A renamed target track is skipped on recall, nothing else breaks
// =============================================================================

#[test]
fn recall_skips_tracks_that_vanished_by_name() {
    let mut set = demo_set();
    let mut engine = Engine::new(Config::default());
    set.tracks[0].name = "Lead".to_string();
    set.tracks[0].volume = 0.25;
    set.tracks[1].volume = 0.35;
    playing_clip(&mut set, 0, 0, "[V] 1-2/SNAP");

    engine.fire_clip(&mut set, 0, 0);
    set.tracks[0].name = "Other".to_string();
    set.tracks[0].volume = 0.9;
    set.tracks[1].volume = 0.9;
    engine.fire_clip(&mut set, 0, 0);

    // The renamed track is unreachable under its stored name.
    assert_approx_eq!(set.tracks[0].volume, 0.9);
    assert_approx_eq!(set.tracks[1].volume, 0.35);
}
