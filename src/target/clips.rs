//! Clip locator resolution — picking one slot on a track.

use crate::host::{Clip, Track};

/// Resolve the selector text following `CLIP` into a slot index.
///
/// Empty = the playing clip, falling back to the slot at the selected
/// scene; `3` = slot 3 (1-based); `"Name"` = first clip with that name.
/// The returned slot may still be empty; property handlers treat that as
/// a vanished entity.
pub fn resolve_clip(selector: &str, track: &dyn Track, selected_scene: usize) -> Option<usize> {
    let selector = selector.trim();
    if selector.is_empty() {
        if let Some(playing) = track.playing_slot() {
            return Some(playing);
        }
        return (selected_scene < track.slot_count()).then_some(selected_scene);
    }
    if let Some(name) = selector.strip_prefix('"') {
        let name = &name[..name.find('"')?];
        return (0..track.slot_count())
            .find(|&s| track.clip(s).is_some_and(|c| c.name().eq_ignore_ascii_case(name)));
    }
    let n = selector.parse::<usize>().ok().filter(|n| *n >= 1)?;
    (n - 1 < track.slot_count()).then_some(n - 1)
}
