//! Scene locator resolution.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::host::{LiveSet, Scene};

/// Resolve a scene locator into a 0-based index.
///
/// Empty = selected scene; `3` = scene 3 (1-based); `<`/`>` with optional
/// magnitude move relative to the selection, clamped; `RND` picks any
/// scene; `"Name"` looks up by display name.
pub fn resolve_scene(selector: &str, set: &dyn LiveSet, rng: &mut ChaCha8Rng) -> Option<usize> {
    let selector = selector.trim();
    let count = set.scene_count();
    if count == 0 {
        return None;
    }
    if selector.is_empty() {
        return Some(set.selected_scene());
    }
    if selector.eq_ignore_ascii_case("RND") {
        return Some(rng.gen_range(0..count));
    }
    let relative = |rest: &str, sign: i64| -> Option<usize> {
        let magnitude = if rest.is_empty() {
            1
        } else {
            rest.trim().parse::<i64>().ok().filter(|m| *m >= 0)?
        };
        let target = set.selected_scene() as i64 + sign * magnitude;
        Some(target.clamp(0, count as i64 - 1) as usize)
    };
    if let Some(rest) = selector.strip_prefix('<') {
        return relative(rest, -1);
    }
    if let Some(rest) = selector.strip_prefix('>') {
        return relative(rest, 1);
    }
    if let Some(name) = selector.strip_prefix('"') {
        let name = &name[..name.find('"')?];
        return (0..count).find(|&i| {
            set.scene(i).is_some_and(|s| s.name().eq_ignore_ascii_case(name))
        });
    }
    let n = selector.parse::<usize>().ok().filter(|n| *n >= 1)?;
    (n - 1 < count).then_some(n - 1)
}
