//! Track spec resolution — from `1-4`, `"Drums"`, `SEL-MST` to concrete indices.
//!
//! All specs resolve against the combined index space (regular tracks,
//! returns, master). Resolution never errors: anything that does not name
//! existing tracks comes back as an empty list and the command evaporates.

use log::debug;

use crate::host::{LiveSet, Track, TrackKind};

/// Resolve a track spec into 0-based combined indices, in order.
pub fn resolve_track_spec(spec: &str, set: &dyn LiveSet) -> Vec<usize> {
    let spec = spec.trim();
    if spec.is_empty() {
        return Vec::new();
    }
    if spec.eq_ignore_ascii_case("ALL") {
        return (0..set.track_count()).collect();
    }

    let Some(substituted) = substitute_names(spec, set) else {
        debug!("track spec {spec:?} names no known track");
        return Vec::new();
    };
    let substituted = substituted
        .replace("SEL", &(set.selected_track() + 1).to_string())
        .replace("MST", &(set.master_index() + 1).to_string());

    let count = set.track_count() as i64;
    let result = match substituted.split_once('-') {
        Some((a, b)) => {
            let (Some(a), Some(b)) = (endpoint(a, set), endpoint(b, set)) else {
                return Vec::new();
            };
            // Inverted or degenerate ranges resolve empty, not reordered.
            if a >= b || a < 1 || b > count {
                return Vec::new();
            }
            ((a - 1) as usize..=(b - 1) as usize).collect()
        }
        None => match endpoint(&substituted, set) {
            Some(n) if (1..=count).contains(&n) => vec![(n - 1) as usize],
            _ => Vec::new(),
        },
    };
    if result.is_empty() {
        debug!("track spec {spec:?} resolved empty");
    }
    result
}

/// One range endpoint: an integer, or `<`/`>` with an optional magnitude
/// relative to the selected track. Returns a 1-based index.
fn endpoint(token: &str, set: &dyn LiveSet) -> Option<i64> {
    let token = token.trim();
    let relative = |rest: &str, sign: i64| -> Option<i64> {
        let magnitude = if rest.is_empty() {
            1
        } else {
            rest.trim().parse::<i64>().ok().filter(|m| *m >= 0)?
        };
        let base = set.selected_track() as i64 + 1;
        Some((base + sign * magnitude).clamp(1, set.track_count() as i64))
    };
    if let Some(rest) = token.strip_prefix('<') {
        return relative(rest, -1);
    }
    if let Some(rest) = token.strip_prefix('>') {
        return relative(rest, 1);
    }
    token.parse::<i64>().ok()
}

/// Replace every quoted segment with the matching track's 1-based index.
/// `None` when any quoted name fails to match.
fn substitute_names(spec: &str, set: &dyn LiveSet) -> Option<String> {
    let mut out = spec.to_string();
    while let Some(open) = out.find('"') {
        let close = out[open + 1..].find('"')? + open + 1;
        let name = &out[open + 1..close];
        let index = find_track_by_name(set, name)?;
        out.replace_range(open..=close, &(index + 1).to_string());
    }
    Some(out)
}

/// Case-insensitive display-name lookup over the combined space. Unnamed
/// audio and MIDI tracks answer to a synthesized `N-AUDIO` / `N-MIDI`.
pub fn find_track_by_name(set: &dyn LiveSet, name: &str) -> Option<usize> {
    let wanted = name.trim();
    for i in 0..set.track_count() {
        let track = set.track(i)?;
        let actual = track.name();
        let matches = if actual.is_empty() {
            let synthesized = match track.kind() {
                TrackKind::Midi => format!("{}-MIDI", i + 1),
                _ => format!("{}-AUDIO", i + 1),
            };
            synthesized.eq_ignore_ascii_case(wanted)
        } else {
            actual.eq_ignore_ascii_case(wanted)
        };
        if matches {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SimSet;

    fn set() -> SimSet {
        let mut s = SimSet::new(4, 2, 8);
        s.tracks[0].name = "Drums".to_string();
        s.tracks[2].name = "Bass".to_string();
        s
    }

    #[test]
    fn all_covers_the_combined_space() {
        let s = set();
        assert_eq!(resolve_track_spec("ALL", &s), vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn bare_int_is_one_based() {
        let s = set();
        assert_eq!(resolve_track_spec("3", &s), vec![2]);
        assert_eq!(resolve_track_spec("99", &s), Vec::<usize>::new());
        assert_eq!(resolve_track_spec("0", &s), Vec::<usize>::new());
    }

    #[test]
    fn ranges_are_inclusive() {
        let s = set();
        assert_eq!(resolve_track_spec("1-4", &s), vec![0, 1, 2, 3]);
    }

    #[test]
    fn inverted_ranges_resolve_empty() {
        let s = set();
        assert_eq!(resolve_track_spec("4-2", &s), Vec::<usize>::new());
        assert_eq!(resolve_track_spec("3-3", &s), Vec::<usize>::new());
    }

    #[test]
    fn sel_and_mst_substitute_textually() {
        let mut s = set();
        s.selected_track = 1;
        assert_eq!(resolve_track_spec("SEL", &s), vec![1]);
        assert_eq!(resolve_track_spec("MST", &s), vec![6]);
        assert_eq!(resolve_track_spec("SEL-MST", &s), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn quoted_names_resolve_case_insensitively() {
        let s = set();
        assert_eq!(resolve_track_spec("\"DRUMS\"", &s), vec![0]);
        assert_eq!(resolve_track_spec("\"drums\"-\"BASS\"", &s), vec![0, 1, 2]);
    }

    #[test]
    fn unnamed_tracks_answer_to_synthesized_names() {
        let s = set();
        // Track 2 (index 1) carries no name.
        assert_eq!(resolve_track_spec("\"2-AUDIO\"", &s), vec![1]);
    }

    #[test]
    fn unknown_names_empty_the_whole_spec() {
        let s = set();
        assert_eq!(resolve_track_spec("\"Ghost\"", &s), Vec::<usize>::new());
        assert_eq!(resolve_track_spec("1-\"Ghost\"", &s), Vec::<usize>::new());
    }

    #[test]
    fn relative_endpoints_follow_the_selection() {
        let mut s = set();
        s.selected_track = 2;
        assert_eq!(resolve_track_spec(">", &s), vec![3]);
        assert_eq!(resolve_track_spec("<2", &s), vec![0]);
        // Clamped at the edges rather than running off the set.
        s.selected_track = 0;
        assert_eq!(resolve_track_spec("<5", &s), vec![0]);
    }

    #[test]
    fn garbage_resolves_empty() {
        let s = set();
        assert_eq!(resolve_track_spec("BANANA", &s), Vec::<usize>::new());
        assert_eq!(resolve_track_spec("1-2-3", &s), Vec::<usize>::new());
    }
}
