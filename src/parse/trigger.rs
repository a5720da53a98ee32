//! Trigger-name parsing — bracket identifier, on/off split, sequence tags.
//!
//! A trigger participates only if its display name opens with `[` and closes
//! the bracket later; everything after the bracket is the action list.
//! Malformed names are rejected silently so ordinary clip names never
//! produce dispatch noise.

use log::debug;

use super::vars::VarTable;

/// Sequencing tag at the head of an action list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeqTag {
    /// Advance one action per firing.
    Pseq,
    /// Select by clip loop count.
    Lseq,
}

/// A parsed trigger name: the bracketed identifier, the optional sequence
/// tag, and the upper-cased action strings (definitions already consumed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTrigger {
    pub ident: String,
    pub seq: Option<SeqTag>,
    pub actions: Vec<String>,
}

/// Split a raw name into its bracket-inclusive identifier and the remainder.
///
/// Returns `None` unless the trimmed name starts with `[` and a matching `]`
/// appears later. Callers use this both for full parsing and for spotting
/// snapshot-recall names before the action-list grammar applies.
pub fn split_ident(name: &str) -> Option<(&str, &str)> {
    let trimmed = name.trim();
    if !trimmed.starts_with('[') {
        return None;
    }
    let close = trimmed.find(']')?;
    Some((&trimmed[..=close], &trimmed[close + 1..]))
}

/// Parse a trigger name into its action list.
///
/// `supports_off` is true for trigger kinds with distinct on/off firings
/// (clips by play state, controls by press/release); for those the list
/// splits at the first `:` and `active` picks the side, with `*` on the off
/// side reusing the on list. Inline variable definitions are registered into
/// `vars` and dropped from the list.
pub fn parse_trigger_name(
    name: &str,
    supports_off: bool,
    active: bool,
    vars: &mut VarTable,
) -> Option<ParsedTrigger> {
    let (ident, rest) = split_ident(name)?;
    let list = rest.to_uppercase();
    let list = list.trim();

    let chosen = if supports_off {
        match list.split_once(':') {
            Some((on, off)) => {
                if active {
                    on.trim().to_string()
                } else if off.trim() == "*" {
                    on.trim().to_string()
                } else {
                    off.trim().to_string()
                }
            }
            None => list.to_string(),
        }
    } else {
        list.to_string()
    };

    let (seq, body) = strip_seq_tag(&chosen);

    let mut actions = Vec::new();
    for piece in body.split(';') {
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        // Definitions consume the raw piece; substituting first would let a
        // defined `$D` rewrite its own later re-definition.
        if vars.consume_definition(piece) {
            continue;
        }
        let piece = vars.substitute(piece);
        let piece = piece.trim();
        if piece.is_empty() {
            continue;
        }
        actions.push(piece.to_string());
    }

    if actions.is_empty() {
        debug!("trigger {ident} parsed to an empty action list");
    }
    Some(ParsedTrigger {
        ident: ident.to_string(),
        seq,
        actions,
    })
}

fn strip_seq_tag(list: &str) -> (Option<SeqTag>, &str) {
    let trimmed = list.trim_start();
    if let Some(rest) = trimmed.strip_prefix("(PSEQ)") {
        (Some(SeqTag::Pseq), rest)
    } else if let Some(rest) = trimmed.strip_prefix("(LSEQ)") {
        (Some(SeqTag::Lseq), rest)
    } else {
        (None, trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(name: &str) -> Option<ParsedTrigger> {
        let mut vars = VarTable::new();
        parse_trigger_name(name, false, false, &mut vars)
    }

    #[test]
    fn ident_keeps_its_brackets() {
        let t = parse("[ABC] 1-4/VOL 100").unwrap();
        assert_eq!(t.ident, "[ABC]");
        assert_eq!(t.actions, vec!["1-4/VOL 100"]);
    }

    #[test]
    fn names_without_brackets_are_rejected() {
        assert!(parse("ABC VOL 100").is_none());
        assert!(parse("[ABC VOL 100").is_none());
        assert!(parse("] ABC [ VOL").is_none());
        assert!(parse("").is_none());
    }

    #[test]
    fn list_is_uppercased_and_split_on_semicolons() {
        let t = parse("[x] mute on ; 2/solo").unwrap();
        assert_eq!(t.actions, vec!["MUTE ON", "2/SOLO"]);
    }

    #[test]
    fn active_state_picks_the_on_list() {
        let mut vars = VarTable::new();
        let on = parse_trigger_name("[X] PLAY : STOP", true, true, &mut vars).unwrap();
        assert_eq!(on.actions, vec!["PLAY"]);
        let off = parse_trigger_name("[X] PLAY : STOP", true, false, &mut vars).unwrap();
        assert_eq!(off.actions, vec!["STOP"]);
    }

    #[test]
    fn star_off_list_reuses_the_on_list() {
        let mut vars = VarTable::new();
        let off = parse_trigger_name("[X] MUTE : *", true, false, &mut vars).unwrap();
        assert_eq!(off.actions, vec!["MUTE"]);
    }

    #[test]
    fn triggers_without_off_support_keep_the_colon() {
        let mut vars = VarTable::new();
        let t = parse_trigger_name("[X] PLAY : STOP", false, false, &mut vars).unwrap();
        assert_eq!(t.actions, vec!["PLAY : STOP"]);
    }

    #[test]
    fn pseq_tag_is_stripped_and_recorded() {
        let t = parse("[X] (PSEQ) 1/MUTE ; 2/MUTE").unwrap();
        assert_eq!(t.seq, Some(SeqTag::Pseq));
        assert_eq!(t.actions, vec!["1/MUTE", "2/MUTE"]);
        let l = parse("[X] (LSEQ) PLAY 1 ; PLAY 2").unwrap();
        assert_eq!(l.seq, Some(SeqTag::Lseq));
    }

    #[test]
    fn definitions_are_consumed_and_substituted() {
        let mut vars = VarTable::new();
        let t = parse_trigger_name("[X] $A = 3 ; $A/VOL 100", false, false, &mut vars).unwrap();
        assert_eq!(t.actions, vec!["3/VOL 100"]);
        assert_eq!(vars.get("A"), Some("3"));
    }

    #[test]
    fn predefined_variables_substitute() {
        let mut vars = VarTable::new();
        vars.set("DRUMS", "2");
        let t = parse_trigger_name("[X] $DRUMS/MUTE", false, false, &mut vars).unwrap();
        assert_eq!(t.actions, vec!["2/MUTE"]);
    }

    #[test]
    fn empty_pieces_vanish() {
        let t = parse("[X] ; ; PLAY ;").unwrap();
        assert_eq!(t.actions, vec!["PLAY"]);
    }

    #[test]
    fn split_ident_exposes_the_remainder() {
        let (ident, rest) = split_ident("[SNAP A] || {\"x\":1}").unwrap();
        assert_eq!(ident, "[SNAP A]");
        assert_eq!(rest.trim_start(), "|| {\"x\":1}");
    }
}
