//! Command splitting — peeling the target specifier off an action string.
//!
//! Target specifiers are not delimited, so detection is heuristic: a `/`
//! early in the string (`3/VOL`), a range plus `/` slightly later
//! (`1-12/VOL`), or a leading quoted name (`"Drums"/MUTE`). Anything else is
//! an action on the trigger's own track (`MUTE ON`, `LOOP */2`).

/// One parsed command, immutable once built. `text` is the full remainder
/// after the target; selector-style actions (`CLIP"Intro 1" PLAY`) re-read
/// it because the first-whitespace split would cut a quoted selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCommand {
    pub target_spec: Option<String>,
    pub text: String,
    pub action_name: String,
    pub args: String,
}

/// Split one action string into target spec, action name, and arguments.
/// Returns `None` when no action name remains.
pub fn split_command(action: &str) -> Option<RawCommand> {
    let action = action.trim();
    if action.is_empty() {
        return None;
    }

    let (target_spec, rest) = match target_split_at(action) {
        Some(slash) => {
            let spec = action[..slash].trim();
            let rest = action[slash + 1..].trim();
            (Some(spec.to_string()), rest)
        }
        None => (None, action),
    };

    let (action_name, args) = match rest.find(char::is_whitespace) {
        Some(ws) => (&rest[..ws], rest[ws..].trim()),
        None => (rest, ""),
    };
    if action_name.is_empty() {
        return None;
    }

    Some(RawCommand {
        target_spec,
        text: rest.to_string(),
        action_name: action_name.to_string(),
        args: args.to_string(),
    })
}

/// Byte offset of the `/` separating a leading target spec, if one exists.
fn target_split_at(action: &str) -> Option<usize> {
    if action.starts_with('"') {
        let close = action[1..].find('"').map(|i| i + 1)?;
        return action[close..].find('/').map(|i| i + close);
    }
    let head: Vec<(usize, char)> = action.char_indices().take(8).collect();
    let slash = head.iter().find(|(_, c)| *c == '/').map(|(i, _)| *i)?;
    let early = head.iter().take(4).any(|(_, c)| *c == '/');
    let ranged = head.iter().any(|(_, c)| *c == '-');
    if early || ranged {
        Some(slash)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn early_slash_marks_a_target() {
        let c = split_command("3/VOL 100").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("3"));
        assert_eq!(c.action_name, "VOL");
        assert_eq!(c.args, "100");
    }

    #[test]
    fn ranges_reach_a_later_slash() {
        let c = split_command("1-12/MUTE ON").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("1-12"));
        assert_eq!(c.action_name, "MUTE");
        let c = split_command("SEL-12/SOLO").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("SEL-12"));
    }

    #[test]
    fn quoted_names_carry_their_own_slash() {
        let c = split_command("\"Drum Bus\"/VOL <5").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("\"Drum Bus\""));
        assert_eq!(c.action_name, "VOL");
        assert_eq!(c.args, "<5");
    }

    #[test]
    fn loop_scaling_is_not_a_target() {
        let c = split_command("LOOP */2").unwrap();
        assert_eq!(c.target_spec, None);
        assert_eq!(c.action_name, "LOOP");
        assert_eq!(c.args, "*/2");
    }

    #[test]
    fn plain_actions_default_to_the_host_track() {
        let c = split_command("MUTE ON").unwrap();
        assert_eq!(c.target_spec, None);
        assert_eq!(c.action_name, "MUTE");
        assert_eq!(c.args, "ON");
    }

    #[test]
    fn selector_suffix_stays_on_the_name() {
        let c = split_command("2/DEV2.1.3 SET P4 RND").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("2"));
        assert_eq!(c.action_name, "DEV2.1.3");
        assert_eq!(c.args, "SET P4 RND");
        assert_eq!(c.text, "DEV2.1.3 SET P4 RND");
    }

    #[test]
    fn quoted_selector_survives_in_text() {
        let c = split_command("CLIP\"Intro 1\" PLAY").unwrap();
        assert_eq!(c.text, "CLIP\"Intro 1\" PLAY");
        assert_eq!(c.action_name, "CLIP\"Intro");
    }

    #[test]
    fn empty_input_yields_nothing() {
        assert!(split_command("").is_none());
        assert!(split_command("   ").is_none());
        assert!(split_command("3/").is_none());
    }

    #[test]
    fn all_spec_is_a_target() {
        let c = split_command("ALL/STOP").unwrap();
        assert_eq!(c.target_spec.as_deref(), Some("ALL"));
        assert_eq!(c.action_name, "STOP");
    }
}
