//! Variable substitution — `$NAME` expansion and inline definitions.
//!
//! Action lists may reference variables (`$BUS/VOL 100`) and define them
//! inline (`$BUS = 3`); definitions are consumed by the parser and never
//! reach dispatch. Names and values are upper-cased on entry because
//! substitution runs on the already upper-cased action list.

use std::collections::HashMap;

use log::debug;

/// The substitution table. Lives on the engine for the process lifetime;
/// inline definitions overwrite config-seeded ones.
#[derive(Debug, Default)]
pub struct VarTable {
    vars: HashMap<String, String>,
}

impl VarTable {
    pub fn new() -> VarTable {
        VarTable::default()
    }

    /// Seed from a config map.
    pub fn seed(entries: &HashMap<String, String>) -> VarTable {
        let mut table = VarTable::new();
        for (name, value) in entries {
            table.set(name, value);
        }
        table
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars
            .insert(name.trim().to_uppercase(), value.trim().to_uppercase());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_uppercase()).map(|v| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Expand every `$NAME` occurrence. Longer names substitute first so
    /// `$AB` is never clobbered by a shorter `$A`.
    pub fn substitute(&self, text: &str) -> String {
        if self.vars.is_empty() || !text.contains('$') {
            return text.to_string();
        }
        let mut names: Vec<&String> = self.vars.keys().collect();
        names.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        let mut out = text.to_string();
        for name in names {
            let pattern = format!("${name}");
            if out.contains(&pattern) {
                out = out.replace(&pattern, &self.vars[name]);
            }
        }
        out
    }

    /// Consume a definition of the form `$NAME = VALUE` (the `$` is
    /// optional). Returns false when the text contains no `=` and should be
    /// treated as an ordinary action. Malformed names are dropped, consumed.
    /// The value side is substituted at definition time, so `$B = $A` copies
    /// the current value of `A` rather than aliasing it.
    pub fn consume_definition(&mut self, text: &str) -> bool {
        let Some(eq) = text.find('=') else {
            return false;
        };
        let name = text[..eq].trim().trim_start_matches('$').trim();
        if name.is_empty()
            || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            debug!("dropping malformed variable definition: {text}");
            return true;
        }
        let value = self.substitute(text[eq + 1..].trim());
        self.set(name, &value);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitutes_longest_name_first() {
        let mut vars = VarTable::new();
        vars.set("A", "1");
        vars.set("AB", "2");
        assert_eq!(vars.substitute("$AB/VOL $A"), "2/VOL 1");
    }

    #[test]
    fn definition_is_consumed_and_registered() {
        let mut vars = VarTable::new();
        assert!(vars.consume_definition("$BUS = 3"));
        assert_eq!(vars.get("BUS"), Some("3"));
    }

    #[test]
    fn definition_without_dollar_sign() {
        let mut vars = VarTable::new();
        assert!(vars.consume_definition("LEVEL = 100"));
        assert_eq!(vars.get("LEVEL"), Some("100"));
    }

    #[test]
    fn malformed_definition_is_swallowed() {
        let mut vars = VarTable::new();
        assert!(vars.consume_definition("A B = 3"));
        assert!(vars.is_empty());
    }

    #[test]
    fn plain_action_is_not_a_definition() {
        let mut vars = VarTable::new();
        assert!(!vars.consume_definition("1/VOL 100"));
    }

    #[test]
    fn definition_value_resolves_at_definition_time() {
        let mut vars = VarTable::new();
        vars.set("A", "3");
        assert!(vars.consume_definition("$B = $A"));
        vars.set("A", "9");
        assert_eq!(vars.get("B"), Some("3"));
    }

    #[test]
    fn values_are_uppercased_for_the_uppercased_list() {
        let mut vars = VarTable::new();
        vars.set("t", "mute on");
        assert_eq!(vars.substitute("1/$T"), "1/MUTE ON");
    }
}
