//! Step sequencing — `(PSEQ)` advance-per-fire and `(LSEQ)` loop-count selection.
//!
//! A play sequence dispatches one action per firing instead of the whole
//! list. Its position persists for the life of the process, but the action
//! list is re-read from the live trigger name on every firing, so renaming a
//! trigger changes what plays without resetting where it is.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::host::TriggerRef;

/// Pool key. Sequences are shared by trigger *name* by default — two
/// triggers with identical names advance the same position, a quirk kept
/// from the original surface. Strict mode keys by concrete identity instead.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SeqKey {
    Name(String),
    Identity(TriggerRef),
}

/// Stored state of one sequence.
#[derive(Debug, Clone)]
pub struct SeqState {
    pub ident: String,
    pub position: usize,
    pub actions: Vec<String>,
}

/// All live sequences. States accumulate and are only dropped by a reset.
#[derive(Debug, Default)]
pub struct SeqPool {
    states: HashMap<SeqKey, SeqState>,
}

impl SeqPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance a play sequence and return the action to dispatch now.
    ///
    /// The first firing plays position 0; each later firing refreshes the
    /// stored list and steps to `(position + 1) mod len`, so a shortened
    /// list folds the position back into range at read time.
    pub fn advance(&mut self, key: SeqKey, ident: &str, actions: &[String]) -> Option<String> {
        if actions.is_empty() {
            return None;
        }
        match self.states.entry(key) {
            Entry::Occupied(mut occupied) => {
                let state = occupied.get_mut();
                state.actions = actions.to_vec();
                state.position = (state.position + 1) % state.actions.len();
                Some(state.actions[state.position].clone())
            }
            Entry::Vacant(vacant) => {
                let action = actions[0].clone();
                vacant.insert(SeqState {
                    ident: ident.to_string(),
                    position: 0,
                    actions: actions.to_vec(),
                });
                Some(action)
            }
        }
    }

    /// Select an action by clip loop count. The position is a pure function
    /// of the count; state is kept only so DEBUG can report it.
    pub fn select_by_loop(
        &mut self,
        key: SeqKey,
        ident: &str,
        actions: &[String],
        loop_count: u64,
    ) -> Option<String> {
        if actions.is_empty() {
            return None;
        }
        let position = (loop_count % actions.len() as u64) as usize;
        let state = self.states.entry(key).or_insert_with(|| SeqState {
            ident: ident.to_string(),
            position,
            actions: Vec::new(),
        });
        state.ident = ident.to_string();
        state.position = position;
        state.actions = actions.to_vec();
        Some(actions[position].clone())
    }

    /// Forget every stored position (the `PSEQ RESET` action).
    pub fn reset(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
