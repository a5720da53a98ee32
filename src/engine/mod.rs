//! Engine — trigger firings in, host edits out.
//!
//! One engine instance owns every piece of cross-firing state: the variable
//! table, play-sequence positions, pending ramps and morph pairs, queued
//! name restores, and the seeded RNG. The host calls in on its own thread
//! whenever a trigger fires or a tick elapses; nothing here blocks, spawns,
//! or holds host entities across calls.

pub mod config;
pub mod sched;

use log::{debug, error, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::action::{dispatch, ActionCtx, ActionRegistry, SurfaceRegistry};
use crate::host::{LiveSet, Track, TriggerRef};
use crate::parse::{parse_trigger_name, split_command, split_ident, ParsedTrigger, SeqTag, VarTable};
use crate::seq::{SeqKey, SeqPool};
use crate::snap::{decode, is_snapshot_body, recall, PendingRestore, Smoother};

use config::Config;
use sched::TickQueue;

/// The action engine. Embed one per live set and feed it trigger firings.
pub struct Engine {
    registry: ActionRegistry,
    surfaces: SurfaceRegistry,
    vars: VarTable,
    seqs: SeqPool,
    smoother: Smoother,
    restores: TickQueue<PendingRestore>,
    rng: ChaCha8Rng,
    config: Config,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        let vars = VarTable::seed(&config.variables);
        Self {
            registry: ActionRegistry::standard(),
            surfaces: SurfaceRegistry::new(),
            vars,
            seqs: SeqPool::new(),
            smoother: Smoother::new(),
            restores: TickQueue::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            config,
        }
    }

    /// Surface hooks and user actions register here.
    pub fn surfaces_mut(&mut self) -> &mut SurfaceRegistry {
        &mut self.surfaces
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// A session clip changed play state. The clip's current state picks the
    /// on or off list; a clip that is not playing any more fires its off list.
    pub fn fire_clip(&mut self, set: &mut dyn LiveSet, track: usize, slot: usize) {
        let trigger = TriggerRef::Clip { track, slot };
        let Some(name) = set.trigger_name(trigger) else { return };
        let active = set.track(track).and_then(|t| t.playing_slot()) == Some(slot);
        self.fire_trigger(set, Some(trigger), &name, true, active);
    }

    /// The arrangement passed a cue point. Cues have no off state.
    pub fn fire_cue(&mut self, set: &mut dyn LiveSet, index: usize) {
        let trigger = TriggerRef::Cue(index);
        let Some(name) = set.trigger_name(trigger) else { return };
        self.fire_trigger(set, Some(trigger), &name, true, true);
    }

    /// A bound control moved. The host owns no name for controls, so the
    /// binding's name travels with the call.
    pub fn fire_control(
        &mut self,
        set: &mut dyn LiveSet,
        id: u64,
        name: &str,
        pressed: bool,
    ) {
        let trigger = TriggerRef::Control { id };
        self.fire_trigger(set, Some(trigger), name, true, pressed);
    }

    /// Fire a free-standing name, as a startup list or console line would.
    /// No trigger backs it, so snapshot stores are refused downstream.
    pub fn fire_name(&mut self, set: &mut dyn LiveSet, name: &str) {
        self.fire_trigger(set, None, name, false, true);
    }

    /// A playing clip crossed its loop boundary. Only loop-sequenced clips
    /// react; the selected action is `loop_count` modulo the list length.
    pub fn on_clip_loop(
        &mut self,
        set: &mut dyn LiveSet,
        track: usize,
        slot: usize,
        loop_count: u64,
    ) {
        let trigger = TriggerRef::Clip { track, slot };
        let Some(name) = set.trigger_name(trigger) else { return };
        let Some((_, body)) = split_ident(&name) else { return };
        if is_snapshot_body(body) {
            return;
        }
        let Some(parsed) = parse_trigger_name(&name, true, true, &mut self.vars) else {
            return;
        };
        if parsed.seq != Some(SeqTag::Lseq) {
            return;
        }
        let key = self.seq_key(Some(trigger), &name);
        let Some(action) =
            self.seqs.select_by_loop(key, &parsed.ident, &parsed.actions, loop_count)
        else {
            return;
        };
        self.run_action(set, Some(trigger), &parsed.ident, &action);
    }

    /// Advance time by one engine tick: step ramps, release due restores.
    pub fn on_tick(&mut self, set: &mut dyn LiveSet) {
        self.smoother.tick(set);
        for restore in self.restores.tick() {
            if !set.set_trigger_name(restore.trigger, &restore.name) {
                debug!("restore target vanished, dropping {:?}", restore.trigger);
            }
        }
    }

    /// Fire the configured startup list once the host is ready.
    pub fn run_startup(&mut self, set: &mut dyn LiveSet) {
        let list = self.config.startup_actions.trim().to_string();
        if list.is_empty() {
            return;
        }
        info!("running startup actions: {list}");
        let name = format!("[STARTUP] {list}");
        self.fire_trigger(set, None, &name, false, true);
    }

    /// Blend the loaded morph pairs; 0 is fully the first snapshot, 127 the
    /// second. Loading happens by recalling snapshots from the morph track.
    pub fn set_morph(&self, set: &mut dyn LiveSet, amount: u8) {
        self.smoother.apply_morph(set, amount);
    }

    fn fire_trigger(
        &mut self,
        set: &mut dyn LiveSet,
        trigger: Option<TriggerRef>,
        name: &str,
        supports_off: bool,
        active: bool,
    ) {
        let Some((ident, body)) = split_ident(name) else {
            return;
        };
        if is_snapshot_body(body) {
            if active {
                self.recall_snapshot(set, trigger, ident, body);
            }
            return;
        }
        let Some(parsed) = parse_trigger_name(name, supports_off, active, &mut self.vars) else {
            return;
        };
        match parsed.seq {
            Some(SeqTag::Pseq) => {
                let key = self.seq_key(trigger, name);
                let Some(action) = self.seqs.advance(key, &parsed.ident, &parsed.actions) else {
                    return;
                };
                self.run_action(set, trigger, &parsed.ident, &action);
            }
            Some(SeqTag::Lseq) if matches!(trigger, Some(TriggerRef::Clip { .. })) => {
                // Loop boundaries drive the list; the firing itself runs nothing.
                debug!("{}: loop sequence armed", parsed.ident);
            }
            Some(SeqTag::Lseq) => {
                debug!("{}: loop sequence without a clip, running plain", parsed.ident);
                self.run_all(set, trigger, &parsed);
            }
            None => self.run_all(set, trigger, &parsed),
        }
    }

    fn recall_snapshot(
        &mut self,
        set: &mut dyn LiveSet,
        trigger: Option<TriggerRef>,
        ident: &str,
        body: &str,
    ) {
        match decode(body) {
            Ok(snapshot) => {
                let recall_track = trigger.and_then(|t| set.trigger_track(t));
                recall(set, &snapshot, recall_track, &self.config, &mut self.smoother);
                info!("recalled snapshot {ident}");
            }
            Err(e) => error!("snapshot {ident} unreadable: {e}"),
        }
    }

    fn run_all(&mut self, set: &mut dyn LiveSet, trigger: Option<TriggerRef>, parsed: &ParsedTrigger) {
        for action in &parsed.actions {
            self.run_action(set, trigger, &parsed.ident, action);
        }
    }

    fn run_action(
        &mut self,
        set: &mut dyn LiveSet,
        trigger: Option<TriggerRef>,
        ident: &str,
        action: &str,
    ) {
        let Some(command) = split_command(action) else {
            return;
        };
        let ref_track = trigger
            .and_then(|t| set.trigger_track(t))
            .unwrap_or_else(|| set.selected_track());
        let mut ctx = ActionCtx {
            ident,
            trigger,
            rng: &mut self.rng,
            vars: &mut self.vars,
            seqs: &mut self.seqs,
            smoother: &mut self.smoother,
            restores: &mut self.restores,
            config: &self.config,
        };
        dispatch(set, &self.registry, &mut self.surfaces, &command, ref_track, &mut ctx);
    }

    /// Sequences share state by display name unless identity keying is on.
    fn seq_key(&self, trigger: Option<TriggerRef>, name: &str) -> SeqKey {
        match trigger {
            Some(t) if self.config.strict_seq_identity => SeqKey::Identity(t),
            _ => SeqKey::Name(name.trim().to_uppercase()),
        }
    }
}
