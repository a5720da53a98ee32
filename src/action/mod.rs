//! Action dispatch — tables of named handlers and the routing that feeds them.
//!
//! Handlers are plain function pointers in per-category maps; dispatch walks
//! a fixed precedence: snapshot stores, device selectors, clip selectors,
//! the looper, exact track names, exact global names, drum-rack selectors,
//! control-surface prefixes, user-registered names, and finally the control
//! tokens `PSEQ RESET` and `DEBUG`. A handler failure is its own problem:
//! it logs and the remaining targets and commands still run.

pub mod clip;
pub mod device;
pub mod drum;
pub mod global;
pub mod looper;
pub mod surface;
pub mod track;

use std::collections::HashMap;

use log::{debug, error, info};
use rand_chacha::ChaCha8Rng;

use crate::engine::config::Config;
use crate::engine::sched::TickQueue;
use crate::host::{LiveSet, TriggerRef};
use crate::parse::{RawCommand, VarTable};
use crate::seq::SeqPool;
use crate::snap::{self, PendingRestore, Smoother};
use crate::target::resolve_track_spec;

pub use surface::{DynHandler, SurfaceRegistry};

/// Engine state a handler may touch beyond the set itself.
pub struct ActionCtx<'a> {
    /// Bracketed identifier of the firing trigger, for logs.
    pub ident: &'a str,
    pub trigger: Option<TriggerRef>,
    pub rng: &'a mut ChaCha8Rng,
    pub vars: &'a mut VarTable,
    pub seqs: &'a mut SeqPool,
    pub smoother: &'a mut Smoother,
    pub restores: &'a mut TickQueue<PendingRestore>,
    pub config: &'a Config,
}

pub type GlobalHandler = fn(&mut dyn LiveSet, &mut ActionCtx, &str);
pub type TrackHandler = fn(&mut dyn LiveSet, usize, &mut ActionCtx, &str);
/// Clip handlers receive the owning track and the resolved slot.
pub type ClipHandler = fn(&mut dyn LiveSet, usize, usize, &mut ActionCtx, &str);
/// Device handlers receive the owning track and the resolved chain path.
pub type DeviceHandler = fn(&mut dyn LiveSet, usize, &[usize], &mut ActionCtx, &str);
/// Drum handlers additionally receive the optional pad selector.
pub type DrumHandler =
    fn(&mut dyn LiveSet, usize, &[usize], Option<usize>, &mut ActionCtx, &str);

/// The static dispatch tables, built once at engine startup.
pub struct ActionRegistry {
    pub global: HashMap<&'static str, GlobalHandler>,
    pub track: HashMap<&'static str, TrackHandler>,
    pub clip: HashMap<&'static str, ClipHandler>,
    pub device: HashMap<&'static str, DeviceHandler>,
    pub looper: HashMap<&'static str, DeviceHandler>,
    pub drum: HashMap<&'static str, DrumHandler>,
}

impl ActionRegistry {
    pub fn standard() -> Self {
        Self {
            global: global::table(),
            track: track::table(),
            clip: clip::table(),
            device: device::table(),
            looper: looper::table(),
            drum: drum::table(),
        }
    }
}

/// Control-surface prefixes recognized ahead of user-defined names.
pub const SURFACE_PREFIXES: [&str; 6] = ["SURFACE", "CS", "ARSENAL", "PUSH", "PXT", "MXT"];

/// Route one resolved command to its handler.
pub fn dispatch(
    set: &mut dyn LiveSet,
    registry: &ActionRegistry,
    surfaces: &mut SurfaceRegistry,
    command: &RawCommand,
    ref_track: usize,
    ctx: &mut ActionCtx,
) {
    let name = command.action_name.as_str();

    let targets = match &command.target_spec {
        Some(spec) => resolve_track_spec(spec, &*set),
        None => vec![ref_track],
    };
    if targets.is_empty() {
        debug!("{}: no targets for {name}, skipping", ctx.ident);
        return;
    }

    // Stores must never fall through to anything else.
    if let Some(suffix) = name.strip_prefix("SNAP") {
        let flags = join_flags(suffix, &command.args);
        snap::store(set, &targets, &flags, ctx.ident, ctx.trigger, ctx.config, ctx.restores);
        return;
    }
    if name.starts_with("DEV") {
        for &t in &targets {
            device::dispatch(set, t, after_prefix(&command.text, "DEV"), ctx, &registry.device);
        }
        return;
    }
    if name.starts_with("CLIP") {
        for &t in &targets {
            clip::dispatch(set, t, after_prefix(&command.text, "CLIP"), ctx, &registry.clip);
        }
        return;
    }
    if name == "LOOPER" {
        for &t in &targets {
            looper::dispatch(set, t, &command.args, ctx, &registry.looper);
        }
        return;
    }
    if let Some(handler) = registry.track.get(name) {
        for &t in &targets {
            handler(set, t, ctx, &command.args);
        }
        return;
    }
    if let Some(handler) = registry.global.get(name) {
        handler(set, ctx, &command.args);
        return;
    }
    if name.starts_with("DR") {
        for &t in &targets {
            drum::dispatch(set, t, after_prefix(&command.text, "DR"), ctx, &registry.drum);
        }
        return;
    }
    for prefix in SURFACE_PREFIXES {
        if name.starts_with(prefix)
            && surfaces.dispatch_surface(set, prefix, after_prefix(&command.text, prefix), ctx)
        {
            return;
        }
    }
    if surfaces.dispatch_user(set, name, &command.args, ctx) {
        return;
    }
    if name == "PSEQ" && command.args.trim().eq_ignore_ascii_case("RESET") {
        ctx.seqs.reset();
        info!("play sequences reset");
        return;
    }
    if name == "DEBUG" {
        info!(
            "{} state: {} tracks, {} vars, {} seqs, {} ramps, {} morph pairs, {} queued restores",
            ctx.ident,
            set.track_count(),
            ctx.vars.len(),
            ctx.seqs.len(),
            ctx.smoother.pending(),
            ctx.smoother.morph_len(),
            ctx.restores.len(),
        );
        return;
    }
    error!("{}: unknown action {name:?}, dropped", ctx.ident);
}

/// Selector text of a prefixed action: everything in the command text after
/// the prefix, selector still attached (`DEV2.1 ON` -> `2.1 ON`).
fn after_prefix<'a>(text: &'a str, prefix: &str) -> &'a str {
    &text[prefix.len()..]
}

/// Split a selector off the front of prefixed-action text. The selector is
/// the leading quoted segment or the run up to the first whitespace; text
/// starting with whitespace has no selector.
pub(crate) fn split_selector(text: &str) -> (&str, &str) {
    if text.starts_with('"') {
        if let Some(close) = text[1..].find('"') {
            let end = close + 1;
            return (&text[..=end], text[end + 1..].trim());
        }
    }
    match text.find(char::is_whitespace) {
        Some(ws) => (&text[..ws], text[ws..].trim()),
        None => (text, ""),
    }
}

/// First word and remainder of sub-action text.
pub(crate) fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim();
    match text.find(char::is_whitespace) {
        Some(ws) => (&text[..ws], text[ws..].trim()),
        None => (text, ""),
    }
}

fn join_flags(suffix: &str, args: &str) -> String {
    let mut flags = String::with_capacity(suffix.len() + args.len() + 1);
    flags.push_str(suffix);
    flags.push(' ');
    flags.push_str(args);
    flags.trim().to_string()
}

/// Owned backing state for building an [`ActionCtx`] in tests.
#[cfg(test)]
pub(crate) struct TestCtx {
    pub rng: ChaCha8Rng,
    pub vars: VarTable,
    pub seqs: SeqPool,
    pub smoother: Smoother,
    pub restores: TickQueue<PendingRestore>,
    pub config: Config,
}

#[cfg(test)]
impl TestCtx {
    pub fn new() -> Self {
        use rand::SeedableRng;
        Self {
            rng: ChaCha8Rng::seed_from_u64(7),
            vars: VarTable::new(),
            seqs: SeqPool::new(),
            smoother: Smoother::new(),
            restores: TickQueue::new(),
            config: Config::default(),
        }
    }

    pub fn ctx(&mut self) -> ActionCtx<'_> {
        ActionCtx {
            ident: "[TEST]",
            trigger: None,
            rng: &mut self.rng,
            vars: &mut self.vars,
            seqs: &mut self.seqs,
            smoother: &mut self.smoother,
            restores: &mut self.restores,
            config: &self.config,
        }
    }
}
