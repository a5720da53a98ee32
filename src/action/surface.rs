//! Runtime-registered handlers — control-surface hooks and user actions.
//!
//! The built-in tables are function pointers; these are boxed closures so an
//! embedder can capture its own state. Surface handlers hang off a fixed
//! prefix (`PUSH`, `CS`, ...) and receive the raw text after it; user actions
//! are plain named handlers consulted after every built-in category misses.

use std::collections::HashMap;

use log::debug;

use crate::host::LiveSet;

use super::ActionCtx;

/// A registered handler. Boxed so it may capture embedder state.
pub type DynHandler = Box<dyn FnMut(&mut dyn LiveSet, &mut ActionCtx, &str)>;

/// Handlers registered at runtime, looked up by prefix or exact name.
#[derive(Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, DynHandler>,
    users: HashMap<String, DynHandler>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hook a control-surface prefix. Replaces any previous hook.
    pub fn register_surface(&mut self, prefix: &str, handler: DynHandler) {
        self.surfaces.insert(prefix.to_uppercase(), handler);
    }

    /// Register a user action under `name`. Replaces any previous handler.
    pub fn register_user(&mut self, name: &str, handler: DynHandler) {
        self.users.insert(name.to_uppercase(), handler);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Run the hook for `prefix`, if one is registered.
    pub fn dispatch_surface(
        &mut self,
        set: &mut dyn LiveSet,
        prefix: &str,
        text: &str,
        ctx: &mut ActionCtx,
    ) -> bool {
        let Some(handler) = self.surfaces.get_mut(prefix) else {
            return false;
        };
        debug!("{}: surface {prefix} takes {text:?}", ctx.ident);
        handler(set, ctx, text.trim());
        true
    }

    /// Run the user action `name`, if one is registered.
    pub fn dispatch_user(
        &mut self,
        set: &mut dyn LiveSet,
        name: &str,
        args: &str,
        ctx: &mut ActionCtx,
    ) -> bool {
        let Some(handler) = self.users.get_mut(name) else {
            return false;
        };
        handler(set, ctx, args);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::TestCtx;
    use crate::host::{SimSet, Track};

    #[test]
    fn user_actions_run_by_name() {
        let mut registry = SurfaceRegistry::new();
        registry.register_user("warmup", Box::new(|set, _ctx, args| {
            let bpm: f64 = args.parse().unwrap_or(120.0);
            set.set_tempo(bpm);
        }));
        let mut set = SimSet::new(1, 0, 2);
        let mut tc = TestCtx::new();
        assert!(registry.dispatch_user(&mut set, "WARMUP", "96", &mut tc.ctx()));
        assert_approx_eq::assert_approx_eq!(set.tempo, 96.0, 1e-9);
        assert!(!registry.dispatch_user(&mut set, "COOLDOWN", "", &mut tc.ctx()));
    }

    #[test]
    fn surface_hooks_get_the_post_prefix_text() {
        let mut registry = SurfaceRegistry::new();
        registry.register_surface("PUSH", Box::new(|set, _ctx, text| {
            if text == "MUTE" {
                if let Some(t) = set.track_mut(0) {
                    t.set_muted(true);
                }
            }
        }));
        let mut set = SimSet::new(1, 0, 2);
        let mut tc = TestCtx::new();
        assert!(registry.dispatch_surface(&mut set, "PUSH", " MUTE", &mut tc.ctx()));
        assert!(set.tracks[0].muted);
        assert!(!registry.dispatch_surface(&mut set, "MXT", "1", &mut tc.ctx()));
    }
}
