//! Target resolution — turning specs and selectors into concrete entities.
//!
//! Every resolver here is fail-silent: a spec that names nothing yields an
//! empty result (or `None`) and the surrounding command is skipped. Entities
//! are addressed by index and looked up again at the point of use, never
//! held across host callbacks.

pub mod clips;
pub mod devices;
pub mod scenes;
pub mod tracks;

pub use clips::resolve_clip;
pub use devices::{
    device_at, device_at_mut, find_by_class, find_drum_rack, resolve_device, scan_devices,
};
pub use scenes::resolve_scene;
pub use tracks::{find_track_by_name, resolve_track_spec};
