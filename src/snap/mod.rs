//! Snapshots — capture set state into a trigger name, recall it later.
//!
//! The codec defines the typed blob and its `"<ident> || <json>"` name
//! form; capture drives store/recall against the capability surface; smooth
//! owns ramped recalls and macro-driven morphing.

pub mod capture;
pub mod codec;
pub mod smooth;

pub use capture::{parse_flags, recall, store, PendingRestore, SnapScope};
pub use codec::{
    decode, encode, is_snapshot_body, DeviceSnapshot, MixExtras, MixSnapshot, PlayState,
    SetSnapshot, SnapError, TrackSnapshot, SNAPSHOT_MARKER,
};
pub use smooth::{read_param, write_param, ParamPath, Smoother};
