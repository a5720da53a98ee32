//! Action-list parsing — from trigger display names to structured commands.

pub mod adjust;
pub mod command;
pub mod trigger;
pub mod vars;

pub use adjust::{resolve, resolve_toggle, Domain, Scale};
pub use command::{split_command, RawCommand};
pub use trigger::{parse_trigger_name, split_ident, ParsedTrigger, SeqTag};
pub use vars::VarTable;
