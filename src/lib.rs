//! Stagehand — a trigger-driven action engine for live set control.

pub mod action;
pub mod engine;
pub mod host;
pub mod parse;
pub mod seq;
pub mod snap;
pub mod target;
