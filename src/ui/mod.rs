//! # UI Module
//!
//! Input side of the panel: widget events and the adapter that turns them
//! into robot commands.

pub mod adapter;
pub mod event;

pub use adapter::IntentAdapter;
pub use event::{ButtonId, UiEvent, PRESET_MATRIX};
