//! # Transport Bridge
//!
//! Glue between the radio link and the panel display.
//!
//! This module handles:
//! - The receive path ([`Dispatcher`]) from inbound frames to display updates
//! - The SPM ping state machine and its tick task ([`scheduler`])
//! - The shared panel context and its bounded rendering lock
//! - The outbound path to the configured peer
//!
//! ## Contexts
//!
//! ```text
//! link reader ──► Dispatcher ──┐
//!                              ├──► PanelContext ──► RenderLock<DisplaySink>
//! console / UI ──► adapter ────┤
//! ping tick (100ms) ───────────┘         └──► Outbound ──► Transport
//! ```

pub mod clock;
pub mod context;
pub mod dispatcher;
pub mod outbound;
pub mod scheduler;
pub mod state;

pub use clock::{Clock, MonotonicClock};
pub use context::PanelContext;
pub use dispatcher::Dispatcher;
pub use outbound::Outbound;
pub use scheduler::{run_ping_loop, PingScheduler, SpmState};
pub use state::{ConnectionState, RenderLock};
