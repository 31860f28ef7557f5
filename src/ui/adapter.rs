//! # Intent Adapter
//!
//! Turns widget events into commands on the outbound path and feedback in
//! the terminal log.
//!
//! | Event | Sent | Log on success | Log on failure |
//! |-------|------|----------------|----------------|
//! | Direction button | `{"cmd":"MOVE",...}` | `I UP` (before sending) | `W UP send failed` |
//! | E-STOP | `STOP` | `!!! E-STOP sent !!!` | `!!! E-STOP FAILED !!!` |
//! | Preset slot | preset token | `I SCAN sent`, ... | `W SCAN send failed` |
//! | Speed slider | nothing | `I Speed: N%` | |
//!
//! A successful FARFROMHOME send arms the SPM ping window.

use std::sync::Arc;

use tracing::{debug, warn};

use super::event::{ButtonId, UiEvent};
use crate::bridge::{Clock, Outbound, PanelContext};
use crate::command::{encode_move, encode_preset, Direction, Preset, SPEED_MAX_PERCENT};
use crate::display::{self, DisplaySink, WidgetId};
use crate::link::transport::Transport;

/// Log line after a preset was handed to the transport
fn preset_sent_line(preset: Preset) -> String {
    match preset {
        Preset::Trot => "I TROT gait sent".to_string(),
        Preset::FarFromHome => "I FarFromHome command sent".to_string(),
        other => format!("I {} sent", other.name()),
    }
}

/// Dispatches UI events for one panel
pub struct IntentAdapter<D: DisplaySink, T: Transport, C: Clock> {
    ctx: Arc<PanelContext<D>>,
    outbound: Arc<Outbound<T>>,
    clock: Arc<C>,
}

impl<D: DisplaySink, T: Transport, C: Clock> IntentAdapter<D, T, C> {
    pub fn new(ctx: Arc<PanelContext<D>>, outbound: Arc<Outbound<T>>, clock: Arc<C>) -> Self {
        Self { ctx, outbound, clock }
    }

    pub async fn handle(&self, event: UiEvent) {
        debug!("UI event: {:?}", event);
        match event {
            UiEvent::ButtonPressed(ButtonId::Direction(direction)) => self.move_robot(direction).await,
            UiEvent::ButtonPressed(ButtonId::EmergencyStop) => self.emergency_stop().await,
            UiEvent::ButtonPressed(slot @ ButtonId::PresetSlot(index)) => match slot.preset() {
                Some(preset) => self.send_preset(preset).await,
                None => debug!("No preset on button {}", index),
            },
            UiEvent::SliderChanged(value) => self.change_speed(value).await,
        }
    }

    async fn move_robot(&self, direction: Direction) {
        self.ctx.log(&format!("I {}", direction)).await;

        let payload = match encode_move(direction, self.ctx.speed()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Failed to encode {} move: {}", direction, e);
                return;
            }
        };

        if let Err(e) = self.outbound.send(&payload).await {
            warn!("{} send failed: {}", direction, e);
            self.ctx.log(&format!("W {} send failed", direction)).await;
        }
    }

    async fn emergency_stop(&self) {
        match self.outbound.send(&encode_preset(Preset::Stop)).await {
            Ok(()) => self.ctx.log("!!! E-STOP sent !!!").await,
            Err(e) => {
                warn!("E-STOP send failed: {}", e);
                self.ctx.log("!!! E-STOP FAILED !!!").await;
            }
        }
    }

    async fn send_preset(&self, preset: Preset) {
        match self.outbound.send(&encode_preset(preset)).await {
            Ok(()) => {
                if preset == Preset::FarFromHome {
                    self.ctx.scheduler().arm(self.clock.now_ms());
                }
                self.ctx.log(&preset_sent_line(preset)).await;
            }
            Err(e) => {
                warn!("{} send failed: {}", preset, e);
                self.ctx.log(&format!("W {} send failed", preset)).await;
            }
        }
    }

    /// Runs in the rendering context, so it may wait for the display lock
    async fn change_speed(&self, value: i32) {
        let speed = self.ctx.set_speed(value.clamp(0, SPEED_MAX_PERCENT as i32) as u8);
        self.ctx
            .display()
            .lock()
            .await
            .set_text(WidgetId::SpeedLabel, &display::format_speed(speed));
        self.ctx.log(&format!("I Speed: {}%", speed)).await;
    }
}
