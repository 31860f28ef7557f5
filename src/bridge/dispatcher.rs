//! # Receive Dispatcher
//!
//! Entry point for every inbound frame. For each frame it:
//! - reads the RSSI and estimates peer distance
//! - updates connection state and the RSSI label
//! - parses the payload and pushes each field to the display
//! - appends the summary and note lines to the terminal log
//!
//! No step aborts the others. Display pushes that miss the rendering lock are
//! dropped; the log lines are always recorded.

use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::{debug, info, warn};

use super::context::PanelContext;
use crate::display::DisplaySink;
use crate::error::Result;
use crate::link::protocol::{InboundFrame, LinkEvent};
use crate::link::LinkReader;
use crate::ranging::{self, PathLossModel};
use crate::telemetry::{ParsedFrame, TelemetryParser};

/// Routes received frames into the panel context
pub struct Dispatcher<D: DisplaySink> {
    ctx: Arc<PanelContext<D>>,
    parser: TelemetryParser,
    model: PathLossModel,
}

impl<D: DisplaySink> Dispatcher<D> {
    pub fn new(ctx: Arc<PanelContext<D>>, parser: TelemetryParser, model: PathLossModel) -> Self {
        Self { ctx, parser, model }
    }

    /// Handle one inbound frame and return what was parsed from it
    pub async fn handle_frame(&self, frame: &InboundFrame) -> ParsedFrame {
        let rssi = frame.rssi_dbm;
        let distance_m = ranging::is_plausible(rssi).then(|| self.model.estimate(rssi));

        self.ctx.show_signal(rssi, distance_m).await;
        let summary = match distance_m {
            Some(m) => format!("I RSSI: {} dBm @ ~{:.2} m", rssi, m),
            None => format!("W RSSI: {} dBm out of range", rssi),
        };
        self.ctx.log(&summary).await;

        let parsed = self.parser.parse(&frame.payload);
        debug!("← {} bytes from {}: {:?}", frame.payload.len(), frame.src, parsed);

        if let Some(celsius) = parsed.temperature_c {
            self.ctx.show_temperature(celsius).await;
        }
        if let Some(distance_cm) = parsed.distance_cm {
            self.ctx.show_distance(distance_cm).await;
        }
        self.ctx.record_frame(&parsed);

        for line in parsed.log_lines() {
            self.ctx.log(&line).await;
        }

        parsed
    }

    /// Drain link events until the dongle closes the port.
    ///
    /// # Errors
    ///
    /// Returns the reader's error when the serial port fails. The radio is
    /// marked down either way.
    pub async fn run<R: AsyncRead + Unpin>(&self, reader: &mut LinkReader<R>) -> Result<()> {
        let outcome = loop {
            match reader.next_event().await {
                Ok(Some(LinkEvent::Received(frame))) => {
                    self.handle_frame(&frame).await;
                }
                Ok(Some(LinkEvent::SendStatus { delivered })) => {
                    debug!("Send status: {}", if delivered { "delivered" } else { "not delivered" });
                }
                Ok(None) => {
                    info!("Link closed");
                    break Ok(());
                }
                Err(e) => {
                    warn!("Link read failed: {}", e);
                    break Err(e);
                }
            }
        };

        if reader.dropped_bytes() > 0 {
            debug!("Discarded {} bytes while resynchronising", reader.dropped_bytes());
        }
        self.ctx.update_connection(|c| c.radio_down());
        outcome
    }
}
