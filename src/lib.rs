//! # Biospider Panel Library
//!
//! Telemetry and command bridge for the Biospider walking robot's control
//! panel, talking to the robot over ESP-NOW through a USB-serial dongle.
//!
//! This library provides the panel core: the terminal log ring, the
//! telemetry parser, RSSI ranging, command encoding, the receive and ping
//! paths of the transport bridge, and the UI intent adapter.

pub mod bridge;
pub mod command;
pub mod config;
pub mod display;
pub mod error;
pub mod link;
pub mod log_ring;
pub mod ranging;
pub mod telemetry;
pub mod ui;
