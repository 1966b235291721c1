// Crate-level lints: Allow common graphics patterns that pedantic lints flag
#![allow(clippy::cast_possible_truncation)] // f32->i32, u32->i32 casts for pixel math
#![allow(clippy::cast_precision_loss)] // u64->f32 for byte and percent readouts
#![allow(clippy::cast_possible_wrap)] // u32->i32 wrapping is acceptable for panel coordinates
#![allow(clippy::cast_sign_loss)] // i32->u32 where we know sign is positive
#![allow(clippy::module_name_repetitions)] // DisplayConfig, DisplayController read better in call sites

//! Information-display controller for a 128x64 monochrome OLED panel.
//!
//! A background worker cycles the panel through a fixed sequence:
//!
//! ```text
//!  Logo ──(interval)──▶ Greeting ──▶ Server info ──▶ Info pages ──┐
//!   ▲                                                             │
//!   └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The info pages (performance, network, disk) redraw once per second from a
//! [`Telemetry`] source. A single click wakes a sleeping panel or, when awake,
//! jumps to the next info page. A shutdown request latches a `POWER OFF`
//! banner until the controller is restarted.
//!
//! # Modules
//!
//! - [`controller`]: Worker thread, input queues, display-cycle state machine
//! - [`config`]: Runtime settings and hot updates from TOML tables
//! - [`state`]: Pages, phases, button events, published status
//! - [`renderer`]: Drawing capability, framebuffer renderer and recording mock
//! - [`pages`]: Info pages and their rotation
//! - [`screens`]: Logo, greeting, server info and power-off screens
//! - [`telemetry`]: Host metrics source, byte formatting, address rotation
//! - [`frames`]: Locating and loading the logo asset
//! - [`clock`]: Injectable monotonic time
//! - [`error`]: Error types
//!
//! # Threading
//!
//! Only the worker thread touches the renderer and the runtime state. Every
//! other caller goes through the bounded queues on [`DisplayController`] and
//! reads back a [`ControllerStatus`] snapshot.

pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod frames;
pub mod pages;
pub mod renderer;
pub mod screens;
pub mod state;
pub mod telemetry;

// Re-export commonly used items
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigChanges, ConfigUpdate, DisplayConfig, Identity, Rotation, TemperatureUnit};
pub use controller::DisplayController;
pub use error::{ConfigError, ControllerError, RendererError, TelemetryError, TransportError};
pub use frames::FrameStore;
pub use oled_display_common::{Bitmap, FrameSet};
pub use pages::{InfoPage, InfoPageSet};
pub use renderer::{DrawOp, MockRenderer, OledRenderer, PanelTransport, Renderer};
pub use state::{ButtonEvent, ControllerStatus, CyclePhase, Page};
pub use telemetry::{DiskInfo, FixedTelemetry, MemoryInfo, Telemetry};
