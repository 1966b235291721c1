//! Common types and constants for the OLED display controller.
//!
//! This crate contains platform-agnostic code shared between the controller
//! library and the desktop simulator:
//!
//! - [`frames`]: Monochrome bitmap sequence (`video_frames.bin`) codec
//! - [`layout`]: Panel dimensions and pre-computed layout constants
//! - [`styles`]: Pre-computed text styles and font selection
//! - [`widgets`]: Bar and pie primitives over any `BinaryColor` draw target

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod frames;
pub mod layout;
pub mod styles;
pub mod widgets;

// Re-export commonly used items
pub use frames::{Bitmap, FrameError, FrameSet};
pub use layout::*;
