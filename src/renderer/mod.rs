//! Rendering capability used by the controller and the info pages.
//!
//! Every `draw_*` call only touches an in-memory framebuffer; [`Renderer::present`]
//! is the single point where pixels reach the panel. Implementations swallow
//! and log transport failures, so drawing never fails from the caller's side.
//!
//! - [`OledRenderer`]: 1-bpp framebuffer flushed through a [`PanelTransport`]
//! - [`MockRenderer`]: records every call as a [`DrawOp`]

mod mock;
mod oled;

pub use mock::{DrawOp, MockRenderer};
pub use oled::{Framebuffer, OledRenderer, PanelTransport};
pub use oled_display_common::styles::{Align, FontSize};

use oled_display_common::Bitmap;

use crate::config::Rotation;

/// Primitive drawing, present and power control for a 128x64 monochrome panel.
///
/// Coordinates are logical: they follow the current rotation. Text `y` is the
/// top of the glyph box and `x` is the anchor for `align`.
pub trait Renderer: Send {
    /// Blank the framebuffer.
    fn clear(&mut self);

    /// Draw text. `fill = false` draws unlit glyphs, for text on a filled box.
    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        align: Align,
        size: FontSize,
        fill: bool,
    );

    /// Outlined bar filled left to right by `percent` (clamped to 0..=100).
    fn draw_bar_horizontal(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    );

    /// Pie gauge: outline arc `start_angle..end_angle`, sector filled by `percent`.
    fn draw_pie(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        radius: u32,
        start_angle: f32,
        end_angle: f32,
    );

    /// Draw a bitmap centred on the logical screen, clipped if larger.
    fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
    );

    fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        filled: bool,
    );

    fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    );

    fn set_rotation(
        &mut self,
        rotation: Rotation,
    );

    /// Flush the framebuffer to the panel.
    fn present(&mut self);

    /// Power the panel up after [`Renderer::off`].
    fn on(&mut self);

    /// Power the panel down.
    fn off(&mut self);

    fn is_ready(&self) -> bool;
}
