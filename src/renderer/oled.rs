//! Framebuffer renderer for SSD1306-class panels.
//!
//! Drawing goes through `embedded-graphics` into a [`Framebuffer`] that maps
//! logical coordinates to the physical 128x64 grid according to the current
//! rotation. `present()` hands the physical bitmap to a [`PanelTransport`].
//!
//! # Rotation
//!
//! | rotation | logical size | physical (px, py) |
//! |----------|--------------|-------------------|
//! | 0 | 128x64 | (x, y) |
//! | 90 | 64x128 | (127 - y, x) |
//! | 180 | 128x64 | (127 - x, 63 - y) |
//! | 270 | 64x128 | (y, 63 - x) |

use std::time::Instant;

use embedded_graphics::image::{Image, ImageRaw};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Line, PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use log::{debug, error, warn};
use oled_display_common::{Bitmap, SCREEN_HEIGHT, SCREEN_WIDTH, widgets};

use super::{Align, FontSize, Renderer};
use crate::config::{PRESENT_DEADLINE, Rotation};
use crate::error::{RendererError, TransportError};

const STROKE: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 1);
const FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::On);

// =============================================================================
// Panel Transport
// =============================================================================

/// Link to the physical panel (I2C driver, simulator window, ...).
pub trait PanelTransport: Send {
    /// Bring the panel up. Called once by [`OledRenderer::open`].
    fn init(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    /// Push a full physical frame (128x64, row-major, MSB first).
    fn write_frame(
        &mut self,
        frame: &Bitmap,
    ) -> Result<(), TransportError>;

    /// Wake the panel after [`PanelTransport::power_off`].
    fn power_on(&mut self) -> Result<(), TransportError> {
        Ok(())
    }

    fn power_off(&mut self) -> Result<(), TransportError>;
}

// =============================================================================
// Framebuffer
// =============================================================================

/// Rotating 1-bpp framebuffer over the physical panel grid.
#[derive(Clone, Debug)]
pub struct Framebuffer {
    pixels: Bitmap,
    rotation: Rotation,
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            pixels: Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT),
            rotation: Rotation::Deg0,
        }
    }

    /// Physical pixels, as sent to the panel.
    pub fn physical(&self) -> &Bitmap {
        &self.pixels
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Change the rotation. Existing contents are discarded.
    pub fn set_rotation(
        &mut self,
        rotation: Rotation,
    ) {
        self.rotation = rotation;
        self.blank();
    }

    pub fn blank(&mut self) {
        self.pixels = Bitmap::new(SCREEN_WIDTH, SCREEN_HEIGHT);
    }

    /// Map a logical point to physical coordinates. `None` when off-screen.
    pub fn to_physical(
        &self,
        point: Point,
    ) -> Option<(u32, u32)> {
        let size = self.size();
        if point.x < 0 || point.y < 0 || point.x as u32 >= size.width || point.y as u32 >= size.height {
            return None;
        }
        let (x, y) = (point.x as u32, point.y as u32);
        let (w, h) = (SCREEN_WIDTH, SCREEN_HEIGHT);
        Some(match self.rotation {
            Rotation::Deg0 => (x, y),
            Rotation::Deg90 => (w - 1 - y, x),
            Rotation::Deg180 => (w - 1 - x, h - 1 - y),
            Rotation::Deg270 => (y, h - 1 - x),
        })
    }

    /// Read a logical pixel.
    pub fn get(
        &self,
        point: Point,
    ) -> bool {
        self.to_physical(point).is_some_and(|(x, y)| self.pixels.get(x, y))
    }
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl OriginDimensions for Framebuffer {
    fn size(&self) -> Size {
        if self.rotation.is_portrait() {
            Size::new(SCREEN_HEIGHT, SCREEN_WIDTH)
        } else {
            Size::new(SCREEN_WIDTH, SCREEN_HEIGHT)
        }
    }
}

impl DrawTarget for Framebuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(
        &mut self,
        pixels: I,
    ) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some((x, y)) = self.to_physical(point) {
                self.pixels.set(x, y, color.is_on());
            }
        }
        Ok(())
    }
}

// =============================================================================
// OLED Renderer
// =============================================================================

/// [`Renderer`] backed by a [`Framebuffer`] and a [`PanelTransport`].
pub struct OledRenderer<T> {
    transport: T,
    framebuffer: Framebuffer,
    ready: bool,
}

impl<T: PanelTransport> OledRenderer<T> {
    /// Initialise the panel. Fails if the transport cannot bring it up.
    pub fn open(mut transport: T) -> Result<Self, RendererError> {
        transport.init()?;
        debug!("panel initialised");
        Ok(Self {
            transport,
            framebuffer: Framebuffer::new(),
            ready: true,
        })
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

impl<T: PanelTransport> Renderer for OledRenderer<T> {
    fn clear(&mut self) {
        self.framebuffer.blank();
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        align: Align,
        size: FontSize,
        fill: bool,
    ) {
        Text::with_text_style(text, Point::new(x, y), size.style(fill), align.text_style())
            .draw(&mut self.framebuffer)
            .ok();
    }

    fn draw_bar_horizontal(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) {
        widgets::draw_bar(&mut self.framebuffer, percent, x, y, w, h);
    }

    fn draw_pie(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        radius: u32,
        start_angle: f32,
        end_angle: f32,
    ) {
        widgets::draw_pie(&mut self.framebuffer, percent, x, y, radius, start_angle, end_angle);
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
    ) {
        let size = self.framebuffer.size();
        let origin = Point::new(
            (size.width as i32 - bitmap.width() as i32) / 2,
            (size.height as i32 - bitmap.height() as i32) / 2,
        );
        let raw = ImageRaw::<BinaryColor>::new(bitmap.data(), bitmap.width());
        Image::new(&raw, origin).draw(&mut self.framebuffer).ok();
    }

    fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        filled: bool,
    ) {
        let style = if filled { FILL } else { STROKE };
        Rectangle::new(Point::new(x, y), Size::new(w, h))
            .into_styled(style)
            .draw(&mut self.framebuffer)
            .ok();
    }

    fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) {
        Line::new(Point::new(x0, y0), Point::new(x1, y1))
            .into_styled(STROKE)
            .draw(&mut self.framebuffer)
            .ok();
    }

    fn set_rotation(
        &mut self,
        rotation: Rotation,
    ) {
        debug!("rotation set to {} degrees", rotation.degrees());
        self.framebuffer.set_rotation(rotation);
    }

    fn present(&mut self) {
        let start = Instant::now();
        if let Err(e) = self.transport.write_frame(self.framebuffer.physical()) {
            error!("failed to present frame: {e}");
        }
        let elapsed = start.elapsed();
        if elapsed > PRESENT_DEADLINE {
            warn!("present took {elapsed:?}, over the {PRESENT_DEADLINE:?} deadline");
        }
    }

    fn on(&mut self) {
        if let Err(e) = self.transport.power_on() {
            error!("failed to power on panel: {e}");
        }
    }

    fn off(&mut self) {
        if let Err(e) = self.transport.power_off() {
            error!("failed to power off panel: {e}");
        }
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
