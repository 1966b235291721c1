//! Panel transport that forwards frames to the window thread.

use std::sync::mpsc::{Receiver, Sender, channel};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::SimulatorDisplay;
use oled_display::{PanelTransport, TransportError};
use oled_display_common::Bitmap;

/// What the controller's worker sent to the panel.
#[derive(Debug)]
pub enum PanelEvent {
    Frame(Bitmap),
    PowerOn,
    PowerOff,
}

/// [`PanelTransport`] over an mpsc channel. The SDL window lives on the main thread.
pub struct ChannelTransport {
    tx: Sender<PanelEvent>,
}

impl ChannelTransport {
    pub fn connect() -> (Self, Receiver<PanelEvent>) {
        let (tx, rx) = channel();
        (Self { tx }, rx)
    }

    fn send(
        &self,
        event: PanelEvent,
    ) -> Result<(), TransportError> {
        self.tx.send(event).map_err(|_| TransportError::new("simulator window closed"))
    }
}

impl PanelTransport for ChannelTransport {
    fn write_frame(
        &mut self,
        frame: &Bitmap,
    ) -> Result<(), TransportError> {
        self.send(PanelEvent::Frame(frame.clone()))
    }

    fn power_on(&mut self) -> Result<(), TransportError> {
        self.send(PanelEvent::PowerOn)
    }

    fn power_off(&mut self) -> Result<(), TransportError> {
        self.send(PanelEvent::PowerOff)
    }
}

/// Copy a physical frame into the simulator display.
pub fn blit(
    display: &mut SimulatorDisplay<BinaryColor>,
    frame: &Bitmap,
) {
    let pixels = (0..frame.height()).flat_map(|y| {
        (0..frame.width()).map(move |x| {
            let color = if frame.get(x, y) { BinaryColor::On } else { BinaryColor::Off };
            Pixel(Point::new(x as i32, y as i32), color)
        })
    });
    display.draw_iter(pixels).ok();
}
