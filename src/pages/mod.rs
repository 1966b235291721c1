//! Telemetry pages shown during the info phase and on button presses.
//!
//! # Pages
//!
//! - [`PerformancePage`]: CPU and temperature gauges, RAM and CPU bars
//! - [`NetworkPage`]: current address, rotating through interfaces
//! - [`DiskPage`]: usage of the selected disk (or all mounted disks)
//!
//! Each page owns its whole frame: it clears, draws and presents.

mod disk;
mod network;
mod performance;

pub use disk::DiskPage;
pub use network::NetworkPage;
pub use performance::PerformancePage;

use log::debug;
use oled_display_common::{CENTER_X, SCREEN_WIDTH, TITLE_HEIGHT};

use crate::error::TelemetryError;
use crate::renderer::{Align, FontSize, Renderer};
use crate::telemetry::TelemetryView;

/// A full-screen telemetry page.
pub trait InfoPage: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Draw and present the page.
    fn render(
        &self,
        renderer: &mut dyn Renderer,
        telemetry: &mut TelemetryView<'_>,
    ) -> Result<(), TelemetryError>;
}

/// Ordered, cyclable set of info pages.
pub struct InfoPageSet {
    pages: Vec<Box<dyn InfoPage>>,
    index: usize,
}

impl InfoPageSet {
    pub fn new(pages: Vec<Box<dyn InfoPage>>) -> Self {
        Self { pages, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Move to the next page, wrapping. Returns the new index.
    pub fn advance(&mut self) -> usize {
        if !self.pages.is_empty() {
            self.index = (self.index + 1) % self.pages.len();
        }
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Name of the current page.
    pub fn current_name(&self) -> Option<&'static str> {
        self.pages.get(self.index).map(|p| p.name())
    }

    /// Render the current page without moving. An empty set renders nothing.
    pub fn current(
        &self,
        renderer: &mut dyn Renderer,
        telemetry: &mut TelemetryView<'_>,
    ) -> Result<(), TelemetryError> {
        match self.pages.get(self.index) {
            Some(page) => page.render(renderer, telemetry),
            None => {
                debug!("no info pages registered");
                Ok(())
            }
        }
    }
}

impl Default for InfoPageSet {
    /// Performance, network, disk.
    fn default() -> Self {
        Self::new(vec![Box::new(PerformancePage), Box::new(NetworkPage), Box::new(DiskPage)])
    }
}

/// Inverted full-width title bar.
fn draw_title(
    renderer: &mut dyn Renderer,
    title: &str,
) {
    renderer.draw_rect(0, 0, SCREEN_WIDTH, TITLE_HEIGHT, true);
    renderer.draw_text(title, CENTER_X, 2, Align::Center, FontSize::Small, false);
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::config::DisplayConfig;
    use crate::renderer::MockRenderer;
    use crate::telemetry::{FixedTelemetry, NetworkState};

    #[test]
    fn test_default_order() {
        let mut pages = InfoPageSet::default();
        assert_eq!(pages.len(), 3);
        assert_eq!(pages.current_name(), Some("performance"));
        pages.advance();
        assert_eq!(pages.current_name(), Some("network"));
        pages.advance();
        assert_eq!(pages.current_name(), Some("disk"));
    }

    #[test]
    fn test_advance_wraps() {
        let mut pages = InfoPageSet::default();
        assert_eq!(pages.advance(), 1);
        assert_eq!(pages.advance(), 2);
        assert_eq!(pages.advance(), 0);
        pages.advance();
        pages.reset();
        assert_eq!(pages.index(), 0);
    }

    #[test]
    fn test_empty_set_is_noop() {
        let mut pages = InfoPageSet::new(Vec::new());
        assert_eq!(pages.advance(), 0);
        assert_eq!(pages.current_name(), None);

        let mut renderer = MockRenderer::new();
        let mut source = FixedTelemetry::default();
        let config = DisplayConfig::default();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());
        assert!(pages.current(&mut renderer, &mut view).is_ok());
        assert!(renderer.ops().is_empty());
    }

    #[test]
    fn test_current_does_not_move() {
        let pages = InfoPageSet::default();
        let mut renderer = MockRenderer::new();
        let mut source = FixedTelemetry::default();
        let config = DisplayConfig::default();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());
        pages.current(&mut renderer, &mut view).unwrap();
        pages.current(&mut renderer, &mut view).unwrap();
        assert_eq!(pages.index(), 0);
    }
}
