//! Network page: the current address with its interface and an `n/m` counter.
//!
//! With several interfaces the address rotates every
//! [`IP_ROTATION_INTERVAL`](crate::config::IP_ROTATION_INTERVAL).

use std::fmt::Write;

use heapless::String;
use oled_display_common::{CENTER_X, MARGIN_X, SCREEN_WIDTH};

use super::{InfoPage, draw_title};
use crate::error::TelemetryError;
use crate::renderer::{Align, FontSize, Renderer};
use crate::telemetry::TelemetryView;

const INTERFACE_Y: i32 = 18;
const ADDRESS_Y: i32 = 34;

pub struct NetworkPage;

impl InfoPage for NetworkPage {
    fn name(&self) -> &'static str {
        "network"
    }

    fn render(
        &self,
        renderer: &mut dyn Renderer,
        telemetry: &mut TelemetryView<'_>,
    ) -> Result<(), TelemetryError> {
        let shown = telemetry.current_address()?;

        renderer.clear();
        draw_title(renderer, "NETWORK");
        match shown {
            Some(shown) => {
                renderer.draw_text(&shown.interface, MARGIN_X, INTERFACE_Y, Align::Left, FontSize::Normal, true);
                let mut counter: String<16> = String::new();
                let _ = write!(counter, "{}/{}", shown.position, shown.count);
                let right = SCREEN_WIDTH as i32 - MARGIN_X;
                renderer.draw_text(&counter, right, INTERFACE_Y, Align::Right, FontSize::Normal, true);
                renderer.draw_text(&shown.address, CENTER_X, ADDRESS_Y, Align::Center, FontSize::Medium, true);
            }
            None => {
                renderer.draw_text("DISCONNECTED", CENTER_X, ADDRESS_Y, Align::Center, FontSize::Medium, true);
            }
        }
        renderer.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::{DisplayConfig, IP_ROTATION_INTERVAL};
    use crate::renderer::MockRenderer;
    use crate::telemetry::{FixedTelemetry, NetworkState};

    fn source(pairs: &[(&str, &str)]) -> FixedTelemetry {
        let ips: BTreeMap<_, _> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
        FixedTelemetry { ips, ..FixedTelemetry::default() }
    }

    #[test]
    fn test_disconnected() {
        let mut renderer = MockRenderer::new();
        let mut telemetry = source(&[]);
        let config = DisplayConfig::default();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut telemetry, &config, &mut network, Instant::now());
        NetworkPage.render(&mut renderer, &mut view).unwrap();
        assert_eq!(renderer.texts(), vec!["NETWORK".to_owned(), "DISCONNECTED".to_owned()]);
    }

    #[test]
    fn test_rotates_between_renders() {
        let mut telemetry = source(&[("eth0", "192.168.1.10"), ("wlan0", "192.168.1.20")]);
        let config = DisplayConfig::default();
        let t0 = Instant::now();
        let mut network = NetworkState::new(t0);

        let mut renderer = MockRenderer::new();
        for now in [t0, t0 + IP_ROTATION_INTERVAL, t0 + IP_ROTATION_INTERVAL + Duration::from_secs(1)] {
            let mut view = TelemetryView::new(&mut telemetry, &config, &mut network, now);
            NetworkPage.render(&mut renderer, &mut view).unwrap();
        }
        let texts = renderer.texts();
        assert_eq!(&texts[1..4], &["eth0", "1/2", "192.168.1.10"]);
        assert_eq!(&texts[9..12], &["wlan0", "2/2", "192.168.1.20"]);
    }
}
