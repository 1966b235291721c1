//! Disk page: used/total in a shared unit and a usage bar.

use std::fmt::Write;

use heapless::String;
use oled_display_common::{CENTER_X, FULL_BAR_WIDTH, MARGIN_X};

use super::{InfoPage, draw_title};
use crate::error::TelemetryError;
use crate::renderer::{Align, FontSize, Renderer};
use crate::telemetry::{ByteUnit, TelemetryView};

const USAGE_Y: i32 = 18;
const PERCENT_Y: i32 = 30;
const BAR_Y: i32 = 44;
const BAR_HEIGHT: u32 = 12;

pub struct DiskPage;

impl InfoPage for DiskPage {
    fn name(&self) -> &'static str {
        "disk"
    }

    fn render(
        &self,
        renderer: &mut dyn Renderer,
        telemetry: &mut TelemetryView<'_>,
    ) -> Result<(), TelemetryError> {
        let disk = telemetry.disk()?;
        let unit = ByteUnit::for_bytes(disk.total);

        let mut title: String<32> = String::new();
        let _ = write!(title, "DISK: {}", telemetry.disk_label());

        let mut usage: String<32> = String::new();
        if disk.mounted {
            let _ = write!(usage, "{}", unit.format(disk.used));
        } else {
            let _ = usage.push_str("NA");
        }
        let _ = write!(usage, "/{} {}", unit.format(disk.total), unit.label());

        let percent = if disk.mounted { disk.percent } else { 0.0 };
        let mut percent_str: String<16> = String::new();
        let _ = write!(percent_str, "{percent:.1} %");

        renderer.clear();
        draw_title(renderer, &title);
        renderer.draw_text(&usage, CENTER_X, USAGE_Y, Align::Center, FontSize::Normal, true);
        renderer.draw_text(&percent_str, CENTER_X, PERCENT_Y, Align::Center, FontSize::Normal, true);
        renderer.draw_bar_horizontal(percent, MARGIN_X, BAR_Y, FULL_BAR_WIDTH, BAR_HEIGHT);
        renderer.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::time::Instant;

    use super::*;
    use crate::config::{DiskSelector, DisplayConfig};
    use crate::renderer::{DrawOp, MockRenderer};
    use crate::telemetry::{DiskInfo, FixedTelemetry, NetworkState};

    fn source() -> FixedTelemetry {
        let mut disks = BTreeMap::new();
        disks.insert("mmcblk0".to_owned(), DiskInfo { total: 32 << 30, used: 8 << 30, percent: 25.0, mounted: true });
        disks.insert("sda".to_owned(), DiskInfo { total: 64 << 30, used: 0, percent: 0.0, mounted: false });
        FixedTelemetry { disks, ..FixedTelemetry::default() }
    }

    fn render(config: &DisplayConfig) -> MockRenderer {
        let mut renderer = MockRenderer::new();
        let mut telemetry = source();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut telemetry, config, &mut network, Instant::now());
        DiskPage.render(&mut renderer, &mut view).unwrap();
        renderer
    }

    fn bar_percent(renderer: &MockRenderer) -> Option<f32> {
        renderer.ops().iter().find_map(|op| match op {
            DrawOp::Bar { percent, .. } => Some(*percent),
            _ => None,
        })
    }

    #[test]
    fn test_total() {
        let renderer = render(&DisplayConfig::default());
        assert_eq!(renderer.texts(), vec!["DISK: total", "8.0/32.0 GB", "25.0 %"]);
        assert_eq!(bar_percent(&renderer), Some(25.0));
    }

    #[test]
    fn test_unmounted_shows_na() {
        let config = DisplayConfig { disk: DiskSelector::Named("sda".into()), ..DisplayConfig::default() };
        let renderer = render(&config);
        assert_eq!(renderer.texts(), vec!["DISK: sda", "NA/64.0 GB", "0.0 %"]);
        assert_eq!(bar_percent(&renderer), Some(0.0));
    }
}
