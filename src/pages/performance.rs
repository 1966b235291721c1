//! Performance page: CPU and temperature gauges plus RAM and CPU bars.
//!
//! ```text
//! ┌────────┬───────────────────────────┐
//! │  CPU   │ ░░░░░ PERFORMANCE ░░░░░░░ │
//! │ (pie)  │ RAM:  1.2/3.8 GB          │
//! │  23 %  │ [██████░░░░░░░░░░░░░░░░]  │
//! │ 48.0°C │ CPU:  23.0 %              │
//! │ (pie)  │ [███░░░░░░░░░░░░░░░░░░░]  │
//! └────────┴───────────────────────────┘
//! ```

use std::fmt::Write;

use heapless::String;
use oled_display_common::{CPU_PIE_Y, DETAIL_ROWS, DETAIL_WIDTH, DETAIL_X, GAUGE_RADIUS, GAUGE_X, ROW_HEIGHT, TEMP_PIE_Y};

use super::InfoPage;
use crate::error::TelemetryError;
use crate::renderer::{Align, FontSize, Renderer};
use crate::telemetry::{ByteUnit, TelemetryView};

/// Y of the temperature readout, between the two gauges.
const TEMP_TEXT_Y: i32 = 37;

/// Center of the detail column title.
const DETAIL_CENTER_X: i32 = DETAIL_X + (DETAIL_WIDTH / 2) as i32;

pub struct PerformancePage;

impl InfoPage for PerformancePage {
    fn name(&self) -> &'static str {
        "performance"
    }

    fn render(
        &self,
        renderer: &mut dyn Renderer,
        telemetry: &mut TelemetryView<'_>,
    ) -> Result<(), TelemetryError> {
        // Sample everything first so a failed query leaves the previous frame up
        let cpu = telemetry.cpu_percent()?;
        let temp_c = telemetry.cpu_temperature()?;
        let memory = telemetry.memory()?;
        let unit = telemetry.temperature_unit();

        renderer.clear();

        // Left column: gauges
        renderer.draw_text("CPU", GAUGE_X, 0, Align::Center, FontSize::Small, true);
        renderer.draw_pie(cpu, GAUGE_X, CPU_PIE_Y, GAUGE_RADIUS, 180.0, 0.0);
        let mut cpu_str: String<16> = String::new();
        let _ = write!(cpu_str, "{cpu:.0} %");
        renderer.draw_text(&cpu_str, GAUGE_X, CPU_PIE_Y, Align::Center, FontSize::Small, true);

        let mut temp_str: String<16> = String::new();
        let _ = write!(temp_str, "{:.1}°{}", unit.convert(temp_c), unit.symbol());
        renderer.draw_text(&temp_str, GAUGE_X, TEMP_TEXT_Y, Align::Center, FontSize::Small, true);
        renderer.draw_pie(temp_c, GAUGE_X, TEMP_PIE_Y, GAUGE_RADIUS, 0.0, 180.0);

        // Right column: title and detail rows
        renderer.draw_rect(DETAIL_X, 0, DETAIL_WIDTH, ROW_HEIGHT, true);
        renderer.draw_text("PERFORMANCE", DETAIL_CENTER_X, 1, Align::Center, FontSize::Small, false);

        let mem_unit = ByteUnit::for_bytes(memory.total);
        let mut ram_str: String<32> = String::new();
        let _ = write!(
            ram_str,
            "RAM:  {}/{} {}",
            mem_unit.format(memory.used),
            mem_unit.format(memory.total),
            mem_unit.label()
        );
        renderer.draw_text(&ram_str, DETAIL_X, DETAIL_ROWS[0], Align::Left, FontSize::Small, true);
        renderer.draw_bar_horizontal(memory.percent, DETAIL_X, DETAIL_ROWS[1], DETAIL_WIDTH, ROW_HEIGHT);

        let mut cpu_row: String<32> = String::new();
        let _ = write!(cpu_row, "CPU:  {cpu:.1} %");
        renderer.draw_text(&cpu_row, DETAIL_X, DETAIL_ROWS[2], Align::Left, FontSize::Small, true);
        renderer.draw_bar_horizontal(cpu, DETAIL_X, DETAIL_ROWS[3], DETAIL_WIDTH, ROW_HEIGHT);

        renderer.present();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;
    use crate::config::{DisplayConfig, TemperatureUnit};
    use crate::renderer::{DrawOp, MockRenderer};
    use crate::telemetry::{FixedTelemetry, MemoryInfo, NetworkState};

    fn source() -> FixedTelemetry {
        FixedTelemetry {
            cpu_temperature: 48.0,
            cpu_percent: 23.0,
            memory: MemoryInfo { total: 4 << 30, used: 1 << 30, percent: 25.0 },
            ..FixedTelemetry::default()
        }
    }

    fn render(
        source: &mut FixedTelemetry,
        config: &DisplayConfig,
    ) -> (MockRenderer, Result<(), TelemetryError>) {
        let mut renderer = MockRenderer::new();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(source, config, &mut network, Instant::now());
        let result = PerformancePage.render(&mut renderer, &mut view);
        (renderer, result)
    }

    #[test]
    fn test_render_layout() {
        let (renderer, result) = render(&mut source(), &DisplayConfig::default());
        result.unwrap();
        let ops = renderer.ops();
        assert_eq!(ops.first(), Some(&DrawOp::Clear));
        assert_eq!(ops.last(), Some(&DrawOp::Present));

        let texts = renderer.texts();
        assert!(texts.contains(&"23 %".to_owned()));
        assert!(texts.contains(&"48.0°C".to_owned()));
        assert!(texts.contains(&"RAM:  1.0/4.0 GB".to_owned()));
        assert!(texts.contains(&"CPU:  23.0 %".to_owned()));

        let bars: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Bar { percent, .. } => Some(*percent),
                _ => None,
            })
            .collect();
        assert_eq!(bars, vec![25.0, 23.0]);
    }

    #[test]
    fn test_fahrenheit() {
        let config = DisplayConfig { temperature_unit: TemperatureUnit::Fahrenheit, ..DisplayConfig::default() };
        let (renderer, _) = render(&mut source(), &config);
        assert!(renderer.texts().contains(&"118.4°F".to_owned()));
    }

    #[test]
    fn test_failure_draws_nothing() {
        let mut failing = FixedTelemetry { failing: true, ..source() };
        let (renderer, result) = render(&mut failing, &DisplayConfig::default());
        assert!(result.is_err());
        assert!(renderer.ops().is_empty());
    }
}
