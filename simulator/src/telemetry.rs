//! Fake host metrics driven by slow sine waves.

use std::collections::BTreeMap;
use std::time::Instant;

use oled_display::{DiskInfo, MemoryInfo, Telemetry, TelemetryError};

const GIB: u64 = 1 << 30;
const MEMORY_TOTAL: u64 = 4 * GIB;

/// Telemetry that drifts over time so every page has something to show.
///
/// `wlan0` drops in and out to exercise the connect/disconnect logging.
pub struct SimulatedTelemetry {
    start: Instant,
}

impl SimulatedTelemetry {
    pub fn new() -> Self {
        Self { start: Instant::now() }
    }

    fn t(&self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

impl Telemetry for SimulatedTelemetry {
    fn cpu_temperature(&mut self) -> Result<f32, TelemetryError> {
        Ok(fake_signal(self.t(), 38.0, 72.0, 0.05))
    }

    fn cpu_percent(&mut self) -> Result<f32, TelemetryError> {
        Ok(fake_signal(self.t(), 3.0, 95.0, 0.3))
    }

    fn memory(&mut self) -> Result<MemoryInfo, TelemetryError> {
        let used = fake_signal(self.t(), 0.5, 3.2, 0.02) * GIB as f32;
        let used = used as u64;
        Ok(MemoryInfo {
            total: MEMORY_TOTAL,
            used,
            percent: used as f32 / MEMORY_TOTAL as f32 * 100.0,
        })
    }

    fn disks(&mut self) -> Result<BTreeMap<String, DiskInfo>, TelemetryError> {
        let mut disks = BTreeMap::new();
        disks.insert("mmcblk0".to_owned(), DiskInfo {
            total: 32 * GIB,
            used: 11 * GIB,
            percent: 11.0 / 32.0 * 100.0,
            mounted: true,
        });
        disks.insert("sda".to_owned(), DiskInfo { total: 128 * GIB, used: 0, percent: 0.0, mounted: false });
        Ok(disks)
    }

    fn ips(&mut self) -> Result<BTreeMap<String, String>, TelemetryError> {
        let mut ips = BTreeMap::new();
        ips.insert("eth0".to_owned(), "192.168.1.42".to_owned());
        if (self.t() * 0.02).sin() > 0.0 {
            ips.insert("wlan0".to_owned(), "10.0.0.17".to_owned());
        }
        Ok(ips)
    }
}

fn fake_signal(
    t: f32,
    min: f32,
    max: f32,
    freq: f32,
) -> f32 {
    let normalized = (t * freq).sin().mul_add(0.5, 0.5);
    min + normalized * (max - min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fake_signal_bounds() {
        for i in 0..1000 {
            let v = fake_signal(i as f32 * 0.37, 38.0, 72.0, 0.05);
            assert!((38.0..=72.0).contains(&v));
        }
    }

    #[test]
    fn test_memory_within_total() {
        let mut telemetry = SimulatedTelemetry::new();
        let memory = telemetry.memory().unwrap();
        assert!(memory.used <= memory.total);
        assert!((0.0..=100.0).contains(&memory.percent));
    }

    #[test]
    fn test_eth0_always_up() {
        let mut telemetry = SimulatedTelemetry::new();
        assert_eq!(telemetry.ips().unwrap().get("eth0").map(String::as_str), Some("192.168.1.42"));
    }
}
