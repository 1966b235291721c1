//! Telemetry source and the per-render view the info pages read from.
//!
//! Sampling CPU, memory, disks and network is not this crate's job: the host
//! supplies a [`Telemetry`] implementation. [`TelemetryView`] layers the
//! configured selectors and the network bookkeeping (change logging, address
//! rotation) on top of it for the duration of one page render.
//!
//! # Byte Formatting
//!
//! Sizes are shown in the largest binary unit that keeps the value at or
//! above 1, with one decimal:
//!
//! | bytes | shown |
//! |-------|-------|
//! | 512 | `512 B` |
//! | 1536 | `1.5 KB` |
//! | 4 294 967 296 | `4.0 GB` |

use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Instant;

use log::{info, warn};

use crate::config::{DiskSelector, DisplayConfig, IP_ROTATION_INTERVAL, InterfaceSelector, TemperatureUnit};
use crate::error::TelemetryError;

// =============================================================================
// Samples
// =============================================================================

/// Memory usage sample.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct MemoryInfo {
    pub total: u64,
    pub used: u64,
    pub percent: f32,
}

/// Usage of a single disk.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct DiskInfo {
    pub total: u64,
    pub used: u64,
    pub percent: f32,
    pub mounted: bool,
}

/// On-demand metric queries, implemented by the host.
pub trait Telemetry: Send {
    /// CPU temperature in °C.
    fn cpu_temperature(&mut self) -> Result<f32, TelemetryError>;

    /// CPU utilisation in percent.
    fn cpu_percent(&mut self) -> Result<f32, TelemetryError>;

    fn memory(&mut self) -> Result<MemoryInfo, TelemetryError>;

    /// Disks by device name.
    fn disks(&mut self) -> Result<BTreeMap<String, DiskInfo>, TelemetryError>;

    /// IPv4 address per interface with one.
    fn ips(&mut self) -> Result<BTreeMap<String, String>, TelemetryError>;
}

/// Canned readings. Every query fails with `Unavailable` when `failing` is set.
#[derive(Clone, Default, Debug)]
pub struct FixedTelemetry {
    pub cpu_temperature: f32,
    pub cpu_percent: f32,
    pub memory: MemoryInfo,
    pub disks: BTreeMap<String, DiskInfo>,
    pub ips: BTreeMap<String, String>,
    pub failing: bool,
}

impl FixedTelemetry {
    fn check(
        &self,
        metric: &'static str,
    ) -> Result<(), TelemetryError> {
        if self.failing { Err(TelemetryError::Unavailable(metric)) } else { Ok(()) }
    }
}

impl Telemetry for FixedTelemetry {
    fn cpu_temperature(&mut self) -> Result<f32, TelemetryError> {
        self.check("cpu_temperature")?;
        Ok(self.cpu_temperature)
    }

    fn cpu_percent(&mut self) -> Result<f32, TelemetryError> {
        self.check("cpu_percent")?;
        Ok(self.cpu_percent)
    }

    fn memory(&mut self) -> Result<MemoryInfo, TelemetryError> {
        self.check("memory")?;
        Ok(self.memory)
    }

    fn disks(&mut self) -> Result<BTreeMap<String, DiskInfo>, TelemetryError> {
        self.check("disks")?;
        Ok(self.disks.clone())
    }

    fn ips(&mut self) -> Result<BTreeMap<String, String>, TelemetryError> {
        self.check("ips")?;
        Ok(self.ips.clone())
    }
}

// =============================================================================
// Network State
// =============================================================================

/// Address shown on the network page.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ShownAddress {
    pub interface: String,
    pub address: String,
    /// 1-based position among the available addresses.
    pub position: usize,
    pub count: usize,
}

/// Last known addresses and the rotation cursor. Lives in the worker across renders.
#[derive(Clone, Debug)]
pub struct NetworkState {
    last_ips: BTreeMap<String, String>,
    index: usize,
    next_rotation: Instant,
}

impl NetworkState {
    pub fn new(now: Instant) -> Self {
        Self {
            last_ips: BTreeMap::new(),
            index: 0,
            next_rotation: now + IP_ROTATION_INTERVAL,
        }
    }

    /// Log connects, address changes and disconnects against the previous sample.
    pub fn observe(
        &mut self,
        ips: &BTreeMap<String, String>,
    ) {
        for (interface, ip) in ips {
            match self.last_ips.get(interface) {
                None => info!("connected to {interface}: {ip}"),
                Some(last) if last != ip => info!("IP changed for {interface}: {ip}"),
                Some(_) => {}
            }
        }
        for interface in self.last_ips.keys() {
            if !ips.contains_key(interface) {
                info!("disconnected from {interface}");
            }
        }
        self.last_ips.clone_from(ips);
    }

    /// Pick the address to show and advance the cursor when the rotation interval has passed.
    pub fn rotate(
        &mut self,
        addresses: &[(String, String)],
        now: Instant,
    ) -> Option<ShownAddress> {
        if addresses.is_empty() {
            self.index = 0;
            return None;
        }
        let count = addresses.len();
        self.index %= count;
        let (interface, address) = &addresses[self.index];
        let shown = ShownAddress {
            interface: interface.clone(),
            address: address.clone(),
            position: self.index + 1,
            count,
        };
        if now >= self.next_rotation {
            self.next_rotation = now + IP_ROTATION_INTERVAL;
            self.index = (self.index + 1) % count;
        }
        Some(shown)
    }

    pub fn last_ips(&self) -> &BTreeMap<String, String> {
        &self.last_ips
    }
}

// =============================================================================
// Telemetry View
// =============================================================================

/// Telemetry filtered through the current configuration, for one render.
pub struct TelemetryView<'a> {
    source: &'a mut dyn Telemetry,
    config: &'a DisplayConfig,
    network: &'a mut NetworkState,
    now: Instant,
}

impl<'a> TelemetryView<'a> {
    pub fn new(
        source: &'a mut dyn Telemetry,
        config: &'a DisplayConfig,
        network: &'a mut NetworkState,
        now: Instant,
    ) -> Self {
        Self { source, config, network, now }
    }

    pub fn temperature_unit(&self) -> TemperatureUnit {
        self.config.temperature_unit
    }

    /// `total` or the selected disk's name.
    pub fn disk_label(&self) -> &str {
        match &self.config.disk {
            DiskSelector::Total => "total",
            DiskSelector::Named(name) => name,
        }
    }

    pub fn cpu_temperature(&mut self) -> Result<f32, TelemetryError> {
        self.source.cpu_temperature()
    }

    pub fn cpu_percent(&mut self) -> Result<f32, TelemetryError> {
        self.source.cpu_percent()
    }

    pub fn memory(&mut self) -> Result<MemoryInfo, TelemetryError> {
        self.source.memory()
    }

    /// Usage of the selected disk. `total` sums every mounted disk.
    ///
    /// An unknown disk name is logged and reads as unmounted.
    pub fn disk(&mut self) -> Result<DiskInfo, TelemetryError> {
        let disks = self.source.disks()?;
        match &self.config.disk {
            DiskSelector::Total => {
                let mut usage = DiskInfo::default();
                for disk in disks.values().filter(|d| d.mounted) {
                    usage.total += disk.total;
                    usage.used += disk.used;
                    usage.mounted = true;
                }
                if usage.total > 0 {
                    usage.percent = (usage.used as f64 / usage.total as f64 * 100.0) as f32;
                }
                Ok(usage)
            }
            DiskSelector::Named(name) => match disks.get(name) {
                Some(disk) if disk.mounted => Ok(*disk),
                Some(disk) => Ok(DiskInfo { total: disk.total, ..DiskInfo::default() }),
                None => {
                    let available: Vec<&str> = disks.keys().map(String::as_str).collect();
                    warn!("unknown disk: {name}, available disks: {available:?}");
                    Ok(DiskInfo::default())
                }
            },
        }
    }

    /// Addresses allowed by the interface selector, as `(interface, address)` pairs.
    ///
    /// Every call also feeds the change log.
    pub fn addresses(&mut self) -> Result<Vec<(String, String)>, TelemetryError> {
        let ips = self.source.ips()?;
        self.network.observe(&ips);
        if ips.is_empty() {
            return Ok(Vec::new());
        }
        Ok(match &self.config.interface {
            InterfaceSelector::All => ips.into_iter().collect(),
            InterfaceSelector::Named(name) => match ips.get(name) {
                Some(ip) => vec![(name.clone(), ip.clone())],
                None => {
                    let available: Vec<&str> = ips.keys().map(String::as_str).collect();
                    warn!("invalid interface: {name}, available interfaces: {available:?}");
                    Vec::new()
                }
            },
        })
    }

    /// Address to show now, rotating through [`Self::addresses`]. `None` when disconnected.
    pub fn current_address(&mut self) -> Result<Option<ShownAddress>, TelemetryError> {
        let addresses = self.addresses()?;
        Ok(self.network.rotate(&addresses, self.now))
    }
}

// =============================================================================
// Byte Formatting
// =============================================================================

/// Binary size unit.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum ByteUnit {
    B,
    KB,
    MB,
    GB,
    TB,
}

impl ByteUnit {
    const ALL: [Self; 5] = [Self::B, Self::KB, Self::MB, Self::GB, Self::TB];

    /// Largest unit in which `bytes` is at least 1.
    pub fn for_bytes(bytes: u64) -> Self {
        let mut unit = Self::B;
        for candidate in Self::ALL {
            if bytes >= candidate.size() {
                unit = candidate;
            }
        }
        unit
    }

    /// Bytes per unit.
    pub const fn size(self) -> u64 {
        1 << (10 * self as u32)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::B => "B",
            Self::KB => "KB",
            Self::MB => "MB",
            Self::GB => "GB",
            Self::TB => "TB",
        }
    }

    /// `bytes` in this unit, without the label. One decimal except for bytes.
    pub fn format(
        self,
        bytes: u64,
    ) -> heapless::String<16> {
        let mut s = heapless::String::new();
        if self == Self::B {
            let _ = write!(s, "{bytes}");
        } else {
            let _ = write!(s, "{:.1}", bytes as f64 / self.size() as f64);
        }
        s
    }
}

/// Format `bytes` with its own best unit, e.g. `1.5 GB`.
pub fn format_bytes(bytes: u64) -> heapless::String<16> {
    let unit = ByteUnit::for_bytes(bytes);
    let mut s = unit.format(bytes);
    let _ = write!(s, " {}", unit.label());
    s
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn ips(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    fn disk(
        total: u64,
        used: u64,
        mounted: bool,
    ) -> DiskInfo {
        DiskInfo { total, used, percent: used as f32 / total as f32 * 100.0, mounted }
    }

    fn telemetry() -> FixedTelemetry {
        let mut disks = BTreeMap::new();
        disks.insert("mmcblk0".to_owned(), disk(32 << 30, 8 << 30, true));
        disks.insert("nvme0n1".to_owned(), disk(96 << 30, 56 << 30, true));
        disks.insert("sda".to_owned(), disk(64 << 30, 0, false));
        FixedTelemetry {
            cpu_temperature: 48.0,
            cpu_percent: 23.0,
            disks,
            ips: ips(&[("eth0", "192.168.1.10"), ("wlan0", "192.168.1.20")]),
            ..FixedTelemetry::default()
        }
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0).as_str(), "0 B");
        assert_eq!(format_bytes(512).as_str(), "512 B");
        assert_eq!(format_bytes(1536).as_str(), "1.5 KB");
        assert_eq!(format_bytes(4 << 30).as_str(), "4.0 GB");
        assert_eq!(format_bytes(3 << 40).as_str(), "3.0 TB");
    }

    #[test]
    fn test_byte_unit_shared_scale() {
        let unit = ByteUnit::for_bytes(4 << 30);
        assert_eq!(unit, ByteUnit::GB);
        assert_eq!(unit.format(1 << 29).as_str(), "0.5");
    }

    #[test]
    fn test_disk_total_sums_mounted() {
        let mut source = telemetry();
        let config = DisplayConfig::default();
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());

        let usage = view.disk().unwrap();
        assert!(usage.mounted);
        assert_eq!(usage.total, 128 << 30);
        assert_eq!(usage.used, 64 << 30);
        assert!((usage.percent - 50.0).abs() < 0.01);
    }

    #[test]
    fn test_disk_named_unmounted() {
        let mut source = telemetry();
        let config = DisplayConfig { disk: DiskSelector::Named("sda".into()), ..DisplayConfig::default() };
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());

        let usage = view.disk().unwrap();
        assert!(!usage.mounted);
        assert_eq!(usage.total, 64 << 30);
        assert_eq!(usage.percent, 0.0);
    }

    #[test]
    fn test_disk_unknown_reads_unmounted() {
        let mut source = telemetry();
        let config = DisplayConfig { disk: DiskSelector::Named("sdz".into()), ..DisplayConfig::default() };
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());
        assert_eq!(view.disk().unwrap(), DiskInfo::default());
    }

    #[test]
    fn test_interface_filter() {
        let mut source = telemetry();
        let config = DisplayConfig { interface: InterfaceSelector::Named("wlan0".into()), ..DisplayConfig::default() };
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());
        assert_eq!(view.addresses().unwrap(), vec![("wlan0".to_owned(), "192.168.1.20".to_owned())]);
    }

    #[test]
    fn test_unknown_interface_has_no_addresses() {
        let mut source = telemetry();
        let config = DisplayConfig { interface: InterfaceSelector::Named("usb0".into()), ..DisplayConfig::default() };
        let mut network = NetworkState::new(Instant::now());
        let mut view = TelemetryView::new(&mut source, &config, &mut network, Instant::now());
        assert!(view.addresses().unwrap().is_empty());
        assert_eq!(view.current_address().unwrap(), None);
    }

    #[test]
    fn test_observe_tracks_last_ips() {
        let mut network = NetworkState::new(Instant::now());
        network.observe(&ips(&[("eth0", "10.0.0.2")]));
        network.observe(&ips(&[("eth0", "10.0.0.3"), ("wlan0", "10.0.1.2")]));
        assert_eq!(network.last_ips(), &ips(&[("eth0", "10.0.0.3"), ("wlan0", "10.0.1.2")]));
        network.observe(&ips(&[("wlan0", "10.0.1.2")]));
        assert_eq!(network.last_ips(), &ips(&[("wlan0", "10.0.1.2")]));
    }

    #[test]
    fn test_rotation_every_interval() {
        let t0 = Instant::now();
        let mut network = NetworkState::new(t0);
        let addresses = vec![("eth0".to_owned(), "a".to_owned()), ("wlan0".to_owned(), "b".to_owned())];

        let shown = network.rotate(&addresses, t0).unwrap();
        assert_eq!((shown.address.as_str(), shown.position, shown.count), ("a", 1, 2));

        // Before the interval: unchanged
        let shown = network.rotate(&addresses, t0 + Duration::from_secs(1)).unwrap();
        assert_eq!(shown.address, "a");

        // At the interval the current address is shown once more, then the cursor moves
        let at = t0 + IP_ROTATION_INTERVAL;
        assert_eq!(network.rotate(&addresses, at).unwrap().address, "a");
        let shown = network.rotate(&addresses, at + Duration::from_millis(100)).unwrap();
        assert_eq!((shown.address.as_str(), shown.position), ("b", 2));
    }

    #[test]
    fn test_rotation_index_wraps_when_list_shrinks() {
        let t0 = Instant::now();
        let mut network = NetworkState::new(t0);
        let two = vec![("eth0".to_owned(), "a".to_owned()), ("wlan0".to_owned(), "b".to_owned())];
        network.rotate(&two, t0 + IP_ROTATION_INTERVAL);

        let one = vec![("eth0".to_owned(), "a".to_owned())];
        let shown = network.rotate(&one, t0 + IP_ROTATION_INTERVAL + Duration::from_millis(100)).unwrap();
        assert_eq!((shown.position, shown.count), (1, 1));
        assert_eq!(network.rotate(&[], t0), None);
    }

    #[test]
    fn test_failing_source() {
        let mut source = FixedTelemetry { failing: true, ..FixedTelemetry::default() };
        assert_eq!(source.cpu_percent(), Err(TelemetryError::Unavailable("cpu_percent")));
    }
}
