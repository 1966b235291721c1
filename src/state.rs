//! Display state: pages, cycle phases, button events and the worker's runtime state.
//!
//! # Cycle
//!
//! ```text
//!  ┌──────┐ interval ┌──────────┐ 3s ┌────────────┐ 5s ┌──────┐
//!  │ Logo │─────────▶│ Greeting │───▶│ ServerInfo │───▶│ Info │
//!  └──────┘          └──────────┘    └────────────┘    └──┬───┘
//!      ▲                                                  │ 8s
//!      └──────────────────────────────────────────────────┘
//! ```
//!
//! Power-off and sleep are orthogonal to the cycle: a latched power-off
//! overrides everything, and while asleep the cycle is frozen.

use std::str::FromStr;
use std::time::Instant;

use crate::telemetry::NetworkState;

// =============================================================================
// Pages
// =============================================================================

/// What the panel is currently showing.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Page {
    /// `POWER OFF` banner. Latched until restart.
    PowerOff,
    /// Bitmap logo or the text fallback.
    #[default]
    Logo,
    Greeting,
    ServerInfo,
    /// One of the telemetry pages, by index into the page set.
    CycleInfo(usize),
}

// =============================================================================
// Cycle Phases
// =============================================================================

/// Automatic display cycle, in order.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum CyclePhase {
    #[default]
    Logo,
    Greeting,
    ServerInfo,
    Info,
}

impl CyclePhase {
    /// Next phase in the cycle (Info wraps to Logo).
    #[inline]
    pub const fn next(self) -> Self {
        match self {
            Self::Logo => Self::Greeting,
            Self::Greeting => Self::ServerInfo,
            Self::ServerInfo => Self::Info,
            Self::Info => Self::Logo,
        }
    }
}

// =============================================================================
// Button Events
// =============================================================================

/// Event from the physical push button.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum ButtonEvent {
    #[default]
    None,
    SingleClick,
    DoubleClick,
    LongPress,
}

impl ButtonEvent {
    /// External name, as accepted by [`FromStr`].
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SingleClick => "single_click",
            Self::DoubleClick => "double_click",
            Self::LongPress => "long_press",
        }
    }
}

/// Unrecognised button event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown button event: {0}")]
pub struct UnknownButtonEvent(pub String);

impl FromStr for ButtonEvent {
    type Err = UnknownButtonEvent;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "single_click" => Ok(Self::SingleClick),
            "double_click" => Ok(Self::DoubleClick),
            "long_press" => Ok(Self::LongPress),
            other => Err(UnknownButtonEvent(other.to_owned())),
        }
    }
}

// =============================================================================
// Runtime State
// =============================================================================

/// Timers and flags owned by the worker. Nothing else touches this.
#[derive(Debug)]
pub struct RuntimeState {
    pub awake: bool,
    /// Reference point for the sleep timeout.
    pub wake_start: Instant,
    pub phase: CyclePhase,
    pub phase_start: Instant,
    /// When the logo phase last began a full cycle.
    pub last_cycle: Instant,
    /// Logo, Greeting and ServerInfo render once per entry.
    pub phase_rendered: bool,
    /// Last Info page refresh. `None` forces a refresh.
    pub last_info_refresh: Option<Instant>,
    pub page: Page,
    /// Latched by a shutdown request. Cleared only by a restart.
    pub power_off: bool,
    /// Set while asleep. The cycle clocks do not run during sleep.
    pub asleep_since: Option<Instant>,
    pub network: NetworkState,
}

impl RuntimeState {
    pub fn new(
        now: Instant,
        awake: bool,
    ) -> Self {
        Self {
            awake,
            wake_start: now,
            phase: CyclePhase::Logo,
            phase_start: now,
            last_cycle: now,
            phase_rendered: false,
            last_info_refresh: None,
            page: Page::Logo,
            power_off: false,
            asleep_since: (!awake).then_some(now),
            network: NetworkState::new(now),
        }
    }

    /// Switch to `phase` and schedule its entry render.
    pub fn enter_phase(
        &mut self,
        phase: CyclePhase,
        now: Instant,
    ) {
        self.phase = phase;
        self.phase_start = now;
        self.phase_rendered = false;
        self.last_info_refresh = None;
    }

    /// Blank and stop the cycle clocks.
    pub fn sleep(
        &mut self,
        now: Instant,
    ) {
        if self.awake {
            self.asleep_since = Some(now);
        }
        self.awake = false;
    }

    /// Wake and restart the sleep timer. The cycle resumes where it stopped, and the
    /// current phase is redrawn next time it is serviced.
    pub fn wake(
        &mut self,
        now: Instant,
    ) {
        if let Some(since) = self.asleep_since.take() {
            let asleep = now.saturating_duration_since(since);
            self.phase_start += asleep;
            self.last_cycle += asleep;
        }
        self.awake = true;
        self.wake_start = now;
        self.phase_rendered = false;
        self.last_info_refresh = None;
    }
}

/// Snapshot of the worker state, published after every tick.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ControllerStatus {
    pub awake: bool,
    pub phase: CyclePhase,
    pub page: Page,
    pub power_off: bool,
    /// Index of the current telemetry page.
    pub info_index: usize,
}

// =============================================================================
// Unit Tests
// =============================================================================
