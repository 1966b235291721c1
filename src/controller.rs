//! Display controller: the worker thread and the display-cycle state machine.
//!
//! # Tick
//!
//! The worker wakes every [`POLL_INTERVAL`] and, in order:
//!
//! 1. Applies every pending config update and shutdown request
//! 2. Takes at most one button event
//! 3. If power-off is latched, redraws `POWER OFF` and stops there
//! 4. Applies the button
//! 5. If asleep, stops there
//! 6. Advances and renders the display cycle
//! 7. Checks the sleep timeout
//! 8. Publishes a [`ControllerStatus`]
//!
//! # Threading
//!
//! All state lives on the worker. Callers talk to it through two bounded
//! queues (buttons, control messages) and read back the published status.
//! Stopping joins the worker, which hands its state back so the controller
//! can be started again.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::{
    BUTTON_QUEUE_CAPACITY,
    CONTROL_QUEUE_CAPACITY,
    ConfigUpdate,
    DisplayConfig,
    INFO_REFRESH_INTERVAL,
    POLL_INTERVAL,
};
use crate::error::{ControllerError, RendererError};
use crate::frames::{FrameStore, default_install_root};
use crate::pages::InfoPageSet;
use crate::renderer::Renderer;
use crate::screens;
use crate::state::{ButtonEvent, ControllerStatus, CyclePhase, Page, RuntimeState};
use crate::telemetry::{Telemetry, TelemetryView};

/// Name of the worker thread.
pub const WORKER_THREAD_NAME: &str = "oled-display";

/// Message on the control queue.
#[derive(Debug)]
pub(crate) enum Control {
    Config(ConfigUpdate),
    Shutdown(String),
}

// =============================================================================
// Display Loop
// =============================================================================

/// Everything the worker owns. Driven one tick at a time.
pub(crate) struct DisplayLoop {
    config: DisplayConfig,
    renderer: Option<Box<dyn Renderer>>,
    telemetry: Box<dyn Telemetry>,
    pages: InfoPageSet,
    frames: FrameStore,
    state: RuntimeState,
    not_ready_warned: bool,
}

impl DisplayLoop {
    pub(crate) fn new(
        config: DisplayConfig,
        renderer: Option<Box<dyn Renderer>>,
        telemetry: Box<dyn Telemetry>,
        frames: FrameStore,
        now: Instant,
    ) -> Self {
        let state = RuntimeState::new(now, config.enabled);
        let mut display = Self {
            config,
            renderer,
            telemetry,
            pages: InfoPageSet::default(),
            frames,
            state,
            not_ready_warned: false,
        };
        let rotation = display.config.rotation;
        if let Some(renderer) = display.renderer.as_mut() {
            renderer.set_rotation(rotation);
        }
        display
    }

    /// Fresh runtime state with the panel powered. Clears the power-off latch.
    pub(crate) fn reset(
        &mut self,
        now: Instant,
    ) {
        self.state = RuntimeState::new(now, self.config.enabled);
        self.pages.reset();
        if let Some(renderer) = self.renderer.as_mut().filter(|r| r.is_ready()) {
            renderer.on();
        }
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.renderer.as_ref().is_some_and(|r| r.is_ready())
    }

    pub(crate) fn status(&self) -> ControllerStatus {
        ControllerStatus {
            awake: self.state.awake,
            phase: self.state.phase,
            page: self.state.page,
            power_off: self.state.power_off,
            info_index: self.pages.index(),
        }
    }

    pub(crate) fn apply_control(
        &mut self,
        control: Control,
        now: Instant,
    ) {
        match control {
            Control::Shutdown(reason) => {
                info!("shutdown reason: {reason}");
                self.state.page = Page::PowerOff;
                self.state.power_off = true;
                self.state.awake = true;
                self.state.wake_start = now;
            }
            Control::Config(update) => {
                let changes = self.config.apply(&update);
                if let Some(rotation) = changes.rotation {
                    if let Some(renderer) = self.renderer.as_mut() {
                        renderer.set_rotation(rotation);
                    }
                    // Rotation discards the framebuffer
                    self.state.phase_rendered = false;
                    self.state.last_info_refresh = None;
                }
                match changes.enable {
                    Some(_) if self.state.power_off => debug!("ignoring oled_enable while powered off"),
                    Some(true) => self.state.wake(now),
                    Some(false) => self.sleep(now),
                    None => {}
                }
            }
        }
    }

    /// Steps 3 to 8 of the tick.
    pub(crate) fn tick(
        &mut self,
        now: Instant,
        button: Option<ButtonEvent>,
    ) -> ControllerStatus {
        if self.state.power_off {
            if let Some(button) = button {
                debug!("ignoring {} while powered off", button.as_str());
            }
            self.state.page = Page::PowerOff;
            if let Some(renderer) = ready_renderer(&mut self.renderer, &mut self.not_ready_warned) {
                screens::draw_power_off(renderer);
            }
            return self.status();
        }

        if let Some(button) = button
            && self.handle_button(button, now)
        {
            // Woken: the current phase is redrawn on the next tick
            return self.status();
        }

        if self.state.awake {
            self.run_cycle(now);
            self.check_sleep(now);
        }
        self.status()
    }

    /// Final clear, present and power-off.
    pub(crate) fn finish(&mut self) {
        if let Some(renderer) = self.renderer.as_mut().filter(|r| r.is_ready()) {
            renderer.clear();
            renderer.present();
            renderer.off();
            debug!("display closed");
        }
    }

    // -------------------------------------------------------------------------
    // Buttons
    // -------------------------------------------------------------------------

    /// Apply a button. Returns `true` if it woke the panel.
    fn handle_button(
        &mut self,
        button: ButtonEvent,
        now: Instant,
    ) -> bool {
        match button {
            ButtonEvent::SingleClick if !self.state.awake => {
                debug!("woken by button");
                self.state.wake(now);
                return true;
            }
            ButtonEvent::SingleClick => {
                let index = self.pages.advance();
                debug!("manual page change to {index}");
                self.state.wake_start = now;
                self.render_info(now);
            }
            other => debug!("ignoring button event {}", other.as_str()),
        }
        false
    }

    // -------------------------------------------------------------------------
    // Cycle
    // -------------------------------------------------------------------------

    fn run_cycle(
        &mut self,
        now: Instant,
    ) {
        if let Some(next) = self.due_transition(now) {
            debug!("display cycle: {:?} -> {next:?}", self.state.phase);
            if next == CyclePhase::Logo {
                self.state.last_cycle = now;
                self.pages.reset();
            }
            self.state.enter_phase(next, now);
        }

        match self.state.phase {
            CyclePhase::Info => {
                let due = self
                    .state
                    .last_info_refresh
                    .is_none_or(|last| now.saturating_duration_since(last) >= INFO_REFRESH_INTERVAL);
                if due {
                    self.render_info(now);
                }
            }
            _ if !self.state.phase_rendered => {
                self.render_phase();
                self.state.phase_rendered = true;
            }
            _ => {}
        }
    }

    fn due_transition(
        &self,
        now: Instant,
    ) -> Option<CyclePhase> {
        let held = now.saturating_duration_since(self.state.phase_start);
        let hold = match self.state.phase {
            CyclePhase::Logo => {
                let since_cycle = now.saturating_duration_since(self.state.last_cycle);
                return (since_cycle >= self.config.info_display_interval).then_some(CyclePhase::Greeting);
            }
            CyclePhase::Greeting => self.config.greeting_duration,
            CyclePhase::ServerInfo => self.config.server_info_duration,
            CyclePhase::Info => self.config.info_display_duration,
        };
        (held >= hold).then_some(self.state.phase.next())
    }

    fn check_sleep(
        &mut self,
        now: Instant,
    ) {
        let timeout = self.config.sleep_timeout;
        if !timeout.is_zero() && now.saturating_duration_since(self.state.wake_start) > timeout {
            info!("sleep timeout reached, blanking display");
            self.sleep(now);
        }
    }

    fn sleep(
        &mut self,
        now: Instant,
    ) {
        self.state.sleep(now);
        if let Some(renderer) = ready_renderer(&mut self.renderer, &mut self.not_ready_warned) {
            renderer.clear();
            renderer.present();
        }
    }

    // -------------------------------------------------------------------------
    // Rendering
    // -------------------------------------------------------------------------

    /// Logo, greeting or server info, per the current phase.
    fn render_phase(&mut self) {
        let identity = &self.config.identity;
        let renderer = ready_renderer(&mut self.renderer, &mut self.not_ready_warned);
        match self.state.phase {
            CyclePhase::Logo => {
                self.state.page = Page::Logo;
                let logo = if self.config.video_enabled { self.frames.get_logo() } else { None };
                if let Some(renderer) = renderer {
                    screens::draw_logo(renderer, logo, identity);
                }
            }
            CyclePhase::Greeting => {
                self.state.page = Page::Greeting;
                if let Some(renderer) = renderer {
                    screens::draw_greeting(renderer, identity);
                }
            }
            CyclePhase::ServerInfo => {
                self.state.page = Page::ServerInfo;
                if let Some(renderer) = renderer {
                    screens::draw_server_info(renderer, identity);
                }
            }
            CyclePhase::Info => {}
        }
    }

    /// Current info page.
    fn render_info(
        &mut self,
        now: Instant,
    ) {
        self.state.page = Page::CycleInfo(self.pages.index());
        self.state.last_info_refresh = Some(now);
        let Some(renderer) = ready_renderer(&mut self.renderer, &mut self.not_ready_warned) else {
            return;
        };
        let mut view = TelemetryView::new(&mut *self.telemetry, &self.config, &mut self.state.network, now);
        if let Err(e) = self.pages.current(renderer, &mut view) {
            error!("failed to render {} page: {e}", self.pages.current_name().unwrap_or("info"));
        }
    }
}

/// The renderer if it is usable. Warns once otherwise.
fn ready_renderer<'a>(
    renderer: &'a mut Option<Box<dyn Renderer>>,
    warned: &mut bool,
) -> Option<&'a mut dyn Renderer> {
    match renderer {
        Some(renderer) if renderer.is_ready() => Some(&mut **renderer),
        _ => {
            if !*warned {
                warn!("display not ready, rendering disabled");
                *warned = true;
            }
            None
        }
    }
}

// =============================================================================
// Worker
// =============================================================================

/// Worker-side state: the loop and the receiving ends of both queues.
struct Parked {
    display: DisplayLoop,
    buttons: Receiver<ButtonEvent>,
    control: Receiver<Control>,
}

impl Parked {
    fn step(
        &mut self,
        now: Instant,
    ) -> ControllerStatus {
        while let Ok(message) = self.control.try_recv() {
            self.display.apply_control(message, now);
        }
        let button = self.buttons.try_recv().ok();
        self.display.tick(now, button)
    }
}

fn run_worker(
    mut parked: Parked,
    running: &AtomicBool,
    status: &Mutex<ControllerStatus>,
    clock: &dyn Clock,
) -> Parked {
    info!("display cycle started, logo loaded: {}", !parked.display.frames.is_empty());
    while running.load(Ordering::Acquire) {
        let tick_start = Instant::now();
        let snapshot = parked.step(clock.now());
        *status.lock().unwrap_or_else(PoisonError::into_inner) = snapshot;

        if let Some(rest) = POLL_INTERVAL.checked_sub(tick_start.elapsed()) {
            thread::sleep(rest);
        }
    }
    parked.display.finish();
    parked
}

// =============================================================================
// Display Controller
// =============================================================================

/// Owns the display worker and its input queues.
///
/// ```no_run
/// use oled_display::{DisplayConfig, DisplayController, FixedTelemetry, MockRenderer, Renderer};
///
/// let mut controller = DisplayController::new(DisplayConfig::default(), Box::new(FixedTelemetry::default()), || {
///     Ok(Box::new(MockRenderer::new()) as Box<dyn Renderer>)
/// });
/// controller.start().unwrap();
/// controller.press(oled_display::ButtonEvent::SingleClick);
/// controller.stop();
/// ```
pub struct DisplayController {
    clock: Arc<dyn Clock>,
    parked: Option<Parked>,
    worker: Option<JoinHandle<Option<Parked>>>,
    buttons: SyncSender<ButtonEvent>,
    control: SyncSender<Control>,
    status: Arc<Mutex<ControllerStatus>>,
    running: Arc<AtomicBool>,
    ready: bool,
    finished: bool,
}

impl DisplayController {
    /// Build the controller. A renderer that fails to open leaves the controller inert
    /// but usable: every render becomes a logged no-op.
    pub fn new<F>(
        config: DisplayConfig,
        telemetry: Box<dyn Telemetry>,
        open_renderer: F,
    ) -> Self
    where
        F: FnOnce() -> Result<Box<dyn Renderer>, RendererError>,
    {
        let renderer = match open_renderer() {
            Ok(renderer) => Some(renderer),
            Err(e) => {
                error!("display unavailable: {e}");
                None
            }
        };

        let root: PathBuf = config.asset_root.clone().unwrap_or_else(default_install_root);
        let frames = FrameStore::load(config.video_frames_path.as_deref(), &root);

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let display = DisplayLoop::new(config, renderer, telemetry, frames, clock.now());
        let ready = display.is_ready();

        let (buttons, button_rx) = mpsc::sync_channel(BUTTON_QUEUE_CAPACITY);
        let (control, control_rx) = mpsc::sync_channel(CONTROL_QUEUE_CAPACITY);
        let status = Arc::new(Mutex::new(display.status()));

        Self {
            clock,
            parked: Some(Parked { display, buttons: button_rx, control: control_rx }),
            worker: None,
            buttons,
            control,
            status,
            running: Arc::new(AtomicBool::new(false)),
            ready,
            finished: false,
        }
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(
        mut self,
        clock: impl Clock + 'static,
    ) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Replace the default info pages.
    #[must_use]
    pub fn with_pages(
        mut self,
        pages: InfoPageSet,
    ) -> Self {
        if let Some(parked) = self.parked.as_mut() {
            parked.display.pages = pages;
        }
        self
    }

    /// Replace the frames found at construction.
    #[must_use]
    pub fn with_frames(
        mut self,
        frames: FrameStore,
    ) -> Self {
        if let Some(parked) = self.parked.as_mut() {
            parked.display.frames = frames;
        }
        self
    }

    /// Spawn the worker. Does nothing (with a warning) if already running.
    pub fn start(&mut self) -> Result<(), ControllerError> {
        if self.worker.is_some() {
            warn!("display controller already running");
            return Ok(());
        }
        let Some(mut parked) = self.parked.take() else {
            error!("display state lost, cannot start");
            return Ok(());
        };
        parked.display.reset(self.clock.now());

        let (handoff, handoff_rx) = mpsc::sync_channel::<Parked>(1);
        let running = Arc::clone(&self.running);
        let status = Arc::clone(&self.status);
        let clock = Arc::clone(&self.clock);
        running.store(true, Ordering::Release);

        let spawned = thread::Builder::new().name(WORKER_THREAD_NAME.into()).spawn(move || {
            let parked = handoff_rx.recv().ok()?;
            Some(run_worker(parked, &running, &status, clock.as_ref()))
        });

        match spawned {
            Ok(handle) => {
                if let Err(mpsc::SendError(parked)) = handoff.send(parked) {
                    self.parked = Some(parked);
                }
                self.worker = Some(handle);
                self.finished = false;
                Ok(())
            }
            Err(e) => {
                self.running.store(false, Ordering::Release);
                self.parked = Some(parked);
                Err(ControllerError::Spawn(e))
            }
        }
    }

    /// Stop the worker and blank the panel. Blocks until the worker exits.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            self.running.store(false, Ordering::Release);
            match worker.join() {
                Ok(Some(parked)) => self.parked = Some(parked),
                Ok(None) => {}
                Err(_) => error!("display worker panicked"),
            }
            self.finished = true;
            return;
        }
        if self.finished {
            warn!("display controller already stopped");
            return;
        }
        if let Some(parked) = self.parked.as_mut() {
            parked.display.finish();
        }
        self.finished = true;
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Whether the renderer came up.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Queue a button event. Returns `false` if it was dropped (queue full).
    pub fn press(
        &self,
        event: ButtonEvent,
    ) -> bool {
        match self.buttons.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("button queue full, dropping {}", event.as_str());
                false
            }
            Err(TrySendError::Disconnected(event)) => {
                warn!("display worker gone, dropping {}", event.as_str());
                false
            }
        }
    }

    /// Queue a configuration update for the worker.
    pub fn update_config(
        &self,
        update: ConfigUpdate,
    ) {
        self.send_control(Control::Config(update));
    }

    /// Latch the power-off screen until the controller is restarted.
    pub fn show_shutdown_screen(
        &self,
        reason: &str,
    ) {
        self.send_control(Control::Shutdown(reason.to_owned()));
    }

    /// Latest published status.
    pub fn status(&self) -> ControllerStatus {
        *self.status.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Poll [`Self::status`] until `predicate` holds or `timeout` passes.
    pub fn wait_for<P>(
        &self,
        timeout: Duration,
        predicate: P,
    ) -> Option<ControllerStatus>
    where
        P: Fn(&ControllerStatus) -> bool,
    {
        let deadline = Instant::now() + timeout;
        loop {
            let status = self.status();
            if predicate(&status) {
                return Some(status);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL / 4);
        }
    }

    fn send_control(
        &self,
        control: Control,
    ) {
        match self.control.try_send(control) {
            Ok(()) => {}
            Err(TrySendError::Full(control) | TrySendError::Disconnected(control)) => {
                warn!("control queue unavailable, dropping {control:?}");
            }
        }
    }
}

impl Drop for DisplayController {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop();
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
