//! OLED information display simulator for desktop.
//!
//! Runs the real [`DisplayController`] with an [`OledRenderer`] whose frames
//! are shown in an `embedded-graphics-simulator` window, fed by fake telemetry.
//!
//! # Keys
//!
//! | key | action |
//! |-----|--------|
//! | Space | single click (wake / next page) |
//! | D | double click |
//! | L | long press |
//! | R | rotate by 90 degrees |
//! | S | shutdown screen |
//! | Q / Esc | quit |
//!
//! ```bash
//! RUST_LOG=debug cargo run --release -- --cycle-interval 10 --sleep-timeout 30
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod panel;
mod telemetry;
mod timing;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::Instant;

use clap::Parser;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics_simulator::sdl2::Keycode;
use embedded_graphics_simulator::{BinaryColorTheme, OutputSettingsBuilder, SimulatorDisplay, SimulatorEvent, Window};
use log::{error, info};
use oled_display::{ButtonEvent, ConfigUpdate, DisplayConfig, DisplayController, OledRenderer, Renderer, Rotation};
use oled_display_common::{SCREEN_HEIGHT, SCREEN_WIDTH};

use crate::panel::{ChannelTransport, PanelEvent, blit};
use crate::telemetry::SimulatedTelemetry;
use crate::timing::{FRAME_TIME, SHUTDOWN_LINGER};

/// Desktop preview of the OLED information display
#[derive(Parser, Debug)]
#[command(name = "simulator")]
#[command(about = "Runs the display controller against a simulated 128x64 OLED")]
struct Args {
    /// TOML file with display settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory searched for video_frames.bin
    #[arg(short, long)]
    assets: Option<PathBuf>,

    /// Window pixel scale
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Seconds on the logo between cycles
    #[arg(long)]
    cycle_interval: Option<u64>,

    /// Seconds without a click before the panel sleeps (0 = never)
    #[arg(long)]
    sleep_timeout: Option<u64>,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let mut rotation = config.rotation;

    let (transport, frames) = ChannelTransport::connect();
    let mut controller = DisplayController::new(config, Box::new(SimulatedTelemetry::new()), move || {
        OledRenderer::open(transport).map(|r| Box::new(r) as Box<dyn Renderer>)
    });
    if let Err(e) = controller.start() {
        error!("failed to start display controller: {e}");
        return ExitCode::FAILURE;
    }

    let mut display: SimulatorDisplay<BinaryColor> = SimulatorDisplay::new(Size::new(SCREEN_WIDTH, SCREEN_HEIGHT));
    let output_settings = OutputSettingsBuilder::new().scale(args.scale).theme(BinaryColorTheme::OledBlue).build();
    let mut window = Window::new("OLED Display Sim", &output_settings);
    window.update(&display);
    // A switched-off panel ignores frames
    let mut powered = true;

    'running: loop {
        let frame_start = Instant::now();

        for event in frames.try_iter() {
            match event {
                PanelEvent::Frame(bitmap) if powered => blit(&mut display, &bitmap),
                PanelEvent::Frame(_) => {}
                PanelEvent::PowerOn => powered = true,
                PanelEvent::PowerOff => {
                    powered = false;
                    display.clear(BinaryColor::Off).ok();
                }
            }
        }
        window.update(&display);

        for ev in window.events() {
            match ev {
                SimulatorEvent::Quit => break 'running,
                SimulatorEvent::KeyDown { keycode, repeat, .. } => {
                    if repeat {
                        continue;
                    }
                    match keycode {
                        Keycode::Space => {
                            controller.press(ButtonEvent::SingleClick);
                        }
                        Keycode::D => {
                            controller.press(ButtonEvent::DoubleClick);
                        }
                        Keycode::L => {
                            controller.press(ButtonEvent::LongPress);
                        }
                        Keycode::R => {
                            rotation = next_rotation(rotation);
                            let update = ConfigUpdate::new().set("oled_rotation", i64::from(rotation.degrees()));
                            controller.update_config(update);
                        }
                        Keycode::S => controller.show_shutdown_screen("simulator shutdown key"),
                        Keycode::Q | Keycode::Escape => break 'running,
                        _ => {}
                    }
                }
                _ => {}
            }
        }

        if let Some(rest) = FRAME_TIME.checked_sub(frame_start.elapsed()) {
            thread::sleep(rest);
        }
    }

    controller.stop();
    for event in frames.try_iter() {
        if let PanelEvent::Frame(bitmap) = event {
            blit(&mut display, &bitmap);
        }
    }
    window.update(&display);
    thread::sleep(SHUTDOWN_LINGER);
    info!("simulator closed");
    ExitCode::SUCCESS
}

/// Config file first, then command-line overrides through the hot-update path.
fn load_config(args: &Args) -> Result<DisplayConfig, String> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
            DisplayConfig::from_toml_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))?
        }
        None => DisplayConfig::default(),
    };

    let mut update = ConfigUpdate::new();
    if let Some(secs) = args.cycle_interval {
        update = update.set("info_display_interval", secs as i64);
    }
    if let Some(secs) = args.sleep_timeout {
        update = update.set("oled_sleep_timeout", secs as i64);
    }
    config.apply(&update);

    if args.assets.is_some() {
        config.asset_root.clone_from(&args.assets);
    }
    Ok(config)
}

fn next_rotation(rotation: Rotation) -> Rotation {
    match rotation {
        Rotation::Deg0 => Rotation::Deg90,
        Rotation::Deg90 => Rotation::Deg180,
        Rotation::Deg180 => Rotation::Deg270,
        Rotation::Deg270 => Rotation::Deg0,
    }
}
