//! Fixed screens: power-off banner, logo, greeting and server identity.
//!
//! # Visual Layout
//!
//! ```text
//!  Greeting                      Server info
//! ┌──────────────────────┐      ┌──────────────────────┐
//! │     * WELCOME *      │      │██████ FALCON 1 ██████│
//! │                      │      │      by HITROO       │
//! │          to          │      │  ──────────────────  │
//! │       FALCON 1       │      │ Private Server for.. │
//! │                      │      │  ──────────────────  │
//! └──────────────────────┘      └──────────────────────┘
//! ```

use oled_display_common::{Bitmap, CENTER_X, SCREEN_WIDTH};

use crate::config::Identity;
use crate::renderer::{Align, FontSize, Renderer};

// =============================================================================
// Layout Constants
// =============================================================================

const POWER_OFF_Y: i32 = 20;
const LOGO_TEXT_Y: i32 = 25;

const GREETING_HEADLINE_Y: i32 = 10;
const GREETING_TO_Y: i32 = 28;
const GREETING_NAME_Y: i32 = 40;

const INFO_BAR_HEIGHT: u32 = 15;
const INFO_NAME_Y: i32 = 2;
const INFO_OWNER_Y: i32 = 20;
const INFO_RULE_Y: i32 = 35;
const INFO_DESCRIPTION_Y: i32 = 42;
const INFO_FOOTER_Y: i32 = 58;
const RULE_X0: i32 = 10;
const RULE_X1: i32 = 117;

// =============================================================================
// Screens
// =============================================================================

/// `POWER OFF` banner.
pub fn draw_power_off(renderer: &mut dyn Renderer) {
    renderer.clear();
    renderer.draw_text("POWER OFF", CENTER_X, POWER_OFF_Y, Align::Center, FontSize::Large, true);
    renderer.present();
}

/// Bitmap logo, or the server name when there is none.
pub fn draw_logo(
    renderer: &mut dyn Renderer,
    logo: Option<&Bitmap>,
    identity: &Identity,
) {
    renderer.clear();
    match logo {
        Some(bitmap) => renderer.draw_bitmap(bitmap),
        None => renderer.draw_text(&identity.name, CENTER_X, LOGO_TEXT_Y, Align::Center, FontSize::Large, true),
    }
    renderer.present();
}

pub fn draw_greeting(
    renderer: &mut dyn Renderer,
    identity: &Identity,
) {
    renderer.clear();
    renderer.draw_text("* WELCOME *", CENTER_X, GREETING_HEADLINE_Y, Align::Center, FontSize::Medium, true);
    renderer.draw_text("to", CENTER_X, GREETING_TO_Y, Align::Center, FontSize::Small, true);
    renderer.draw_text(&identity.name, CENTER_X, GREETING_NAME_Y, Align::Center, FontSize::Large, true);
    renderer.present();
}

/// Server name on an inverted bar, owner, description between rules.
pub fn draw_server_info(
    renderer: &mut dyn Renderer,
    identity: &Identity,
) {
    renderer.clear();
    renderer.draw_rect(0, 0, SCREEN_WIDTH, INFO_BAR_HEIGHT, true);
    renderer.draw_text(&identity.name, CENTER_X, INFO_NAME_Y, Align::Center, FontSize::Normal, false);

    let owner = format!("by {}", identity.owner);
    renderer.draw_text(&owner, CENTER_X, INFO_OWNER_Y, Align::Center, FontSize::Normal, true);

    renderer.draw_line(RULE_X0, INFO_RULE_Y, RULE_X1, INFO_RULE_Y);
    renderer.draw_text(&identity.description, CENTER_X, INFO_DESCRIPTION_Y, Align::Center, FontSize::Tiny, true);
    renderer.draw_line(RULE_X0, INFO_FOOTER_Y, RULE_X1, INFO_FOOTER_Y);
    renderer.present();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{DrawOp, MockRenderer};

    #[test]
    fn test_power_off() {
        let mut renderer = MockRenderer::new();
        draw_power_off(&mut renderer);
        assert_eq!(renderer.ops(), vec![
            DrawOp::Clear,
            DrawOp::Text {
                text: "POWER OFF".into(),
                x: 64,
                y: 20,
                align: Align::Center,
                size: FontSize::Large,
                fill: true,
            },
            DrawOp::Present,
        ]);
    }

    #[test]
    fn test_logo_uses_bitmap() {
        let mut renderer = MockRenderer::new();
        let bitmap = Bitmap::from_cells(8, 2, [true, false].into_iter().cycle());
        draw_logo(&mut renderer, Some(&bitmap), &Identity::default());
        assert_eq!(renderer.ops()[1], DrawOp::Bitmap(bitmap));
        assert!(renderer.texts().is_empty());
    }

    #[test]
    fn test_logo_text_fallback() {
        let mut renderer = MockRenderer::new();
        draw_logo(&mut renderer, None, &Identity::default());
        assert_eq!(renderer.texts(), vec!["FALCON 1"]);
        assert_eq!(renderer.count(&DrawOp::Present), 1);
    }

    #[test]
    fn test_greeting() {
        let mut renderer = MockRenderer::new();
        draw_greeting(&mut renderer, &Identity::default());
        assert_eq!(renderer.texts(), vec!["* WELCOME *", "to", "FALCON 1"]);
    }

    #[test]
    fn test_server_info() {
        let mut renderer = MockRenderer::new();
        let identity = Identity { name: "ORION".into(), owner: "ACME".into(), description: "Build box".into() };
        draw_server_info(&mut renderer, &identity);
        assert_eq!(renderer.texts(), vec!["ORION", "by ACME", "Build box"]);
        let ops = renderer.ops();
        assert!(ops.contains(&DrawOp::Rect { x: 0, y: 0, w: 128, h: 15, filled: true }));
        assert_eq!(ops.iter().filter(|op| matches!(op, DrawOp::Line { .. })).count(), 2);
    }
}
