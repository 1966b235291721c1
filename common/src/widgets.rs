//! Low-level drawing primitives shared by the renderer and the simulator.
//!
//! All widgets are generic over `DrawTarget<Color = BinaryColor>`. Draw errors
//! are discarded with `.ok()`: the in-memory framebuffer cannot fail and
//! clipping is handled by the target.

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Arc, PrimitiveStyle, Rectangle, Sector};

use crate::layout::SCREEN_WIDTH;

/// Largest pie radius drawn. Anything bigger covers the whole panel anyway.
pub const MAX_PIE_RADIUS: u32 = SCREEN_WIDTH;

/// 1px lit outline.
const OUTLINE: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_stroke(BinaryColor::On, 1);

/// Solid lit fill.
const FILL: PrimitiveStyle<BinaryColor> = PrimitiveStyle::with_fill(BinaryColor::On);

/// Clamp a percentage into `0..=100`, mapping NaN to 0.
#[inline]
pub fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) }
}

/// Draw a horizontal bar graph: 1px outline, interior filled left to right.
pub fn draw_bar<D>(
    display: &mut D,
    percent: f32,
    x: i32,
    y: i32,
    w: u32,
    h: u32,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    if w < 3 || h < 3 {
        return;
    }
    Rectangle::new(Point::new(x, y), Size::new(w, h))
        .into_styled(OUTLINE)
        .draw(display)
        .ok();

    let inner_w = w - 2;
    let filled = (inner_w as f32 * clamp_percent(percent) / 100.0).round() as u32;
    if filled > 0 {
        Rectangle::new(Point::new(x + 1, y + 1), Size::new(filled, h - 2))
            .into_styled(FILL)
            .draw(display)
            .ok();
    }
}

/// Sweep from `start` to `end` degrees, clockwise, normalised to `(0, 360]`.
pub fn sweep_degrees(
    start: f32,
    end: f32,
) -> f32 {
    let sweep = (end - start).rem_euclid(360.0);
    if sweep == 0.0 { 360.0 } else { sweep }
}

/// Draw a pie-slice gauge centred on (`x`, `y`).
///
/// The outline arc spans `start_angle..end_angle` (degrees, clockwise from
/// 3 o'clock); the filled sector covers `percent` of that span. `radius` is
/// capped at [`MAX_PIE_RADIUS`].
pub fn draw_pie<D>(
    display: &mut D,
    percent: f32,
    x: i32,
    y: i32,
    radius: u32,
    start_angle: f32,
    end_angle: f32,
) where
    D: DrawTarget<Color = BinaryColor>,
{
    if radius == 0 {
        return;
    }
    let center = Point::new(x, y);
    let diameter = radius.min(MAX_PIE_RADIUS) * 2 + 1;
    let sweep = sweep_degrees(start_angle, end_angle);

    Arc::with_center(center, diameter, start_angle.deg(), sweep.deg())
        .into_styled(OUTLINE)
        .draw(display)
        .ok();

    let filled = sweep * clamp_percent(percent) / 100.0;
    if filled > 0.0 {
        Sector::with_center(center, diameter, start_angle.deg(), filled.deg())
            .into_styled(FILL)
            .draw(display)
            .ok();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::mock_display::MockDisplay;
    use embedded_graphics::primitives::PointsIter;

    fn lit(display: &MockDisplay<BinaryColor>) -> Vec<Point> {
        display.affected_area().points().filter(|&p| display.get_pixel(p) == Some(BinaryColor::On)).collect()
    }

    #[test]
    fn test_clamp_percent() {
        assert_eq!(clamp_percent(-5.0), 0.0);
        assert_eq!(clamp_percent(150.0), 100.0);
        assert_eq!(clamp_percent(f32::NAN), 0.0);
        assert_eq!(clamp_percent(42.0), 42.0);
    }

    #[test]
    fn test_sweep_degrees() {
        assert_eq!(sweep_degrees(180.0, 0.0), 180.0);
        assert_eq!(sweep_degrees(0.0, 180.0), 180.0);
        assert_eq!(sweep_degrees(90.0, 90.0), 360.0);
        assert_eq!(sweep_degrees(270.0, 90.0), 180.0);
    }

    #[test]
    fn test_bar_empty_is_outline_only() {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        draw_bar(&mut display, 0.0, 0, 0, 10, 4);
        // Outline of a 10x4 rectangle: 2*10 + 2*2 pixels
        assert_eq!(lit(&display).len(), 24);
    }

    #[test]
    fn test_bar_full_fills_interior() {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        draw_bar(&mut display, 100.0, 0, 0, 10, 4);
        assert_eq!(lit(&display).len(), 40);
    }

    #[test]
    fn test_bar_half_fill_width() {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        draw_bar(&mut display, 50.0, 0, 0, 12, 3);
        // Interior row y=1 spans x=1..=10; half of 10 = 5 lit
        let interior: Vec<Point> = lit(&display).into_iter().filter(|p| p.y == 1 && p.x > 0 && p.x < 11).collect();
        assert_eq!(interior.len(), 5);
        assert!(interior.iter().all(|p| p.x <= 5));
    }

    #[test]
    fn test_pie_stays_within_radius() {
        let mut display = MockDisplay::new();
        display.set_allow_overdraw(true);
        draw_pie(&mut display, 100.0, 20, 20, 10, 180.0, 0.0);
        let points = lit(&display);
        assert!(!points.is_empty());
        assert!(points.iter().all(|p| (p.x - 20).abs() <= 11 && (p.y - 20).abs() <= 11));
    }

    #[test]
    fn test_pie_more_percent_lights_more() {
        let mut low = MockDisplay::new();
        low.set_allow_overdraw(true);
        draw_pie(&mut low, 10.0, 20, 20, 10, 180.0, 0.0);

        let mut high = MockDisplay::new();
        high.set_allow_overdraw(true);
        draw_pie(&mut high, 90.0, 20, 20, 10, 180.0, 0.0);

        assert!(lit(&high).len() > lit(&low).len());
    }

    #[test]
    fn test_pie_huge_radius_is_capped() {
        let mut huge = MockDisplay::new();
        huge.set_allow_overdraw(true);
        huge.set_allow_out_of_bounds_drawing(true);
        draw_pie(&mut huge, 50.0, 20, 20, u32::MAX, 180.0, 0.0);

        let mut capped = MockDisplay::new();
        capped.set_allow_overdraw(true);
        capped.set_allow_out_of_bounds_drawing(true);
        draw_pie(&mut capped, 50.0, 20, 20, MAX_PIE_RADIUS, 180.0, 0.0);

        assert_eq!(lit(&huge), lit(&capped));
    }
}
