//! Panel dimensions and pre-computed layout constants.
//!
//! Layout positions are `const` so page code reads as a fixed grid instead of
//! recalculating offsets every refresh. All coordinates are for the unrotated
//! 128x64 panel.
//!
//! ```text
//! ┌────────┬───────────────────────────┐
//! │  CPU   │ ░░░░░░ TITLE BAR ░░░░░░░░ │  0..10
//! │ (pie)  │                           │
//! │  23 %  │ RAM:  1.2/3.8 GB          │  17
//! │ 48.0°C │ [██████░░░░░░░░░░░░░░░░]  │  29
//! │ (pie)  │ CPU:  23.0 %              │  41
//! │        │ [███░░░░░░░░░░░░░░░░░░░]  │  53
//! └────────┴───────────────────────────┘
//!   0..36          39..127
//! ```

// =============================================================================
// Display Configuration
// =============================================================================

/// Panel width in pixels (SSD1306 128x64).
pub const SCREEN_WIDTH: u32 = 128;

/// Panel height in pixels.
pub const SCREEN_HEIGHT: u32 = 64;

/// Screen center X coordinate. Used as the anchor for centered text.
pub const CENTER_X: i32 = (SCREEN_WIDTH / 2) as i32;

/// Screen center Y coordinate.
pub const CENTER_Y: i32 = (SCREEN_HEIGHT / 2) as i32;

// =============================================================================
// Gauge Column (left)
// =============================================================================

/// Center X of the left gauge column (CPU usage and temperature pies).
pub const GAUGE_X: i32 = 18;

/// Radius of the gauge pies.
pub const GAUGE_RADIUS: u32 = 15;

/// Center Y of the CPU usage pie (upper half-disc).
pub const CPU_PIE_Y: i32 = 27;

/// Center Y of the temperature pie (lower half-disc).
pub const TEMP_PIE_Y: i32 = 48;

// =============================================================================
// Detail Column (right)
// =============================================================================

/// Left edge of the detail column.
pub const DETAIL_X: i32 = 39;

/// Width of the detail column rows.
pub const DETAIL_WIDTH: u32 = 88;

/// Height of each detail row (text line or bar).
pub const ROW_HEIGHT: u32 = 10;

/// Y positions of the four detail rows below the title bar.
pub const DETAIL_ROWS: [i32; 4] = [17, 29, 41, 53];

// =============================================================================
// Full-width Pages
// =============================================================================

/// Height of the inverted title bar on full-width pages.
pub const TITLE_HEIGHT: u32 = 12;

/// Left margin for full-width page content.
pub const MARGIN_X: i32 = 4;

/// Width of full-width bars.
pub const FULL_BAR_WIDTH: u32 = SCREEN_WIDTH - 2 * MARGIN_X as u32;

// Compile-time validation: columns must fit on the panel
const _: () = assert!(DETAIL_X as u32 + DETAIL_WIDTH <= SCREEN_WIDTH);
const _: () = assert!(DETAIL_ROWS[3] as u32 + ROW_HEIGHT <= SCREEN_HEIGHT);
const _: () = assert!(GAUGE_X as u32 + GAUGE_RADIUS < DETAIL_X as u32);
