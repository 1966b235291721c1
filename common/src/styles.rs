//! Pre-computed text styles and font selection.
//!
//! Text is anchored at the top of the glyph box (`Baseline::Top`) so page
//! layouts can use the same y coordinates as the row grid in [`crate::layout`].
//! The small fonts come from the ISO-8859-1 set so `°` renders; the large size
//! uses `ProFont` for legibility on titles.

use embedded_graphics::{
    mono_font::{
        MonoFont, MonoTextStyle,
        iso_8859_1::{FONT_4X6, FONT_5X8, FONT_6X10, FONT_7X13},
    },
    pixelcolor::BinaryColor,
    text::{Alignment, Baseline, TextStyle, TextStyleBuilder},
};
use profont::PROFONT_14_POINT;

// =============================================================================
// Text Alignment
// =============================================================================

/// Horizontal alignment of text relative to its x anchor.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum Align {
    /// x is the left edge.
    #[default]
    Left,
    /// x is the horizontal center.
    Center,
    /// x is the right edge.
    Right,
}

/// Left-aligned, top-anchored text.
pub const LEFT_TOP: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Left)
    .baseline(Baseline::Top)
    .build();

/// Centered, top-anchored text.
pub const CENTER_TOP: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Center)
    .baseline(Baseline::Top)
    .build();

/// Right-aligned, top-anchored text.
pub const RIGHT_TOP: TextStyle = TextStyleBuilder::new()
    .alignment(Alignment::Right)
    .baseline(Baseline::Top)
    .build();

impl Align {
    /// Text style for this alignment.
    pub const fn text_style(self) -> TextStyle {
        match self {
            Self::Left => LEFT_TOP,
            Self::Center => CENTER_TOP,
            Self::Right => RIGHT_TOP,
        }
    }
}

// =============================================================================
// Font Sizes
// =============================================================================

/// Logical text sizes used by page layouts.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub enum FontSize {
    /// 4x6 pixels. Long descriptions.
    Tiny,
    /// 5x8 pixels. Detail rows.
    Small,
    /// 6x10 pixels. Default body text.
    #[default]
    Normal,
    /// 7x13 pixels. Greeting headline.
    Medium,
    /// `ProFont` 14pt. Names and the power-off banner.
    Large,
}

impl FontSize {
    /// Font backing this size.
    pub const fn font(self) -> &'static MonoFont<'static> {
        match self {
            Self::Tiny => &FONT_4X6,
            Self::Small => &FONT_5X8,
            Self::Normal => &FONT_6X10,
            Self::Medium => &FONT_7X13,
            Self::Large => &PROFONT_14_POINT,
        }
    }

    /// Character style drawing lit (`fill = true`) or unlit pixels.
    pub const fn style(
        self,
        fill: bool,
    ) -> MonoTextStyle<'static, BinaryColor> {
        let color = if fill { BinaryColor::On } else { BinaryColor::Off };
        MonoTextStyle::new(self.font(), color)
    }

    /// Rendered width of `text` in pixels.
    pub fn text_width(
        self,
        text: &str,
    ) -> u32 {
        let font = self.font();
        let chars = text.chars().count() as u32;
        if chars == 0 {
            return 0;
        }
        chars * font.character_size.width + (chars - 1) * font.character_spacing
    }
}
