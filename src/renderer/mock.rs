//! Recording renderer for tests and headless runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use oled_display_common::Bitmap;

use super::{Align, FontSize, Renderer};
use crate::config::Rotation;

/// One recorded [`Renderer`] call.
#[derive(Clone, PartialEq, Debug)]
pub enum DrawOp {
    Clear,
    Text {
        text: String,
        x: i32,
        y: i32,
        align: Align,
        size: FontSize,
        fill: bool,
    },
    Bar {
        percent: f32,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    },
    Pie {
        percent: f32,
        x: i32,
        y: i32,
        radius: u32,
        start_angle: f32,
        end_angle: f32,
    },
    Bitmap(Bitmap),
    Rect {
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        filled: bool,
    },
    Line {
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    },
    Rotation(Rotation),
    Present,
    On,
    Off,
}

impl DrawOp {
    /// Text of a `Text` op.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// Renderer that records calls instead of drawing. Clones share the same log.
#[derive(Clone, Debug)]
pub struct MockRenderer {
    ops: Arc<Mutex<Vec<DrawOp>>>,
    ready: Arc<AtomicBool>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            ops: Arc::new(Mutex::new(Vec::new())),
            ready: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A renderer whose panel never came up.
    pub fn unready() -> Self {
        let mock = Self::new();
        mock.set_ready(false);
        mock
    }

    pub fn set_ready(
        &self,
        ready: bool,
    ) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Copy of everything recorded so far.
    pub fn ops(&self) -> Vec<DrawOp> {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Drain the log.
    pub fn take(&self) -> Vec<DrawOp> {
        std::mem::take(&mut *self.ops.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// All text drawn so far, in order.
    pub fn texts(&self) -> Vec<String> {
        self.ops().iter().filter_map(DrawOp::text).map(str::to_owned).collect()
    }

    pub fn count(
        &self,
        op: &DrawOp,
    ) -> usize {
        self.ops().iter().filter(|o| *o == op).count()
    }

    fn record(
        &self,
        op: DrawOp,
    ) {
        self.ops.lock().unwrap_or_else(PoisonError::into_inner).push(op);
    }
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for MockRenderer {
    fn clear(&mut self) {
        self.record(DrawOp::Clear);
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: i32,
        y: i32,
        align: Align,
        size: FontSize,
        fill: bool,
    ) {
        self.record(DrawOp::Text { text: text.to_owned(), x, y, align, size, fill });
    }

    fn draw_bar_horizontal(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
    ) {
        self.record(DrawOp::Bar { percent, x, y, w, h });
    }

    fn draw_pie(
        &mut self,
        percent: f32,
        x: i32,
        y: i32,
        radius: u32,
        start_angle: f32,
        end_angle: f32,
    ) {
        self.record(DrawOp::Pie { percent, x, y, radius, start_angle, end_angle });
    }

    fn draw_bitmap(
        &mut self,
        bitmap: &Bitmap,
    ) {
        self.record(DrawOp::Bitmap(bitmap.clone()));
    }

    fn draw_rect(
        &mut self,
        x: i32,
        y: i32,
        w: u32,
        h: u32,
        filled: bool,
    ) {
        self.record(DrawOp::Rect { x, y, w, h, filled });
    }

    fn draw_line(
        &mut self,
        x0: i32,
        y0: i32,
        x1: i32,
        y1: i32,
    ) {
        self.record(DrawOp::Line { x0, y0, x1, y1 });
    }

    fn set_rotation(
        &mut self,
        rotation: Rotation,
    ) {
        self.record(DrawOp::Rotation(rotation));
    }

    fn present(&mut self) {
        self.record(DrawOp::Present);
    }

    fn on(&mut self) {
        self.record(DrawOp::On);
    }

    fn off(&mut self) {
        self.record(DrawOp::Off);
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_log() {
        let mock = MockRenderer::new();
        let mut handle: Box<dyn Renderer> = Box::new(mock.clone());
        handle.clear();
        handle.draw_text("hi", 1, 2, Align::Left, FontSize::Small, true);
        handle.present();
        assert_eq!(mock.texts(), vec!["hi".to_owned()]);
        assert_eq!(mock.count(&DrawOp::Present), 1);
        assert_eq!(mock.take().len(), 3);
        assert!(mock.ops().is_empty());
    }

    #[test]
    fn test_unready() {
        assert!(!MockRenderer::unready().is_ready());
        assert!(MockRenderer::new().is_ready());
    }
}
