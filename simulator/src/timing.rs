//! Timing constants for the simulator window.

use std::time::Duration;

/// Window refresh period (~50 FPS). Panel frames arrive at most every 100ms.
pub const FRAME_TIME: Duration = Duration::from_millis(20);

/// How long the window stays up after `stop()` so the blank panel is visible.
pub const SHUTDOWN_LINGER: Duration = Duration::from_millis(300);
