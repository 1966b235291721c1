//! Precomputed monochrome frame sequences (`video_frames.bin`).
//!
//! The asset is produced offline from a video (decode, letterbox resize,
//! grayscale, dither) and consumed here. Only the file layout is shared:
//!
//! ```text
//! offset  type   field
//! 0       u32    width              (little-endian, 1..=4096)
//! 4       u32    height             (little-endian, 1..=4096)
//! 8       f32    frames_per_second  (little-endian, finite, >= 0)
//! 12      ...    N frames, each height * ceil(width / 8) bytes
//! ```
//!
//! Frames are row-major, MSB first, each row padded to a byte boundary. This is
//! the same packing as `ImageRaw<BinaryColor>`, so a frame can be blitted
//! without conversion. Frame 0 is the static identity image.

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 12;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 4096;

/// Errors raised while decoding or building frame data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes than the fixed header.
    #[error("header truncated ({len} of {HEADER_LEN} bytes)")]
    Truncated {
        /// Number of bytes available.
        len: usize,
    },

    /// Zero or oversized dimensions.
    #[error("invalid frame dimensions {width}x{height}")]
    InvalidDimensions {
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// NaN, infinite or negative frame rate.
    #[error("invalid frame rate {0}")]
    InvalidFrameRate(f32),

    /// Header present but no frame data.
    #[error("no frames after header")]
    Empty,

    /// Payload does not divide into whole frames.
    #[error("payload of {len} bytes is not a multiple of the {frame_len}-byte frame size")]
    PartialFrame {
        /// Payload length after the header.
        len: usize,
        /// Expected length of one frame.
        frame_len: usize,
    },

    /// Packed bitmap data of the wrong length.
    #[error("bitmap data is {actual} bytes, expected {expected}")]
    BitmapSize {
        /// Bytes required for the declared dimensions.
        expected: usize,
        /// Bytes supplied.
        actual: usize,
    },
}

// =============================================================================
// Bitmap
// =============================================================================

/// A single 1-bit image of exactly `width * height` cells.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Bitmap {
    /// Create an all-off bitmap.
    pub fn new(
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            width,
            height,
            data: vec![0; stride(width) * height as usize],
        }
    }

    /// Wrap already packed rows.
    pub fn from_packed(
        width: u32,
        height: u32,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let expected = stride(width) * height as usize;
        if data.len() != expected {
            return Err(FrameError::BitmapSize { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    /// Build from row-major boolean cells. Missing cells are off, extra cells are ignored.
    pub fn from_cells<I>(
        width: u32,
        height: u32,
        cells: I,
    ) -> Self
    where
        I: IntoIterator<Item = bool>,
    {
        let mut bitmap = Self::new(width, height);
        let total = width as usize * height as usize;
        for (i, on) in cells.into_iter().take(total).enumerate() {
            if on {
                bitmap.set(i as u32 % width, i as u32 / width, true);
            }
        }
        bitmap
    }

    /// Width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    /// Height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Bytes per packed row.
    #[inline]
    pub fn stride(&self) -> usize { stride(self.width) }

    /// Packed row data (MSB first, byte-padded rows).
    #[inline]
    pub fn data(&self) -> &[u8] { &self.data }

    /// Read one cell. Out-of-range coordinates read as off.
    pub fn get(
        &self,
        x: u32,
        y: u32,
    ) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let (idx, mask) = self.locate(x, y);
        self.data[idx] & mask != 0
    }

    /// Write one cell. Out-of-range coordinates are ignored.
    pub fn set(
        &mut self,
        x: u32,
        y: u32,
        on: bool,
    ) {
        if x >= self.width || y >= self.height {
            return;
        }
        let (idx, mask) = self.locate(x, y);
        if on {
            self.data[idx] |= mask;
        } else {
            self.data[idx] &= !mask;
        }
    }

    /// Number of lit cells.
    pub fn lit_count(&self) -> usize {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| (x, y)))
            .filter(|&(x, y)| self.get(x, y))
            .count()
    }

    #[inline]
    fn locate(
        &self,
        x: u32,
        y: u32,
    ) -> (usize, u8) {
        let idx = y as usize * self.stride() + x as usize / 8;
        (idx, 0x80 >> (x % 8))
    }
}

impl core::fmt::Debug for Bitmap {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("lit", &self.lit_count())
            .finish()
    }
}

/// Bytes per row for a given width.
#[inline]
pub const fn stride(width: u32) -> usize { width.div_ceil(8) as usize }

// =============================================================================
// Frame Set
// =============================================================================

/// Decoded frame sequence. Never empty, every frame has the set's dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSet {
    width: u32,
    height: u32,
    frames_per_second: f32,
    frames: Vec<Bitmap>,
}

impl FrameSet {
    /// Build a frame set, checking the invariants.
    pub fn new(
        width: u32,
        height: u32,
        frames_per_second: f32,
        frames: Vec<Bitmap>,
    ) -> Result<Self, FrameError> {
        check_header(width, height, frames_per_second)?;
        if frames.is_empty() {
            return Err(FrameError::Empty);
        }
        let expected = stride(width) * height as usize;
        if let Some(bad) = frames.iter().find(|f| f.width != width || f.height != height) {
            return Err(FrameError::BitmapSize {
                expected,
                actual: bad.data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            frames_per_second,
            frames,
        })
    }

    /// Decode the on-disk layout.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_LEN {
            return Err(FrameError::Truncated { len: bytes.len() });
        }
        let width = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        let height = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let fps = f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        check_header(width, height, fps)?;

        let payload = &bytes[HEADER_LEN..];
        if payload.is_empty() {
            return Err(FrameError::Empty);
        }
        let frame_len = stride(width) * height as usize;
        if payload.len() % frame_len != 0 {
            return Err(FrameError::PartialFrame {
                len: payload.len(),
                frame_len,
            });
        }

        let frames = payload
            .chunks_exact(frame_len)
            .map(|chunk| Bitmap {
                width,
                height,
                data: chunk.to_vec(),
            })
            .collect();

        Ok(Self {
            width,
            height,
            frames_per_second: fps,
            frames,
        })
    }

    /// Encode into the on-disk layout.
    pub fn encode(&self) -> Vec<u8> {
        let frame_len = stride(self.width) * self.height as usize;
        let mut out = Vec::with_capacity(HEADER_LEN + frame_len * self.frames.len());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.frames_per_second.to_le_bytes());
        for frame in &self.frames {
            out.extend_from_slice(&frame.data);
        }
        out
    }

    /// Frame width in pixels.
    #[inline]
    pub const fn width(&self) -> u32 { self.width }

    /// Frame height in pixels.
    #[inline]
    pub const fn height(&self) -> u32 { self.height }

    /// Playback rate recorded by the converter.
    #[inline]
    pub const fn frames_per_second(&self) -> f32 { self.frames_per_second }

    /// All frames in order.
    #[inline]
    pub fn frames(&self) -> &[Bitmap] { &self.frames }

    /// Number of frames (always at least one).
    #[inline]
    pub fn len(&self) -> usize { self.frames.len() }

    /// Always false; kept for API symmetry with slices.
    #[inline]
    pub fn is_empty(&self) -> bool { self.frames.is_empty() }

    /// Frame 0, the static identity image.
    #[inline]
    pub fn first(&self) -> &Bitmap { &self.frames[0] }
}

fn check_header(
    width: u32,
    height: u32,
    fps: f32,
) -> Result<(), FrameError> {
    if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(FrameError::InvalidDimensions { width, height });
    }
    if !fps.is_finite() || fps < 0.0 {
        return Err(FrameError::InvalidFrameRate(fps));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
