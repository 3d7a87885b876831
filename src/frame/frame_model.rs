use serde::{Deserialize, Serialize};

// ============================================================================
// Pixel format
// ============================================================================

/// Position of one colour channel inside a little-endian pixel word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub offset: u32,
    pub length: u32,
}

impl Channel {
    pub const fn new(offset: u32, length: u32) -> Self {
        Self { offset, length }
    }

    /// Extract the channel from `word` and widen it to 8 bits.
    fn extract(&self, word: u32) -> u32 {
        if self.length == 0 {
            return 0;
        }
        let length = self.length.min(8);
        let mask = (1u32 << length) - 1;
        (word.checked_shr(self.offset).unwrap_or(0) & mask) << (8 - length)
    }

    /// The channel lies entirely inside a `bpp`-bit word.
    fn fits(&self, bpp: u32) -> bool {
        self.offset
            .checked_add(self.length)
            .is_some_and(|end| end <= bpp)
    }
}

/// Layout of a raw framebuffer pixel.
///
/// Only 16 and 32 bits per pixel are meaningful. [`PixelFormat::new`]
/// rejects other depths and channels that reach past the pixel word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelFormat {
    pub bpp: u32,
    pub red: Channel,
    pub green: Channel,
    pub blue: Channel,
    pub alpha: Channel,
}

impl PixelFormat {
    pub fn new(
        bpp: u32,
        red: Channel,
        green: Channel,
        blue: Channel,
        alpha: Channel,
    ) -> Option<Self> {
        if !matches!(bpp, 16 | 32) {
            return None;
        }
        if ![red, green, blue, alpha].iter().all(|c| c.fits(bpp)) {
            return None;
        }
        Some(Self {
            bpp,
            red,
            green,
            blue,
            alpha,
        })
    }

    /// Byte order R, G, B, A in memory.
    pub const fn rgba8888() -> Self {
        Self {
            bpp: 32,
            red: Channel::new(0, 8),
            green: Channel::new(8, 8),
            blue: Channel::new(16, 8),
            alpha: Channel::new(24, 8),
        }
    }

    /// Byte order R, G, B, X in memory; alpha is reported as opaque.
    pub const fn rgbx8888() -> Self {
        Self {
            bpp: 32,
            red: Channel::new(0, 8),
            green: Channel::new(8, 8),
            blue: Channel::new(16, 8),
            alpha: Channel::new(0, 0),
        }
    }

    pub const fn rgb565() -> Self {
        Self {
            bpp: 16,
            red: Channel::new(11, 5),
            green: Channel::new(5, 6),
            blue: Channel::new(0, 5),
            alpha: Channel::new(0, 0),
        }
    }

    pub fn bytes_per_pixel(&self) -> usize {
        (self.bpp / 8) as usize
    }
}

// ============================================================================
// Frame capture
// ============================================================================

/// Raw framebuffer captured from the device. Immutable once captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameCapture {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub data: Vec<u8>,
}

impl FrameCapture {
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            data,
        }
    }

    /// Number of complete pixels held in `data`.
    pub fn pixel_count(&self) -> usize {
        self.data
            .len()
            .checked_div(self.format.bytes_per_pixel())
            .unwrap_or(0)
    }

    /// Decode the pixel word starting at `byte_offset` into `0xAARRGGBB`.
    ///
    /// Returns `None` when fewer than one pixel's worth of bytes remain.
    pub fn argb_at(&self, byte_offset: usize) -> Option<u32> {
        let bpp = self.format.bytes_per_pixel();
        let bytes = self.data.get(byte_offset..byte_offset.checked_add(bpp)?)?;

        let word = bytes
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, b)| acc | (u32::from(*b) << (8 * i)));

        let r = self.format.red.extract(word);
        let g = self.format.green.extract(word);
        let b = self.format.blue.extract(word);
        let a = if self.format.alpha.length == 0 {
            0xFF
        } else {
            self.format.alpha.extract(word)
        };

        Some((a << 24) | (r << 16) | (g << 8) | b)
    }

    /// ARGB value of the pixel at `(x, y)`, if it lies inside the buffer.
    pub fn argb_at_pixel(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let index = y as usize * self.width as usize + x as usize;
        self.argb_at(index * self.format.bytes_per_pixel())
    }

    /// Hex SHA-1 of the raw buffer, used to correlate frames in traces.
    pub fn digest(&self) -> String {
        use sha1::{Digest, Sha1};

        let mut hasher = Sha1::new();
        hasher.update(&self.data);
        format!("{:x}", hasher.finalize())
    }
}
