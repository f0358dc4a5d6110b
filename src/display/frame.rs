// Frame - Console video output handed to the presenter
//
// The console renders RGB565 pixels. Images are 256 pixels wide (512 in
// high-resolution modes) and 224 or 239 lines tall (doubled when
// interlaced). Rows may be padded, so a frame carries its stride in pixels.

/// Standard output width in pixels
pub const SNES_WIDTH: usize = 256;

/// Standard output height in lines
pub const SNES_HEIGHT: usize = 224;

/// Output height with overscan shown
pub const SNES_HEIGHT_EXTENDED: usize = 239;

/// Largest width the console produces
pub const MAX_SNES_WIDTH: usize = SNES_WIDTH * 2;

/// Largest height the console produces
pub const MAX_SNES_HEIGHT: usize = SNES_HEIGHT_EXTENDED * 2;

/// Pixel layout of frames handed to the presenter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 5 bits red, 6 bits green, 5 bits blue
    Rgb565,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb565 => 2,
        }
    }
}

/// Broadcast standard the console is running
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoStandard {
    #[default]
    Ntsc,
    Pal,
}

impl VideoStandard {
    /// Exact console frame rate in Hz
    pub fn frame_rate(self) -> f64 {
        match self {
            VideoStandard::Ntsc => 60.098_813_897_440_51,
            VideoStandard::Pal => 50.006_977_968,
        }
    }
}

/// Expand one RGB565 pixel to RGBA8
#[inline]
pub fn rgb565_to_rgba8(pixel: u16) -> [u8; 4] {
    let r = ((pixel >> 11) & 0x1F) as u8;
    let g = ((pixel >> 5) & 0x3F) as u8;
    let b = (pixel & 0x1F) as u8;
    [
        (r << 3) | (r >> 2),
        (g << 2) | (g >> 4),
        (b << 3) | (b >> 2),
        0xFF,
    ]
}

/// Borrowed view of one rendered frame
///
/// Only `Frame::new` and `FrameBuffer::frame` build one, so the pixel slice
/// always covers every row.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pixels: &'a [u16],
    width: usize,
    height: usize,
    /// Row pitch in pixels
    stride: usize,
    standard: VideoStandard,
}

impl<'a> Frame<'a> {
    /// Create a frame view
    ///
    /// Returns `None` if the pixel slice is too short for the given geometry,
    /// or the geometry overflows.
    pub fn new(
        pixels: &'a [u16],
        width: usize,
        height: usize,
        stride: usize,
        standard: VideoStandard,
    ) -> Option<Self> {
        let needed = match height {
            0 => 0,
            h => stride.checked_mul(h - 1)?.checked_add(width)?,
        };
        (stride >= width && pixels.len() >= needed).then_some(Self {
            pixels,
            width,
            height,
            stride,
            standard,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Row pitch in pixels
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn standard(&self) -> VideoStandard {
        self.standard
    }

    pub fn pixels(&self) -> &'a [u16] {
        self.pixels
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Pixels of row `y`, without padding
    pub fn row(&self, y: usize) -> &'a [u16] {
        let start = y * self.stride;
        &self.pixels[start..start + self.width]
    }

    /// Convert to tightly packed RGBA8
    ///
    /// # Panics
    /// Panics if `output` is shorter than `width * height * 4` bytes
    pub fn to_rgba(&self, output: &mut [u8]) {
        assert!(
            output.len() >= self.width * self.height * 4,
            "Output buffer too small for RGBA conversion"
        );

        for y in 0..self.height {
            let out_row = &mut output[y * self.width * 4..(y + 1) * self.width * 4];
            for (dst, &pixel) in out_row.chunks_exact_mut(4).zip(self.row(y)) {
                dst.copy_from_slice(&rgb565_to_rgba8(pixel));
            }
        }
    }
}

/// Owned RGB565 frame storage
#[derive(Debug, Clone)]
pub struct FrameBuffer {
    pixels: Vec<u16>,
    width: usize,
    height: usize,
    standard: VideoStandard,
}

impl FrameBuffer {
    /// Create a black frame buffer
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![0; width * height],
            width,
            height,
            standard: VideoStandard::Ntsc,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn set_standard(&mut self, standard: VideoStandard) {
        self.standard = standard;
    }

    /// # Panics
    /// Panics if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, pixel: u16) {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x] = pixel;
    }

    #[inline]
    pub fn get_pixel(&self, x: usize, y: usize) -> u16 {
        assert!(x < self.width, "X coordinate {} out of bounds", x);
        assert!(y < self.height, "Y coordinate {} out of bounds", y);

        self.pixels[y * self.width + x]
    }

    pub fn clear(&mut self, pixel: u16) {
        self.pixels.fill(pixel);
    }

    /// Borrow as a frame view
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            pixels: &self.pixels,
            width: self.width,
            height: self.height,
            stride: self.width,
            standard: self.standard,
        }
    }

    /// Fill with colour bars that scroll with `offset`
    pub fn test_pattern(&mut self, offset: usize) {
        const BARS: [u16; 8] = [
            0xFFFF, // white
            0xFFE0, // yellow
            0x07FF, // cyan
            0x07E0, // green
            0xF81F, // magenta
            0xF800, // red
            0x001F, // blue
            0x0000, // black
        ];
        let bar_width = (self.width / BARS.len()).max(1);
        for y in 0..self.height {
            for x in 0..self.width {
                let bar = ((x + offset) / bar_width) % BARS.len();
                // Checker the lower quarter so scaling artifacts are visible
                let pixel = if y >= self.height * 3 / 4 && (x + y) % 2 == 0 {
                    !BARS[bar]
                } else {
                    BARS[bar]
                };
                self.pixels[y * self.width + x] = pixel;
            }
        }
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(SNES_WIDTH, SNES_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb565_expansion() {
        assert_eq!(rgb565_to_rgba8(0xFFFF), [0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(rgb565_to_rgba8(0x0000), [0x00, 0x00, 0x00, 0xFF]);
        assert_eq!(rgb565_to_rgba8(0xF800), [0xFF, 0x00, 0x00, 0xFF]);
        assert_eq!(rgb565_to_rgba8(0x07E0), [0x00, 0xFF, 0x00, 0xFF]);
        assert_eq!(rgb565_to_rgba8(0x001F), [0x00, 0x00, 0xFF, 0xFF]);
        // Mid-grey keeps the high bits replicated into the low bits
        assert_eq!(rgb565_to_rgba8(0x8410), [0x84, 0x82, 0x84, 0xFF]);
    }

    #[test]
    fn test_frame_rejects_short_buffers() {
        let pixels = vec![0u16; 16];
        assert!(Frame::new(&pixels, 4, 4, 4, VideoStandard::Ntsc).is_some());
        assert!(Frame::new(&pixels, 4, 4, 5, VideoStandard::Ntsc).is_none());
        assert!(Frame::new(&pixels, 5, 2, 4, VideoStandard::Ntsc).is_none());
        assert!(Frame::new(&[], 256, 224, 256, VideoStandard::Ntsc).is_none());
    }

    #[test]
    fn test_frame_rejects_overflowing_geometry() {
        let pixels = vec![0u16; 16];
        assert!(Frame::new(&pixels, 4, usize::MAX, usize::MAX, VideoStandard::Ntsc).is_none());
        assert!(Frame::new(&pixels, usize::MAX, 2, usize::MAX, VideoStandard::Pal).is_none());
    }

    #[test]
    fn test_to_rgba_skips_padding() {
        // 2x2 frame with one padding pixel per row
        let pixels = [0xF800, 0x001F, 0x1234, 0x07E0, 0xFFFF, 0x1234];
        let frame = Frame::new(&pixels, 2, 2, 3, VideoStandard::Ntsc).unwrap();

        let mut rgba = vec![0u8; 16];
        frame.to_rgba(&mut rgba);
        assert_eq!(&rgba[0..4], &[0xFF, 0, 0, 0xFF]);
        assert_eq!(&rgba[4..8], &[0, 0, 0xFF, 0xFF]);
        assert_eq!(&rgba[8..12], &[0, 0xFF, 0, 0xFF]);
        assert_eq!(&rgba[12..16], &[0xFF, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_framebuffer_pixels() {
        let mut fb = FrameBuffer::default();
        assert_eq!(fb.frame().pixels().len(), SNES_WIDTH * SNES_HEIGHT);
        fb.set_pixel(100, 100, 0xABCD);
        assert_eq!(fb.get_pixel(100, 100), 0xABCD);
        fb.clear(0x1111);
        assert_eq!(fb.get_pixel(255, 223), 0x1111);
    }

    #[test]
    fn test_frame_rates() {
        assert!((VideoStandard::Ntsc.frame_rate() - 60.0988).abs() < 1e-4);
        assert!((VideoStandard::Pal.frame_rate() - 50.0070).abs() < 1e-4);
    }

    #[test]
    #[should_panic]
    fn test_set_pixel_out_of_bounds() {
        let mut fb = FrameBuffer::default();
        fb.set_pixel(SNES_WIDTH, 0, 0);
    }
}
