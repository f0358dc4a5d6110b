// Aspect correction - Output viewport for a frame inside the drawable
//
// Scaling modes:
// - Off: 1:1, centered
// - Stretch: fill the drawable
// - Fit: keep a target aspect ratio, letterboxed and centered,
//   optionally snapped to a whole-number scale

use super::frame::{VideoStandard, SNES_HEIGHT_EXTENDED, SNES_WIDTH};
use crate::config::{AspectRatio, DisplaySettings};

/// NTSC pixel aspect ratio
const NTSC_PIXEL_ASPECT: f64 = 8.0 / 7.0;

/// PAL pixel aspect ratio
const PAL_PIXEL_ASPECT: f64 = 1.18;

/// Rectangle of the drawable the frame is drawn into
///
/// The origin may be negative when an unscaled frame is larger than the
/// drawable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Part of the viewport inside a `width` x `height` target
    ///
    /// Returns `(x, y, width, height)`, or `None` when nothing is visible.
    pub fn clip_to(&self, width: u32, height: u32) -> Option<(u32, u32, u32, u32)> {
        let x0 = i64::from(self.x).max(0);
        let y0 = i64::from(self.y).max(0);
        let x1 = (i64::from(self.x) + i64::from(self.width)).min(i64::from(width));
        let y1 = (i64::from(self.y) + i64::from(self.height)).min(i64::from(height));
        (x1 > x0 && y1 > y0).then(|| (x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
    }

    fn centered(width: u32, height: u32, dst_width: u32, dst_height: u32) -> Self {
        Self {
            x: (dst_width as i32 - width as i32) / 2,
            y: (dst_height as i32 - height as i32) / 2,
            width,
            height,
        }
    }
}

/// Compute where a `src_width` x `src_height` frame lands in the drawable
pub fn apply_aspect(
    src_width: u32,
    src_height: u32,
    dst_width: u32,
    dst_height: u32,
    settings: &DisplaySettings,
    standard: VideoStandard,
) -> Viewport {
    if !settings.scale_to_fit || src_width == 0 || src_height == 0 {
        return Viewport::centered(src_width, src_height, dst_width, dst_height);
    }

    if !settings.maintain_aspect_ratio {
        return Viewport {
            x: 0,
            y: 0,
            width: dst_width,
            height: dst_height,
        };
    }

    // High-resolution and interlaced frames cover the same picture area
    let base_width = if src_width as usize > SNES_WIDTH {
        src_width / 2
    } else {
        src_width
    };
    let base_height = if src_height as usize > SNES_HEIGHT_EXTENDED {
        src_height / 2
    } else {
        src_height
    };

    let pixel_aspect = match standard {
        VideoStandard::Ntsc => NTSC_PIXEL_ASPECT,
        VideoStandard::Pal => PAL_PIXEL_ASPECT,
    };

    let ratio = match settings.aspect_ratio {
        AspectRatio::Uncorrected | AspectRatio::UncorrectedInteger => {
            base_width as f64 / base_height as f64
        }
        AspectRatio::FourThree | AspectRatio::FourThreeInteger => 4.0 / 3.0,
        AspectRatio::Tv | AspectRatio::TvInteger => {
            base_width as f64 * pixel_aspect / base_height as f64
        }
    };

    let (width, height) = if settings.aspect_ratio.is_integer() {
        let fit_x = dst_width as f64 / (base_height as f64 * ratio);
        let fit_y = dst_height as f64 / base_height as f64;
        let scale = fit_x.min(fit_y).floor().max(1.0) as u32;

        let height = base_height * scale;
        let width = if settings.aspect_ratio == AspectRatio::UncorrectedInteger {
            base_width * scale
        } else {
            (height as f64 * ratio).round() as u32
        };
        (width, height)
    } else if dst_width as f64 / dst_height.max(1) as f64 > ratio {
        ((dst_height as f64 * ratio).round() as u32, dst_height)
    } else {
        (dst_width, (dst_width as f64 / ratio).round() as u32)
    };

    Viewport::centered(width, height, dst_width, dst_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(aspect_ratio: AspectRatio) -> DisplaySettings {
        DisplaySettings {
            aspect_ratio,
            ..DisplaySettings::default()
        }
    }

    #[test]
    fn test_unscaled_is_centered() {
        let mut s = settings(AspectRatio::FourThree);
        s.scale_to_fit = false;
        let vp = apply_aspect(256, 224, 800, 600, &s, VideoStandard::Ntsc);
        assert_eq!(
            vp,
            Viewport {
                x: 272,
                y: 188,
                width: 256,
                height: 224
            }
        );
    }

    #[test]
    fn test_oversized_frame_is_clipped_to_drawable() {
        let mut s = settings(AspectRatio::FourThree);
        s.scale_to_fit = false;
        let vp = apply_aspect(256, 224, 200, 100, &s, VideoStandard::Ntsc);
        assert_eq!((vp.x, vp.y), (-28, -62));
        assert_eq!(vp.clip_to(200, 100), Some((0, 0, 200, 100)));

        let corner = Viewport {
            x: -10,
            y: 5,
            width: 50,
            height: 50,
        };
        assert_eq!(corner.clip_to(30, 30), Some((0, 5, 30, 25)));

        let outside = Viewport {
            x: 40,
            y: 0,
            width: 10,
            height: 10,
        };
        assert_eq!(outside.clip_to(30, 30), None);
        assert_eq!(Viewport { width: 0, ..corner }.clip_to(30, 30), None);
    }

    #[test]
    fn test_stretch_fills_drawable() {
        let mut s = settings(AspectRatio::FourThree);
        s.maintain_aspect_ratio = false;
        let vp = apply_aspect(256, 224, 1000, 500, &s, VideoStandard::Ntsc);
        assert_eq!((vp.x, vp.y, vp.width, vp.height), (0, 0, 1000, 500));
    }

    #[test]
    fn test_four_three_pillarbox() {
        let vp = apply_aspect(
            256,
            224,
            1920,
            1080,
            &settings(AspectRatio::FourThree),
            VideoStandard::Ntsc,
        );
        assert_eq!(vp.height, 1080);
        assert_eq!(vp.width, 1440);
        assert_eq!(vp.x, 240);
        assert_eq!(vp.y, 0);
    }

    #[test]
    fn test_four_three_letterbox() {
        let vp = apply_aspect(
            256,
            224,
            800,
            1000,
            &settings(AspectRatio::FourThree),
            VideoStandard::Ntsc,
        );
        assert_eq!((vp.width, vp.height), (800, 600));
        assert_eq!(vp.y, 200);
    }

    #[test]
    fn test_uncorrected_integer() {
        let vp = apply_aspect(
            256,
            224,
            1000,
            700,
            &settings(AspectRatio::UncorrectedInteger),
            VideoStandard::Ntsc,
        );
        assert_eq!((vp.width, vp.height), (768, 672));
        assert_eq!((vp.x, vp.y), (116, 14));
    }

    #[test]
    fn test_hires_frame_uses_base_size() {
        let s = settings(AspectRatio::UncorrectedInteger);
        let low = apply_aspect(256, 224, 1000, 700, &s, VideoStandard::Ntsc);
        let high = apply_aspect(512, 448, 1000, 700, &s, VideoStandard::Ntsc);
        assert_eq!(low, high);
    }

    #[test]
    fn test_integer_scale_is_at_least_one() {
        let vp = apply_aspect(
            256,
            224,
            100,
            100,
            &settings(AspectRatio::FourThreeInteger),
            VideoStandard::Ntsc,
        );
        assert_eq!(vp.height, 224);
    }

    #[test]
    fn test_tv_aspect_depends_on_standard() {
        let s = settings(AspectRatio::Tv);
        let ntsc = apply_aspect(256, 224, 4000, 224, &s, VideoStandard::Ntsc);
        let pal = apply_aspect(256, 224, 4000, 224, &s, VideoStandard::Pal);
        assert_eq!(ntsc.width, 293);
        assert_eq!(pal.width, 302);
    }
}
