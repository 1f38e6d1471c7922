use image::{imageops, ImageBuffer, Rgb, RgbImage};

/// Represents a single video frame
///
/// This is a simple wrapper around an RGB image buffer that provides
/// convenient methods for the pixel work done by the animator and layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    buffer: RgbImage,
}

impl Frame {
    /// Create a new frame from an RGB image buffer
    pub fn new(buffer: RgbImage) -> Self {
        Self { buffer }
    }

    /// Create a new frame with the given dimensions filled with the specified color
    pub fn new_filled(width: u32, height: u32, color: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb(color));
        Self { buffer }
    }

    /// Two-color vertical gradient, top color to bottom color
    pub fn vertical_gradient(width: u32, height: u32, top: [u8; 3], bottom: [u8; 3]) -> Self {
        let buffer = ImageBuffer::from_fn(width, height, |_, y| {
            let mut px = [0u8; 3];
            for c in 0..3 {
                let delta = (bottom[c] as i32 - top[c] as i32) * y as i32 / height as i32;
                px[c] = (top[c] as i32 + delta) as u8;
            }
            Rgb(px)
        });
        Self { buffer }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Get a pixel at the given coordinates (returns RGB array)
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 3] {
        self.buffer.get_pixel(x, y).0
    }

    /// Get the underlying image buffer
    pub fn as_image(&self) -> &RgbImage {
        &self.buffer
    }

    /// Raw interleaved RGB bytes
    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn as_raw_mut(&mut self) -> &mut [u8] {
        &mut *self.buffer
    }

    pub fn into_image(self) -> RgbImage {
        self.buffer
    }

    /// Linear blend `a * (1 - alpha) + b * alpha`
    ///
    /// Both frames must share dimensions.
    pub fn blend(a: &Frame, b: &Frame, alpha: f32) -> Frame {
        assert_eq!(
            (a.width(), a.height()),
            (b.width(), b.height()),
            "blended frames must share dimensions"
        );
        let alpha = alpha.clamp(0.0, 1.0);
        let mut out = a.clone();
        for (pa, &pb) in out.as_raw_mut().iter_mut().zip(b.as_raw()) {
            *pa = (*pa as f32 * (1.0 - alpha) + pb as f32 * alpha).round() as u8;
        }
        out
    }

    /// Save the frame as a PNG file
    pub fn save_png<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), image::ImageError> {
        self.buffer.save(path)
    }
}

/// A still used by the background animator
///
/// The dominant color is computed once at construction and reused for the
/// tint on every frame.
#[derive(Debug, Clone)]
pub struct BackgroundImage {
    pixels: RgbImage,
    dominant_color: [u8; 3],
}

impl BackgroundImage {
    pub fn new(pixels: RgbImage) -> Self {
        let dominant_color = dominant_color(&pixels);
        Self { pixels, dominant_color }
    }

    pub fn with_dominant_color(pixels: RgbImage, dominant_color: [u8; 3]) -> Self {
        Self { pixels, dominant_color }
    }

    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    pub fn dominant_color(&self) -> [u8; 3] {
        self.dominant_color
    }

    /// Mean per-channel standard deviation over a 40x40 downsample
    pub fn visual_variance(&self) -> f64 {
        let small = imageops::resize(&self.pixels, 40, 40, imageops::FilterType::Triangle);
        let n = (small.width() * small.height()) as f64;

        (0..3)
            .map(|c| {
                let mean = small.pixels().map(|p| p[c] as f64).sum::<f64>() / n;
                let var = small.pixels().map(|p| (p[c] as f64 - mean).powi(2)).sum::<f64>() / n;
                var.sqrt()
            })
            .sum::<f64>()
            / 3.0
    }
}

/// Per-channel median of a 50x50 downsample
pub fn dominant_color(image: &RgbImage) -> [u8; 3] {
    let small = imageops::resize(image, 50, 50, imageops::FilterType::Triangle);
    let mut color = [0u8; 3];

    for (c, out) in color.iter_mut().enumerate() {
        let mut channel: Vec<u8> = small.pixels().map(|p| p[c]).collect();
        channel.sort_unstable();
        let mid = channel.len() / 2;
        *out = if channel.len() % 2 == 0 {
            ((channel[mid - 1] as u16 + channel[mid] as u16) / 2) as u8
        } else {
            channel[mid]
        };
    }

    color
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_midpoint() {
        let a = Frame::new_filled(4, 4, [0, 100, 200]);
        let b = Frame::new_filled(4, 4, [200, 100, 0]);

        let mid = Frame::blend(&a, &b, 0.5);
        assert_eq!(mid.get_pixel(2, 2), [100, 100, 100]);
    }

    #[test]
    fn test_vertical_gradient_endpoints() {
        let frame = Frame::vertical_gradient(2, 10, [20, 20, 120], [120, 20, 20]);
        assert_eq!(frame.get_pixel(0, 0), [20, 20, 120]);
        assert_eq!(frame.get_pixel(1, 5), [70, 20, 70]);
    }

    #[test]
    fn test_dominant_color_of_flat_image() {
        let image = RgbImage::from_pixel(64, 64, Rgb([12, 34, 56]));
        assert_eq!(dominant_color(&image), [12, 34, 56]);
    }

    #[test]
    fn test_dominant_color_ignores_small_highlight() {
        let mut image = RgbImage::from_pixel(100, 100, Rgb([10, 10, 10]));
        for x in 0..20 {
            for y in 0..20 {
                image.put_pixel(x, y, Rgb([255, 255, 255]));
            }
        }
        assert_eq!(BackgroundImage::new(image).dominant_color(), [10, 10, 10]);
    }

    #[test]
    fn test_visual_variance_prefers_busy_images() {
        let flat = BackgroundImage::new(RgbImage::from_pixel(80, 80, Rgb([90, 90, 90])));
        let busy = BackgroundImage::new(RgbImage::from_fn(80, 80, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
        }));
        assert!(busy.visual_variance() > flat.visual_variance());
    }
}
