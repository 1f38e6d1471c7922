use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::RgbImage;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::{BackgroundConfig, CanvasConfig};
use crate::error::{Result, VideoError};
use crate::video::types::{dominant_color, BackgroundImage};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "bmp"];

/// Loads background stills and fits them to the canvas
pub struct ImageLoader {
    canvas: CanvasConfig,
    blur_sigma: f32,
}

impl ImageLoader {
    pub fn new(canvas: CanvasConfig, config: &BackgroundConfig) -> Self {
        Self {
            canvas,
            blur_sigma: config.ingest_blur,
        }
    }

    pub fn is_image_file(path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false)
    }

    /// Image files in `dir`, sorted by name
    pub fn list_images<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(VideoError::LoadFailed {
                path: dir.display().to_string(),
            }
            .into());
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && Self::is_image_file(p))
            .collect();
        paths.sort();
        Ok(paths)
    }

    /// Load up to `limit` images from `dir`; unreadable files are skipped
    pub fn load_dir<P: AsRef<Path>>(&self, dir: P, limit: usize) -> Result<Vec<BackgroundImage>> {
        let mut paths = Self::list_images(&dir)?;
        paths.truncate(limit);

        info!("Loading {} background images from {:?}", paths.len(), dir.as_ref());

        let images: Vec<BackgroundImage> = paths
            .par_iter()
            .filter_map(|path| match self.load(path) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!("Skipping background {:?}: {}", path, e);
                    None
                }
            })
            .collect();

        info!("Loaded {}/{} background images", images.len(), paths.len());
        Ok(images)
    }

    /// Decode, center-crop to the canvas aspect, resize, then soften
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<BackgroundImage> {
        let path = path.as_ref();
        let decoded = image::open(path)
            .map_err(|_| VideoError::LoadFailed {
                path: path.display().to_string(),
            })?
            .to_rgb8();

        debug!("Decoded {:?} ({}x{})", path, decoded.width(), decoded.height());
        Ok(self.prepare(&decoded))
    }

    /// Fit an already-decoded image to the canvas
    ///
    /// The dominant color is taken before the blur so the tint follows the
    /// sharp image.
    pub fn prepare(&self, image: &RgbImage) -> BackgroundImage {
        let fitted = fit_cover(image, self.canvas.width, self.canvas.height);
        let color = dominant_color(&fitted);
        let softened = if self.blur_sigma > 0.0 {
            imageops::blur(&fitted, self.blur_sigma)
        } else {
            fitted
        };
        BackgroundImage::with_dominant_color(softened, color)
    }
}

/// Center-crop to the target aspect ratio, then Lanczos-resize to exact size
pub fn fit_cover(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    let (w, h) = (image.width() as u64, image.height() as u64);
    let (tw, th) = (width as u64, height as u64);

    let (cw, ch) = if w * th > h * tw {
        (((h * tw) / th).max(1), h)
    } else {
        (w, ((w * th) / tw).max(1))
    };
    let x0 = ((w - cw) / 2) as u32;
    let y0 = ((h - ch) / 2) as u32;

    let cropped = imageops::crop_imm(image, x0, y0, cw as u32, ch as u32).to_image();
    if cropped.dimensions() == (width, height) {
        cropped
    } else {
        imageops::resize(&cropped, width, height, FilterType::Lanczos3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use tempfile::tempdir;

    fn canvas() -> CanvasConfig {
        CanvasConfig { width: 9, height: 16, fps: 30 }
    }

    #[test]
    fn test_fit_cover_crops_wide_image() {
        // 36x16 with a red center band 9 wide
        let image = RgbImage::from_fn(36, 16, |x, _| {
            if (13..22).contains(&x) { Rgb([255, 0, 0]) } else { Rgb([0, 0, 255]) }
        });
        let fitted = fit_cover(&image, 9, 16);

        assert_eq!(fitted.dimensions(), (9, 16));
        assert!(fitted.pixels().all(|p| p.0 == [255, 0, 0]));
    }

    #[test]
    fn test_fit_cover_scales_tall_image() {
        let image = RgbImage::from_pixel(18, 64, Rgb([10, 20, 30]));
        let fitted = fit_cover(&image, 9, 16);
        assert_eq!(fitted.dimensions(), (9, 16));
    }

    #[test]
    fn test_load_dir_skips_bad_files_and_limits() {
        let dir = tempdir().unwrap();
        for name in ["b.png", "a.png", "c.png"] {
            RgbImage::from_pixel(20, 20, Rgb([40, 80, 120]))
                .save(dir.path().join(name))
                .unwrap();
        }
        std::fs::write(dir.path().join("broken.jpg"), b"not an image").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let listed = ImageLoader::list_images(dir.path()).unwrap();
        let names: Vec<_> = listed.iter().map(|p| p.file_name().unwrap().to_str().unwrap()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "broken.jpg", "c.png"]);

        let loader = ImageLoader::new(canvas(), &BackgroundConfig::default());
        let images = loader.load_dir(dir.path(), 3).unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(images[0].pixels().dimensions(), (9, 16));
        assert_eq!(images[0].dominant_color(), [40, 80, 120]);
    }

    #[test]
    fn test_missing_dir_is_error() {
        assert!(ImageLoader::list_images("/nonexistent/backgrounds").is_err());
    }
}
