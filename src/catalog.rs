//! Selectable puzzle images: files given on the command line plus a few
//! built-in pictures, looked up by id when a game starts.

use image::{ImageBuffer, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to load {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("no puzzle images available")]
    Empty,
}

/// Source picture of a puzzle. Cloning shares the pixels.
#[derive(Debug, Clone)]
pub struct PuzzleImage {
    id: String,
    name: String,
    pixels: Arc<RgbaImage>,
}

impl PuzzleImage {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pixels: RgbaImage) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            pixels: Arc::new(pixels),
        }
    }

    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let pixels = image::open(path)
            .map_err(|source| CatalogError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(path.display().to_string(), name, pixels))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Nearest-pixel lookup at texture coordinate `(u, v)`; `v = 0` is the bottom row.
    pub fn sample(&self, u: f32, v: f32) -> Rgba<u8> {
        let (w, h) = (self.width(), self.height());
        if w == 0 || h == 0 {
            return Rgba([0, 0, 0, 0]);
        }
        let x = ((u * w as f32) as u32).min(w - 1);
        let y = (((1.0 - v) * h as f32) as u32).min(h - 1);
        *self.pixels.get_pixel(x, y)
    }
}

/// Ordered id → image table.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    images: Vec<PuzzleImage>,
}

impl Catalog {
    /// Images from `paths`; unreadable files are skipped with a warning.
    /// Falls back to the built-in pictures when nothing loads.
    pub fn load(paths: &[PathBuf]) -> Result<Self, CatalogError> {
        let mut images = Vec::new();
        for path in paths {
            match PuzzleImage::open(path) {
                Ok(image) => {
                    info!(
                        id = image.id(),
                        width = image.width(),
                        height = image.height(),
                        "loaded puzzle image"
                    );
                    images.push(image);
                }
                Err(err) => warn!(error = %err, "skipping puzzle image"),
            }
        }
        if images.is_empty() {
            images = builtin_images();
        }
        Self::from_images(images)
    }

    pub fn from_images(images: Vec<PuzzleImage>) -> Result<Self, CatalogError> {
        if images.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self { images })
    }

    pub fn lookup(&self, id: &str) -> Option<&PuzzleImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn get(&self, index: usize) -> Option<&PuzzleImage> {
        self.images.get(index)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PuzzleImage> {
        self.images.iter()
    }
}

fn lerp(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t.clamp(0.0, 1.0)).round() as u8
}

/// Procedural pictures so the game is playable without any files.
pub fn builtin_images() -> Vec<PuzzleImage> {
    let sunset = ImageBuffer::from_fn(320, 180, |x, y| {
        let t = y as f32 / 179.0;
        let (dx, dy) = (x as f32 - 220.0, y as f32 - 110.0);
        if dx.hypot(dy) < 34.0 {
            Rgba([255, 214, 102, 255])
        } else if y > 130 {
            let ripple = if (x / 12 + y / 3) % 2 == 0 { 0 } else { 18 };
            Rgba([30, 60 + ripple, 110 + ripple, 255])
        } else {
            Rgba([lerp(64, 250, t), lerp(40, 128, t), lerp(120, 70, t), 255])
        }
    });

    let checkers = ImageBuffer::from_fn(240, 240, |x, y| {
        let dark = (x / 30 + y / 30) % 2 == 0;
        let shade = lerp(60, 200, (x + y) as f32 / 478.0);
        if dark {
            Rgba([shade, 40, 80, 255])
        } else {
            Rgba([230, 230, lerp(120, 255, y as f32 / 239.0), 255])
        }
    });

    let tower = ImageBuffer::from_fn(180, 300, |x, y| {
        let t = y as f32 / 299.0;
        let in_tower = (60..120).contains(&x) && y > 60;
        let window = in_tower && (x - 60) % 20 > 8 && y % 30 > 18;
        if window {
            Rgba([255, 236, 150, 255])
        } else if in_tower {
            Rgba([90, 90, lerp(110, 70, t), 255])
        } else if y > 270 {
            Rgba([60, 140, 70, 255])
        } else {
            Rgba([lerp(20, 120, t), lerp(30, 170, t), lerp(80, 230, t), 255])
        }
    });

    vec![
        PuzzleImage::new("builtin:sunset", "Sunset", sunset),
        PuzzleImage::new("builtin:checkers", "Checkers", checkers),
        PuzzleImage::new("builtin:tower", "Tower", tower),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_origin_is_bottom_left() {
        let mut pixels = RgbaImage::from_pixel(4, 2, Rgba([0, 0, 0, 255]));
        pixels.put_pixel(0, 1, Rgba([255, 0, 0, 255]));
        pixels.put_pixel(3, 0, Rgba([0, 0, 255, 255]));
        let image = PuzzleImage::new("t", "t", pixels);
        assert_eq!(image.sample(0.0, 0.0), Rgba([255, 0, 0, 255]));
        assert_eq!(image.sample(1.0, 1.0), Rgba([0, 0, 255, 255]));
        assert_eq!(image.sample(0.99, 0.99), Rgba([0, 0, 255, 255]));
    }

    #[test]
    fn builtins_cover_each_orientation() {
        let images = builtin_images();
        assert!(images.iter().any(|i| i.width() > i.height()));
        assert!(images.iter().any(|i| i.width() == i.height()));
        assert!(images.iter().any(|i| i.width() < i.height()));
    }

    #[test]
    fn missing_files_fall_back_to_builtins() {
        let catalog = Catalog::load(&[PathBuf::from("/definitely/not/here.png")]).unwrap();
        assert_eq!(catalog.len(), builtin_images().len());
        assert!(catalog.lookup("builtin:tower").is_some());
        assert!(catalog.lookup("nope").is_none());
    }

    #[test]
    fn empty_catalog_is_an_error() {
        assert!(matches!(Catalog::from_images(Vec::new()), Err(CatalogError::Empty)));
    }
}
