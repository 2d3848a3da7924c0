//! Image file I/O for the CLI: loading photos, writing captures, and
//! dumping intermediate pipeline stages for tuning.

use std::fs;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage, RgbaImage};
use mrz_fast_types::{Image, PixelFormat, ScanError, ScanResult};
use tracing::info;

use crate::pipeline::FrameStages;

/// Load a photo from disk as an RGB image.
pub fn load_image(path: &Path) -> ScanResult<Image> {
    let decoded = image::open(path)
        .map_err(|err| ScanError::invalid_frame(format!("failed to load {}: {err}", path.display())))?;
    let rgb = decoded.to_rgb8();
    let (width, height) = rgb.dimensions();
    Image::from_owned(width, height, PixelFormat::Rgb8, rgb.into_raw())
}

/// Write an image as PNG.
pub fn save_image(image: &Image, path: &Path) -> ScanResult<()> {
    to_dynamic(image)?
        .save_with_format(path, ImageFormat::Png)
        .map_err(|err| ScanError::invalid_frame(format!("failed to write {}: {err}", path.display())))
}

/// Write the intermediate images of a pipeline run into `dir`.
pub fn dump_stages(dir: &Path, stages: &FrameStages) -> ScanResult<()> {
    fs::create_dir_all(dir)?;
    for (name, image) in [
        ("oriented", &stages.oriented),
        ("band", &stages.band),
        ("normalized", &stages.normalized),
    ] {
        let path = dir.join(format!("{name}.png"));
        save_image(image, &path)?;
        info!(stage = name, path = %path.display(), "dumped pipeline stage");
    }
    Ok(())
}

fn to_dynamic(image: &Image) -> ScanResult<DynamicImage> {
    let data = image.data().to_vec();
    let dynamic = match image.format() {
        PixelFormat::Gray8 => GrayImage::from_raw(image.width(), image.height(), data)
            .map(DynamicImage::ImageLuma8),
        PixelFormat::Rgb8 => {
            RgbImage::from_raw(image.width(), image.height(), data).map(DynamicImage::ImageRgb8)
        }
        PixelFormat::Rgba8 => {
            RgbaImage::from_raw(image.width(), image.height(), data).map(DynamicImage::ImageRgba8)
        }
    };
    dynamic.ok_or_else(|| ScanError::invalid_frame("image buffer did not match its dimensions"))
}
