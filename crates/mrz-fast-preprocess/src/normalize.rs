use image::imageops::FilterType;
use mrz_fast_types::{Image, PixelFormat};

use crate::convert::{rebuild, resize_image};
use crate::error::PreprocessError;

pub const DEFAULT_THRESHOLD: u8 = 128;

/// Tuning for [`normalize`]. The threshold stays configurable; MRZ contrast
/// varies with lighting conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeOptions {
    pub threshold: u8,
    pub scale: f32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            scale: 1.0,
        }
    }
}

/// Prepare a cropped MRZ band for OCR: optional bilinear upscale, grayscale
/// conversion, then a hard threshold to pure black/white. The output keeps
/// the input's buffer depth (binary values replicated across color channels,
/// alpha forced opaque) so downstream consumers see a familiar format.
///
/// Deterministic: identical input and options produce bit-identical output.
pub fn normalize(image: &Image, options: &NormalizeOptions) -> Result<Image, PreprocessError> {
    if !options.scale.is_finite() || options.scale < 1.0 {
        return Err(PreprocessError::InvalidScale {
            value: options.scale,
        });
    }

    let scaled = if options.scale > 1.0 {
        let new_width = ((image.width() as f32 * options.scale).round() as u32).max(1);
        let new_height = ((image.height() as f32 * options.scale).round() as u32).max(1);
        resize_image(image, new_width, new_height, FilterType::Triangle)?
    } else {
        image.clone()
    };

    let luma = luma_plane(&scaled);
    let threshold = options.threshold;
    let binary: Vec<u8> = luma
        .into_iter()
        .map(|value| if value < threshold { 0 } else { 255 })
        .collect();

    let data = expand_plane(&binary, scaled.format());
    rebuild(scaled.width(), scaled.height(), scaled.format(), data)
}

/// Rec.601 integer luma, the desaturation the capture paths use.
fn luma_plane(image: &Image) -> Vec<u8> {
    let data = image.data();
    match image.format() {
        PixelFormat::Gray8 => data.to_vec(),
        PixelFormat::Rgb8 => data.chunks_exact(3).map(|px| luma(px[0], px[1], px[2])).collect(),
        PixelFormat::Rgba8 => data.chunks_exact(4).map(|px| luma(px[0], px[1], px[2])).collect(),
    }
}

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

fn expand_plane(binary: &[u8], format: PixelFormat) -> Vec<u8> {
    match format {
        PixelFormat::Gray8 => binary.to_vec(),
        PixelFormat::Rgb8 => {
            let mut out = Vec::with_capacity(binary.len() * 3);
            for &value in binary {
                out.extend_from_slice(&[value, value, value]);
            }
            out
        }
        PixelFormat::Rgba8 => {
            let mut out = Vec::with_capacity(binary.len() * 4);
            for &value in binary {
                out.extend_from_slice(&[value, value, value, 255]);
            }
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32, data: Vec<u8>) -> Image {
        Image::from_owned(width, height, PixelFormat::Gray8, data).unwrap()
    }

    #[test]
    fn thresholds_around_the_cutoff() {
        let image = gray(4, 1, vec![0, 127, 128, 255]);
        let result = normalize(&image, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.data(), &[0, 0, 255, 255]);
    }

    #[test]
    fn normalize_is_idempotent_at_the_same_threshold() {
        let image = gray(3, 2, vec![10, 200, 90, 130, 250, 5]);
        let options = NormalizeOptions::default();
        let once = normalize(&image, &options).unwrap();
        let twice = normalize(&once, &options).unwrap();
        assert_eq!(once.data(), twice.data());
    }

    #[test]
    fn rgb_output_keeps_the_input_depth() {
        let data = vec![
            10, 10, 10, // dark
            240, 240, 240, // light
        ];
        let image = Image::from_owned(2, 1, PixelFormat::Rgb8, data).unwrap();
        let result = normalize(&image, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.format(), PixelFormat::Rgb8);
        assert_eq!(result.data(), &[0, 0, 0, 255, 255, 255]);
    }

    #[test]
    fn rgba_alpha_is_forced_opaque() {
        let image =
            Image::from_owned(1, 1, PixelFormat::Rgba8, vec![250, 250, 250, 12]).unwrap();
        let result = normalize(&image, &NormalizeOptions::default()).unwrap();
        assert_eq!(result.data(), &[255, 255, 255, 255]);
    }

    #[test]
    fn upscale_grows_both_dimensions() {
        let image = gray(4, 2, vec![128; 8]);
        let options = NormalizeOptions {
            threshold: 128,
            scale: 2.0,
        };
        let result = normalize(&image, &options).unwrap();
        assert_eq!(result.width(), 8);
        assert_eq!(result.height(), 4);
        assert!(result.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn sub_unit_scale_is_rejected() {
        let image = gray(2, 2, vec![0; 4]);
        let options = NormalizeOptions {
            threshold: 128,
            scale: 0.5,
        };
        let err = normalize(&image, &options).unwrap_err();
        assert!(matches!(err, PreprocessError::InvalidScale { .. }));
    }
}
