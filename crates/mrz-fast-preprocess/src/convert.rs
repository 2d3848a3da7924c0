//! Interop between [`Image`] buffers and the `image` crate's typed buffers,
//! used by the resize and rotation paths.

use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage, RgbaImage};
use mrz_fast_types::{Image, PixelFormat};

use crate::error::PreprocessError;
use crate::orient::Correction;

pub(crate) fn rebuild(
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
) -> Result<Image, PreprocessError> {
    Image::from_owned(width, height, format, data).map_err(|_| PreprocessError::BufferMismatch {
        width,
        height,
        format,
    })
}

fn mismatch(image: &Image) -> PreprocessError {
    PreprocessError::BufferMismatch {
        width: image.width(),
        height: image.height(),
        format: image.format(),
    }
}

pub(crate) fn resize_image(
    image: &Image,
    new_width: u32,
    new_height: u32,
    filter: FilterType,
) -> Result<Image, PreprocessError> {
    let format = image.format();
    let data = image.data().to_vec();
    match format {
        PixelFormat::Gray8 => {
            let buffer = GrayImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let resized = imageops::resize(&buffer, new_width, new_height, filter);
            rebuild(new_width, new_height, format, resized.into_raw())
        }
        PixelFormat::Rgb8 => {
            let buffer = RgbImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let resized = imageops::resize(&buffer, new_width, new_height, filter);
            rebuild(new_width, new_height, format, resized.into_raw())
        }
        PixelFormat::Rgba8 => {
            let buffer = RgbaImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let resized = imageops::resize(&buffer, new_width, new_height, filter);
            rebuild(new_width, new_height, format, resized.into_raw())
        }
    }
}

pub(crate) fn rotate_image(
    image: &Image,
    correction: Correction,
) -> Result<Image, PreprocessError> {
    if correction == Correction::Identity {
        return Ok(image.clone());
    }

    let format = image.format();
    let data = image.data().to_vec();
    let (out_width, out_height) = if correction.swaps_dimensions() {
        (image.height(), image.width())
    } else {
        (image.width(), image.height())
    };

    match format {
        PixelFormat::Gray8 => {
            let buffer = GrayImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let rotated = rotate_buffer(&buffer, correction);
            rebuild(out_width, out_height, format, rotated.into_raw())
        }
        PixelFormat::Rgb8 => {
            let buffer = RgbImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let rotated = rotate_buffer(&buffer, correction);
            rebuild(out_width, out_height, format, rotated.into_raw())
        }
        PixelFormat::Rgba8 => {
            let buffer = RgbaImage::from_raw(image.width(), image.height(), data)
                .ok_or_else(|| mismatch(image))?;
            let rotated = rotate_buffer(&buffer, correction);
            rebuild(out_width, out_height, format, rotated.into_raw())
        }
    }
}

fn rotate_buffer<P>(
    buffer: &image::ImageBuffer<P, Vec<P::Subpixel>>,
    correction: Correction,
) -> image::ImageBuffer<P, Vec<P::Subpixel>>
where
    P: image::Pixel + 'static,
    P::Subpixel: 'static,
{
    match correction {
        Correction::Cw90 => imageops::rotate90(buffer),
        Correction::Ccw90 => imageops::rotate270(buffer),
        Correction::Half => imageops::rotate180(buffer),
        // Identity is short-circuited by the caller.
        Correction::Identity => buffer.clone(),
    }
}
