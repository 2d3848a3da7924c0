use image::imageops::FilterType;
use mrz_fast_types::Image;

use crate::convert::resize_image;
use crate::error::PreprocessError;

/// Shrink an image so it fits within `max_width` x `max_height`, preserving
/// aspect ratio. Landscape sources are bounded by width, portrait sources by
/// height; images already inside the bounds are returned unchanged (this
/// never upscales).
pub fn downscale_to_fit(
    image: &Image,
    max_width: u32,
    max_height: u32,
) -> Result<Image, PreprocessError> {
    let width = image.width() as f32;
    let height = image.height() as f32;

    let ratio = if width > height {
        max_width as f32 / width
    } else {
        max_height as f32 / height
    };

    if ratio >= 1.0 {
        return Ok(image.clone());
    }

    let new_width = ((width * ratio) as u32).max(1);
    let new_height = ((height * ratio) as u32).max(1);
    resize_image(image, new_width, new_height, FilterType::CatmullRom)
}
