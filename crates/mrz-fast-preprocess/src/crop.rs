use mrz_fast_types::{Image, Rect};

use crate::convert::rebuild;
use crate::error::PreprocessError;

/// Copy the pixels under `rect` into a new image of the same format.
pub fn crop(image: &Image, rect: &Rect) -> Result<Image, PreprocessError> {
    if !rect.contained_in(image.width(), image.height()) {
        return Err(PreprocessError::CropOutOfBounds {
            left: rect.left(),
            top: rect.top(),
            rect_width: rect.width(),
            rect_height: rect.height(),
            image_width: image.width(),
            image_height: image.height(),
        });
    }

    let bpp = image.format().bytes_per_pixel();
    let src_row = image.row_bytes();
    let dst_row = rect.width() as usize * bpp;
    let mut out = Vec::with_capacity(dst_row * rect.height() as usize);

    let data = image.data();
    for row in 0..rect.height() as usize {
        let src_y = rect.top() as usize + row;
        let start = src_y * src_row + rect.left() as usize * bpp;
        out.extend_from_slice(&data[start..start + dst_row]);
    }

    rebuild(rect.width(), rect.height(), image.format(), out)
}
