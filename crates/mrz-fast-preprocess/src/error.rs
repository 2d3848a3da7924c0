use mrz_fast_types::{PixelFormat, ScanError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error(
        "invalid geometry: {image_width}x{image_height} source leaves a \
         {frame_width:.1}x{frame_height:.1} crop"
    )]
    InvalidGeometry {
        image_width: u32,
        image_height: u32,
        frame_width: f64,
        frame_height: f64,
    },
}

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(
        "crop rect {rect_width}x{rect_height} at ({left}, {top}) exceeds \
         {image_width}x{image_height} source"
    )]
    CropOutOfBounds {
        left: u32,
        top: u32,
        rect_width: u32,
        rect_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("scale factor must be finite and >= 1, got {value}")]
    InvalidScale { value: f32 },

    #[error("pixel buffer did not match {width}x{height} {format:?}")]
    BufferMismatch {
        width: u32,
        height: u32,
        format: PixelFormat,
    },
}

impl From<PreprocessError> for ScanError {
    fn from(err: PreprocessError) -> Self {
        match err {
            PreprocessError::Geometry(geometry) => {
                ScanError::invalid_geometry(geometry.to_string())
            }
            PreprocessError::InvalidScale { value } => {
                ScanError::configuration(format!("scale factor must be >= 1, got {value}"))
            }
            other => ScanError::invalid_frame(other.to_string()),
        }
    }
}
