//! Pixel-level stages of the MRZ pipeline: document-frame geometry,
//! orientation correction, cropping, and OCR normalization.
//!
//! Every operation is a pure transform over an explicit input image; nothing
//! here holds state across frames.

mod convert;
mod crop;
mod error;
mod geometry;
mod normalize;
mod orient;
mod resize;

pub use crop::crop;
pub use error::{GeometryError, PreprocessError};
pub use geometry::{document_layout, document_rect, mrz_band_rect, FrameLayout};
pub use normalize::{normalize, NormalizeOptions, DEFAULT_THRESHOLD};
pub use orient::{
    apply_correction, correct_frame, correct_photo, interface_correction, sensor_correction,
    unpack_frame, Correction, InterfaceOrientation,
};
pub use resize::downscale_to_fit;
