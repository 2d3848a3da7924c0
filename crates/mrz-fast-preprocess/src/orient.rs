use mrz_fast_types::{Image, PixelFormat, RawFrame, RawPixelFormat};
use tracing::warn;

use crate::convert::{rebuild, rotate_image};
use crate::error::PreprocessError;

/// Quarter-turn applied to bring a buffer upright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Correction {
    Identity,
    /// 90 degrees clockwise.
    Cw90,
    /// 90 degrees counter-clockwise.
    Ccw90,
    /// 180 degrees.
    Half,
}

impl Correction {
    /// Signed rotation in degrees, clockwise positive.
    pub fn degrees(self) -> i32 {
        match self {
            Correction::Identity => 0,
            Correction::Cw90 => 90,
            Correction::Ccw90 => -90,
            Correction::Half => 180,
        }
    }

    pub fn swaps_dimensions(self) -> bool {
        matches!(self, Correction::Cw90 | Correction::Ccw90)
    }
}

/// Interface orientation at still-capture time. Still photos carry no sensor
/// rotation value; the device orientation decides the correction instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterfaceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

/// Correction table for live preview frames. Sensor frames arrive rotated
/// relative to the device's natural orientation; 90 and 270 undo each other
/// while 180 flips in place. Missing or unrecognized metadata falls back to
/// identity and is logged, never failing the frame.
pub fn sensor_correction(rotation: Option<i32>) -> Correction {
    match rotation {
        Some(90) => Correction::Ccw90,
        Some(270) => Correction::Cw90,
        Some(180) => Correction::Half,
        Some(0) | None => Correction::Identity,
        Some(other) => {
            warn!(rotation = other, "unrecognized sensor rotation, assuming upright");
            Correction::Identity
        }
    }
}

/// Correction table for still photos, keyed on the interface orientation at
/// capture time. Distinct from [`sensor_correction`]: the two capture paths
/// receive orientation metadata differently.
pub fn interface_correction(orientation: InterfaceOrientation) -> Correction {
    match orientation {
        InterfaceOrientation::Portrait => Correction::Cw90,
        InterfaceOrientation::PortraitUpsideDown => Correction::Ccw90,
        InterfaceOrientation::LandscapeLeft => Correction::Identity,
        InterfaceOrientation::LandscapeRight => Correction::Half,
    }
}

/// Decode a raw camera buffer into an interleaved [`Image`] without applying
/// any rotation. NV21 keeps only the luminance plane; everything downstream
/// works on luma anyway.
pub fn unpack_frame(frame: &RawFrame) -> Result<Image, PreprocessError> {
    let pixels = frame.width() as usize * frame.height() as usize;
    match frame.format() {
        RawPixelFormat::Gray8 => rebuild(
            frame.width(),
            frame.height(),
            PixelFormat::Gray8,
            frame.data()[..pixels].to_vec(),
        ),
        RawPixelFormat::Nv21 => rebuild(
            frame.width(),
            frame.height(),
            PixelFormat::Gray8,
            frame.data()[..pixels].to_vec(),
        ),
        RawPixelFormat::Bgra8 => {
            let mut rgb = Vec::with_capacity(pixels * 3);
            for px in frame.data()[..pixels * 4].chunks_exact(4) {
                rgb.extend_from_slice(&[px[2], px[1], px[0]]);
            }
            rebuild(frame.width(), frame.height(), PixelFormat::Rgb8, rgb)
        }
    }
}

/// Apply a quarter-turn to an image; ±90 corrections swap width and height.
pub fn apply_correction(image: &Image, correction: Correction) -> Result<Image, PreprocessError> {
    rotate_image(image, correction)
}

/// Live-preview path: unpack the sensor buffer and bring it upright using
/// the frame's rotation metadata.
pub fn correct_frame(frame: &RawFrame) -> Result<Image, PreprocessError> {
    let image = unpack_frame(frame)?;
    apply_correction(&image, sensor_correction(frame.rotation()))
}

/// Still-photo path: bring a decoded photo upright using the interface
/// orientation at capture time.
pub fn correct_photo(
    image: &Image,
    orientation: InterfaceOrientation,
) -> Result<Image, PreprocessError> {
    apply_correction(image, interface_correction(orientation))
}
