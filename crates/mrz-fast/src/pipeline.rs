//! Stage composition for the two capture paths. Each function is a pure
//! sequence of preprocess calls; the scanner decides threading and drop
//! policy around them.

use mrz_fast_ocr::{OcrEngine, OcrRequest};
use mrz_fast_preprocess::{
    correct_frame, correct_photo, crop, document_rect, downscale_to_fit, mrz_band_rect, normalize,
    InterfaceOrientation, PreprocessError,
};
use mrz_fast_types::{Image, MrzResult, RawFrame, ScanResult};
use mrz_fast_validator::MrzExtractor;
use tracing::debug;

use crate::scanner::ScannerConfig;

/// Still photos are bounded to this size before cropping, matching the
/// capture stack's delivery resolution.
pub const PHOTO_MAX_WIDTH: u32 = 720;
pub const PHOTO_MAX_HEIGHT: u32 = 1280;

/// Intermediate images of one pipeline run, exposed so callers can dump
/// them for tuning.
#[derive(Debug)]
pub struct FrameStages {
    /// Upright source after orientation correction (and, for photos, the
    /// downscale to delivery resolution).
    pub oriented: Image,
    /// MRZ band crop of the oriented image.
    pub band: Image,
    /// Binarized band handed to the OCR engine.
    pub normalized: Image,
}

/// Live path: unpack and orient a sensor frame, then crop and normalize its
/// MRZ band.
pub fn prepare_frame(config: &ScannerConfig, frame: &RawFrame) -> ScanResult<FrameStages> {
    let oriented = correct_frame(frame)?;
    band_stages(config, oriented)
}

/// Still path: orient a decoded photo by interface orientation, bound it to
/// delivery resolution, then crop and normalize its MRZ band.
pub fn prepare_photo(
    config: &ScannerConfig,
    photo: &Image,
    orientation: InterfaceOrientation,
) -> ScanResult<FrameStages> {
    let upright = correct_photo(photo, orientation)?;
    let fitted = downscale_to_fit(&upright, PHOTO_MAX_WIDTH, PHOTO_MAX_HEIGHT)?;
    band_stages(config, fitted)
}

/// Still path, image-only: orient and bound a photo, optionally cropping to
/// the margin-expanded document rect. Skips normalization and OCR entirely.
pub fn prepare_capture(
    config: &ScannerConfig,
    photo: &Image,
    orientation: InterfaceOrientation,
    cropped: bool,
) -> ScanResult<Image> {
    let upright = correct_photo(photo, orientation)?;
    let fitted = downscale_to_fit(&upright, PHOTO_MAX_WIDTH, PHOTO_MAX_HEIGHT)?;
    if !cropped {
        return Ok(fitted);
    }
    let rect = document_rect(fitted.width(), fitted.height(), &config.frame_spec)
        .map_err(PreprocessError::from)?;
    Ok(crop(&fitted, &rect)?)
}

/// Run recognition and line validation over prepared stages.
pub fn recognize(
    config: &ScannerConfig,
    engine: &dyn OcrEngine,
    extractor: &MrzExtractor,
    stages: &FrameStages,
) -> ScanResult<MrzResult> {
    let request = OcrRequest::new(&stages.normalized, &config.ocr);
    let response = engine.recognize(&request)?;
    let result = extractor.extract(response.text());
    debug!(
        engine = engine.name(),
        raw_len = response.text().len(),
        lines = result.line_count(),
        "recognition pass complete"
    );
    Ok(result)
}

fn band_stages(config: &ScannerConfig, oriented: Image) -> ScanResult<FrameStages> {
    let rect = mrz_band_rect(oriented.width(), oriented.height(), &config.frame_spec)
        .map_err(PreprocessError::from)?;
    let band = crop(&oriented, &rect)?;
    let normalized = normalize(&band, &config.normalize)?;
    Ok(FrameStages {
        oriented,
        band,
        normalized,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mrz_fast_types::{PixelFormat, RawPixelFormat, ScanError};

    #[test]
    fn frame_stages_follow_the_band_geometry() {
        let config = ScannerConfig::default();
        let frame = RawFrame::from_owned(
            1920,
            1080,
            RawPixelFormat::Gray8,
            Some(90),
            vec![180; 1920 * 1080],
        )
        .unwrap();
        let stages = prepare_frame(&config, &frame).unwrap();
        // 90-degree sensor rotation puts the frame upright in portrait.
        assert_eq!(stages.oriented.width(), 1080);
        assert_eq!(stages.oriented.height(), 1920);
        assert_eq!(stages.band.width(), 972);
        assert!(stages.band.height() < stages.oriented.height() / 2);
        assert_eq!(stages.normalized.format(), PixelFormat::Gray8);
        assert!(stages.normalized.data().iter().all(|&v| v == 255));
    }

    #[test]
    fn undersized_frames_fail_with_geometry_errors() {
        let config = ScannerConfig::default();
        let frame =
            RawFrame::from_owned(2, 3, RawPixelFormat::Gray8, None, vec![0; 6]).unwrap();
        let err = prepare_frame(&config, &frame).unwrap_err();
        assert!(matches!(err, ScanError::InvalidGeometry { .. }));
    }

    #[test]
    fn capture_without_crop_keeps_the_fitted_photo() {
        let config = ScannerConfig::default();
        let photo =
            Image::from_owned(1920, 1080, PixelFormat::Gray8, vec![128; 1920 * 1080]).unwrap();
        let full = prepare_capture(&config, &photo, InterfaceOrientation::LandscapeLeft, false)
            .unwrap();
        assert_eq!(full.width(), PHOTO_MAX_WIDTH);

        let cropped =
            prepare_capture(&config, &photo, InterfaceOrientation::LandscapeLeft, true).unwrap();
        assert!(cropped.width() <= full.width());
        assert!(cropped.height() <= full.height());
    }
}
