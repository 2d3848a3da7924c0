//! Shared domain models for the mrz-fast workspace.
//!
//! This crate centralizes lightweight data structures used across the
//! preprocess, OCR, validator, and CLI crates. Keep it backend-agnostic and
//! free of image/OCR dependencies so every crate can depend on it without
//! pulling pixel codecs or native SDKs.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type ScanResult<T> = Result<T, ScanError>;

/// Interleaved pixel layout of a decoded [`Image`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
    Rgba8,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
            PixelFormat::Rgba8 => 4,
        }
    }
}

/// Layout of a raw camera delivery buffer, before orientation correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPixelFormat {
    /// Planar YUV 4:2:0 with interleaved VU chroma (Android preview frames).
    Nv21,
    /// 32-bit BGRA (iOS capture buffers).
    Bgra8,
    /// Single 8-bit luminance plane.
    Gray8,
}

impl RawPixelFormat {
    /// Minimum byte length a buffer of this format must carry.
    pub fn required_len(self, width: u32, height: u32) -> Option<usize> {
        let pixels = (width as usize).checked_mul(height as usize)?;
        match self {
            RawPixelFormat::Nv21 => {
                let chroma_rows = height.div_ceil(2) as usize;
                let chroma_cols = width.div_ceil(2) as usize;
                let chroma = chroma_rows.checked_mul(chroma_cols)?.checked_mul(2)?;
                pixels.checked_add(chroma)
            }
            RawPixelFormat::Bgra8 => pixels.checked_mul(4),
            RawPixelFormat::Gray8 => Some(pixels),
        }
    }
}

/// Immutable decoded image. Every pipeline transform consumes an `Image`
/// and produces a new one; the payload is shared so clones stay cheap.
#[derive(Clone)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Image")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl Image {
    pub fn from_owned(
        width: u32,
        height: u32,
        format: PixelFormat,
        data: Vec<u8>,
    ) -> ScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::invalid_frame(format!(
                "image dimensions must be positive, got {width}x{height}"
            )));
        }
        let required = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(format.bytes_per_pixel()))
            .ok_or_else(|| {
                ScanError::invalid_frame("calculated image length overflowed".to_string())
            })?;
        if data.len() < required {
            return Err(ScanError::invalid_frame(format!(
                "insufficient image bytes: got {} expected at least {required}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Bytes in one tightly-packed row.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.format.bytes_per_pixel()
    }
}

/// One camera delivery unit: pixel payload plus the orientation metadata
/// needed to bring it upright.
#[derive(Clone)]
pub struct RawFrame {
    width: u32,
    height: u32,
    format: RawPixelFormat,
    rotation: Option<i32>,
    frame_index: Option<u64>,
    timestamp: Option<Duration>,
    data: Arc<[u8]>,
}

impl fmt::Debug for RawFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("format", &self.format)
            .field("rotation", &self.rotation)
            .field("frame_index", &self.frame_index)
            .field("timestamp", &self.timestamp)
            .field("bytes", &self.data.len())
            .finish()
    }
}

impl RawFrame {
    pub fn from_owned(
        width: u32,
        height: u32,
        format: RawPixelFormat,
        rotation: Option<i32>,
        data: Vec<u8>,
    ) -> ScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::invalid_frame(format!(
                "frame dimensions must be positive, got {width}x{height}"
            )));
        }
        let required = format.required_len(width, height).ok_or_else(|| {
            ScanError::invalid_frame("calculated frame length overflowed".to_string())
        })?;
        if data.len() < required {
            return Err(ScanError::invalid_frame(format!(
                "insufficient frame bytes: got {} expected at least {required}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            format,
            rotation,
            frame_index: None,
            timestamp: None,
            data: Arc::from(data.into_boxed_slice()),
        })
    }

    pub fn with_frame_index(mut self, index: Option<u64>) -> Self {
        self.frame_index = index;
        self
    }

    pub fn with_timestamp(mut self, timestamp: Option<Duration>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> RawPixelFormat {
        self.format
    }

    /// Sensor rotation in degrees, when the camera reported one.
    pub fn rotation(&self) -> Option<i32> {
        self.rotation
    }

    pub fn frame_index(&self) -> Option<u64> {
        self.frame_index
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Axis-aligned crop rectangle in pixel coordinates of a reference image.
/// Zero-area rectangles are rejected at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rect {
    left: u32,
    top: u32,
    width: u32,
    height: u32,
}

impl Rect {
    pub fn new(left: u32, top: u32, width: u32, height: u32) -> ScanResult<Self> {
        if width == 0 || height == 0 {
            return Err(ScanError::invalid_geometry(format!(
                "rect must have positive area, got {width}x{height} at ({left}, {top})"
            )));
        }
        Ok(Self {
            left,
            top,
            width,
            height,
        })
    }

    pub fn left(&self) -> u32 {
        self.left
    }

    pub fn top(&self) -> u32 {
        self.top
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Whether the rect lies fully inside an image of the given dimensions.
    pub fn contained_in(&self, image_width: u32, image_height: u32) -> bool {
        let right = self.left as u64 + self.width as u64;
        let bottom = self.top as u64 + self.height as u64;
        right <= image_width as u64 && bottom <= image_height as u64
    }
}

/// Document-frame geometry configuration: the physical aspect ratio plus the
/// fill fractions the capture overlay promises, and the MRZ band share.
/// Immutable once constructed; validation failures are setup-time fatal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DocumentFrameSpec {
    aspect_ratio: f64,
    width_fill: f64,
    height_fill: f64,
    mrz_band: f64,
    margin: f64,
}

impl DocumentFrameSpec {
    pub fn new(
        aspect_ratio: f64,
        width_fill: f64,
        height_fill: f64,
        mrz_band: f64,
        margin: f64,
    ) -> ScanResult<Self> {
        if !aspect_ratio.is_finite() || aspect_ratio <= 0.0 {
            return Err(ScanError::configuration(format!(
                "aspect ratio must be positive, got {aspect_ratio}"
            )));
        }
        for (name, value) in [("width fill", width_fill), ("height fill", height_fill)] {
            if !value.is_finite() || value <= 0.0 || value > 1.0 {
                return Err(ScanError::configuration(format!(
                    "{name} fraction must be in (0, 1], got {value}"
                )));
            }
        }
        if !mrz_band.is_finite() || !(0.0..1.0).contains(&mrz_band) {
            return Err(ScanError::configuration(format!(
                "MRZ band fraction must be in [0, 1), got {mrz_band}"
            )));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(ScanError::configuration(format!(
                "margin fraction must be non-negative, got {margin}"
            )));
        }
        Ok(Self {
            aspect_ratio,
            width_fill,
            height_fill,
            mrz_band,
            margin,
        })
    }

    /// ISO/IEC 7810 ID-3 passport page: 125 mm x 88 mm, MRZ in the bottom
    /// 40% of the frame.
    pub fn passport() -> Self {
        Self {
            aspect_ratio: 1.42,
            width_fill: 0.9,
            height_fill: 0.75,
            mrz_band: 0.40,
            margin: 0.10,
        }
    }

    /// ID-1 card under the 86:55 overlay convention, MRZ in the bottom 35%.
    pub fn id_card() -> Self {
        Self {
            aspect_ratio: 86.0 / 55.0,
            width_fill: 0.9,
            height_fill: 0.75,
            mrz_band: 0.35,
            margin: 0.10,
        }
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    pub fn width_fill(&self) -> f64 {
        self.width_fill
    }

    pub fn height_fill(&self) -> f64 {
        self.height_fill
    }

    pub fn mrz_band(&self) -> f64 {
        self.mrz_band
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }
}

/// ICAO document size classes and their MRZ shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MrzFormat {
    /// Three lines of 30 characters (ID-1 cards).
    Td1,
    /// Two lines of 36 characters (ID-2 documents).
    Td2,
    /// Two lines of 44 characters (passports).
    Td3,
}

impl MrzFormat {
    pub fn line_count(self) -> usize {
        match self {
            MrzFormat::Td1 => 3,
            MrzFormat::Td2 | MrzFormat::Td3 => 2,
        }
    }

    pub fn line_length(self) -> usize {
        match self {
            MrzFormat::Td1 => 30,
            MrzFormat::Td2 => 36,
            MrzFormat::Td3 => 44,
        }
    }

    fn classify(lines: &[String]) -> Option<Self> {
        let length = lines.first().map(String::len)?;
        if lines.iter().any(|line| line.len() != length) {
            return None;
        }
        match (lines.len(), length) {
            (3, 30) => Some(MrzFormat::Td1),
            (2, 36) => Some(MrzFormat::Td2),
            (2, 44) => Some(MrzFormat::Td3),
            _ => None,
        }
    }
}

/// Validated MRZ lines in document order. An empty result is the legitimate
/// "no MRZ found" outcome, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MrzResult {
    lines: Vec<String>,
}

impl MrzResult {
    pub fn from_lines(lines: Vec<String>) -> Self {
        Self { lines }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Newline-joined MRZ text, the shape host applications consume.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// The ICAO class these lines match, when they match one exactly.
    pub fn format(&self) -> Option<MrzFormat> {
        MrzFormat::classify(&self.lines)
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("configuration error: {message}")]
    Configuration { message: String },

    #[error("invalid frame: {reason}")]
    InvalidFrame { reason: String },

    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("OCR engine failure: {message}")]
    OcrEngine { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn invalid_frame(reason: impl Into<String>) -> Self {
        Self::InvalidFrame {
            reason: reason.into(),
        }
    }

    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn ocr_engine(message: impl Into<String>) -> Self {
        Self::OcrEngine {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_rejects_short_buffers() {
        let err = Image::from_owned(4, 4, PixelFormat::Rgb8, vec![0; 4 * 4]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidFrame { .. }));
        assert!(Image::from_owned(4, 4, PixelFormat::Rgb8, vec![0; 4 * 4 * 3]).is_ok());
    }

    #[test]
    fn nv21_requires_chroma_plane() {
        let err = RawFrame::from_owned(4, 4, RawPixelFormat::Nv21, None, vec![0; 16]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidFrame { .. }));
        let frame = RawFrame::from_owned(4, 4, RawPixelFormat::Nv21, Some(90), vec![0; 24])
            .expect("full NV21 buffer");
        assert_eq!(frame.rotation(), Some(90));
    }

    #[test]
    fn rect_rejects_zero_area() {
        assert!(Rect::new(0, 0, 0, 10).is_err());
        assert!(Rect::new(0, 0, 10, 0).is_err());
        let rect = Rect::new(2, 3, 10, 10).unwrap();
        assert!(rect.contained_in(12, 13));
        assert!(!rect.contained_in(11, 13));
    }

    #[test]
    fn frame_spec_validates_fractions() {
        assert!(DocumentFrameSpec::new(1.42, 0.9, 0.75, 0.4, 0.1).is_ok());
        assert!(DocumentFrameSpec::new(0.0, 0.9, 0.75, 0.4, 0.1).is_err());
        assert!(DocumentFrameSpec::new(1.42, 0.0, 0.75, 0.4, 0.1).is_err());
        assert!(DocumentFrameSpec::new(1.42, 0.9, 1.5, 0.4, 0.1).is_err());
        assert!(DocumentFrameSpec::new(1.42, 0.9, 0.75, 1.0, 0.1).is_err());
        assert!(DocumentFrameSpec::new(1.42, 0.9, 0.75, 0.4, -0.1).is_err());
    }

    #[test]
    fn mrz_format_classification() {
        let td3 = MrzResult::from_lines(vec!["<".repeat(44), "<".repeat(44)]);
        assert_eq!(td3.format(), Some(MrzFormat::Td3));
        let td1 = MrzResult::from_lines(vec!["<".repeat(30), "<".repeat(30), "<".repeat(30)]);
        assert_eq!(td1.format(), Some(MrzFormat::Td1));
        let ragged = MrzResult::from_lines(vec!["<".repeat(44), "<".repeat(43)]);
        assert_eq!(ragged.format(), None);
        assert!(MrzResult::empty().format().is_none());
        assert!(MrzResult::empty().is_empty());
    }
}
