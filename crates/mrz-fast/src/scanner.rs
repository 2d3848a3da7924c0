use std::sync::Arc;

use mrz_fast_ocr::{OcrEngine, OcrSettings};
use mrz_fast_preprocess::{InterfaceOrientation, NormalizeOptions};
use mrz_fast_types::{DocumentFrameSpec, Image, MrzResult, RawFrame, ScanError, ScanResult};
use mrz_fast_validator::{MrzExtractor, Strategy};
use tokio::sync::Semaphore;
use tokio::task;
use tracing::debug;

use crate::pipeline;

/// Immutable pipeline configuration, shared read-only across frames.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub frame_spec: DocumentFrameSpec,
    pub normalize: NormalizeOptions,
    pub strategy: Strategy,
    pub ocr: OcrSettings,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            frame_spec: DocumentFrameSpec::passport(),
            normalize: NormalizeOptions::default(),
            strategy: Strategy::default(),
            ocr: OcrSettings::default(),
        }
    }
}

impl ScannerConfig {
    /// Setup-time validation; violations are fatal to construction, never
    /// per-frame surprises.
    fn validate(&self) -> ScanResult<()> {
        if !self.normalize.scale.is_finite() || self.normalize.scale < 1.0 {
            return Err(ScanError::configuration(format!(
                "normalize scale must be >= 1, got {}",
                self.normalize.scale
            )));
        }
        if self.ocr.whitelist.is_empty() {
            return Err(ScanError::configuration(
                "OCR whitelist must not be empty",
            ));
        }
        Ok(())
    }
}

/// Result of feeding one live frame to the scanner.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Validated MRZ lines were extracted.
    Mrz(MrzResult),
    /// The pipeline ran but no line passed validation. A legitimate empty
    /// outcome, not an error.
    NoMrz,
    /// A run was already in flight; the frame was discarded unprocessed.
    Dropped,
}

impl FrameOutcome {
    pub fn into_mrz(self) -> Option<MrzResult> {
        match self {
            FrameOutcome::Mrz(result) => Some(result),
            FrameOutcome::NoMrz | FrameOutcome::Dropped => None,
        }
    }
}

/// Crop choice for still-photo capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoCrop {
    /// The oriented, resolution-bounded photo.
    Full,
    /// Cropped to the margin-expanded document frame.
    Document,
}

/// Per-capture pipeline orchestrator. Stateless across frames: every run
/// owns its buffers end to end, and the only shared pieces are the immutable
/// config and the OCR engine, which is built once and reused.
pub struct MrzScanner {
    config: Arc<ScannerConfig>,
    engine: Arc<dyn OcrEngine>,
    extractor: MrzExtractor,
    inflight: Arc<Semaphore>,
}

impl std::fmt::Debug for MrzScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MrzScanner")
            .field("config", &self.config)
            .field("engine", &self.engine.name())
            .field("extractor", &self.extractor)
            .finish()
    }
}

impl MrzScanner {
    pub fn new(config: ScannerConfig, engine: Arc<dyn OcrEngine>) -> ScanResult<Self> {
        config.validate()?;
        engine.warm_up()?;
        let extractor = MrzExtractor::new(config.strategy);
        Ok(Self {
            config: Arc::new(config),
            engine,
            extractor,
            inflight: Arc::new(Semaphore::new(1)),
        })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn engine_name(&self) -> &'static str {
        self.engine.name()
    }

    /// Run the live pipeline for one frame. At most one run is in flight;
    /// frames arriving while it holds the permit are dropped, never queued.
    /// Pixel work and recognition happen on the blocking pool, keeping the
    /// delivery task responsive.
    pub async fn process_frame(&self, frame: RawFrame) -> ScanResult<FrameOutcome> {
        let permit = match Arc::clone(&self.inflight).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                debug!(index = ?frame.frame_index(), "pipeline busy, dropping frame");
                return Ok(FrameOutcome::Dropped);
            }
        };

        let config = Arc::clone(&self.config);
        let engine = Arc::clone(&self.engine);
        let extractor = self.extractor;
        task::spawn_blocking(move || {
            let _permit = permit;
            let stages = pipeline::prepare_frame(&config, &frame)?;
            let result = pipeline::recognize(&config, engine.as_ref(), &extractor, &stages)?;
            if result.is_empty() {
                Ok(FrameOutcome::NoMrz)
            } else {
                Ok(FrameOutcome::Mrz(result))
            }
        })
        .await
        .map_err(|err| ScanError::configuration(format!("pipeline task failed: {err}")))?
    }

    /// Still-photo scan: the full pipeline including OCR. Independent of the
    /// live path; it does not contend for the frame permit (the OCR engine
    /// serializes access internally).
    pub async fn scan_photo(
        &self,
        photo: Image,
        orientation: InterfaceOrientation,
    ) -> ScanResult<MrzResult> {
        let config = Arc::clone(&self.config);
        let engine = Arc::clone(&self.engine);
        let extractor = self.extractor;
        task::spawn_blocking(move || {
            let stages = pipeline::prepare_photo(&config, &photo, orientation)?;
            pipeline::recognize(&config, engine.as_ref(), &extractor, &stages)
        })
        .await
        .map_err(|err| ScanError::configuration(format!("photo task failed: {err}")))?
    }

    /// Still-photo capture: image only, no OCR.
    pub async fn capture_photo(
        &self,
        photo: Image,
        orientation: InterfaceOrientation,
        crop: PhotoCrop,
    ) -> ScanResult<Image> {
        let config = Arc::clone(&self.config);
        task::spawn_blocking(move || {
            pipeline::prepare_capture(&config, &photo, orientation, crop == PhotoCrop::Document)
        })
        .await
        .map_err(|err| ScanError::configuration(format!("photo task failed: {err}")))?
    }
}
